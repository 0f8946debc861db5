use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BruteError {
    #[error("缺少必需参数: --{0}")]
    MissingArgument(&'static str),

    #[error("并发数无效: {0} (必须大于 0)")]
    InvalidConcurrency(usize),

    #[error("请求速率无效: {0} (必须为有限正数)")]
    InvalidRate(f64),

    #[error("字典文件读取失败: {path}")]
    WordlistRead {
        path: String,
        source: std::io::Error,
    },

    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl BruteError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BruteError::MissingArgument(_)
            | BruteError::InvalidConcurrency(_)
            | BruteError::InvalidRate(_) => ErrorSeverity::Critical,
            BruteError::WordlistRead { .. } | BruteError::HttpClient(_) => ErrorSeverity::High,
        }
    }

    pub fn user_hint(&self) -> Option<String> {
        match self {
            BruteError::InvalidConcurrency(_) => {
                Some("提示：使用 -C 指定一个正整数，例如 -C 10".to_string())
            }
            BruteError::InvalidRate(_) => {
                Some("提示：使用 --rps 指定每秒请求数，例如 --rps 10 或 --rps 0.5".to_string())
            }
            BruteError::WordlistRead { .. } => {
                Some("提示：检查字典文件路径是否正确以及是否有读取权限".to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Critical,
    High,
}

/// Coarse class of a failed round-trip, used for the run summary only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    InvalidRequest,
    Redirect,
    Body,
    Other,
}

impl TransportErrorKind {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        // 连接超时同时满足 is_connect，先判断 is_timeout
        if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_connect() {
            TransportErrorKind::Connect
        } else if err.is_builder() {
            TransportErrorKind::InvalidRequest
        } else if err.is_redirect() {
            TransportErrorKind::Redirect
        } else if err.is_body() || err.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::InvalidRequest => "invalid_request",
            TransportErrorKind::Redirect => "redirect",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "other",
        }
    }

    pub fn user_hint(&self) -> Option<&'static str> {
        match self {
            TransportErrorKind::Timeout => {
                Some("提示：尝试增加超时时间 (-t 参数) 或降低并发数 (-C 参数)")
            }
            TransportErrorKind::Connect => {
                Some("提示：检查目标是否在线、DNS 是否可解析，或者防火墙是否阻止了连接")
            }
            TransportErrorKind::InvalidRequest => Some("提示：检查 URL 格式是否正确 (需包含 http:// 或 https://)"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        assert_eq!(
            BruteError::MissingArgument("url").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(
            BruteError::InvalidRate(0.0).severity(),
            ErrorSeverity::Critical
        );
        let read_err = BruteError::WordlistRead {
            path: "users.txt".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(read_err.severity(), ErrorSeverity::High);
        assert!(read_err.user_hint().is_some());
    }

    #[test]
    fn test_missing_argument_message_names_flag() {
        let msg = BruteError::MissingArgument("passwords").to_string();
        assert!(msg.contains("--passwords"));
    }

    #[tokio::test]
    async fn test_builder_error_is_invalid_request() {
        let client = reqwest::Client::new();
        let err = client.get("not a url").send().await.unwrap_err();
        assert_eq!(
            TransportErrorKind::from_reqwest(&err),
            TransportErrorKind::InvalidRequest
        );
    }
}
