use super::constants::{HTTP_POOL_IDLE_TIMEOUT, HTTP_POOL_MAX_IDLE_PER_HOST};
use super::credential::{AttemptOutcome, Credential};
use super::probe::CredentialProbe;
use crate::error::{BruteError, TransportErrorKind};
use async_trait::async_trait;
use std::error::Error as _;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ProbeOptions {
    /// `None` 表示不设超时，请求可能无限期阻塞
    pub timeout: Option<Duration>,
    pub insecure: bool,
}

/// Plain `GET` with an `Authorization: Basic` header. The status of the
/// configured URL itself is reported, so redirects are not followed.
pub struct BasicAuthProbe {
    client: reqwest::Client,
}

impl BasicAuthProbe {
    pub fn new(options: &ProbeOptions) -> Result<Self, BruteError> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(options.insecure)
            .pool_idle_timeout(HTTP_POOL_IDLE_TIMEOUT)
            .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl CredentialProbe for BasicAuthProbe {
    fn name(&self) -> &str {
        "HTTP-Basic"
    }

    async fn attempt(&self, target: &str, credential: &Credential) -> AttemptOutcome {
        let result = self
            .client
            .get(target)
            .basic_auth(&credential.username, Some(&credential.password))
            .send()
            .await;

        match result {
            Ok(resp) => AttemptOutcome::Success {
                status: resp.status().as_u16(),
            },
            Err(e) => {
                debug!(username = %credential.username, error = %e, "请求失败");
                AttemptOutcome::TransportError {
                    kind: TransportErrorKind::from_reqwest(&e),
                    message: describe(&e),
                }
            }
        }
    }
}

// reqwest 的顶层错误信息往往不含根因 (如 connection refused)，拼接 source 链
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
