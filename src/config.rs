use crate::brute::constants::{DEFAULT_CONCURRENCY, DEFAULT_RPS};
use crate::brute::ProbeOptions;
use crate::error::BruteError;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "tl-basicbrute")]
#[command(version)]
#[command(about = "TL-BasicBrute - HTTP Basic Auth 口令爆破工具", long_about = None)]
#[command(after_help = "警告：本工具只允许在取得授权的前提下用于渗透测试、攻防演练等合法场景。禁止对未授权目标进行爆破。")]
pub struct Cli {
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,
    #[arg(short = 'U', long, value_name = "FILE")]
    pub usernames: Option<PathBuf>,
    #[arg(short = 'P', long, value_name = "FILE")]
    pub passwords: Option<PathBuf>,
    #[arg(short = 'C', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
    #[arg(long, default_value_t = DEFAULT_RPS)]
    pub rps: f64,
    /// 单个请求超时 (毫秒)，0 表示不限制
    #[arg(short, long, default_value = "0")]
    pub timeout: u64,
    #[arg(long)]
    pub insecure: bool,
    #[arg(long)]
    pub json: bool,
}

// Go flag 风格的单横线长参数 (-url=...)，clap 会把它当成 -u 加值 "rl=..."
const SINGLE_DASH_LONG_FLAGS: &[&str] = &[
    "url",
    "usernames",
    "passwords",
    "concurrency",
    "rps",
    "timeout",
    "insecure",
    "json",
];

/// Rewrites `-url`, `-url=<v>` and friends to their `--` form so clap does
/// not split them into a short flag plus attached value. Arguments after a
/// bare `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for arg in args {
        if passthrough {
            out.push(arg);
            continue;
        }
        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                passthrough = true;
                return None;
            }
            let body = s.strip_prefix('-').filter(|b| !b.starts_with('-'))?;
            let name = body.split_once('=').map_or(body, |(n, _)| n);
            SINGLE_DASH_LONG_FLAGS
                .contains(&name)
                .then(|| OsString::from(format!("-{}", s)))
        });
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

#[derive(Debug, Clone)]
pub struct BruteConfig {
    pub url: String,
    pub usernames_path: PathBuf,
    pub passwords_path: PathBuf,
    pub concurrency: usize,
    pub rps: f64,
    pub timeout: Option<Duration>,
    pub insecure: bool,
    pub json_output: bool,
}

impl BruteConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, BruteError> {
        let url = cli
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or(BruteError::MissingArgument("url"))?;
        let usernames_path = cli
            .usernames
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(BruteError::MissingArgument("usernames"))?;
        let passwords_path = cli
            .passwords
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(BruteError::MissingArgument("passwords"))?;

        if cli.concurrency == 0 {
            return Err(BruteError::InvalidConcurrency(cli.concurrency));
        }
        if !cli.rps.is_finite() || cli.rps <= 0.0 {
            return Err(BruteError::InvalidRate(cli.rps));
        }

        Ok(BruteConfig {
            url: url.trim().to_string(),
            usernames_path,
            passwords_path,
            concurrency: cli.concurrency,
            rps: cli.rps,
            timeout: (cli.timeout > 0).then(|| Duration::from_millis(cli.timeout)),
            insecure: cli.insecure,
            json_output: cli.json,
        })
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            timeout: self.timeout,
            insecure: self.insecure,
        }
    }
}

pub fn usage() -> String {
    "Usage: tl-basicbrute --url <URL> --usernames <usernames-file> --passwords <passwords-file> [--concurrency <N>] [--rps <requests-per-second>]".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<BruteConfig, BruteError> {
        let mut argv = vec!["tl-basicbrute"];
        argv.extend_from_slice(args);
        let argv = normalize_args(argv.into_iter().map(OsString::from));
        BruteConfig::from_cli(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_go_style_single_dash_flags() {
        let cfg = parse(&[
            "-url=http://h/",
            "-usernames", "u.txt",
            "-passwords=p.txt",
            "-concurrency", "4",
            "-rps=2.5",
        ])
        .unwrap();
        assert_eq!(cfg.url, "http://h/");
        assert_eq!(cfg.usernames_path, PathBuf::from("u.txt"));
        assert_eq!(cfg.passwords_path, PathBuf::from("p.txt"));
        assert_eq!(cfg.concurrency, 4);
        assert_eq!(cfg.rps, 2.5);

        let cfg = parse(&["-url", "http://h/", "-U", "u", "-P", "p"]).unwrap();
        assert_eq!(cfg.url, "http://h/");
    }

    #[test]
    fn test_normalize_leaves_other_args_alone() {
        let argv: Vec<OsString> = ["x", "-u", "http://h/", "-C", "3", "--rps", "1", "-unknown", "--", "-url"]
            .iter()
            .map(OsString::from)
            .collect();
        assert_eq!(normalize_args(argv.clone()), argv);
    }

    #[test]
    fn test_defaults() {
        let cfg = parse(&["-u", "http://10.0.0.1/admin", "-U", "users.txt", "-P", "pass.txt"]).unwrap();
        assert_eq!(cfg.url, "http://10.0.0.1/admin");
        assert_eq!(cfg.concurrency, 10);
        assert_eq!(cfg.rps, 10.0);
        assert_eq!(cfg.timeout, None);
        assert!(!cfg.insecure);
        assert!(!cfg.json_output);
    }

    #[test]
    fn test_long_flags() {
        let cfg = parse(&[
            "--url", "https://example.com/",
            "--usernames", "u.txt",
            "--passwords", "p.txt",
            "--concurrency", "50",
            "--rps", "2.5",
            "--timeout", "3000",
            "--insecure",
            "--json",
        ])
        .unwrap();
        assert_eq!(cfg.concurrency, 50);
        assert_eq!(cfg.rps, 2.5);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(3)));
        assert!(cfg.probe_options().insecure);
        assert!(cfg.json_output);
    }

    #[test]
    fn test_missing_required_arguments() {
        assert!(matches!(
            parse(&["-U", "u.txt", "-P", "p.txt"]),
            Err(BruteError::MissingArgument("url"))
        ));
        assert!(matches!(
            parse(&["-u", "http://x/", "-P", "p.txt"]),
            Err(BruteError::MissingArgument("usernames"))
        ));
        assert!(matches!(
            parse(&["-u", "http://x/", "-U", "u.txt"]),
            Err(BruteError::MissingArgument("passwords"))
        ));
        assert!(matches!(
            parse(&["-u", "", "-U", "u.txt", "-P", "p.txt"]),
            Err(BruteError::MissingArgument("url"))
        ));
    }

    #[test]
    fn test_invalid_knobs() {
        let base = ["-u", "http://x/", "-U", "u.txt", "-P", "p.txt"];

        let mut args = base.to_vec();
        args.extend_from_slice(&["-C", "0"]);
        assert!(matches!(parse(&args), Err(BruteError::InvalidConcurrency(0))));

        let mut args = base.to_vec();
        args.extend_from_slice(&["--rps", "0"]);
        assert!(matches!(parse(&args), Err(BruteError::InvalidRate(_))));

        let mut args = base.to_vec();
        args.extend_from_slice(&["--rps=-3"]);
        assert!(matches!(parse(&args), Err(BruteError::InvalidRate(_))));
    }
}
