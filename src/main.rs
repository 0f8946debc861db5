mod brute;
mod config;
mod error;
mod output;
mod wordlist;

use anyhow::Result;
use brute::{BasicAuthProbe, Dispatcher};
use clap::Parser;
use config::{BruteConfig, Cli};
use error::{BruteError, ErrorSeverity};
use output::{ConsoleSink, JsonLinesSink};
use std::future::Future;
use std::io;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn print_banner() {
    let banner = r#"
  _______ __       ____            _      ____             _
 |__   __| |      |  _ \          (_)    |  _ \           | |
    | |  | |      | |_) | __ _ ___ _  ___| |_) |_ __ _   _| |_ ___
    | |  | |      |  _ < / _` / __| |/ __|  _ <| '__| | | | __/ _ \
    | |  | |____  | |_) | (_| \__ \ | (__| |_) | |  | |_| | ||  __/
    |_|  |______| |____/ \__,_|___/_|\___|____/|_|   \__,_|\__\___|
    TL-BasicBrute v1.0.0 - HTTP Basic Auth Brute Forcer
    "#;
    eprintln!("{}", banner);
}

fn fail(err: &BruteError) -> ! {
    match err.severity() {
        ErrorSeverity::Critical => eprintln!("配置错误: {}", err),
        ErrorSeverity::High => eprintln!("运行失败: {}", err),
    }
    if let Some(hint) = err.user_hint() {
        eprintln!("{}", hint);
    }
    process::exit(1);
}

/// First interrupt cancels the run and lets in-flight requests drain, a
/// second one asks for a hard exit. Returns the exit code to use, or `None`
/// when signals cannot be listened for.
async fn watch_interrupts<F, Fut>(mut next_signal: F, cancel: CancellationToken) -> Option<i32>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    if let Err(e) = next_signal().await {
        tracing::error!(error = %e, "无法监听 Ctrl+C");
        return None;
    }
    eprintln!("\n收到 Ctrl+C，等待进行中的请求完成 (再次按下强制退出)...");
    cancel.cancel();

    match next_signal().await {
        Ok(()) => {
            eprintln!("\n再次收到 Ctrl+C，强制退出");
            Some(130)
        }
        Err(e) => {
            tracing::error!(error = %e, "无法监听 Ctrl+C");
            None
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(output::log_writer)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse_from(config::normalize_args(std::env::args_os()));

    let config = match BruteConfig::from_cli(cli) {
        Ok(c) => c,
        Err(BruteError::MissingArgument(_)) => {
            println!("{}", config::usage());
            return Ok(());
        }
        Err(e) => fail(&e),
    };

    if !config.json_output {
        print_banner();
    }

    let usernames = wordlist::read_lines(&config.usernames_path).unwrap_or_else(|e| fail(&e));
    let passwords = wordlist::read_lines(&config.passwords_path).unwrap_or_else(|e| fail(&e));

    let probe = BasicAuthProbe::new(&config.probe_options()).unwrap_or_else(|e| fail(&e));
    let cancel = CancellationToken::new();
    let dispatcher = Dispatcher::new(Arc::new(probe), config.concurrency, config.rps)
        .unwrap_or_else(|e| fail(&e))
        .with_cancellation(cancel.clone());

    let signal_handle = tokio::spawn(async move {
        if let Some(code) = watch_interrupts(tokio::signal::ctrl_c, cancel).await {
            process::exit(code);
        }
    });

    let total = usernames.len() * passwords.len();
    if config.json_output {
        let mut sink = JsonLinesSink::new(std::io::stdout());
        dispatcher
            .run(&config.url, &usernames, &passwords, &mut sink)
            .await;
    } else {
        println!(
            "[*] 目标: {} | 用户名: {} 条 | 密码: {} 条 | 共 {} 个组合 | 并发: {} | 速率: {}/s",
            config.url,
            usernames.len(),
            passwords.len(),
            total,
            config.concurrency,
            config.rps
        );
        let mut sink = ConsoleSink::new(total, true);
        let summary = dispatcher
            .run(&config.url, &usernames, &passwords, &mut sink)
            .await;
        sink.finish(summary.cancelled);
        output::print_summary(&summary);
    }

    signal_handle.abort();
    Ok(())
}
