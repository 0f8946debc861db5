use crate::brute::constants::PROGRESS_TICK;
use crate::brute::{AttemptOutcome, Credential, OutcomeSink, RunSummary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use tracing::warn;

// 当前显示中的进度条，日志输出需要先让它让出终端
static ACTIVE_BAR: RwLock<Option<ProgressBar>> = RwLock::new(None);

fn set_active_bar(pb: Option<ProgressBar>) {
    let mut guard = ACTIVE_BAR.write().unwrap_or_else(|e| e.into_inner());
    *guard = pb;
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// stderr writer for the tracing subscriber. While a progress bar is on
/// screen each event is written inside `suspend` so the bar is redrawn
/// below the log line.
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active_bar() {
            Some(pb) => pb.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

pub fn log_writer() -> LogWriter {
    LogWriter
}

pub fn format_outcome_line(credential: &Credential, outcome: &AttemptOutcome) -> String {
    match outcome {
        AttemptOutcome::Success { status } => format!(
            "username: {}, password: {} - Status: {}",
            credential.username, credential.password, status
        ),
        AttemptOutcome::TransportError { message, .. } => format!(
            "Error sending request for username: {}, password: {} - {}",
            credential.username, credential.password, message
        ),
    }
}

// 仅按 HTTP 状态码类别着色，不对登录成功与否做判断
fn colorize(line: String, outcome: &AttemptOutcome) -> ColoredString {
    match outcome {
        AttemptOutcome::Success { status } => match status {
            200..=299 => line.green().bold(),
            300..=399 => line.cyan(),
            500..=599 => line.magenta(),
            _ => line.normal(),
        },
        AttemptOutcome::TransportError { .. } => line.red(),
    }
}

/// Human readable sink. Lines are printed through the progress bar so the
/// bar is redrawn below them instead of being torn.
pub struct ConsoleSink {
    pb: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new(total: usize, show_progress: bool) -> Self {
        let pb = if show_progress && total > 0 {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.enable_steady_tick(PROGRESS_TICK);
            set_active_bar(Some(pb.clone()));
            Some(pb)
        } else {
            None
        };
        Self { pb }
    }

    pub fn finish(&self, cancelled: bool) {
        if let Some(pb) = &self.pb {
            set_active_bar(None);
            if cancelled {
                pb.abandon_with_message("已取消");
            } else {
                pb.finish_and_clear();
            }
        }
    }
}

impl OutcomeSink for ConsoleSink {
    fn report(&mut self, credential: &Credential, outcome: &AttemptOutcome) {
        let line = colorize(format_outcome_line(credential, outcome), outcome);
        match &self.pb {
            Some(pb) => {
                pb.suspend(|| println!("{}", line));
                pb.inc(1);
            }
            None => println!("{}", line),
        }
    }
}

#[derive(Serialize)]
struct AttemptRecord<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(flatten)]
    outcome: &'a AttemptOutcome,
}

/// One JSON object per attempt, flushed per line so records stream out.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_record(&mut self, record: &AttemptRecord<'_>) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> OutcomeSink for JsonLinesSink<W> {
    fn report(&mut self, credential: &Credential, outcome: &AttemptOutcome) {
        let record = AttemptRecord {
            username: &credential.username,
            password: &credential.password,
            outcome,
        };
        if let Err(e) = self.write_record(&record) {
            warn!(error = %e, "JSON 输出失败");
        }
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Brute summary:".bold().underline());
    println!("  Combinations: {}", summary.total.to_string().cyan());
    println!("  Attempted:    {}", summary.issued.to_string().cyan());
    println!("  Reported:     {}", summary.reported.to_string().cyan());
    println!("  Elapsed:      {:.2}s", summary.elapsed.as_secs_f64());
    if summary.elapsed.as_secs_f64() > 0.0 {
        println!(
            "  Rate:         {:.2} req/s",
            summary.reported as f64 / summary.elapsed.as_secs_f64()
        );
    }

    if !summary.status_counts.is_empty() {
        println!("\n{}", "Status codes:".bold());
        for (status, count) in &summary.status_counts {
            println!("  {:<8} {}", status, count);
        }
    }

    if summary.transport_errors() > 0 {
        println!("\n{}", "Transport errors:".bold().red());
        for (kind, count) in &summary.error_counts {
            println!("  {:<16} {}", kind.label(), count.to_string().red());
            if let Some(hint) = kind.user_hint() {
                println!("  {:<16} {}", "", hint.dimmed());
            }
        }
    }

    if summary.cancelled {
        println!(
            "\n{}",
            format!("已取消：剩余 {} 个组合未发送", summary.skipped()).yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;

    #[test]
    fn test_success_line_format() {
        let line = format_outcome_line(
            &Credential::new("alice", "pw1"),
            &AttemptOutcome::Success { status: 401 },
        );
        assert_eq!(line, "username: alice, password: pw1 - Status: 401");
    }

    #[test]
    fn test_error_line_names_the_pair() {
        let line = format_outcome_line(
            &Credential::new("bob", "hunter2"),
            &AttemptOutcome::TransportError {
                kind: TransportErrorKind::Connect,
                message: "connection refused".to_string(),
            },
        );
        assert!(line.starts_with("Error sending request for username: bob, password: hunter2"));
        assert!(line.ends_with("connection refused"));
    }

    #[test]
    fn test_log_writer_follows_console_bar() {
        let mut writer = log_writer();
        assert_eq!(writer.write(b"").unwrap(), 0);

        let sink = ConsoleSink::new(3, true);
        assert!(active_bar().is_some());
        assert_eq!(writer.write(b"WARN log line\n").unwrap(), 14);

        sink.finish(false);
        assert!(active_bar().is_none());
        assert_eq!(writer.write(b"after\n").unwrap(), 6);
        writer.flush().unwrap();

        // 无进度条 (总数为 0) 时不注册
        let quiet = ConsoleSink::new(0, true);
        assert!(quiet.pb.is_none());
        assert!(active_bar().is_none());
    }

    #[test]
    fn test_json_lines_sink() {
        let mut buf = Vec::new();
        let mut sink = JsonLinesSink::new(&mut buf);
        sink.report(
            &Credential::new("alice", "pw2"),
            &AttemptOutcome::Success { status: 200 },
        );
        sink.report(
            &Credential::new("alice", "pw3"),
            &AttemptOutcome::TransportError {
                kind: TransportErrorKind::Timeout,
                message: "operation timed out".to_string(),
            },
        );

        drop(sink);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["username"], "alice");
        assert_eq!(first["password"], "pw2");
        assert_eq!(first["outcome"], "success");
        assert_eq!(first["status"], 200);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["outcome"], "transport_error");
        assert_eq!(second["kind"], "timeout");
        assert_eq!(second["message"], "operation timed out");
    }
}
