pub mod constants;
pub mod credential;
pub mod http_basic;
pub mod probe;
pub mod rate_limit;

pub use credential::{credential_pairs, AttemptOutcome, Credential};
pub use http_basic::{BasicAuthProbe, ProbeOptions};
pub use probe::CredentialProbe;
pub use rate_limit::RatePacer;

use crate::error::{BruteError, TransportErrorKind};
use futures::future::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Consumer of attempt outcomes. Called from the dispatcher's driver loop
/// only, one outcome at a time, in completion order.
pub trait OutcomeSink {
    fn report(&mut self, credential: &Credential, outcome: &AttemptOutcome);
}

impl<F> OutcomeSink for F
where
    F: FnMut(&Credential, &AttemptOutcome),
{
    fn report(&mut self, credential: &Credential, outcome: &AttemptOutcome) {
        self(credential, outcome)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub issued: usize,
    pub reported: usize,
    pub status_counts: BTreeMap<u16, usize>,
    pub error_counts: BTreeMap<TransportErrorKind, usize>,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl RunSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &AttemptOutcome) {
        self.reported += 1;
        match outcome {
            AttemptOutcome::Success { status } => {
                *self.status_counts.entry(*status).or_insert(0) += 1;
            }
            AttemptOutcome::TransportError { kind, .. } => {
                *self.error_counts.entry(*kind).or_insert(0) += 1;
            }
        }
    }

    pub fn transport_errors(&self) -> usize {
        self.error_counts.values().sum()
    }

    pub fn skipped(&self) -> usize {
        self.total - self.issued
    }
}

/// Drives every username × password pair through a concurrency cap and a
/// single global rate pacer, reporting each outcome exactly once.
pub struct Dispatcher {
    probe: Arc<dyn CredentialProbe>,
    concurrency: usize,
    pacer: Arc<RatePacer>,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(
        probe: Arc<dyn CredentialProbe>,
        concurrency: usize,
        rps: f64,
    ) -> Result<Self, BruteError> {
        if concurrency == 0 {
            return Err(BruteError::InvalidConcurrency(concurrency));
        }
        Ok(Self {
            probe,
            concurrency,
            pacer: Arc::new(RatePacer::new(rps)?),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn run<S>(
        &self,
        target: &str,
        usernames: &[String],
        passwords: &[String],
        sink: &mut S,
    ) -> RunSummary
    where
        S: OutcomeSink + ?Sized,
    {
        let started = Instant::now();
        let mut summary = RunSummary::new(usernames.len() * passwords.len());
        if summary.total == 0 {
            return summary;
        }

        info!(
            probe = self.probe.name(),
            total = summary.total,
            concurrency = self.concurrency,
            interval_ms = self.pacer.interval().as_secs_f64() * 1000.0,
            "开始爆破"
        );

        let target: Arc<str> = Arc::from(target);
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pairs = credential_pairs(usernames, passwords);
        let mut next = pairs.next();
        let mut workers = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                Some(joined) = workers.join_next() => match joined {
                    Ok((credential, outcome)) => {
                        summary.record(&outcome);
                        sink.report(&credential, &outcome);
                    }
                    // 任务内部已捕获 panic，这里只可能是运行时被关闭
                    Err(e) => error!(error = %e, "工作任务异常退出"),
                },

                _ = self.cancel.cancelled(), if next.is_some() => {
                    warn!(remaining = summary.total - summary.issued, "收到取消信号，停止派发新任务");
                    summary.cancelled = true;
                    next = None;
                }

                permit = semaphore.clone().acquire_owned(), if next.is_some() => {
                    let permit = match permit {
                        Ok(p) => p,
                        Err(_) => break,
                    };
                    let Some(credential) = next.take() else { continue };
                    next = pairs.next();
                    summary.issued += 1;

                    let probe = self.probe.clone();
                    let pacer = self.pacer.clone();
                    let target = target.clone();
                    workers.spawn(async move {
                        pacer.acquire().await;
                        debug!(username = %credential.username, "发送请求");
                        let outcome = AssertUnwindSafe(probe.attempt(&target, &credential))
                            .catch_unwind()
                            .await
                            .unwrap_or_else(|_| {
                                warn!(username = %credential.username, "探测任务 panic");
                                AttemptOutcome::TransportError {
                                    kind: TransportErrorKind::Other,
                                    message: "attempt panicked".to_string(),
                                }
                            });
                        drop(permit);
                        (credential, outcome)
                    });
                }

                else => break,
            }
        }

        summary.elapsed = started.elapsed();
        info!(
            issued = summary.issued,
            reported = summary.reported,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "爆破结束"
        );
        summary
    }
}
