use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_RPS: f64 = 10.0;

// 极低速率下的间隔上限 (约 30 年)，防止 Instant 相加溢出
pub const MAX_PACING_INTERVAL: Duration = Duration::from_secs(86400 * 365 * 30);

pub const HTTP_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 32;

pub const PROGRESS_TICK: Duration = Duration::from_millis(100);
