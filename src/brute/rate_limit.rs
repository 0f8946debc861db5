use super::constants::MAX_PACING_INTERVAL;
use crate::error::BruteError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Process-wide fixed-interval gate. Every caller reserves the next free
/// slot, so grants are at least `interval` apart no matter how many tasks
/// are waiting. Idle time does not bank credit: there are no bursts.
#[derive(Debug)]
pub struct RatePacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RatePacer {
    pub fn new(rps: f64) -> Result<Self, BruteError> {
        if !rps.is_finite() || rps <= 0.0 {
            return Err(BruteError::InvalidRate(rps));
        }
        // 1/rps 溢出 (rps 为次正规数) 时同样取上限
        let interval = Duration::try_from_secs_f64(1.0 / rps)
            .map_or(MAX_PACING_INTERVAL, |d| d.min(MAX_PACING_INTERVAL));
        Ok(Self {
            interval,
            next_slot: Mutex::new(None),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        // 只在预约时持锁，等待期间不阻塞其他任务预约后续时间片
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = match *next {
                Some(t) if t > now => t,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };

        tokio::time::sleep_until(slot).await;
    }
}
