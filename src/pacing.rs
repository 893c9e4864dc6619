use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Minimum spacing between consecutive calls to the translation service,
/// shared by every worker of a run.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Blocks until `interval` has passed since the previous call, then
    /// records this call.
    pub fn wait(&self) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_does_not_wait() {
        let pacer = Pacer::from_millis(10_000);
        let t = Instant::now();
        pacer.wait();
        assert!(t.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn second_call_is_spaced() {
        let pacer = Pacer::from_millis(30);
        pacer.wait();
        let t = Instant::now();
        pacer.wait();
        assert!(t.elapsed() >= Duration::from_millis(25));
    }
}
