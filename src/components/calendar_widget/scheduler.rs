use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Background re-render loop owned by one widget.
///
/// The loop runs until [`RefreshScheduler::cancel`] is called. A cancelled
/// scheduler cannot be restarted; the widget owning it is done.
#[derive(Debug)]
pub struct RefreshScheduler {
    token: CancellationToken,
    signalled: AtomicBool,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Spawn the loop. `on_tick` runs once per `interval`, starting one full
    /// interval from now. A zero interval spawns nothing
    pub fn start<F, Fut>(interval: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task = if interval.is_zero() {
            info!("Refresh interval is zero, refresh loop disabled");
            None
        } else {
            let loop_token = token.clone();
            Some(tokio::spawn(async move {
                run_refresh_loop(interval, loop_token, on_tick).await;
            }))
        };

        Self {
            token,
            signalled: AtomicBool::new(false),
            task,
        }
    }

    /// Signal the loop to stop. Returns false if it was already signalled
    pub fn cancel(&self) -> bool {
        if self.signalled.swap(true, Ordering::SeqCst) {
            debug!("Refresh loop already cancelled");
            return false;
        }
        self.token.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True while the loop task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel and wait for the loop task to finish. Returns false if the
    /// loop had panicked or was aborted
    pub async fn stop(mut self) -> bool {
        self.cancel();
        match self.task.take() {
            Some(task) => match task.await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Refresh loop ended abnormally: {}", e);
                    false
                }
            },
            None => true,
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Call `on_tick` every `period` until `token` is cancelled.
/// Returns immediately for a zero period
pub async fn run_refresh_loop<F, Fut>(period: Duration, token: CancellationToken, mut on_tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    if period.is_zero() {
        return;
    }

    info!("Refresh loop started, ticking every {:?}", period);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                debug!("Refresh tick");
                on_tick().await;
            }
        }
    }

    info!("Refresh loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&count);
        let on_tick = move || {
            ticks.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        };
        (count, on_tick)
    }

    #[tokio::test]
    async fn test_zero_interval_never_ticks() {
        let (count, on_tick) = counter();
        let token = CancellationToken::new();

        run_refresh_loop(Duration::ZERO, token, on_tick).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let (count, on_tick) = counter();
        let scheduler = RefreshScheduler::start(Duration::ZERO, on_tick);
        assert!(!scheduler.is_running());
        assert!(scheduler.cancel());
        assert!(scheduler.stop().await);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ticks_until_cancelled() {
        let (count, on_tick) = counter();
        let scheduler = RefreshScheduler::start(Duration::from_millis(10), on_tick);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(scheduler.cancel());
        assert!(scheduler.stop().await);

        let ticks = count.load(Ordering::SeqCst);
        assert!(ticks >= 1, "expected at least one tick, got {}", ticks);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(count.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test]
    async fn test_first_tick_waits_one_interval() {
        let (count, on_tick) = counter();
        let scheduler = RefreshScheduler::start(Duration::from_secs(60), on_tick);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_repeated_cancel_is_safe() {
        let (_count, on_tick) = counter();
        let scheduler = RefreshScheduler::start(Duration::from_millis(5), on_tick);

        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        assert!(!scheduler.cancel());
        assert!(scheduler.is_cancelled());
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_stop_reports_panicked_loop() {
        let scheduler = RefreshScheduler::start(Duration::from_millis(5), || async {
            panic!("render failed");
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!scheduler.is_running());
        assert!(!scheduler.stop().await);
    }
}
