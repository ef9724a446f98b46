//! Cancellable scheduled tasks.
//!
//! Both helpers check the token before running their callback, so a task whose
//! token was cancelled never calls it again.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Run `tick` every `period`, first after one full period, until cancelled.
///
/// A tick that is already running finishes even if the token is cancelled
/// meanwhile.
pub fn spawn_periodic<F, Fut>(
    token: CancellationToken,
    period: Duration,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }
            if token.is_cancelled() {
                break;
            }
            tick().await;
        }
    })
}

/// Run `task` once after `delay` unless cancelled first.
pub fn spawn_delayed<F, Fut>(token: CancellationToken, delay: Duration, task: F) -> JoinHandle<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
        task().await;
    })
}

/// Sleep for `delay`; returns false when cancelled first.
pub async fn sleep_or_cancel(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
