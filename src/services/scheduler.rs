//! Periodic, single-flight job runner.
//!
//! Each tick spawns the job as its own task so a slow run never delays the
//! ticker. A shared flag rejects a tick while the previous run is still in
//! flight.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Clears the in-flight flag when the run ends, even by panic.
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct Scheduler {
    interval: Duration,
    in_flight: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the run slot. None while another run holds it.
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard {
                flag: self.in_flight.clone(),
            })
    }

    /// Spawn one run of `job` unless a run is already in flight.
    pub fn tick<F, Fut>(&self, job: &F) -> Option<JoinHandle<()>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(guard) = self.try_begin() else {
            warn!("Previous run still in flight, skipping this tick");
            return None;
        };
        let run = job();
        Some(tokio::spawn(async move {
            let _guard = guard;
            run.await;
        }))
    }

    /// Tick immediately and then every interval until `shutdown` resolves.
    /// A run still in flight at shutdown is awaited, never dropped midway.
    pub async fn run_until<F, Fut, S>(&self, job: F, shutdown: S)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
        S: Future<Output = ()>,
    {
        info!("Scheduler started, interval {:?}", self.interval);
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        let mut current: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(handle) = self.tick(&job) {
                        debug!("Scheduled run started");
                        current = Some(handle);
                    }
                }
                _ = &mut shutdown => {
                    info!("Scheduler received shutdown signal");
                    break;
                }
            }
        }

        if let Some(handle) = current.filter(|h| !h.is_finished()) {
            info!("Waiting for the in-flight run to finish");
            if let Err(e) = handle.await {
                warn!("In-flight run ended abnormally: {}", e);
            }
        }
    }

    /// Run until Ctrl-C.
    pub async fn run<F, Fut>(&self, job: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        self.run_until(job, ctrl_c).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_slot() {
        let scheduler = Scheduler::new(Duration::from_secs(1));
        let guard = scheduler.try_begin().unwrap();
        assert!(scheduler.in_flight.load(Ordering::SeqCst));
        assert!(scheduler.try_begin().is_none());
        drop(guard);
        assert!(!scheduler.in_flight.load(Ordering::SeqCst));
        assert!(scheduler.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_tick_skips_while_in_flight() {
        let scheduler = Scheduler::new(Duration::from_secs(1));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let release_rx = std::sync::Mutex::new(Some(release_rx));

        let job = || {
            let rx = release_rx.lock().unwrap().take();
            async move {
                if let Some(rx) = rx {
                    let _ = rx.await;
                }
            }
        };

        let first = scheduler.tick(&job).expect("first tick runs");
        assert!(scheduler.tick(&job).is_none());

        release_tx.send(()).unwrap();
        first.await.unwrap();
        assert!(!scheduler.in_flight.load(Ordering::SeqCst));
        assert!(scheduler.tick(&job).is_some());
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_run() {
        let scheduler = Scheduler::new(Duration::from_secs(3600));
        let finished = Arc::new(AtomicBool::new(false));

        let flag = finished.clone();
        let job = move || {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
            }
        };

        scheduler
            .run_until(job, tokio::time::sleep(Duration::from_millis(20)))
            .await;

        assert!(finished.load(Ordering::SeqCst));
        assert!(!scheduler.in_flight.load(Ordering::SeqCst));
    }
}
