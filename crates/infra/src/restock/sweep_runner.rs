use std::io;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use cafeops_forecast::{InventoryCatalog, RestockEngine, RunningLowNotifier, SweepReport};

/// Config for the scheduled restock sweep.
#[derive(Debug, Clone)]
pub struct RestockSweepRunner {
    pub interval: Duration,
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl Default for RestockSweepRunner {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            max_retries: 5,
            base_backoff: Duration::from_millis(250),
        }
    }
}

impl RestockSweepRunner {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Spawn the sweep thread.
    ///
    /// - Schedule: one pass at startup, then every `interval`
    /// - Manual trigger: `handle.trigger()` (coalesced)
    /// - Catalog failures: logged + retried with bounded exponential backoff; never propagate
    pub fn spawn<C, N>(
        &self,
        engine: RestockEngine,
        catalog: Arc<C>,
        notifier: Arc<N>,
    ) -> io::Result<RestockSweepRunnerHandle>
    where
        C: InventoryCatalog + ?Sized + 'static,
        N: RunningLowNotifier + ?Sized + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (trigger_tx, trigger_rx) = mpsc::sync_channel::<()>(1);
        let last_report = Arc::new(Mutex::new(None));

        let cfg = self.clone();
        let report_slot = Arc::clone(&last_report);
        let join = thread::Builder::new()
            .name("restock-sweep".to_string())
            .spawn(move || {
                sweep_loop(cfg, shutdown_rx, trigger_rx, engine, catalog, notifier, report_slot)
            })?;

        Ok(RestockSweepRunnerHandle {
            shutdown: shutdown_tx,
            trigger: trigger_tx,
            last_report,
            join: Some(join),
        })
    }
}

/// Handle for the running sweep (shutdown + trigger hook).
#[derive(Debug)]
pub struct RestockSweepRunnerHandle {
    shutdown: mpsc::Sender<()>,
    trigger: mpsc::SyncSender<()>,
    last_report: Arc<Mutex<Option<SweepReport>>>,
    join: Option<thread::JoinHandle<()>>,
}

impl RestockSweepRunnerHandle {
    /// Request an immediate pass. No-op if one is already pending.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Report of the most recent successful pass.
    pub fn last_report(&self) -> Option<SweepReport> {
        self.last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Gracefully stop the sweep thread.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

fn sweep_loop<C, N>(
    cfg: RestockSweepRunner,
    shutdown_rx: mpsc::Receiver<()>,
    trigger_rx: mpsc::Receiver<()>,
    engine: RestockEngine,
    catalog: Arc<C>,
    notifier: Arc<N>,
    last_report: Arc<Mutex<Option<SweepReport>>>,
) where
    C: InventoryCatalog + ?Sized,
    N: RunningLowNotifier + ?Sized,
{
    info!(
        interval_secs = cfg.interval.as_secs(),
        model = engine.has_model(),
        "restock sweep started"
    );

    let mut next_tick = Instant::now() + cfg.interval;
    let mut pending = true; // run once on startup
    let mut failures: u32 = 0;
    let mut backoff_until: Option<Instant> = None;

    loop {
        // Shutdown has priority.
        match shutdown_rx.try_recv() {
            Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
            Err(mpsc::TryRecvError::Empty) => {}
        }

        let now = Instant::now();
        if now >= next_tick {
            pending = true;
            // Keep a stable cadence even if we were delayed.
            while next_tick <= now {
                next_tick += cfg.interval;
            }
        }

        while trigger_rx.try_recv().is_ok() {
            pending = true;
        }

        if let Some(until) = backoff_until {
            if Instant::now() < until {
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            backoff_until = None;
        }

        if !pending {
            let sleep_for = next_tick
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(250));
            thread::sleep(sleep_for);
            continue;
        }

        pending = false;

        match engine.sweep(&*catalog, &*notifier) {
            Ok(report) => {
                failures = 0;
                info!(
                    evaluated = report.evaluated,
                    failed = report.failed,
                    needs_restock = report.needs_restock.len(),
                    "restock sweep completed"
                );
                *last_report.lock().unwrap_or_else(PoisonError::into_inner) = Some(report);
            }
            Err(e) => {
                warn!(error = %e, attempt = failures + 1, "restock sweep failed");
                failures += 1;
                if failures <= cfg.max_retries {
                    pending = true;
                    backoff_until = Some(Instant::now() + backoff(cfg.base_backoff, failures));
                } else {
                    // Give up until the next scheduled tick.
                    failures = 0;
                }
            }
        }
    }

    info!("restock sweep stopped");
}

fn backoff(base: Duration, attempt: u32) -> Duration {
    // base * 2^(attempt-1), capped at 10s.
    let pow = 1u32 << attempt.saturating_sub(1).min(10);
    let ms = base.as_millis().saturating_mul(pow as u128);
    Duration::from_millis(ms.min(10_000) as u64)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use cafeops_forecast::CatalogError;
    use cafeops_inventory::InventoryItem;

    use super::*;
    use crate::read_model::CafeCatalog;
    use crate::restock::InMemoryNotifier;

    fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if f() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        f()
    }

    fn catalog() -> Arc<CafeCatalog> {
        let catalog = CafeCatalog::new();
        catalog.upsert_item(InventoryItem::new("i1", "MILK", 10, 5)).unwrap();
        catalog.upsert_item(InventoryItem::new("i2", "BEANS", 20, 5)).unwrap();
        Arc::new(catalog)
    }

    #[test]
    fn runs_on_startup_and_on_trigger() {
        let notifier = Arc::new(InMemoryNotifier::new());
        let runner = RestockSweepRunner::with_interval(Duration::from_secs(3600));
        let handle = runner
            .spawn(RestockEngine::without_model(), catalog(), Arc::clone(&notifier))
            .unwrap();

        assert!(wait_until(Duration::from_secs(2), || handle.last_report().is_some()));
        assert_eq!(notifier.all().len(), 1);
        let report = handle.last_report().unwrap();
        assert_eq!(report.evaluated, 2);
        assert_eq!(report.needs_restock.len(), 1);
        assert_eq!(report.needs_restock[0].sku, "MILK");

        handle.trigger();
        assert!(wait_until(Duration::from_secs(2), || notifier.all().len() == 2));

        handle.shutdown();
    }

    struct FlakyCatalog {
        inner: Arc<CafeCatalog>,
        failures_left: AtomicUsize,
    }

    impl InventoryCatalog for FlakyCatalog {
        fn find_by_sku(&self, sku: &str) -> Result<Option<InventoryItem>, CatalogError> {
            self.inner.find_by_sku(sku)
        }

        fn list_items(&self) -> Result<Vec<InventoryItem>, CatalogError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(CatalogError::Unavailable("database offline".into()));
            }
            self.inner.list_items()
        }
    }

    #[test]
    fn catalog_failures_are_retried_with_backoff() {
        let catalog = Arc::new(FlakyCatalog {
            inner: catalog(),
            failures_left: AtomicUsize::new(2),
        });
        let notifier = Arc::new(InMemoryNotifier::new());
        let runner = RestockSweepRunner {
            interval: Duration::from_secs(3600),
            max_retries: 5,
            base_backoff: Duration::from_millis(10),
        };
        let handle = runner
            .spawn(RestockEngine::without_model(), catalog, Arc::clone(&notifier))
            .unwrap();

        assert!(wait_until(Duration::from_secs(3), || handle.last_report().is_some()));
        assert_eq!(notifier.all().len(), 1);

        handle.shutdown();
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        let base = Duration::from_millis(250);
        assert_eq!(backoff(base, 1), Duration::from_millis(250));
        assert_eq!(backoff(base, 3), Duration::from_millis(1_000));
        assert_eq!(backoff(base, 30), Duration::from_millis(10_000));
    }
}
