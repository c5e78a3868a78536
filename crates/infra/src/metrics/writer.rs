//! Buffered, batched metrics writer.
//!
//! `append` is a cheap synchronous enqueue. A background task flushes the
//! buffer when it reaches `max_batch_size` events or when `flush_interval`
//! has elapsed since the last flush attempt. Each flush splits the buffer
//! into store-sized chunks; a chunk that fails to persist goes back to the
//! head of the buffer, in order, and is retried on the next cycle.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use cafeops_events::MetricEvent;

use super::chunk::{plan_chunks, ChunkLimits};
use crate::event_store::MetricsStore;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WriterError {
    #[error("metrics writer is closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    /// Time-based flush threshold, measured from the last flush attempt
    /// (successful or not), so a failing store is retried once per interval.
    pub flush_interval: Duration,
    pub max_batch_size: usize,
    pub max_write_bytes: usize,
    pub max_write_count: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(5),
            max_batch_size: 200,
            max_write_bytes: 1024 * 1024,
            max_write_count: 500,
        }
    }
}

/// Outcome of a single flush call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    /// Events taken from the buffer.
    pub attempted: usize,
    pub persisted: usize,
    /// Events returned to the buffer after a chunk write failed.
    pub failed: usize,
    pub chunks: usize,
    /// Another flush was already running; nothing was done.
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriterStats {
    pub pending: usize,
    pub flushed_total: u64,
    pub failed_chunks_total: u64,
    pub flushes: u64,
    pub last_flush_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Counters {
    flushed_total: u64,
    failed_chunks_total: u64,
    flushes: u64,
    last_flush_at: Option<DateTime<Utc>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared<S> {
    store: S,
    config: WriterConfig,
    pending: Mutex<VecDeque<MetricEvent>>,
    closed: AtomicBool,
    /// Held for the duration of a flush; flushes never overlap.
    flush_gate: tokio::sync::Mutex<()>,
    wake: Notify,
    stop: Notify,
    last_attempt: Mutex<Instant>,
    counters: Mutex<Counters>,
}

impl<S: MetricsStore> Shared<S> {
    fn limits(&self) -> ChunkLimits {
        ChunkLimits::new(self.config.max_write_bytes, self.config.max_write_count)
    }

    fn over_batch_size(&self) -> bool {
        lock(&self.pending).len() >= self.config.max_batch_size
    }

    async fn try_flush(&self) -> FlushReport {
        match self.flush_gate.try_lock() {
            Ok(_guard) => self.flush_locked().await,
            Err(_) => {
                debug!("flush already in progress; skipping");
                FlushReport {
                    skipped: true,
                    ..FlushReport::default()
                }
            }
        }
    }

    /// Waits for any in-flight flush, then flushes.
    async fn drain(&self) -> FlushReport {
        let _guard = self.flush_gate.lock().await;
        self.flush_locked().await
    }

    async fn flush_locked(&self) -> FlushReport {
        let batch: Vec<MetricEvent> = lock(&self.pending).drain(..).collect();
        *lock(&self.last_attempt) = Instant::now();

        if batch.is_empty() {
            return FlushReport::default();
        }

        let sizes: Vec<usize> = batch.iter().map(encoded_size).collect();
        let plan = plan_chunks(&sizes, self.limits());

        let mut report = FlushReport {
            attempted: batch.len(),
            chunks: plan.len(),
            ..FlushReport::default()
        };
        let mut failed: Vec<MetricEvent> = Vec::new();
        let mut failed_chunks = 0u64;

        for range in plan {
            let chunk = &batch[range];
            match self.store.insert_batch(chunk).await {
                Ok(()) => report.persisted += chunk.len(),
                Err(e) => {
                    failed_chunks += 1;
                    warn!(events = chunk.len(), error = %e, "metrics chunk write failed");
                    failed.extend_from_slice(chunk);
                }
            }
        }

        report.failed = failed.len();
        if !failed.is_empty() {
            let backlog = {
                let mut pending = lock(&self.pending);
                for event in failed.into_iter().rev() {
                    pending.push_front(event);
                }
                pending.len()
            };
            warn!(
                requeued = report.failed,
                backlog, "metrics events re-buffered for retry"
            );
        }

        {
            let mut counters = lock(&self.counters);
            counters.flushes += 1;
            counters.flushed_total += report.persisted as u64;
            counters.failed_chunks_total += failed_chunks;
            if report.persisted > 0 {
                counters.last_flush_at = Some(Utc::now());
            }
        }

        info!(
            events = report.attempted,
            persisted = report.persisted,
            chunks = report.chunks,
            failed = report.failed,
            "metrics flush"
        );
        report
    }
}

/// Serialized size used for chunk planning.
///
/// An event that cannot be encoded counts as zero bytes; the store will
/// reject it, so the cause is logged here.
fn encoded_size(event: &MetricEvent) -> usize {
    match serde_json::to_vec(event) {
        Ok(bytes) => bytes.len(),
        Err(e) => {
            warn!(event_type = %event.kind(), error = %e, "metrics event could not be serialized");
            0
        }
    }
}

/// Asynchronous buffered sink for [`MetricEvent`]s.
pub struct MetricsWriter<S> {
    shared: Arc<Shared<S>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<S> MetricsWriter<S>
where
    S: MetricsStore + 'static,
{
    pub fn new(store: S, config: WriterConfig) -> Self {
        let config = WriterConfig {
            max_batch_size: config.max_batch_size.max(1),
            ..config
        };
        Self {
            shared: Arc::new(Shared {
                store,
                config,
                pending: Mutex::new(VecDeque::new()),
                closed: AtomicBool::new(false),
                flush_gate: tokio::sync::Mutex::new(()),
                wake: Notify::new(),
                stop: Notify::new(),
                last_attempt: Mutex::new(Instant::now()),
                counters: Mutex::new(Counters::default()),
            }),
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.shared.config
    }

    /// Spawn the background flush loop on the current tokio runtime.
    ///
    /// No-op if already started or closed.
    pub fn start(&self) {
        if self.shared.closed.load(Ordering::Acquire) {
            return;
        }
        let mut task = lock(&self.task);
        if task.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        *task = Some(tokio::spawn(flush_loop(shared)));
    }

    /// Enqueue an event. Never performs I/O.
    pub fn append(&self, event: MetricEvent) -> Result<(), WriterError> {
        let len = {
            let mut pending = lock(&self.shared.pending);
            if self.shared.closed.load(Ordering::Acquire) {
                return Err(WriterError::Closed);
            }
            pending.push_back(event);
            pending.len()
        };
        if len >= self.shared.config.max_batch_size {
            self.shared.wake.notify_one();
        }
        Ok(())
    }

    /// Persist everything currently buffered.
    ///
    /// Returns a skipped report if a flush is already running; events
    /// appended meanwhile are picked up by the next cycle.
    pub async fn flush(&self) -> FlushReport {
        self.shared.try_flush().await
    }

    /// Close the writer, stop the background loop and flush one last time.
    pub async fn shutdown(&self) -> FlushReport {
        {
            let _pending = lock(&self.shared.pending);
            self.shared.closed.store(true, Ordering::Release);
        }
        self.shared.stop.notify_one();

        let task = lock(&self.task).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "metrics flush loop ended abnormally");
            }
        }

        let report = self.shared.drain().await;
        let remaining = lock(&self.shared.pending).len();
        if remaining > 0 {
            warn!(remaining, "metrics writer closed with unpersisted events");
        }
        info!(persisted = report.persisted, "metrics writer stopped");
        report
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> WriterStats {
        let pending = lock(&self.shared.pending).len();
        let counters = lock(&self.shared.counters);
        WriterStats {
            pending,
            flushed_total: counters.flushed_total,
            failed_chunks_total: counters.failed_chunks_total,
            flushes: counters.flushes,
            last_flush_at: counters.last_flush_at,
        }
    }

    #[cfg(test)]
    fn pending_snapshot(&self) -> Vec<MetricEvent> {
        lock(&self.shared.pending).iter().cloned().collect()
    }
}

async fn flush_loop<S: MetricsStore>(shared: Arc<Shared<S>>) {
    info!(
        interval_ms = shared.config.flush_interval.as_millis() as u64,
        max_batch_size = shared.config.max_batch_size,
        "metrics writer started"
    );

    'run: loop {
        let deadline = *lock(&shared.last_attempt) + shared.config.flush_interval;
        tokio::select! {
            biased;
            _ = shared.stop.notified() => break 'run,
            _ = shared.wake.notified() => {}
            _ = tokio::time::sleep_until(deadline) => {}
        }
        // A skipped pass consumed the wake-up; go again while over the batch size.
        while shared.try_flush().await.skipped && shared.over_batch_size() {
            tokio::select! {
                biased;
                _ = shared.stop.notified() => break 'run,
                _ = shared.flush_gate.lock() => {}
            }
        }
    }

    debug!("metrics flush loop exited");
}
