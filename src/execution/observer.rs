use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::processing::TransformationKind;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted,
    ChunkStarted { start_row: usize, row_count: usize },
    ChunkFinished { output_rows: usize },
    StepStarted { id: String, kind: TransformationKind },
    StepFinished { id: String, output_rows: usize, degraded_rows: usize },
    StepSkipped { id: String, reason: String },
    RunFinished {
        elapsed: Duration,
        metrics: ExecutionMetricsSnapshot,
    },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::StepSkipped { id, reason } => eprintln!("[exec][skip] step={id} reason={reason}"),
            ExecutionEvent::RunFinished { metrics, .. } => eprintln!("[exec][done] {metrics}"),
            other => eprintln!("[exec] {other:?}"),
        }
    }
}

/// Real-time metrics for an execution run.
///
/// The engine updates these counters during execution; callers can snapshot them at any time.
/// Counters reset at the start of every run.
#[derive(Debug)]
pub struct ExecutionMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,

    rows_processed: AtomicU64,
    chunks_started: AtomicU64,
    chunks_finished: AtomicU64,
    active_chunks: AtomicUsize,
    max_active_chunks: AtomicUsize,

    steps_applied: AtomicU64,
    steps_skipped: AtomicU64,
    degraded_rows: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            rows_processed: AtomicU64::new(0),
            chunks_started: AtomicU64::new(0),
            chunks_finished: AtomicU64::new(0),
            active_chunks: AtomicUsize::new(0),
            max_active_chunks: AtomicUsize::new(0),
            steps_applied: AtomicU64::new(0),
            steps_skipped: AtomicU64::new(0),
            degraded_rows: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        self.run_id.fetch_add(1, Ordering::SeqCst);
        for counter in [
            &self.elapsed_ns,
            &self.rows_processed,
            &self.chunks_started,
            &self.chunks_finished,
            &self.steps_applied,
            &self.steps_skipped,
            &self.degraded_rows,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
        self.active_chunks.store(0, Ordering::SeqCst);
        self.max_active_chunks.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_rows_processed(&self, n: usize) {
        self.rows_processed.fetch_add(n as u64, Ordering::SeqCst);
    }

    pub fn on_chunk_start(&self) {
        self.chunks_started.fetch_add(1, Ordering::SeqCst);
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_chunks.fetch_max(now, Ordering::SeqCst);
    }

    pub fn on_chunk_end(&self) {
        self.chunks_finished.fetch_add(1, Ordering::SeqCst);
        self.active_chunks.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn on_step_applied(&self, degraded_rows: usize) {
        self.steps_applied.fetch_add(1, Ordering::SeqCst);
        self.degraded_rows.fetch_add(degraded_rows as u64, Ordering::SeqCst);
    }

    pub fn on_step_skipped(&self) {
        self.steps_skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        ExecutionMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed: (elapsed_ns > 0).then(|| Duration::from_nanos(elapsed_ns)),
            rows_processed: self.rows_processed.load(Ordering::SeqCst),
            chunks_started: self.chunks_started.load(Ordering::SeqCst),
            chunks_finished: self.chunks_finished.load(Ordering::SeqCst),
            max_active_chunks: self.max_active_chunks.load(Ordering::SeqCst),
            steps_applied: self.steps_applied.load(Ordering::SeqCst),
            steps_skipped: self.steps_skipped.load(Ordering::SeqCst),
            degraded_rows: self.degraded_rows.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub rows_processed: u64,
    pub chunks_started: u64,
    pub chunks_finished: u64,
    pub max_active_chunks: usize,
    pub steps_applied: u64,
    pub steps_skipped: u64,
    pub degraded_rows: u64,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, rows_processed={}, chunks={}/{}, max_active_chunks={}, steps={} applied/{} skipped, degraded_rows={}, elapsed={:?}",
            self.run_id,
            self.rows_processed,
            self.chunks_finished,
            self.chunks_started,
            self.max_active_chunks,
            self.steps_applied,
            self.steps_skipped,
            self.degraded_rows,
            self.elapsed
        )
    }
}
