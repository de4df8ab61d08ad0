//! Execution engine for large uploads.
//!
//! This module sits "above" [`crate::filter`] and [`crate::processing`] and provides:
//!
//! - Parallel (chunked) filtering on a dedicated rayon pool, with output identical to
//!   [`crate::filter::apply_filters`]
//! - Pipeline runs that report every step (applied, skipped, degraded rows)
//! - Real-time metrics + observer hooks for monitoring

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{EngineError, EngineResult};
use crate::filter::{AdvancedFilter, CompiledFilters, filtered_dataset};
use crate::processing::{DataTransformation, StepStatus, apply_step, transformed_dataset};
use crate::types::{DataSet, Value};

pub use observer::{ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver};

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    pub chunk_size: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            num_threads: None,
            chunk_size: 4_096,
        }
    }
}

/// A configurable execution engine for in-memory [`DataSet`] pipelines.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`EngineError::InvalidInput`] if `chunk_size == 0`, `num_threads == Some(0)`,
    /// or the thread pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> EngineResult<Self> {
        if opts.chunk_size == 0 {
            return Err(EngineError::invalid_input("chunk_size must be > 0"));
        }
        if opts.num_threads == Some(0) {
            return Err(EngineError::invalid_input("num_threads must be > 0 when set"));
        }

        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| EngineError::invalid_input(format!("failed to build thread pool: {e}")))?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Applies `filters` to `dataset` in parallel chunks.
    ///
    /// Chunks are evaluated concurrently but reassembled in input order, so the result equals
    /// [`crate::filter::apply_filters`] on the same input.
    pub fn filter_parallel(&self, dataset: &DataSet, filters: &[AdvancedFilter]) -> EngineResult<DataSet> {
        dataset.validate()?;
        let compiled = CompiledFilters::compile(&dataset.schema, filters);

        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let chunk_size = self.opts.chunk_size;
        let per_chunk: Vec<Vec<Vec<Value>>> = self.pool.install(|| {
            dataset
                .rows
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(i, chunk)| {
                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_row: i * chunk_size,
                        row_count: chunk.len(),
                    });

                    let out: Vec<Vec<Value>> = chunk
                        .iter()
                        .filter(|row| compiled.accepts(row))
                        .cloned()
                        .collect();

                    self.metrics.on_rows_processed(chunk.len());
                    self.emit(ExecutionEvent::ChunkFinished {
                        output_rows: out.len(),
                    });
                    self.metrics.on_chunk_end();
                    out
                })
                .collect()
        });

        let rows = per_chunk.into_iter().flatten().collect();
        let out = filtered_dataset(dataset, rows);
        self.finish_run(start);
        Ok(out)
    }

    /// Runs `steps` in order, emitting a start event and a finished/skipped event per step.
    ///
    /// The result equals [`crate::processing::apply_transformations`] on the same input.
    pub fn run_pipeline(&self, dataset: &DataSet, steps: &[DataTransformation]) -> EngineResult<DataSet> {
        dataset.validate()?;

        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let mut current = dataset.clone();
        for step in steps {
            self.emit(ExecutionEvent::StepStarted {
                id: step.id.clone(),
                kind: step.kind,
            });
            let rows_in = current.row_count();
            let output = apply_step(&current, step);
            self.metrics.on_rows_processed(rows_in);

            match output.status {
                StepStatus::Applied { degraded_rows } => {
                    self.metrics.on_step_applied(degraded_rows);
                    self.emit(ExecutionEvent::StepFinished {
                        id: step.id.clone(),
                        output_rows: output.dataset.row_count(),
                        degraded_rows,
                    });
                }
                StepStatus::Skipped { reason } => {
                    self.metrics.on_step_skipped();
                    self.emit(ExecutionEvent::StepSkipped {
                        id: step.id.clone(),
                        reason,
                    });
                }
            }
            current = output.dataset;
        }

        self.finish_run(start);
        Ok(transformed_dataset(current))
    }

    fn finish_run(&self, start: Instant) {
        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}
