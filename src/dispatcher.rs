//! Bounded worker pool fanning detection tasks out over a batch
//!
//! The pool is long-lived and fixed-size: submitting N images never
//! spawns threads, it queues N tasks over the existing workers. Tasks
//! complete in any order; every in-flight task carries its submission
//! index and results are written into a pre-sized slot table, so the
//! output order always equals submission order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::error::{DetectError, Result};
use crate::registry::ModelRegistry;
use crate::task::DetectionTask;
use crate::types::{BatchResult, TaskInput, TaskResult};

/// Configuration for the dispatcher worker pool
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound on concurrently running backend invocations
    pub concurrency_limit: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            concurrency_limit: 4, // Each invocation may hold a full model forward pass
        }
    }
}

/// A command to be processed by the worker pool
enum PoolCommand {
    /// Run one detection task, reporting under its submission index
    Run {
        index: usize,
        input: TaskInput,
        result_tx: Sender<(usize, TaskResult)>,
    },
    /// Shutdown the worker
    Shutdown,
}

/// Long-lived bounded worker pool for batch detection
pub struct BatchDispatcher {
    workers: Vec<Worker>,
    command_tx: Sender<PoolCommand>,
    registry: Arc<ModelRegistry>,
}

impl BatchDispatcher {
    /// Create a dispatcher over `registry` with a fixed-size worker pool
    ///
    /// A limit of 0 is treated as 1.
    pub fn new(registry: Arc<ModelRegistry>, config: DispatcherConfig) -> Result<Self> {
        let concurrency = config.concurrency_limit.max(1);
        let (command_tx, command_rx) = channel::<PoolCommand>();
        let command_rx = Arc::new(Mutex::new(command_rx));

        let mut workers = Vec::with_capacity(concurrency);
        for id in 0..concurrency {
            workers.push(Worker::new(
                id,
                Arc::clone(&command_rx),
                Arc::clone(&registry),
            )?);
        }
        log::info!("Batch dispatcher started with {} worker(s)", concurrency);

        Ok(BatchDispatcher {
            workers,
            command_tx,
            registry,
        })
    }

    /// Run every task to completion and aggregate one result per image
    ///
    /// Usage errors (empty batch, empty registry, unknown model id) fail
    /// the whole call before any task starts. Per-task failures never do;
    /// they surface as `TaskResult.error` on the affected entry only.
    /// The returned results are in submission order.
    pub fn run_batch(&self, tasks: Vec<TaskInput>) -> Result<BatchResult> {
        if self.registry.is_empty() {
            return Err(DetectError::NoModelsLoaded);
        }
        if tasks.is_empty() {
            return Err(DetectError::NoImages);
        }
        for task in &tasks {
            if !self.registry.contains(&task.model) {
                return Err(DetectError::UnknownModel(task.model.clone()));
            }
        }

        // Batches are submitted against one model in practice; report the
        // first task's resolved display name.
        let model_used = self
            .registry
            .get(&tasks[0].model)
            .map(|entry| entry.info.name.clone())
            .unwrap_or_else(|| tasks[0].model.clone());

        let total = tasks.len();
        let names: Vec<String> = tasks.iter().map(|t| t.name.clone()).collect();
        log::info!("Dispatching batch of {} image(s) ({})", total, model_used);

        let (result_tx, result_rx) = channel::<(usize, TaskResult)>();
        for (index, input) in tasks.into_iter().enumerate() {
            self.command_tx
                .send(PoolCommand::Run {
                    index,
                    input,
                    result_tx: result_tx.clone(),
                })
                .map_err(|_| DetectError::pool("worker pool is no longer accepting tasks"))?;
        }
        // Keep only the in-flight clones so recv can observe pool death.
        drop(result_tx);

        let mut slots: Vec<Option<TaskResult>> = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        let mut pending = total;
        while pending > 0 {
            match result_rx.recv() {
                Ok((index, result)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        if slot.replace(result).is_none() {
                            pending -= 1;
                        }
                    }
                }
                Err(_) => break,
            }
        }

        // A slot can only be empty if its worker died mid-task; the image
        // still gets exactly one result.
        let results: Vec<TaskResult> = slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| {
                slot.unwrap_or_else(|| {
                    TaskResult::failed(name, "detection failed: worker terminated unexpectedly")
                })
            })
            .collect();

        let batch = BatchResult::new(results, model_used);
        log::info!(
            "Batch complete: {} processed, {} failed",
            batch.total_processed,
            batch.failed_count()
        );
        Ok(batch)
    }

    /// Detect on a single image
    ///
    /// The degenerate batch of one, routed through the same pool so the
    /// single and batch paths share validation, normalization and the
    /// scratch lifecycle.
    pub fn detect_single(&self, input: TaskInput) -> Result<TaskResult> {
        let mut batch = self.run_batch(vec![input])?;
        batch
            .results
            .pop()
            .ok_or_else(|| DetectError::pool("batch produced no result"))
    }
}

impl Drop for BatchDispatcher {
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.command_tx.send(PoolCommand::Shutdown);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                thread.join().ok();
            }
        }
    }
}

/// Worker thread running detection tasks off the shared queue
struct Worker {
    #[allow(dead_code)]
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(
        id: usize,
        command_rx: Arc<Mutex<Receiver<PoolCommand>>>,
        registry: Arc<ModelRegistry>,
    ) -> Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("detect-worker-{}", id))
            .spawn(move || {
                loop {
                    // Lock and receive command
                    let command = {
                        let rx = match command_rx.lock() {
                            Ok(rx) => rx,
                            Err(_) => break,
                        };
                        rx.recv()
                    };

                    match command {
                        Ok(PoolCommand::Run {
                            index,
                            input,
                            result_tx,
                        }) => {
                            let name = input.name.clone();
                            let task = DetectionTask::new(input);
                            // A panicking backend costs its task, not the
                            // pool: containment stays per-image.
                            let result =
                                panic::catch_unwind(AssertUnwindSafe(|| task.execute(&registry)))
                                    .unwrap_or_else(|_| {
                                        log::error!("❌ backend panicked on {}", name);
                                        TaskResult::failed(
                                            name,
                                            "detection failed: backend panicked",
                                        )
                                    });
                            let _ = result_tx.send((index, result));
                        }
                        Ok(PoolCommand::Shutdown) | Err(_) => break,
                    }
                }
            })
            .map_err(|e| DetectError::pool(format!("failed to spawn worker: {}", e)))?;

        Ok(Worker {
            id,
            thread: Some(thread),
        })
    }
}
