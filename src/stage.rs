use crate::error::{PipelineError, Result};
use crate::latch::Latch;
use crate::metrics::StageCounters;
use crate::queue::HandoffQueue;
use crate::transform::Transform;
use log::{error, info};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// The in-band sentinel. It flows through every queue like any other item
/// and instructs each stage to terminate after forwarding it.
pub const END_TOKEN: &str = "<END>";

/// Hand-off callable installed by [`StageInstance::attach`]: the next
/// stage's `place_work`, or any other sink accepting one string.
pub type WorkHook = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// State shared between a stage's owner and its worker thread.
struct StageShared {
    name: String,
    queue: HandoffQueue,
    downstream: Mutex<Option<WorkHook>>,
    /// Signaled by the worker as its last action.
    done: Latch,
    counters: StageCounters,
}

impl StageShared {
    fn place_work(&self, item: &str) -> Result<()> {
        if self.done.is_signaled() {
            return Err(PipelineError::StageFinished(self.name.clone()));
        }
        self.queue.put(item.to_owned());
        if item == END_TOKEN {
            self.queue.signal_finished();
        }
        Ok(())
    }

    fn downstream(&self) -> Option<WorkHook> {
        self.downstream.lock().clone()
    }
}

/// The consumer loop run by each stage's dedicated worker thread.
///
/// The worker is the sole consumer of the stage's queue. `None` from the
/// queue is end-of-stream; the sentinel is forwarded downstream before the
/// loop exits so the next stage drains in pipeline order. Transform and
/// hand-off failures are per-item: logged, counted, skipped.
fn worker_loop(shared: Arc<StageShared>, mut transform: Box<dyn Transform>) {
    info!("[{}] worker started", shared.name);
    while let Some(item) = shared.queue.get() {
        if item == END_TOKEN {
            if let Some(next) = shared.downstream() {
                if let Err(err) = next(END_TOKEN) {
                    error!("[{}] failed to forward end token: {err}", shared.name);
                }
            }
            break;
        }

        let output = match transform.apply(item) {
            Ok(output) => output,
            Err(err) => {
                error!("[{}] {err}", shared.name);
                shared.counters.record_dropped();
                continue;
            }
        };

        match shared.downstream() {
            Some(next) => {
                if let Err(err) = next(&output) {
                    error!("[{}] downstream rejected item: {err}", shared.name);
                    shared.counters.record_dropped();
                } else {
                    shared.counters.record_processed();
                }
            }
            None => {
                // Terminal stage: emit to stdout, one line per item.
                let mut stdout = io::stdout().lock();
                if let Err(err) = writeln!(stdout, "{output}") {
                    error!("[{}] failed to write output: {err}", shared.name);
                    shared.counters.record_dropped();
                } else {
                    shared.counters.record_processed();
                }
            }
        }
    }
    info!("[{}] worker exiting", shared.name);
    shared.done.signal();
}

/// One stage of the pipeline: a bounded handoff queue, the worker thread
/// draining it, the transform the worker applies, and the downstream hook
/// transformed items are handed to.
///
/// Lifecycle: [`new`](StageInstance::new) → [`init`](StageInstance::init)
/// (constructs the queue, spawns the worker) → [`attach`](StageInstance::attach)
/// → work flows via [`place_work`](StageInstance::place_work) →
/// [`wait_finished`](StageInstance::wait_finished) →
/// [`fini`](StageInstance::fini) (joins the worker).
pub struct StageInstance {
    name: String,
    transform: Option<Box<dyn Transform>>,
    shared: Option<Arc<StageShared>>,
    worker: Option<JoinHandle<()>>,
}

impl StageInstance {
    /// Create an uninitialized stage that will apply `transform`.
    pub fn new(name: impl Into<String>, transform: Box<dyn Transform>) -> Self {
        Self {
            name: name.into(),
            transform: Some(transform),
            shared: None,
            worker: None,
        }
    }

    /// Construct the stage's queue and spawn its worker thread.
    ///
    /// Fails if `queue_size` is zero, if the stage is already initialized,
    /// or if the worker thread cannot be spawned.
    pub fn init(&mut self, queue_size: usize) -> Result<()> {
        if self.shared.is_some() {
            return Err(PipelineError::AlreadyInitialized(self.name.clone()));
        }
        let queue = HandoffQueue::with_capacity(queue_size)?;
        let transform = self
            .transform
            .take()
            .ok_or_else(|| PipelineError::AlreadyInitialized(self.name.clone()))?;

        let shared = Arc::new(StageShared {
            name: self.name.clone(),
            queue,
            downstream: Mutex::new(None),
            done: Latch::new(),
            counters: StageCounters::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(format!("stage-{}", self.name))
            .spawn(move || worker_loop(worker_shared, transform))
            .map_err(|source| PipelineError::WorkerSpawn {
                name: self.name.clone(),
                source,
            })?;

        self.shared = Some(shared);
        self.worker = Some(worker);
        Ok(())
    }

    fn shared(&self) -> Result<&Arc<StageShared>> {
        self.shared
            .as_ref()
            .ok_or_else(|| PipelineError::NotInitialized(self.name.clone()))
    }

    /// Enqueue a copy of `item`, blocking while the stage's queue is full.
    ///
    /// Enqueuing the sentinel additionally latches the queue's finished
    /// condition, so the worker drains the remaining items and then
    /// observes end-of-stream. Returns an error once the worker has
    /// finished.
    pub fn place_work(&self, item: &str) -> Result<()> {
        self.shared()?.place_work(item)
    }

    /// Install the downstream hook, or `None` to make this the terminal
    /// stage (its output then goes to stdout).
    pub fn attach(&self, downstream: Option<WorkHook>) -> Result<()> {
        *self.shared()?.downstream.lock() = downstream;
        Ok(())
    }

    /// A hook handing items to this stage, for attachment upstream.
    pub fn work_hook(&self) -> Result<WorkHook> {
        let shared = Arc::clone(self.shared()?);
        Ok(Arc::new(move |item: &str| shared.place_work(item)))
    }

    /// Block until the queue's finished condition is latched and the worker
    /// has run to completion.
    pub fn wait_finished(&self) -> Result<()> {
        let shared = self.shared()?;
        shared.queue.wait_finished();
        shared.done.wait();
        Ok(())
    }

    /// Signal the queue finished (idempotent) and join the worker thread.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn fini(&mut self) -> Result<()> {
        let shared = Arc::clone(self.shared()?);
        shared.queue.signal_finished();
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| PipelineError::WorkerPanic(self.name.clone()))?;
            info!("[{}] finished ({})", self.name, shared.counters.format());
        }
        Ok(())
    }

    /// The stage's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of items currently waiting in the stage's queue.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.shared()?.queue.len())
    }

    /// Items this stage has processed and dropped so far.
    pub fn counters(&self) -> Result<(u64, u64)> {
        let shared = self.shared()?;
        Ok((
            shared.counters.total_processed(),
            shared.counters.total_dropped(),
        ))
    }
}

impl Drop for StageInstance {
    fn drop(&mut self) {
        // A stage dropped without fini must not leave its worker parked on
        // an empty queue forever.
        if let Some(shared) = &self.shared {
            shared.queue.signal_finished();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Uppercaser;
    use parking_lot::Mutex as PlMutex;

    /// Hook that records every item handed to it.
    fn capture_hook() -> (WorkHook, Arc<PlMutex<Vec<String>>>) {
        let store = Arc::new(PlMutex::new(Vec::new()));
        let sink = Arc::clone(&store);
        let hook: WorkHook = Arc::new(move |item: &str| {
            sink.lock().push(item.to_string());
            Ok(())
        });
        (hook, store)
    }

    struct FailOnBad;

    impl Transform for FailOnBad {
        fn apply(&mut self, input: String) -> Result<String> {
            if input == "bad" {
                Err(PipelineError::Transform("bad item".to_string()))
            } else {
                Ok(input)
            }
        }

        fn name(&self) -> &str {
            "fail_on_bad"
        }
    }

    #[test]
    fn test_init_rejects_zero_queue_size() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        assert!(matches!(
            stage.init(0),
            Err(PipelineError::InvalidCapacity)
        ));
        // The stage is still usable after the failed init.
        assert!(stage.init(4).is_ok());
        stage.fini().unwrap();
    }

    #[test]
    fn test_double_init_rejected() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        assert!(matches!(
            stage.init(4),
            Err(PipelineError::AlreadyInitialized(_))
        ));
        stage.fini().unwrap();
    }

    #[test]
    fn test_place_work_before_init_rejected() {
        let stage = StageInstance::new("upper", Box::new(Uppercaser));
        assert!(matches!(
            stage.place_work("hello"),
            Err(PipelineError::NotInitialized(_))
        ));
    }

    #[test]
    fn test_worker_transforms_and_forwards_sentinel() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        let (hook, captured) = capture_hook();
        stage.attach(Some(hook)).unwrap();

        stage.place_work("hello").unwrap();
        stage.place_work("world").unwrap();
        stage.place_work(END_TOKEN).unwrap();
        stage.wait_finished().unwrap();

        assert_eq!(*captured.lock(), vec!["HELLO", "WORLD", END_TOKEN]);
        assert_eq!(stage.pending().unwrap(), 0);
        stage.fini().unwrap();
    }

    #[test]
    fn test_place_work_after_finish_rejected() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        let (hook, _captured) = capture_hook();
        stage.attach(Some(hook)).unwrap();

        stage.place_work(END_TOKEN).unwrap();
        stage.wait_finished().unwrap();

        assert!(matches!(
            stage.place_work("late"),
            Err(PipelineError::StageFinished(_))
        ));
        stage.fini().unwrap();
    }

    #[test]
    fn test_transform_failure_skips_item_and_continues() {
        let mut stage = StageInstance::new("fail_on_bad", Box::new(FailOnBad));
        stage.init(4).unwrap();
        let (hook, captured) = capture_hook();
        stage.attach(Some(hook)).unwrap();

        stage.place_work("good").unwrap();
        stage.place_work("bad").unwrap();
        stage.place_work("also good").unwrap();
        stage.place_work(END_TOKEN).unwrap();
        stage.wait_finished().unwrap();

        assert_eq!(*captured.lock(), vec!["good", "also good", END_TOKEN]);
        let (processed, dropped) = stage.counters().unwrap();
        assert_eq!(processed, 2);
        assert_eq!(dropped, 1);
        stage.fini().unwrap();
    }

    #[test]
    fn test_fini_without_sentinel_stops_worker() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        let (hook, captured) = capture_hook();
        stage.attach(Some(hook)).unwrap();

        // No sentinel: fini alone must unblock and join the worker.
        stage.fini().unwrap();
        assert!(captured.lock().is_empty());
    }

    #[test]
    fn test_fini_idempotent() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        stage.attach(None).unwrap();
        stage.place_work(END_TOKEN).unwrap();
        stage.wait_finished().unwrap();
        stage.fini().unwrap();
        stage.fini().unwrap();
    }

    #[test]
    fn test_drop_without_fini_does_not_hang() {
        let mut stage = StageInstance::new("upper", Box::new(Uppercaser));
        stage.init(4).unwrap();
        stage.attach(None).unwrap();
        drop(stage);
    }
}
