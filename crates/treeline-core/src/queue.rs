//! Serialized task queue enforcing single-flight execution order.
//!
//! All oracle calls are funneled through one of these queues so the oracle
//! never receives more than one concurrent request from this process. Tasks
//! start in the order they were added and the next task only starts after
//! the previous one has settled, success or failure.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tracing::debug;

/// Observable queue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// No task is executing and the queue is empty.
    Idle,
    /// A drain loop is executing tasks.
    Running,
}

/// Errors surfaced through a [`TaskHandle`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The task was discarded by [`SerialTaskQueue::clear`] before it
    /// started. Abandonment is an explicit outcome of clearing, not a bug.
    #[error("task was discarded before it started")]
    Abandoned,

    /// The queue was disposed and no longer accepts tasks.
    #[error("queue has been disposed")]
    Disposed,
}

/// Handle to a queued task's eventual outcome.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task to settle.
    ///
    /// Resolves with [`QueueError::Abandoned`] if the task was cleared
    /// before it ran.
    pub async fn join(self) -> Result<T, QueueError> {
        self.rx.await.map_err(|_| QueueError::Abandoned)
    }
}

/// A queued unit of work, already bound to its result channel.
type BoxedTask = BoxFuture<'static, ()>;

struct QueueCore {
    tasks: VecDeque<BoxedTask>,
    draining: bool,
    disposed: bool,
}

struct Inner {
    core: Mutex<QueueCore>,
    state_tx: watch::Sender<QueueState>,
}

/// FIFO queue that executes async tasks one at a time.
///
/// Cloning the queue is cheap and all clones share the same FIFO order.
#[derive(Clone)]
pub struct SerialTaskQueue {
    inner: Arc<Inner>,
}

impl SerialTaskQueue {
    /// Create a new idle queue.
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(QueueState::Idle);
        Self {
            inner: Arc::new(Inner {
                core: Mutex::new(QueueCore {
                    tasks: VecDeque::new(),
                    draining: false,
                    disposed: false,
                }),
                state_tx,
            }),
        }
    }

    /// Enqueue a task and return a handle to its outcome.
    ///
    /// If the queue was empty, draining begins immediately on a spawned
    /// task. The returned handle settles with the task's output once it has
    /// run; a failing task does not stop the drain.
    pub fn add<T, F, Fut>(&self, task: F) -> Result<TaskHandle<T>, QueueError>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let wrapped: BoxedTask = async move {
            // The receiver may have been dropped; the task still runs.
            let _ = tx.send(task().await);
        }
        .boxed();

        let start_drain = {
            let mut core = self.inner.core.lock();
            if core.disposed {
                return Err(QueueError::Disposed);
            }
            core.tasks.push_back(wrapped);
            if core.draining {
                false
            } else {
                core.draining = true;
                true
            }
        };

        if start_drain {
            tokio::spawn(Self::drain(Arc::clone(&self.inner)));
        }

        Ok(TaskHandle { rx })
    }

    /// Discard all not-yet-started tasks and force the state back to
    /// [`QueueState::Idle`].
    ///
    /// Handles of discarded tasks resolve with [`QueueError::Abandoned`].
    /// A task already in flight is not interrupted.
    pub fn clear(&self) {
        let discarded = {
            let mut core = self.inner.core.lock();
            core.tasks.drain(..).count()
        };
        Self::set_state(&self.inner.state_tx, QueueState::Idle);
        if discarded > 0 {
            debug!("Cleared {} queued tasks", discarded);
        }
    }

    /// Clear the queue and make it permanently unusable.
    ///
    /// Subsequent [`add`](Self::add) calls fail with
    /// [`QueueError::Disposed`]. A task already in flight runs to
    /// completion.
    pub fn dispose(&self) {
        {
            let mut core = self.inner.core.lock();
            core.tasks.clear();
            core.disposed = true;
        }
        Self::set_state(&self.inner.state_tx, QueueState::Idle);
    }

    /// Current queue state.
    pub fn state(&self) -> QueueState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribe to state changes.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<QueueState> {
        self.inner.state_tx.subscribe()
    }

    /// Number of tasks waiting to start (excludes any task in flight).
    pub fn pending(&self) -> usize {
        self.inner.core.lock().tasks.len()
    }

    fn set_state(tx: &watch::Sender<QueueState>, state: QueueState) {
        tx.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    async fn drain(inner: Arc<Inner>) {
        loop {
            let task = {
                let mut core = inner.core.lock();
                match core.tasks.pop_front() {
                    Some(task) => task,
                    None => {
                        core.draining = false;
                        Self::set_state(&inner.state_tx, QueueState::Idle);
                        return;
                    }
                }
            };
            Self::set_state(&inner.state_tx, QueueState::Running);
            task.await;
        }
    }
}

impl Default for SerialTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn tasks_start_in_add_order() {
        let queue = SerialTaskQueue::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5u32 {
            let log = Arc::clone(&log);
            // Earlier tasks sleep longer; FIFO order must still hold.
            let delay = Duration::from_millis(u64::from(40 - i * 8));
            let handle = queue
                .add(move || async move {
                    log.lock().push(i);
                    sleep(delay).await;
                    i
                })
                .unwrap();
            handles.push(handle);
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().await.unwrap(), i as u32);
        }
        assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn at_most_one_task_in_flight() {
        let queue = SerialTaskQueue::new();
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let active = Arc::clone(&active);
            let max_seen = Arc::clone(&max_seen);
            let handle = queue
                .add(move || async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
                .unwrap();
            handles.push(handle);
        }

        for handle in handles {
            handle.join().await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn state_returns_to_idle_after_drain() {
        let queue = SerialTaskQueue::new();
        let mut rx = queue.subscribe();

        let handle = queue
            .add(|| async {
                sleep(Duration::from_millis(5)).await;
            })
            .unwrap();
        handle.join().await.unwrap();

        rx.wait_for(|state| *state == QueueState::Idle)
            .await
            .unwrap();
        assert_eq!(queue.state(), QueueState::Idle);
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn failed_task_does_not_stop_drain() {
        let queue = SerialTaskQueue::new();

        let failing = queue
            .add(|| async { Err::<(), String>("oracle unavailable".to_string()) })
            .unwrap();
        let succeeding = queue.add(|| async { Ok::<u32, String>(7) }).unwrap();

        assert!(failing.join().await.unwrap().is_err());
        assert_eq!(succeeding.join().await.unwrap(), Ok(7));
    }

    #[tokio::test]
    async fn clear_abandons_queued_but_not_in_flight() {
        let queue = SerialTaskQueue::new();

        let in_flight = queue
            .add(|| async {
                sleep(Duration::from_millis(50)).await;
                "done"
            })
            .unwrap();
        let queued = queue.add(|| async { "never runs" }).unwrap();

        // Give the drain loop time to start the first task.
        sleep(Duration::from_millis(10)).await;
        queue.clear();

        assert_eq!(queued.join().await, Err(QueueError::Abandoned));
        assert_eq!(in_flight.join().await, Ok("done"));
    }

    #[tokio::test]
    async fn add_after_dispose_is_rejected() {
        let queue = SerialTaskQueue::new();
        queue.dispose();
        let result = queue.add(|| async { 1 });
        assert!(matches!(result, Err(QueueError::Disposed)));
    }

    #[tokio::test]
    async fn add_on_empty_queue_begins_draining() {
        let queue = SerialTaskQueue::new();
        let handle = queue.add(|| async { 42 }).unwrap();
        assert_eq!(handle.join().await.unwrap(), 42);
    }
}
