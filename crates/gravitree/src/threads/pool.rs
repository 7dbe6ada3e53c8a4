//! Fixed worker pool executing queued closures.

use std::any::Any;
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::error::{Error, ErrorList};

use super::task_queue::TaskQueue;

/// Result slot a submitted task fills exactly once.
struct HandleState<T> {
  result: Mutex<Option<Result<T, String>>>,
  done: Condvar,
}

/// Observable completion of a submitted task.
///
/// Handles are shared: clones observe the same slot, and a panicking task
/// surfaces to every observer as [`Error::Async`]. `wait` blocks; `try_get`
/// polls.
pub struct TaskHandle<T> {
  state: Arc<HandleState<T>>,
}

impl<T> Clone for TaskHandle<T> {
  fn clone(&self) -> Self {
    Self {
      state: Arc::clone(&self.state),
    }
  }
}

impl<T> TaskHandle<T> {
  fn new() -> Self {
    Self {
      state: Arc::new(HandleState {
        result: Mutex::new(None),
        done: Condvar::new(),
      }),
    }
  }

  fn fill(&self, outcome: Result<T, String>) {
    *self.state.result.lock().unwrap() = Some(outcome);
    self.state.done.notify_all();
  }

  /// True once the task has finished, successfully or not.
  pub fn is_done(&self) -> bool {
    self.state.result.lock().unwrap().is_some()
  }

  /// Block until the task completes, leaving the result in place for other
  /// observers.
  pub fn wait(&self) -> Result<T, Error>
  where
    T: Clone,
  {
    let mut result = self.state.result.lock().unwrap();
    loop {
      if let Some(outcome) = result.as_ref() {
        return outcome.clone().map_err(Error::Async);
      }
      result = self.state.done.wait(result).unwrap();
    }
  }

  /// Non-blocking poll, leaving the result in place.
  pub fn try_get(&self) -> Option<Result<T, Error>>
  where
    T: Clone,
  {
    self
      .state
      .result
      .lock()
      .unwrap()
      .as_ref()
      .map(|outcome| outcome.clone().map_err(Error::Async))
  }

  /// Block until the task completes and take the result out. Only one
  /// observer can join; later observers of the same slot block forever.
  pub fn join(self) -> Result<T, Error> {
    let mut result = self.state.result.lock().unwrap();
    loop {
      if let Some(outcome) = result.take() {
        return outcome.map_err(Error::Async);
      }
      result = self.state.done.wait(result).unwrap();
    }
  }
}

/// Fixed set of workers draining a shared [`TaskQueue`].
///
/// Dropping the pool closes the queue (discarding any still-pending tasks),
/// releases the workers and joins them.
pub struct ThreadPool {
  queue: Arc<TaskQueue>,
  workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
  /// Spin up `threads` workers. Zero threads is an
  /// [`Error::InvalidArgument`].
  pub fn new(threads: usize) -> Result<Self, Error> {
    if threads == 0 {
      return Err(Error::InvalidArgument("thread pool needs at least one thread"));
    }

    let queue = Arc::new(TaskQueue::new());
    let workers = (0..threads)
      .map(|_| {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
          while let Some(task) = queue.pop(true) {
            task();
          }
        })
      })
      .collect();

    Ok(Self { queue, workers })
  }

  /// A pool sized to the machine, leaving one CPU for the caller.
  pub fn with_hardware_threads() -> Self {
    // hardware_concurrency is >= 1, so this cannot hit the zero check.
    Self::new(Self::hardware_concurrency()).unwrap_or_else(|_| unreachable!())
  }

  /// Available parallelism minus one for the submitting thread, never
  /// below 1.
  pub fn hardware_concurrency() -> usize {
    thread::available_parallelism()
      .map(usize::from)
      .unwrap_or(2)
      .max(2)
      - 1
  }

  /// Number of workers in the pool.
  pub fn thread_count(&self) -> usize {
    self.workers.len()
  }

  /// Number of tasks waiting to be executed.
  pub fn queued(&self) -> usize {
    self.queue.len()
  }

  /// Run a closure on the pool, returning a handle to its completion.
  ///
  /// A panic inside the closure is caught by the wrapper and delivered
  /// through the handle; the worker thread survives. Tasks submitted to a
  /// pool that is shutting down complete immediately with [`Error::Async`].
  pub fn submit<T, F>(&self, func: F) -> TaskHandle<T>
  where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
  {
    let handle = TaskHandle::new();
    let completion = handle.clone();

    let accepted = self.queue.push(Box::new(move || {
      let outcome = catch_unwind(AssertUnwindSafe(func)).map_err(panic_message);
      completion.fill(outcome);
    }));

    if !accepted {
      handle.fill(Err("task queue is closed".to_string()));
    }

    handle
  }

  /// Apply `func` to every index in `range`, split across the pool's
  /// workers, blocking until all chunks finish.
  ///
  /// Panics raised by any chunk are gathered into one [`Error::Async`]
  /// carrying every failure message.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "pool::for_each"))]
  pub fn for_each<F>(&self, range: Range<usize>, func: F) -> Result<(), Error>
  where
    F: Fn(usize) + Send + Sync + 'static,
  {
    self.for_each_with(range, func, self.thread_count())
  }

  /// [`ThreadPool::for_each`] with an explicit task count.
  pub fn for_each_with<F>(&self, range: Range<usize>, func: F, task_count: usize) -> Result<(), Error>
  where
    F: Fn(usize) + Send + Sync + 'static,
  {
    let handles = self.for_each_async(range, func, task_count);
    Self::wait_all(&handles)
  }

  /// Submit the chunked tasks and return their handles without blocking.
  ///
  /// The range is cut into `task_count` contiguous chunks, as evenly as
  /// possible: the first `len % task_count` chunks carry one extra index.
  /// Chunks that would be empty are not submitted.
  pub fn for_each_async<F>(
    &self,
    range: Range<usize>,
    func: F,
    task_count: usize,
  ) -> Vec<TaskHandle<()>>
  where
    F: Fn(usize) + Send + Sync + 'static,
  {
    let len = range.len();
    if len == 0 {
      return Vec::new();
    }

    let task_count = task_count.max(1);
    let per_task = len / task_count;
    let extra = len % task_count;
    let func = Arc::new(func);

    let mut handles = Vec::with_capacity(task_count.min(len));
    let mut start = range.start;
    for chunk in 0..task_count {
      let size = per_task + usize::from(chunk < extra);
      if size == 0 {
        continue;
      }
      let end = start + size;
      let func = Arc::clone(&func);
      handles.push(self.submit(move || {
        for index in start..end {
          func(index);
        }
      }));
      start = end;
    }
    debug_assert_eq!(start, range.end);

    handles
  }

  /// Block on every handle, gathering failures into a single error.
  pub fn wait_all(handles: &[TaskHandle<()>]) -> Result<(), Error> {
    let mut errors = ErrorList::new();
    for handle in handles {
      if let Err(error) = handle.wait() {
        errors.push(&error.to_string());
      }
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(errors.into_error())
    }
  }
}

impl Drop for ThreadPool {
  fn drop(&mut self) {
    self.queue.close();
    for worker in self.workers.drain(..) {
      let _ = worker.join();
    }
  }
}

/// Render a panic payload into a diagnostic line.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "task panicked".to_string()
  }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
