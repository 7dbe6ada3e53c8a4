//! FIFO queue of pending tasks shared between a pool and its workers.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A unit of work queued for the pool.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
  tasks: VecDeque<Task>,
  closed: bool,
}

/// FIFO of pending tasks with a closed flag.
///
/// Size and emptiness are precise under the queue's own mutex. Closing the
/// queue releases every blocked consumer; a closed queue accepts no further
/// tasks and hands out none, even if some are still pending.
pub struct TaskQueue {
  state: Mutex<QueueState>,
  available: Condvar,
}

impl TaskQueue {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(QueueState {
        tasks: VecDeque::new(),
        closed: false,
      }),
      available: Condvar::new(),
    }
  }

  /// Append a task and wake one blocked consumer.
  ///
  /// Returns `false` (dropping the task) when the queue is closed.
  pub fn push(&self, task: Task) -> bool {
    let mut state = self.state.lock().unwrap();
    if state.closed {
      return false;
    }
    state.tasks.push_back(task);
    self.available.notify_one();
    true
  }

  /// Take the oldest task.
  ///
  /// Blocking pops wait until a task is available or the queue closes.
  /// A closed queue always yields `None`.
  pub fn pop(&self, block: bool) -> Option<Task> {
    let mut state = self.state.lock().unwrap();

    if block {
      while state.tasks.is_empty() && !state.closed {
        state = self.available.wait(state).unwrap();
      }
    }

    if state.closed {
      return None;
    }
    state.tasks.pop_front()
  }

  /// Flip the closed flag and release every blocked consumer.
  pub fn close(&self) {
    let mut state = self.state.lock().unwrap();
    state.closed = true;
    drop(state);
    self.available.notify_all();
  }

  pub fn is_closed(&self) -> bool {
    self.state.lock().unwrap().closed
  }

  pub fn len(&self) -> usize {
    self.state.lock().unwrap().tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.state.lock().unwrap().tasks.is_empty()
  }
}

impl Default for TaskQueue {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::thread;
  use std::time::Duration;

  use super::*;

  #[test]
  fn test_fifo_order() {
    let queue = TaskQueue::new();
    let log = Arc::new(AtomicUsize::new(0));

    for expected in 0..4_usize {
      let log = Arc::clone(&log);
      queue.push(Box::new(move || {
        assert_eq!(log.swap(expected + 1, Ordering::SeqCst), expected);
      }));
    }
    assert_eq!(queue.len(), 4);

    while let Some(task) = queue.pop(false) {
      task();
    }
    assert_eq!(log.load(Ordering::SeqCst), 4);
    assert!(queue.is_empty());
  }

  #[test]
  fn test_nonblocking_pop_on_empty() {
    let queue = TaskQueue::new();
    assert!(queue.pop(false).is_none());
  }

  #[test]
  fn test_push_after_close_is_dropped() {
    let queue = TaskQueue::new();
    queue.close();

    assert!(!queue.push(Box::new(|| {})));
    assert!(queue.is_empty());
    assert!(queue.is_closed());
  }

  #[test]
  fn test_closed_queue_yields_nothing() {
    let queue = TaskQueue::new();
    queue.push(Box::new(|| {}));
    queue.close();

    assert!(queue.pop(false).is_none());
    assert!(queue.pop(true).is_none());
  }

  #[test]
  fn test_close_releases_blocked_consumer() {
    let queue = Arc::new(TaskQueue::new());

    let consumer = {
      let queue = Arc::clone(&queue);
      thread::spawn(move || queue.pop(true).is_none())
    };

    // Give the consumer a moment to park on the condvar.
    thread::sleep(Duration::from_millis(50));
    queue.close();

    assert!(consumer.join().unwrap(), "consumer must wake with None");
  }

  #[test]
  fn test_blocking_pop_receives_later_push() {
    let queue = Arc::new(TaskQueue::new());
    let ran = Arc::new(AtomicUsize::new(0));

    let consumer = {
      let queue = Arc::clone(&queue);
      thread::spawn(move || {
        let task = queue.pop(true).expect("task expected before close");
        task();
      })
    };

    thread::sleep(Duration::from_millis(20));
    let counter = Arc::clone(&ran);
    queue.push(Box::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    }));

    consumer.join().unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
  }
}
