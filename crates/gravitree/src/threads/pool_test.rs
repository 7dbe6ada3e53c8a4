use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;

use super::*;

#[test]
fn test_zero_threads_rejected() {
  assert!(matches!(
    ThreadPool::new(0),
    Err(Error::InvalidArgument(_))
  ));
}

#[test]
fn test_hardware_concurrency_is_positive() {
  assert!(ThreadPool::hardware_concurrency() >= 1);
  let pool = ThreadPool::with_hardware_threads();
  assert!(pool.thread_count() >= 1);
}

#[test]
fn test_submit_returns_value() {
  let pool = ThreadPool::new(2).unwrap();

  let handle = pool.submit(|| 6 * 7);

  assert_eq!(handle.wait().unwrap(), 42);
}

#[test]
fn test_handle_is_shared() {
  let pool = ThreadPool::new(2).unwrap();

  let handle = pool.submit(|| "done".to_string());
  let observer = handle.clone();

  assert_eq!(handle.wait().unwrap(), "done");
  assert_eq!(observer.wait().unwrap(), "done");
  assert!(observer.is_done());
}

#[test]
fn test_try_get_polls_to_completion() {
  let pool = ThreadPool::new(1).unwrap();
  let handle = pool.submit(|| {
    std::thread::sleep(Duration::from_millis(10));
    5_u32
  });

  let mut polled = None;
  for _ in 0..500 {
    if let Some(result) = handle.try_get() {
      polled = Some(result.unwrap());
      break;
    }
    std::thread::sleep(Duration::from_millis(1));
  }

  assert_eq!(polled, Some(5));
}

#[test]
fn test_panicking_task_surfaces_and_worker_survives() {
  let pool = ThreadPool::new(1).unwrap();

  let failing = pool.submit(|| panic!("task exploded"));
  let error = failing.wait().unwrap_err();
  assert!(matches!(&error, Error::Async(message) if message.contains("task exploded")));

  // The single worker must still be alive to run this.
  let follow_up = pool.submit(|| 7);
  assert_eq!(follow_up.wait().unwrap(), 7);
}

#[test]
fn test_for_each_visits_every_index_once() {
  let pool = ThreadPool::new(4).unwrap();
  let counters: Arc<Vec<AtomicUsize>> =
    Arc::new((0..1000).map(|_| AtomicUsize::new(0)).collect());

  let shared = Arc::clone(&counters);
  pool
    .for_each(0..1000, move |index| {
      shared[index].fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

  for (index, counter) in counters.iter().enumerate() {
    assert_eq!(counter.load(Ordering::SeqCst), 1, "index {} count wrong", index);
  }
}

#[test]
fn test_for_each_empty_range() {
  let pool = ThreadPool::new(2).unwrap();
  pool.for_each(5..5, |_| panic!("must never run")).unwrap();
}

#[test]
fn test_for_each_with_more_tasks_than_items() {
  let pool = ThreadPool::new(2).unwrap();
  let counters: Arc<Vec<AtomicUsize>> = Arc::new((0..3).map(|_| AtomicUsize::new(0)).collect());

  let shared = Arc::clone(&counters);
  pool
    .for_each_with(
      0..3,
      move |index| {
        shared[index].fetch_add(1, Ordering::SeqCst);
      },
      16,
    )
    .unwrap();

  for counter in counters.iter() {
    assert_eq!(counter.load(Ordering::SeqCst), 1);
  }
}

#[test]
fn test_for_each_uneven_partition_covers_range() {
  let pool = ThreadPool::new(3).unwrap();
  let sum = Arc::new(AtomicUsize::new(0));

  let shared = Arc::clone(&sum);
  pool
    .for_each_with(
      10..27,
      move |index| {
        shared.fetch_add(index, Ordering::SeqCst);
      },
      3,
    )
    .unwrap();

  let expected: usize = (10..27).sum();
  assert_eq!(sum.load(Ordering::SeqCst), expected);
}

#[test]
fn test_for_each_gathers_all_failures() {
  let pool = ThreadPool::new(4).unwrap();

  let result = pool.for_each_with(
    0..8,
    |index| {
      if index == 2 {
        panic!("bad index two");
      }
      if index == 6 {
        panic!("bad index six");
      }
    },
    8,
  );

  let error = result.unwrap_err();
  let message = error.to_string();
  assert!(matches!(error, Error::Async(_)));
  assert!(message.contains("bad index two"), "missing first failure: {message}");
  assert!(message.contains("bad index six"), "missing second failure: {message}");
}

#[test]
fn test_for_each_async_returns_immediately() {
  let pool = ThreadPool::new(2).unwrap();
  let counter = Arc::new(AtomicUsize::new(0));

  let shared = Arc::clone(&counter);
  let handles = pool.for_each_async(
    0..64,
    move |_| {
      std::thread::sleep(Duration::from_millis(1));
      shared.fetch_add(1, Ordering::SeqCst);
    },
    4,
  );
  assert!(!handles.is_empty());

  ThreadPool::wait_all(&handles).unwrap();
  assert_eq!(counter.load(Ordering::SeqCst), 64);
}

#[test]
fn test_queued_drains() {
  let pool = ThreadPool::new(1).unwrap();

  let gate = pool.submit(|| std::thread::sleep(Duration::from_millis(20)));
  let handles: Vec<_> = (0..4_usize).map(|index| pool.submit(move || index)).collect();

  gate.wait().unwrap();
  for (index, handle) in handles.into_iter().enumerate() {
    assert_eq!(handle.wait().unwrap(), index);
  }
  assert_eq!(pool.queued(), 0);
}

#[test]
fn test_drop_joins_workers() {
  let counter = Arc::new(AtomicUsize::new(0));
  {
    let pool = ThreadPool::new(2).unwrap();
    for _ in 0..16 {
      let counter = Arc::clone(&counter);
      pool.submit(move || {
        counter.fetch_add(1, Ordering::SeqCst);
      });
    }
    std::thread::sleep(Duration::from_millis(50));
  }
  // However many ran before shutdown, the workers are gone and nothing
  // races the assertion below.
  let settled = counter.load(Ordering::SeqCst);
  std::thread::sleep(Duration::from_millis(20));
  assert_eq!(counter.load(Ordering::SeqCst), settled);
}
