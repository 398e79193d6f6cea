mod common;

use deferrer::{Error, ExecStatus, Executor, Priority, Promise, Runnable, WorkerPool};
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct Exploding;

impl Runnable for Exploding {
    fn run(self: Box<Self>) {
        panic!("runnable exploded");
    }

    fn cancel(self: Box<Self>) {}
}

fn pump<E: Executor>(executor: &E) -> usize {
    executor.drain_one()
}

#[test]
fn test_single_worker_thread() {
    common::init_logger();

    let pool = WorkerPool::new(1).unwrap();

    let result = pool.submit(|| 42);
    assert_eq!(result.get().unwrap(), 42);
    assert_eq!(pool.worker_threads(), 1);
}

#[test]
fn test_worker_threads_parallel_execution() {
    let pool = WorkerPool::new(4).unwrap();

    let counter = Arc::new(Mutex::new(0));
    let results = Arc::new(Mutex::new(Vec::new()));

    let promises: Vec<_> = (0..10)
        .map(|i| {
            let counter = counter.clone();
            let results = results.clone();

            pool.submit(move || {
                let mut c = counter.lock().unwrap();
                *c += 1;
                drop(c);

                results.lock().unwrap().push(i);
                i * 2
            })
        })
        .collect();

    for (i, promise) in promises.iter().enumerate() {
        assert_eq!(promise.get().unwrap(), i * 2);
    }

    assert_eq!(*counter.lock().unwrap(), 10);
    assert_eq!(results.lock().unwrap().len(), 10);
}

#[test]
fn test_worker_threads_stress() {
    let pool = WorkerPool::new(8).unwrap();

    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..1000 {
        let counter = counter.clone();
        pool.submit(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert_eq!(pool.wait_all(), ExecStatus::Done);
    assert_eq!(counter.load(Ordering::SeqCst), 1000);
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn test_worker_threads_run_on_distinct_threads() {
    let pool = WorkerPool::new(2).unwrap();

    let completed = Arc::new(Mutex::new(HashSet::new()));

    for i in 0..20 {
        let completed = completed.clone();
        pool.submit(move || {
            completed.lock().unwrap().insert(i);
        });
    }

    pool.wait_all();
    assert_eq!(completed.lock().unwrap().len(), 20);

    let caller = thread::current().id();
    let ran_on = pool.submit(move || thread::current().id()).get().unwrap();
    assert_ne!(ran_on, caller);
}

#[test]
fn test_thread_names_use_prefix() {
    let pool = WorkerPool::builder()
        .worker_threads(1)
        .thread_name("loader")
        .build()
        .unwrap();

    let name = pool.submit(|| thread::current().name().map(str::to_owned));
    assert_eq!(name.get().unwrap().as_deref(), Some("loader-0"));
}

#[test]
#[should_panic(expected = "worker_threads must be > 0")]
fn test_zero_worker_threads_panics() {
    let _ = WorkerPool::builder().worker_threads(0);
}

#[test]
fn test_paused_pool_runs_by_priority() {
    let pool = WorkerPool::new(1).unwrap();
    let order = Arc::new(Mutex::new(Vec::new()));

    pool.pause();
    assert!(pool.is_paused());

    for (priority, label) in [
        (Priority::Low, "low"),
        (Priority::Highest, "highest"),
        (Priority::Normal, "normal-1"),
        (Priority::Normal, "normal-2"),
        (Priority::Lowest, "lowest"),
    ] {
        let order = order.clone();
        pool.submit_with_priority(priority, move || order.lock().unwrap().push(label));
    }

    thread::sleep(Duration::from_millis(20));
    assert!(order.lock().unwrap().is_empty());
    assert_eq!(pool.queued_count(), 5);

    pool.resume();
    assert!(!pool.is_paused());
    assert_eq!(pool.wait_all(), ExecStatus::Done);

    assert_eq!(
        *order.lock().unwrap(),
        vec!["highest", "normal-1", "normal-2", "low", "lowest"]
    );
}

#[test]
fn test_wait_all_for_times_out() {
    let pool = WorkerPool::new(1).unwrap();
    let gate = Promise::new();

    let blocked = gate.clone();
    let task = pool.submit(move || blocked.wait());

    assert_eq!(pool.wait_all_for(Duration::from_millis(20)), ExecStatus::Timeout);
    assert_eq!(pool.active_count(), 1);

    gate.resolve(());
    assert_eq!(pool.wait_all_for(Duration::from_secs(5)), ExecStatus::Done);
    assert!(task.is_settled());
}

#[test]
fn test_active_wait_all_runs_tasks_while_paused() {
    let pool = WorkerPool::new(2).unwrap();
    pool.pause();

    let caller = thread::current().id();
    let promises: Vec<_> = (0..4)
        .map(|_| pool.submit(move || thread::current().id() == caller))
        .collect();

    let (status, ran) = pool.active_wait_all();
    assert_eq!(status, ExecStatus::Done);
    assert_eq!(ran, 4);

    for promise in promises {
        assert!(promise.get().unwrap());
    }
}

#[test]
fn test_active_wait_one() {
    let pool = WorkerPool::new(1).unwrap();

    assert_eq!(pool.active_wait_one(), (ExecStatus::Done, 0));

    pool.pause();
    let value = pool.submit(|| "ran here");

    assert_eq!(pool.active_wait_one(), (ExecStatus::Done, 1));
    assert_eq!(value.get().unwrap(), "ran here");
    assert_eq!(pool.active_wait_one(), (ExecStatus::Done, 0));
}

#[test]
fn test_active_wait_all_for_times_out() {
    let pool = WorkerPool::new(1).unwrap();
    let gate = Promise::new();

    let blocked = gate.clone();
    pool.submit(move || blocked.wait());

    let (status, ran) = pool.active_wait_all_for(Duration::from_millis(20));
    assert_eq!(status, ExecStatus::Timeout);
    assert_eq!(ran, 0);

    gate.resolve(());
    assert_eq!(pool.active_wait_all().0, ExecStatus::Done);
}

#[test]
fn test_wait_all_inside_task_ignores_itself() {
    let pool = Arc::new(WorkerPool::new(1).unwrap());

    let inner_pool = pool.clone();
    let status = pool.submit(move || inner_pool.active_wait_all().0);

    assert_eq!(status.get().unwrap(), ExecStatus::Done);
}

#[test]
fn test_panicking_task_rejects_and_worker_survives() {
    let pool = WorkerPool::new(1).unwrap();

    let failed = pool.submit(|| -> u32 { panic!("task exploded") });
    match failed.get() {
        Err(Error::Panicked(message)) => assert!(message.contains("task exploded")),
        other => panic!("unexpected outcome: {other:?}"),
    }

    assert_eq!(pool.submit(|| 7).get().unwrap(), 7);
}

#[test]
fn test_try_submit_rejects_with_returned_error() {
    let pool = WorkerPool::new(1).unwrap();

    let failed = pool.try_submit(|| -> Result<u32, io::Error> { Err(io::Error::other("disk")) });
    let error = failed.get().unwrap_err();

    assert_eq!(error.to_string(), "disk");
    assert!(error.downcast_ref::<io::Error>().is_some());

    let ok = pool.try_submit_with_priority(Priority::High, || Ok::<_, io::Error>(5));
    assert_eq!(ok.get().unwrap(), 5);
}

#[test]
fn test_drop_cancels_queued_tasks() {
    let pool = WorkerPool::new(1).unwrap();

    let started = Promise::new();
    let gate = Promise::new();

    let (started_tx, gate_rx) = (started.clone(), gate.clone());
    let running = pool.submit(move || {
        started_tx.resolve(());
        gate_rx.wait();
        "finished"
    });

    started.wait();

    let queued: Vec<_> = (0..5).map(|i| pool.submit(move || i)).collect();
    assert_eq!(pool.queued_count(), 5);

    let opener = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        gate.resolve(());
    });

    drop(pool);
    opener.join().unwrap();

    assert_eq!(running.get().unwrap(), "finished");
    for promise in queued {
        assert!(promise.get().unwrap_err().is_cancelled());
    }
}

#[test]
fn test_drop_from_own_worker_does_not_deadlock() {
    let pool = WorkerPool::new(2).unwrap();
    let slot = Arc::new(Mutex::new(None::<WorkerPool>));

    let released = Promise::new();
    let (slot_clone, released_tx) = (slot.clone(), released.clone());

    let dropped = pool.submit(move || {
        released_tx.wait();
        let pool = slot_clone.lock().unwrap().take();
        drop(pool);
        true
    });

    *slot.lock().unwrap() = Some(pool);
    released.resolve(());

    assert!(dropped.get().unwrap());
}

#[test]
fn test_panicking_runnable_keeps_worker_alive() {
    let pool = WorkerPool::new(1).unwrap();

    pool.schedule(Priority::Normal, Box::new(Exploding));

    let follow_up = pool.submit(|| 7);
    assert_eq!(follow_up.wait_for(Duration::from_secs(5)), deferrer::WaitStatus::Ready);
    assert_eq!(follow_up.get().unwrap(), 7);

    assert_eq!(pool.wait_all_for(Duration::from_secs(5)), ExecStatus::Done);
    assert_eq!(pool.active_count(), 0);
}

#[test]
fn test_panicking_runnable_on_helping_thread() {
    let pool = WorkerPool::new(1).unwrap();
    pool.pause();

    pool.schedule(Priority::High, Box::new(Exploding));
    let value = pool.submit(|| "after");

    assert_eq!(pool.active_wait_one(), (ExecStatus::Done, 1));
    assert_eq!(pool.active_count(), 1);

    assert_eq!(pool.active_wait_all(), (ExecStatus::Done, 1));
    assert_eq!(value.get().unwrap(), "after");
}

#[test]
fn test_drain_one_through_executor_trait() {
    let pool = WorkerPool::new(1).unwrap();
    pool.pause();

    assert_eq!(pump(&pool), 0);

    let value = pool.submit(|| 11);
    assert_eq!(pump(&pool), 1);
    assert_eq!(value.get().unwrap(), 11);
    assert_eq!(pump(&pool), 0);
}

#[test]
fn test_wait_all_until() {
    let pool = WorkerPool::new(1).unwrap();
    let gate = Promise::new();

    let blocked = gate.clone();
    let task = pool.submit(move || blocked.wait());

    assert_eq!(pool.wait_all_until(Instant::now()), ExecStatus::Timeout);
    assert!(!task.is_settled());

    gate.resolve(());
    let deadline = Instant::now() + Duration::from_secs(5);
    assert_eq!(pool.wait_all_until(deadline), ExecStatus::Done);
    assert!(task.is_settled());
}

#[test]
fn test_active_wait_all_until() {
    let pool = WorkerPool::new(1).unwrap();
    pool.pause();

    let promises: Vec<_> = (0..3).map(|i| pool.submit(move || i)).collect();

    assert_eq!(
        pool.active_wait_all_until(Instant::now()),
        (ExecStatus::Timeout, 0)
    );
    assert_eq!(pool.queued_count(), 3);

    let deadline = Instant::now() + Duration::from_secs(5);
    assert_eq!(pool.active_wait_all_until(deadline), (ExecStatus::Done, 3));

    for (i, promise) in promises.iter().enumerate() {
        assert_eq!(promise.get().unwrap(), i as i32);
    }
}
