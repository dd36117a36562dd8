//! Bounded parallel execution
//!
//! Useful when I/O contention matters more than CPU, e.g. reading many
//! files at once.

use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;

use tracing::{debug, warn};

/// Call `worker` on every item with at most `n` calls running at once.
///
/// Exactly `n` threads pull from a queue holding at most `n` pending items;
/// feeding the queue blocks while it is full. Returns once every item has
/// been processed. Failures must be reported by `worker` itself, e.g.
/// through [`Registry::complete`](crate::Registry::complete).
///
/// `n == 0` is treated as 1. A panicking worker is re-raised here after the
/// remaining threads finish.
pub fn bounded_exec<T, I, F>(n: usize, items: I, worker: F)
where
    I: IntoIterator<Item = T>,
    T: Send,
    F: Fn(T) + Sync,
{
    let n = if n == 0 {
        warn!("bounded_exec called with zero concurrency, using 1");
        1
    } else {
        n
    };

    let (tx, rx) = mpsc::sync_channel::<T>(n);
    let rx = Mutex::new(rx);

    thread::scope(|scope| {
        for id in 0..n {
            let rx = &rx;
            let worker = &worker;
            scope.spawn(move || loop {
                // The lock is only held while waiting for the next item.
                let next = match rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => return,
                };
                match next {
                    Ok(item) => worker(item),
                    Err(_) => {
                        debug!("worker {} done", id);
                        return;
                    }
                }
            });
        }

        for item in items {
            if tx.send(item).is_err() {
                // Every worker has gone away (panicked); nothing left to feed.
                break;
            }
        }
        drop(tx);
    });
}
