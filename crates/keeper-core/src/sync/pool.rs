//! Bounded pool of scoped worker threads over a fixed list of names

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::interrupt::Interrupt;

/// Run `work` once per name on up to `workers` threads.
///
/// Returns one value per name, in input order. Names not started because the
/// interrupt fired get `skipped(name)` instead.
pub(crate) fn run<T, W, S>(
    names: &[String],
    workers: usize,
    interrupt: &Interrupt,
    work: W,
    skipped: S,
) -> Vec<T>
where
    T: Send,
    W: Fn(&str) -> T + Sync,
    S: Fn(&str) -> T,
{
    let slots: Vec<Mutex<Option<T>>> = names.iter().map(|_| Mutex::new(None)).collect();
    let next = AtomicUsize::new(0);
    let workers = workers.clamp(1, names.len().max(1));

    let drain = || {
        loop {
            let idx = next.fetch_add(1, Ordering::SeqCst);
            let Some(name) = names.get(idx) else {
                break;
            };
            if interrupt.is_triggered() {
                break;
            }
            let value = work(name);
            if let Ok(mut slot) = slots[idx].lock() {
                *slot = Some(value);
            }
        }
    };

    if workers == 1 {
        drain();
    } else {
        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(&drain);
            }
        });
    }

    names
        .iter()
        .zip(slots)
        .map(|(name, slot)| {
            slot.into_inner()
                .ok()
                .flatten()
                .unwrap_or_else(|| skipped(name))
        })
        .collect()
}
