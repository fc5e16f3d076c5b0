//! On-demand cycle collection for pairs.
//!
//! Reference counting frees acyclic structure as soon as its last owner goes
//! away, but a ring of pairs keeps itself alive. Every pair registers a weak
//! handle here when it is created; [`collect`] finds pairs that are only
//! referenced by other tracked pairs and clears their slots, after which
//! reference counting reclaims them.
//!
//! # Invariants
//! - A pair referenced from anywhere outside the tracked pair graph (a local
//!   variable, an iterator, an atom table, another thread) is never cleared,
//!   nor is anything reachable from it.
//! - Collection must not run while other threads clone, drop or mutate
//!   tracked pairs; counts and slots are sampled at slightly different times.
//!
//! # Cost
//! Every new pair pushes a weak handle into its thread's registry shard. A
//! weak handle keeps the freed cell's allocation (not its contents) until
//! the shard is next pruned; pruning runs when a shard doubles in size and
//! on every collection.

use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Instant;

use log::debug;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::language::{PairCell, Value};

const MIN_PRUNE_THRESHOLD: usize = 1024;
const SHARDS: usize = 16;

// Each thread registers into its own shard, so pair construction on
// different threads rarely contends on one lock.
static REGISTRY: Lazy<[Mutex<Registry>; SHARDS]> =
    Lazy::new(|| std::array::from_fn(|_| Mutex::new(Registry::new())));

static NEXT_SHARD: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static SHARD: usize = NEXT_SHARD.fetch_add(1, Ordering::Relaxed) % SHARDS;
}

struct Registry {
    cells: Vec<Weak<PairCell>>,
    prune_at: usize,
}

impl Registry {
    fn new() -> Self {
        Registry {
            cells: Vec::new(),
            prune_at: MIN_PRUNE_THRESHOLD,
        }
    }

    fn prune(&mut self) {
        self.cells.retain(|cell| cell.strong_count() > 0);
        self.prune_at = (self.cells.len() * 2).max(MIN_PRUNE_THRESHOLD);
    }
}

fn lock(shard: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    shard.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outcome of one [`collect`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollectionReport {
    /// Live pairs examined
    pub tracked: usize,
    /// Pairs reachable from outside the pair graph
    pub reachable: usize,
    /// Pairs whose slots were cleared
    pub collected: usize,
    pub elapsed_sec: f64,
}

pub(crate) fn track(cell: &Arc<PairCell>) {
    let shard = SHARD.try_with(|shard| *shard).unwrap_or(0);
    let mut registry = lock(&REGISTRY[shard]);
    if registry.cells.len() >= registry.prune_at {
        registry.prune();
    }
    registry.cells.push(Arc::downgrade(cell));
}

/// Number of tracked pairs that are still alive.
pub fn tracked_count() -> usize {
    REGISTRY
        .iter()
        .map(|shard| {
            lock(shard)
                .cells
                .iter()
                .filter(|cell| cell.strong_count() > 0)
                .count()
        })
        .sum()
}

/// Break every unreachable cycle of pairs.
pub fn collect() -> CollectionReport {
    let started = Instant::now();

    let mut live: Vec<Arc<PairCell>> = Vec::new();
    for shard in REGISTRY.iter() {
        let mut registry = lock(shard);
        registry.prune();
        live.extend(registry.cells.iter().filter_map(Weak::upgrade));
    }

    let index: FxHashMap<usize, usize> = live
        .iter()
        .enumerate()
        .map(|(i, cell)| (Arc::as_ptr(cell) as usize, i))
        .collect();

    // References from outside the tracked graph: the strong count, minus the
    // handle held in `live`, minus every slot of a tracked pair pointing here.
    let mut external: Vec<usize> = live.iter().map(|cell| Arc::strong_count(cell) - 1).collect();
    for cell in &live {
        for child in tracked_children(cell, &index) {
            external[child] = external[child].saturating_sub(1);
        }
    }

    let mut reachable = vec![false; live.len()];
    let mut stack: Vec<usize> = Vec::new();
    for (i, &count) in external.iter().enumerate() {
        if count > 0 {
            reachable[i] = true;
            stack.push(i);
        }
    }
    while let Some(i) = stack.pop() {
        for child in tracked_children(&live[i], &index) {
            if !reachable[child] {
                reachable[child] = true;
                stack.push(child);
            }
        }
    }

    let mut released: Vec<Value> = Vec::new();
    let mut collected = 0;
    for (cell, _) in live.iter().zip(&reachable).filter(|(_, keep)| !**keep) {
        let mut slots = cell.write();
        released.push(mem::replace(&mut slots.head, Value::Nil));
        released.push(mem::replace(&mut slots.tail, Value::Nil));
        collected += 1;
    }

    let report = CollectionReport {
        tracked: live.len(),
        reachable: reachable.iter().filter(|keep| **keep).count(),
        collected,
        elapsed_sec: started.elapsed().as_secs_f64(),
    };

    // Slot contents go first so the cleared cells are dropped with their
    // last handle in `live`.
    drop(released);
    drop(live);

    debug!(
        "event=gc_collect module=gc tracked={} reachable={} collected={} elapsed_sec={:.6}",
        report.tracked, report.reachable, report.collected, report.elapsed_sec
    );
    report
}

fn tracked_children(cell: &PairCell, index: &FxHashMap<usize, usize>) -> Vec<usize> {
    let slots = cell.read();
    [&slots.head, &slots.tail]
        .into_iter()
        .filter_map(|slot| match slot {
            Value::Pair(pair) => index.get(&(Arc::as_ptr(&pair.0) as usize)).copied(),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_compares_by_value() {
        let report = CollectionReport {
            tracked: 3,
            reachable: 1,
            collected: 2,
            elapsed_sec: 0.5,
        };
        let copy = report;
        assert_eq!(copy, report);
        assert_ne!(report, CollectionReport::default());
    }

    #[test]
    fn test_prune_drops_dead_handles() {
        let mut registry = Registry::new();
        let alive = Arc::new(PairCell::new(Value::Int(1), Value::Nil));
        registry.cells.push(Arc::downgrade(&alive));
        {
            let dead = Arc::new(PairCell::new(Value::Int(2), Value::Nil));
            registry.cells.push(Arc::downgrade(&dead));
        }
        registry.prune();
        assert_eq!(registry.cells.len(), 1);
        assert_eq!(registry.prune_at, MIN_PRUNE_THRESHOLD);
    }
}
