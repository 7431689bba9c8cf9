//! The expectation registry: register, hit-test, reconcile.

use log::debug;

use crate::arena::RecordArena;
use crate::config::RegistryConfig;
use crate::record::Expectation;
use crate::sink::{MissedExpectation, MissedRaceSink, StderrSink};
use crate::sync::mutex::Mutex;

/// Mutable state behind the registry lock.
struct RegistryInner {
    arena: RecordArena,
    /// Live slot indices, most recently registered last.
    live: Vec<u32>,
    registered_total: u64,
    hit_total: u64,
    missed_total: u64,
    reconcile_count: u64,
}

/// Registry of expected data races.
///
/// Every operation is a short, bounded critical section on one internal
/// lock, so visible state transitions form a total order across threads.
/// The registry owns all live records; reconciliation returns their
/// storage to the internal arena for reuse.
pub struct ExpectationRegistry {
    inner: Mutex<RegistryInner>,
    sink: Box<dyn MissedRaceSink>,
}

impl ExpectationRegistry {
    /// Create a registry reporting missed expectations to stderr.
    pub fn new(config: RegistryConfig) -> Self {
        let sink = Box::new(StderrSink::new(config.tool_name.clone()));
        Self::with_sink(config, sink)
    }

    /// Create a registry with a custom reporting sink.
    pub fn with_sink(config: RegistryConfig, sink: Box<dyn MissedRaceSink>) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                arena: RecordArena::new(config.initial_capacity, config.max_records),
                live: Vec::with_capacity(config.initial_capacity),
                registered_total: 0,
                hit_total: 0,
                missed_total: 0,
                reconcile_count: 0,
            }),
            sink,
        }
    }

    /// Record an expected race at `addr`.
    ///
    /// `desc` is copied with silent truncation; `None` stores the empty
    /// description. Registering the same address twice is allowed; the
    /// hit-test matches the most recent registration first.
    pub fn register(&self, addr: usize, file: &'static str, line: u32, desc: Option<&str>) {
        let record = Expectation::new(addr, file, line, desc);
        debug!(
            "add expected race: {} addr={:#x} {}:{}",
            record.description(),
            addr,
            file,
            line
        );

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let idx = inner.arena.insert(record);
        inner.live.push(idx);
        inner.registered_total += 1;
    }

    /// Check whether a race at `addr` was expected.
    ///
    /// On a match the record's hit count is incremented and the caller
    /// should suppress its race report. Records are never removed here;
    /// they stay matchable until [`reconcile_and_clear`].
    ///
    /// [`reconcile_and_clear`]: ExpectationRegistry::reconcile_and_clear
    pub fn hit_test(&self, addr: usize) -> bool {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        // Most recent registration first; first match wins.
        let found = inner
            .live
            .iter()
            .rev()
            .copied()
            .find(|&idx| inner.arena.get(idx).map_or(false, |r| r.addr == addr));

        let Some(idx) = found else {
            return false;
        };

        inner.hit_total += 1;
        if let Some(record) = inner.arena.get_mut(idx) {
            record.hit_count += 1;
            debug!(
                "hit expected race: {} addr={:#x} {}:{}",
                record.description(),
                record.addr,
                record.file,
                record.line
            );
        }
        true
    }

    /// Drain the registry, reporting every expectation never hit.
    ///
    /// Everything registered before the drain acquires the lock is
    /// included; later registrations wait for the next reconciliation.
    /// Calling this on an empty registry is a safe no-op.
    pub fn reconcile_and_clear(&self) {
        let missed = {
            let mut guard = self.inner.lock();
            let inner = &mut *guard;

            let mut missed = Vec::new();
            while let Some(idx) = inner.live.pop() {
                let record = inner.arena.remove(idx);
                if record.hit_count == 0 {
                    missed.push(MissedExpectation {
                        addr: record.addr,
                        file: record.file,
                        line: record.line,
                        description: record.description().to_string(),
                    });
                }
            }
            debug_assert_eq!(inner.arena.live(), 0);
            inner.reconcile_count += 1;
            inner.missed_total += missed.len() as u64;
            missed
        };

        // Reported outside the lock so a sink can never deadlock against
        // register or hit-test reentry.
        for event in &missed {
            self.sink.report_missed(event);
        }
    }

    /// Number of live expectations.
    pub fn len(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Whether no expectations are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit count of the record the hit-test would match for `addr`.
    pub fn hit_count(&self, addr: usize) -> Option<u64> {
        let guard = self.inner.lock();
        guard.live.iter().rev().copied().find_map(|idx| {
            guard
                .arena
                .get(idx)
                .filter(|r| r.addr == addr)
                .map(|r| r.hit_count)
        })
    }

    /// Snapshot of registry counters.
    pub fn stats(&self) -> RegistryStats {
        let guard = self.inner.lock();
        RegistryStats {
            live: guard.live.len(),
            registered_total: guard.registered_total,
            hit_total: guard.hit_total,
            missed_total: guard.missed_total,
            reconcile_count: guard.reconcile_count,
            slot_count: guard.arena.slot_count(),
            slots_reused: guard.arena.reused(),
        }
    }
}

/// Aggregated registry statistics.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Live expectations awaiting reconciliation.
    pub live: usize,

    /// Expectations registered since construction.
    pub registered_total: u64,

    /// Successful hit-tests.
    pub hit_total: u64,

    /// Expectations reported as missed.
    pub missed_total: u64,

    /// Reconciliation passes.
    pub reconcile_count: u64,

    /// Arena slots ever created.
    pub slot_count: usize,

    /// Inserts served from the arena free list.
    pub slots_reused: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;

    fn collecting_registry() -> (ExpectationRegistry, CollectingSink) {
        let sink = CollectingSink::new();
        let registry =
            ExpectationRegistry::with_sink(RegistryConfig::default(), Box::new(sink.clone()));
        (registry, sink)
    }

    #[test]
    fn test_register_then_hit() {
        let (registry, _sink) = collecting_registry();

        assert!(!registry.hit_test(0x1000));
        registry.register(0x1000, "a.rs", 10, Some("producer/consumer"));

        assert!(registry.hit_test(0x1000));
        assert_eq!(registry.hit_count(0x1000), Some(1));

        assert!(registry.hit_test(0x1000));
        assert_eq!(registry.hit_count(0x1000), Some(2));
    }

    #[test]
    fn test_absent_description_stored_empty() {
        let (registry, sink) = collecting_registry();
        registry.register(0x3000, "b.rs", 7, None);
        registry.reconcile_and_clear();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "");
    }

    #[test]
    fn test_same_address_most_recent_wins() {
        let (registry, sink) = collecting_registry();
        registry.register(0x1000, "a.rs", 1, Some("first"));
        registry.register(0x1000, "a.rs", 2, Some("second"));

        assert!(registry.hit_test(0x1000));

        registry.reconcile_and_clear();
        let events = sink.events();
        // The older, unhit record is the one reported missed
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "first");
        assert_eq!(events[0].line, 1);
    }

    #[test]
    fn test_slot_reuse_across_reconcile() {
        let (registry, _sink) = collecting_registry();

        registry.register(0x1000, "a.rs", 1, None);
        registry.hit_test(0x1000);
        registry.reconcile_and_clear();

        registry.register(0x2000, "a.rs", 2, None);
        let stats = registry.stats();
        assert_eq!(stats.slot_count, 1);
        assert_eq!(stats.slots_reused, 1);
        assert_eq!(stats.live, 1);
    }

    #[test]
    fn test_stats_counters() {
        let (registry, _sink) = collecting_registry();

        registry.register(0x1000, "a.rs", 1, None);
        registry.register(0x2000, "a.rs", 2, None);
        registry.hit_test(0x1000);
        registry.hit_test(0x5000);
        registry.reconcile_and_clear();

        let stats = registry.stats();
        assert_eq!(stats.registered_total, 2);
        assert_eq!(stats.hit_total, 1);
        assert_eq!(stats.missed_total, 1);
        assert_eq!(stats.reconcile_count, 1);
        assert_eq!(stats.live, 0);
        assert!(registry.is_empty());
    }
}
