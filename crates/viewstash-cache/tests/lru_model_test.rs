//! Property tests comparing BoundedCache against a straightforward LRU model.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use viewstash_cache::BoundedCache;

#[derive(Debug, Clone)]
enum Op {
    Get(u8),
    Put(u8, u32),
    Remove(u8),
    Contains(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = 0u8..8;
    prop_oneof![
        key.clone().prop_map(Op::Get),
        (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        key.clone().prop_map(Op::Remove),
        key.prop_map(Op::Contains),
    ]
}

/// Reference model: front is least recently used.
struct Model {
    capacity: usize,
    entries: VecDeque<(u8, u32)>,
    evicted: Vec<(u8, u32)>,
}

impl Model {
    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.position(key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_back(entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u8, value: u32) -> Option<u32> {
        if let Some(pos) = self.position(key) {
            let (_, previous) = self.entries.remove(pos)?;
            self.entries.push_back((key, value));
            return Some(previous);
        }
        if self.entries.len() == self.capacity {
            if let Some(oldest) = self.entries.pop_front() {
                self.evicted.push(oldest);
            }
        }
        self.entries.push_back((key, value));
        None
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        let pos = self.position(key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }

    fn contains(&self, key: u8) -> bool {
        self.position(key).is_some()
    }
}

proptest! {
    /// Property: the cache never holds more than its capacity.
    #[test]
    fn capacity_is_never_exceeded(
        capacity in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let cache = BoundedCache::new(capacity);
        for op in ops {
            match op {
                Op::Get(k) => { cache.get(&k); }
                Op::Put(k, v) => { cache.put(k, v); }
                Op::Remove(k) => { cache.remove(&k); }
                Op::Contains(k) => { cache.contains_key(&k); }
            }
            prop_assert!(cache.len() <= capacity);
        }
    }

    /// Property: results, evictions and final contents match the LRU model.
    #[test]
    fn matches_lru_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let cache = BoundedCache::with_listener(capacity, move |k: u8, v: u32| sink.lock().push((k, v)));
        let mut model = Model { capacity, entries: VecDeque::new(), evicted: Vec::new() };

        for op in ops {
            match op {
                Op::Get(k) => { prop_assert_eq!(cache.get(&k), model.get(k)); }
                Op::Put(k, v) => { prop_assert_eq!(cache.put(k, v), model.put(k, v)); }
                Op::Remove(k) => { prop_assert_eq!(cache.remove(&k), model.remove(k)); }
                Op::Contains(k) => { prop_assert_eq!(cache.contains_key(&k), model.contains(k)); }
            }
        }

        prop_assert_eq!(&*evicted.lock(), &model.evicted);

        let expected: Vec<u32> = model.entries.iter().rev().map(|(_, v)| *v).collect();
        prop_assert_eq!(cache.values(), expected);
    }
}
