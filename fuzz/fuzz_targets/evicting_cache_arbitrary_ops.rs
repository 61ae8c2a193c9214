#![no_main]

use evictkit::builder::CacheConfig;
use evictkit::cache::EvictingCore;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on EvictingCore
//
// The first two bytes pick the bounds; the rest is a stream of
// (op, key, arg) triples. Invariants and both bounds are checked after
// every operation.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = match data[0] % 17 {
        16 => None,
        c => Some(usize::from(c)),
    };
    let cost_limit = match data[1] % 65 {
        0 => None,
        w => Some(u64::from(w)),
    };
    let config = CacheConfig {
        capacity,
        cost_limit,
        default_cost: 1,
    };
    let mut cache: EvictingCore<u8, u32> = EvictingCore::with_config(config);

    for chunk in data[2..].chunks_exact(3) {
        let key = chunk[1] % 32;
        let arg = chunk[2];

        match chunk[0] % 10 {
            0 => {
                cache.insert(key, u32::from(arg));
                if cache.contains(&key) {
                    assert_eq!(cache.cost_of(&key), Some(1));
                }
            }
            1 => {
                let cost = u64::from(arg % 24);
                cache.insert_with_cost(key, u32::from(arg), cost);
                if cost == 0 && cache.capacity() != Some(0) {
                    // Freshly inserted zero-cost entries are MRU and can only
                    // leave through capacity.
                    assert!(cache.contains(&key));
                }
            }
            2 => {
                let peeked = cache.peek(&key).copied();
                assert_eq!(cache.get(&key).copied(), peeked);
            }
            3 => {
                let present = cache.contains(&key);
                assert_eq!(cache.remove(&key).is_some(), present);
                assert!(!cache.contains(&key));
            }
            4 => {
                let present = cache.contains(&key);
                assert_eq!(cache.touch(&key), present);
            }
            5 => {
                let expected = cache.peek_lru().map(|(k, v)| (*k, *v));
                assert_eq!(cache.pop_lru(), expected);
            }
            6 => {
                let next = if arg % 4 == 0 { None } else { Some(usize::from(arg % 16)) };
                cache.set_capacity(next);
            }
            7 => {
                let next = if arg % 4 == 0 { None } else { Some(u64::from(arg % 64)) };
                cache.set_cost_limit(next);
            }
            8 => {
                let value = if arg % 2 == 0 { Some(u32::from(arg)) } else { None };
                cache.set(key, value);
                if value.is_none() {
                    assert!(!cache.contains(&key));
                }
            }
            _ => {
                cache.clear();
                assert!(cache.is_empty());
                assert_eq!(cache.total_cost(), 0);
            }
        }

        if let Err(e) = cache.check_invariants() {
            panic!("invariant violated: {}", e);
        }
    }
});
