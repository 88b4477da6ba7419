use super::*;

use crate::hashing::{needs_resizing, smeared_hash};
use crate::immutable::{Lookup, MAX_HASH_BUCKET_LENGTH};
use crate::link::{ENDPOINT, UNSET};
use crate::order::{EntryOrder, LinkedOrder};
use crate::raw::RawCompactMap;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasher, Hash, Hasher};

fn validate_raw<K, V, S, O>(m: &RawCompactMap<K, V, S, O>)
where
    K: Hash + Eq,
    S: BuildHasher,
    O: EntryOrder,
{
    let len = m.len();
    assert_eq!(m.keys.len(), len, "keys must track links");
    assert_eq!(m.values.len(), len, "values must track links");
    assert!(m.table.len().is_power_of_two(), "table length {}", m.table.len());
    assert!(
        !needs_resizing(len, m.table.len(), m.load_factor),
        "table of {} buckets overloaded by {len} entries",
        m.table.len()
    );

    let mask = m.table.len() - 1;
    let mut reached = vec![false; len];
    for (bucket, &head) in m.table.iter().enumerate() {
        let mut cur = head;
        while cur != UNSET {
            let slot = cur as usize;
            assert!(slot < len, "bucket {bucket} chains to dead slot {slot}");
            assert!(!reached[slot], "slot {slot} reachable twice");
            reached[slot] = true;

            let link = m.links[slot];
            assert_eq!(
                link.hash(),
                smeared_hash(&m.hash_builder, &m.keys[slot]),
                "stored hash of slot {slot} is stale"
            );
            assert_eq!(
                link.hash() as usize & mask,
                bucket,
                "slot {slot} sits in the wrong bucket"
            );
            cur = link.next();
        }
    }
    assert!(reached.iter().all(|&r| r), "every live slot must be reachable");
    assert_eq!(m.walk().len(), len);
}

fn validate_order(order: &LinkedOrder, len: usize) {
    assert_eq!(order.links.len(), len, "order links must track entries");

    let mut visited = vec![false; len];
    let mut prev = ENDPOINT;
    let mut cur = order.first;
    let mut count = 0usize;
    while cur != ENDPOINT {
        let slot = cur as usize;
        assert!(slot < len, "order chain reaches dead slot {slot}");
        assert!(!visited[slot], "order chain revisits slot {slot}");
        visited[slot] = true;
        assert_eq!(
            order.links[slot].predecessor(),
            prev,
            "predecessor of slot {slot} must mirror its successor"
        );
        prev = cur;
        cur = order.links[slot].successor();
        count += 1;
    }
    assert_eq!(prev, order.last, "last must end the successor chain");
    assert_eq!(count, len, "order chain must cover every entry");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 8)]
    Insert(#[proptest(strategy = "0u16..300")] u16, u32),
    #[proptest(weight = 5)]
    Remove(#[proptest(strategy = "0u16..300")] u16),
    #[proptest(weight = 5)]
    Get(#[proptest(strategy = "0u16..300")] u16),
    #[proptest(weight = 1)]
    Retain(#[proptest(strategy = "2u16..8")] u16),
    #[proptest(weight = 1)]
    ShrinkToFit,
    #[proptest(weight = 1)]
    PopFront,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1500)
}

/// Model for the linked map: entries from front to back.
#[derive(Default)]
struct OrderModel {
    entries: Vec<(u16, u32)>,
    access: bool,
}

impl OrderModel {
    fn position(&self, key: u16) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn insert(&mut self, key: u16, value: u32) -> Option<u32> {
        match self.position(key) {
            Some(p) if self.access => {
                let (_, old) = self.entries.remove(p);
                self.entries.push((key, value));
                Some(old)
            }
            Some(p) => Some(std::mem::replace(&mut self.entries[p].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    fn remove(&mut self, key: u16) -> Option<u32> {
        let p = self.position(key)?;
        Some(self.entries.remove(p).1)
    }

    fn get(&mut self, key: u16) -> Option<u32> {
        let p = self.position(key)?;
        if self.access {
            let entry = self.entries.remove(p);
            self.entries.push(entry);
            return Some(entry.1);
        }
        Some(self.entries[p].1)
    }
}

fn check_linked(ops: Vec<Op>, order: LinkOrder) -> std::result::Result<(), TestCaseError> {
    let mut m: CompactLinkedHashMap<u16, u32> =
        CompactLinkedHashMap::with_capacity_and_hasher(0, order, DefaultHashBuilder::default());
    let mut model = OrderModel {
        access: order == LinkOrder::Access,
        ..OrderModel::default()
    };

    for op in ops {
        match op {
            Op::Insert(key, value) => {
                prop_assert_eq!(m.insert(key, value), model.insert(key, value));
            }
            Op::Remove(key) => {
                prop_assert_eq!(m.remove(&key), model.remove(key));
            }
            Op::Get(key) => {
                prop_assert_eq!(m.get(&key).copied(), model.get(key));
            }
            Op::Retain(modulus) => {
                m.retain(|k, _| k % modulus != 0);
                model.entries.retain(|(k, _)| k % modulus != 0);
            }
            Op::ShrinkToFit => m.shrink_to_fit(),
            Op::PopFront => {
                let expected = (!model.entries.is_empty()).then(|| model.entries.remove(0));
                prop_assert_eq!(m.pop_front(), expected);
            }
        }
        prop_assert_eq!(m.len(), model.entries.len());
    }

    validate_raw(m.raw());
    validate_order(&m.raw().order, m.len());
    let got: Vec<(u16, u32)> = m.iter().map(|(&k, &v)| (k, v)).collect();
    prop_assert_eq!(&got, &model.entries);
    let mut reversed: Vec<(u16, u32)> = m.iter().rev().map(|(&k, &v)| (k, v)).collect();
    reversed.reverse();
    prop_assert_eq!(reversed, got);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_dense_equivalence(ops in ops_strategy()) {
        let mut m: CompactHashMap<u16, u32> = CompactHashMap::with_capacity(0);
        let mut model: HashMap<u16, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(m.insert(key, value), model.insert(key, value));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(m.remove(&key), model.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(m.get(&key), model.get(&key));
                }
                Op::Retain(modulus) => {
                    m.retain(|k, _| k % modulus != 0);
                    model.retain(|k, _| k % modulus != 0);
                }
                Op::ShrinkToFit => m.shrink_to_fit(),
                // No order to pop from; treat as a clear-and-refill round trip.
                Op::PopFront => {
                    let entries: Vec<(u16, u32)> = m.iter().map(|(&k, &v)| (k, v)).collect();
                    m.clear();
                    prop_assert!(m.is_empty());
                    m.extend(entries);
                }
            }
            prop_assert_eq!(m.len(), model.len());
        }

        validate_raw(m.raw());
        let got: HashMap<u16, u32> = m.into_iter().collect();
        prop_assert_eq!(got, model);
    }

    #[test]
    fn prop_insertion_order_equivalence(ops in ops_strategy()) {
        check_linked(ops, LinkOrder::Insertion)?;
    }

    #[test]
    fn prop_access_order_equivalence(ops in ops_strategy()) {
        check_linked(ops, LinkOrder::Access)?;
    }

    #[test]
    fn prop_cursor_removal_visits_everything(
        keys in prop::collection::hash_set(any::<u16>(), 0..300),
        modulus in 2u16..6,
    ) {
        let mut dense: CompactHashMap<u16, u16> = keys.iter().map(|&k| (k, k)).collect();
        let mut linked: CompactLinkedHashMap<u16, u16> = keys.iter().map(|&k| (k, k)).collect();
        let linked_order: Vec<u16> = linked.keys().copied().collect();

        let mut cursor = dense.cursor();
        let mut seen = Vec::new();
        loop {
            let Some(k) = dense.cursor_next(&mut cursor).unwrap().map(|(&k, _)| k) else {
                break;
            };
            seen.push(k);
            if k % modulus == 0 {
                prop_assert_eq!(dense.cursor_remove(&mut cursor).unwrap(), (k, k));
            }
        }
        let seen_set: HashSet<u16> = seen.iter().copied().collect();
        prop_assert_eq!(seen.len(), keys.len());
        prop_assert_eq!(&seen_set, &keys);
        validate_raw(dense.raw());

        let mut cursor = linked.cursor();
        let mut seen = Vec::new();
        loop {
            let Some(k) = linked.cursor_next(&mut cursor).unwrap().map(|(&k, _)| k) else {
                break;
            };
            seen.push(k);
            if k % modulus == 0 {
                linked.cursor_remove(&mut cursor).unwrap();
            }
        }
        prop_assert_eq!(&seen, &linked_order);
        validate_raw(linked.raw());
        validate_order(&linked.raw().order, linked.len());

        let survivors: Vec<u16> =
            linked_order.iter().copied().filter(|k| k % modulus != 0).collect();
        prop_assert_eq!(linked.keys().copied().collect::<Vec<_>>(), survivors);
        prop_assert_eq!(dense.len(), linked.len());
    }
}

/// Key whose hash only sees `self.0 % 3`, so most keys share a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Clumped(u8);

impl Hash for Clumped {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.0 % 3);
    }
}

/// First entry that repeats an earlier projection, as `(existing, conflicting)`.
fn first_repeat<E, T, P>(entries: &[E], project: P) -> Option<(usize, usize)>
where
    T: Hash + Eq,
    P: Fn(&E) -> T,
{
    let mut first_seen = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        if let Some(&earlier) = first_seen.get(&project(entry)) {
            return Some((earlier, i));
        }
        first_seen.insert(project(entry), i);
    }
    None
}

fn clumped_entries() -> impl Strategy<Value = Vec<(Clumped, u16)>> {
    prop::collection::vec((any::<u8>().prop_map(Clumped), any::<u16>()), 0..64)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_immutable_map_matches_model(entries in clumped_entries()) {
        let built = ImmutableMap::try_from_iter(entries.clone());
        match first_repeat(&entries, |e| e.0) {
            Some((existing, conflicting)) => {
                prop_assert_eq!(
                    built.err(),
                    Some(BuildError::DuplicateKey {
                        existing: entries[existing],
                        conflicting: entries[conflicting],
                    })
                );
            }
            None => {
                let map = built.unwrap();
                prop_assert_eq!(map.len(), entries.len());
                let got: Vec<(Clumped, u16)> = map.iter().map(|(&k, &v)| (k, v)).collect();
                prop_assert_eq!(&got, &entries);
                for (k, v) in &entries {
                    prop_assert_eq!(map.get(k), Some(v));
                }
                let present: HashSet<u8> = entries.iter().map(|(k, _)| k.0).collect();
                for probe in (0..=u8::MAX).filter(|b| !present.contains(b)) {
                    prop_assert_eq!(map.get(&Clumped(probe)), None);
                }
                // A third of the keys share a hash; long inputs must fall back.
                if entries.len() > 3 * MAX_HASH_BUCKET_LENGTH {
                    prop_assert!(map.index.is_fallback());
                }
            }
        }
    }

    #[test]
    fn prop_immutable_bimap_matches_model(
        entries in prop::collection::vec((any::<u8>().prop_map(Clumped), 0u8..80), 0..40),
    ) {
        let built = ImmutableBiMap::try_from_iter(entries.clone());
        let key_clash = first_repeat(&entries, |e| e.0);
        let value_clash = first_repeat(&entries, |e| e.1);
        let expected = match (key_clash, value_clash) {
            (Some(k), Some(v)) if v.1 < k.1 => Some(BuildError::DuplicateValue {
                existing: entries[v.0],
                conflicting: entries[v.1],
            }),
            (Some(k), _) => Some(BuildError::DuplicateKey {
                existing: entries[k.0],
                conflicting: entries[k.1],
            }),
            (None, Some(v)) => Some(BuildError::DuplicateValue {
                existing: entries[v.0],
                conflicting: entries[v.1],
            }),
            (None, None) => None,
        };

        match expected {
            Some(err) => prop_assert_eq!(built.err(), Some(err)),
            None => {
                let bimap = built.unwrap();
                for (k, v) in &entries {
                    prop_assert_eq!(bimap.get(k), Some(v));
                    prop_assert_eq!(bimap.inverse().get(v), Some(k));
                }
                let inverse = bimap.clone().into_inverse();
                for (k, v) in &entries {
                    prop_assert_eq!(inverse.get(v), Some(k));
                }
                prop_assert_eq!(inverse.into_inverse(), bimap);
            }
        }
    }
}

fn clumped_key(e: &(Clumped, u8)) -> &Clumped {
    &e.0
}

#[test]
fn lookup_modes_agree_on_clumped_keys() {
    let hb = DefaultHashBuilder::default();
    let entries: Vec<(Clumped, u8)> = (0..=u8::MAX).map(|b| (Clumped(b), b)).collect();
    let built = ImmutableMap::try_from_iter(entries.clone()).unwrap();
    assert!(built.index.is_fallback());

    let fallback = Lookup::fallback(&entries, &clumped_key, &hb).unwrap();
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(built.get(&entry.0), Some(&entry.1));
        assert_eq!(fallback.find(&entries, clumped_key, &hb, &entry.0), Some(i));
    }
}
