use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

#[derive(Debug, Clone)]
struct Slot<V> {
    generation: u64,
    value: V,
}

/// Associative sequence ordered by last touch, oldest first.
///
/// Every touch appends a `(generation, key)` marker and bumps the key's
/// generation; markers whose generation no longer matches are stale and are
/// skipped during iteration. Stale markers are compacted once they outnumber
/// the live ones, so move-to-end is amortized O(1).
#[derive(Debug, Clone)]
pub struct RecencyMap<K, V> {
    entries: HashMap<K, Slot<V>>,
    order: VecDeque<(u64, K)>,
    next_generation: u64,
}

impl<K, V> Default for RecencyMap<K, V> {
    fn default() -> Self {
        RecencyMap {
            entries: HashMap::new(),
            order: VecDeque::new(),
            next_generation: 0,
        }
    }
}

impl<K, V> RecencyMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and moves `key` to the newest position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let generation = self.bump();
        let previous = self.entries.insert(key.clone(), Slot { generation, value });
        self.order.push_back((generation, key));
        self.maybe_compact();
        previous.map(|slot| slot.value)
    }

    /// Moves `key` to the newest position without changing its value.
    pub fn touch(&mut self, key: &K) -> bool {
        if !self.entries.contains_key(key) {
            return false;
        }
        let generation = self.bump();
        if let Some(slot) = self.entries.get_mut(key) {
            slot.generation = generation;
        }
        self.order.push_back((generation, key.clone()));
        self.maybe_compact();
        true
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = self.entries.remove(key).map(|slot| slot.value);
        if removed.is_some() {
            self.maybe_compact();
        }
        removed
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Mutable access that does not count as a touch.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key).map(|slot| &mut slot.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entries, least recently touched first.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order.iter().filter_map(move |(generation, key)| {
            self.entries
                .get(key)
                .filter(|slot| slot.generation == *generation)
                .map(|slot| (key, &slot.value))
        })
    }

    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(key, _)| key.clone()).collect()
    }

    fn bump(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }

    fn maybe_compact(&mut self) {
        if self.order.len() <= self.entries.len() * 2 + 16 {
            return;
        }
        let entries = &self.entries;
        self.order.retain(|(generation, key)| {
            entries
                .get(key)
                .map(|slot| slot.generation == *generation)
                .unwrap_or(false)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::RecencyMap;

    #[test]
    fn retouching_moves_key_to_the_end() {
        let mut map = RecencyMap::new();
        map.insert(("part_a", "x"), 1);
        map.insert(("part_b", "y"), 2);
        map.insert(("part_a", "x"), 3);
        let order: Vec<_> = map.iter().map(|(key, value)| (*key, *value)).collect();
        assert_eq!(order, vec![(("part_b", "y"), 2), (("part_a", "x"), 3)]);
    }

    #[test]
    fn get_mut_keeps_position() {
        let mut map = RecencyMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        *map.get_mut(&"a").expect("a present") = 10;
        assert_eq!(map.keys(), vec!["a", "b"]);
        assert_eq!(map.get(&"a"), Some(&10));
    }

    #[test]
    fn removed_keys_disappear_and_can_return() {
        let mut map = RecencyMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.remove(&"a"), Some(1));
        assert_eq!(map.keys(), vec!["b"]);
        map.insert("a", 5);
        assert_eq!(map.keys(), vec!["b", "a"]);
        assert!(map.touch(&"b"));
        assert!(!map.touch(&"missing"));
        assert_eq!(map.keys(), vec!["a", "b"]);
    }

    #[test]
    fn compaction_preserves_order() {
        let mut map = RecencyMap::new();
        for round in 0..200 {
            map.insert(round % 3, round);
        }
        assert_eq!(map.len(), 3);
        assert_eq!(map.keys(), vec![2, 0, 1]);
        assert!(map.order.len() <= map.entries.len() * 2 + 17);
    }
}
