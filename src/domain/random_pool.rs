/// Set with O(1) insert, remove and uniform random removal.
///
/// Members are kept densely in `items`; `index` maps each member back to
/// its slot. Removal swaps the last member into the hole, so the dense
/// array never has gaps and a random slot is always a live member.

use std::collections::HashMap;
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct RandomPool<T, R = StdRng> {
    items: Vec<T>,
    index: HashMap<T, usize>,
    rng: R,
}

impl<T: Eq + Hash + Clone> RandomPool<T, StdRng> {
    /// Pool seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<T: Eq + Hash + Clone, R: Rng> RandomPool<T, R> {
    pub fn with_rng(rng: R) -> Self {
        RandomPool { items: Vec::new(), index: HashMap::new(), rng }
    }

    /// Adds `value`. Returns false if it was already a member.
    pub fn insert(&mut self, value: T) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        self.index.insert(value.clone(), self.items.len());
        self.items.push(value);
        true
    }

    /// Removes `value`. Returns false if it was not a member.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(slot) = self.index.remove(value) else {
            return false;
        };
        self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(moved.clone(), slot);
        }
        true
    }

    /// Removes and returns a uniformly chosen member, or `None` when empty.
    pub fn pop_random(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let slot = self.rng.gen_range(0..self.items.len());
        let value = self.items[slot].clone();
        self.remove(&value);
        Some(value)
    }

    #[cfg(test)]
    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T: Eq + Hash + Clone> Default for RandomPool<T, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}
