//! Bucketed string-keyed dictionary.
//!
//! [`Dict`] hashes a key to one of a fixed number of buckets chosen at
//! construction; there is no rehashing. Each bucket holds a pair of parallel
//! [`Array`]s (keys and values) scanned linearly for an exact key match.
//! Within a bucket keys keep insertion order.
//!
//! A key set that concentrates in one bucket degrades lookups in that bucket
//! to O(n). Results stay correct regardless of bucket distribution.

use crate::array::Array;

/// Hash function mapping a key to a bucket selector.
pub type HashFn = fn(&str) -> u64;

/// Default number of buckets for [`Dict::new`].
pub const DEFAULT_BUCKETS: usize = 64;

/// Multiplicative string hash (`h = h * 33 + byte`, seeded with 5381).
///
/// Deterministic across runs and platforms.
pub fn string_hash(key: &str) -> u64 {
    key.bytes()
        .fold(5381u64, |h, b| h.wrapping_mul(33).wrapping_add(b as u64))
}

#[derive(Debug, Clone)]
struct Bucket<V> {
    keys: Array<String>,
    values: Array<V>,
}

impl<V> Bucket<V> {
    fn new() -> Self {
        Self {
            keys: Array::new(),
            values: Array::new(),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

/// String-keyed dictionary with a fixed bucket count.
#[derive(Debug, Clone)]
pub struct Dict<V> {
    buckets: Vec<Bucket<V>>,
    len: usize,
    hasher: HashFn,
}

impl<V> Default for Dict<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Dict<V> {
    /// Create a dictionary with [`DEFAULT_BUCKETS`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Create a dictionary with `num_buckets` buckets (at least one).
    pub fn with_buckets(num_buckets: usize) -> Self {
        Self::with_hasher(num_buckets, string_hash)
    }

    /// Create a dictionary with a custom hash function.
    pub fn with_hasher(num_buckets: usize, hasher: HashFn) -> Self {
        let num_buckets = num_buckets.max(1);
        Self {
            buckets: (0..num_buckets).map(|_| Bucket::new()).collect(),
            len: 0,
            hasher,
        }
    }

    /// Number of buckets fixed at construction.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of entries across all buckets.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_index(&self, key: &str) -> usize {
        ((self.hasher)(key) % self.buckets.len() as u64) as usize
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        let bucket = &self.buckets[self.bucket_index(key)];
        bucket.position(key).map(|i| &bucket.values[i])
    }

    /// Get a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        bucket.position(key).map(|i| &mut bucket.values[i])
    }

    /// Check whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Store `value` under `key`.
    ///
    /// Updates the existing slot in place when the key is present and
    /// returns the previous value; otherwise appends a new key/slot pair to
    /// the bucket and returns `None`.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        let index = self.bucket_index(&key);
        let bucket = &mut self.buckets[index];
        match bucket.position(&key) {
            Some(i) => Some(std::mem::replace(&mut bucket.values[i], value)),
            None => {
                bucket.keys.append(key);
                bucket.values.append(value);
                self.len += 1;
                None
            }
        }
    }

    /// Remove `key`, compacting its bucket. Returns the removed value.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        let i = bucket.position(key)?;
        bucket.keys.remove_one(i as isize);
        let value = bucket.values.remove_one(i as isize);
        if value.is_some() {
            self.len -= 1;
        }
        value
    }

    /// Remove every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.keys.clear();
            bucket.values.clear();
        }
        self.len = 0;
    }

    /// Iterate over keys, bucket by bucket.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .flat_map(|b| b.keys.iter().map(String::as_str))
    }

    /// Iterate over values, in the same order as [`Dict::keys`].
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.buckets.iter().flat_map(|b| b.values.iter())
    }

    /// Iterate over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.buckets.iter().flat_map(|b| {
            b.keys
                .iter()
                .map(String::as_str)
                .zip(b.values.iter())
        })
    }

    /// Length of the longest bucket.
    pub fn max_bucket_len(&self) -> usize {
        self.buckets.iter().map(|b| b.keys.len()).max().unwrap_or(0)
    }
}

impl<V: Clone> Dict<V> {
    /// Copy every entry of `other` into this dictionary.
    ///
    /// Keys already present are skipped unless `override_existing` is set.
    /// Returns the number of entries written.
    pub fn merge(&mut self, other: &Dict<V>, override_existing: bool) -> usize {
        let mut written = 0;
        for (key, value) in other.iter() {
            if !override_existing && self.contains_key(key) {
                continue;
            }
            self.set(key, value.clone());
            written += 1;
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collide(_: &str) -> u64 {
        7
    }

    #[test]
    fn test_set_get_update() {
        let mut dict = Dict::new();
        assert_eq!(dict.set("alpha", 1), None);
        assert_eq!(dict.set("beta", 2), None);
        assert_eq!(dict.set("alpha", 10), Some(1));

        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("alpha"), Some(&10));
        assert_eq!(dict.get("beta"), Some(&2));
        assert_eq!(dict.get("gamma"), None);
    }

    #[test]
    fn test_collisions_stay_correct() {
        let mut dict = Dict::with_hasher(16, collide);
        let keys: Vec<String> = (0..50).map(|i| format!("key_{i}")).collect();
        for (i, key) in keys.iter().enumerate() {
            dict.set(key.as_str(), i);
        }

        assert_eq!(dict.len(), 50);
        assert_eq!(dict.max_bucket_len(), 50);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(dict.get(key), Some(&i));
        }

        // Insertion order is kept within the bucket.
        let order: Vec<&str> = dict.keys().collect();
        assert_eq!(order.first(), Some(&"key_0"));
        assert_eq!(order.last(), Some(&"key_49"));
    }

    #[test]
    fn test_remove_compacts_bucket() {
        let mut dict = Dict::with_buckets(1);
        dict.set("a", 1);
        dict.set("b", 2);
        dict.set("c", 3);

        assert_eq!(dict.remove("b"), Some(2));
        assert_eq!(dict.remove("b"), None);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(dict.get("c"), Some(&3));
    }

    #[test]
    fn test_merge_override() {
        let mut base = Dict::new();
        base.set("keep", 1);
        base.set("shared", 2);

        let mut other = Dict::new();
        other.set("shared", 20);
        other.set("new", 30);

        let mut merged = base.clone();
        assert_eq!(merged.merge(&other, false), 1);
        assert_eq!(merged.get("shared"), Some(&2));
        assert_eq!(merged.get("new"), Some(&30));

        assert_eq!(base.merge(&other, true), 2);
        assert_eq!(base.get("shared"), Some(&20));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_zero_buckets_clamped() {
        let mut dict = Dict::with_buckets(0);
        assert_eq!(dict.num_buckets(), 1);
        dict.set("x", ());
        assert!(dict.contains_key("x"));
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut dict = Dict::new();
        dict.set("count", 1);
        if let Some(v) = dict.get_mut("count") {
            *v += 1;
        }
        assert_eq!(dict.get("count"), Some(&2));

        dict.clear();
        assert!(dict.is_empty());
        assert_eq!(dict.get("count"), None);
        assert_eq!(dict.num_buckets(), DEFAULT_BUCKETS);
    }

    #[test]
    fn test_string_hash_is_stable() {
        assert_eq!(string_hash(""), 5381);
        assert_eq!(string_hash("a"), 5381 * 33 + 97);
    }
}
