//! Per-scalar time→value storage with interpolation.
//!
//! A store is either static (no keys, the owning parameter's constant value
//! applies) or keyed (value is a function of query time). Keys are held in a
//! time-ordered vector with unique times; insertion order is irrelevant.
//!
//! Sampling rules:
//! - exact hit returns the stored value;
//! - queries before the first / after the last key clamp to that key;
//! - inside a segment, numeric stores interpolate linearly and non-numeric
//!   stores hold the left key (step).
//!
//! The first non-numeric value inserted permanently downgrades the store to
//! step mode; later numeric keys never restore interpolation.

use serde::{Deserialize, Serialize};

use primgraph_api_core::Scalar;

/// One time sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: Scalar,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeStore {
    keys: Vec<Keyframe>,
    numeric: bool,
}

impl Default for KeyframeStore {
    fn default() -> Self {
        KeyframeStore {
            keys: Vec::new(),
            numeric: true,
        }
    }
}

impl KeyframeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, time: f32) -> Result<usize, usize> {
        self.keys.binary_search_by(|k| k.time.total_cmp(&time))
    }

    /// Insert or overwrite the value at `time`.
    pub fn set_key(&mut self, time: f32, value: Scalar) {
        if !value.is_numeric() {
            // One-way: the store never returns to interpolating mode.
            self.numeric = false;
        }
        match self.position(time) {
            Ok(i) => self.keys[i].value = value,
            Err(i) => self.keys.insert(i, Keyframe { time, value }),
        }
    }

    pub fn remove_key(&mut self, time: f32) -> Option<Scalar> {
        match self.position(time) {
            Ok(i) => Some(self.keys.remove(i).value),
            Err(_) => None,
        }
    }

    /// Drop every key, returning the store to static mode. The numeric
    /// downgrade is not reversed.
    pub fn clear_keys(&mut self) {
        self.keys.clear();
    }

    #[inline]
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether values interpolate (false once any non-numeric key was set).
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// Keyframes in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Keyframe> {
        self.keys.iter()
    }

    /// Key times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = f32> + '_ {
        self.keys.iter().map(|k| k.time)
    }

    /// Sample the store at `time`. `None` only when the store is static.
    pub fn value_at(&self, time: f32) -> Option<Scalar> {
        if self.keys.is_empty() {
            return None;
        }
        match self.position(time) {
            Ok(i) => Some(self.keys[i].value.clone()),
            Err(0) => Some(self.keys[0].value.clone()),
            Err(i) if i == self.keys.len() => self.keys.last().map(|k| k.value.clone()),
            Err(i) => {
                let before = &self.keys[i - 1];
                let after = &self.keys[i];
                if self.numeric {
                    // before.time != after.time whenever both bracket `time`,
                    // so the denominator is never zero.
                    let t = (time - before.time) / (after.time - before.time);
                    Some(Scalar::lerp(&before.value, &after.value, t))
                } else {
                    Some(before.value.clone())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyed(pairs: &[(f32, f32)]) -> KeyframeStore {
        let mut store = KeyframeStore::new();
        for (t, v) in pairs {
            store.set_key(*t, Scalar::Float(*v));
        }
        store
    }

    #[test]
    fn set_then_read_back_exact() {
        let mut store = KeyframeStore::new();
        store.set_key(3.5, Scalar::Float(7.25));
        assert_eq!(store.value_at(3.5), Some(Scalar::Float(7.25)));
    }

    #[test]
    fn overwrite_keeps_key_unique() {
        let mut store = keyed(&[(1.0, 1.0)]);
        store.set_key(1.0, Scalar::Float(2.0));
        assert_eq!(store.len(), 1);
        assert_eq!(store.value_at(1.0), Some(Scalar::Float(2.0)));
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let a = keyed(&[(0.0, 0.0), (10.0, 10.0), (5.0, 2.0)]);
        let b = keyed(&[(5.0, 2.0), (0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(a, b);
        assert_eq!(a.times().collect::<Vec<_>>(), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn linear_interpolation_and_clamps() {
        let store = keyed(&[(0.0, 0.0), (10.0, 10.0)]);
        assert_eq!(store.value_at(5.0), Some(Scalar::Float(5.0)));
        assert_eq!(store.value_at(-1.0), Some(Scalar::Float(0.0)));
        assert_eq!(store.value_at(20.0), Some(Scalar::Float(10.0)));
    }

    #[test]
    fn non_numeric_downgrade_holds() {
        let mut store = KeyframeStore::new();
        store.set_key(0.0, Scalar::Text("a".into()));
        store.set_key(10.0, Scalar::Text("b".into()));
        assert_eq!(store.value_at(5.0), Some(Scalar::Text("a".into())));
    }

    #[test]
    fn downgrade_is_one_way() {
        let mut store = KeyframeStore::new();
        store.set_key(0.0, Scalar::Text("a".into()));
        store.clear_keys();
        store.set_key(0.0, Scalar::Float(0.0));
        store.set_key(10.0, Scalar::Float(10.0));
        // Still step mode: the first non-numeric key decided for good.
        assert_eq!(store.value_at(5.0), Some(Scalar::Float(0.0)));
        assert!(!store.is_numeric());
    }

    #[test]
    fn empty_store_is_static() {
        let store = KeyframeStore::new();
        assert_eq!(store.value_at(0.0), None);
        assert!(!store.has_keys());
    }

    #[test]
    fn remove_and_clear() {
        let mut store = keyed(&[(0.0, 1.0), (5.0, 2.0)]);
        assert_eq!(store.remove_key(5.0), Some(Scalar::Float(2.0)));
        assert_eq!(store.remove_key(5.0), None);
        store.clear_keys();
        assert!(store.is_empty());
        assert_eq!(store.value_at(0.0), None);
    }

    #[test]
    fn single_key_clamps_everywhere() {
        let store = keyed(&[(4.0, 9.0)]);
        assert_eq!(store.value_at(-100.0), Some(Scalar::Float(9.0)));
        assert_eq!(store.value_at(100.0), Some(Scalar::Float(9.0)));
    }
}
