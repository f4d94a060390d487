//! Animation Cache
//!
//! Memoizes, per structural signature, what an animation probe found so
//! identical requests can skip the expensive computed-style lookup.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use fos_dom::Element;

/// Data slot holding a parent's identity token
const PARENT_KEY: &str = "animate-parent-key";

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    count: usize,
    value: V,
    is_valid: bool,
}

/// Signature-keyed cache of probe results
#[derive(Debug)]
pub struct AnimationCache<V> {
    entries: RefCell<HashMap<String, CacheEntry<V>>>,
    parent_counter: Cell<u64>,
}

impl<V> Default for AnimationCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AnimationCache<V> {
    pub fn new() -> Self {
        Self { entries: RefCell::new(HashMap::new()), parent_counter: Cell::new(0) }
    }

    /// `<parent token> <event> <class attribute> [add] [remove]`
    pub fn cache_key(&self, node: &Element, event: &str, add: Option<&str>, remove: Option<&str>) -> String {
        let token = node.parent().map(|parent| self.parent_token(&parent)).unwrap_or(0);
        let mut parts = vec![token.to_string(), event.to_string(), node.class_attribute()];
        parts.extend(add.filter(|s| !s.is_empty()).map(str::to_string));
        parts.extend(remove.filter(|s| !s.is_empty()).map(str::to_string));
        parts.join(" ")
    }

    fn parent_token(&self, parent: &Element) -> u64 {
        if let Some(token) = parent.data(PARENT_KEY).and_then(|t| t.parse().ok()) {
            return token;
        }
        let token = self.parent_counter.get() + 1;
        self.parent_counter.set(token);
        parent.set_data(PARENT_KEY, &token.to_string());
        token
    }

    /// Store `value`; repeated puts bump the count and keep the first validity
    pub fn put(&self, key: &str, value: V, is_valid: bool) {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.count += 1;
                entry.value = value;
            }
            None => {
                entries.insert(key.to_string(), CacheEntry { count: 1, value, is_valid });
            }
        }
    }

    /// Times `key` has been stored since the last flush
    pub fn count(&self, key: &str) -> usize {
        self.entries.borrow().get(key).map_or(0, |e| e.count)
    }

    /// True only for a known signature found to have no visible animation
    pub fn contains_cached_animation_without_duration(&self, key: &str) -> bool {
        self.entries.borrow().get(key).is_some_and(|e| !e.is_valid)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop every entry
    pub fn flush(&self) {
        let mut entries = self.entries.borrow_mut();
        if !entries.is_empty() {
            tracing::trace!("Flushing animation cache ({} entries)", entries.len());
        }
        entries.clear();
    }
}

impl<V: Clone> AnimationCache<V> {
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.borrow().get(key).map(|e| e.value.clone())
    }
}
