//! Change-tracking session namespace.
//!
//! `TrackedNamespace` behaves as a standard insertion-ordered, key-unique
//! mapping, but every mutating operation also records its effect so the
//! session controller can report partial updates to the client instead of
//! re-scanning the whole namespace after each execution.
//!
//! The watch state is a composition over a plain store rather than a
//! subclassed mapping: one struct owns the store and the two auxiliary
//! collections, and the mapping interface below is the only way to mutate
//! them together.

use std::fmt;

use ahash::AHashSet;
use indexmap::IndexMap;

use crate::value::Value;

/// Error type for namespace mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// The named variable does not exist.
    UnknownName(String),
}

impl fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownName(name) => write!(f, "name '{name}' is not defined"),
        }
    }
}

impl std::error::Error for NamespaceError {}

/// Snapshot of the changes accumulated since the last watch reset.
///
/// Both collections are copies; reading them never disturbs the live watch
/// state. A name present in both means it was removed and then re-assigned
/// (or assigned and then removed) inside one window -- both facts are
/// reported.
#[derive(Debug, Clone, Default)]
pub struct NamespaceChanges {
    /// Latest value for every name assigned in the window.
    pub assigned: IndexMap<String, Value>,
    /// Names actually removed in the window.
    pub removed: AHashSet<String>,
}

impl NamespaceChanges {
    /// Returns true when nothing was assigned or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.removed.is_empty()
    }
}

/// An insertion-ordered name-to-value mapping that records assignments and
/// removals since the last watch reset.
///
/// A value mutated in place through `get_mut` is not recorded; only
/// rebinding a name through the mapping interface is observed. This is the
/// namespace's documented blind spot.
#[derive(Debug, Clone, Default)]
pub struct TrackedNamespace {
    /// The live name-to-value store.
    store: IndexMap<String, Value>,
    /// Latest value per name assigned since the last reset.
    assigned: IndexMap<String, Value>,
    /// Names removed since the last reset.
    removed: AHashSet<String>,
}

impl TrackedNamespace {
    /// Creates an empty namespace with empty watch state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `name` and records the assignment.
    ///
    /// Re-assigning a name overwrites both the stored value and the
    /// recorded one, preserving the last write.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.store.insert(name.clone(), value.clone());
        self.assigned.insert(name, value);
    }

    /// Merges entries into the namespace; each is recorded like [`insert`].
    ///
    /// [`insert`]: Self::insert
    pub fn update(&mut self, entries: impl IntoIterator<Item = (String, Value)>) {
        for (name, value) in entries {
            self.insert(name, value);
        }
    }

    /// Inserts `default` under `name` when absent, recording it like an
    /// assignment; otherwise returns the existing value unrecorded.
    pub fn set_default(&mut self, name: &str, default: Value) -> &Value {
        match self.store.entry(name.to_owned()) {
            indexmap::map::Entry::Occupied(entry) => entry.into_mut(),
            indexmap::map::Entry::Vacant(entry) => {
                self.assigned.insert(name.to_owned(), default.clone());
                entry.insert(default)
            }
        }
    }

    /// Removes `name` from the namespace and records the removal.
    ///
    /// # Errors
    /// Returns [`NamespaceError::UnknownName`] when the name is absent; an
    /// absent name records nothing.
    pub fn remove(&mut self, name: &str) -> Result<Value, NamespaceError> {
        match self.store.shift_remove(name) {
            Some(value) => {
                self.removed.insert(name.to_owned());
                Ok(value)
            }
            None => Err(NamespaceError::UnknownName(name.to_owned())),
        }
    }

    /// Removes and returns the value under `name`, recording the removal.
    ///
    /// # Errors
    /// Returns [`NamespaceError::UnknownName`] when the name is absent.
    pub fn pop(&mut self, name: &str) -> Result<Value, NamespaceError> {
        self.remove(name)
    }

    /// Removes and returns the value under `name`, or returns `default`.
    ///
    /// The removal is recorded only when an entry actually existed; falling
    /// back to the default leaves the watch state untouched.
    pub fn pop_or(&mut self, name: &str, default: Value) -> Value {
        match self.store.shift_remove(name) {
            Some(value) => {
                self.removed.insert(name.to_owned());
                value
            }
            None => default,
        }
    }

    /// Empties the namespace and resets the watch state.
    ///
    /// This is a hard reset, not a diff: the cleared names are not recorded
    /// as removals.
    pub fn clear(&mut self) {
        self.store.clear();
        self.reset_watch();
    }

    /// Returns a snapshot copy of the accumulated changes.
    #[must_use]
    pub fn changes(&self) -> NamespaceChanges {
        NamespaceChanges {
            assigned: self.assigned.clone(),
            removed: self.removed.clone(),
        }
    }

    /// Clears the watch state in place, leaving the mapping untouched.
    pub fn reset_watch(&mut self) {
        self.assigned.clear();
        self.removed.clear();
    }

    /// Returns the value bound to `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.store.get(name)
    }

    /// Returns true when `name` is bound.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true when no names are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.store.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the bound names, in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.store.keys().cloned().collect()
    }
}
