//! Inline style declarations and minimal-diff reconciliation.
//!
//! Renderers hand over whole declaration objects on every update. To keep
//! document churn proportional to what actually changed, updates are reduced
//! to a [`StyleDiff`] against the previously applied declarations before
//! touching the tree.

use std::collections::BTreeMap;

use estuary_core::{Document, DocumentError, NodeId};

/// A set of style declarations keyed by normalized property name.
///
/// Keys are normalized on entry: `camelCase` becomes `kebab-case`
/// (`backgroundColor` turns into `background-color`), while custom properties
/// starting with `--` pass through untouched. An empty value means the
/// property is absent, so setting `""` removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    properties: BTreeMap<String, String>,
}

impl StyleMap {
    /// Creates an empty declaration set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            properties: BTreeMap::new(),
        }
    }

    /// Sets a property, normalizing the key. An empty value removes the
    /// property instead of storing a falsy declaration.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = normalize_property(key);
        let value = value.into();
        if value.is_empty() {
            self.properties.remove(&key);
        } else {
            self.properties.insert(key, value);
        }
    }

    /// Looks up a property by its normalized name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .get(&normalize_property(key))
            .map(String::as_str)
    }

    /// Iterates over the declarations in property order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` when no declarations are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.set(key.as_ref(), value);
        }
        map
    }
}

/// Converts a renderer-side property key to its document form.
///
/// Custom properties (`--accent`) are returned as-is. Every other key has
/// ASCII uppercase letters lowered with a `-` inserted before each.
#[must_use]
pub fn normalize_property(key: &str) -> String {
    if key.starts_with("--") {
        return key.to_string();
    }
    let mut normalized = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            normalized.push('-');
            normalized.push(ch.to_ascii_lowercase());
        } else {
            normalized.push(ch);
        }
    }
    normalized
}

/// The minimal set of edits turning one declaration set into another.
///
/// Removals are applied before updates so a property changing form cannot
/// leave residue behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDiff {
    removals: Vec<String>,
    updates: Vec<(String, String)>,
}

impl StyleDiff {
    /// Computes the edits from `prev` to `next`.
    ///
    /// Properties present in `prev` but absent from `next` are removed;
    /// properties whose value changed or that are new are updated. Unchanged
    /// properties never appear in the diff.
    #[must_use]
    pub fn compute(prev: Option<&StyleMap>, next: &StyleMap) -> Self {
        let mut diff = Self::default();

        if let Some(prev) = prev {
            for (name, _) in prev.properties() {
                if next.get(name).is_none() {
                    diff.removals.push(name.to_string());
                }
            }
        }
        for (name, value) in next.properties() {
            let unchanged = prev.is_some_and(|prev| prev.get(name) == Some(value));
            if !unchanged {
                diff.updates.push((name.to_string(), value.to_string()));
            }
        }

        diff
    }

    /// Returns `true` when the diff carries no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.updates.is_empty()
    }

    /// Returns the properties the diff removes.
    #[must_use]
    pub fn removals(&self) -> &[String] {
        &self.removals
    }

    /// Returns the properties the diff sets.
    #[must_use]
    pub fn updates(&self) -> &[(String, String)] {
        &self.updates
    }

    /// Applies the edits to `node`, removals first.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NodeNotFound`] or
    /// [`DocumentError::NotAnElement`] when `node` cannot hold styles.
    pub fn apply(&self, doc: &mut Document, node: NodeId) -> Result<(), DocumentError> {
        for name in &self.removals {
            doc.remove_style_property(node, name)?;
        }
        for (name, value) in &self.updates {
            doc.set_style_property(node, name, value)?;
        }
        Ok(())
    }
}
