//! Free-form notes and named annotation values

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Note, color tag and named values attached to an entity.
///
/// Entities without annotations all share one empty instance, so "has no
/// annotations" is a pointer comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations {
    note: Option<String>,
    color: i32,
    values: BTreeMap<Arc<str>, String>,
}

static EMPTY: OnceLock<Arc<Annotations>> = OnceLock::new();

impl Annotations {
    /// The shared empty instance
    pub fn empty() -> Arc<Annotations> {
        Arc::clone(EMPTY.get_or_init(|| Arc::new(Annotations::default())))
    }

    /// Build annotations, returning the shared empty instance when there is
    /// neither a note nor a value
    pub fn from_parts(
        note: Option<String>,
        color: i32,
        values: BTreeMap<Arc<str>, String>,
    ) -> Arc<Annotations> {
        if note.is_none() && values.is_empty() {
            return Self::empty();
        }
        Arc::new(Self {
            note,
            color,
            values,
        })
    }

    /// Whether `annotations` is the shared empty instance
    pub fn is_shared_empty(annotations: &Arc<Annotations>) -> bool {
        EMPTY
            .get()
            .is_some_and(|empty| Arc::ptr_eq(empty, annotations))
    }

    /// Free-text note
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Color / category tag of the note
    pub fn color(&self) -> i32 {
        self.color
    }

    /// Value of a named annotation
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Named values ordered by name
    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Number of named values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there is neither a note nor a value
    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.values.is_empty()
    }

    /// Same annotations without `name`
    pub fn without(self: &Arc<Self>, name: &str) -> Arc<Annotations> {
        if !self.values.contains_key(name) {
            return Arc::clone(self);
        }
        let mut values = self.values.clone();
        values.remove(name);
        Self::from_parts(self.note.clone(), self.color, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_shared() {
        let a = Annotations::from_parts(None, 3, BTreeMap::new());
        let b = Annotations::empty();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Annotations::is_shared_empty(&a));
        // Color alone does not make annotations
        assert_eq!(a.color(), 0);
    }

    #[test]
    fn test_without_collapses_to_empty() {
        let mut values = BTreeMap::new();
        values.insert(Arc::from("QValue"), "0.01".to_string());
        let annotations = Annotations::from_parts(None, 0, values);
        assert_eq!(annotations.get("QValue"), Some("0.01"));
        assert!(!Annotations::is_shared_empty(&annotations));

        let unchanged = annotations.without("Other");
        assert!(Arc::ptr_eq(&unchanged, &annotations));
        let removed = annotations.without("QValue");
        assert!(Annotations::is_shared_empty(&removed));
    }

    #[test]
    fn test_note_keeps_color() {
        let annotations = Annotations::from_parts(Some("check".into()), 2, BTreeMap::new());
        assert_eq!(annotations.note(), Some("check"));
        assert_eq!(annotations.color(), 2);
        assert!(!annotations.is_empty());
    }
}
