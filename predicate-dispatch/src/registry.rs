//! The priority-ordered candidate registry.
//!
//! Candidates are kept sorted ascending by priority. Equal priorities keep
//! their registration order, so insertion is "after every existing entry with
//! a priority less than or equal to the new one". There is no removal.
//!
//! # Default priorities
//!
//! Registering without an explicit priority picks one past the highest
//! priority in use, ignoring [`SENTINEL_PRIORITY`]:
//!
//! ```text
//! []                      => 0
//! [0, 1, 5]               => 6
//! [0, 3, SENTINEL]        => 4     (the fallback stays last)
//! [SENTINEL]              => 0
//! ```

use std::sync::Arc;

use crate::candidate::{Candidate, Priority, SENTINEL_PRIORITY};

/// An append-only, stably sorted sequence of candidates.
pub struct PriorityRegistry<I, O> {
    entries: Vec<Arc<Candidate<I, O>>>,
}

impl<I, O> PriorityRegistry<I, O> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert `candidate` after every entry whose priority is `<=` its own.
    pub fn add(&mut self, candidate: Candidate<I, O>) -> Arc<Candidate<I, O>> {
        let priority = candidate.priority();
        let index = self.entries.partition_point(|c| c.priority() <= priority);
        let candidate = Arc::new(candidate);
        self.entries.insert(index, candidate.clone());
        candidate
    }

    /// The priority a registration should use.
    ///
    /// An explicit priority is used verbatim, even if it collides with an
    /// existing one or with the sentinel.
    pub fn resolve_priority(&self, explicit: Option<Priority>) -> Priority {
        if let Some(priority) = explicit {
            return priority;
        }
        let max = self
            .entries
            .iter()
            .map(|c| c.priority())
            .filter(|&p| p != SENTINEL_PRIORITY)
            .max()
            .unwrap_or(-1);
        max + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Candidate<I, O>>> {
        self.entries.iter()
    }

    /// A copy of the current ordering, independent of later additions.
    pub fn snapshot(&self) -> Vec<Arc<Candidate<I, O>>> {
        self.entries.clone()
    }

    pub fn priorities(&self) -> Vec<Priority> {
        self.entries.iter().map(|c| c.priority()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<I, O> Default for PriorityRegistry<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> std::fmt::Debug for PriorityRegistry<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{always, Implementation};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn make_candidate(name: &str, priority: Priority) -> Candidate<Value, Value> {
        let imp = Implementation::from_fn(name, |v: &Value, _| Ok(v.clone()));
        Candidate::new(always(), imp, priority)
    }

    fn names(registry: &PriorityRegistry<Value, Value>) -> Vec<String> {
        registry.iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_sorted_insertion() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("c", 5));
        registry.add(make_candidate("a", 0));
        registry.add(make_candidate("b", 2));

        assert_eq!(registry.priorities(), vec![0, 2, 5]);
        assert_eq!(names(&registry), ["a", "b", "c"]);
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("first", 1));
        registry.add(make_candidate("low", 0));
        registry.add(make_candidate("second", 1));
        registry.add(make_candidate("third", 1));

        assert_eq!(names(&registry), ["low", "first", "second", "third"]);
    }

    #[test]
    fn test_default_priority_empty() {
        let registry: PriorityRegistry<Value, Value> = PriorityRegistry::new();
        assert_eq!(registry.resolve_priority(None), 0);
    }

    #[test]
    fn test_default_priority_increments() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("a", 0));
        registry.add(make_candidate("b", 5));
        registry.add(make_candidate("c", 1));
        assert_eq!(registry.resolve_priority(None), 6);
    }

    #[test]
    fn test_default_priority_ignores_sentinel() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("fallback", SENTINEL_PRIORITY));
        assert_eq!(registry.resolve_priority(None), 0);

        registry.add(make_candidate("a", 3));
        assert_eq!(registry.resolve_priority(None), 4);
        assert_eq!(registry.priorities().last(), Some(&SENTINEL_PRIORITY));
    }

    #[test]
    fn test_explicit_priority_verbatim() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("a", 10));
        assert_eq!(registry.resolve_priority(Some(10)), 10);
        assert_eq!(registry.resolve_priority(Some(-4)), -4);
        assert_eq!(registry.resolve_priority(Some(SENTINEL_PRIORITY)), SENTINEL_PRIORITY);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut registry = PriorityRegistry::new();
        registry.add(make_candidate("a", 0));
        let snapshot = registry.snapshot();
        registry.add(make_candidate("b", 1));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
