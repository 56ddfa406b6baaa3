//! Guard variables classified from bracketed predicates.

use std::fmt;

use indexmap::IndexMap;

/// How a guard variable is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardMode {
    /// Assigned a single literal, from `[name = value]`.
    Deterministic(i64),

    /// Chosen non-deterministically from an inclusive range, from `[name : lo..hi]`.
    NonDeterministic { low: i64, high: i64 },

    /// Only ever compared against (`[name < 5]`); initialised to zero.
    Default,
}

impl GuardMode {
    /// The single initial value, if the mode has one.
    pub fn initial_value(self) -> Option<i64> {
        match self {
            GuardMode::Deterministic(value) => Some(value),
            GuardMode::Default => Some(0),
            GuardMode::NonDeterministic { .. } => None,
        }
    }
}

impl fmt::Display for GuardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardMode::Deterministic(value) => write!(f, "= {value}"),
            GuardMode::NonDeterministic { low, high } => write!(f, "in {low}..{high}"),
            GuardMode::Default => write!(f, "= 0 (default)"),
        }
    }
}

/// A named guard variable and its initialisation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardVariable<'a> {
    name: &'a str,
    mode: GuardMode,
}

impl<'a> GuardVariable<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn mode(&self) -> GuardMode {
        self.mode
    }
}

/// Guard variables in discovery order, at most one entry per name.
///
/// The first classification of a name wins; later mentions are ignored.
///
/// # Examples
///
/// ```
/// # use seqmodel_core::model::{GuardMode, GuardTable};
/// let mut table = GuardTable::new();
/// assert!(table.try_insert("retry", GuardMode::Default));
/// assert!(!table.try_insert("retry", GuardMode::Deterministic(3)));
/// assert_eq!(table.get("retry"), Some(GuardMode::Default));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuardTable {
    entries: IndexMap<String, GuardMode>,
}

impl GuardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `name` unless it is already classified.
    ///
    /// Returns `true` when the entry was added.
    pub fn try_insert(&mut self, name: impl Into<String>, mode: GuardMode) -> bool {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, mode);
        true
    }

    pub fn get(&self, name: &str) -> Option<GuardMode> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the variables in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = GuardVariable<'_>> {
        self.entries.iter().map(|(name, mode)| GuardVariable {
            name: name.as_str(),
            mode: *mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_classification_wins() {
        let mut table = GuardTable::new();
        assert!(table.try_insert("amount", GuardMode::NonDeterministic { low: 0, high: 10 }));
        assert!(!table.try_insert("amount", GuardMode::Deterministic(5)));
        assert_eq!(
            table.get("amount"),
            Some(GuardMode::NonDeterministic { low: 0, high: 10 })
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_iteration_preserves_discovery_order() {
        let mut table = GuardTable::new();
        table.try_insert("zeta", GuardMode::Default);
        table.try_insert("alpha", GuardMode::Deterministic(1));

        let names: Vec<_> = table.iter().map(|v| v.name()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }

    #[test]
    fn test_initial_values() {
        assert_eq!(GuardMode::Deterministic(7).initial_value(), Some(7));
        assert_eq!(GuardMode::Default.initial_value(), Some(0));
        assert_eq!(
            GuardMode::NonDeterministic { low: 1, high: 2 }.initial_value(),
            None
        );
    }

    #[test]
    fn test_empty_table() {
        let table = GuardTable::new();
        assert!(table.is_empty());
        assert!(!table.contains("x"));
        assert_eq!(table.iter().count(), 0);
    }
}
