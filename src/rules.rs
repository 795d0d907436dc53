//! This module defines the `RuleTable`, the ordered list of transitions a machine consults on
//! every step.
//!
//! Entries are kept in insertion order and triggers are not required to be unique. A lookup
//! scans the whole table and the last matching entry wins, so a later insertion (or an
//! in-place edit) overrides an earlier rule with the same trigger.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{Action, Transition, Trigger};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    entries: Vec<Transition>,
}

/// Result of an in-place edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Edit {
    /// The entry was overwritten; holds the previous entry.
    Replaced(Transition),
    /// The position was outside `1..=len`; the table is unchanged.
    Ignored,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transition. Duplicated triggers are allowed.
    pub fn add(&mut self, transition: Transition) {
        self.entries.push(transition);
    }

    /// Overwrites the entry at the 1-based `position`, trigger included.
    ///
    /// Positions outside `1..=len` are ignored and reported as `Edit::Ignored`.
    pub fn replace_at(&mut self, position: usize, transition: Transition) -> Edit {
        match position
            .checked_sub(1)
            .and_then(|index| self.entries.get_mut(index))
        {
            Some(entry) => Edit::Replaced(std::mem::replace(entry, transition)),
            None => {
                warn!(position, len = self.entries.len(), "ignoring rule edit at invalid position");
                Edit::Ignored
            }
        }
    }

    /// Returns the action of the last entry matching `trigger`.
    pub fn lookup(&self, trigger: Trigger) -> Option<&Action> {
        self.entries
            .iter()
            .rev()
            .find(|t| t.trigger == trigger)
            .map(|t| &t.action)
    }

    pub fn as_slice(&self) -> &[Transition] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Transition> for RuleTable {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleTable {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, State, WriteOrder};

    fn rule(state: State, read: char, next: State, write: char, direction: Direction) -> Transition {
        Transition::new(
            Trigger::new(state, read),
            Action::new(next, write, direction, WriteOrder::WriteThenMove),
        )
    }

    #[test]
    fn test_add_transition() {
        let mut table = RuleTable::new();
        table.add(rule(0, 'a', 1, 'b', Direction::Right));

        assert_eq!(table.len(), 1);
        assert_eq!(table.as_slice()[0].trigger.symbol, 'a');
    }

    #[test]
    fn test_lookup_missing() {
        let mut table = RuleTable::new();
        assert!(table.lookup(Trigger::new(0, 'a')).is_none());

        table.add(rule(1, 'b', 2, 'c', Direction::Right));
        assert!(table.lookup(Trigger::new(0, 'a')).is_none());
        assert!(table.lookup(Trigger::new(1, 'a')).is_none());
    }

    #[test]
    fn test_last_insertion_wins() {
        let mut table = RuleTable::new();
        table.add(rule(0, 'a', 1, 'b', Direction::Right));
        table.add(rule(0, 'x', 5, 'y', Direction::Stay));
        table.add(rule(0, 'a', 2, 'c', Direction::Left));

        let action = table.lookup(Trigger::new(0, 'a')).unwrap();
        assert_eq!(action.next_state, 2);
        assert_eq!(action.write, 'c');
        assert_eq!(action.direction, Direction::Left);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_edit_transition() {
        let mut table = RuleTable::new();
        let first = rule(0, 'a', 1, 'b', Direction::Right);
        table.add(first);

        let edit = table.replace_at(1, rule(0, 'a', 2, 'c', Direction::Left));

        assert_eq!(edit, Edit::Replaced(first));
        assert_eq!(table.len(), 1);
        assert_eq!(table.as_slice()[0].action.write, 'c');
        assert_eq!(table.as_slice()[0].action.next_state, 2);
    }

    #[test]
    fn test_edit_can_change_trigger() {
        let mut table = RuleTable::new();
        table.add(rule(0, 'a', 1, 'b', Direction::Right));

        let _ = table.replace_at(1, rule(3, 'z', 4, 'y', Direction::Stay));

        assert!(table.lookup(Trigger::new(0, 'a')).is_none());
        assert_eq!(table.lookup(Trigger::new(3, 'z')).unwrap().next_state, 4);
    }

    #[test]
    fn test_edited_entry_shadows_only_if_later() {
        let mut table = RuleTable::new();
        table.add(rule(0, 'x', 9, 'x', Direction::Stay));
        table.add(rule(0, 'a', 1, 'b', Direction::Right));

        // Editing the first entry into an `(0, 'a')` rule does not beat the later one.
        let _ = table.replace_at(1, rule(0, 'a', 7, 'q', Direction::Left));
        assert_eq!(table.lookup(Trigger::new(0, 'a')).unwrap().next_state, 1);

        // Editing the last entry does.
        let _ = table.replace_at(2, rule(0, 'a', 8, 'r', Direction::Left));
        assert_eq!(table.lookup(Trigger::new(0, 'a')).unwrap().next_state, 8);
    }

    #[test]
    fn test_edit_invalid_position() {
        let mut table = RuleTable::new();
        let original = rule(0, 'a', 1, 'b', Direction::Right);
        table.add(original);

        assert_eq!(table.replace_at(0, rule(0, 'a', 2, 'c', Direction::Left)), Edit::Ignored);
        assert_eq!(table.replace_at(5, rule(0, 'a', 2, 'c', Direction::Left)), Edit::Ignored);

        assert_eq!(table.len(), 1);
        assert_eq!(table.as_slice()[0], original);
    }

    #[test]
    fn test_json_round_trip_preserves_lookup() {
        let table: RuleTable = [
            rule(0, 'a', 1, 'b', Direction::Right),
            rule(1, '_', 2, '1', Direction::Left),
            rule(0, 'a', 3, 'c', Direction::Stay),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&table).unwrap();
        let restored: RuleTable = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, table);
        for transition in &table {
            assert_eq!(
                restored.lookup(transition.trigger),
                table.lookup(transition.trigger)
            );
        }
    }
}
