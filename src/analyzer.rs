//! This module provides functions for analyzing programs before execution. None of the
//! findings make a program unrunnable, so `analyze` only reports them; callers that want a
//! stricter policy use `check_strict`.

use std::collections::{BTreeSet, HashMap};

use crate::types::{Program, State, Trigger, TuringMachineError};

/// Represents the issues that can be found in a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisWarning {
    /// The transition at `position` (1-based) is never used because a later one with the
    /// same trigger overrides it.
    ShadowedTransition {
        position: usize,
        shadowed_by: usize,
        trigger: Trigger,
    },
    /// An accepting state is listed more than once.
    DuplicateAcceptingState(State),
    /// An accepting state that is neither the initial state nor the target of any transition.
    UnreachableAcceptingState(State),
    /// The initial state is not accepting and has no outgoing transition.
    InitialStateWithoutRules(State),
}

impl From<AnalysisWarning> for TuringMachineError {
    /// Converts an `AnalysisWarning` into a `TuringMachineError::ValidationError`.
    fn from(warning: AnalysisWarning) -> Self {
        match warning {
            AnalysisWarning::ShadowedTransition {
                position,
                shadowed_by,
                trigger,
            } => TuringMachineError::ValidationError(format!(
                "Rule {} for state {} and symbol '{}' is overridden by rule {}",
                position, trigger.state, trigger.symbol, shadowed_by
            )),
            AnalysisWarning::DuplicateAcceptingState(state) => {
                TuringMachineError::ValidationError(format!("Duplicate accepting state: {}", state))
            }
            AnalysisWarning::UnreachableAcceptingState(state) => {
                TuringMachineError::ValidationError(format!(
                    "Accepting state {} is never reached by any rule",
                    state
                ))
            }
            AnalysisWarning::InitialStateWithoutRules(state) => {
                TuringMachineError::ValidationError(format!(
                    "Initial state {} has no outgoing rules",
                    state
                ))
            }
        }
    }
}

/// Analyzes a program and returns every finding, in a stable order.
pub fn analyze(program: &Program) -> Vec<AnalysisWarning> {
    [
        check_shadowed_transitions,
        check_duplicate_accepting_states,
        check_unreachable_accepting_states,
        check_initial_state,
    ]
    .iter()
    .flat_map(|f| f(program))
    .collect()
}

/// Fails with the first finding of `analyze`, if any.
pub fn check_strict(program: &Program) -> Result<(), TuringMachineError> {
    match analyze(program).into_iter().next() {
        Some(warning) => Err(warning.into()),
        None => Ok(()),
    }
}

/// Reports every transition overridden by a later one with the same trigger.
fn check_shadowed_transitions(program: &Program) -> Vec<AnalysisWarning> {
    let mut last: HashMap<Trigger, usize> = HashMap::new();
    for (i, transition) in program.rules.iter().enumerate() {
        last.insert(transition.trigger, i + 1);
    }

    program
        .rules
        .iter()
        .enumerate()
        .filter_map(|(i, transition)| {
            let shadowed_by = last[&transition.trigger];
            (shadowed_by != i + 1).then_some(AnalysisWarning::ShadowedTransition {
                position: i + 1,
                shadowed_by,
                trigger: transition.trigger,
            })
        })
        .collect()
}

fn check_duplicate_accepting_states(program: &Program) -> Vec<AnalysisWarning> {
    let mut seen = BTreeSet::new();
    let mut reported = BTreeSet::new();

    program
        .accepting
        .iter()
        .filter(|state| !seen.insert(**state) && reported.insert(**state))
        .map(|state| AnalysisWarning::DuplicateAcceptingState(*state))
        .collect()
}

fn check_unreachable_accepting_states(program: &Program) -> Vec<AnalysisWarning> {
    let targets: BTreeSet<State> = program
        .rules
        .iter()
        .map(|t| t.action.next_state)
        .chain(std::iter::once(program.initial_state))
        .collect();

    program
        .accepting
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|state| !targets.contains(*state))
        .map(|state| AnalysisWarning::UnreachableAcceptingState(*state))
        .collect()
}

fn check_initial_state(program: &Program) -> Vec<AnalysisWarning> {
    let state = program.initial_state;
    let accepting = program.accepting.contains(&state);
    let has_rules = program.rules.iter().any(|t| t.trigger.state == state);

    if accepting || has_rules {
        Vec::new()
    } else {
        vec![AnalysisWarning::InitialStateWithoutRules(state)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Direction, Transition, WriteOrder};

    fn rule(state: State, read: char, next: State) -> Transition {
        Transition::new(
            Trigger::new(state, read),
            Action::new(next, read, Direction::Right, WriteOrder::WriteThenMove),
        )
    }

    fn create_program(rules: Vec<Transition>, accepting: Vec<State>) -> Program {
        Program {
            name: "test".to_string(),
            tape: "ab".to_string(),
            initial_state: 0,
            rules,
            accepting,
        }
    }

    #[test]
    fn test_clean_program() {
        let program = create_program(vec![rule(0, 'a', 1), rule(1, 'b', 2)], vec![2]);

        assert!(analyze(&program).is_empty());
        assert!(check_strict(&program).is_ok());
    }

    #[test]
    fn test_shadowed_transition() {
        let program = create_program(
            vec![rule(0, 'a', 1), rule(0, 'b', 1), rule(0, 'a', 2)],
            vec![1, 2],
        );

        assert_eq!(
            analyze(&program),
            vec![AnalysisWarning::ShadowedTransition {
                position: 1,
                shadowed_by: 3,
                trigger: Trigger::new(0, 'a'),
            }]
        );
    }

    #[test]
    fn test_duplicate_accepting_state() {
        let program = create_program(vec![rule(0, 'a', 1)], vec![1, 1, 1]);

        assert_eq!(
            analyze(&program),
            vec![AnalysisWarning::DuplicateAcceptingState(1)]
        );
    }

    #[test]
    fn test_unreachable_accepting_state() {
        let program = create_program(vec![rule(0, 'a', 1)], vec![1, 5]);

        assert_eq!(
            analyze(&program),
            vec![AnalysisWarning::UnreachableAcceptingState(5)]
        );
    }

    #[test]
    fn test_initial_state_counts_as_reached() {
        let program = create_program(Vec::new(), vec![0]);
        assert!(analyze(&program).is_empty());
    }

    #[test]
    fn test_initial_state_without_rules() {
        let program = create_program(vec![rule(1, 'a', 2)], vec![2]);

        assert_eq!(
            analyze(&program),
            vec![AnalysisWarning::InitialStateWithoutRules(0)]
        );
    }

    #[test]
    fn test_check_strict_reports_first_warning() {
        let program = create_program(vec![rule(0, 'a', 1)], vec![1, 9]);

        match check_strict(&program) {
            Err(TuringMachineError::ValidationError(msg)) => {
                assert!(msg.contains("Accepting state 9"));
            }
            other => panic!("Expected a validation error, got {:?}", other),
        }
    }
}
