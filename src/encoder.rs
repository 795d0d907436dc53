//! This module provides encoding functionality for writing a `Program` back out in the rule
//! file format understood by `parser::parse`.

use crate::types::{Program, State, Symbol, TuringMachineError};

/// Encodes a program as a rule file.
///
/// Format:
/// - line 1: the initial tape, one character per symbol.
/// - line 2: the initial state.
/// - one line per transition: `move_first from to read write delta`.
/// - a final `end:` line listing the accepting states.
///
/// Rules and accepting states are written in program order, so the override order of
/// duplicated triggers survives a round trip through `parse`.
///
/// Programs built in code or loaded from JSON can hold symbols the rule file format cannot
/// express: a line break anywhere on the tape, or whitespace as a rule symbol. Those are
/// rejected with a `ValidationError` instead of producing a file that does not parse.
pub fn encode(program: &Program) -> Result<String, TuringMachineError> {
    if let Some(symbol) = program.tape.chars().find(|c| is_line_break(*c)) {
        return Err(TuringMachineError::ValidationError(format!(
            "Tape symbol {:?} cannot be written to a rule file",
            symbol
        )));
    }

    let mut lines = Vec::with_capacity(program.rules.len() + 3);

    lines.push(program.tape.clone());
    lines.push(program.initial_state.to_string());
    for (i, transition) in program.rules.iter().enumerate() {
        for symbol in [transition.trigger.symbol, transition.action.write] {
            if !is_rule_symbol(symbol) {
                return Err(TuringMachineError::ValidationError(format!(
                    "Rule {} uses symbol {:?}, which cannot be written to a rule file",
                    i + 1,
                    symbol
                )));
            }
        }
        lines.push(transition.to_string());
    }
    lines.push(encode_accepting(&program.accepting));

    let mut encoded = lines.join("\n");
    encoded.push('\n');
    Ok(encoded)
}

fn is_line_break(symbol: Symbol) -> bool {
    matches!(symbol, '\n' | '\r')
}

/// Rule symbols are separated by spaces or tabs, so neither can be one.
fn is_rule_symbol(symbol: Symbol) -> bool {
    !matches!(symbol, ' ' | '\t') && !is_line_break(symbol)
}

fn encode_accepting(states: &[State]) -> String {
    states.iter().fold("end:".to_string(), |mut line, state| {
        line.push(' ');
        line.push_str(&state.to_string());
        line
    })
}
