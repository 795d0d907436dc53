//! This module provides the parser for rule files, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns the parse tree into a `Program`.
//!
//! A rule file is line oriented: the first line is the initial tape, the second line the
//! initial state, then one transition per line (`move_first from to read write delta`),
//! optionally terminated by an `end:` line listing the accepting states.

use crate::types::{
    Action, Direction, Program, State, Symbol, Transition, Trigger, TuringMachineError,
    WriteOrder, MAX_PROGRAM_SIZE,
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the rule file grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct RuleFileParser;

/// Parses the given rule file content into a `Program`.
///
/// Duplicated triggers and duplicated accepting states are kept as written; deciding
/// whether they matter is left to the caller (see `analyzer::check_strict`).
///
/// # Arguments
///
/// * `input` - A string slice containing the rule file.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the input is too large.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program is {} bytes, the limit is {} bytes",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = RuleFileParser::parse(Rule::program, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    parse_program(root)
}

/// Walks the top-level `program` pair.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut program = Program::default();

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::tape => program.tape = p.as_str().to_string(),
            Rule::initial_state => {
                program.initial_state = parse_state(next_pair(&mut p.into_inner())?)?
            }
            Rule::transition => program.rules.push(parse_transition(p)?),
            Rule::accepting => program.accepting = parse_state_list(p)?,
            _ => {} // EOI
        }
    }

    Ok(program)
}

/// Parses a `transition` pair: `order from to read write delta`.
fn parse_transition(pair: Pair<Rule>) -> Result<Transition, TuringMachineError> {
    let mut pairs = pair.into_inner();

    let order = match next_pair(&mut pairs)?.as_str() {
        "1" => WriteOrder::MoveThenWrite,
        _ => WriteOrder::WriteThenMove,
    };
    let state = parse_state(next_pair(&mut pairs)?)?;
    let next_state = parse_state(next_pair(&mut pairs)?)?;
    let read = parse_symbol(next_pair(&mut pairs)?);
    let write = parse_symbol(next_pair(&mut pairs)?);
    let direction = parse_direction(next_pair(&mut pairs)?)?;

    Ok(Transition::new(
        Trigger::new(state, read),
        Action::new(next_state, write, direction, order),
    ))
}

/// Collects the states of an `end:` line. An empty list is allowed.
fn parse_state_list(pair: Pair<Rule>) -> Result<Vec<State>, TuringMachineError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::state)
        .map(parse_state)
        .collect()
}

fn parse_state(pair: Pair<Rule>) -> Result<State, TuringMachineError> {
    pair.as_str()
        .parse::<State>()
        .map_err(|e| parse_error(&format!("Invalid state: {e}"), pair.as_span()))
}

fn parse_symbol(pair: Pair<Rule>) -> Symbol {
    pair.as_str().chars().next().unwrap_or_default()
}

fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    pair.as_str()
        .parse::<i64>()
        .ok()
        .and_then(Direction::from_delta)
        .ok_or_else(|| parse_error("Invalid move direction", pair.as_span()))
}

/// Takes the next inner pair, failing instead of panicking if the tree is short.
fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>) -> Result<Pair<'a, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Incomplete rule file".to_string()))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
