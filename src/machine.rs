//! This module defines the `Machine` struct, which simulates a deterministic single-tape
//! Turing machine. It owns the tape and the rule table, drives the step/run loop and
//! classifies how execution ends.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::rules::{Edit, RuleTable};
use crate::tape::Tape;
use crate::types::{
    Action, Halt, HaltReason, Program, State, StepOutcome, Symbol, Transition, Trigger,
    WriteOrder, DEFAULT_INITIAL_STATE,
};

/// A deterministic single-tape Turing machine.
///
/// The state register and the tape are only changed by `step` (and the loops built on it)
/// or by `reset`. Once the machine halts it stays halted until reset.
#[derive(Debug, Clone)]
pub struct Machine {
    tape: Tape,
    rules: RuleTable,
    state: State,
    accepting: BTreeSet<State>,
    halt: Option<Halt>,
    step_count: usize,
    initial_tape: Tape,
    initial_state: State,
}

impl Machine {
    /// Creates a machine over `symbols` starting in state 0, with no rules and no
    /// accepting states.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        Self::with_state(symbols, DEFAULT_INITIAL_STATE)
    }

    /// Creates a machine over `symbols` starting in `state`.
    pub fn with_state<I>(symbols: I, state: State) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let tape = Tape::new(symbols);
        Self {
            initial_tape: tape.clone(),
            tape,
            rules: RuleTable::new(),
            state,
            accepting: BTreeSet::new(),
            halt: None,
            step_count: 0,
            initial_state: state,
        }
    }

    /// Appends a transition rule.
    pub fn add_rule(&mut self, trigger: Trigger, action: Action) {
        self.rules.add(Transition::new(trigger, action));
    }

    /// Replaces the rule at the 1-based `position`. Out-of-range positions are ignored.
    pub fn replace_rule(&mut self, position: usize, trigger: Trigger, action: Action) -> Edit {
        self.rules
            .replace_at(position, Transition::new(trigger, action))
    }

    /// Replaces the set of accepting states.
    pub fn set_accepting_states<I>(&mut self, states: I)
    where
        I: IntoIterator<Item = State>,
    {
        self.accepting = states.into_iter().collect();
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `StepOutcome::Advanced` if a transition was applied.
    /// * `StepOutcome::Accepted` if the current state is accepting. Nothing is executed.
    /// * `StepOutcome::Stuck` if no rule matches the current state and symbol. Nothing is executed.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(halt) = self.halt {
            return halt.into();
        }

        let action = match self.next_action() {
            Ok(action) => action,
            Err(halt) => {
                debug!(state = self.state, symbol = %self.tape.read(), ?halt, "machine halted");
                self.halt = Some(halt);
                return halt.into();
            }
        };

        match action.order {
            WriteOrder::MoveThenWrite => {
                self.tape.move_head(action.direction);
                self.tape.write(action.write);
            }
            WriteOrder::WriteThenMove => {
                self.tape.write(action.write);
                self.tape.move_head(action.direction);
            }
        }

        trace!(
            from = self.state,
            to = action.next_state,
            head = self.tape.head(),
            "step"
        );

        self.state = action.next_state;
        self.step_count += 1;

        StepOutcome::Advanced
    }

    /// Runs the machine until it halts or until the caller's limit or cancellation stops it.
    ///
    /// There is no built-in step cap: without a limit or token a machine that never
    /// reaches an accepting or stuck configuration runs forever. The terminal condition is
    /// checked before the limit, so an already halted machine reports its halt reason even
    /// with a limit of zero. Limits and cancellation only take effect between steps.
    pub fn run(&mut self, options: RunOptions) -> RunOutcome {
        let mut steps = 0;
        let mut snapshots = options.trace.then(Vec::new);

        let reason = loop {
            if let Err(halt) = self.classify() {
                // Records the halt without touching tape or state.
                self.step();
                break HaltReason::from(halt);
            }

            if options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!(steps, "run cancelled");
                break HaltReason::Cancelled;
            }

            if options.limit.is_some_and(|limit| steps >= limit) {
                warn!(steps, "run stopped at step limit");
                break HaltReason::LimitExceeded;
            }

            self.step();
            steps += 1;

            if let Some(snapshots) = snapshots.as_mut() {
                snapshots.push(self.snapshot());
            }
        };

        debug!(
            ?reason,
            steps,
            state = self.state,
            cells = self.tape.cell_count(),
            "run finished"
        );

        RunOutcome {
            state: self.state,
            head: self.tape.head(),
            tape: self.tape.contents(),
            reason,
            steps,
            trace: snapshots,
        }
    }

    /// Returns a lazy iterator that executes one step per item and yields the configuration
    /// after it. The iterator ends when the machine halts and never ends if it doesn't.
    pub fn trace(&mut self) -> Trace<'_> {
        Trace { machine: self }
    }

    /// Captures the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            state: self.state,
            head: self.tape.head(),
            origin: self.tape.min_address(),
            tape: self.tape.contents(),
        }
    }

    /// Restores the initial tape and state and clears the halt record.
    pub fn reset(&mut self) {
        self.tape = self.initial_tape.clone();
        self.state = self.initial_state;
        self.halt = None;
        self.step_count = 0;
    }

    /// Returns the current control state.
    pub fn current_state(&self) -> State {
        self.state
    }

    /// Returns the logical address of the head.
    pub fn head_position(&self) -> i64 {
        self.tape.head()
    }

    /// Returns the symbol under the head.
    pub fn read_head(&self) -> Symbol {
        self.tape.read()
    }

    /// Returns the rules in table order.
    pub fn rules(&self) -> &[Transition] {
        self.rules.as_slice()
    }

    /// Returns the symbols at addresses `low..high`, blanks included.
    pub fn tape_window(&self, low: i64, high: i64) -> Vec<Symbol> {
        self.tape.window(low, high)
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn accepting_states(&self) -> &BTreeSet<State> {
        &self.accepting
    }

    /// Returns how the machine halted, if it has.
    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Returns the number of transitions executed since construction or the last reset.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Classifies the current configuration without changing it.
    fn classify(&self) -> Result<Action, Halt> {
        match self.halt {
            Some(halt) => Err(halt),
            None => self.next_action(),
        }
    }

    /// Finds the action for the current configuration, or the reason there is none.
    fn next_action(&self) -> Result<Action, Halt> {
        if self.accepting.contains(&self.state) {
            return Err(Halt::Accepted);
        }

        self.rules
            .lookup(Trigger::new(self.state, self.tape.read()))
            .copied()
            .ok_or(Halt::Stuck)
    }
}

impl From<&Program> for Machine {
    fn from(program: &Program) -> Self {
        let mut machine = Machine::with_state(program.tape.chars(), program.initial_state);
        machine.rules = program.rules.iter().copied().collect();
        machine.set_accepting_states(program.accepting.iter().copied());
        machine
    }
}

/// Options for `Machine::run`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum number of transitions this run may execute.
    pub limit: Option<usize>,
    /// External cancellation, checked between steps.
    pub cancel: Option<CancelToken>,
    /// Collect a snapshot after every executed step.
    pub trace: bool,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// A cloneable cancellation flag that can be raised from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of `Machine::run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Control state when the run returned.
    pub state: State,
    /// Head address when the run returned.
    pub head: i64,
    /// Materialized tape cells in address order.
    pub tape: String,
    pub reason: HaltReason,
    /// Transitions executed by this run.
    pub steps: usize,
    /// One snapshot per executed step, when tracing was requested.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace: Option<Vec<Snapshot>>,
}

/// The machine's configuration after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Total steps executed so far.
    pub step: usize,
    pub state: State,
    pub head: i64,
    /// Address of the first character of `tape`.
    pub origin: i64,
    pub tape: String,
}

/// Lazy step iterator returned by `Machine::trace`.
pub struct Trace<'a> {
    machine: &'a mut Machine,
}

impl Iterator for Trace<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Self::Item> {
        match self.machine.step() {
            StepOutcome::Advanced => Some(self.machine.snapshot()),
            StepOutcome::Accepted | StepOutcome::Stuck => None,
        }
    }
}
