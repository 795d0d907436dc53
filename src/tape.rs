//! This module defines the `Tape`, an unbounded bidirectional sequence of symbols with a
//! single read/write head.
//!
//! Cells are addressed by signed logical addresses. Address 0 is the first symbol supplied
//! at creation. Storage is a `VecDeque` plus an `origin`, the logical address of the front
//! cell, so that growing at the front never shifts the meaning of an address.

use std::collections::VecDeque;
use std::fmt;

use crate::types::{Direction, Symbol, BLANK_SYMBOL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<Symbol>,
    /// Logical address of `cells[0]`.
    origin: i64,
    head: i64,
}

impl Tape {
    /// Creates a tape holding `symbols` at addresses `0..n`, with the head at address 0.
    ///
    /// The cell under the head is materialized immediately, so an empty input yields a
    /// tape with a single blank cell.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut tape = Self {
            cells: symbols.into_iter().collect(),
            origin: 0,
            head: 0,
        };
        tape.materialize(0);
        tape
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.get(self.head)
    }

    /// Writes `symbol` under the head.
    pub fn write(&mut self, symbol: Symbol) {
        let index = self.materialize(self.head);
        self.cells[index] = symbol;
    }

    /// Moves the head one cell, growing the tape with a blank when it leaves the
    /// materialized range.
    pub fn move_head(&mut self, direction: Direction) {
        if direction == Direction::Stay {
            return;
        }

        self.head += direction.delta();
        self.materialize(self.head);
    }

    /// Returns the logical address of the head.
    pub fn head(&self) -> i64 {
        self.head
    }

    /// Returns the symbol at `address`, or the blank symbol if it was never visited.
    pub fn get(&self, address: i64) -> Symbol {
        self.index(address)
            .map(|i| self.cells[i])
            .unwrap_or(BLANK_SYMBOL)
    }

    /// Returns the symbols at addresses `low..high`. Addresses outside the materialized
    /// range read as blank; an empty or inverted range yields an empty vector.
    pub fn window(&self, low: i64, high: i64) -> Vec<Symbol> {
        (low..high).map(|address| self.get(address)).collect()
    }

    /// Lowest materialized address.
    pub fn min_address(&self) -> i64 {
        self.origin
    }

    /// Highest materialized address.
    pub fn max_address(&self) -> i64 {
        self.origin + self.cells.len() as i64 - 1
    }

    /// Returns every materialized cell in address order.
    pub fn contents(&self) -> String {
        self.cells.iter().collect()
    }

    /// Number of materialized cells. Never zero, since the head cell always exists.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Maps a logical address to a container index, if materialized.
    fn index(&self, address: i64) -> Option<usize> {
        let offset = address - self.origin;
        if offset >= 0 && (offset as usize) < self.cells.len() {
            Some(offset as usize)
        } else {
            None
        }
    }

    /// Grows the storage with blanks until `address` is materialized and returns its index.
    fn materialize(&mut self, address: i64) -> usize {
        while address < self.origin {
            self.cells.push_front(BLANK_SYMBOL);
            self.origin -= 1;
        }
        while address > self.max_address() {
            self.cells.push_back(BLANK_SYMBOL);
        }

        (address - self.origin) as usize
    }
}

impl From<&str> for Tape {
    fn from(symbols: &str) -> Self {
        Tape::new(symbols.chars())
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "...{}...", self.contents())
    }
}
