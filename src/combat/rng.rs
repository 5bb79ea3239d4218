//! Random die sources
//!
//! Every roll in the crate goes through a [`DieSource`] so the resolvers stay
//! pure functions of their inputs and can be replayed with a fixed sequence.

use std::collections::VecDeque;

use rand::Rng;

/// Source of uniform die results
pub trait DieSource {
    /// Draw one die with the given number of sides, returning a value in `[1, sides]`
    fn draw(&mut self, sides: u32) -> u32;

    /// Draw `count` dice of the same size
    fn draw_many(&mut self, sides: u32, count: u32) -> Vec<u32> {
        (0..count).map(|_| self.draw(sides)).collect()
    }
}

/// Production source backed by the thread-local generator
///
/// Holds no state of its own; each draw goes to `rand::rng()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl DieSource for ThreadRngSource {
    fn draw(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of results
///
/// The sequence cycles once exhausted, and each value is clamped into
/// `[1, sides]` for the die being drawn.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<u32>,
    pending: VecDeque<u32>,
    drawn: usize,
}

impl ScriptedSource {
    /// Create a source that will return `rolls` in order
    pub fn new(rolls: impl Into<Vec<u32>>) -> Self {
        let script = rolls.into();
        Self {
            pending: script.iter().copied().collect(),
            script,
            drawn: 0,
        }
    }

    /// Number of draws made so far
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl DieSource for ScriptedSource {
    fn draw(&mut self, sides: u32) -> u32 {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        self.drawn += 1;
        let sides = sides.max(1);
        self.pending.pop_front().unwrap_or(1).clamp(1, sides)
    }
}
