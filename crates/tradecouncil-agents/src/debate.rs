//! Fixed turn order shared by the investment and risk debates.
//!
//! A debate is a list of roles and a round count. Each round every role
//! takes one turn in list order, and each turn sees the most recently
//! recorded argument of every other role. With `[bull, bear]` that gives
//! bull-then-bear alternation; with `[aggressive, conservative, neutral]`
//! the first speaker of a round sees the previous round while later
//! speakers see the current one.

use tradecouncil_models::{DebateArgument, Labeled};

use crate::fields::{ARGUMENT, COUNTERPOINTS, KEY_POINTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn<R> {
    /// 1-based.
    pub round: u32,
    pub role: R,
}

pub struct TurnScheduler<R> {
    order: Vec<R>,
    rounds: u32,
    log: Vec<(R, DebateArgument)>,
}

impl<R: Labeled + PartialEq> TurnScheduler<R> {
    pub fn new(order: &[R], rounds: u32) -> Self {
        Self {
            order: order.to_vec(),
            rounds,
            log: Vec::new(),
        }
    }

    /// The turn whose argument is recorded next, or `None` once every round is done.
    pub fn next_turn(&self) -> Option<Turn<R>> {
        let per_round = self.order.len();
        if per_round == 0 {
            return None;
        }
        let taken = self.log.len();
        let round = (taken / per_round) as u32 + 1;
        if round > self.rounds {
            return None;
        }
        Some(Turn {
            round,
            role: self.order[taken % per_round],
        })
    }

    pub fn is_complete(&self) -> bool {
        self.next_turn().is_none()
    }

    /// Latest argument of every role other than `role`, in turn order.
    pub fn context_for(&self, role: R) -> Vec<DebateArgument> {
        self.order
            .iter()
            .filter(|r| **r != role)
            .filter_map(|other| {
                self.log
                    .iter()
                    .rev()
                    .find(|(r, _)| r == other)
                    .map(|(_, arg)| arg.clone())
            })
            .collect()
    }

    /// Record the argument for the current turn and advance. The argument's
    /// role and round are set from the schedule. Returns the turn recorded,
    /// or `None` if the debate was already complete.
    pub fn record(&mut self, mut argument: DebateArgument) -> Option<Turn<R>> {
        let turn = self.next_turn()?;
        argument.role = turn.role.label().to_string();
        argument.round = turn.round;
        self.log.push((turn.role, argument));
        Some(turn)
    }

    pub fn history(&self, role: R) -> Vec<DebateArgument> {
        self.log
            .iter()
            .filter(|(r, _)| *r == role)
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    /// Every argument in the order it was made.
    pub fn transcript(&self) -> Vec<DebateArgument> {
        self.log.iter().map(|(_, arg)| arg.clone()).collect()
    }

    /// Number of fully completed rounds.
    pub fn rounds_completed(&self) -> u32 {
        match self.order.len() {
            0 => 0,
            n => (self.log.len() / n) as u32,
        }
    }
}

/// Pull a debate argument out of a turn's output. Empty text yields an
/// empty argument.
pub fn extract_argument(role: &str, round: u32, text: &str) -> DebateArgument {
    DebateArgument {
        role: role.to_string(),
        round,
        argument_text: ARGUMENT.extract(text),
        key_points: KEY_POINTS.extract(text),
        counterpoints: COUNTERPOINTS.extract(text),
    }
}
