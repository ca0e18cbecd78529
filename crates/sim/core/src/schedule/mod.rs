//! Priority-ordered turn scheduling over fractional speeds.
//!
//! Every participant accumulates buildup at its own speed once per
//! simulation tick; the queue fast-forwards ticks until someone's buildup
//! crosses the action threshold, then hands the turn to the candidate with
//! the highest buildup. After acting, exactly 1.0 is subtracted from the
//! winner's buildup so fractional overflow carries into the next turn and
//! slow actors are never starved of their earned fractions.
//!
//! The forecast ([`ActionQueue::forecast`]) runs the *same* fast-forward
//! routine over a snapshot, so the predicted order can never diverge from
//! the live one.

use crate::config::SimConfig;

/// Errors from turn-queue operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    /// An index outside the queue was named as the current actor.
    #[error("no turn taker at queue position {0}")]
    UnknownTurnTaker(usize),
}

/// Scheduler participant contract.
///
/// Hosts implement this for whatever carries their actors; the queue only
/// reads speed, reads/writes buildup, and honors the removal flag.
pub trait TurnTaker {
    /// Per-tick buildup increment. May be 0 to opt out of scheduling.
    fn turn_speed(&self) -> f64;

    fn turn_buildup(&self) -> f64;

    fn set_turn_buildup(&mut self, value: f64);

    /// Ready to act once buildup reaches the action threshold.
    fn turn_ready(&self) -> bool {
        self.turn_buildup() >= SimConfig::DEFAULT_ACTION_THRESHOLD
    }

    /// Flagged entries are pruned during the next fast-forward.
    fn remove_from_queue(&self) -> bool {
        false
    }
}

/// Result of one scheduling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The entry at this queue position acts next.
    Selected(usize),
    /// No participant has positive speed: the simulation can make no
    /// further progress. This is a designed terminal state (encounter
    /// over), distinct from "nobody ready yet", which fast-forwarding
    /// resolves on its own.
    Idle,
}

/// Discrete-event turn queue.
#[derive(Debug, Default)]
pub struct ActionQueue<T> {
    entries: Vec<T>,
    current: Option<usize>,
    /// Simulation ticks elapsed through fast-forwarding.
    now: u64,
}

impl<T: TurnTaker> ActionQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            current: None,
            now: 0,
        }
    }

    /// Appends a participant. Insertion order is the tie-break key for
    /// equal buildups, so it is part of the observable contract.
    pub fn push(&mut self, taker: T) -> usize {
        self.entries.push(taker);
        self.entries.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queue position of the actor currently holding the turn.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Simulation ticks elapsed so far.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Hands the turn to an arbitrary entry, bypassing the buildup check.
    ///
    /// Out-of-band insertion point for reactive/interrupt turns; a
    /// zero-speed participant never self-schedules but may act this way.
    pub fn set_current(&mut self, index: usize) -> Result<(), TurnError> {
        if index >= self.entries.len() {
            return Err(TurnError::UnknownTurnTaker(index));
        }
        self.current = Some(index);
        Ok(())
    }

    /// Advances the queue until an actor holds the turn, or reports idle.
    ///
    /// 1. If the current holder's buildup fell below the threshold (e.g.
    ///    consumed mid-step by a cancellation), the slot is cleared.
    /// 2. While no one holds the turn: prune flagged entries, select among
    ///    already-ready candidates (highest buildup first, insertion order
    ///    on ties), and only if nobody is ready advance one tick of
    ///    buildup for everyone.
    /// 3. If no entry has positive speed and nobody is ready, the queue is
    ///    [`StepOutcome::Idle`].
    ///
    /// Calling `step` again without [`finish_turn`](Self::finish_turn)
    /// re-reports the same selection.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(index) = self.current
            && !self.entries[index].turn_ready()
        {
            self.current = None;
        }

        loop {
            if let Some(index) = self.current {
                return StepOutcome::Selected(index);
            }

            self.entries.retain(|taker| !taker.remove_from_queue());

            let buildups: Vec<f64> = self.entries.iter().map(|t| t.turn_buildup()).collect();
            let ready: Vec<bool> = self.entries.iter().map(|t| t.turn_ready()).collect();
            if let Some(index) = select_candidate(&buildups, &ready) {
                self.current = Some(index);
                continue;
            }

            if !self.entries.iter().any(|t| t.turn_speed() > 0.0) {
                return StepOutcome::Idle;
            }

            for taker in &mut self.entries {
                let next = taker.turn_buildup() + taker.turn_speed();
                taker.set_turn_buildup(next);
            }
            self.now += 1;
        }
    }

    /// Ends the current turn: subtracts exactly 1.0 from the holder's
    /// buildup (mod-1 reset, fractional overflow preserved) and clears the
    /// selection.
    pub fn finish_turn(&mut self) {
        if let Some(index) = self.current.take() {
            let taker = &mut self.entries[index];
            let next = taker.turn_buildup() - 1.0;
            taker.set_turn_buildup(next);
        }
    }

    /// Non-mutating forecast of upcoming turn order.
    ///
    /// Runs the identical fast-forward algorithm over a snapshot of
    /// `(buildup, speed)` pairs; yields queue positions, never touches the
    /// live state, and ends only when the snapshot goes idle. Restart by
    /// calling `forecast` again.
    pub fn forecast(&self) -> Forecast {
        Forecast {
            entries: self
                .entries
                .iter()
                .filter(|t| !t.remove_from_queue())
                .map(|t| (t.turn_buildup(), t.turn_speed()))
                .collect(),
        }
    }

    /// First `n` entries of the forecast.
    pub fn predict(&self, n: usize) -> Vec<usize> {
        self.forecast().take(n).collect()
    }
}

/// Lazy, conceptually infinite "who acts next" sequence over a snapshot.
#[derive(Clone, Debug)]
pub struct Forecast {
    entries: Vec<(f64, f64)>,
}

impl Iterator for Forecast {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let buildups: Vec<f64> = self.entries.iter().map(|&(b, _)| b).collect();
            let ready: Vec<bool> = buildups
                .iter()
                .map(|&b| b >= SimConfig::DEFAULT_ACTION_THRESHOLD)
                .collect();
            if let Some(index) = select_candidate(&buildups, &ready) {
                self.entries[index].0 -= 1.0;
                return Some(index);
            }

            if !self.entries.iter().any(|&(_, speed)| speed > 0.0) {
                return None;
            }

            for (buildup, speed) in &mut self.entries {
                *buildup += *speed;
            }
        }
    }
}

/// Shared selection routine for the live queue and the forecast.
///
/// Candidates are considered in descending buildup order; among equal
/// buildups the earlier queue position wins (stable sort). The first ready
/// candidate is selected.
fn select_candidate(buildups: &[f64], ready: &[bool]) -> Option<usize> {
    debug_assert_eq!(buildups.len(), ready.len());
    let mut order: Vec<usize> = (0..buildups.len()).collect();
    order.sort_by(|&a, &b| buildups[b].total_cmp(&buildups[a]));
    order.into_iter().find(|&index| ready[index])
}
