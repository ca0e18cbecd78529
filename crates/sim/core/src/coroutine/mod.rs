//! Cooperative coroutine runner for multi-step actions.
//!
//! Single-threaded and step-driven: a "coroutine" is a resumable sequence
//! of [`Wait`] conditions, not an OS thread. The [`Runner`] advances every
//! active coroutine exactly once per [`update`](Runner::update), in the
//! order they were added, with coroutines queued mid-pass deferred to the
//! following pass. Suspension happens only at `Wait` yield points; nothing
//! ever blocks.
//!
//! There is deliberately no cancellation operation. A coroutine whose wait
//! never resolves (input that never arrives) is an accepted steady state:
//! callers abandon the id and ignore the orphan, or bake an abort check
//! into the sequence itself. The same policy covers completed ids: a
//! [`Wait::ForCoroutine`] clone may surface arbitrarily late, so finished
//! ids are retained for the runner's lifetime rather than retired. A
//! runner is scoped to one encounter and reconstructed with its world,
//! which bounds the retention.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identifier for a scheduled coroutine. Never reused within one runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoroutineId(pub u64);

/// Externally-resolved completion flag for [`Wait::ForInput`].
///
/// Cloning shares the flag; the holder that hands the wait out keeps a
/// clone and calls [`resolve`](InputSignal::resolve) when the input
/// arrives. Single-threaded by design, like the rest of the runner.
#[derive(Clone, Debug, Default)]
pub struct InputSignal(Rc<Cell<bool>>);

impl InputSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self) {
        self.0.set(true);
    }

    pub fn is_resolved(&self) -> bool {
        self.0.get()
    }
}

/// A suspension condition.
#[derive(Clone, Debug)]
pub enum Wait {
    /// Always satisfied; never ticked.
    Done,
    /// Satisfied after the given number of ticks.
    Timed(u32),
    /// Satisfied when every child is; ticks unsatisfied children, carries
    /// no counter of its own.
    All(Vec<Wait>),
    /// Never satisfied until external code resolves the signal.
    ForInput(InputSignal),
    /// Satisfied exactly when the referenced coroutine completes.
    ForCoroutine(CoroutineId),
}

impl Wait {
    /// Whether the condition currently holds. `completed` is the runner's
    /// set of finished coroutine ids.
    fn is_satisfied(&self, completed: &BTreeSet<CoroutineId>) -> bool {
        match self {
            Wait::Done => true,
            Wait::Timed(remaining) => *remaining == 0,
            Wait::All(children) => children.iter().all(|c| c.is_satisfied(completed)),
            Wait::ForInput(signal) => signal.is_resolved(),
            Wait::ForCoroutine(id) => completed.contains(id),
        }
    }

    /// Advances the condition by one tick.
    fn tick(&mut self, completed: &BTreeSet<CoroutineId>) {
        match self {
            Wait::Timed(remaining) => *remaining = remaining.saturating_sub(1),
            Wait::All(children) => {
                for child in children {
                    if !child.is_satisfied(completed) {
                        child.tick(completed);
                    }
                }
            }
            Wait::Done | Wait::ForInput(_) | Wait::ForCoroutine(_) => {}
        }
    }
}

/// A resumable sequence of waits. Iterators are the explicit cursor here:
/// each `next` resumes the action up to its following yield point.
pub type Script = Box<dyn Iterator<Item = Wait>>;

/// Builds a script from a pre-built list of waits.
pub fn sequence(waits: Vec<Wait>) -> Script {
    Box::new(waits.into_iter())
}

struct Coroutine {
    id: CoroutineId,
    script: Script,
    wait: Option<Wait>,
    done: bool,
}

/// Drives registered coroutines one step at a time.
#[derive(Default)]
pub struct Runner {
    next_id: u64,
    /// Scheduled but not yet active; drained at the start of the next
    /// update pass so a freshly queued coroutine is never stepped twice in
    /// the pass that queued it.
    queued: Vec<Coroutine>,
    active: Vec<Coroutine>,
    /// Every finished id, kept for the runner's lifetime so late
    /// `ForCoroutine` waits and host polls stay answerable.
    completed: BTreeSet<CoroutineId>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a coroutine for inclusion starting next update pass.
    pub fn run(&mut self, script: Script) -> CoroutineId {
        let id = CoroutineId(self.next_id);
        self.next_id += 1;
        self.queued.push(Coroutine {
            id,
            script,
            wait: None,
            done: false,
        });
        id
    }

    /// Enqueues a coroutine and returns a wait that resolves when that
    /// specific coroutine completes, so one action can block on another
    /// without polling.
    pub fn run_and_wait(&mut self, script: Script) -> Wait {
        Wait::ForCoroutine(self.run(script))
    }

    /// True once the coroutine has run its sequence to completion.
    ///
    /// Poll surface for hosts deciding when to re-enable input.
    pub fn is_done(&self, id: CoroutineId) -> bool {
        self.completed.contains(&id)
    }

    /// Number of coroutines currently active or queued.
    pub fn pending(&self) -> usize {
        self.active.len() + self.queued.len()
    }

    /// Advances every active coroutine exactly once.
    ///
    /// Per coroutine: when the current wait is absent or satisfied, the
    /// sequence is resumed to its next wait (completing the coroutine if
    /// the sequence is exhausted) and the fresh wait receives its first
    /// tick; otherwise the current wait ticks. Completed coroutines are
    /// pruned after the pass.
    pub fn update(&mut self) {
        let mut incoming = std::mem::take(&mut self.queued);
        self.active.append(&mut incoming);

        for i in 0..self.active.len() {
            let current_satisfied = match &self.active[i].wait {
                None => true,
                Some(wait) => wait.is_satisfied(&self.completed),
            };

            if current_satisfied {
                match self.active[i].script.next() {
                    Some(mut wait) => {
                        wait.tick(&self.completed);
                        self.active[i].wait = Some(wait);
                    }
                    None => {
                        self.active[i].done = true;
                        self.completed.insert(self.active[i].id);
                    }
                }
            } else if let Some(wait) = &mut self.active[i].wait {
                wait.tick(&self.completed);
            }
        }

        self.active.retain(|co| !co.done);
    }
}
