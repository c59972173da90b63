//! Deadline-bounded execution of the decision routine.
//!
//! The routine runs on its own OS thread so a slow or blocking routine never stalls the I/O
//! loop. The loop waits on a single-slot completion channel until the turn's deadline. An
//! execution that overruns is abandoned, not killed: it keeps running, and the next turn waits
//! on the same channel instead of starting a second one. Whatever it eventually produces is
//! answered for the turn that is current when it lands.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use luminis_game::{TurnResponse, World};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};

/// The bot. Called once per turn with that turn's snapshot; assigns intents through
/// [`World::move_unit`].
pub trait DecisionRoutine: Send + 'static {
    fn decide(&mut self, world: &World) -> anyhow::Result<()>;
}

impl<F> DecisionRoutine for F
where
    F: FnMut(&World) -> anyhow::Result<()> + Send + 'static,
{
    fn decide(&mut self, world: &World) -> anyhow::Result<()> {
        self(world)
    }
}

/// What to answer for one turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// A result arrived in time. Empty when the routine failed.
    Completed(TurnResponse),
    /// The deadline passed first; the execution is still pending.
    TimedOut,
}

type Completion = (Box<dyn DecisionRoutine>, TurnResponse);

struct Execution {
    turn: u64,
    started: Instant,
    done: oneshot::Receiver<Completion>,
}

enum Slot {
    Idle(Box<dyn DecisionRoutine>),
    Running(Execution),
    /// The routine went down with its thread; every later turn answers with no moves.
    Lost,
}

pub struct DeadlineExecutor {
    slot: Slot,
    budget: Duration,
}

impl DeadlineExecutor {
    pub fn new(routine: impl DecisionRoutine, budget: Duration) -> Self {
        Self {
            slot: Slot::Idle(Box::new(routine)),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Whether an overrun execution from an earlier turn is still outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.slot, Slot::Running(_))
    }

    /// Runs (or keeps waiting on) a decision for `turn`, giving up at the budget.
    ///
    /// When an earlier execution is still pending, `world` is dropped unused.
    pub async fn run(&mut self, world: World, turn: u64) -> TurnOutcome {
        let deadline = tokio::time::Instant::now() + self.budget;

        let mut execution = match std::mem::replace(&mut self.slot, Slot::Lost) {
            Slot::Idle(routine) => match spawn(routine, world, turn) {
                Ok(execution) => execution,
                Err(err) => {
                    error!(
                        turn,
                        error = %err,
                        "Failed to start decision thread; no further moves will be made"
                    );
                    return TurnOutcome::Completed(TurnResponse::default());
                }
            },
            Slot::Running(execution) => {
                drop(world);
                debug!(
                    turn,
                    pending_turn = execution.turn,
                    "Previous decision still running; waiting on it instead of starting another"
                );
                execution
            }
            Slot::Lost => return TurnOutcome::Completed(TurnResponse::default()),
        };

        match tokio::time::timeout_at(deadline, &mut execution.done).await {
            Ok(Ok((routine, response))) => {
                self.slot = Slot::Idle(routine);
                TurnOutcome::Completed(response)
            }
            Ok(Err(_)) => {
                error!(turn, "Decision thread exited without reporting back");
                TurnOutcome::Completed(TurnResponse::default())
            }
            Err(_) => {
                warn!(
                    turn,
                    started_turn = execution.turn,
                    elapsed_ms = execution.started.elapsed().as_millis() as u64,
                    budget_ms = self.budget.as_millis() as u64,
                    "Decision overran its deadline; answering NO_RESPONSE"
                );
                self.slot = Slot::Running(execution);
                TurnOutcome::TimedOut
            }
        }
    }
}

fn spawn(
    mut routine: Box<dyn DecisionRoutine>,
    world: World,
    turn: u64,
) -> std::io::Result<Execution> {
    let (tx, done) = oneshot::channel();
    let started = Instant::now();

    thread::Builder::new()
        .name("decision".to_string())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| routine.decide(&world)));
            let response = match outcome {
                Ok(Ok(())) => TurnResponse::from_world(&world),
                Ok(Err(err)) => {
                    error!(turn, error = ?err, "Decision routine failed; no moves this turn");
                    TurnResponse::default()
                }
                Err(payload) => {
                    error!(
                        turn,
                        panic = panic_message(&*payload),
                        "Decision routine panicked; no moves this turn"
                    );
                    TurnResponse::default()
                }
            };
            debug!(
                turn,
                elapsed_ms = started.elapsed().as_millis() as u64,
                moves = response.len(),
                "[TIME] decision finished"
            );
            // Nobody listening means the session is over.
            let _ = tx.send((routine, response));
        })?;

    Ok(Execution {
        turn,
        started,
        done,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
