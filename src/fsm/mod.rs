//! Table-driven finite state machine model.
//!
//! Classic embedded FSM pattern, split into two immutable tables:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌───────────┬────────────────┬─────────────────────┐    │
//! │  │ State     │ OutputPattern  │ Trigger             │    │
//! │  ├───────────┼────────────────┼─────────────────────┤    │
//! │  │ Red       │ [R . .]        │ After(5s)           │    │
//! │  │ Green     │ [. . G]        │ After(5s)           │    │
//! │  │ Yellow    │ [. Y .]        │ After(2s)           │    │
//! │  └───────────┴────────────────┴─────────────────────┘    │
//! │  TransitionTable                                         │
//! │  (Red, TimerElapsed) → Green   (Green, ...) → Yellow ... │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The [`Controller`](crate::app::controller::Controller) owns one
//! [`StateTable`] and drives it: on every entry it writes the state's
//! pattern and arms the state's trigger; when the trigger fires it looks up
//! the next state.  Adding a state is a data change in [`states`], never a
//! new branch in the controller.

pub mod pattern;
pub mod states;

use core::fmt;
use core::time::Duration;

use crate::error::{Error, Result};
use pattern::OutputPattern;

/// Fixed capacity of a [`TransitionTable`].
pub const MAX_TRANSITIONS: usize = 16;
/// Fixed capacity of a [`StateTable`]'s entry-action rows.
pub const MAX_STATES: usize = 8;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Single-shot triggers that cause at most one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// The current state's deadline timer expired.
    TimerElapsed,
    /// The edge monitor confirmed a debounced button press.
    ButtonPressed,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimerElapsed => write!(f, "TimerElapsed"),
            Self::ButtonPressed => write!(f, "ButtonPressed"),
        }
    }
}

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// A closed enumeration of controller modes.
pub trait StateSet: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Display name used in logs and errors.
    fn name(self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Immutable `(from, event) → to` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub event: Event,
    pub to: S,
}

impl<S> Transition<S> {
    pub const fn new(from: S, event: Event, to: S) -> Self {
        Self { from, event, to }
    }
}

/// Deterministic transition table with no guards.
///
/// At most one transition per `(from, event)`; fixed at construction.
#[derive(Debug, Clone)]
pub struct TransitionTable<S> {
    transitions: heapless::Vec<Transition<S>, MAX_TRANSITIONS>,
}

impl<S: StateSet> TransitionTable<S> {
    /// Build a table, rejecting duplicate sources.
    pub fn new(transitions: &[Transition<S>]) -> Result<Self> {
        let mut table = heapless::Vec::new();
        for t in transitions {
            if table
                .iter()
                .any(|e: &Transition<S>| e.from == t.from && e.event == t.event)
            {
                return Err(Error::DuplicateTransition {
                    state: t.from.name(),
                    event: t.event,
                });
            }
            table.push(*t).map_err(|_| Error::TableFull)?;
        }
        Ok(Self { transitions: table })
    }

    /// Next state for `(state, event)`, if the model defines one.
    pub fn lookup(&self, state: S, event: Event) -> Option<S> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.event == event)
            .map(|t| t.to)
    }

    /// Like [`lookup`](Self::lookup) but reports a missing entry as
    /// [`Error::UnhandledEvent`].
    pub fn next(&self, state: S, event: Event) -> Result<S> {
        self.lookup(state, event).ok_or(Error::UnhandledEvent {
            state: state.name(),
            event,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry actions
// ---------------------------------------------------------------------------

/// What advances a state once its entry actions have run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire [`Event::TimerElapsed`] after a fixed delay.
    After(Duration),
    /// Fire [`Event::ButtonPressed`] on a debounced press.
    ButtonPress,
}

impl Trigger {
    /// The event this trigger delivers when it fires.
    pub const fn event(self) -> Event {
        match self {
            Self::After(_) => Event::TimerElapsed,
            Self::ButtonPress => Event::ButtonPressed,
        }
    }
}

/// One row of the entry-action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDescriptor<S> {
    pub id: S,
    pub pattern: OutputPattern,
    pub trigger: Trigger,
}

/// Entry-action table plus transitions for one machine variant.
#[derive(Debug, Clone)]
pub struct StateTable<S> {
    initial: S,
    descriptors: heapless::Vec<StateDescriptor<S>, MAX_STATES>,
    transitions: TransitionTable<S>,
}

impl<S: StateSet> StateTable<S> {
    /// Assemble and cross-check the two tables.
    ///
    /// Every state the machine can reach must have entry actions, and every
    /// trigger a state arms must have an outgoing transition, so a fired
    /// trigger can never hit an unhandled event.
    pub fn new(
        initial: S,
        descriptors: &[StateDescriptor<S>],
        transitions: TransitionTable<S>,
    ) -> Result<Self> {
        let mut rows: heapless::Vec<StateDescriptor<S>, MAX_STATES> = heapless::Vec::new();
        for d in descriptors {
            if rows.iter().any(|r| r.id == d.id) {
                return Err(Error::InvalidConfig("duplicate state descriptor"));
            }
            rows.push(*d).map_err(|_| Error::TableFull)?;
        }

        let table = Self {
            initial,
            descriptors: rows,
            transitions,
        };

        table.entry(initial)?;
        for t in table.transitions.iter() {
            table.entry(t.to)?;
        }
        for d in &table.descriptors {
            let event = d.trigger.event();
            if table.transitions.lookup(d.id, event).is_none() {
                return Err(Error::MissingTransition {
                    state: d.id.name(),
                    event,
                });
            }
        }
        Ok(table)
    }

    /// The state entered by `start()`.
    pub fn initial(&self) -> S {
        self.initial
    }

    /// Entry actions for `state`.
    pub fn entry(&self, state: S) -> Result<&StateDescriptor<S>> {
        self.descriptors
            .iter()
            .find(|d| d.id == state)
            .ok_or(Error::MissingState(state.name()))
    }

    /// Resolve a transition, see [`TransitionTable::next`].
    pub fn next(&self, state: S, event: Event) -> Result<S> {
        self.transitions.next(state, event)
    }

    pub fn transitions(&self) -> &TransitionTable<S> {
        &self.transitions
    }

    pub fn descriptors(&self) -> &[StateDescriptor<S>] {
        &self.descriptors
    }

    /// True if any state waits on the push button.
    pub fn needs_input(&self) -> bool {
        self.descriptors
            .iter()
            .any(|d| d.trigger == Trigger::ButtonPress)
    }
}
