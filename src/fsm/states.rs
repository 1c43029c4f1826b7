//! Concrete machines and their table builders.
//!
//! Each variant is pure data: an entry-action row per state and a list of
//! transitions.  Durations come from [`Timings`] so they can be shortened
//! for bench runs and tests.
//!
//! ```text
//!  Cycle:   RED ──5s──▶ GREEN ──5s──▶ YELLOW ──2s──▶ RED
//!
//!  Button:  IDLE ──press──▶ RED1 ──2s──▶ RED_YELLOW ──2s──▶ GREEN
//!             ▲                                              │
//!             └──2s── RED2 ◀──2s── YELLOW ◀──────2s──────────┘
//! ```

use super::pattern::OutputPattern;
use super::{Event, StateDescriptor, StateSet, StateTable, Transition, TransitionTable, Trigger};
use crate::config::Timings;
use crate::error::Result;

// ═══════════════════════════════════════════════════════════════════════════
//  Three-state timed cycle
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    Red,
    Green,
    Yellow,
}

impl CycleState {
    pub const ALL: [CycleState; 3] = [CycleState::Red, CycleState::Green, CycleState::Yellow];
}

impl StateSet for CycleState {
    fn name(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Yellow => "Yellow",
        }
    }
}

/// Build the timed Red → Green → Yellow cycle.
pub fn build_cycle_table(timings: &Timings) -> Result<StateTable<CycleState>> {
    use CycleState::{Green, Red, Yellow};

    let transitions = TransitionTable::new(&[
        Transition::new(Red, Event::TimerElapsed, Green),
        Transition::new(Green, Event::TimerElapsed, Yellow),
        Transition::new(Yellow, Event::TimerElapsed, Red),
    ])?;

    StateTable::new(
        Red,
        &[
            StateDescriptor {
                id: Red,
                pattern: OutputPattern::RED,
                trigger: Trigger::After(timings.red()),
            },
            StateDescriptor {
                id: Green,
                pattern: OutputPattern::GREEN,
                trigger: Trigger::After(timings.green()),
            },
            StateDescriptor {
                id: Yellow,
                pattern: OutputPattern::YELLOW,
                trigger: Trigger::After(timings.yellow()),
            },
        ],
        transitions,
    )
}

// ═══════════════════════════════════════════════════════════════════════════
//  Six-state button-requested cycle
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Waiting for a request; all lamps lit.
    Idle,
    Red1,
    RedYellow,
    Green,
    Yellow,
    Red2,
}

impl ButtonState {
    pub const ALL: [ButtonState; 6] = [
        ButtonState::Idle,
        ButtonState::Red1,
        ButtonState::RedYellow,
        ButtonState::Green,
        ButtonState::Yellow,
        ButtonState::Red2,
    ];
}

impl StateSet for ButtonState {
    fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Red1 => "Red1",
            Self::RedYellow => "RedYellow",
            Self::Green => "Green",
            Self::Yellow => "Yellow",
            Self::Red2 => "Red2",
        }
    }
}

/// Build the button-requested cycle.  Every timed state lasts
/// [`Timings::phase`].
pub fn build_button_table(timings: &Timings) -> Result<StateTable<ButtonState>> {
    use ButtonState::{Green, Idle, Red1, Red2, RedYellow, Yellow};

    let transitions = TransitionTable::new(&[
        Transition::new(Idle, Event::ButtonPressed, Red1),
        Transition::new(Red1, Event::TimerElapsed, RedYellow),
        Transition::new(RedYellow, Event::TimerElapsed, Green),
        Transition::new(Green, Event::TimerElapsed, Yellow),
        Transition::new(Yellow, Event::TimerElapsed, Red2),
        Transition::new(Red2, Event::TimerElapsed, Idle),
    ])?;

    let phase = Trigger::After(timings.phase());
    let row = |id, pattern, trigger| StateDescriptor {
        id,
        pattern,
        trigger,
    };

    StateTable::new(
        Idle,
        &[
            row(Idle, OutputPattern::ALL_ON, Trigger::ButtonPress),
            row(Red1, OutputPattern::RED, phase),
            row(RedYellow, OutputPattern::RED_YELLOW, phase),
            row(Green, OutputPattern::GREEN, phase),
            row(Yellow, OutputPattern::YELLOW, phase),
            row(Red2, OutputPattern::RED, phase),
        ],
        transitions,
    )
}
