//! Movement strategies: deterministic state machines that propose one
//! displacement per turn.

use hopscotch_core::{Dimensions, Point, SimulationFault, StrategyKind};

/// Displacement proposed by a strategy together with the state it moves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Displacement to apply to the entity's position.
    pub displacement: Point,
    /// State the strategy enters once the displacement is applied.
    pub state: u8,
}

impl Transition {
    const fn new(displacement: Point, state: u8) -> Self {
        Self {
            displacement,
            state,
        }
    }
}

/// Movement strategy driving a single entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Never moves.
    Idle,
    /// States 0/1 hop right then left; states 2/3 hop up then down.
    Oscillator {
        /// Current state.
        state: u8,
    },
    /// States 0..=3 walk anticlockwise; states 4..=7 walk clockwise.
    Spiral {
        /// Current state.
        state: u8,
    },
    /// States 0..=3 and 4..=7 walk mirrored diamonds of diagonal hops.
    Diamond {
        /// Current state.
        state: u8,
    },
    /// State 0 is parked; states 1..=4 roll up, down, left and right.
    Roller {
        /// Current state.
        state: u8,
    },
    /// Consumes a single queued displacement per turn from a step budget.
    Player {
        /// Displacement supplied by the input layer for the next turn.
        queued: Option<Point>,
        /// Steps left before the player is exhausted.
        steps_left: u32,
        /// Step budget granted at spawn.
        max_steps: u32,
    },
    /// Copies the player's moves. Not supported yet.
    Mirror,
}

impl Strategy {
    /// Builds the strategy for `kind` in the given starting state.
    ///
    /// `max_steps` only matters for the player strategy.
    #[must_use]
    pub fn spawn(kind: StrategyKind, state: u8, max_steps: u32) -> Self {
        match kind {
            StrategyKind::Idle => Strategy::Idle,
            StrategyKind::Oscillator => Strategy::Oscillator { state },
            StrategyKind::Spiral => Strategy::Spiral { state },
            StrategyKind::Diamond => Strategy::Diamond { state },
            StrategyKind::Roller => Strategy::Roller { state },
            StrategyKind::Player => Strategy::Player {
                queued: None,
                steps_left: max_steps,
                max_steps,
            },
            StrategyKind::Mirror => Strategy::Mirror,
        }
    }

    /// Kind of the strategy.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Idle => StrategyKind::Idle,
            Strategy::Oscillator { .. } => StrategyKind::Oscillator,
            Strategy::Spiral { .. } => StrategyKind::Spiral,
            Strategy::Diamond { .. } => StrategyKind::Diamond,
            Strategy::Roller { .. } => StrategyKind::Roller,
            Strategy::Player { .. } => StrategyKind::Player,
            Strategy::Mirror => StrategyKind::Mirror,
        }
    }

    /// Current state. Strategies without states report 0.
    #[must_use]
    pub const fn state(&self) -> u8 {
        match self {
            Strategy::Oscillator { state }
            | Strategy::Spiral { state }
            | Strategy::Diamond { state }
            | Strategy::Roller { state } => *state,
            Strategy::Idle | Strategy::Player { .. } | Strategy::Mirror => 0,
        }
    }

    /// Computes the next transition without changing the strategy.
    ///
    /// `position` and `dimensions` are only consulted by the roller, which
    /// parks instead of rolling off the board.
    pub fn next(&self, position: Point, dimensions: Dimensions) -> Result<Transition, SimulationFault> {
        let invalid = |state: u8| SimulationFault::InvalidState {
            strategy: self.kind(),
            state,
        };

        let transition = match *self {
            Strategy::Idle => Transition::new(Point::IDLE, 0),
            Strategy::Oscillator { state } => match state {
                0 => Transition::new(Point::RIGHT, 1),
                1 => Transition::new(Point::LEFT, 0),
                2 => Transition::new(Point::UP, 3),
                3 => Transition::new(Point::DOWN, 2),
                other => return Err(invalid(other)),
            },
            Strategy::Spiral { state } => match state {
                0 => Transition::new(Point::RIGHT, 1),
                1 => Transition::new(Point::UP, 2),
                2 => Transition::new(Point::LEFT, 3),
                3 => Transition::new(Point::DOWN, 0),
                4 => Transition::new(Point::UP, 5),
                5 => Transition::new(Point::RIGHT, 6),
                6 => Transition::new(Point::DOWN, 7),
                7 => Transition::new(Point::LEFT, 4),
                other => return Err(invalid(other)),
            },
            Strategy::Diamond { state } => match state {
                0 => Transition::new(Point::UP + Point::RIGHT, 1),
                1 => Transition::new(Point::RIGHT + Point::DOWN, 2),
                2 => Transition::new(Point::DOWN + Point::LEFT, 3),
                3 => Transition::new(Point::LEFT + Point::UP, 0),
                4 => Transition::new(Point::RIGHT + Point::DOWN, 5),
                5 => Transition::new(Point::UP + Point::RIGHT, 6),
                6 => Transition::new(Point::LEFT + Point::UP, 7),
                7 => Transition::new(Point::DOWN + Point::LEFT, 4),
                other => return Err(invalid(other)),
            },
            Strategy::Roller { state } => {
                let direction = match state {
                    0 => return Ok(Transition::new(Point::IDLE, 0)),
                    1 => Point::UP,
                    2 => Point::DOWN,
                    3 => Point::LEFT,
                    4 => Point::RIGHT,
                    other => return Err(invalid(other)),
                };
                if dimensions.contains(position + direction) {
                    Transition::new(direction, state)
                } else {
                    Transition::new(Point::IDLE, 0)
                }
            }
            Strategy::Player { queued, .. } => {
                Transition::new(queued.unwrap_or(Point::IDLE), 0)
            }
            Strategy::Mirror => {
                return Err(SimulationFault::UnimplementedStrategy {
                    strategy: StrategyKind::Mirror,
                })
            }
        };
        Ok(transition)
    }

    /// Commits a transition previously produced by [`Strategy::next`].
    ///
    /// The player strategy drops its queued displacement and spends a step.
    pub fn commit(&mut self, transition: Transition) {
        match self {
            Strategy::Oscillator { state }
            | Strategy::Spiral { state }
            | Strategy::Diamond { state }
            | Strategy::Roller { state } => *state = transition.state,
            Strategy::Player {
                queued, steps_left, ..
            } => {
                *queued = None;
                *steps_left = steps_left.saturating_sub(1);
            }
            Strategy::Idle | Strategy::Mirror => {}
        }
    }

    /// Queues the player's displacement for the next turn.
    ///
    /// Returns `false` when the strategy does not take queued input.
    pub fn queue(&mut self, displacement: Point) -> bool {
        match self {
            Strategy::Player { queued, .. } => {
                *queued = Some(displacement);
                true
            }
            _ => false,
        }
    }

    /// Starts a roller rolling along `direction`, or parks it when the
    /// direction is not a cardinal unit vector. Other strategies are untouched.
    pub fn roll(&mut self, direction: Point) {
        if let Strategy::Roller { state } = self {
            *state = rolling_state(direction).unwrap_or(0);
        }
    }

    /// Parks a roller. Other strategies are untouched.
    pub fn park(&mut self) {
        if let Strategy::Roller { state } = self {
            *state = 0;
        }
    }

    /// Steps left and budget for the player strategy.
    #[must_use]
    pub const fn step_budget(&self) -> Option<(u32, u32)> {
        match self {
            Strategy::Player {
                steps_left,
                max_steps,
                ..
            } => Some((*steps_left, *max_steps)),
            _ => None,
        }
    }
}

/// Roller state that keeps rolling along `direction`.
#[must_use]
pub fn rolling_state(direction: Point) -> Option<u8> {
    match direction {
        Point::UP => Some(1),
        Point::DOWN => Some(2),
        Point::LEFT => Some(3),
        Point::RIGHT => Some(4),
        _ => None,
    }
}
