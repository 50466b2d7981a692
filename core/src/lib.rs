#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hopscotch simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure systems. Adapters submit [`Command`]
//! values describing player intent, the turn system applies them against the
//! world, and every resulting mutation is reported as an [`Event`] so that
//! renderers can animate a turn without diffing state.

use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub},
};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Step budget granted to the player when a level does not override it.
pub const DEFAULT_MAX_STEPS: u32 = 50;

/// Degrees added to a displacement angle before snapping it to a cardinal
/// facing, so that exact diagonals never land on a rounding tie.
const FACING_BIAS_DEGREES: f64 = 1.0;

/// Integer board coordinate, also used as a displacement between coordinates.
///
/// Rows grow downwards: [`Point::UP`] is `(0, -1)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Displacement that leaves a position unchanged.
    pub const IDLE: Point = Point::new(0, 0);
    /// Unit displacement toward decreasing rows.
    pub const UP: Point = Point::new(0, -1);
    /// Unit displacement toward increasing rows.
    pub const DOWN: Point = Point::new(0, 1);
    /// Unit displacement toward decreasing columns.
    pub const LEFT: Point = Point::new(-1, 0);
    /// Unit displacement toward increasing columns.
    pub const RIGHT: Point = Point::new(1, 0);

    /// Creates a new point from its column and row.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the point.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the point.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether the point is the zero displacement.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a board measured in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Creates board dimensions from a column and row count.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the point lies on the board.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        u32::try_from(point.x()).is_ok_and(|x| x < self.width)
            && u32::try_from(point.y()).is_ok_and(|y| y < self.height)
    }
}

/// Displacement intents the input layer may submit for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Hop one tile toward decreasing rows.
    Up,
    /// Hop one tile toward increasing rows.
    Down,
    /// Hop one tile toward decreasing columns.
    Left,
    /// Hop one tile toward increasing columns.
    Right,
    /// Spend a turn without moving.
    None,
}

impl Intent {
    /// Displacement applied to the player when the intent is accepted.
    #[must_use]
    pub const fn displacement(self) -> Point {
        match self {
            Intent::Up => Point::UP,
            Intent::Down => Point::DOWN,
            Intent::Left => Point::LEFT,
            Intent::Right => Point::RIGHT,
            Intent::None => Point::IDLE,
        }
    }
}

/// Cardinal orientation used to pick sprites.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Looking toward decreasing rows.
    #[default]
    Up,
    /// Looking toward increasing columns.
    Right,
    /// Looking toward increasing rows.
    Down,
    /// Looking toward decreasing columns.
    Left,
}

impl Facing {
    /// Derives the facing after travelling along `displacement`.
    ///
    /// A zero displacement keeps the current facing. Anything else is snapped
    /// to the nearest cardinal by angle; the angle is biased by one degree so
    /// that diagonal hops always resolve to one consistent side.
    #[must_use]
    pub fn after_move(self, displacement: Point) -> Facing {
        if displacement.is_zero() {
            return self;
        }
        let degrees = f64::from(displacement.y())
            .atan2(f64::from(displacement.x()))
            .to_degrees()
            + FACING_BIAS_DEGREES;
        let quadrant = (degrees / 90.0).round() as i64;
        match quadrant.rem_euclid(4) {
            0 => Facing::Right,
            1 => Facing::Down,
            2 => Facing::Left,
            _ => Facing::Up,
        }
    }
}

bitflags! {
    /// Capability markers consulted by collision rules.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Tags: u16 {
        /// Cannot be entered; blocks pushes and hops.
        const SOLID = 1 << 0;
        /// Pushes `PUSHABLE` entities it moves into.
        const PUSHER = 1 << 1;
        /// Can be shoved along by a `PUSHER`.
        const PUSHABLE = 1 << 2;
        /// The player-controlled entity.
        const PLAYER = 1 << 3;
        /// Hopping creature; two hoppers on one tile do not survive together.
        const HOPS = 1 << 4;
        /// Kills the player on contact.
        const KILLS_PLAYER = 1 << 5;
        /// Rolls on after being pushed.
        const BARREL = 1 << 6;
        /// Drawn without idle animation.
        const NO_ANIMATION = 1 << 7;
    }
}

/// Unique identifier assigned to an entity when its world is populated.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Closed set of movement strategies an entity can be driven by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Never moves.
    Idle,
    /// Hops back and forth along one axis.
    Oscillator,
    /// Walks a unit square, clockwise or anticlockwise.
    Spiral,
    /// Walks a diamond of diagonal hops.
    Diamond,
    /// Parked until pushed, then rolls on until stopped.
    Roller,
    /// Moves as the input layer instructs.
    Player,
    /// Copies the player's moves. Not supported yet.
    Mirror,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StrategyKind::Idle => "idle",
            StrategyKind::Oscillator => "oscillator",
            StrategyKind::Spiral => "spiral",
            StrategyKind::Diamond => "diamond",
            StrategyKind::Roller => "roller",
            StrategyKind::Player => "player",
            StrategyKind::Mirror => "mirror",
        };
        f.write_str(label)
    }
}

/// Initial description of an entity as produced by a level loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySeed {
    /// Species label, also used by renderers to pick sprites.
    pub name: String,
    /// Starting tile.
    pub position: Point,
    /// Capability markers.
    pub tags: Tags,
    /// Strategy driving the entity each turn.
    pub strategy: StrategyKind,
    /// Starting strategy state.
    pub state: u8,
    /// Starting facing.
    pub facing: Facing,
}

impl EntitySeed {
    /// Creates a seed in strategy state 0 facing up.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        position: Point,
        tags: Tags,
        strategy: StrategyKind,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            tags,
            strategy,
            state: 0,
            facing: Facing::Up,
        }
    }

    /// Overrides the starting strategy state.
    #[must_use]
    pub fn with_state(mut self, state: u8) -> Self {
        self.state = state;
        self
    }

    /// Overrides the starting facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }
}

/// Board dimensions plus the entities that populate a fresh board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    dimensions: Dimensions,
    entities: Vec<EntitySeed>,
}

impl LevelLayout {
    /// Creates a layout from its dimensions and entity seeds.
    #[must_use]
    pub fn new(dimensions: Dimensions, entities: Vec<EntitySeed>) -> Self {
        Self {
            dimensions,
            entities,
        }
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Entities in load order.
    #[must_use]
    pub fn entities(&self) -> &[EntitySeed] {
        &self.entities
    }
}

/// Read-only state of a single entity exposed to renderers and tests.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Unique identifier of the entity.
    pub id: EntityId,
    /// Species label.
    pub name: String,
    /// Tile currently occupied.
    pub position: Point,
    /// Tile occupied before the latest move, push or revert.
    pub previous: Point,
    /// Sprite orientation.
    pub facing: Facing,
    /// Capability markers.
    pub tags: Tags,
    /// Strategy driving the entity.
    pub strategy: StrategyKind,
    /// Current strategy state.
    pub state: u8,
    /// Whether the entity survives the current turn.
    pub alive: bool,
}

/// Commands accepted from the input layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Attempts to play one turn with the provided player intent.
    Move {
        /// Displacement requested for the player.
        intent: Intent,
    },
    /// Rebuilds the current level from its layout.
    Restart,
}

/// Reasons a player move is refused before any state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The player is no longer alive.
    PlayerDead,
    /// The destination lies outside the board.
    OutOfBounds,
    /// The destination holds a solid entity.
    Solid,
    /// The destination holds a pushable line that cannot move.
    PushBlocked,
}

/// How an entity came to die.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Caught by an entity that kills the player.
    Caught {
        /// Entity responsible for the kill.
        by: EntityId,
    },
    /// Lost a collision between two hopping creatures.
    Squashed {
        /// Surviving hopper.
        by: EntityId,
    },
    /// Ran out of steps.
    StepsExhausted,
}

/// Events broadcast while a turn is played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The player's move was refused; nothing changed.
    MoveRejected {
        /// Intent that was refused.
        intent: Intent,
        /// Reason for refusal.
        reason: RejectReason,
    },
    /// An entity followed its movement strategy.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Tile occupied before the move.
        from: Point,
        /// Tile occupied after the move.
        to: Point,
    },
    /// An entity was shoved along a push chain.
    EntityPushed {
        /// Entity that was pushed.
        entity: EntityId,
        /// Tile occupied before the push.
        from: Point,
        /// Tile occupied after the push.
        to: Point,
    },
    /// An entity was sent back to the tile it came from.
    EntityBlocked {
        /// Entity that was reverted.
        entity: EntityId,
        /// Tile the entity tried to occupy.
        from: Point,
        /// Tile the entity was sent back to.
        to: Point,
    },
    /// An entity died; it stays on the board until the turn is culled.
    EntityKilled {
        /// Entity that died.
        entity: EntityId,
        /// How the entity died.
        cause: DeathCause,
    },
    /// A dead entity was removed from the board.
    EntityRemoved {
        /// Entity that was removed.
        entity: EntityId,
    },
    /// Two entities share a tile but no collision rule covers them.
    CollisionUnresolved {
        /// Shared tile.
        point: Point,
        /// First entity of the pair.
        first: EntityId,
        /// Second entity of the pair.
        second: EntityId,
    },
    /// The collision resolver ran out of iterations with conflicts remaining.
    CollisionsUnsettled {
        /// Iterations spent before giving up.
        iterations: usize,
    },
    /// A turn finished.
    TurnCompleted {
        /// Index of the completed turn, starting at 1.
        turn: u64,
        /// Player steps remaining after the turn.
        steps_left: u32,
    },
    /// The board was rebuilt from a layout.
    WorldReset,
}

/// Programming or authoring faults that abandon the turn they occur in.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimulationFault {
    /// A movement strategy was asked to leave a state it has no rule for.
    #[error("{strategy} strategy has no transition from state {state}")]
    InvalidState {
        /// Strategy that was driven.
        strategy: StrategyKind,
        /// Offending state.
        state: u8,
    },
    /// A movement strategy that is not supported yet was driven.
    #[error("{strategy} strategy is not supported")]
    UnimplementedStrategy {
        /// Strategy that was driven.
        strategy: StrategyKind,
    },
    /// A strategy tried to move its entity off the board.
    #[error("entity {entity} tried to leave the board at {to}")]
    LeftBoard {
        /// Entity that was moving.
        entity: EntityId,
        /// Tile outside the board it would have reached.
        to: Point,
    },
    /// Both members of a push pair are pushers and pushable.
    #[error("entities {first} and {second} are both pushers and pushable")]
    AmbiguousPush {
        /// First entity of the pair.
        first: EntityId,
        /// Second entity of the pair.
        second: EntityId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_displacement_keeps_facing() {
        for facing in [Facing::Up, Facing::Right, Facing::Down, Facing::Left] {
            assert_eq!(facing.after_move(Point::IDLE), facing);
        }
    }

    #[test]
    fn cardinal_displacement_sets_matching_facing() {
        let cases = [
            (Point::UP, Facing::Up),
            (Point::RIGHT, Facing::Right),
            (Point::DOWN, Facing::Down),
            (Point::LEFT, Facing::Left),
        ];
        for prior in [Facing::Up, Facing::Right, Facing::Down, Facing::Left] {
            for (displacement, expected) in cases {
                assert_eq!(prior.after_move(displacement), expected);
            }
        }
    }

    #[test]
    fn diagonal_displacements_resolve_without_ties() {
        assert_eq!(Facing::Left.after_move(Point::UP + Point::RIGHT), Facing::Right);
        assert_eq!(Facing::Up.after_move(Point::RIGHT + Point::DOWN), Facing::Down);
        assert_eq!(Facing::Up.after_move(Point::DOWN + Point::LEFT), Facing::Left);
        assert_eq!(Facing::Down.after_move(Point::LEFT + Point::UP), Facing::Up);
    }

    #[test]
    fn dimensions_reject_negative_and_overflowing_points() {
        let dimensions = Dimensions::new(3, 2);
        assert!(dimensions.contains(Point::new(0, 0)));
        assert!(dimensions.contains(Point::new(2, 1)));
        assert!(!dimensions.contains(Point::new(3, 1)));
        assert!(!dimensions.contains(Point::new(2, 2)));
        assert!(!dimensions.contains(Point::new(-1, 0)));
        assert!(!dimensions.contains(Point::new(0, -1)));
    }

    #[test]
    fn points_order_by_column_then_row() {
        let mut points = vec![Point::new(1, 0), Point::new(0, 2), Point::new(0, 1)];
        points.sort();
        assert_eq!(points, vec![Point::new(0, 1), Point::new(0, 2), Point::new(1, 0)]);
    }

    #[test]
    fn intents_map_to_unit_displacements() {
        assert_eq!(Intent::Up.displacement(), Point::new(0, -1));
        assert_eq!(Intent::Right.displacement(), Point::new(1, 0));
        assert!(Intent::None.displacement().is_zero());
    }
}
