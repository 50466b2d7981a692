#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Hopscotch adapters.
//!
//! A [`Scene`] is a presentation-ready copy of a board built from entity
//! snapshots. Backends implementing [`RenderingBackend`] present scenes and
//! hand player input back to the adapter between frames.

mod text;

use std::ops::ControlFlow;

use anyhow::Result as AnyResult;
use hopscotch_core::{Dimensions, EntityId, EntitySnapshot, Facing, Point, StrategyKind};

pub use text::{render_frame, TextBackend};

/// Glyph drawn for tiles that hold nothing.
pub const EMPTY_GLYPH: char = '.';

/// Input gathered by a backend before the scene is updated.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Raw line of text entered by the player, without its line ending.
    pub line: String,
}

/// Presentation of a single entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpritePresentation {
    /// Entity being drawn.
    pub entity: EntityId,
    /// Species label, used to pick the sprite.
    pub name: String,
    /// Tile occupied by the entity.
    pub position: Point,
    /// Orientation of the sprite.
    pub facing: Facing,
    /// Character drawn by text backends.
    pub glyph: char,
    /// Whether the sprite is drawn above every other sprite on its tile.
    pub on_top: bool,
}

impl SpritePresentation {
    /// Builds the presentation of an entity snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &EntitySnapshot) -> Self {
        Self {
            entity: snapshot.id,
            name: snapshot.name.clone(),
            position: snapshot.position,
            facing: snapshot.facing,
            glyph: glyph_for(snapshot),
            on_top: snapshot.strategy == StrategyKind::Player,
        }
    }
}

/// Heads-up display shown below the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Hud {
    /// Turns played on the current board.
    pub turn: u64,
    /// Player steps remaining.
    pub steps_left: u32,
    /// Step budget granted at spawn.
    pub max_steps: u32,
    /// Whether the player is still alive.
    pub player_alive: bool,
}

impl Hud {
    /// Single-line summary of the display.
    #[must_use]
    pub fn status_line(&self) -> String {
        let status = if self.player_alive { "alive" } else { "dead" };
        format!(
            "turn {}  steps {}/{}  {status}",
            self.turn, self.steps_left, self.max_steps
        )
    }
}

/// Scene description combining the board and its inhabitants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Board dimensions.
    pub dimensions: Dimensions,
    /// Entities drawn on the board, in draw order.
    pub sprites: Vec<SpritePresentation>,
    /// Heads-up display.
    pub hud: Hud,
}

impl Scene {
    /// Creates a scene from entity snapshots.
    ///
    /// Sprites outside the board are dropped. Sprites flagged
    /// [`on_top`](SpritePresentation::on_top) are drawn last.
    #[must_use]
    pub fn new(dimensions: Dimensions, snapshots: &[EntitySnapshot], hud: Hud) -> Self {
        let mut sprites: Vec<SpritePresentation> = snapshots
            .iter()
            .filter(|snapshot| snapshot.alive && dimensions.contains(snapshot.position))
            .map(SpritePresentation::from_snapshot)
            .collect();
        sprites.sort_by_key(|sprite| sprite.on_top);
        Self {
            dimensions,
            sprites,
            hud,
        }
    }

    /// Glyph visible at `point`.
    #[must_use]
    pub fn glyph_at(&self, point: Point) -> char {
        self.sprites
            .iter()
            .rev()
            .find(|sprite| sprite.position == point)
            .map_or(EMPTY_GLYPH, |sprite| sprite.glyph)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title shown above the first frame.
    pub title: String,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Hopscotch scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the input captured since
    /// the previous frame and may mutate the scene before it is presented.
    /// Returning [`ControlFlow::Break`] stops the backend after that frame.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> ControlFlow<()>;
}

/// Character used to draw an entity, matching the plain-text level symbols.
#[must_use]
pub fn glyph_for(snapshot: &EntitySnapshot) -> char {
    match (snapshot.strategy, snapshot.name.as_str()) {
        (StrategyKind::Player, _) => 'P',
        (StrategyKind::Oscillator, _) if snapshot.state >= 2 => 'G',
        (StrategyKind::Oscillator, _) => 'F',
        (StrategyKind::Spiral, _) => 'S',
        (StrategyKind::Diamond, _) => 'T',
        (StrategyKind::Roller, _) => 'B',
        (_, "RockWall") => 'W',
        (_, "Stone") => 'O',
        (_, "SlidingStone") => 'L',
        _ => '?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_core::Tags;

    fn snapshot(id: u32, name: &str, strategy: StrategyKind, position: Point) -> EntitySnapshot {
        EntitySnapshot {
            id: EntityId::new(id),
            name: name.to_owned(),
            position,
            previous: position,
            facing: Facing::Up,
            tags: Tags::empty(),
            strategy,
            state: 0,
            alive: true,
        }
    }

    #[test]
    fn player_is_drawn_above_shared_tiles() {
        let snapshots = vec![
            snapshot(0, "Player", StrategyKind::Player, Point::new(1, 0)),
            snapshot(1, "SlidingStone", StrategyKind::Idle, Point::new(1, 0)),
        ];

        let scene = Scene::new(Dimensions::new(2, 1), &snapshots, Hud::default());

        assert_eq!(scene.glyph_at(Point::new(1, 0)), 'P');
        assert_eq!(scene.glyph_at(Point::new(0, 0)), EMPTY_GLYPH);
    }

    #[test]
    fn off_board_and_dead_sprites_are_dropped() {
        let mut dead = snapshot(1, "FrogR", StrategyKind::Oscillator, Point::new(0, 0));
        dead.alive = false;
        let snapshots = vec![
            snapshot(0, "FrogR", StrategyKind::Oscillator, Point::new(5, 0)),
            dead,
        ];

        let scene = Scene::new(Dimensions::new(2, 1), &snapshots, Hud::default());

        assert!(scene.sprites.is_empty());
    }

    #[test]
    fn glyphs_follow_level_symbols() {
        let mut vertical = snapshot(0, "FrogR", StrategyKind::Oscillator, Point::IDLE);
        vertical.state = 3;

        assert_eq!(glyph_for(&vertical), 'G');
        assert_eq!(
            glyph_for(&snapshot(1, "Stone", StrategyKind::Idle, Point::IDLE)),
            'O'
        );
        assert_eq!(
            glyph_for(&snapshot(2, "Flower", StrategyKind::Idle, Point::IDLE)),
            '?'
        );
    }

    #[test]
    fn status_line_reports_budget() {
        let hud = Hud {
            turn: 3,
            steps_left: 47,
            max_steps: 50,
            player_alive: true,
        };

        assert_eq!(hud.status_line(), "turn 3  steps 47/50  alive");
    }
}
