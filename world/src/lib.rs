#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Hopscotch.
//!
//! The world owns every entity and the board dimensions. It runs the movement
//! pass, in which every entity follows its strategy as if it were alone on
//! the board, and culls the dead once a turn has been resolved. Settling the
//! overlaps left behind by the movement pass is the collision system's job.

mod entity;
mod strategy;

use hopscotch_core::{
    DeathCause, Dimensions, EntityId, Event, LevelLayout, Point, SimulationFault, Tags,
    DEFAULT_MAX_STEPS,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use entity::Entity;
pub use strategy::{rolling_state, Strategy, Transition};

const DEFAULT_SEED: u64 = 0x5eed;

/// Settings applied when a world is populated from a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Step budget granted to the player.
    pub max_steps: u32,
    /// Seed for the world's random number generator.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Represents the authoritative Hopscotch board.
#[derive(Clone, Debug)]
pub struct World {
    dimensions: Dimensions,
    entities: Vec<Entity>,
    player: Option<EntityId>,
    rng: ChaCha8Rng,
    turn: u64,
}

impl World {
    /// Populates a world from a level layout.
    ///
    /// Identifiers are assigned in layout order starting at zero. The first
    /// entity driven by the player strategy becomes the player.
    #[must_use]
    pub fn new(layout: &LevelLayout, config: WorldConfig) -> Self {
        let entities: Vec<Entity> = layout
            .entities()
            .iter()
            .zip(0u32..)
            .map(|(seed, index)| Entity::from_seed(EntityId::new(index), seed, config.max_steps))
            .collect();
        let player = entities
            .iter()
            .find(|entity| entity.strategy().step_budget().is_some())
            .map(Entity::id);

        Self {
            dimensions: layout.dimensions(),
            entities,
            player,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            turn: 0,
        }
    }

    /// Dimensions of the board.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Reports whether the point lies on the board.
    #[must_use]
    pub fn in_bounds(&self, point: Point) -> bool {
        self.dimensions.contains(point)
    }

    /// Number of completed movement passes.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Every entity still on the board, in load order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Identifier of the player, if the layout had one.
    #[must_use]
    pub const fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    /// The player, while it remains on the board.
    #[must_use]
    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entity(id))
    }

    /// Looks up an entity by identifier.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id() == id)
    }

    /// Looks up an entity by identifier for mutation.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id() == id)
    }

    /// Live entities occupying `point`, in load order.
    #[must_use]
    pub fn entities_at(&self, point: Point) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|entity| entity.is_alive() && entity.position() == point)
            .map(Entity::id)
            .collect()
    }

    /// Reports whether any live entity at `point` carries any of `tags`.
    #[must_use]
    pub fn any_at(&self, point: Point, tags: Tags) -> bool {
        self.entities.iter().any(|entity| {
            entity.is_alive() && entity.position() == point && entity.tags().intersects(tags)
        })
    }

    /// Picks one of two options with equal probability.
    pub fn pick<T>(&mut self, first: T, second: T) -> T {
        if self.rng.gen_bool(0.5) {
            first
        } else {
            second
        }
    }

    /// Marks an entity dead and reports the death.
    ///
    /// Returns `false` when the entity is missing or already dead.
    pub fn kill(&mut self, id: EntityId, cause: DeathCause, out_events: &mut Vec<Event>) -> bool {
        let Some(entity) = self.entity_mut(id) else {
            return false;
        };
        if !entity.is_alive() {
            return false;
        }
        entity.kill();
        tracing::debug!(entity = %id, ?cause, "entity killed");
        out_events.push(Event::EntityKilled { entity: id, cause });
        true
    }

    /// Moves every live entity along its strategy.
    ///
    /// Entities never consult each other here, so the order is irrelevant.
    /// A player whose step budget runs out dies at the end of its move.
    /// Every move is planned first; a fault leaves the world untouched.
    pub fn update_creatures(&mut self, out_events: &mut Vec<Event>) -> Result<(), SimulationFault> {
        let dimensions = self.dimensions;
        let plans = self
            .entities
            .iter()
            .filter(|entity| entity.is_alive())
            .map(|entity| entity.plan_move(dimensions))
            .collect::<Result<Vec<_>, _>>()?;

        self.turn = self.turn.saturating_add(1);
        let mut exhausted = Vec::new();

        let live = self.entities.iter_mut().filter(|entity| entity.is_alive());
        for (entity, transition) in live.zip(plans) {
            let from = entity.position();
            entity.apply_move(transition);
            if !transition.displacement.is_zero() {
                tracing::debug!(entity = %entity.id(), %from, to = %entity.position(), "entity moved");
                out_events.push(Event::EntityMoved {
                    entity: entity.id(),
                    from,
                    to: entity.position(),
                });
            }
            if entity.steps_exhausted() {
                exhausted.push(entity.id());
            }
        }

        for id in exhausted {
            let _ = self.kill(id, DeathCause::StepsExhausted, out_events);
        }
        Ok(())
    }

    /// Removes every dead entity from the board.
    pub fn cull_entities(&mut self, out_events: &mut Vec<Event>) {
        self.entities.retain(|entity| {
            if !entity.is_alive() {
                out_events.push(Event::EntityRemoved {
                    entity: entity.id(),
                });
            }
            entity.is_alive()
        });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use hopscotch_core::{Dimensions, EntitySnapshot, Point};

    use super::World;

    /// Captures snapshots of every entity on the board, sorted by identifier.
    #[must_use]
    pub fn entity_view(world: &World) -> Vec<EntitySnapshot> {
        let mut snapshots: Vec<EntitySnapshot> =
            world.entities.iter().map(super::Entity::snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Dimensions of the board.
    #[must_use]
    pub fn dimensions(world: &World) -> Dimensions {
        world.dimensions
    }

    /// Whether the player is still alive and on the board.
    #[must_use]
    pub fn player_alive(world: &World) -> bool {
        world.player().is_some_and(super::Entity::is_alive)
    }

    /// Tile occupied by the player, while it remains on the board.
    #[must_use]
    pub fn player_position(world: &World) -> Option<Point> {
        world.player().map(super::Entity::position)
    }

    /// Player steps remaining and the budget granted at spawn.
    ///
    /// Reports zero steps left once the player has been removed.
    #[must_use]
    pub fn step_budget(world: &World) -> Option<(u32, u32)> {
        match world.player() {
            Some(player) => player.strategy().step_budget(),
            None => world.player.map(|_| (0, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_core::{EntitySeed, StrategyKind};

    fn layout(entities: Vec<EntitySeed>) -> LevelLayout {
        LevelLayout::new(Dimensions::new(6, 4), entities)
    }

    fn frog(position: Point, state: u8) -> EntitySeed {
        EntitySeed::new(
            "FrogR",
            position,
            Tags::HOPS | Tags::KILLS_PLAYER | Tags::PUSHER,
            StrategyKind::Oscillator,
        )
        .with_state(state)
    }

    fn player(position: Point) -> EntitySeed {
        EntitySeed::new(
            "Player",
            position,
            Tags::HOPS | Tags::PUSHER | Tags::PLAYER,
            StrategyKind::Player,
        )
    }

    #[test]
    fn identifiers_follow_layout_order() {
        let world = World::new(
            &layout(vec![frog(Point::new(0, 0), 0), player(Point::new(2, 2))]),
            WorldConfig::default(),
        );

        let ids: Vec<u32> = world.entities().iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(world.player_id(), Some(EntityId::new(1)));
    }

    #[test]
    fn entities_at_skips_the_dead() {
        let mut world = World::new(
            &layout(vec![frog(Point::new(1, 1), 0), frog(Point::new(1, 1), 2)]),
            WorldConfig::default(),
        );
        let mut events = Vec::new();

        assert_eq!(world.entities_at(Point::new(1, 1)).len(), 2);
        assert!(world.kill(EntityId::new(0), DeathCause::StepsExhausted, &mut events));
        assert_eq!(world.entities_at(Point::new(1, 1)), vec![EntityId::new(1)]);
        assert!(!world.kill(EntityId::new(0), DeathCause::StepsExhausted, &mut events));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn update_creatures_moves_every_entity_independently() {
        let mut world = World::new(
            &layout(vec![frog(Point::new(1, 1), 0), frog(Point::new(3, 1), 1)]),
            WorldConfig::default(),
        );
        let mut events = Vec::new();

        world.update_creatures(&mut events).expect("valid states");

        let positions: Vec<Point> = world.entities().iter().map(Entity::position).collect();
        assert_eq!(positions, vec![Point::new(2, 1), Point::new(2, 1)]);
        assert_eq!(events.len(), 2);
        assert_eq!(world.turn(), 1);
    }

    #[test]
    fn exhausted_player_dies_after_moving() {
        let mut world = World::new(
            &layout(vec![player(Point::new(0, 0))]),
            WorldConfig {
                max_steps: 1,
                ..WorldConfig::default()
            },
        );
        let mut events = Vec::new();

        world.update_creatures(&mut events).expect("player never faults");

        assert!(!query::player_alive(&world));
        assert_eq!(query::step_budget(&world), Some((0, 1)));
        assert!(events.contains(&Event::EntityKilled {
            entity: EntityId::new(0),
            cause: DeathCause::StepsExhausted,
        }));
    }

    #[test]
    fn cull_removes_only_the_dead() {
        let mut world = World::new(
            &layout(vec![frog(Point::new(0, 0), 0), player(Point::new(4, 2))]),
            WorldConfig::default(),
        );
        let mut events = Vec::new();
        let _ = world.kill(EntityId::new(1), DeathCause::StepsExhausted, &mut events);

        world.cull_entities(&mut events);

        assert_eq!(world.entities().len(), 1);
        assert!(!query::player_alive(&world));
        assert_eq!(query::player_position(&world), None);
        assert_eq!(query::step_budget(&world), Some((0, 0)));
        assert_eq!(
            events.last(),
            Some(&Event::EntityRemoved {
                entity: EntityId::new(1)
            })
        );
    }

    #[test]
    fn pick_is_deterministic_for_a_seed() {
        let board = layout(Vec::new());
        let mut first = World::new(&board, WorldConfig::default());
        let mut second = World::new(&board, WorldConfig::default());

        let first_picks: Vec<u8> = (0..16).map(|_| first.pick(0, 1)).collect();
        let second_picks: Vec<u8> = (0..16).map(|_| second.pick(0, 1)).collect();

        assert_eq!(first_picks, second_picks);
    }

    #[test]
    fn invalid_state_faults_the_movement_pass() {
        let mut world = World::new(
            &layout(vec![frog(Point::new(1, 1), 7)]),
            WorldConfig::default(),
        );
        let mut events = Vec::new();

        assert_eq!(
            world.update_creatures(&mut events),
            Err(SimulationFault::InvalidState {
                strategy: StrategyKind::Oscillator,
                state: 7,
            })
        );
        assert_eq!(world.turn(), 0);
        assert!(events.is_empty());
    }
}
