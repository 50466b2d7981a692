use hopscotch_core::{
    Dimensions, EntityId, EntitySeed, EntitySnapshot, Facing, Point, SimulationFault, Tags,
};

use crate::strategy::{Strategy, Transition};

/// Anything on the board that is not part of the background.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    position: Point,
    previous: Point,
    facing: Facing,
    tags: Tags,
    strategy: Strategy,
    alive: bool,
}

impl Entity {
    /// Creates an entity from a level seed.
    #[must_use]
    pub fn from_seed(id: EntityId, seed: &EntitySeed, max_steps: u32) -> Self {
        Self {
            id,
            name: seed.name.clone(),
            position: seed.position,
            previous: seed.position,
            facing: seed.facing,
            tags: seed.tags,
            strategy: Strategy::spawn(seed.strategy, seed.state, max_steps),
            alive: true,
        }
    }

    /// Unique identifier of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Species label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tile currently occupied.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Tile occupied before the latest move, push or revert.
    #[must_use]
    pub const fn previous(&self) -> Point {
        self.previous
    }

    /// Displacement covered since the previous position.
    #[must_use]
    pub fn displacement(&self) -> Point {
        self.position - self.previous
    }

    /// Sprite orientation.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Capability markers.
    #[must_use]
    pub const fn tags(&self) -> Tags {
        self.tags
    }

    /// Reports whether the entity carries every marker in `tags`.
    #[must_use]
    pub fn has(&self, tags: Tags) -> bool {
        self.tags.contains(tags)
    }

    /// Movement strategy driving the entity.
    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Current strategy state.
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.strategy.state()
    }

    /// Whether the entity survives the current turn.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Marks the entity dead. It keeps its tile until the world is culled.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Reports whether the entity is a player with no steps left.
    #[must_use]
    pub fn steps_exhausted(&self) -> bool {
        matches!(self.strategy.step_budget(), Some((0, _)))
    }

    /// Queues the player's displacement for the coming turn.
    ///
    /// Returns `false` when the entity does not take queued input.
    pub fn queue_move(&mut self, displacement: Point) -> bool {
        self.strategy.queue(displacement)
    }

    /// Works out the entity's next move without changing anything.
    ///
    /// A move that would land outside `dimensions` is a fault.
    pub fn plan_move(&self, dimensions: Dimensions) -> Result<Transition, SimulationFault> {
        let transition = self.strategy.next(self.position, dimensions)?;
        let to = self.position + transition.displacement;
        if !dimensions.contains(to) {
            return Err(SimulationFault::LeftBoard { entity: self.id, to });
        }
        Ok(transition)
    }

    /// Applies a transition produced by [`Entity::plan_move`].
    pub fn apply_move(&mut self, transition: Transition) {
        self.strategy.commit(transition);
        self.previous = self.position;
        self.position += transition.displacement;
        self.facing = self.facing.after_move(transition.displacement);
    }

    /// Follows the strategy for one turn, ignoring every other entity.
    ///
    /// Returns the displacement taken.
    pub fn make_move(&mut self, dimensions: Dimensions) -> Result<Point, SimulationFault> {
        let transition = self.plan_move(dimensions)?;
        self.apply_move(transition);
        Ok(transition.displacement)
    }

    /// Shoves the entity one step along `direction`.
    ///
    /// A pushed roller starts rolling that way and turns to face it.
    pub fn shove(&mut self, direction: Point) {
        self.previous = self.position;
        self.position += direction;
        if matches!(self.strategy, Strategy::Roller { .. }) {
            self.strategy.roll(direction);
            self.facing = self.facing.after_move(direction);
        }
    }

    /// Sends the entity back to its previous tile.
    ///
    /// Returns `false` when the entity has not moved since then.
    pub fn revert(&mut self) -> bool {
        if self.position == self.previous {
            return false;
        }
        self.position = self.previous;
        true
    }

    /// Parks a roller. Other strategies are untouched.
    pub fn park(&mut self) {
        self.strategy.park();
    }

    /// Captures a read-only snapshot of the entity.
    #[must_use]
    pub fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            previous: self.previous,
            facing: self.facing,
            tags: self.tags,
            strategy: self.strategy.kind(),
            state: self.strategy.state(),
            alive: self.alive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_core::StrategyKind;

    const BOARD: Dimensions = Dimensions::new(8, 8);

    fn spawn(strategy: StrategyKind, state: u8, position: Point) -> Entity {
        let seed = EntitySeed::new("Creature", position, Tags::HOPS, strategy).with_state(state);
        Entity::from_seed(EntityId::new(0), &seed, 5)
    }

    #[test]
    fn make_move_records_previous_position_and_facing() {
        let mut entity = spawn(StrategyKind::Oscillator, 0, Point::new(2, 2));

        let displacement = entity.make_move(BOARD).expect("valid state");

        assert_eq!(displacement, Point::RIGHT);
        assert_eq!(entity.position(), Point::new(3, 2));
        assert_eq!(entity.previous(), Point::new(2, 2));
        assert_eq!(entity.facing(), Facing::Right);
        assert_eq!(entity.state(), 1);
    }

    #[test]
    fn idle_move_keeps_facing() {
        let seed = EntitySeed::new("Wall", Point::new(1, 1), Tags::SOLID, StrategyKind::Idle)
            .with_facing(Facing::Left);
        let mut entity = Entity::from_seed(EntityId::new(3), &seed, 5);

        let _ = entity.make_move(BOARD).expect("idle never faults");

        assert_eq!(entity.facing(), Facing::Left);
        assert!(entity.displacement().is_zero());
    }

    #[test]
    fn fault_leaves_entity_in_place() {
        let mut entity = spawn(StrategyKind::Spiral, 9, Point::new(2, 2));

        assert!(entity.make_move(BOARD).is_err());
        assert_eq!(entity.position(), Point::new(2, 2));
    }

    #[test]
    fn leaving_the_board_is_a_fault() {
        let mut entity = spawn(StrategyKind::Diamond, 1, Point::new(7, 7));

        assert_eq!(
            entity.make_move(BOARD),
            Err(SimulationFault::LeftBoard {
                entity: EntityId::new(0),
                to: Point::new(8, 8),
            })
        );
        assert_eq!(entity.position(), Point::new(7, 7));
        assert_eq!(entity.state(), 1);
    }

    #[test]
    fn shoving_a_roller_starts_it_rolling() {
        let mut barrel = spawn(StrategyKind::Roller, 0, Point::new(4, 4));

        barrel.shove(Point::RIGHT);

        assert_eq!(barrel.position(), Point::new(5, 4));
        assert_eq!(barrel.state(), 4);
        assert_eq!(barrel.facing(), Facing::Right);
    }

    #[test]
    fn shoving_other_strategies_keeps_state_and_facing() {
        let mut stone = spawn(StrategyKind::Idle, 0, Point::new(4, 4));

        stone.shove(Point::DOWN);

        assert_eq!(stone.position(), Point::new(4, 5));
        assert_eq!(stone.facing(), Facing::Up);
    }

    #[test]
    fn revert_only_succeeds_after_moving() {
        let mut entity = spawn(StrategyKind::Oscillator, 2, Point::new(3, 3));
        assert!(!entity.revert());

        let _ = entity.make_move(BOARD).expect("valid state");
        assert!(entity.revert());
        assert_eq!(entity.position(), Point::new(3, 3));
        assert!(entity.displacement().is_zero());
    }

    #[test]
    fn player_exhausts_after_budget() {
        let seed = EntitySeed::new("Player", Point::new(0, 0), Tags::PLAYER, StrategyKind::Player);
        let mut player = Entity::from_seed(EntityId::new(1), &seed, 1);
        assert!(player.queue_move(Point::RIGHT));

        let _ = player.make_move(BOARD).expect("player never faults");

        assert!(player.steps_exhausted());
        assert_eq!(player.position(), Point::new(1, 0));
    }
}
