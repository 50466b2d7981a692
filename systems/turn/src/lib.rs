#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn system that plays Hopscotch one player intent at a time.
//!
//! [`Game`] owns the current [`World`] together with the layout it was built
//! from. Every accepted intent runs a whole turn: the player's move is queued,
//! every entity takes its step, collisions are settled and the dead are culled.

use hopscotch_core::{
    Command, Dimensions, EntitySnapshot, Event, Intent, LevelLayout, Point, RejectReason,
    SimulationFault, Tags, DEFAULT_MAX_STEPS,
};
use hopscotch_system_collision::{walk_chain, Resolution, Resolver, ResolverConfig, RuleRegistry};
use hopscotch_world::{query, World, WorldConfig};

/// Settings applied to every world the game builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Step budget granted to the player.
    pub max_steps: u32,
    /// Seed for the world's random number generator.
    pub seed: u64,
    /// Iteration budget of the collision resolver.
    pub resolver: ResolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            seed: world.seed,
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    fn world(&self) -> WorldConfig {
        WorldConfig {
            max_steps: self.max_steps,
            seed: self.seed,
        }
    }
}

/// Plays turns against an owned world.
#[derive(Debug)]
pub struct Game {
    layout: LevelLayout,
    config: Config,
    world: World,
    resolver: Resolver,
    last_resolution: Option<Resolution>,
}

impl Game {
    /// Builds a game over `layout` with the standard collision rules.
    #[must_use]
    pub fn new(layout: LevelLayout, config: Config) -> Self {
        Self::with_rules(layout, config, RuleRegistry::standard())
    }

    /// Builds a game over `layout` with a custom set of collision rules.
    #[must_use]
    pub fn with_rules(layout: LevelLayout, config: Config, rules: RuleRegistry) -> Self {
        let world = World::new(&layout, config.world());
        Self {
            layout,
            config,
            world,
            resolver: Resolver::new(rules, config.resolver),
            last_resolution: None,
        }
    }

    /// Applies a command from the input layer.
    ///
    /// A fault abandons the turn in which it occurs: the world and the event
    /// buffer are left as they were before the turn started.
    pub fn apply(
        &mut self,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SimulationFault> {
        match command {
            Command::Move { intent } => {
                let _ = self.move_player(intent, out_events)?;
            }
            Command::Restart => self.restart(out_events),
        }
        Ok(())
    }

    /// Plays one turn with the provided intent.
    ///
    /// Returns `Ok(false)` and leaves the world untouched when the intent is
    /// refused; the refusal is reported as [`Event::MoveRejected`].
    pub fn move_player(
        &mut self,
        intent: Intent,
        out_events: &mut Vec<Event>,
    ) -> Result<bool, SimulationFault> {
        if let Err(reason) = self.check_move(intent) {
            tracing::debug!(?intent, ?reason, "move rejected");
            out_events.push(Event::MoveRejected { intent, reason });
            return Ok(false);
        }

        let checkpoint = self.world.clone();
        let reported = out_events.len();
        let resolution = match self.play_turn(intent, out_events) {
            Ok(resolution) => resolution,
            Err(fault) => {
                tracing::error!(%fault, turn = checkpoint.turn(), "turn abandoned");
                self.world = checkpoint;
                out_events.truncate(reported);
                return Err(fault);
            }
        };
        self.last_resolution = Some(resolution);

        let steps_left = self.steps().map_or(0, |(left, _)| left);
        let turn = self.world.turn();
        tracing::debug!(
            turn,
            steps_left,
            iterations = resolution.iterations,
            settled = resolution.settled,
            "turn completed"
        );
        out_events.push(Event::TurnCompleted { turn, steps_left });
        Ok(true)
    }

    fn play_turn(
        &mut self,
        intent: Intent,
        out_events: &mut Vec<Event>,
    ) -> Result<Resolution, SimulationFault> {
        if let Some(player) = self
            .world
            .player_id()
            .and_then(|id| self.world.entity_mut(id))
        {
            let _ = player.queue_move(intent.displacement());
        }

        self.world.update_creatures(out_events)?;
        let resolution = self.resolver.resolve_collisions(&mut self.world, out_events)?;
        self.world.cull_entities(out_events);
        Ok(resolution)
    }

    /// Checks whether an intent would be accepted, without changing anything.
    ///
    /// A destination holding pushables is accepted only if the line they form
    /// could be shoved one tile along the intent right now.
    pub fn check_move(&self, intent: Intent) -> Result<(), RejectReason> {
        let player = self
            .world
            .player()
            .filter(|player| player.is_alive())
            .ok_or(RejectReason::PlayerDead)?;
        let direction = intent.displacement();
        let destination = player.position() + direction;

        if !self.world.in_bounds(destination) {
            return Err(RejectReason::OutOfBounds);
        }
        if direction.is_zero() {
            return Ok(());
        }
        if self.world.any_at(destination, Tags::SOLID) {
            return Err(RejectReason::Solid);
        }
        if self.world.any_at(destination, Tags::PUSHABLE)
            && walk_chain(&self.world, destination, direction).is_blocked()
        {
            return Err(RejectReason::PushBlocked);
        }
        Ok(())
    }

    /// Rebuilds the world from the layout it was last built from.
    pub fn restart(&mut self, out_events: &mut Vec<Event>) {
        tracing::info!("restarting level");
        self.rebuild(out_events);
    }

    /// Replaces the world with a fresh one built from `layout`.
    pub fn change_world(&mut self, layout: LevelLayout, out_events: &mut Vec<Event>) {
        let dimensions = layout.dimensions();
        tracing::info!(
            width = dimensions.width(),
            height = dimensions.height(),
            "changing world"
        );
        self.layout = layout;
        self.rebuild(out_events);
    }

    fn rebuild(&mut self, out_events: &mut Vec<Event>) {
        self.world = World::new(&self.layout, self.config.world());
        self.last_resolution = None;
        out_events.push(Event::WorldReset);
    }

    /// The world being played.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Layout the current world was built from.
    #[must_use]
    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    /// Settings applied to every world the game builds.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Outcome of the collision pass of the latest turn.
    #[must_use]
    pub const fn last_resolution(&self) -> Option<Resolution> {
        self.last_resolution
    }

    /// Number of turns played since the world was built.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.world.turn()
    }

    /// Whether the player is still alive.
    #[must_use]
    pub fn player_alive(&self) -> bool {
        query::player_alive(&self.world)
    }

    /// Tile occupied by the player, while it remains on the board.
    #[must_use]
    pub fn player_position(&self) -> Option<Point> {
        query::player_position(&self.world)
    }

    /// Dimensions of the board.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        query::dimensions(&self.world)
    }

    /// Snapshots of every entity on the board.
    #[must_use]
    pub fn entities(&self) -> Vec<EntitySnapshot> {
        query::entity_view(&self.world)
    }

    /// Player steps remaining and the budget granted at spawn.
    #[must_use]
    pub fn steps(&self) -> Option<(u32, u32)> {
        query::step_budget(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_core::{EntitySeed, StrategyKind};

    fn game(entities: Vec<EntitySeed>) -> Game {
        Game::new(
            LevelLayout::new(Dimensions::new(4, 3), entities),
            Config::default(),
        )
    }

    fn player(x: i32, y: i32) -> EntitySeed {
        EntitySeed::new(
            "Player",
            Point::new(x, y),
            Tags::HOPS | Tags::PUSHER | Tags::PLAYER,
            StrategyKind::Player,
        )
    }

    #[test]
    fn waiting_is_always_allowed_while_alive() {
        let game = game(vec![player(0, 0)]);

        assert_eq!(game.check_move(Intent::None), Ok(()));
    }

    #[test]
    fn board_edge_rejects() {
        let game = game(vec![player(0, 0)]);

        assert_eq!(game.check_move(Intent::Up), Err(RejectReason::OutOfBounds));
        assert_eq!(game.check_move(Intent::Left), Err(RejectReason::OutOfBounds));
        assert_eq!(game.check_move(Intent::Right), Ok(()));
    }

    #[test]
    fn missing_player_counts_as_dead() {
        let game = game(Vec::new());

        assert_eq!(game.check_move(Intent::Down), Err(RejectReason::PlayerDead));
    }

    #[test]
    fn accepted_move_reports_turn_completion() {
        let mut game = game(vec![player(0, 0)]);
        let mut events = Vec::new();

        assert_eq!(game.move_player(Intent::Down, &mut events), Ok(true));

        assert_eq!(game.player_position(), Some(Point::new(0, 1)));
        assert_eq!(
            events.last(),
            Some(&Event::TurnCompleted {
                turn: 1,
                steps_left: DEFAULT_MAX_STEPS - 1,
            })
        );
        assert!(game.last_resolution().is_some_and(|r| r.settled));
    }
}
