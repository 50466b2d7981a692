use std::fmt;

use hopscotch_core::{DeathCause, EntityId, Event, SimulationFault, Tags};
use hopscotch_world::World;

use crate::push::{walk_chain, Chain};

/// Urgency of a collision rule for a pair; higher values win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u8);

impl Priority {
    /// A player caught by a creature that kills it.
    pub const CATCH: Priority = Priority(1);
    /// Two hoppers landing on one tile.
    pub const SQUASH: Priority = Priority(5);
    /// A pusher moving into something pushable.
    pub const PUSH: Priority = Priority(10);
    /// Something running into a solid, or two inert pushables meeting.
    pub const BLOCK: Priority = Priority(1);

    /// Creates a priority from its numeric value.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Numeric value of the priority.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Whether applying a rule changed the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleOutcome {
    /// At least one entity moved, died or changed strategy state.
    Changed,
    /// The board is exactly as it was.
    Unchanged,
}

/// Behaviour applied to a pair of live entities sharing a tile.
///
/// Rules see only tag sets when reporting their priority, so applicability
/// never depends on where the pair sits or how it got there.
pub trait CollisionRule: fmt::Debug {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Priority of the rule for an unordered pair, or `None` when the rule
    /// does not cover the pair.
    fn priority(&self, first: Tags, second: Tags) -> Option<Priority>;

    /// Applies the rule to the pair.
    fn resolve(
        &self,
        world: &mut World,
        first: EntityId,
        second: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<RuleOutcome, SimulationFault>;
}

/// Kills the player when caught, or one of two hoppers sharing a tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct KillRule;

impl KillRule {
    fn catch(first: Tags, second: Tags) -> bool {
        first.contains(Tags::PLAYER) && second.contains(Tags::KILLS_PLAYER)
    }

    fn squash(first: Tags, second: Tags) -> bool {
        first.contains(Tags::HOPS) && second.contains(Tags::HOPS)
    }
}

impl CollisionRule for KillRule {
    fn name(&self) -> &'static str {
        "kill"
    }

    fn priority(&self, first: Tags, second: Tags) -> Option<Priority> {
        if Self::catch(first, second) || Self::catch(second, first) {
            Some(Priority::CATCH)
        } else if Self::squash(first, second) {
            Some(Priority::SQUASH)
        } else {
            None
        }
    }

    fn resolve(
        &self,
        world: &mut World,
        first: EntityId,
        second: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<RuleOutcome, SimulationFault> {
        let (first_tags, second_tags) = (tags_of(world, first), tags_of(world, second));

        let killed = if Self::catch(first_tags, second_tags) {
            world.kill(first, DeathCause::Caught { by: second }, out_events)
        } else if Self::catch(second_tags, first_tags) {
            world.kill(second, DeathCause::Caught { by: first }, out_events)
        } else if Self::squash(first_tags, second_tags) {
            let (victim, survivor) = world.pick((first, second), (second, first));
            world.kill(victim, DeathCause::Squashed { by: survivor }, out_events)
        } else {
            false
        };

        Ok(outcome(killed))
    }
}

/// Shoves a line of pushables ahead of a pusher, or stops the pusher when
/// the line cannot move.
#[derive(Clone, Copy, Debug, Default)]
pub struct PushRule;

impl PushRule {
    fn pushes(pusher: Tags, pushable: Tags) -> bool {
        pusher.contains(Tags::PUSHER) && pushable.contains(Tags::PUSHABLE)
    }
}

impl CollisionRule for PushRule {
    fn name(&self) -> &'static str {
        "push"
    }

    fn priority(&self, first: Tags, second: Tags) -> Option<Priority> {
        (Self::pushes(first, second) || Self::pushes(second, first)).then_some(Priority::PUSH)
    }

    fn resolve(
        &self,
        world: &mut World,
        first: EntityId,
        second: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<RuleOutcome, SimulationFault> {
        let (first_tags, second_tags) = (tags_of(world, first), tags_of(world, second));
        let (pusher, pushable) = match (
            Self::pushes(first_tags, second_tags),
            Self::pushes(second_tags, first_tags),
        ) {
            (true, true) => return Err(SimulationFault::AmbiguousPush { first, second }),
            (true, false) => (first, second),
            (false, true) => (second, first),
            (false, false) => return Ok(RuleOutcome::Unchanged),
        };

        let Some((origin, direction)) = world
            .entity(pushable)
            .zip(world.entity(pusher))
            .map(|(target, source)| (target.position(), source.displacement()))
        else {
            return Ok(RuleOutcome::Unchanged);
        };

        if direction.is_zero() {
            tracing::debug!(%pusher, %pushable, "pushable ran into a stationary pusher");
            return Ok(outcome(block(world, pushable, out_events)));
        }

        match walk_chain(world, origin, direction) {
            Chain::Clear(members) => {
                for id in members {
                    if let Some(entity) = world.entity_mut(id) {
                        let from = entity.position();
                        entity.shove(direction);
                        out_events.push(Event::EntityPushed {
                            entity: id,
                            from,
                            to: entity.position(),
                        });
                    }
                }
                Ok(RuleOutcome::Changed)
            }
            Chain::Blocked => {
                tracing::debug!(%pusher, %origin, "push chain blocked");
                Ok(outcome(block(world, pusher, out_events)))
            }
        }
    }
}

/// Sends entities back from solids, and stops inert pushables that meet.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockRule;

impl BlockRule {
    fn inert(tags: Tags) -> bool {
        tags.contains(Tags::PUSHABLE) && !tags.contains(Tags::PUSHER)
    }
}

impl CollisionRule for BlockRule {
    fn name(&self) -> &'static str {
        "block"
    }

    fn priority(&self, first: Tags, second: Tags) -> Option<Priority> {
        let one_solid = first.contains(Tags::SOLID) != second.contains(Tags::SOLID);
        (one_solid || (Self::inert(first) && Self::inert(second))).then_some(Priority::BLOCK)
    }

    fn resolve(
        &self,
        world: &mut World,
        first: EntityId,
        second: EntityId,
        out_events: &mut Vec<Event>,
    ) -> Result<RuleOutcome, SimulationFault> {
        let (first_tags, second_tags) = (tags_of(world, first), tags_of(world, second));
        let blocked = match (
            first_tags.contains(Tags::SOLID),
            second_tags.contains(Tags::SOLID),
        ) {
            (true, false) => vec![second],
            (false, true) => vec![first],
            _ if Self::inert(first_tags) && Self::inert(second_tags) => vec![first, second],
            _ => Vec::new(),
        };

        let mut changed = false;
        for id in blocked {
            changed |= block(world, id, out_events);
        }
        Ok(outcome(changed))
    }
}

/// Ordered set of collision rules.
///
/// Registration order breaks priority ties: the rule registered first wins.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn CollisionRule>>,
}

impl RuleRegistry {
    /// Creates a registry with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding the kill, push and block rules, in that order.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(KillRule));
        registry.register(Box::new(PushRule));
        registry.register(Box::new(BlockRule));
        registry
    }

    /// Appends a rule after every rule registered so far.
    pub fn register(&mut self, rule: Box<dyn CollisionRule>) {
        self.rules.push(rule);
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Reports whether no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule registered at `index`.
    #[must_use]
    pub fn rule(&self, index: usize) -> Option<&dyn CollisionRule> {
        self.rules.get(index).map(Box::as_ref)
    }

    /// Highest-priority rule covering the pair, with its registration index.
    #[must_use]
    pub fn best(&self, first: Tags, second: Tags) -> Option<(usize, Priority)> {
        let mut best: Option<(usize, Priority)> = None;
        for (index, rule) in self.rules.iter().enumerate() {
            let Some(priority) = rule.priority(first, second) else {
                continue;
            };
            if best.map_or(true, |(_, current)| priority > current) {
                best = Some((index, priority));
            }
        }
        best
    }
}

fn tags_of(world: &World, id: EntityId) -> Tags {
    world.entity(id).map_or_else(Tags::empty, |entity| entity.tags())
}

fn outcome(changed: bool) -> RuleOutcome {
    if changed {
        RuleOutcome::Changed
    } else {
        RuleOutcome::Unchanged
    }
}

/// Reverts an entity to its previous tile and parks it if it rolls.
///
/// Returns `false` when the entity had not moved.
fn block(world: &mut World, id: EntityId, out_events: &mut Vec<Event>) -> bool {
    let Some(entity) = world.entity_mut(id) else {
        return false;
    };
    let from = entity.position();
    entity.park();
    if !entity.revert() {
        return false;
    }
    tracing::debug!(entity = %id, %from, to = %entity.position(), "entity blocked");
    out_events.push(Event::EntityBlocked {
        entity: id,
        from,
        to: entity.position(),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: Tags = Tags::HOPS.union(Tags::PUSHER).union(Tags::PLAYER);
    const FROG: Tags = Tags::HOPS.union(Tags::KILLS_PLAYER).union(Tags::PUSHER);
    const BARREL: Tags = Tags::PUSHABLE.union(Tags::BARREL);
    const WALL: Tags = Tags::SOLID.union(Tags::NO_ANIMATION);

    #[test]
    fn catching_the_player_uses_the_kill_rule() {
        let registry = RuleRegistry::standard();

        assert_eq!(registry.best(PLAYER, FROG), Some((0, Priority::CATCH)));
        assert_eq!(registry.best(FROG, PLAYER), Some((0, Priority::CATCH)));
    }

    #[test]
    fn two_frogs_squash() {
        assert_eq!(
            RuleRegistry::standard().best(FROG, FROG),
            Some((0, Priority::SQUASH))
        );
    }

    #[test]
    fn push_outranks_everything() {
        let registry = RuleRegistry::standard();

        assert_eq!(registry.best(PLAYER, BARREL), Some((1, Priority::PUSH)));
        assert_eq!(registry.best(BARREL, FROG), Some((1, Priority::PUSH)));
    }

    #[test]
    fn solids_and_inert_pushables_block() {
        let registry = RuleRegistry::standard();

        assert_eq!(registry.best(FROG, WALL), Some((2, Priority::BLOCK)));
        assert_eq!(registry.best(BARREL, Tags::PUSHABLE), Some((2, Priority::BLOCK)));
        assert_eq!(registry.best(WALL, WALL), None);
    }

    #[test]
    fn ties_go_to_the_earliest_registration() {
        #[derive(Debug)]
        struct Shadow;

        impl CollisionRule for Shadow {
            fn name(&self) -> &'static str {
                "shadow"
            }

            fn priority(&self, _: Tags, _: Tags) -> Option<Priority> {
                Some(Priority::CATCH)
            }

            fn resolve(
                &self,
                _: &mut World,
                _: EntityId,
                _: EntityId,
                _: &mut Vec<Event>,
            ) -> Result<RuleOutcome, SimulationFault> {
                Ok(RuleOutcome::Unchanged)
            }
        }

        let mut registry = RuleRegistry::standard();
        registry.register(Box::new(Shadow));

        assert_eq!(registry.best(PLAYER, FROG), Some((0, Priority::CATCH)));
        assert_eq!(registry.best(WALL, WALL), Some((3, Priority::CATCH)));
        assert_eq!(registry.rule(3).map(|rule| rule.name()), Some("shadow"));
    }
}
