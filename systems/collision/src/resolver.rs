use std::collections::BTreeMap;

use hopscotch_core::{EntityId, Event, Point, SimulationFault};
use hopscotch_world::World;

use crate::rules::{Priority, RuleOutcome, RuleRegistry};

/// Iteration budget of the collision resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Passes allowed before the turn is declared unsettled.
    pub settle_iterations: usize,
    /// Extra passes run after the budget purely to log what keeps changing.
    pub diagnostic_iterations: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            settle_iterations: 10,
            diagnostic_iterations: 3,
        }
    }
}

/// Summary of a single resolution run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Passes run, diagnostic passes included.
    pub iterations: usize,
    /// Whether the board reached a fixed point.
    pub settled: bool,
}

/// Settles the overlaps left behind by a movement pass.
#[derive(Debug)]
pub struct Resolver {
    registry: RuleRegistry,
    config: ResolverConfig,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(RuleRegistry::standard(), ResolverConfig::default())
    }
}

#[derive(Clone, Copy, Debug)]
struct Choice {
    rule: usize,
    priority: Priority,
    first: EntityId,
    second: EntityId,
}

impl Resolver {
    /// Creates a resolver over the provided rules.
    #[must_use]
    pub fn new(registry: RuleRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    /// Rules consulted by the resolver.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Iteration budget of the resolver.
    #[must_use]
    pub const fn config(&self) -> ResolverConfig {
        self.config
    }

    /// Applies collision rules until the board stops changing.
    ///
    /// Each pass visits every tile shared by two or more live entities in
    /// ascending order and applies the single best rule found there. Tile
    /// occupants are read when the tile is visited, so earlier tiles in the
    /// same pass are already settled. Running out of budget is logged and
    /// reported, never returned as an error.
    pub fn resolve_collisions(
        &self,
        world: &mut World,
        out_events: &mut Vec<Event>,
    ) -> Result<Resolution, SimulationFault> {
        let mut iterations = 0;
        while iterations < self.config.settle_iterations {
            iterations += 1;
            if !self.pass(world, out_events)? {
                tracing::debug!(iterations, "collisions settled");
                return Ok(Resolution {
                    iterations,
                    settled: true,
                });
            }
        }

        if conflict_points(world).is_empty() {
            return Ok(Resolution {
                iterations,
                settled: true,
            });
        }

        tracing::error!(iterations, "collisions did not settle");
        out_events.push(Event::CollisionsUnsettled { iterations });

        for diagnostic in 1..=self.config.diagnostic_iterations {
            iterations += 1;
            let points = conflict_points(world);
            tracing::error!(diagnostic, ?points, "diagnostic collision pass");
            if !self.pass(world, out_events)? {
                break;
            }
        }

        Ok(Resolution {
            iterations,
            settled: false,
        })
    }

    /// Runs one pass over the shared tiles. Returns whether anything changed.
    fn pass(&self, world: &mut World, out_events: &mut Vec<Event>) -> Result<bool, SimulationFault> {
        let mut changed = false;
        for point in conflict_points(world) {
            let occupants = world.entities_at(point);
            if occupants.len() < 2 {
                continue;
            }
            let Some(choice) = self.choose(world, point, &occupants, out_events) else {
                continue;
            };
            let Some(rule) = self.registry.rule(choice.rule) else {
                continue;
            };
            tracing::debug!(
                %point,
                rule = rule.name(),
                priority = choice.priority.get(),
                first = %choice.first,
                second = %choice.second,
                "applying collision rule"
            );
            if rule.resolve(world, choice.first, choice.second, out_events)?
                == RuleOutcome::Changed
            {
                changed = true;
            }
        }
        Ok(changed)
    }

    /// Picks the best rule among every pair at a tile.
    ///
    /// Higher priority wins, then the earlier registered rule, then the
    /// earlier pair. Pairs no rule covers are reported and left alone.
    fn choose(
        &self,
        world: &World,
        point: Point,
        occupants: &[EntityId],
        out_events: &mut Vec<Event>,
    ) -> Option<Choice> {
        let mut best: Option<Choice> = None;
        for (index, &first) in occupants.iter().enumerate() {
            for &second in &occupants[index + 1..] {
                let (Some(a), Some(b)) = (world.entity(first), world.entity(second)) else {
                    continue;
                };
                let Some((rule, priority)) = self.registry.best(a.tags(), b.tags()) else {
                    tracing::warn!(
                        %point,
                        first = %first,
                        second = %second,
                        first_name = a.name(),
                        second_name = b.name(),
                        "no collision rule covers pair"
                    );
                    out_events.push(Event::CollisionUnresolved {
                        point,
                        first,
                        second,
                    });
                    continue;
                };
                let better = best.map_or(true, |current| {
                    priority > current.priority
                        || (priority == current.priority && rule < current.rule)
                });
                if better {
                    best = Some(Choice {
                        rule,
                        priority,
                        first,
                        second,
                    });
                }
            }
        }
        best
    }
}

/// Tiles shared by two or more live entities, in ascending order.
fn conflict_points(world: &World) -> Vec<Point> {
    let mut counts: BTreeMap<Point, usize> = BTreeMap::new();
    for entity in world.entities().iter().filter(|entity| entity.is_alive()) {
        *counts.entry(entity.position()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(point, _)| point)
        .collect()
}
