use hopscotch_core::{EntityId, Point, Tags};
use hopscotch_world::World;

/// Outcome of walking a line of pushable entities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chain {
    /// The line can advance one tile; members are listed front to back
    /// starting at the origin tile.
    Clear(Vec<EntityId>),
    /// Something stops the line from advancing.
    Blocked,
}

impl Chain {
    /// Reports whether the line is stuck.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Chain::Blocked)
    }
}

/// Walks the run of pushable entities starting at `origin` along `direction`.
///
/// The walk stops clear at the first tile holding nothing pushable. It is
/// blocked by a tile beyond the board edge or by a tile holding anything
/// solid or anything that pushes. A zero direction never advances.
#[must_use]
pub fn walk_chain(world: &World, origin: Point, direction: Point) -> Chain {
    if direction.is_zero() {
        return Chain::Blocked;
    }

    let mut members = pushables_at(world, origin);
    let mut tile = origin;
    loop {
        tile += direction;
        if !world.in_bounds(tile) || world.any_at(tile, Tags::SOLID | Tags::PUSHER) {
            return Chain::Blocked;
        }
        let next = pushables_at(world, tile);
        if next.is_empty() {
            return Chain::Clear(members);
        }
        members.extend(next);
    }
}

fn pushables_at(world: &World, point: Point) -> Vec<EntityId> {
    world
        .entities_at(point)
        .into_iter()
        .filter(|&id| {
            world.entity(id).is_some_and(|entity| {
                entity.has(Tags::PUSHABLE) && !entity.has(Tags::PUSHER)
            })
        })
        .collect()
}
