#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision system that settles entities sharing a tile after a movement pass.
//!
//! Rules live in an ordered [`RuleRegistry`]; the [`Resolver`] walks shared
//! tiles, applies the best rule at each and repeats until the board stops
//! changing or its iteration budget runs out.

mod push;
mod resolver;
mod rules;

pub use push::{walk_chain, Chain};
pub use resolver::{Resolution, Resolver, ResolverConfig};
pub use rules::{
    BlockRule, CollisionRule, KillRule, Priority, PushRule, RuleOutcome, RuleRegistry,
};
