#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Plain-text level loader for Hopscotch.
//!
//! A level is drawn one character per tile, one row per line. Border
//! characters `|` and `-` are ignored, as are rows made only of `-`, so a
//! level may be framed for readability:
//!
//! ```text
//! ---------
//! |P.B..W|
//! |..F...|
//! ---------
//! ```
//!
//! `.` and spaces are empty tiles. Every other character must be one of the
//! symbols listed in [`seed_for`].

use std::{fs, io, path::Path};

use hopscotch_core::{
    Dimensions, EntitySeed, LevelLayout, Point, StrategyKind, Tags,
};

/// Largest number of rows or columns a level may have.
pub const MAX_SIDE: u32 = 256;

const CREATURE: Tags = Tags::HOPS.union(Tags::KILLS_PLAYER).union(Tags::PUSHER);
const SCENERY: Tags = Tags::SOLID.union(Tags::NO_ANIMATION);

/// Errors raised while loading a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// The level file could not be read.
    #[error("failed to read level {path}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The level has no tiles.
    #[error("level is empty")]
    Empty,
    /// The level has no player.
    #[error("level has no player")]
    MissingPlayer,
    /// The level has more than one player.
    #[error("level has a second player at row {row}, column {column}")]
    MultiplePlayers {
        /// Row of the second player, starting at 1.
        row: usize,
        /// Column of the second player, starting at 1.
        column: usize,
    },
    /// A tile uses a symbol the loader does not know.
    #[error("unknown symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Row of the tile, starting at 1.
        row: usize,
        /// Column of the tile, starting at 1.
        column: usize,
    },
    /// The level exceeds [`MAX_SIDE`] in either direction.
    #[error("level is {width}x{height} tiles, the limit is {MAX_SIDE} per side")]
    TooLarge {
        /// Columns in the level.
        width: usize,
        /// Rows in the level.
        height: usize,
    },
}

/// Entity seed drawn by `symbol` at `position`.
///
/// | Symbol | Entity |
/// |--------|--------|
/// | `P` | player |
/// | `F` | frog oscillating horizontally |
/// | `G` | frog oscillating vertically |
/// | `S` | frog walking a square |
/// | `T` | frog walking a diamond |
/// | `B` | barrel |
/// | `W` | rock wall |
/// | `O` | stone |
/// | `L` | sliding stone |
#[must_use]
pub fn seed_for(symbol: char, position: Point) -> Option<EntitySeed> {
    let seed = match symbol {
        'P' => EntitySeed::new(
            "Player",
            position,
            Tags::HOPS | Tags::PUSHER | Tags::PLAYER,
            StrategyKind::Player,
        ),
        'F' => EntitySeed::new("FrogR", position, CREATURE, StrategyKind::Oscillator),
        'G' => EntitySeed::new("FrogR", position, CREATURE, StrategyKind::Oscillator)
            .with_state(3),
        'S' => EntitySeed::new("FrogY", position, CREATURE, StrategyKind::Spiral),
        'T' => EntitySeed::new("FrogP", position, CREATURE, StrategyKind::Diamond),
        'B' => EntitySeed::new(
            "Barrel",
            position,
            Tags::PUSHABLE | Tags::BARREL,
            StrategyKind::Roller,
        ),
        'W' => EntitySeed::new("RockWall", position, SCENERY, StrategyKind::Idle),
        'O' => EntitySeed::new("Stone", position, SCENERY, StrategyKind::Idle),
        'L' => EntitySeed::new(
            "SlidingStone",
            position,
            Tags::PUSHABLE | Tags::NO_ANIMATION,
            StrategyKind::Idle,
        ),
        _ => return None,
    };
    Some(seed)
}

/// Parses a level drawn in plain text.
///
/// Each row is trimmed of surrounding whitespace, so indentation never shifts
/// a board. Blank lines are skipped. The board is as wide as its widest row.
pub fn parse(text: &str) -> Result<LevelLayout, LevelError> {
    let mut entities = Vec::new();
    let mut player_seen = false;
    let mut width = 0usize;
    let mut height = 0usize;

    let rows = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.chars().all(|c| c == '-'));

    for (y, line) in rows.enumerate() {
        height = y + 1;
        let tiles = line.chars().filter(|c| !matches!(c, '|' | '-'));
        let mut x = 0usize;
        for symbol in tiles {
            x += 1;
            if matches!(symbol, '.' | ' ') {
                continue;
            }
            let position = Point::new(coordinate(x - 1)?, coordinate(y)?);
            let Some(seed) = seed_for(symbol, position) else {
                return Err(LevelError::UnknownSymbol {
                    symbol,
                    row: y + 1,
                    column: x,
                });
            };
            if seed.strategy == StrategyKind::Player {
                if player_seen {
                    return Err(LevelError::MultiplePlayers {
                        row: y + 1,
                        column: x,
                    });
                }
                player_seen = true;
            }
            entities.push(seed);
        }
        width = width.max(x);
    }

    if width == 0 || height == 0 {
        return Err(LevelError::Empty);
    }
    let too_large = || LevelError::TooLarge { width, height };
    let columns = u32::try_from(width).map_err(|_| too_large())?;
    let rows = u32::try_from(height).map_err(|_| too_large())?;
    if columns > MAX_SIDE || rows > MAX_SIDE {
        return Err(too_large());
    }
    if !player_seen {
        return Err(LevelError::MissingPlayer);
    }

    tracing::debug!(columns, rows, entities = entities.len(), "level parsed");
    Ok(LevelLayout::new(Dimensions::new(columns, rows), entities))
}

/// Reads and parses a level file.
pub fn load(path: &Path) -> Result<LevelLayout, LevelError> {
    let text = fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text)
}

fn coordinate(index: usize) -> Result<i32, LevelError> {
    i32::try_from(index).map_err(|_| LevelError::TooLarge {
        width: index,
        height: index,
    })
}
