//! Keyboard-style input mapping shared by interactive play and scripted replays.

use anyhow::{bail, Result};
use hopscotch_core::{Command, Intent};

/// A single player request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Forward a command to the game.
    Command(Command),
    /// Stop playing.
    Quit,
}

/// Maps one token to an input. Matching ignores case and surrounding spaces.
pub(crate) fn parse_token(token: &str) -> Option<Input> {
    let command = |intent| Some(Input::Command(Command::Move { intent }));
    match token.trim().to_ascii_lowercase().as_str() {
        "w" | "up" => command(Intent::Up),
        "s" | "down" => command(Intent::Down),
        "a" | "left" => command(Intent::Left),
        "d" | "right" => command(Intent::Right),
        "." | "wait" => command(Intent::None),
        "r" | "restart" => Some(Input::Command(Command::Restart)),
        "q" | "quit" => Some(Input::Quit),
        _ => None,
    }
}

/// Parses a move script.
///
/// Tokens are separated by whitespace or commas. A token made only of
/// single-key shortcuts, such as `ddsw.`, expands to one input per key.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    let tokens = script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty());

    for token in tokens {
        if let Some(input) = parse_token(token) {
            inputs.push(input);
            continue;
        }
        for key in token.chars() {
            let Some(input) = parse_token(key.encode_utf8(&mut [0; 4])) else {
                bail!("unknown move `{key}` in token `{token}`");
            };
            inputs.push(input);
        }
    }
    Ok(inputs)
}
