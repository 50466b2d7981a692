//! Optional `hopscotch.toml` settings.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use hopscotch_core::DEFAULT_MAX_STEPS;
use hopscotch_system_collision::ResolverConfig;
use hopscotch_system_turn::Config;
use serde::Deserialize;

/// Settings read from the configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) max_steps: u32,
    pub(crate) seed: u64,
    pub(crate) log_filter: String,
    pub(crate) resolver: ResolverSection,
}

/// `[resolver]` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ResolverSection {
    pub(crate) settle_iterations: usize,
    pub(crate) diagnostic_iterations: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        let game = Config::default();
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            seed: game.seed,
            log_filter: "info".to_owned(),
            resolver: ResolverSection::default(),
        }
    }
}

impl Default for ResolverSection {
    fn default() -> Self {
        let resolver = ResolverConfig::default();
        Self {
            settle_iterations: resolver.settle_iterations,
            diagnostic_iterations: resolver.diagnostic_iterations,
        }
    }
}

impl FileConfig {
    /// Reads the file at `path`, or returns the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    /// Game settings described by the file.
    pub(crate) fn game(&self) -> Config {
        Config {
            max_steps: self.max_steps,
            seed: self.seed,
            resolver: ResolverConfig {
                settle_iterations: self.resolver.settle_iterations,
                diagnostic_iterations: self.resolver.diagnostic_iterations,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = FileConfig::parse("").expect("empty toml is valid");

        assert_eq!(config, FileConfig::default());
        assert_eq!(config.game(), Config::default());
    }

    #[test]
    fn partial_file_overrides_given_keys() {
        let config = FileConfig::parse(
            "max_steps = 12\nseed = 0x10\n[resolver]\nsettle_iterations = 4\n",
        )
        .expect("valid toml");

        let game = config.game();
        assert_eq!(game.max_steps, 12);
        assert_eq!(game.seed, 16);
        assert_eq!(game.resolver.settle_iterations, 4);
        assert_eq!(game.resolver.diagnostic_iterations, 3);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("max_step = 3").is_err());
        assert!(FileConfig::parse("[resolver]\nbudget = 3").is_err());
    }
}
