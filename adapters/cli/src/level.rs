use std::{fs, path::Path};

use anyhow::{Context, Result};
use rescue_grid_core::LevelConfig;

/// Level used when no file is supplied on the command line.
const DEMO_LEVEL: &str = include_str!("../levels/ember_ridge.toml");

/// Loads the level at `path`, or the bundled demo level, applying a seed override.
pub(crate) fn load(path: Option<&Path>, seed: Option<u64>) -> Result<LevelConfig> {
    let mut level = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read level file at {}", path.display()))?;
            parse(&contents)
                .with_context(|| format!("failed to load level from {}", path.display()))?
        }
        None => parse(DEMO_LEVEL).context("bundled demo level is malformed")?,
    };

    if let Some(seed) = seed {
        level.seed = seed;
    }
    Ok(level)
}

fn parse(contents: &str) -> Result<LevelConfig> {
    toml::from_str(contents).context("failed to parse level toml contents")
}

#[cfg(test)]
mod tests {
    use rescue_grid_core::{CellCoord, ChainReaction, ObstacleId, ObstacleKind, Role};
    use rescue_grid_world::World;

    use super::*;

    #[test]
    fn demo_level_loads_into_a_world() {
        let level = load(None, None).expect("demo level parses");
        assert_eq!(level.survivors.len(), 4);
        assert_eq!(level.survivors[0].role, Role::Engineer);
        assert_eq!(level.obstacles[1].blocked_by, vec![ObstacleId::new(0)]);
        assert_eq!(
            level.obstacles[4].chain_reaction,
            Some(ChainReaction::Explosion { radius: 1 })
        );
        assert_eq!(level.obstacles[7].hidden, vec![ObstacleKind::Ice]);
        assert!(World::from_level(level).is_ok());
    }

    #[test]
    fn seed_override_replaces_the_level_seed() {
        let level = load(None, Some(99)).expect("demo level parses");
        assert_eq!(level.seed, 99);
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let level = parse(
            r#"
            width = 2
            height = 1
            rescue_point = { column = 1, row = 0 }

            [[survivors]]
            role = "child"
            position = { column = 0, row = 0 }
            "#,
        )
        .expect("minimal level parses");
        assert_eq!(level.rescue_point, CellCoord::new(1, 0));
        assert_eq!(level.countdown_seconds, 180);
        assert!(level.weather_enabled);
        assert!(level.obstacles.is_empty());
        assert_eq!(level.planning_seconds, None);
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = load(Some(Path::new("/nonexistent/level.toml")), None)
            .expect_err("missing file fails");
        assert!(format!("{error:#}").contains("/nonexistent/level.toml"));
    }
}
