use std::path::PathBuf;

use hopscotch_core::{Command, Intent};
use hopscotch_system_turn::{Config, Game};

const TURNS: usize = 24;

fn bundled_levels() -> Vec<PathBuf> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../levels");
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("levels directory")
        .map(|entry| entry.expect("directory entry").path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("txt"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn bundled_creatures_stay_on_the_board() {
    let levels = bundled_levels();
    assert!(levels.len() >= 3);

    for path in levels {
        let layout = hopscotch_level::load(&path)
            .unwrap_or_else(|error| panic!("{}: {error}", path.display()));
        let dimensions = layout.dimensions();
        let mut game = Game::new(layout, Config::default());
        let mut events = Vec::new();

        for turn in 0..TURNS {
            game.apply(Command::Move { intent: Intent::None }, &mut events)
                .unwrap_or_else(|fault| panic!("{} turn {turn}: {fault}", path.display()));
            for snapshot in game.entities() {
                assert!(
                    dimensions.contains(snapshot.position),
                    "{}: {} left the board at {}",
                    path.display(),
                    snapshot.name,
                    snapshot.position
                );
            }
        }

        assert!(game.player_alive(), "{}", path.display());
        assert_eq!(game.turn(), TURNS as u64, "{}", path.display());
    }
}
