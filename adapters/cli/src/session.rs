//! Drives a game from parsed inputs and keeps its scene current.

use std::ops::ControlFlow;

use hopscotch_core::{Event, SimulationFault};
use hopscotch_rendering::{Hud, Scene};
use hopscotch_system_turn::Game;

use crate::input::Input;

/// A game plus the bookkeeping the terminal front end reports on.
#[derive(Debug)]
pub(crate) struct Session {
    game: Game,
    rejected: usize,
    unsettled: usize,
    fault: Option<SimulationFault>,
}

impl Session {
    pub(crate) fn new(game: Game) -> Self {
        Self {
            game,
            rejected: 0,
            unsettled: 0,
            fault: None,
        }
    }

    /// Applies one input. Breaks on quit and on a simulation fault.
    pub(crate) fn handle(&mut self, input: Input) -> ControlFlow<()> {
        let Input::Command(command) = input else {
            return ControlFlow::Break(());
        };
        let mut events = Vec::new();
        let outcome = self.game.apply(command, &mut events);
        for event in &events {
            match event {
                Event::MoveRejected { .. } => self.rejected += 1,
                Event::CollisionsUnsettled { .. } => self.unsettled += 1,
                _ => {}
            }
        }
        match outcome {
            Ok(()) => ControlFlow::Continue(()),
            Err(fault) => {
                tracing::error!(%fault, "session stopped");
                self.fault = Some(fault);
                ControlFlow::Break(())
            }
        }
    }

    /// Scene showing the current board.
    pub(crate) fn scene(&self) -> Scene {
        let (steps_left, max_steps) = self.game.steps().unwrap_or_default();
        let hud = Hud {
            turn: self.game.turn(),
            steps_left,
            max_steps: max_steps.max(self.game.config().max_steps),
            player_alive: self.game.player_alive(),
        };
        Scene::new(self.game.dimensions(), &self.game.entities(), hud)
    }

    /// Takes the fault that stopped the session, if any.
    pub(crate) fn take_fault(&mut self) -> Option<SimulationFault> {
        self.fault.take()
    }

    /// One-line summary of the session so far.
    pub(crate) fn summary(&self) -> String {
        let outcome = if self.game.player_alive() {
            "player alive"
        } else {
            "player dead"
        };
        format!(
            "{} turns played, {} moves rejected, {} unsettled turns, {outcome}",
            self.game.turn(),
            self.rejected,
            self.unsettled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hopscotch_core::{Command, Intent};
    use hopscotch_system_turn::Config;

    fn session(text: &str) -> Session {
        let layout = hopscotch_level::parse(text).expect("valid level");
        Session::new(Game::new(layout, Config::default()))
    }

    fn step(intent: Intent) -> Input {
        Input::Command(Command::Move { intent })
    }

    #[test]
    fn quit_breaks_without_touching_the_game() {
        let mut session = session("P.");

        assert!(session.handle(Input::Quit).is_break());
        assert_eq!(session.scene().hud.turn, 0);
    }

    #[test]
    fn rejected_moves_are_counted() {
        let mut session = session("PW");

        assert!(session.handle(step(Intent::Right)).is_continue());
        assert!(session.handle(step(Intent::Down)).is_continue());

        assert_eq!(
            session.summary(),
            "0 turns played, 2 moves rejected, 0 unsettled turns, player alive"
        );
    }

    #[test]
    fn scene_follows_the_player() {
        let mut session = session("P..");

        let _ = session.handle(step(Intent::Right));
        let scene = session.scene();

        assert_eq!(scene.glyph_at(hopscotch_core::Point::new(1, 0)), 'P');
        assert_eq!(scene.hud.steps_left, 49);
        assert_eq!(scene.hud.max_steps, 50);
        assert!(session.take_fault().is_none());
    }
}
