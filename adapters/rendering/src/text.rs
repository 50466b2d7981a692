use std::{
    fmt::Write as _,
    io::{BufRead, Write},
    ops::ControlFlow,
};

use anyhow::{Context, Result as AnyResult};
use hopscotch_core::Point;

use crate::{FrameInput, Presentation, RenderingBackend, Scene};

/// Draws a scene as a framed character grid followed by the HUD line.
///
/// The grid uses the plain-text level symbols, so a frame drawn before the
/// first turn parses back into the same board.
#[must_use]
pub fn render_frame(scene: &Scene) -> String {
    let width = scene.dimensions.width();
    let height = scene.dimensions.height();
    let border = "-".repeat(width as usize + 2);

    let mut frame = String::with_capacity((width as usize + 3) * (height as usize + 3));
    frame.push_str(&border);
    frame.push('\n');
    for y in 0..height {
        frame.push('|');
        for x in 0..width {
            let point = Point::new(x as i32, y as i32);
            frame.push(scene.glyph_at(point));
        }
        frame.push_str("|\n");
    }
    frame.push_str(&border);
    frame.push('\n');
    let _ = writeln!(frame, "{}", scene.hud.status_line());
    frame
}

/// Backend that draws frames as text and reads one input line per frame.
#[derive(Debug)]
pub struct TextBackend<R, W> {
    input: R,
    output: W,
}

impl<R, W> TextBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    /// Creates a backend reading from `input` and drawing to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn draw(&mut self, scene: &Scene) -> AnyResult<()> {
        self.output
            .write_all(render_frame(scene).as_bytes())
            .context("failed to draw frame")?;
        self.output.flush().context("failed to flush frame")
    }
}

impl<R, W> RenderingBackend for TextBackend<R, W>
where
    R: BufRead,
    W: Write,
{
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> ControlFlow<()>,
    {
        let Presentation { title, mut scene } = presentation;
        writeln!(self.output, "{title}").context("failed to draw title")?;
        self.draw(&scene)?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read input")?;
            if read == 0 {
                return Ok(());
            }
            let input = FrameInput {
                line: line.trim_end_matches(['\r', '\n']).to_owned(),
            };
            let flow = update_scene(input, &mut scene);
            self.draw(&scene)?;
            if flow.is_break() {
                return Ok(());
            }
        }
    }
}
