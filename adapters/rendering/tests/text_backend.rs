use std::{io::Cursor, ops::ControlFlow};

use hopscotch_core::Dimensions;
use hopscotch_rendering::{Hud, Presentation, RenderingBackend, Scene, TextBackend};

fn empty_scene() -> Scene {
    Scene::new(Dimensions::new(2, 1), &[], Hud::default())
}

#[test]
fn backend_feeds_each_line_until_break() {
    let mut output = Vec::new();
    let mut received = Vec::new();
    let backend = TextBackend::new(Cursor::new("d\r\nwait\nq\nnever\n"), &mut output);

    backend
        .run(Presentation::new("Test", empty_scene()), |input, scene| {
            scene.hud.turn += 1;
            received.push(input.line.clone());
            if input.line == "q" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .expect("in-memory io");

    assert_eq!(received, vec!["d", "wait", "q"]);
    let text = String::from_utf8(output).expect("utf-8 output");
    assert!(text.starts_with("Test\n----\n|..|\n"));
    assert_eq!(text.matches("----\n|..|\n----\n").count(), 4);
    assert!(text.ends_with("turn 3  steps 0/0  dead\n"));
}

#[test]
fn backend_stops_at_end_of_input() {
    let mut output = Vec::new();
    let mut frames = 0;

    TextBackend::new(Cursor::new(""), &mut output)
        .run(Presentation::new("Empty", empty_scene()), |_, _| {
            frames += 1;
            ControlFlow::Continue(())
        })
        .expect("in-memory io");

    assert_eq!(frames, 0);
    assert!(!output.is_empty());
}
