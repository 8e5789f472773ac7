mod common;

use common::animated_glb;
use glbvis::animation::{ActionState, ControllerState};
use glbvis::asset::{LoadProgress, channel, decode_slice};
use glbvis::error::LoadError;
use glbvis::model::{LoadOutcome, ModelView};
use glbvis::shell::{CursorStyle, HeadlessShell};

fn progress(loaded: u64, total: u64) -> LoadProgress {
    LoadProgress::from_bytes(loaded, Some(total)).unwrap()
}

#[test]
fn loaded_model_plays_both_clips_once_and_holds() {
    let asset = decode_slice(&animated_glb(), "animated.glb", None).unwrap();
    let (mut reporter, handle) = channel();
    let mut view = ModelView::new(handle, [0.0, 5.0, 0.0]);
    let mut shell = HeadlessShell::new();

    reporter.progress(progress(1, 4));
    reporter.progress(progress(4, 4));
    reporter.succeed(asset);
    view.tick(0.016, &mut shell);

    assert!(matches!(view.outcome(), LoadOutcome::Success));
    assert_eq!(shell.percent_history, vec![25, 100]);
    assert!(shell.loading.is_none());

    let actions = view.controller().actions();
    assert_eq!(actions.len(), 2);
    for action in actions {
        assert_eq!(action.state(), ActionState::Playing);
        assert_eq!(action.time(), 0.0);
        assert_eq!(action.duration(), 6.0);
    }

    // keys end at one second, so the lift is complete here
    view.tick(1.5, &mut shell);
    let spinner = &view.visible_mesh().unwrap().nodes[1];
    assert!((spinner.local.translation.y - 2.0).abs() < 1e-5);
    assert_eq!(view.controller().state(), ControllerState::Playing);

    view.tick(5.0, &mut shell);
    assert_eq!(view.controller().state(), ControllerState::Held);
    assert!(view.controller().actions().iter().all(|a| a.time() == 6.0));

    assert!(view.on_click());
    assert_eq!(view.controller().state(), ControllerState::Playing);
    assert!(view.controller().actions().iter().all(|a| a.time() == 0.0));
}

#[test]
fn progress_from_zero_then_two_clips_start_together() {
    let asset = decode_slice(&animated_glb(), "animated.glb", None).unwrap();
    let (mut reporter, handle) = channel();
    let mut view = ModelView::new(handle, [0.0; 3]);
    let mut shell = HeadlessShell::new();

    reporter.progress(progress(0, 4));
    view.tick(0.016, &mut shell);
    assert_eq!(shell.percent_history, vec![0]);
    assert!(matches!(view.outcome(), LoadOutcome::Pending));

    reporter.progress(progress(1, 4));
    reporter.progress(progress(4, 4));
    reporter.succeed(asset);
    view.tick(0.016, &mut shell);

    assert_eq!(shell.percent_history, vec![0, 25, 100]);
    assert_eq!(shell.clear_count, 1);
    assert!(matches!(view.outcome(), LoadOutcome::Success));

    let actions = view.controller().actions();
    assert_eq!(actions.len(), 2);
    assert!(
        actions
            .iter()
            .all(|a| a.state() == ActionState::Playing && a.time() == 0.0)
    );
}

#[test]
fn model_bounds_follow_the_placement() {
    let asset = decode_slice(&animated_glb(), "animated.glb", None).unwrap();
    let (reporter, handle) = channel();
    let mut view = ModelView::new(handle, [0.0, 5.0, 0.0]);
    let mut shell = HeadlessShell::new();
    reporter.succeed(asset);
    view.tick(0.0, &mut shell);

    let bounds = view.world_bounds().unwrap();
    assert!(bounds.min.y >= 5.0 - 1e-5);
    assert!(bounds.max.y <= 6.0 + 1e-5);

    view.set_hovered(true, &mut shell);
    assert_eq!(shell.cursor, CursorStyle::Pointer);
}

#[test]
fn failure_leaves_the_scene_empty() {
    let (mut reporter, handle) = channel();
    let mut view = ModelView::new(handle, [0.0, 5.0, 0.0]);
    let mut shell = HeadlessShell::new();

    reporter.progress(progress(1, 2));
    reporter.fail(LoadError::decode("truncated buffer"));
    view.tick(0.016, &mut shell);

    assert!(matches!(view.outcome(), LoadOutcome::Failure(LoadError::Decode(_))));
    assert!(view.visible_mesh().is_none());
    assert!(view.world_bounds().is_none());
    assert_eq!(view.controller().state(), ControllerState::Unbound);
    assert!(shell.loading.is_none());
    assert_eq!(shell.clear_count, 1);

    assert!(!view.on_click());
    view.set_hovered(true, &mut shell);
    assert_eq!(shell.cursor_changes, 0);
}

#[test]
fn only_the_first_terminal_event_counts() {
    let (tx, rx) = std::sync::mpsc::channel();
    let handle = glbvis::asset::LoadHandle::from_receiver(rx);
    let mut view = ModelView::new(handle, [0.0; 3]);
    let mut shell = HeadlessShell::new();

    let asset = decode_slice(&animated_glb(), "animated.glb", None).unwrap();
    tx.send(glbvis::asset::LoadEvent::Failed(LoadError::Interrupted)).unwrap();
    tx.send(glbvis::asset::LoadEvent::Loaded(Box::new(asset))).unwrap();

    view.tick(0.016, &mut shell);
    view.tick(0.016, &mut shell);

    assert!(matches!(view.outcome(), LoadOutcome::Failure(LoadError::Interrupted)));
    assert!(view.visible_mesh().is_none());
    assert_eq!(shell.clear_count, 1);
}

#[test]
fn dropped_loader_counts_as_a_failure() {
    let (reporter, handle) = channel();
    let mut view = ModelView::new(handle, [0.0; 3]);
    let mut shell = HeadlessShell::new();
    drop(reporter);

    view.tick(0.016, &mut shell);
    assert!(matches!(view.outcome(), LoadOutcome::Failure(LoadError::Interrupted)));
    assert!(shell.loading.is_none());
}
