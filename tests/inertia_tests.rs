// End-to-end tests for the post-release momentum and smooth-end paths,
// driven through the scope with a manual clock.

use std::cell::RefCell;
use std::rc::Rc;

use flick::interaction::Interaction;
use flick::{
    ActionKind, Event, EventPhase, InertiaOptions, Interactable, InteractionKey, ManualClock,
    ModifierArgs, ModifierPipeline, ModifierResult, NodeKey, PerAction, Point, PointerSample,
    Rect, SceneTree, Scope,
};

fn sample(x: f64, y: f64) -> PointerSample {
    PointerSample {
        pointer_id: 0,
        page: Point::new(x, y),
        client: Point::new(x, y),
    }
}

struct Rig {
    scope: Scope,
    clock: ManualClock,
    interaction: InteractionKey,
    element: NodeKey,
    other: NodeKey,
}

fn drag_rig(options: InertiaOptions) -> Rig {
    let clock = ManualClock::new();
    let mut scene = SceneTree::new(Point::new(800.0, 600.0));
    let root = scene.add_node(None, Rect::new(0.0, 0.0, 800.0, 600.0));
    let element = scene.add_node(Some(root), Rect::new(100.0, 100.0, 300.0, 300.0));
    let other = scene.add_node(Some(root), Rect::new(500.0, 100.0, 700.0, 300.0));

    let mut scope = Scope::with_clock(scene, Box::new(clock.clone()));
    let mut interactable = Interactable::new(element);
    interactable.inertia = PerAction::splat(options);
    let interactable = scope.add_interactable(interactable);

    let interaction = scope.create_interaction();
    scope.start_action(interaction, ActionKind::Drag, interactable);

    Rig {
        scope,
        clock,
        interaction,
        element,
        other,
    }
}

fn enabled_options() -> InertiaOptions {
    InertiaOptions {
        enabled: true,
        ..InertiaOptions::default()
    }
}

/// Drives the pointer so the release velocity is `speed` px/s along +x,
/// ending with the cursor at `(100 + speed / 10, 100)` and the clock at
/// 120 ms (20 ms after the last coordinate update).
fn flick_right(rig: &mut Rig, speed: f64) {
    rig.clock.set(0.0);
    rig.scope
        .pointer_down(rig.interaction, sample(100.0, 100.0), Some(rig.element));
    rig.scope.pointer_move(rig.interaction, sample(100.0, 100.0));
    rig.clock.set(100.0);
    rig.scope
        .pointer_move(rig.interaction, sample(100.0 + speed / 10.0, 100.0));
    rig.clock.set(120.0);
}

fn interaction_events(events: &[Event], phase: EventPhase) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::Interaction(e) if e.phase == phase))
        .count()
}

/// Records every pipeline invocation and answers with a fixed result.
struct RecordingModifiers {
    calls: Rc<RefCell<Vec<ModifierArgs>>>,
    result: ModifierResult,
}

impl ModifierPipeline for RecordingModifiers {
    fn set_all(&mut self, _interaction: &Interaction, args: ModifierArgs) -> ModifierResult {
        self.calls.borrow_mut().push(args);
        self.result
    }
}

#[test]
fn fast_release_starts_inertia_with_expected_decay() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);

    let simulated = rig.scope.end_action(rig.interaction, false);
    assert!(simulated);

    let state = &rig.scope.interactions[rig.interaction].inertia;
    assert!(state.active);
    assert!((state.v0 - 300.0).abs() < 1e-9);
    assert!((state.vx0 - 300.0).abs() < 1e-9);
    assert_eq!(state.vy0, 0.0);
    // te = -ln(10 / 300) / 10, xe = (300 - te) / 10
    assert!((state.te - 0.340_119_7).abs() < 1e-6);
    assert!((state.xe - 29.965_988).abs() < 1e-5);
    assert_eq!(state.modified_xe, state.xe);

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::InertiaStart), 1);
    assert_eq!(interaction_events(&events, EventPhase::End), 0);
}

#[test]
fn first_tick_applies_zero_offset() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    rig.scope.drain_events();

    // the clock has not advanced since release
    rig.scope.run_frame();

    let coords = &rig.scope.interactions[rig.interaction].coords;
    assert_eq!(coords.cur.page, Point::new(130.0, 100.0));

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::Move), 1);
}

#[test]
fn decay_follows_the_progress_formula() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);

    let (xe, ye, lambda_v0, one_ve_v0) = {
        let state = &rig.scope.interactions[rig.interaction].inertia;
        (state.xe, state.ye, state.lambda_v0, state.one_ve_v0)
    };

    for t_ms in [50.0, 100.0, 150.0, 200.0, 250.0, 300.0] {
        rig.clock.set(120.0 + t_ms);
        rig.scope.run_frame();

        let t = t_ms / 1000.0;
        let progress = 1.0 - ((-10.0 * t).exp() - lambda_v0) / one_ve_v0;
        let coords = &rig.scope.interactions[rig.interaction].coords;
        assert!((coords.cur.page.x - (130.0 + xe * progress)).abs() < 1e-9);
        assert!((coords.cur.page.y - (100.0 + ye * progress)).abs() < 1e-9);
    }
}

#[test]
fn completion_lands_on_the_target_and_ends_the_action() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    rig.scope.drain_events();

    let (modified_xe, modified_ye) = {
        let state = &rig.scope.interactions[rig.interaction].inertia;
        (state.modified_xe, state.modified_ye)
    };

    // well past te ≈ 340 ms
    rig.clock.set(120.0 + 500.0);
    rig.scope.run_frame();

    let interaction = &rig.scope.interactions[rig.interaction];
    assert!(!interaction.inertia.active);
    assert_eq!(interaction.simulation, None);
    assert!(!interaction.interacting());
    assert!((interaction.coords.cur.page.x - (130.0 + modified_xe)).abs() < 1e-9);
    assert!((interaction.coords.cur.page.y - (100.0 + modified_ye)).abs() < 1e-9);

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::Move), 1);
    assert_eq!(interaction_events(&events, EventPhase::End), 1);
    // the synthesized end must not re-trigger a simulation
    assert_eq!(interaction_events(&events, EventPhase::InertiaStart), 0);
    assert_eq!(rig.scope.scheduler.pending_len(), 0);
}

#[test]
fn slow_release_ends_normally() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 30.0);

    let simulated = rig.scope.end_action(rig.interaction, false);
    assert!(!simulated);

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::InertiaStart), 0);
    assert_eq!(interaction_events(&events, EventPhase::End), 1);
}

#[test]
fn release_below_end_speed_does_not_start_inertia() {
    let options = InertiaOptions {
        enabled: true,
        min_speed: 0.0,
        end_speed: 1000.0,
        ..InertiaOptions::default()
    };
    let mut rig = drag_rig(options);
    flick_right(&mut rig, 300.0);

    assert!(!rig.scope.end_action(rig.interaction, false));
}

#[test]
fn stale_release_does_not_start_inertia() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);

    // 60 ms since the last coordinate update
    rig.clock.set(160.0);
    assert!(!rig.scope.end_action(rig.interaction, false));
}

#[test]
fn gestures_never_start_inertia() {
    let mut rig = drag_rig(enabled_options());
    let interactable = rig.scope.interactions[rig.interaction].interactable.unwrap();
    rig.scope
        .start_action(rig.interaction, ActionKind::Gesture, interactable);
    flick_right(&mut rig, 300.0);

    assert!(!rig.scope.end_action(rig.interaction, false));
}

#[test]
fn disabled_inertia_is_ignored() {
    let mut rig = drag_rig(InertiaOptions::default());
    flick_right(&mut rig, 300.0);

    assert!(!rig.scope.end_action(rig.interaction, false));
}

#[test]
fn no_pre_end_skips_the_evaluation() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);

    assert!(!rig.scope.end_action(rig.interaction, true));
    assert!(!rig.scope.interactions[rig.interaction].inertia.active);
}

#[test]
fn stop_is_idempotent() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    assert_eq!(rig.scope.scheduler.pending_len(), 1);

    rig.scope.stop(rig.interaction);
    let interaction = &rig.scope.interactions[rig.interaction];
    assert!(!interaction.inertia.active);
    assert_eq!(interaction.simulation, None);
    assert_eq!(rig.scope.scheduler.pending_len(), 0);

    rig.scope.stop(rig.interaction);
    assert_eq!(rig.scope.scheduler.pending_len(), 0);
}

#[test]
fn stopping_an_inactive_simulation_changes_nothing() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);

    rig.scope.stop(rig.interaction);
    assert!(rig.scope.interactions[rig.interaction].interacting());
}

#[test]
fn resume_round_trip_leaves_a_zero_delta() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    rig.scope.drain_events();

    rig.clock.set(220.0);
    rig.scope
        .pointer_down(rig.interaction, sample(140.0, 105.0), Some(rig.element));

    let events = rig.scope.drain_events();
    let resumes = events
        .iter()
        .filter(|event| matches!(event, Event::ActionResume { .. }))
        .count();
    assert_eq!(resumes, 1);
    assert_eq!(interaction_events(&events, EventPhase::Resume), 1);

    let interaction = &rig.scope.interactions[rig.interaction];
    assert!(!interaction.inertia.active);
    assert_eq!(interaction.simulation, None);
    assert_eq!(interaction.coords.prev, interaction.coords.cur);
    assert_eq!(interaction.coords.cur.page, Point::new(140.0, 105.0));
    assert_eq!(rig.scope.scheduler.pending_len(), 0);

    // the next move starts from the down position: no jump
    rig.scope.pointer_move(rig.interaction, sample(140.0, 105.0));
    let coords = &rig.scope.interactions[rig.interaction].coords;
    assert_eq!(coords.delta.page, Point::ZERO);
}

#[test]
fn resume_ignores_targets_outside_the_element() {
    let mut rig = drag_rig(enabled_options());
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    rig.scope.drain_events();

    rig.scope
        .pointer_down(rig.interaction, sample(600.0, 200.0), Some(rig.other));

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::Resume), 0);
    assert!(rig.scope.interactions[rig.interaction].inertia.active);
}

#[test]
fn resume_requires_allow_resume() {
    let options = InertiaOptions {
        enabled: true,
        allow_resume: false,
        ..InertiaOptions::default()
    };
    let mut rig = drag_rig(options);
    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);
    rig.scope.drain_events();

    rig.scope
        .pointer_down(rig.interaction, sample(140.0, 105.0), Some(rig.element));

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::Resume), 0);
    assert!(rig.scope.interactions[rig.interaction].inertia.active);
}

#[test]
fn slow_release_with_changed_modifier_enters_smooth_end() {
    let mut rig = drag_rig(enabled_options());
    let calls = Rc::new(RefCell::new(Vec::new()));
    rig.scope.set_modifiers(Box::new(RecordingModifiers {
        calls: Rc::clone(&calls),
        result: ModifierResult {
            delta: Point::new(50.0, 0.0),
            changed: true,
        },
    }));

    flick_right(&mut rig, 30.0);
    let simulated = rig.scope.end_action(rig.interaction, false);
    assert!(simulated);

    {
        let state = &rig.scope.interactions[rig.interaction].inertia;
        assert!(state.active);
        assert!(state.smooth_end);
        assert_eq!(state.xe, 50.0);
        assert_eq!(state.ye, 0.0);
        assert_eq!(state.t0, 120.0);
    }

    // the trigger evaluation proposed the current position against the
    // previous one, without the end-only restriction
    {
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].page_coords, Point::new(103.0, 100.0));
        assert_eq!(calls[0].prev_coords, Some(Point::new(100.0, 100.0)));
        assert!(calls[0].pre_end);
        assert!(!calls[0].require_end_only);
    }

    // halfway through the 300 ms duration: ease-out covers 37.5 of 50
    rig.clock.set(270.0);
    rig.scope.run_frame();
    let coords = &rig.scope.interactions[rig.interaction].coords;
    assert!((coords.cur.page.x - (103.0 + 37.5)).abs() < 1e-9);
    assert_eq!(coords.cur.page.y, 100.0);

    rig.clock.set(420.0);
    rig.scope.run_frame();
    let interaction = &rig.scope.interactions[rig.interaction];
    assert!((interaction.coords.cur.page.x - 153.0).abs() < 1e-9);
    assert!(!interaction.inertia.active);
    assert!(!interaction.inertia.smooth_end);
    assert_eq!(interaction.simulation, None);

    let events = rig.scope.drain_events();
    assert_eq!(interaction_events(&events, EventPhase::InertiaStart), 1);
    assert_eq!(interaction_events(&events, EventPhase::End), 1);
}

#[test]
fn fast_release_constrains_the_endpoint_through_end_only_modifiers() {
    let mut rig = drag_rig(enabled_options());
    let calls = Rc::new(RefCell::new(Vec::new()));
    rig.scope.set_modifiers(Box::new(RecordingModifiers {
        calls: Rc::clone(&calls),
        result: ModifierResult {
            delta: Point::new(10.0, 0.0),
            changed: true,
        },
    }));

    flick_right(&mut rig, 300.0);
    rig.scope.end_action(rig.interaction, false);

    let (xe, ye, modified_xe, modified_ye, lambda_v0, one_ve_v0) = {
        let state = &rig.scope.interactions[rig.interaction].inertia;
        (
            state.xe,
            state.ye,
            state.modified_xe,
            state.modified_ye,
            state.lambda_v0,
            state.one_ve_v0,
        )
    };
    assert_eq!(modified_xe, xe + 10.0);
    assert_eq!(modified_ye, ye);

    // one pipeline call: the raw endpoint proposed as the end position
    {
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].page_coords, Point::new(130.0 + xe, 100.0 + ye));
        assert_eq!(calls[0].prev_coords, None);
        assert!(calls[0].pre_end);
        assert!(calls[0].require_end_only);
    }

    // mid-flight the trajectory bends along the quadratic curve
    rig.clock.set(120.0 + 150.0);
    rig.scope.run_frame();

    let progress = 1.0 - ((-10.0 * 0.15f64).exp() - lambda_v0) / one_ve_v0;
    let it = 1.0 - progress;
    let expected_x = 2.0 * it * progress * xe + progress * progress * modified_xe;
    let expected_y = 2.0 * it * progress * ye + progress * progress * modified_ye;

    let coords = &rig.scope.interactions[rig.interaction].coords;
    assert!((coords.cur.page.x - (130.0 + expected_x)).abs() < 1e-9);
    assert!((coords.cur.page.y - (100.0 + expected_y)).abs() < 1e-9);

    // and completion still lands on the constrained target
    rig.clock.set(120.0 + 500.0);
    rig.scope.run_frame();
    let coords = &rig.scope.interactions[rig.interaction].coords;
    assert!((coords.cur.page.x - (130.0 + modified_xe)).abs() < 1e-9);
}
