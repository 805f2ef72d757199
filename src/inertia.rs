//! Post-release motion: exponential-decay momentum and the eased
//! smooth-end correction toward a modifier-adjusted endpoint.

use log::debug;

use crate::Scope;
use crate::events::{Event, EventPhase, InteractEvent};
use crate::interaction::{Interaction, InteractionKey, Simulation};
use crate::math::{self, easing};
use crate::modifiers::{ModifierArgs, ModifierResult};
use crate::options::ActionKind;
use crate::pointer::{Point, PointerSample};
use crate::scene::NodeKey;
use crate::scheduler::TickTarget;

/// A release older than this (since the last coordinate update) cannot
/// start inertia.
const RELEASE_STALENESS_MS: f64 = 50.0;

/// How a release takes over the end of an action.
enum Takeover {
    Inertia,
    SmoothEnd(ModifierResult),
}

/// Release evaluation, run before an action's end is finalized.
///
/// Returns true when a simulation took over and the normal end must be
/// deferred. `event_id` identifies the event that triggered the release so
/// a simulation's own synthesized end cannot re-trigger it.
pub(crate) fn release(
    scope: &mut Scope,
    key: InteractionKey,
    event_id: Option<u64>,
    no_pre_end: bool,
) -> bool {
    let now = scope.clock.now_ms();

    let Some(interaction) = scope.interactions.get(key) else {
        return false;
    };
    if !interaction.interacting() || interaction.simulating() || no_pre_end {
        return false;
    }
    let (Some(action), Some(interactable)) = (interaction.prepared, interaction.interactable)
    else {
        return false;
    };

    let options = scope.interactables[interactable].inertia.get(action).clone();
    let pointer_speed = interaction.coords.velocity.client.hypot();

    let inertia_possible = options.enabled
        && action != ActionKind::Gesture
        && (event_id.is_none() || event_id != interaction.inertia.start_event.map(|event| event.id));

    let inertia = inertia_possible
        && now - interaction.coords.cur.timestamp < RELEASE_STALENESS_MS
        && pointer_speed > options.min_speed
        && pointer_speed > options.end_speed;

    // A slow release can still need an eased correction when an end-only
    // modifier would move the endpoint.
    let mut smooth_end_result = None;
    if inertia_possible && !inertia {
        let args = ModifierArgs {
            page_coords: interaction.coords.cur.page,
            prev_coords: Some(interaction.coords.prev.page),
            pre_end: true,
            require_end_only: false,
        };
        let result = scope.modifiers.set_all(interaction, args);
        if result.changed {
            smooth_end_result = Some(result);
        }
    }

    let takeover = if inertia {
        Takeover::Inertia
    } else if let Some(result) = smooth_end_result {
        Takeover::SmoothEnd(result)
    } else {
        return false;
    };

    let start_event = InteractEvent {
        id: scope.next_event_id(),
        interaction: key,
        interactable: Some(interactable),
        target: scope.interactions[key].element,
        action,
        phase: EventPhase::InertiaStart,
        page: scope.interactions[key].coords.cur.page,
        client: scope.interactions[key].coords.cur.client,
        timestamp: now,
    };

    {
        let interaction = &mut scope.interactions[key];
        let state = &mut interaction.inertia;
        state.up_coords = interaction.coords.cur;
        state.start_event = Some(start_event);
        state.t0 = now;
        state.active = true;
        state.allow_resume = options.allow_resume;
    }
    scope.events.push(Event::Interaction(start_event));

    match takeover {
        Takeover::Inertia => {
            let velocity = scope.interactions[key].coords.velocity.client;
            let (vx0, vy0) = (velocity.x, velocity.y);
            let v0 = pointer_speed;

            let lambda = options.resistance;
            let te = -(options.end_speed / v0).ln() / lambda;
            let xe = (vx0 - te) / lambda;
            let ye = (vy0 - te) / lambda;

            // constrain the raw endpoint through the end-only modifiers
            let args = ModifierArgs {
                page_coords: scope.interactions[key].coords.cur.page + Point::new(xe, ye),
                prev_coords: None,
                pre_end: true,
                require_end_only: true,
            };
            let result = scope.modifiers.set_all(&scope.interactions[key], args);

            let interaction = &mut scope.interactions[key];
            interaction.simulation = Some(Simulation::Inertia);
            let state = &mut interaction.inertia;
            state.vx0 = vx0;
            state.vy0 = vy0;
            state.v0 = v0;
            // the decay runs in seconds
            state.t0 = start_event.timestamp / 1000.0;
            state.te = te;
            state.sx = 0.0;
            state.sy = 0.0;
            state.xe = xe;
            state.ye = ye;
            state.modified_xe = xe + result.delta.x;
            state.modified_ye = ye + result.delta.y;
            state.lambda_v0 = lambda / v0;
            state.one_ve_v0 = 1.0 - options.end_speed / v0;
            state.timeout = Some(scope.scheduler.request(TickTarget::Inertia(key)));

            debug!(
                "starting inertia: v0 {v0:.1} px/s, duration {te:.3} s, target ({:.1}, {:.1})",
                state.modified_xe, state.modified_ye,
            );
        }
        Takeover::SmoothEnd(result) => {
            let interaction = &mut scope.interactions[key];
            interaction.simulation = Some(Simulation::SmoothEnd);
            let state = &mut interaction.inertia;
            state.smooth_end = true;
            state.xe = result.delta.x;
            state.ye = result.delta.y;
            state.sx = 0.0;
            state.sy = 0.0;
            state.timeout = Some(scope.scheduler.request(TickTarget::SmoothEnd(key)));

            debug!(
                "starting smooth end toward ({:.1}, {:.1})",
                state.xe, state.ye
            );
        }
    }

    true
}

/// One decay step. Applies the simulated offset, keeps the delta/velocity
/// streams live, and either reschedules or ends the action.
pub(crate) fn inertia_tick(scope: &mut Scope, key: InteractionKey) {
    let now = scope.clock.now_ms();

    let Some(lambda) = resistance_of(scope, key) else {
        return;
    };

    let finished = {
        let Some(interaction) = scope.interactions.get_mut(key) else {
            return;
        };
        let state = &mut interaction.inertia;
        if !state.active {
            return;
        }

        let t = now / 1000.0 - state.t0;
        let finished = t >= state.te;

        if finished {
            state.sx = state.modified_xe;
            state.sy = state.modified_ye;
        } else {
            let progress = 1.0 - ((-lambda * t).exp() - state.lambda_v0) / state.one_ve_v0;

            if state.modified_xe == state.xe && state.modified_ye == state.ye {
                state.sx = state.xe * progress;
                state.sy = state.ye * progress;
            } else {
                let point = math::quadratic_curve_point(
                    Point::ZERO,
                    Point::new(state.xe, state.ye),
                    Point::new(state.modified_xe, state.modified_ye),
                    progress,
                );
                state.sx = point.x;
                state.sy = point.y;
            }
        }

        apply_simulated_coords(interaction, now);
        interaction.coords.set_deltas();
        interaction.coords.set_velocity();
        finished
    };

    scope.trigger_move(key);

    if finished {
        let start_event = scope.interactions[key].inertia.start_event;
        if let Some(event) = start_event {
            scope.do_end(key, Some(event.id), false);
        }
        let interaction = &mut scope.interactions[key];
        interaction.inertia.active = false;
        interaction.inertia.timeout = None;
        interaction.simulation = None;
    } else {
        let handle = scope.scheduler.request(TickTarget::Inertia(key));
        scope.interactions[key].inertia.timeout = Some(handle);
    }

    scope.interactions[key].coords.copy_prev_from_cur();
}

/// One smooth-end step: ease toward the modifier-adjusted endpoint.
pub(crate) fn smooth_end_tick(scope: &mut Scope, key: InteractionKey) {
    let now = scope.clock.now_ms();

    let Some(duration) = smooth_end_duration_of(scope, key) else {
        return;
    };

    let finished = {
        let Some(interaction) = scope.interactions.get_mut(key) else {
            return;
        };
        let state = &mut interaction.inertia;
        if !state.active {
            return;
        }

        let t = now - state.t0;
        let finished = t >= duration;

        if finished {
            state.sx = state.xe;
            state.sy = state.ye;
        } else {
            state.sx = easing::ease_out_quad(t, 0.0, state.xe, duration);
            state.sy = easing::ease_out_quad(t, 0.0, state.ye, duration);
        }

        apply_simulated_coords(interaction, now);
        finished
    };

    scope.trigger_move(key);

    if finished {
        let start_event = scope.interactions[key].inertia.start_event;
        if let Some(event) = start_event {
            scope.do_end(key, Some(event.id), false);
        }
        let interaction = &mut scope.interactions[key];
        interaction.inertia.smooth_end = false;
        interaction.inertia.active = false;
        interaction.inertia.timeout = None;
        interaction.simulation = None;
    } else {
        let handle = scope.scheduler.request(TickTarget::SmoothEnd(key));
        scope.interactions[key].inertia.timeout = Some(handle);
    }
}

/// Pointer-down handling: a down on the simulation's bound element (or
/// anything inside it) takes the action back over.
///
/// Returns true when the simulation was resumed.
pub(crate) fn resume(
    scope: &mut Scope,
    key: InteractionKey,
    pointer: PointerSample,
    event_target: Option<NodeKey>,
) -> bool {
    let Some(interaction) = scope.interactions.get(key) else {
        return false;
    };
    if !interaction.inertia.active || !interaction.inertia.allow_resume {
        return false;
    }
    let (Some(element), Some(target)) = (interaction.element, event_target) else {
        return false;
    };
    let Some(action) = interaction.prepared else {
        return false;
    };
    if !scope.scene.contains(element, target) {
        return false;
    }

    let now = scope.clock.now_ms();

    {
        let interaction = &mut scope.interactions[key];
        if let Some(handle) = interaction.inertia.timeout.take() {
            scope.scheduler.cancel(handle);
        }
        interaction.inertia.active = false;
        interaction.simulation = None;

        // rebind the pointer list to the down event's coordinates
        interaction.update_pointer(pointer);
        interaction.refresh_coords(now);
    }

    scope.events.push(Event::ActionResume { interaction: key });

    let id = scope.next_event_id();
    let interaction = &scope.interactions[key];
    let resume_event = InteractEvent {
        id,
        interaction: key,
        interactable: interaction.interactable,
        target: interaction.element,
        action,
        phase: EventPhase::Resume,
        page: interaction.coords.cur.page,
        client: interaction.coords.cur.client,
        timestamp: now,
    };
    scope.events.push(Event::Interaction(resume_event));

    // the next delta computation starts from here, so resuming causes no
    // visual jump
    scope.interactions[key].coords.copy_prev_from_cur();

    debug!("inertia resumed by pointer {}", pointer.pointer_id);
    true
}

/// Stops an active simulation. Stopping an inactive one is a no-op.
pub(crate) fn stop(scope: &mut Scope, key: InteractionKey) {
    let Some(interaction) = scope.interactions.get_mut(key) else {
        return;
    };
    if interaction.inertia.active {
        if let Some(handle) = interaction.inertia.timeout.take() {
            scope.scheduler.cancel(handle);
        }
        interaction.inertia.active = false;
        interaction.simulation = None;
    }
}

/// Moves `coords.cur` to the release point plus the simulated offset.
fn apply_simulated_coords(interaction: &mut Interaction, now_ms: f64) {
    let state = &interaction.inertia;
    if !state.active {
        return;
    }

    let offset = Point::new(state.sx, state.sy);
    interaction.coords.set_cur_points(
        state.up_coords.page + offset,
        state.up_coords.client + offset,
        now_ms,
    );
}

fn resistance_of(scope: &Scope, key: InteractionKey) -> Option<f64> {
    let interaction = scope.interactions.get(key)?;
    let interactable = scope.interactables.get(interaction.interactable?)?;
    Some(interactable.inertia.get(interaction.prepared?).resistance)
}

fn smooth_end_duration_of(scope: &Scope, key: InteractionKey) -> Option<f64> {
    let interaction = scope.interactions.get(key)?;
    let interactable = scope.interactables.get(interaction.interactable?)?;
    Some(
        interactable
            .inertia
            .get(interaction.prepared?)
            .smooth_end_duration,
    )
}
