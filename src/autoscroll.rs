//! Edge-proximity auto-scroll: while a pointer-driven interaction moves
//! near a container edge, the container is scrolled at a configured speed.

use log::{debug, warn};

use crate::Scope;
use crate::events::{AutoScrollEvent, Event};
use crate::interaction::{Interactable, InteractionKey};
use crate::options::{ActionKind, ContainerOption};
use crate::pointer::Point;
use crate::scene::{NodeKey, SceneTree, ScrollContainer};
use crate::scheduler::{TickHandle, TickTarget};

/// The auto-scroll session.
///
/// Intentionally singular: one session per [`Scope`], created with it and
/// torn down with it. Starting a session while another interaction is
/// scrolling silently rebinds it; concurrent sessions are out of scope.
#[derive(Debug, Default)]
pub struct AutoScroll {
    /// Scroll direction per axis: -1, 0 or 1. Kept after a stop until the
    /// next move event recomputes it.
    pub x: i8,
    pub y: i8,
    pub(crate) margin: f64,
    pub(crate) speed: f64,
    pub(crate) is_scrolling: bool,
    /// Timestamp of the last applied tick; left stale while the accrued
    /// displacement stays under one pixel.
    pub(crate) prev_time: f64,
    pub(crate) timeout: Option<TickHandle>,
    pub(crate) interaction: Option<InteractionKey>,
}

impl AutoScroll {
    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    /// The interaction currently driving the session, if any.
    pub fn interaction(&self) -> Option<InteractionKey> {
        self.interaction
    }

    /// The margin snapshotted from the interaction that started the
    /// session.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// The speed (px/s) snapshotted from the interaction that started the
    /// session.
    pub fn speed(&self) -> f64 {
        self.speed
    }
}

/// True when the action's auto-scroll option is enabled for the target.
pub fn check(interactable: &Interactable, action: ActionKind) -> bool {
    interactable.auto_scroll.get(action).enabled
}

/// Edge check, run on every interaction move. `client` is the pointer's
/// client position; only a genuinely pointer-driven move can steer or
/// start the session.
pub(crate) fn on_interaction_move(scope: &mut Scope, key: InteractionKey, client: Point) {
    let Some(interaction) = scope.interactions.get(key) else {
        return;
    };
    let (Some(action), Some(interactable)) = (interaction.prepared, interaction.interactable)
    else {
        return;
    };
    if !(interaction.interacting() && check(&scope.interactables[interactable], action)) {
        return;
    }

    // a simulated interaction is not pointer-driven
    if interaction.simulating() {
        scope.auto_scroll.x = 0;
        scope.auto_scroll.y = 0;
        return;
    }

    let element = interaction.element;
    let options = scope.interactables[interactable]
        .auto_scroll
        .get(action)
        .clone();
    let container = resolve_container(&scope.scene, &options.container, element);

    let (left, top, right, bottom) = match container {
        ScrollContainer::Viewport => {
            let rect = scope.scene.viewport_rect();
            (
                client.x < options.margin,
                client.y < options.margin,
                client.x > rect.width() - options.margin,
                client.y > rect.height() - options.margin,
            )
        }
        ScrollContainer::Node(node) => {
            let rect = scope.scene.client_rect(node);
            (
                client.x < rect.left + options.margin,
                client.y < rect.top + options.margin,
                client.x > rect.right - options.margin,
                client.y > rect.bottom - options.margin,
            )
        }
    };

    scope.auto_scroll.x = if right {
        1
    } else if left {
        -1
    } else {
        0
    };
    scope.auto_scroll.y = if bottom {
        1
    } else if top {
        -1
    } else {
        0
    };

    if !scope.auto_scroll.is_scrolling {
        // adopt the triggering interaction's configuration
        scope.auto_scroll.margin = options.margin;
        scope.auto_scroll.speed = options.speed;
        start(scope, key);
    }
}

pub(crate) fn start(scope: &mut Scope, key: InteractionKey) {
    scope.auto_scroll.is_scrolling = true;
    if let Some(handle) = scope.auto_scroll.timeout.take() {
        scope.scheduler.cancel(handle);
    }

    scope.auto_scroll.interaction = Some(key);
    scope.auto_scroll.prev_time = scope.clock.now_ms();
    scope.auto_scroll.timeout = Some(scope.scheduler.request(TickTarget::AutoScroll));

    debug!("auto-scroll session started");
}

/// Tears the session down. Safe to call when already stopped.
pub(crate) fn stop(scope: &mut Scope) {
    scope.auto_scroll.is_scrolling = false;
    scope.auto_scroll.interaction = None;
    if let Some(handle) = scope.auto_scroll.timeout.take() {
        scope.scheduler.cancel(handle);
    }
}

/// One scroll step.
///
/// Displacement accrues as `speed * dt` and is only applied once it
/// reaches a whole pixel; below that the last applied-tick timestamp is
/// deliberately left stale so the accrued distance keeps growing.
pub(crate) fn scroll_tick(scope: &mut Scope) {
    let Some(key) = scope.auto_scroll.interaction else {
        return;
    };
    let Some(interaction) = scope.interactions.get(key) else {
        return;
    };
    let (Some(action), Some(interactable)) = (interaction.prepared, interaction.interactable)
    else {
        return;
    };

    let element = interaction.element;
    let options = scope.interactables[interactable]
        .auto_scroll
        .get(action)
        .clone();
    let container = resolve_container(&scope.scene, &options.container, element);

    let now = scope.clock.now_ms();
    let dt = (now - scope.auto_scroll.prev_time) / 1000.0;
    let s = scope.auto_scroll.speed * dt;

    if s >= 1.0 {
        let scroll_by = Point::new(
            f64::from(scope.auto_scroll.x) * s,
            f64::from(scope.auto_scroll.y) * s,
        );

        if scroll_by.x != 0.0 || scroll_by.y != 0.0 {
            let prev_scroll = scope.scene.scroll_offset(container);
            scope.scene.scroll_by(container, scroll_by);
            let cur_scroll = scope.scene.scroll_offset(container);

            // only what survived the container's own limits
            let delta = cur_scroll - prev_scroll;
            if delta.x != 0.0 || delta.y != 0.0 {
                scope.events.push(Event::AutoScroll(AutoScrollEvent {
                    interactable,
                    target: element,
                    delta,
                    container,
                    interaction: key,
                }));
            }
        }

        scope.auto_scroll.prev_time = now;
    }

    if scope.auto_scroll.is_scrolling {
        if let Some(handle) = scope.auto_scroll.timeout.take() {
            scope.scheduler.cancel(handle);
        }
        scope.auto_scroll.timeout = Some(scope.scheduler.request(TickTarget::AutoScroll));
    }
}

/// Resolves a configured container against the interaction's element. An
/// unresolved name falls back to the viewport.
pub(crate) fn resolve_container(
    scene: &SceneTree,
    option: &ContainerOption,
    element: Option<NodeKey>,
) -> ScrollContainer {
    match option {
        ContainerOption::Viewport => ScrollContainer::Viewport,
        ContainerOption::Node(key) => ScrollContainer::Node(*key),
        ContainerOption::Named(name) => {
            match element.and_then(|element| scene.resolve_name(name, element)) {
                Some(node) => ScrollContainer::Node(node),
                None => {
                    warn!("auto-scroll container {name:?} did not resolve; using the viewport");
                    ScrollContainer::Viewport
                }
            }
        }
    }
}

/// Runs `f` and reports how much the interaction's enabled auto-scroll
/// container scrolled during it; zero when auto-scroll is disabled for the
/// prepared action.
pub fn scroll_size_delta(
    scope: &mut Scope,
    key: InteractionKey,
    f: impl FnOnce(&mut Scope),
) -> Point {
    let container = scope.interactions.get(key).and_then(|interaction| {
        let action = interaction.prepared?;
        let interactable = scope.interactables.get(interaction.interactable?)?;
        let options = interactable.auto_scroll.get(action);
        options.enabled.then(|| {
            resolve_container(&scope.scene, &options.container, interaction.element)
        })
    });

    let Some(container) = container else {
        f(scope);
        return Point::ZERO;
    };

    let prev = scope.scene.scroll_offset(container);
    f(scope);
    scope.scene.scroll_offset(container) - prev
}
