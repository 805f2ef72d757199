use slotmap::SlotMap;

pub mod autoscroll;
pub mod events;
pub mod inertia;
pub mod interaction;
pub mod math;
pub mod modifiers;
pub mod options;
pub mod pointer;
pub mod scene;
pub mod scheduler;

pub use autoscroll::{AutoScroll, scroll_size_delta};
pub use events::{AutoScrollEvent, Event, EventPhase, InteractEvent};
pub use interaction::{Interactable, InteractableKey, Interaction, InteractionKey, Simulation};
pub use modifiers::{ModifierArgs, ModifierPipeline, ModifierResult, NoopModifiers};
pub use options::{
    ActionKind, AutoScrollOptions, ContainerOption, InertiaOptions, OptionsError, PerAction,
};
pub use pointer::{Point, PointerSample};
pub use scene::{NodeKey, Rect, SceneTree, ScrollContainer};
pub use scheduler::{Clock, FrameScheduler, ManualClock, SystemClock, TickHandle, TickTarget};

/// Owner of everything the motion controllers touch: interactions,
/// interactables, scene geometry, the frame scheduler, the modifier
/// pipeline, the single auto-scroll session and the outgoing event queue.
///
/// The embedding host feeds the lifecycle entry points (`pointer_down`,
/// `pointer_move`, `end_action`, `stop`), calls [`Scope::run_frame`] once
/// per display refresh, and drains [`Scope::drain_events`].
pub struct Scope {
    pub interactions: SlotMap<InteractionKey, Interaction>,
    pub interactables: SlotMap<InteractableKey, Interactable>,
    pub scene: SceneTree,
    pub scheduler: FrameScheduler,
    pub modifiers: Box<dyn ModifierPipeline>,
    pub auto_scroll: AutoScroll,
    pub clock: Box<dyn Clock>,
    pub(crate) events: Vec<Event>,
    next_event_id: u64,
}

impl Scope {
    pub fn new(scene: SceneTree) -> Self {
        Self::with_clock(scene, Box::new(SystemClock::new()))
    }

    pub fn with_clock(scene: SceneTree, clock: Box<dyn Clock>) -> Self {
        Self {
            interactions: SlotMap::with_key(),
            interactables: SlotMap::with_key(),
            scene,
            scheduler: FrameScheduler::default(),
            modifiers: Box::new(NoopModifiers),
            auto_scroll: AutoScroll::default(),
            clock,
            events: Vec::new(),
            next_event_id: 0,
        }
    }

    /// Installs the host's snapping/restriction pipeline.
    pub fn set_modifiers(&mut self, pipeline: Box<dyn ModifierPipeline>) {
        self.modifiers = pipeline;
    }

    pub fn add_interactable(&mut self, interactable: Interactable) -> InteractableKey {
        self.interactables.insert(interactable)
    }

    /// Creates an interaction with an inert simulation state.
    pub fn create_interaction(&mut self) -> InteractionKey {
        self.interactions.insert(Interaction::new())
    }

    /// Marks the interaction as running `action` against `interactable`.
    pub fn start_action(
        &mut self,
        key: InteractionKey,
        action: ActionKind,
        interactable: InteractableKey,
    ) {
        let element = self.interactables[interactable].element;
        let interaction = &mut self.interactions[key];
        interaction.prepared = Some(action);
        interaction.interactable = Some(interactable);
        interaction.element = element;
        interaction.interacting = true;
    }

    /// Pointer-down: a down on an active simulation's bound element resumes
    /// the action; otherwise the pointer is recorded as usual.
    pub fn pointer_down(
        &mut self,
        key: InteractionKey,
        pointer: PointerSample,
        event_target: Option<NodeKey>,
    ) {
        if inertia::resume(self, key, pointer, event_target) {
            return;
        }

        let now = self.clock.now_ms();
        let Some(interaction) = self.interactions.get_mut(key) else {
            return;
        };
        interaction.update_pointer(pointer);
        interaction.refresh_coords(now);
        interaction.coords.copy_prev_from_cur();
    }

    /// Pointer-driven coordinate update plus the auto-scroll edge check.
    pub fn pointer_move(&mut self, key: InteractionKey, pointer: PointerSample) {
        let now = self.clock.now_ms();
        let Some(interaction) = self.interactions.get_mut(key) else {
            return;
        };
        interaction.update_pointer(pointer);
        interaction.coords.copy_prev_from_cur();
        interaction.refresh_coords(now);
        interaction.coords.set_deltas();
        interaction.coords.set_velocity();

        if interaction.interacting() {
            self.trigger_move(key);
        }
    }

    /// Release evaluation plus the normal end.
    ///
    /// Returns true when a simulation took over the end; the host must not
    /// finalize the action, the simulation ends it on completion.
    pub fn end_action(&mut self, key: InteractionKey, no_pre_end: bool) -> bool {
        self.do_end(key, None, no_pre_end)
    }

    /// Cancels any active simulation and, when this interaction drives it,
    /// the auto-scroll session.
    pub fn stop(&mut self, key: InteractionKey) {
        inertia::stop(self, key);
        if self.auto_scroll.interaction() == Some(key) {
            autoscroll::stop(self);
        }
    }

    /// Dispatches every tick due this frame; the host calls it once before
    /// each display refresh.
    pub fn run_frame(&mut self) {
        for handle in self.scheduler.due() {
            if let Some(target) = self.scheduler.take(handle) {
                match target {
                    TickTarget::Inertia(key) => inertia::inertia_tick(self, key),
                    TickTarget::SmoothEnd(key) => inertia::smooth_end_tick(self, key),
                    TickTarget::AutoScroll => autoscroll::scroll_tick(self),
                }
            }
        }
    }

    /// Events fired since the last drain, in firing order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn next_event_id(&mut self) -> u64 {
        self.next_event_id += 1;
        self.next_event_id
    }

    /// Fires a move event and runs the auto-scroll edge check, for pointer
    /// and simulated moves alike.
    pub(crate) fn trigger_move(&mut self, key: InteractionKey) {
        let id = self.next_event_id();
        let Some(interaction) = self.interactions.get(key) else {
            return;
        };
        let Some(action) = interaction.prepared else {
            return;
        };
        let client = interaction.coords.cur.client;

        self.events.push(Event::Interaction(InteractEvent {
            id,
            interaction: key,
            interactable: interaction.interactable,
            target: interaction.element,
            action,
            phase: EventPhase::Move,
            page: interaction.coords.cur.page,
            client,
            timestamp: interaction.coords.cur.timestamp,
        }));

        autoscroll::on_interaction_move(self, key, client);
    }

    pub(crate) fn do_end(
        &mut self,
        key: InteractionKey,
        event_id: Option<u64>,
        no_pre_end: bool,
    ) -> bool {
        if inertia::release(self, key, event_id, no_pre_end) {
            return true;
        }

        let id = match event_id {
            Some(id) => id,
            None => self.next_event_id(),
        };
        let Some(interaction) = self.interactions.get_mut(key) else {
            return false;
        };
        if !interaction.interacting() {
            return false;
        }
        interaction.interacting = false;

        let Some(action) = interaction.prepared else {
            return false;
        };
        self.events.push(Event::Interaction(InteractEvent {
            id,
            interaction: key,
            interactable: interaction.interactable,
            target: interaction.element,
            action,
            phase: EventPhase::End,
            page: interaction.coords.cur.page,
            client: interaction.coords.cur.client,
            timestamp: interaction.coords.cur.timestamp,
        }));

        false
    }
}
