use crate::interaction::{InteractableKey, InteractionKey};
use crate::options::ActionKind;
use crate::pointer::Point;
use crate::scene::{NodeKey, ScrollContainer};

/// Lifecycle phase an interaction event is tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    /// A simulation took over the end of a pointer-driven action.
    InertiaStart,
    Move,
    End,
    /// A pointer-down reclaimed a simulated action.
    Resume,
}

/// A phase-tagged interaction event.
///
/// `id` is assigned monotonically by the scope; the release evaluation uses
/// it to recognize the event that started the current simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractEvent {
    pub id: u64,
    pub interaction: InteractionKey,
    pub interactable: Option<InteractableKey>,
    pub target: Option<NodeKey>,
    pub action: ActionKind,
    pub phase: EventPhase,
    pub page: Point,
    pub client: Point,
    pub timestamp: f64,
}

/// Fired on the interactable whenever an auto-scroll tick actually moved
/// its container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoScrollEvent {
    pub interactable: InteractableKey,
    pub target: Option<NodeKey>,
    pub delta: Point,
    pub container: ScrollContainer,
    pub interaction: InteractionKey,
}

/// Everything the scope reports back to the embedding host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Interaction(InteractEvent),
    /// The resume signal, distinct from the resume-phase event: observers
    /// use it to note that the interaction is pointer-driven again.
    ActionResume { interaction: InteractionKey },
    AutoScroll(AutoScrollEvent),
}
