use slotmap::new_key_type;

use crate::events::InteractEvent;
use crate::options::{ActionKind, AutoScrollOptions, InertiaOptions, PerAction};
use crate::pointer::{CoordsSnapshot, InteractionCoords, PointerSample};
use crate::scene::NodeKey;
use crate::scheduler::TickHandle;

new_key_type! {
    pub struct InteractionKey;
    pub struct InteractableKey;
}

/// A registered interaction target and its per-action configuration.
#[derive(Clone, Debug, Default)]
pub struct Interactable {
    pub element: Option<NodeKey>,
    pub inertia: PerAction<InertiaOptions>,
    pub auto_scroll: PerAction<AutoScrollOptions>,
}

impl Interactable {
    pub fn new(element: NodeKey) -> Self {
        Self {
            element: Some(element),
            ..Self::default()
        }
    }
}

/// Which simulation is currently driving an interaction instead of a
/// pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Simulation {
    Inertia,
    SmoothEnd,
}

/// Post-release simulation bookkeeping, owned by exactly one interaction.
///
/// At most one state is `active` per interaction; while it is, the
/// interaction's `simulation` marker points at it.
#[derive(Clone, Debug, Default)]
pub struct InertiaState {
    pub active: bool,
    pub smooth_end: bool,
    pub allow_resume: bool,
    /// Pointer coordinates at release; ticks apply `(sx, sy)` from here.
    pub up_coords: CoordsSnapshot,
    /// The synthesized inertia-start event; ends the simulated action and
    /// guards against re-triggering from its own end.
    pub start_event: Option<InteractEvent>,
    /// Raw (unconstrained) target displacement per axis.
    pub xe: f64,
    pub ye: f64,
    /// Target displacement after the modifier pipeline.
    pub modified_xe: f64,
    pub modified_ye: f64,
    /// Current simulated offset, recomputed every tick.
    pub sx: f64,
    pub sy: f64,
    /// Simulation start time: seconds for the decay, milliseconds for the
    /// smooth-end ease.
    pub t0: f64,
    /// Decay duration in seconds.
    pub te: f64,
    /// Release speed and its axis components.
    pub v0: f64,
    pub vx0: f64,
    pub vy0: f64,
    /// Precomputed decay coefficients: `resistance / v0` and
    /// `1 - end_speed / v0`.
    pub lambda_v0: f64,
    pub one_ve_v0: f64,
    pub timeout: Option<TickHandle>,
}

/// One in-progress (or simulated) gesture.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    pub interactable: Option<InteractableKey>,
    pub element: Option<NodeKey>,
    pub prepared: Option<ActionKind>,
    pub pointers: Vec<PointerSample>,
    pub coords: InteractionCoords,
    pub inertia: InertiaState,
    pub simulation: Option<Simulation>,
    pub(crate) interacting: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a prepared action is running, pointer-driven or
    /// simulated.
    pub fn interacting(&self) -> bool {
        self.interacting && self.prepared.is_some()
    }

    pub fn simulating(&self) -> bool {
        self.simulation.is_some()
    }

    /// Records a pointer sample, replacing a tracked pointer with the same
    /// id or adding a new one.
    pub fn update_pointer(&mut self, sample: PointerSample) {
        match self
            .pointers
            .iter_mut()
            .find(|pointer| pointer.pointer_id == sample.pointer_id)
        {
            Some(pointer) => *pointer = sample,
            None => self.pointers.push(sample),
        }
    }

    /// Refreshes `coords.cur` from the tracked pointer list.
    pub fn refresh_coords(&mut self, now_ms: f64) {
        self.coords.set_cur(&self.pointers, now_ms);
    }
}
