use crate::interaction::Interaction;
use crate::pointer::Point;

/// Arguments for one modifier-pipeline invocation.
///
/// A fresh value is built per call; the pipeline never sees a reused,
/// mutated argument object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModifierArgs {
    /// The proposed end position in page coordinates.
    pub page_coords: Point,
    /// The position the proposal moved from, when relevant.
    pub prev_coords: Option<Point>,
    /// Set while evaluating an end that has not been finalized.
    pub pre_end: bool,
    /// Restrict to modifiers flagged end-only.
    pub require_end_only: bool,
}

/// What the pipeline did to the proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModifierResult {
    pub delta: Point,
    pub changed: bool,
}

/// The snapping/restriction pipeline boundary. The internal algorithms are
/// the host's business; the controllers only consume the adjusted delta.
pub trait ModifierPipeline {
    fn set_all(&mut self, interaction: &Interaction, args: ModifierArgs) -> ModifierResult;
}

/// Pipeline used when no modifiers are installed: zero delta, unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopModifiers;

impl ModifierPipeline for NoopModifiers {
    fn set_all(&mut self, _interaction: &Interaction, _args: ModifierArgs) -> ModifierResult {
        ModifierResult::default()
    }
}
