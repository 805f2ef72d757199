use smol_str::SmolStr;
use thiserror::Error;

use crate::scene::NodeKey;

/// The action kinds an interaction can prepare.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Drag,
    Resize,
    Gesture,
}

/// One value per action kind, resolved through an explicit mapping.
#[derive(Clone, Debug, Default)]
pub struct PerAction<T> {
    pub drag: T,
    pub resize: T,
    pub gesture: T,
}

impl<T> PerAction<T> {
    pub fn get(&self, kind: ActionKind) -> &T {
        match kind {
            ActionKind::Drag => &self.drag,
            ActionKind::Resize => &self.resize,
            ActionKind::Gesture => &self.gesture,
        }
    }

    pub fn get_mut(&mut self, kind: ActionKind) -> &mut T {
        match kind {
            ActionKind::Drag => &mut self.drag,
            ActionKind::Resize => &mut self.resize,
            ActionKind::Gesture => &mut self.gesture,
        }
    }
}

impl<T: Clone> PerAction<T> {
    /// The same configuration for every action kind.
    pub fn splat(value: T) -> Self {
        Self {
            drag: value.clone(),
            resize: value.clone(),
            gesture: value,
        }
    }
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("inertia resistance must be positive, got {0}")]
    NonPositiveResistance(f64),

    #[error("inertia end speed must be positive, got {0}")]
    NonPositiveEndSpeed(f64),

    #[error("inertia minimum speed must not be negative, got {0}")]
    NegativeMinSpeed(f64),

    #[error("smooth-end duration must not be negative, got {0}")]
    NegativeSmoothEndDuration(f64),

    #[error("auto-scroll margin must not be negative, got {0}")]
    NegativeMargin(f64),

    #[error("auto-scroll speed must not be negative, got {0}")]
    NegativeSpeed(f64),
}

/// Post-release momentum configuration for one action kind.
#[derive(Clone, Debug, PartialEq)]
pub struct InertiaOptions {
    pub enabled: bool,
    /// The lambda in the exponential velocity decay.
    pub resistance: f64,
    /// Release speed must exceed this for inertia to start.
    pub min_speed: f64,
    /// The speed at which the decay is slow enough to stop.
    pub end_speed: f64,
    /// Allow a pointer-down on the target to take the simulation over.
    pub allow_resume: bool,
    /// Duration (ms) of the eased correction used when a modifier changes
    /// the endpoint but inertia does not trigger.
    pub smooth_end_duration: f64,
}

impl Default for InertiaOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            resistance: 10.0,
            min_speed: 100.0,
            end_speed: 10.0,
            allow_resume: true,
            smooth_end_duration: 300.0,
        }
    }
}

impl InertiaOptions {
    /// Surfaces misconfiguration before it reaches the simulation; the
    /// simulation itself does not guard these.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.resistance <= 0.0 {
            return Err(OptionsError::NonPositiveResistance(self.resistance));
        }
        if self.end_speed <= 0.0 {
            return Err(OptionsError::NonPositiveEndSpeed(self.end_speed));
        }
        if self.min_speed < 0.0 {
            return Err(OptionsError::NegativeMinSpeed(self.min_speed));
        }
        if self.smooth_end_duration < 0.0 {
            return Err(OptionsError::NegativeSmoothEndDuration(
                self.smooth_end_duration,
            ));
        }
        Ok(())
    }
}

/// The container an auto-scroll session scrolls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ContainerOption {
    #[default]
    Viewport,
    Node(NodeKey),
    /// Resolved against the interaction's element at use time; falls back
    /// to the viewport when nothing matches.
    Named(SmolStr),
}

/// Edge auto-scroll configuration for one action kind.
#[derive(Clone, Debug, PartialEq)]
pub struct AutoScrollOptions {
    pub enabled: bool,
    /// Distance (px) from a container edge inside which scrolling engages.
    pub margin: f64,
    pub container: ContainerOption,
    /// Scroll speed in pixels per second.
    pub speed: f64,
}

impl Default for AutoScrollOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            margin: 60.0,
            container: ContainerOption::Viewport,
            speed: 300.0,
        }
    }
}

impl AutoScrollOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.margin < 0.0 {
            return Err(OptionsError::NegativeMargin(self.margin));
        }
        if self.speed < 0.0 {
            return Err(OptionsError::NegativeSpeed(self.speed));
        }
        Ok(())
    }
}
