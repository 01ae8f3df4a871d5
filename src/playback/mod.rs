//! Single-active media playback coordination.
//!
//! Every embedded player on a page owns a [`MediaController`]. Controllers
//! share one [`PlaybackBus`]; activating one announces it and every sibling
//! unmounts its embed. A controller whose container scrolls out of view
//! stops on its own without announcing anything.

pub mod bus;
pub mod controller;
pub mod embed;
pub mod identity;
pub mod viewport;

pub use bus::{PlaybackBus, Subscription};
pub use controller::{EmbedHost, MediaController, PlaybackState, StopReason};
pub use embed::{EmbedRequest, EmbedSource, EmbedTemplate};
pub use identity::InstanceId;
#[cfg(target_arch = "wasm32")]
pub use viewport::ElementViewport;
pub use viewport::{
    NoViewport, Observation, ViewportObserver, VisibilityCallback, VisibilityThreshold,
    DEFAULT_VISIBILITY_THRESHOLD,
};
