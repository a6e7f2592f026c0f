//! Service layer
//!
//! Contains business logic on top of the data layer.
//! Services orchestrate database access, the clock and the engine.

mod checkpoint;
mod notification;
mod tag;

pub use checkpoint::{CheckpointService, PostTimeline, TimelineRow};
pub use notification::NotificationService;
pub use tag::TagService;
