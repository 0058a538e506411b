//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene graph:
//! - Math types and operations
//! - Bounding boxes, plain and transformed
//! - Lines, planes, frusta and camera view volumes
//! - Thread-local storage for per-thread caches
//! - Logging utilities

pub mod math;
pub mod bounds;
pub mod xf_box;
pub mod line;
pub mod view_volume;
pub mod storage;
pub mod logging;

pub use bounds::AABB;
pub use line::{Frustum, Line, Plane};
pub use storage::ThreadStorage;
pub use view_volume::{ProjectionType, ViewVolume};
pub use xf_box::TransformedBox;
