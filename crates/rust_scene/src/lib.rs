//! # Rust Scene
//!
//! A retained-mode 3D scene graph traversed by actions.
//!
//! ## Features
//!
//! - **Shared Subgraphs**: nodes are reference counted and may have several parents
//! - **Acyclic by Construction**: cycles are rejected when a child is attached
//! - **Element State**: copy-on-write element stacks restored on every pop
//! - **Actions**: bounding box, ray and volume picking, render lists, search, callbacks, outline writing
//! - **Transformed Boxes**: oriented bounds that keep whichever frame is tighter
//! - **Per-Thread Caches**: separators cache bounding boxes per thread
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use rust_scene::prelude::*;
//!
//! let root = Arc::new(Separator::new());
//! let transform = Transform::new();
//! transform.set_translation(Vec3::new(5.0, 0.0, 0.0));
//! root.add_child(Arc::new(transform)).unwrap();
//! root.add_child(Arc::new(Cube::new())).unwrap();
//! let root: NodeRef = root;
//!
//! let mut pick = PickAction::new(PickTarget::Ray(Line::new(Vec3::new(5.0, 0.0, -10.0), Vec3::z())));
//! pick.apply(&root);
//! let hit = pick.picked_point().unwrap();
//! assert!((hit.point - Vec3::new(5.0, 0.0, -0.5)).norm() < 1e-5);
//! ```

#![warn(missing_docs)]

pub mod actions;
pub mod config;
pub mod core;
pub mod elements;
pub mod error;
pub mod foundation;
pub mod nodes;

pub use error::{SceneError, SceneResult};

#[cfg(test)]
mod tests;

/// Common imports for scene graph users
pub mod prelude {
    pub use crate::{
        actions::{
            Action, BoundingBoxAction, CallbackAction, CallbackResponse, DrawCommand, Interest, NodePath,
            PickAction, PickDetail, PickMode, PickSide, PickTarget, PickedPoint, Primitive, RenderAction,
            RenderList, SearchAction, SearchCriteria, TransparencyMode, WriteAction,
        },
        config::Config,
        core::{DiagnosticsConfig, PickConfig, SceneConfig, TraversalConfig},
        elements::{
            DrawMode, DrawStyleElement, MaterialElement, ModelMatrixElement, PickRayElement, State,
            ViewVolumeElement,
        },
        foundation::{
            math::{Mat4, Mat4Ext, Quat, Vec2, Vec3},
            Line, TransformedBox, ViewVolume, AABB,
        },
        nodes::{
            Camera, CameraProjection, Cube, DrawStyle, Group, GroupNode, Material, MatrixTransform, Node, NodeId,
            NodeRef, Separator, Sphere, Switch, SwitchChoice, Transform,
        },
        SceneError, SceneResult,
    };
}
