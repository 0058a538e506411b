//! Core scene settings

pub mod config;

pub use config::{DiagnosticsConfig, PickConfig, SceneConfig, TraversalConfig};
