//! # Scene Configuration
//!
//! Settings shared by every action traversing a scene graph:
//!
//! - **Traversal**: depth guard and bounding-box caching
//! - **Pick**: default pick mode, side and clipping range
//! - **Diagnostics**: degenerate geometry warnings and log filtering
//!
//! All types load from `.toml` or `.ron` through [`Config`].

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::actions::{PickMode, PickSide};
use crate::foundation::logging;

/// Depth-first traversal settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Traversal panics when the node path grows deeper than this
    pub max_depth: usize,
    /// Whether separators cache their bounding boxes
    pub cache_bounding_boxes: bool,
}

impl TraversalConfig {
    /// Create a new traversal configuration
    pub fn new() -> Self {
        Self {
            max_depth: 1024,
            cache_bounding_boxes: true,
        }
    }
    
    /// Set maximum traversal depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
    
    /// Enable or disable separator bounding-box caches
    pub fn with_bounding_box_caching(mut self, enabled: bool) -> Self {
        self.cache_bounding_boxes = enabled;
        self
    }
    
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max traversal depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Default pick behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Which hits are kept
    pub mode: PickMode,
    /// Which faces of closed shapes are reported
    pub side: PickSide,
    /// Hits closer than this along the ray are ignored
    pub near: f32,
    /// Hits farther than this along the ray are ignored
    pub far: f32,
}

impl PickConfig {
    /// Create a new pick configuration
    pub fn new() -> Self {
        Self {
            mode: PickMode::Closest,
            side: PickSide::Front,
            near: 0.0,
            far: f32::MAX,
        }
    }
    
    /// Set pick mode
    pub fn with_mode(mut self, mode: PickMode) -> Self {
        self.mode = mode;
        self
    }
    
    /// Set which faces are picked
    pub fn with_side(mut self, side: PickSide) -> Self {
        self.side = side;
        self
    }
    
    /// Restrict hits to `[near, far]` along the ray
    pub fn with_range(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }
    
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.near.is_nan() || self.far.is_nan() || self.near < 0.0 {
            return Err(ConfigError::Invalid(format!("invalid pick range [{}, {}]", self.near, self.far)));
        }
        if self.far < self.near {
            return Err(ConfigError::Invalid(format!(
                "pick far distance {} is closer than near distance {}",
                self.far, self.near
            )));
        }
        Ok(())
    }
}

impl Default for PickConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostics and logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Warn about degenerate geometry
    pub warnings: bool,
    /// `env_logger` filter installed by [`SceneConfig::apply`]
    pub log_filter: Option<String>,
}

impl DiagnosticsConfig {
    /// Create a new diagnostics configuration
    pub fn new() -> Self {
        Self {
            warnings: cfg!(debug_assertions),
            log_filter: None,
        }
    }
    
    /// Enable or disable geometry warnings
    pub fn with_warnings(mut self, enabled: bool) -> Self {
        self.warnings = enabled;
        self
    }
    
    /// Set the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Scene Configuration
///
/// Top-level configuration handed to actions. Every action keeps its own
/// copy; changing it after construction only affects later traversals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Traversal settings
    pub traversal: TraversalConfig,
    /// Pick settings
    pub pick: PickConfig,
    /// Diagnostics settings
    pub diagnostics: DiagnosticsConfig,
}

impl SceneConfig {
    /// Create a new scene configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Replace traversal settings
    pub fn with_traversal(mut self, traversal: TraversalConfig) -> Self {
        self.traversal = traversal;
        self
    }
    
    /// Replace pick settings
    pub fn with_pick(mut self, pick: PickConfig) -> Self {
        self.pick = pick;
        self
    }
    
    /// Replace diagnostics settings
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticsConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }
    
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.traversal.validate()?;
        self.pick.validate()?;
        Ok(())
    }
    
    /// Push diagnostics settings into the logging layer
    pub fn apply(&self) {
        logging::set_diagnostics(self.diagnostics.warnings);
        if let Some(filter) = &self.diagnostics.log_filter {
            logging::init_with_filter(filter);
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_defaults_validate() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pick.mode, PickMode::Closest);
        assert!(config.traversal.cache_bounding_boxes);
    }
    
    #[test]
    fn test_invalid_values_rejected() {
        let config = SceneConfig::new().with_traversal(TraversalConfig::new().with_max_depth(0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        
        let config = SceneConfig::new().with_pick(PickConfig::new().with_range(5.0, 1.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
    
    #[test]
    fn test_toml_round_trip_through_file() {
        let config = SceneConfig::new()
            .with_pick(PickConfig::new().with_mode(PickMode::All).with_side(PickSide::Back))
            .with_diagnostics(DiagnosticsConfig::new().with_warnings(false));
        let path = std::env::temp_dir().join(format!("rust_scene_config_{}.toml", std::process::id()));
        
        config.save_to_file(&path).unwrap();
        let loaded = SceneConfig::load_from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        
        assert_eq!(loaded, config);
    }
    
    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: SceneConfig = ron::from_str("(traversal: (max_depth: 8))").unwrap();
        assert_eq!(config.traversal.max_depth, 8);
        assert!(config.traversal.cache_bounding_boxes);
        assert_eq!(config.pick, PickConfig::default());
    }
    
    #[test]
    fn test_unsupported_extension() {
        let result = SceneConfig::default().save_to_file("scene.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
