//! Tree configuration.
//!
//! ```toml
//! capacity = 2
//! max_depth = 5
//! collision_radius = 30.0
//! step = 50.0
//! merge_policy = "empty"
//!
//! [bounds]
//! half_size = 1000.0
//! center = { x = 0.0, y = 0.0, z = 0.0 }
//! ```

use std::path::Path;

use num::cast;
use serde::{Deserialize, Serialize};

use crate::bounding::{Cube, Point, Real};

/// Half extent of the default universe.
pub const DEFAULT_HALF_SIZE: f64 = 1000.0;
/// Points a leaf holds before it subdivides.
pub const DEFAULT_CAPACITY: usize = 2;
/// Deepest level a leaf can be created at.
pub const DEFAULT_MAX_DEPTH: u32 = 5;
/// Minimum distance allowed between two points after a move.
pub const DEFAULT_COLLISION_RADIUS: f64 = 30.0;
/// Distance covered by one directional move.
pub const DEFAULT_STEP: f64 = 50.0;

/// When a branch folds back into a leaf after a removal.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    /// Only when its whole subtree is empty.
    #[default]
    Empty,
    /// As soon as its whole subtree fits into one leaf again.
    Capacity,
}

impl MergePolicy {
    pub fn should_merge(&self, count: usize, capacity: usize) -> bool {
        match self {
            MergePolicy::Empty => count == 0,
            MergePolicy::Capacity => count <= capacity,
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values that can not build a tree
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything needed to build an [`Octree`](crate::tree::Octree).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = ""))]
pub struct TreeConfig<R: Real> {
    /// Universe of the tree. Points outside are rejected.
    pub bounds: Cube<R>,
    pub capacity: usize,
    pub max_depth: u32,
    pub collision_radius: R,
    pub step: R,
    pub merge_policy: MergePolicy,
}

impl<R: Real> Default for TreeConfig<R> {
    fn default() -> Self {
        TreeConfig {
            bounds: Cube::new_unchecked(Point::zero(), real(DEFAULT_HALF_SIZE)),
            capacity: DEFAULT_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            collision_radius: real(DEFAULT_COLLISION_RADIUS),
            step: real(DEFAULT_STEP),
            merge_policy: MergePolicy::default(),
        }
    }
}

fn real<R: Real>(value: f64) -> R {
    cast(value).unwrap_or_else(R::one)
}

impl<R: Real> TreeConfig<R> {
    /// Default configuration over `bounds`.
    pub fn new(bounds: Cube<R>) -> Self {
        TreeConfig {
            bounds,
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_collision_radius(mut self, collision_radius: R) -> Self {
        self.collision_radius = collision_radius;
        self
    }

    pub fn with_step(mut self, step: R) -> Self {
        self.step = step;
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    /// Parses and validates a TOML document. Missing keys take default values.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Cube::new(self.bounds.center, self.bounds.half_size)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;

        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity should be at least 1".into()));
        }
        if !self.collision_radius.is_finite() || self.collision_radius < R::zero() {
            return Err(ConfigError::Invalid(format!(
                "collision radius should be finite and not negative, got {}",
                self.collision_radius
            )));
        }
        if !self.step.is_finite() || self.step < R::zero() {
            return Err(ConfigError::Invalid(format!(
                "step should be finite and not negative, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::<f32>::default();
        assert_eq!(config.bounds.center, Point::zero());
        assert_eq!(config.bounds.half_size, 1000.0);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.collision_radius, 30.0);
        assert_eq!(config.step, 50.0);
        assert_eq!(config.merge_policy, MergePolicy::Empty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = TreeConfig::<f64>::from_toml_str(
            r#"
            capacity = 4
            merge_policy = "capacity"

            [bounds]
            half_size = 500.0
            center = { x = 1.0, y = 2.0, z = 3.0 }
            "#,
        )
        .unwrap();

        assert_eq!(config.capacity, 4);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.merge_policy, MergePolicy::Capacity);
        assert_eq!(config.bounds.half_size, 500.0);
        assert_eq!(config.bounds.center, Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_toml_bounds_without_center() {
        let config = TreeConfig::<f64>::from_toml_str("[bounds]\nhalf_size = 500.0\n").unwrap();
        assert_eq!(config.bounds.center, Point::zero());
        assert_eq!(config.bounds.half_size, 500.0);

        let config = TreeConfig::<f32>::from_toml_str("").unwrap();
        assert_eq!(config, TreeConfig::default());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            TreeConfig::<f64>::from_toml_str("capacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::<f64>::from_toml_str("collision_radius = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::<f64>::from_toml_str(
                "[bounds]\nhalf_size = 0.0\ncenter = { x = 0.0, y = 0.0, z = 0.0 }"
            ),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TreeConfig::<f64>::from_toml_str("capacity = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_merge_policy() {
        assert!(MergePolicy::Empty.should_merge(0, 2));
        assert!(!MergePolicy::Empty.should_merge(1, 2));
        assert!(MergePolicy::Capacity.should_merge(2, 2));
        assert!(!MergePolicy::Capacity.should_merge(3, 2));
    }
}
