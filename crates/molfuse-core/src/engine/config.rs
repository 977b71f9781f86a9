use crate::core::models::atom::AtomGeometry;
use crate::core::models::collision::CollisionPolicy;
use crate::core::models::molecule::SpeedRange;
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Parameter '{parameter}' must be positive and finite, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("Parameter '{parameter}' must be non-negative and finite, got {value}")]
    Negative { parameter: &'static str, value: f64 },
}

/// Parameters of a fusion scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Edge length of one grid cell.
    pub atom_size: f64,
    /// Length of face direction vectors; one grid step in face units.
    pub normal_size: f64,
    pub hit_box_scale: f64,
    /// Fraction of `atom_size * atom_count` that bounding box centres must
    /// be within for a fusion.
    pub proximity_factor: f64,
    /// Half-extents of the box molecules reflect inside.
    pub bounds: Vector3<f64>,
    pub drift_speed: SpeedRange,
    pub rotation_speed: SpeedRange,
    /// Seed for the scene RNG; entropy is used when absent.
    pub seed: Option<u64>,
    /// Freeze drift after a fusion until [`resume`](super::simulation::Simulation::resume).
    pub pause_on_collision: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let geometry = AtomGeometry::default();
        Self {
            atom_size: geometry.unit_size,
            normal_size: geometry.normal_size,
            hit_box_scale: geometry.hit_box_scale,
            proximity_factor: CollisionPolicy::default().proximity_factor,
            bounds: Vector3::repeat(20.0),
            drift_speed: SpeedRange::DRIFT,
            rotation_speed: SpeedRange::ROTATION,
            seed: None,
            pause_on_collision: false,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("atom_size", self.atom_size)?;
        positive("normal_size", self.normal_size)?;
        positive("hit_box_scale", self.hit_box_scale)?;
        positive("proximity_factor", self.proximity_factor)?;
        positive("bounds.x", self.bounds.x)?;
        positive("bounds.y", self.bounds.y)?;
        positive("bounds.z", self.bounds.z)?;
        speed_range("drift_speed", &self.drift_speed)?;
        speed_range("rotation_speed", &self.rotation_speed)?;
        Ok(())
    }

    pub fn atom_geometry(&self) -> AtomGeometry {
        AtomGeometry {
            unit_size: self.atom_size,
            normal_size: self.normal_size,
            hit_box_scale: self.hit_box_scale,
        }
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        CollisionPolicy {
            proximity_factor: self.proximity_factor,
        }
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { parameter, value })
    }
}

fn non_negative(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { parameter, value })
    }
}

fn speed_range(parameter: &'static str, range: &SpeedRange) -> Result<(), ConfigError> {
    non_negative(parameter, range.min)?;
    non_negative(parameter, range.spread)?;
    non_negative(parameter, range.factor)
}

#[derive(Default)]
pub struct SimulationConfigBuilder {
    config: SimulationConfig,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_size(mut self, size: f64) -> Self {
        self.config.atom_size = size;
        self
    }
    pub fn normal_size(mut self, size: f64) -> Self {
        self.config.normal_size = size;
        self
    }
    pub fn hit_box_scale(mut self, scale: f64) -> Self {
        self.config.hit_box_scale = scale;
        self
    }
    pub fn proximity_factor(mut self, factor: f64) -> Self {
        self.config.proximity_factor = factor;
        self
    }
    pub fn bounds(mut self, bounds: Vector3<f64>) -> Self {
        self.config.bounds = bounds;
        self
    }
    pub fn drift_speed(mut self, range: SpeedRange) -> Self {
        self.config.drift_speed = range;
        self
    }
    pub fn rotation_speed(mut self, range: SpeedRange) -> Self {
        self.config.rotation_speed = range;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.config.seed = seed;
        self
    }
    pub fn pause_on_collision(mut self, pause: bool) -> Self {
        self.config.pause_on_collision = pause;
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parameters of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub initial_molecules: usize,
    pub ticks: u64,
    /// Seconds advanced per tick, fed to atom animation clocks.
    pub tick_delta: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            initial_molecules: 8,
            ticks: 600,
            tick_delta: 1.0 / 60.0,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tick_delta", self.tick_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.atom_size, 4.0);
        assert_eq!(config.normal_size, 1.0);
        assert_eq!(config.hit_box_scale, 1.1);
        assert_eq!(config.proximity_factor, 0.5);
        assert_eq!(config.bounds, Vector3::new(20.0, 20.0, 20.0));
        assert!(!config.pause_on_collision);
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = SimulationConfigBuilder::new()
            .atom_size(2.0)
            .bounds(Vector3::new(5.0, 6.0, 7.0))
            .seed(Some(42))
            .pause_on_collision(true)
            .build()
            .unwrap();
        assert_eq!(config.atom_size, 2.0);
        assert_eq!(config.bounds, Vector3::new(5.0, 6.0, 7.0));
        assert_eq!(config.seed, Some(42));
        assert!(config.pause_on_collision);
        assert_eq!(config.atom_geometry().unit_size, 2.0);
        assert_eq!(config.collision_policy().proximity_factor, 0.5);
    }

    #[test]
    fn builder_rejects_non_positive_sizes() {
        let err = SimulationConfigBuilder::new().atom_size(0.0).build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositive {
                parameter: "atom_size",
                value: 0.0
            }
        );

        let err = SimulationConfigBuilder::new()
            .bounds(Vector3::new(1.0, -1.0, 1.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { parameter: "bounds.y", .. }));

        let err = SimulationConfigBuilder::new()
            .proximity_factor(f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NonPositive { parameter: "proximity_factor", .. }));
    }

    #[test]
    fn negative_speed_is_rejected() {
        let err = SimulationConfigBuilder::new()
            .drift_speed(SpeedRange {
                min: -0.1,
                ..SpeedRange::DRIFT
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Negative { parameter: "drift_speed", .. }));
    }

    #[test]
    fn run_config_requires_positive_delta() {
        let run = RunConfig {
            tick_delta: 0.0,
            ..RunConfig::default()
        };
        assert!(run.validate().is_err());
    }
}
