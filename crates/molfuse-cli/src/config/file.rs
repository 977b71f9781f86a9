use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use molfuse::core::models::molecule::SpeedRange;
use molfuse::engine::config::{RunConfig, SimulationConfig, SimulationConfigBuilder};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAtomsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_box_scale: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCollisionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_on_collision: Option<bool>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileWorldConfig {
    /// Half-extents `[x, y, z]` of the box molecules reflect inside.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMotionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_factor: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub molecules: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_delta: Option<f64>,
}

/// The on-disk configuration. Every value is optional; anything left out
/// falls back to the library defaults.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub atoms: FileAtomsConfig,
    #[serde(default)]
    pub collision: FileCollisionConfig,
    #[serde(default)]
    pub world: FileWorldConfig,
    #[serde(default)]
    pub motion: FileMotionConfig,
    #[serde(default)]
    pub run: FileRunConfig,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// A file config with every key filled in from the library defaults.
    pub fn defaults() -> Self {
        let sim = SimulationConfig::default();
        let run = RunConfig::default();
        Self {
            atoms: FileAtomsConfig {
                size: Some(sim.atom_size),
                normal_size: Some(sim.normal_size),
                hit_box_scale: Some(sim.hit_box_scale),
            },
            collision: FileCollisionConfig {
                proximity_factor: Some(sim.proximity_factor),
                pause_on_collision: Some(sim.pause_on_collision),
            },
            world: FileWorldConfig {
                bounds: Some(sim.bounds.into()),
                seed: sim.seed,
            },
            motion: FileMotionConfig {
                speed_min: Some(sim.drift_speed.min),
                speed_spread: Some(sim.drift_speed.spread),
                drift_factor: Some(sim.drift_speed.factor),
                rotation_factor: Some(sim.rotation_speed.factor),
            },
            run: FileRunConfig {
                molecules: Some(run.initial_molecules),
                ticks: Some(run.ticks),
                tick_delta: Some(run.tick_delta),
            },
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Other(e.into()))
    }

    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<(SimulationConfig, RunConfig)> {
        self.apply_cli_flags(args);
        self.apply_set_values(&args.set_values)?;
        self.resolve()
    }

    fn apply_cli_flags(&mut self, args: &RunArgs) {
        if let Some(ticks) = args.ticks {
            self.run.ticks = Some(ticks);
        }
        if let Some(molecules) = args.molecules {
            self.run.molecules = Some(molecules);
        }
        if let Some(delta) = args.delta {
            self.run.tick_delta = Some(delta);
        }
        if let Some(seed) = args.seed {
            self.world.seed = Some(seed);
        }
        if args.pause_on_collision {
            self.collision.pause_on_collision = Some(true);
        }
    }

    fn resolve(self) -> Result<(SimulationConfig, RunConfig)> {
        let defaults = SimulationConfig::default();
        let speed_min = self.motion.speed_min.unwrap_or(defaults.drift_speed.min);
        let speed_spread = self
            .motion
            .speed_spread
            .unwrap_or(defaults.drift_speed.spread);

        let simulation = SimulationConfigBuilder::new()
            .atom_size(self.atoms.size.unwrap_or(defaults.atom_size))
            .normal_size(self.atoms.normal_size.unwrap_or(defaults.normal_size))
            .hit_box_scale(self.atoms.hit_box_scale.unwrap_or(defaults.hit_box_scale))
            .proximity_factor(
                self.collision
                    .proximity_factor
                    .unwrap_or(defaults.proximity_factor),
            )
            .pause_on_collision(
                self.collision
                    .pause_on_collision
                    .unwrap_or(defaults.pause_on_collision),
            )
            .bounds(self.world.bounds.map(Vector3::from).unwrap_or(defaults.bounds))
            .seed(self.world.seed)
            .drift_speed(SpeedRange {
                min: speed_min,
                spread: speed_spread,
                factor: self.motion.drift_factor.unwrap_or(defaults.drift_speed.factor),
            })
            .rotation_speed(SpeedRange {
                min: speed_min,
                spread: speed_spread,
                factor: self
                    .motion
                    .rotation_factor
                    .unwrap_or(defaults.rotation_speed.factor),
            })
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let run_defaults = RunConfig::default();
        let run = RunConfig {
            initial_molecules: self.run.molecules.unwrap_or(run_defaults.initial_molecules),
            ticks: self.run.ticks.unwrap_or(run_defaults.ticks),
            tick_delta: self.run.tick_delta.unwrap_or(run_defaults.tick_delta),
        };
        run.validate().map_err(|e| CliError::Config(e.to_string()))?;

        Ok((simulation, run))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "atoms.size" => self.atoms.size = Some(parse_value(key, value_str)?),
                "atoms.normal-size" => self.atoms.normal_size = Some(parse_value(key, value_str)?),
                "atoms.hit-box-scale" => {
                    self.atoms.hit_box_scale = Some(parse_value(key, value_str)?)
                }
                "collision.proximity-factor" => {
                    self.collision.proximity_factor = Some(parse_value(key, value_str)?)
                }
                "collision.pause-on-collision" => {
                    self.collision.pause_on_collision = Some(parse_value(key, value_str)?)
                }
                "world.bounds" => self.world.bounds = Some(parse_bounds(key, value_str)?),
                "world.seed" => self.world.seed = Some(parse_value(key, value_str)?),
                "motion.speed-min" => self.motion.speed_min = Some(parse_value(key, value_str)?),
                "motion.speed-spread" => {
                    self.motion.speed_spread = Some(parse_value(key, value_str)?)
                }
                "motion.drift-factor" => {
                    self.motion.drift_factor = Some(parse_value(key, value_str)?)
                }
                "motion.rotation-factor" => {
                    self.motion.rotation_factor = Some(parse_value(key, value_str)?)
                }
                "run.molecules" => self.run.molecules = Some(parse_value(key, value_str)?),
                "run.ticks" => self.run.ticks = Some(parse_value(key, value_str)?),
                "run.tick-delta" => self.run.tick_delta = Some(parse_value(key, value_str)?),
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str) -> Result<T> {
    value_str.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value_str
        ))
    })
}

/// Accepts either one half-extent for all axes or three comma separated ones.
fn parse_bounds(key: &str, value_str: &str) -> Result<[f64; 3]> {
    let parts = value_str
        .split(',')
        .map(|part| parse_value::<f64>(key, part))
        .collect::<Result<Vec<_>>>()?;
    match parts.as_slice() {
        [all] => Ok([*all; 3]),
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(CliError::Config(format!(
            "Invalid value for {}: expected one or three numbers, got '{}'",
            key, value_str
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("scene.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn args_with(set_values: &[&str]) -> RunArgs {
        RunArgs {
            set_values: set_values.iter().map(|s| s.to_string()).collect(),
            ..RunArgs::default()
        }
    }

    #[test]
    fn empty_config_resolves_to_library_defaults() {
        let (simulation, run) = FileConfig::default().merge_with_cli(&RunArgs::default()).unwrap();
        assert_eq!(simulation, SimulationConfig::default());
        assert_eq!(run, RunConfig::default());
    }

    #[test]
    fn load_from_file_and_merge_with_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [atoms]
            size = 2.0

            [world]
            bounds = [10.0, 12.0, 14.0]
            seed = 99

            [motion]
            drift-factor = 0.2

            [run]
            ticks = 30
            "#,
        );

        let (simulation, run) = FileConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&RunArgs::default())
            .unwrap();

        assert_eq!(simulation.atom_size, 2.0);
        assert_eq!(simulation.normal_size, 1.0);
        assert_eq!(simulation.bounds, Vector3::new(10.0, 12.0, 14.0));
        assert_eq!(simulation.seed, Some(99));
        assert_eq!(simulation.drift_speed.factor, 0.2);
        assert_eq!(simulation.rotation_speed.factor, 0.01);
        assert_eq!(run.ticks, 30);
        assert_eq!(run.initial_molecules, 8);
    }

    #[test]
    fn cli_flags_override_file_values() {
        let file = FileConfig {
            run: FileRunConfig {
                ticks: Some(30),
                molecules: Some(3),
                tick_delta: None,
            },
            world: FileWorldConfig {
                bounds: None,
                seed: Some(1),
            },
            ..FileConfig::default()
        };
        let args = RunArgs {
            ticks: Some(45),
            seed: Some(2),
            pause_on_collision: true,
            ..RunArgs::default()
        };

        let (simulation, run) = file.merge_with_cli(&args).unwrap();
        assert_eq!(run.ticks, 45);
        assert_eq!(run.initial_molecules, 3);
        assert_eq!(simulation.seed, Some(2));
        assert!(simulation.pause_on_collision);
    }

    #[test]
    fn set_values_override_flags_and_file() {
        let file = FileConfig {
            collision: FileCollisionConfig {
                proximity_factor: Some(0.4),
                pause_on_collision: None,
            },
            ..FileConfig::default()
        };
        let mut args = args_with(&[
            "collision.proximity-factor=0.75",
            "run.ticks=5",
            "world.bounds=8",
            "motion.speed-min=0.5",
        ]);
        args.ticks = Some(100);

        let (simulation, run) = file.merge_with_cli(&args).unwrap();
        assert_eq!(simulation.proximity_factor, 0.75);
        assert_eq!(run.ticks, 5);
        assert_eq!(simulation.bounds, Vector3::repeat(8.0));
        assert_eq!(simulation.drift_speed.min, 0.5);
        assert_eq!(simulation.rotation_speed.min, 0.5);
    }

    #[test]
    fn three_component_bounds_are_accepted() {
        assert_eq!(parse_bounds("world.bounds", "1, 2,3").unwrap(), [1.0, 2.0, 3.0]);
        assert!(parse_bounds("world.bounds", "1,2").is_err());
        assert!(parse_bounds("world.bounds", "a").is_err());
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["run.ticks", "run.ticks=many", "physics.gravity=9.8"] {
            let result = FileConfig::default().merge_with_cli(&args_with(&[bad]));
            assert!(matches!(result, Err(CliError::Config(_))), "{bad} was accepted");
        }
    }

    #[test]
    fn invalid_values_fail_validation() {
        let result = FileConfig::default().merge_with_cli(&args_with(&["atoms.size=0"]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("atom_size")));

        let result = FileConfig::default().merge_with_cli(&args_with(&["run.tick-delta=-1"]));
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("tick_delta")));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "[atoms]\ncolour = \"red\"\n");
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = FileConfig::defaults().to_toml().unwrap();
        assert!(text.contains("[atoms]"));
        assert!(text.contains("proximity-factor = 0.5"));
        assert!(!text.contains("seed"));

        let parsed: FileConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, FileConfig::defaults());
        let (simulation, run) = parsed.merge_with_cli(&RunArgs::default()).unwrap();
        assert_eq!(simulation, SimulationConfig::default());
        assert_eq!(run, RunConfig::default());
    }
}
