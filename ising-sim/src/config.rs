use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{MagnetoError, MagnetoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "metropolis")]
    Metropolis,
    #[serde(rename = "sw")]
    SwendsenWang,
}

impl TryFrom<&str> for Algorithm {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "metropolis" => Ok(Self::Metropolis),
            "sw" => Ok(Self::SwendsenWang),
            _ => Err(format!("unknown algorithm '{s}', expected 'metropolis' or 'sw'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempMode {
    Single,
    Many,
    Image,
}

impl TryFrom<&str> for TempMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "single" => Ok(Self::Single),
            "many" => Ok(Self::Many),
            "image" => Ok(Self::Image),
            _ => Err(format!(
                "unknown temp_mode '{s}', expected 'single', 'many', or 'image'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrMovie {
    #[default]
    None,
    Movie,
    Intervals,
}

fn default_blend_frames() -> usize {
    1
}

fn default_frame_interval() -> usize {
    100
}

/// Visual-output settings, passed through to [`crate::visual`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMode {
    #[serde(default)]
    pub mode: ImageOrMovie,
    /// Frames averaged into one movie frame.
    #[serde(default = "default_blend_frames")]
    pub blend_frames: usize,
    /// Keep every n-th frame in interval mode.
    #[serde(default = "default_frame_interval")]
    pub frame_interval: usize,
}

impl Default for ImageMode {
    fn default() -> Self {
        Self {
            mode: ImageOrMovie::None,
            blend_frames: default_blend_frames(),
            frame_interval: default_frame_interval(),
        }
    }
}

fn default_format() -> String {
    "{T:.4} {E:.6} {cv:.6} {M:.6} {chi:.6}".to_string()
}

fn default_outputfile() -> PathBuf {
    PathBuf::from("results.txt")
}

/// Where and how per-temperature results are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Line template with `{T}`, `{E}`, `{cv}`, `{M}` and `{chi}` placeholders.
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_outputfile")]
    pub outputfile: PathBuf,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            outputfile: default_outputfile(),
        }
    }
}

fn validate_job(job: &Job) -> Result<(), ValidationError> {
    if job.lattice_size < 1 {
        return Err(ValidationError::new("L must be >= 1"));
    }
    if job.n < 2 {
        return Err(ValidationError::new("n must be >= 2"));
    }
    match job.temp_mode {
        TempMode::Single => match job.t_single {
            Some(t) if t > 0.0 && t.is_finite() => {}
            Some(_) => return Err(ValidationError::new("t_single must be > 0")),
            None => {
                return Err(ValidationError::new("temp_mode 'single' requires t_single"));
            }
        },
        TempMode::Many => {
            let (Some(t_min), Some(t_max)) = (job.t_min, job.t_max) else {
                return Err(ValidationError::new("temp_mode 'many' requires t_min and t_max"));
            };
            if !(t_min > 0.0 && t_min < t_max && t_max.is_finite()) {
                return Err(ValidationError::new("require 0 < t_min < t_max"));
            }
            if job.temp_steps < 2 {
                return Err(ValidationError::new("temp_steps must be >= 2"));
            }
        }
        TempMode::Image => {}
    }
    if job.image_mode.blend_frames < 1 {
        return Err(ValidationError::new("blend_frames must be >= 1"));
    }
    if job.image_mode.frame_interval < 1 {
        return Err(ValidationError::new("frame_interval must be >= 1"));
    }
    if job.rng_threads == Some(0) {
        return Err(ValidationError::new("rng_threads must be >= 1"));
    }
    Ok(())
}

fn default_temp_steps() -> usize {
    2
}

fn default_coupling() -> i32 {
    1
}

/// One simulation job: lattice, algorithm, temperatures and run lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_job"))]
pub struct Job {
    /// Lattice side L.
    #[serde(rename = "L")]
    pub lattice_size: usize,
    #[serde(default = "default_coupling")]
    pub j: i32,
    pub algorithm: Algorithm,
    pub temp_mode: TempMode,
    #[serde(default)]
    pub t_single: Option<f64>,
    #[serde(default)]
    pub t_min: Option<f64>,
    #[serde(default)]
    pub t_max: Option<f64>,
    #[serde(default = "default_temp_steps")]
    pub temp_steps: usize,
    /// Measurement iterations per temperature.
    pub n: usize,
    /// Warmup sweeps per temperature.
    #[serde(default)]
    pub start_runs: usize,
    #[serde(default)]
    pub image_mode: ImageMode,
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Optional starting configuration instead of random spins.
    #[serde(default)]
    pub initial_lattice: Option<PathBuf>,
    /// Seed for the initial random spins. Engine randomness is always
    /// time-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
    /// RNG worker threads; defaults to the number of cores.
    #[serde(default)]
    pub rng_threads: Option<usize>,
}

impl Job {
    /// Parse and validate a job from JSON text.
    pub fn from_json(text: &str) -> MagnetoResult<Self> {
        let job: Job = serde_json::from_str(text)?;
        job.check()?;
        Ok(job)
    }

    /// Read, parse and validate a job file.
    pub fn load(path: &Path) -> MagnetoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn check(&self) -> MagnetoResult<()> {
        self.validate()
            .map_err(|e| MagnetoError::InvalidConfig(format!("{e}")))
    }

    /// Temperatures this job runs at, in ascending order.
    pub fn temperatures(&self) -> MagnetoResult<Vec<f64>> {
        match self.temp_mode {
            TempMode::Single => self
                .t_single
                .map(|t| vec![t])
                .ok_or_else(|| MagnetoError::InvalidConfig("missing t_single".to_string())),
            TempMode::Many => match (self.t_min, self.t_max) {
                (Some(t_min), Some(t_max)) => Ok(temperature_ladder(t_min, t_max, self.temp_steps)),
                _ => Err(MagnetoError::InvalidConfig(
                    "missing t_min or t_max".to_string(),
                )),
            },
            TempMode::Image => Err(MagnetoError::UnimplementedMode("image".to_string())),
        }
    }
}

/// `n` equidistant temperatures from `t_min` to `t_max` inclusive.
pub fn temperature_ladder(t_min: f64, t_max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![t_min],
        _ => {
            let step = (t_max - t_min) / (n - 1) as f64;
            (0..n).map(|i| t_min + step * i as f64).collect()
        }
    }
}
