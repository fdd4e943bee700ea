//! Startup configuration.
//!
//! Defaults match the stock viewer. A few values can be overridden through
//! environment variables, read once before the window opens.

use std::borrow::Cow;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Replacement WGSL file for the embedded raymarcher
pub(crate) const SHADER_VAR: &str = "RUBIKS_SHADER";
/// Frame rate of the animation tick
pub(crate) const FPS_VAR: &str = "RUBIKS_FPS";
/// Length of one quarter-turn animation, in seconds
pub(crate) const ANIMATION_VAR: &str = "RUBIKS_ANIMATION_SECS";

const EMBEDDED_SHADER: &str = include_str!("shader.wgsl");
const ENTRY_POINTS: [&str; 2] = ["vs_main", "fs_main"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) window_width: f32,
    pub(crate) window_height: f32,
    pub(crate) frames_per_second: u32,
    /// Seconds per quarter turn
    pub(crate) animation_duration: f32,
    /// Extra spread between cubelets at the middle of a turn
    pub(crate) expansion_peak: f32,
    /// Radians of camera rotation per pixel dragged
    pub(crate) drag_sensitivity: f32,
    pub(crate) camera_distance: f32,
    pub(crate) shader_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1920.0,
            window_height: 1080.0,
            frames_per_second: 60,
            animation_duration: 0.4,
            expansion_peak: 2.8,
            drag_sensitivity: 0.01,
            camera_distance: 8.0,
            shader_path: None,
        }
    }
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(SHADER_VAR) {
            config.shader_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup(FPS_VAR) {
            config.frames_per_second = parse(FPS_VAR, &value)?;
            if config.frames_per_second == 0 {
                return Err(invalid(FPS_VAR, &value, "must be at least 1"));
            }
        }
        if let Some(value) = lookup(ANIMATION_VAR) {
            config.animation_duration = parse(ANIMATION_VAR, &value)?;
            if !(config.animation_duration.is_finite() && config.animation_duration > 0.0) {
                return Err(invalid(ANIMATION_VAR, &value, "must be a positive number"));
            }
        }

        Ok(config)
    }

    pub(crate) fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frames_per_second as f64)
    }

    /// Loads the raymarching program, either the embedded one or the file
    /// named by [`SHADER_VAR`].
    pub(crate) fn shader_source(&self) -> Result<Cow<'static, str>> {
        let (source, origin) = match &self.shader_path {
            None => (Cow::Borrowed(EMBEDDED_SHADER), "<embedded>".to_owned()),
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|source| Error::ShaderLoad {
                    path: path.clone(),
                    source,
                })?;
                (Cow::Owned(source), path.display().to_string())
            }
        };

        for entry_point in ENTRY_POINTS {
            if !source.contains(&format!("fn {entry_point}(")) {
                return Err(Error::ShaderEntryPoint {
                    origin,
                    entry_point,
                });
            }
        }

        Ok(source)
    }
}

fn parse<T: FromStr>(var: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(var, value, &e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: &str) -> Error {
    Error::Config {
        var,
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}
