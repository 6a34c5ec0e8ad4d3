// Configuration for the editor: `meme.toml`
//
// [templates]
// fist = "assets/fist.png"    # optional; built-in sprite otherwise
// laser = "assets/laser.png"
//
// [hit]
// fraction = 1.0               # 1.0 = whole sprite box, 0.25 = central quarter per axis
//
// [export]
// dir = "."
//
// [controls]
// scale_step = 0.1
// rotation_step = 15.0
// hue_step = 15.0
//
// Every section and key is optional. Command-line flags win over the file.

use crate::error::Error;
use crate::types::OverlayKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "meme.toml";

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse meme.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    pub fist: Option<PathBuf>,
    pub laser: Option<PathBuf>,
}

impl TemplatesConfig {
    pub fn path(&self, kind: OverlayKind) -> Option<&Path> {
        match kind {
            OverlayKind::Fist => self.fist.as_deref(),
            OverlayKind::Laser => self.laser.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitConfig {
    /// Share of each sprite axis that reacts to the pointer, in (0, 1].
    pub fraction: f32,
}

impl Default for HitConfig {
    fn default() -> Self {
        Self { fraction: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory that receives meme.png.
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from(".") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    pub scale_step: f32,
    pub rotation_step: f32,
    pub hue_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self { scale_step: 0.1, rotation_step: 15.0, hue_step: 15.0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub templates: TemplatesConfig,
    pub hit: HitConfig,
    pub export: ExportConfig,
    pub controls: ControlsConfig,
}

/// Command-line values that override the file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub out_dir: Option<PathBuf>,
    pub hit_fraction: Option<f32>,
}

impl EditorConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`; relative template paths are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Explicit path if given, else `meme.toml` in the working directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.is_file() {
            log::info!("using {}", local.display());
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(dir) = &overrides.out_dir {
            self.export.dir = dir.clone();
        }
        if let Some(fraction) = overrides.hit_fraction {
            self.hit.fraction = fraction;
        }
        self.validate()
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for slot in [&mut self.templates.fist, &mut self.templates.laser] {
            if let Some(p) = slot {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }

    /// Collect every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let f = self.hit.fraction;
        if !(f.is_finite() && f > 0.0 && f <= 1.0) {
            errors.push(format!("hit.fraction must be in (0, 1], got {f}"));
        }
        for (name, step) in [
            ("controls.scale_step", self.controls.scale_step),
            ("controls.rotation_step", self.controls.rotation_step),
            ("controls.hue_step", self.controls.hue_step),
        ] {
            if !(step.is_finite() && step > 0.0) {
                errors.push(format!("{name} must be a positive number, got {step}"));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(ConfigError::Validation(errors)) }
    }
}
