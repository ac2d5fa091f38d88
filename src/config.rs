//! Settings for the demo application, read from a JSON file.

use std::fs;
use std::path::Path;
use anyhow::Context;
use glam::Vec4;
use serde::{Deserialize, Serialize};
use crate::error::ParticleError;
use crate::particles::geometry::GeometryTemplate;
use crate::particles::palette::Palette;
use crate::particles::params::ParticleParameters;
use crate::particles::particle_system::{ParticleSystemDescriptor, DEFAULT_RESOLUTION};
use crate::particles::shading::{ColorMode, OrientationMode};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaletteSettings {
    pub background: [f32; 4],
    pub colors: Vec<[f32; 4]>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub resolution: u32,
    pub seed: Option<u64>,
    pub parameters: ParticleParameters,
    /// Palettes cycled with `P`. The built-in set is used when empty.
    pub palettes: Vec<PaletteSettings>,
    pub orientation_mode: OrientationMode,
    pub color_mode: ColorMode,
    pub instance_scale: f32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            seed: None,
            parameters: ParticleParameters::default(),
            palettes: Vec::new(),
            orientation_mode: OrientationMode::default(),
            color_mode: ColorMode::default(),
            instance_scale: 1.0,
            window_width: 1080,
            window_height: 1080,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads the file named by the first command line argument, defaults without one.
    pub fn from_args() -> anyhow::Result<Self> {
        match std::env::args().nth(1) {
            Some(path) => {
                log::info!("Loading settings from {path}");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn palettes(&self) -> Result<Vec<Palette>, ParticleError> {
        if self.palettes.is_empty() {
            return Ok(Palette::builtin());
        }
        self.palettes
            .iter()
            .map(|palette| {
                Palette::new(
                    palette.colors.iter().copied().map(Vec4::from_array).collect(),
                    Vec4::from_array(palette.background),
                )
            })
            .collect()
    }

    /// Validated construction parameters, using the first palette.
    pub fn descriptor(&self) -> Result<ParticleSystemDescriptor, ParticleError> {
        let palette = self.palettes()?.into_iter().next().ok_or(ParticleError::EmptyPalette)?;
        let descriptor = ParticleSystemDescriptor {
            resolution: self.resolution,
            seed: self.seed,
            geometry: GeometryTemplate::billboard_quad(),
            palette,
            parameters: self.parameters,
            orientation_mode: self.orientation_mode,
            color_mode: self.color_mode,
            instance_scale: self.instance_scale,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}
