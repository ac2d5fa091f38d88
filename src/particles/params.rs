use serde::{Deserialize, Serialize};
use crate::error::ParticleError;

/// The externally editable scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    NoiseScale,
    NoiseTime,
    AgeLimit,
    Alpha,
    Range,
}

/// What an editor needs to present a parameter: a label, a valid range and a display precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    /// Number of decimals shown by an editor.
    pub precision: u32,
    pub default: f32,
}

impl ParameterDescriptor {
    pub fn contains(&self, value: f32) -> bool {
        value.is_finite() && (self.min..=self.max).contains(&value)
    }

    /// Smallest increment an editor with this precision can produce.
    pub fn step(&self) -> f32 {
        10f32.powi(-(self.precision as i32))
    }
}

impl Parameter {
    pub const ALL: [Parameter; 5] = [
        Parameter::NoiseScale,
        Parameter::NoiseTime,
        Parameter::AgeLimit,
        Parameter::Alpha,
        Parameter::Range,
    ];

    pub fn descriptor(self) -> ParameterDescriptor {
        match self {
            Parameter::NoiseScale => ParameterDescriptor {
                name: "noise_scale",
                label: "Noise scale",
                min: 0.01,
                max: 0.25,
                precision: 3,
                default: 0.05,
            },
            Parameter::NoiseTime => ParameterDescriptor {
                name: "noise_time",
                label: "Noise time",
                min: 0.01,
                max: 1.0,
                precision: 2,
                default: 0.1,
            },
            Parameter::AgeLimit => ParameterDescriptor {
                name: "age_limit",
                label: "Max age",
                min: 0.1,
                max: 20.0,
                precision: 2,
                default: 5.0,
            },
            Parameter::Alpha => ParameterDescriptor {
                name: "alpha",
                label: "Max alpha",
                min: 0.01,
                max: 1.0,
                precision: 2,
                default: 0.4,
            },
            Parameter::Range => ParameterDescriptor {
                name: "range",
                label: "Particles range",
                min: 1.0,
                max: 100.0,
                precision: 1,
                default: 10.0,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Parameter> {
        Parameter::ALL.into_iter().find(|p| p.descriptor().name == name)
    }
}

/// Current values of every [`Parameter`]. Every write goes through the descriptor range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParameters {
    noise_scale: f32,
    noise_time: f32,
    age_limit: f32,
    alpha: f32,
    range: f32,
}

impl Default for ParticleParameters {
    fn default() -> Self {
        Self {
            noise_scale: Parameter::NoiseScale.descriptor().default,
            noise_time: Parameter::NoiseTime.descriptor().default,
            age_limit: Parameter::AgeLimit.descriptor().default,
            alpha: Parameter::Alpha.descriptor().default,
            range: Parameter::Range.descriptor().default,
        }
    }
}

impl ParticleParameters {
    pub fn get(&self, parameter: Parameter) -> f32 {
        match parameter {
            Parameter::NoiseScale => self.noise_scale,
            Parameter::NoiseTime => self.noise_time,
            Parameter::AgeLimit => self.age_limit,
            Parameter::Alpha => self.alpha,
            Parameter::Range => self.range,
        }
    }

    fn slot(&mut self, parameter: Parameter) -> &mut f32 {
        match parameter {
            Parameter::NoiseScale => &mut self.noise_scale,
            Parameter::NoiseTime => &mut self.noise_time,
            Parameter::AgeLimit => &mut self.age_limit,
            Parameter::Alpha => &mut self.alpha,
            Parameter::Range => &mut self.range,
        }
    }

    /// Stores `value` if it lies inside the declared range, rejects it otherwise.
    pub fn set(&mut self, parameter: Parameter, value: f32) -> Result<(), ParticleError> {
        let descriptor = parameter.descriptor();
        if !descriptor.contains(value) {
            return Err(ParticleError::ParameterOutOfRange {
                name: descriptor.name,
                value,
                min: descriptor.min,
                max: descriptor.max,
            });
        }
        *self.slot(parameter) = value;
        Ok(())
    }

    /// Stores `value` clamped into the declared range and returns what was stored.
    /// Non-finite values are still rejected.
    pub fn set_clamped(&mut self, parameter: Parameter, value: f32) -> Result<f32, ParticleError> {
        let descriptor = parameter.descriptor();
        if !value.is_finite() {
            return Err(ParticleError::ParameterOutOfRange {
                name: descriptor.name,
                value,
                min: descriptor.min,
                max: descriptor.max,
            });
        }
        let clamped = value.clamp(descriptor.min, descriptor.max);
        *self.slot(parameter) = clamped;
        Ok(clamped)
    }

    /// Checks every value, used after deserializing.
    pub fn validate(&self) -> Result<(), ParticleError> {
        Parameter::ALL.into_iter().try_for_each(|parameter| {
            let descriptor = parameter.descriptor();
            let value = self.get(parameter);
            if descriptor.contains(value) {
                Ok(())
            } else {
                Err(ParticleError::ParameterOutOfRange {
                    name: descriptor.name,
                    value,
                    min: descriptor.min,
                    max: descriptor.max,
                })
            }
        })
    }

    pub fn noise_scale(&self) -> f32 {
        self.noise_scale
    }

    pub fn noise_time(&self) -> f32 {
        self.noise_time
    }

    pub fn age_limit(&self) -> f32 {
        self.age_limit
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn range(&self) -> f32 {
        self.range
    }
}
