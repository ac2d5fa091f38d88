use glam::Vec4;
use crate::error::ParticleError;

/// A non-empty ordered list of RGBA colors plus the background they are meant to sit on.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Vec4>,
    background: Vec4,
}

impl Palette {
    pub fn new(colors: Vec<Vec4>, background: Vec4) -> Result<Self, ParticleError> {
        if colors.is_empty() {
            return Err(ParticleError::EmptyPalette);
        }
        Ok(Self { colors, background })
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn background(&self) -> Vec4 {
        self.background
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false, kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Palettes the demo cycles through.
    pub fn builtin() -> Vec<Palette> {
        BUILTIN
            .iter()
            .map(|(background, colors)| Palette {
                colors: colors.iter().map(|&hex| rgb(hex)).collect(),
                background: rgb(*background),
            })
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        let (background, colors) = BUILTIN[0];
        Self {
            colors: colors.iter().map(|&hex| rgb(hex)).collect(),
            background: rgb(background),
        }
    }
}

/// Opaque color from a `0xRRGGBB` literal.
pub fn rgb(hex: u32) -> Vec4 {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    Vec4::new(channel(16), channel(8), channel(0), 1.0)
}

const BUILTIN: [(u32, &[u32]); 4] = [
    (0x0b0c10, &[0xf4d35e, 0xee964b, 0xf95738, 0x0d3b66, 0xfaf0ca]),
    (0x101820, &[0x2ec4b6, 0xcbf3f0, 0xffbf69, 0xff9f1c]),
    (0xf2efe9, &[0x264653, 0x2a9d8f, 0xe9c46a, 0xf4a261, 0xe76f51]),
    (0x000000, &[0xffffff, 0x9a8c98, 0x4a4e69]),
];
