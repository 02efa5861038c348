use crate::foundation::error::{MintError, MintResult};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> MintResult<Self> {
        let canvas = Self { width, height };
        canvas.validate()?;
        Ok(canvas)
    }

    /// Check that both dimensions are positive.
    pub fn validate(self) -> MintResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MintError::configuration("canvas width/height must be > 0"));
        }
        Ok(())
    }

    /// Byte length of an RGBA8 buffer covering the canvas.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Straight-alpha RGBA8 color as written in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(
    /// Channels in `r, g, b, a` order.
    pub [u8; 4],
);

impl Rgba8 {
    /// Premultiplied form of this color.
    pub fn premultiplied(self) -> [u8; 4] {
        let [r, g, b, a] = self.0;
        let a16 = u16::from(a);
        [
            crate::foundation::math::mul_div255_u8(u16::from(r), a16),
            crate::foundation::math::mul_div255_u8(u16::from(g), a16),
            crate::foundation::math::mul_div255_u8(u16::from(b), a16),
            a,
        ]
    }
}
