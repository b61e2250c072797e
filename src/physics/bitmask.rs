//! Per-pixel opacity masks for exact shape overlap
//!
//! One boolean per pixel, row-major. Built from RGBA sprite pixels by
//! thresholding alpha.

/// Boolean opacity mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Bitmask {
    /// Fully opaque mask
    pub fn solid(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Threshold an RGBA buffer (4 bytes per pixel). A pixel is solid when its
    /// alpha, as a fraction of 255, is strictly above `transparency`.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_rgba(pixels: &[u8], width: usize, height: usize, transparency: f32) -> Option<Self> {
        if pixels.len() != width * height * 4 {
            log::warn!(
                "RGBA buffer of {} bytes does not match {}x{} sprite",
                pixels.len(),
                width,
                height
            );
            return None;
        }

        let bits = pixels
            .chunks_exact(4)
            .map(|px| px[3] as f32 / 255.0 > transparency)
            .collect();

        Some(Self {
            width,
            height,
            bits,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Opacity at a pixel; anything outside the mask is transparent
    #[inline]
    pub fn is_solid(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width + x as usize]
    }

    pub fn solid_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}
