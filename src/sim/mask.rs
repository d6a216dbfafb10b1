//! Player silhouette opacity mask
//!
//! The mask is decoded once from the sprite asset into a fixed
//! `MASK_SIZE` x `MASK_SIZE` RGBA grid and never mutated afterwards.
//! Until it is ready (or if decoding failed) collision falls back to the
//! coarse bounding-box test.

use std::fmt::{self, Display};
use std::path::Path;

use image::imageops::FilterType;

use crate::consts::{ALPHA_THRESHOLD, DARK_THRESHOLD, MASK_SIZE};

/// Why the mask could not be produced
#[derive(Debug)]
pub enum MaskLoadError {
    /// Reading the asset from disk failed
    Io(std::io::Error),
    /// The bytes are not a decodable image
    Decode(String),
    /// Raw RGBA data did not match the expected grid size
    Dimensions { expected: usize, actual: usize },
    /// Fetching the asset over the network failed
    Fetch(String),
}

impl Display for MaskLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskLoadError::Io(e) => write!(f, "mask read error: {e}"),
            MaskLoadError::Decode(s) => write!(f, "mask decode error: {s}"),
            MaskLoadError::Dimensions { expected, actual } => {
                write!(f, "mask data has {actual} bytes, expected {expected}")
            }
            MaskLoadError::Fetch(s) => write!(f, "mask fetch error: {s}"),
        }
    }
}

impl std::error::Error for MaskLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MaskLoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MaskLoadError {
    fn from(e: std::io::Error) -> Self {
        MaskLoadError::Io(e)
    }
}

impl From<image::ImageError> for MaskLoadError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => MaskLoadError::Io(io),
            other => MaskLoadError::Decode(other.to_string()),
        }
    }
}

/// One RGBA sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque and dark: part of the hitbox silhouette
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.a > ALPHA_THRESHOLD
            && self.r < DARK_THRESHOLD
            && self.g < DARK_THRESHOLD
            && self.b < DARK_THRESHOLD
    }
}

/// Decoded silhouette grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpacityMask {
    pixels: Vec<Pixel>,
}

impl OpacityMask {
    const LEN: usize = (MASK_SIZE * MASK_SIZE) as usize;

    /// A mask with no solid pixels at all
    pub fn transparent() -> Self {
        Self {
            pixels: vec![Pixel::TRANSPARENT; Self::LEN],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every cell
    pub fn from_fn(mut f: impl FnMut(u32, u32) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(Self::LEN);
        for y in 0..MASK_SIZE {
            for x in 0..MASK_SIZE {
                pixels.push(f(x, y));
            }
        }
        Self { pixels }
    }

    /// Wrap raw RGBA bytes that are already `MASK_SIZE` x `MASK_SIZE`
    pub fn from_rgba(bytes: &[u8]) -> Result<Self, MaskLoadError> {
        let expected = Self::LEN * 4;
        if bytes.len() != expected {
            return Err(MaskLoadError::Dimensions {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Pixel::rgba(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self { pixels })
    }

    /// Decode an encoded image (PNG), scaling it to the mask grid
    pub fn decode(bytes: &[u8]) -> Result<Self, MaskLoadError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = if img.width() == MASK_SIZE && img.height() == MASK_SIZE {
            img.to_rgba8()
        } else {
            img.resize_exact(MASK_SIZE, MASK_SIZE, FilterType::Triangle)
                .to_rgba8()
        };
        Self::from_rgba(rgba.as_raw())
    }

    /// Read and decode an image file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MaskLoadError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::decode(&bytes)
    }

    /// Sample the grid; anything outside it reads as transparent
    #[inline]
    pub fn sample(&self, x: i32, y: i32) -> Pixel {
        let size = MASK_SIZE as i32;
        if x < 0 || y < 0 || x >= size || y >= size {
            return Pixel::TRANSPARENT;
        }
        self.pixels[(y * size + x) as usize]
    }

    /// Number of solid cells (diagnostics)
    pub fn solid_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_solid()).count()
    }
}

/// Readiness of the mask as seen by the collision detector
#[derive(Debug, Clone, Default)]
pub enum MaskSlot {
    /// Decode still in flight
    #[default]
    Loading,
    Ready(OpacityMask),
    /// Decode failed; coarse collision for the rest of the session
    Unavailable,
}

impl MaskSlot {
    /// The mask if fine collision is possible
    pub fn mask(&self) -> Option<&OpacityMask> {
        match self {
            MaskSlot::Ready(mask) => Some(mask),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, MaskSlot::Loading)
    }

    /// Settle the slot with a load outcome. Only the first outcome counts.
    pub fn resolve(&mut self, result: Result<OpacityMask, MaskLoadError>) {
        if !self.is_loading() {
            log::warn!("Mask already settled, ignoring late load result");
            return;
        }
        *self = match result {
            Ok(mask) => {
                log::info!("Player mask ready ({} solid pixels)", mask.solid_count());
                MaskSlot::Ready(mask)
            }
            Err(e) => {
                log::warn!("Player mask unavailable, using box collision: {e}");
                MaskSlot::Unavailable
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| Rgba(f(x, y)));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_sample_out_of_bounds_is_transparent() {
        let mask = OpacityMask::from_fn(|_, _| Pixel::rgba(0, 0, 0, 255));
        assert_eq!(mask.sample(-1, 0), Pixel::TRANSPARENT);
        assert_eq!(mask.sample(0, -1), Pixel::TRANSPARENT);
        assert_eq!(mask.sample(100, 50), Pixel::TRANSPARENT);
        assert_eq!(mask.sample(50, 100), Pixel::TRANSPARENT);
        assert!(mask.sample(99, 99).is_solid());
    }

    #[test]
    fn test_sample_row_major() {
        let mask = OpacityMask::from_fn(|x, y| Pixel::rgba(x as u8, y as u8, 0, 255));
        assert_eq!(mask.sample(7, 42), Pixel::rgba(7, 42, 0, 255));
    }

    #[test]
    fn test_solid_thresholds() {
        assert!(Pixel::rgba(127, 127, 127, 129).is_solid());
        assert!(!Pixel::rgba(0, 0, 0, 128).is_solid());
        assert!(!Pixel::rgba(128, 0, 0, 255).is_solid());
        assert!(!Pixel::rgba(0, 128, 0, 255).is_solid());
        assert!(!Pixel::rgba(0, 0, 128, 255).is_solid());
    }

    #[test]
    fn test_from_rgba_rejects_wrong_size() {
        let err = OpacityMask::from_rgba(&[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            MaskLoadError::Dimensions {
                expected: 40_000,
                actual: 16
            }
        ));
    }

    #[test]
    fn test_decode_png_native_size() {
        // Left half black and opaque, right half clear
        let png = encode_png(100, 100, |x, _| if x < 50 { [0, 0, 0, 255] } else { [0, 0, 0, 0] });
        let mask = OpacityMask::decode(&png).unwrap();
        assert!(mask.sample(10, 10).is_solid());
        assert!(!mask.sample(90, 10).is_solid());
        assert_eq!(mask.solid_count(), 50 * 100);
    }

    #[test]
    fn test_decode_png_is_scaled() {
        let png = encode_png(200, 200, |_, _| [10, 10, 10, 255]);
        let mask = OpacityMask::decode(&png).unwrap();
        assert_eq!(mask.solid_count(), 100 * 100);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = OpacityMask::decode(b"definitely not a png").unwrap_err();
        assert!(matches!(err, MaskLoadError::Decode(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = OpacityMask::load("does/not/exist.png").unwrap_err();
        assert!(matches!(err, MaskLoadError::Io(_)));
    }

    #[test]
    fn test_slot_failure_is_permanent() {
        let mut slot = MaskSlot::default();
        assert!(slot.is_loading());
        assert!(slot.mask().is_none());

        slot.resolve(Err(MaskLoadError::Fetch("404".into())));
        assert!(matches!(slot, MaskSlot::Unavailable));

        // No retry: a later success is ignored
        slot.resolve(Ok(OpacityMask::transparent()));
        assert!(matches!(slot, MaskSlot::Unavailable));
        assert!(slot.mask().is_none());
    }

    #[test]
    fn test_slot_ready() {
        let mut slot = MaskSlot::default();
        slot.resolve(Ok(OpacityMask::transparent()));
        assert!(slot.mask().is_some());
    }
}
