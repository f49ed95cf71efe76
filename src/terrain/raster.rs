use std::path::Path;

use image::DynamicImage;

use crate::terrain::error::TerrainError;

/// Immutable 8-bit elevation samples, row-major.
#[derive(Clone, Debug)]
pub struct ElevationRaster {
    width: u32,
    height: u32,
    samples: Vec<u8>,
    min_val: u8,
    max_val: u8,
}

impl ElevationRaster {
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 || samples.len() != (width as usize) * (height as usize) {
            return Err(TerrainError::EmptyRaster { width, height });
        }

        let (min_val, max_val) = samples
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Ok(Self {
            width,
            height,
            samples,
            min_val,
            max_val,
        })
    }

    /// Uses channel 0 of the image: luma for gray images, red otherwise.
    pub fn from_image(image: &DynamicImage) -> Result<Self, TerrainError> {
        let samples = match image {
            DynamicImage::ImageLuma8(gray) => gray.as_raw().clone(),
            other => other.to_rgba8().pixels().map(|p| p.0[0]).collect(),
        };
        Self::new(image.width(), image.height(), samples)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TerrainError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TerrainError::RasterLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(&image)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn min_val(&self) -> u8 {
        self.min_val
    }

    pub fn max_val(&self) -> u8 {
        self.max_val
    }

    /// Never below 1, so a flat raster normalizes to 0 instead of dividing by zero.
    pub fn range(&self) -> f32 {
        (self.max_val as f32 - self.min_val as f32).max(1.0)
    }

    /// Sample at pixel `(ix, iy)`, clamped to the raster bounds.
    pub fn sample(&self, ix: u32, iy: u32) -> u8 {
        let x = ix.min(self.width - 1) as usize;
        let y = iy.min(self.height - 1) as usize;
        self.samples[y * self.width as usize + x]
    }

    /// `(raw - min) / range`, in [0, 1].
    pub fn normalized(&self, ix: u32, iy: u32) -> f32 {
        (self.sample(ix, iy) as f32 - self.min_val as f32) / self.range()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}
