use std::error::Error;
use std::fmt;

use log::debug;

use crate::analysis::{analyze, Bounds, RasterInfo};
use crate::buffer::PixelBuffer;
use crate::{CROP_SIZE, TARGET_SIZE};

/// Normalization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeError {
    /// Blank canvas: nothing above the foreground threshold, or zero
    /// total intensity. The centroid and scale are undefined for such
    /// input, so it is rejected up front instead of producing NaN.
    DegenerateInput,
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::DegenerateInput => write!(f, "drawing has no legible content"),
        }
    }
}

impl Error for NormalizeError {}

/// Converts an arbitrary freehand raster into the canonical frame the
/// network was trained on: the stroke is cropped to its bounding box,
/// scaled proportionally into a `crop_size` area, and recentered on its
/// center of mass inside a `target_size` grid.
pub struct Normalizer {
    crop_size: usize,
    target_size: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(CROP_SIZE, TARGET_SIZE)
    }
}

impl Normalizer {
    /// Panics if `crop_size` is zero or larger than `target_size`.
    pub fn new(crop_size: usize, target_size: usize) -> Self {
        assert!(
            crop_size > 0 && crop_size <= target_size,
            "crop area must fit inside the target grid"
        );
        Self {
            crop_size,
            target_size,
        }
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Produce the canonical `target_size` x `target_size` buffer for a
    /// raw drawing of arbitrary dimensions.
    pub fn normalize(&self, source: &PixelBuffer) -> Result<PixelBuffer, NormalizeError> {
        let info = analyze(source).ok_or(NormalizeError::DegenerateInput)?;
        let bounds = info.bounds.ok_or(NormalizeError::DegenerateInput)?;

        let cropped = self.crop_and_scale(source, &bounds);

        // The resampled stroke keeps a positive intensity sum, but the
        // centroid must be recomputed in the cropped frame.
        let cropped_info = analyze(&cropped).ok_or(NormalizeError::DegenerateInput)?;

        Ok(self.center_mass(&cropped, &cropped_info))
    }

    /// Map the bounding box to the crop origin and scale it uniformly so
    /// the whole stroke fits the crop area. Never anisotropic: one factor
    /// for both axes, chosen from the larger extent.
    fn crop_and_scale(&self, source: &PixelBuffer, bounds: &Bounds) -> PixelBuffer {
        let crop = self.crop_size as f32;

        // An axis with zero extent puts no constraint on the scale; a
        // single-point drawing keeps scale 1.
        let mut scale = f32::INFINITY;
        if bounds.width() > 0 {
            scale = scale.min(crop / bounds.width() as f32);
        }
        if bounds.height() > 0 {
            scale = scale.min(crop / bounds.height() as f32);
        }
        if !scale.is_finite() {
            scale = 1.0;
        }

        debug!(
            "crop: box {}x{} at ({}, {}), scale {:.3}",
            bounds.width(),
            bounds.height(),
            bounds.x_min,
            bounds.y_min,
            scale
        );

        let step = 1.0 / scale;
        let mut dest = PixelBuffer::new(self.crop_size, self.crop_size);

        for dy in 0..self.crop_size {
            let y0 = bounds.y_min as f32 + dy as f32 * step;
            for dx in 0..self.crop_size {
                let x0 = bounds.x_min as f32 + dx as f32 * step;
                let value = sample_area(source, x0, y0, x0 + step, y0 + step);
                if value > 0.0 {
                    dest.set(dx, dy, value);
                }
            }
        }

        dest
    }

    /// Translate the cropped stroke so its center of mass lands on the
    /// center of the target grid. The shift is rounded to whole pixels;
    /// pixels pushed outside the grid are dropped.
    fn center_mass(&self, source: &PixelBuffer, info: &RasterInfo) -> PixelBuffer {
        let half = (self.target_size / 2) as f32;
        let shift_x = (half - info.x_center_mass).round() as isize;
        let shift_y = (half - info.y_center_mass).round() as isize;

        debug!(
            "recenter: centroid ({:.2}, {:.2}), shift ({}, {})",
            info.x_center_mass, info.y_center_mass, shift_x, shift_y
        );

        let size = self.target_size as isize;
        let mut dest = PixelBuffer::new(self.target_size, self.target_size);

        for pixel in source.pixels() {
            if pixel.value == 0.0 {
                continue;
            }
            let tx = pixel.x as isize + shift_x;
            let ty = pixel.y as isize + shift_y;
            if tx < 0 || ty < 0 || tx >= size || ty >= size {
                continue;
            }
            dest.set(tx as usize, ty as usize, pixel.value);
        }

        dest
    }
}

/// Mean intensity of an axis-aligned rectangle of the source, weighting
/// each covered pixel by its overlap area (box filter). Anything outside
/// the buffer counts as background.
fn sample_area(source: &PixelBuffer, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let area = (x1 - x0) * (y1 - y0);
    if area <= 0.0 {
        return 0.0;
    }

    let ix_start = x0.floor().max(0.0) as usize;
    let ix_end = x1.ceil().min(source.width() as f32).max(0.0) as usize;
    let iy_start = y0.floor().max(0.0) as usize;
    let iy_end = y1.ceil().min(source.height() as f32).max(0.0) as usize;

    let mut sum = 0.0f32;
    for iy in iy_start..iy_end {
        let overlap_y = (y1.min((iy + 1) as f32) - y0.max(iy as f32)).max(0.0);
        if overlap_y == 0.0 {
            continue;
        }
        for ix in ix_start..ix_end {
            let overlap_x = (x1.min((ix + 1) as f32) - x0.max(ix as f32)).max(0.0);
            if overlap_x == 0.0 {
                continue;
            }
            sum += source.get(ix, iy) * overlap_x * overlap_y;
        }
    }

    (sum / area).clamp(0.0, 1.0)
}
