pub mod analysis;
pub mod buffer;
pub mod normalizer;

pub use analysis::{analyze, Bounds, RasterInfo};
pub use buffer::{Pixel, PixelBuffer};
pub use normalizer::{NormalizeError, Normalizer};

/// Intensity above which a pixel counts as part of the drawing when
/// computing the bounding box. The center of mass is never filtered by this.
pub const FOREGROUND_THRESHOLD: f32 = 0.3;

/// Side length of the crop area a drawing is scaled into, leaving a margin
/// inside the final grid.
pub const CROP_SIZE: usize = 20;

/// Side length of the canonical output grid.
pub const TARGET_SIZE: usize = 28;
