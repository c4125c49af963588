//! Rectangular index spaces
//!
//! An [`IndexSpace`] describes one family of samples: how many there are
//! along each axis and where sample (0, 0) sits in grid space. Cell-centered
//! samples live at half-integer positions; face samples sit at integer
//! positions along their own axis. The flat storage order is row-major
//! (`y * width + x`).

use super::Vec2;

/// Index space for one field family.
///
/// Immutable after construction. Maps 2D sample coordinates to flat offsets
/// and recovers the grid-space position of every sample, so the advector can
/// turn an array slot back into a physical location without a precomputed
/// position table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSpace {
    width: usize,
    height: usize,
    origin: Vec2,
}

impl IndexSpace {
    /// Create an index space with `width * height` samples.
    ///
    /// `origin` is the grid-space position of sample (0, 0).
    ///
    /// # Panics
    ///
    /// Panics if either extent is below 3: every field needs at least one
    /// interior sample between two derived boundary samples.
    #[must_use]
    pub fn new(width: usize, height: usize, origin: Vec2) -> Self {
        assert!(
            width >= 3 && height >= 3,
            "index space needs at least 3 samples per axis"
        );
        Self {
            width,
            height,
            origin,
        }
    }

    /// Cell-centered space: samples at `(x + 0.5, y + 0.5)`.
    #[must_use]
    pub fn cell_centered(width: usize, height: usize) -> Self {
        Self::new(width, height, Vec2::new(0.5, 0.5))
    }

    /// Number of samples along x.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along y.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total sample count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// `true` only for the degenerate zero-sample space, which cannot be
    /// constructed; present to satisfy the `len` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grid-space position of sample (0, 0).
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Flat offset of sample `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the sample lies outside the space.
    #[inline]
    #[must_use]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "sample ({x}, {y}) out of bounds for {}x{} space",
            self.width,
            self.height
        );
        y * self.width + x
    }

    /// Grid-space position of sample `(x, y)`.
    #[inline]
    #[must_use]
    pub fn position(&self, x: usize, y: usize) -> Vec2 {
        debug_assert!(x < self.width && y < self.height);
        Vec2::new(x as f32 + self.origin.x, y as f32 + self.origin.y)
    }
}
