//! Scalar field storage
//!
//! A [`ScalarField`] is a dense `Vec<f32>` over one [`IndexSpace`]. Velocity
//! is represented as a pair of scalar fields, which in the staggered layout
//! live on different spaces. Fields are allocated once at solver
//! construction and never reallocated; double buffering moves ownership with
//! `std::mem::swap`.

use super::{IndexSpace, Vec2};

/// Dense scalar field over an index space.
#[derive(Debug, Clone)]
pub struct ScalarField {
    space: IndexSpace,
    data: Vec<f32>,
}

impl ScalarField {
    /// Create a field over `space`, initialized to zero.
    #[must_use]
    pub fn new(space: IndexSpace) -> Self {
        Self {
            space,
            data: vec![0.0; space.len()],
        }
    }

    /// The index space this field is sampled on.
    #[must_use]
    pub fn space(&self) -> IndexSpace {
        self.space
    }

    /// Value at sample `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the sample lies outside the field's space.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.space.idx(x, y)]
    }

    /// Set the value at sample `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the sample lies outside the field's space.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.space.idx(x, y);
        self.data[idx] = value;
    }

    /// Accumulate into the value at sample `(x, y)`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, value: f32) {
        let idx = self.space.idx(x, y);
        self.data[idx] += value;
    }

    /// Fill the entire field with one value.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Read-only view of the raw samples in row-major order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of the raw samples in row-major order.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Sum over all samples.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Bilinear interpolation at a grid-space position.
    ///
    /// The position is expected to be clamped into the field's valid
    /// sampling rectangle by the caller (the advector always does); the
    /// enclosing quad indices are clamped again so a slightly out-of-range
    /// position reads the nearest defined quad instead of faulting.
    #[must_use]
    pub fn sample_bilinear(&self, pos: Vec2) -> f32 {
        let w = self.space.width();
        let h = self.space.height();

        // Offset into this field's own sample lattice
        let gx = pos.x - self.space.origin().x;
        let gy = pos.y - self.space.origin().y;

        let x0 = (gx.floor() as i64).clamp(0, w as i64 - 2) as usize;
        let y0 = (gy.floor() as i64).clamp(0, h as i64 - 2) as usize;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        // Fractional offsets double as interpolation weights
        let wx1 = (gx - x0 as f32).clamp(0.0, 1.0);
        let wx0 = 1.0 - wx1;
        let wy1 = (gy - y0 as f32).clamp(0.0, 1.0);
        let wy0 = 1.0 - wy1;

        wy0 * (wx0 * self.get(x0, y0) + wx1 * self.get(x1, y0))
            + wy1 * (wx0 * self.get(x0, y1) + wx1 * self.get(x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_field_starts_zeroed() {
        let field = ScalarField::new(IndexSpace::cell_centered(10, 20));
        assert_eq!(field.as_slice().len(), 200);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_get_set_add() {
        let mut field = ScalarField::new(IndexSpace::cell_centered(10, 10));
        field.set(3, 4, 1.5);
        field.add(3, 4, 0.25);
        assert_eq!(field.get(3, 4), 1.75);

        // Row-major storage
        assert_eq!(field.as_slice()[4 * 10 + 3], 1.75);
    }

    #[test]
    fn test_fill_and_sum() {
        let mut field = ScalarField::new(IndexSpace::cell_centered(4, 4));
        field.fill(0.5);
        assert_relative_eq!(field.sum(), 8.0);
    }

    #[test]
    fn test_bilinear_exact_at_sample() {
        let mut field = ScalarField::new(IndexSpace::cell_centered(8, 8));
        field.set(3, 5, 7.0);
        let value = field.sample_bilinear(field.space().position(3, 5));
        assert_relative_eq!(value, 7.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let mut field = ScalarField::new(IndexSpace::cell_centered(8, 8));
        field.set(2, 2, 1.0);
        field.set(3, 2, 3.0);
        // Halfway between the two samples along x
        let value = field.sample_bilinear(Vec2::new(3.0, 2.5));
        assert_relative_eq!(value, 2.0);
    }

    #[test]
    fn test_bilinear_on_face_space() {
        // x-face space: samples at integer x
        let space = IndexSpace::new(9, 8, Vec2::new(0.0, 0.5));
        let mut field = ScalarField::new(space);
        field.set(4, 3, 2.0);
        field.set(5, 3, 4.0);
        let value = field.sample_bilinear(Vec2::new(4.25, 3.5));
        assert_relative_eq!(value, 2.5);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_field_bounds_check() {
        let field = ScalarField::new(IndexSpace::cell_centered(10, 10));
        let _ = field.get(10, 5);
    }
}
