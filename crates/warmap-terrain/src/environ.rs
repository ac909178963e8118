//! Wave heights sampled per tile corner.

use crate::collab::Environment;

/// Table of wave heights, one per tile corner.
///
/// Queries beyond the last corner clamp to the edge, so neighbour lookups
/// at the map border never fail.
#[derive(Debug, Clone, Default)]
pub struct WaveField {
    width: usize,
    height: usize,
    /// `(width + 1) * (height + 1)` corner samples.
    heights: Vec<i32>,
}

impl WaveField {
    pub fn new(width: usize, height: usize) -> Self {
        let mut field = Self::default();
        field.reset(width, height);
        field
    }

    /// Grid size this field was last reset for.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn set(&mut self, x: usize, y: usize, wave: i32) {
        let idx = self.corner_index(x, y);
        if let Some(slot) = self.heights.get_mut(idx) {
            *slot = wave;
        }
    }

    /// Fill every corner from `f(x, y)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> i32) {
        for y in 0..=self.height {
            for x in 0..=self.width {
                let idx = y * (self.width + 1) + x;
                self.heights[idx] = f(x, y);
            }
        }
    }

    fn corner_index(&self, x: usize, y: usize) -> usize {
        let x = x.min(self.width);
        let y = y.min(self.height);
        y * (self.width + 1) + x
    }
}

impl Environment for WaveField {
    fn wave_height(&self, x: usize, y: usize) -> i32 {
        self.heights
            .get(self.corner_index(x, y))
            .copied()
            .unwrap_or(0)
    }

    fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.heights.clear();
        self.heights.resize((width + 1) * (height + 1), 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_clamp() {
        let mut field = WaveField::new(2, 2);
        field.set(2, 2, 9);
        assert_eq!(field.wave_height(2, 2), 9);
        assert_eq!(field.wave_height(10, 10), 9);
        assert_eq!(field.wave_height(0, 0), 0);
    }

    #[test]
    fn test_reset_zeroes() {
        let mut field = WaveField::new(3, 3);
        field.fill_with(|x, y| (x + y) as i32);
        assert_eq!(field.wave_height(3, 3), 6);
        field.reset(4, 1);
        assert_eq!(field.size(), (4, 1));
        assert_eq!(field.wave_height(3, 1), 0);
    }
}
