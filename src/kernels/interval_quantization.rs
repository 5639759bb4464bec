//! Interval quantization of floats onto `num_steps` evenly spaced levels.
//!
//! Values are clamped to `[min, max]`; level `k` decodes to
//! `min + k * (max - min) / (num_steps - 1)`. Lossy and opt-in only.

use crate::error::BinaryCifError;

/// The validated quantization grid. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub min: f64,
    pub max: f64,
    pub num_steps: u32,
}

impl Grid {
    /// Builds a grid, swapping reversed bounds.
    pub fn new(min: f64, max: f64, num_steps: u32) -> Result<Self, BinaryCifError> {
        if num_steps < 2 || num_steps > i32::MAX as u32 {
            return Err(BinaryCifError::OutOfRange {
                encoding: "IntervalQuantization",
                value: format!("numSteps {}", num_steps),
            });
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(BinaryCifError::OutOfRange {
                encoding: "IntervalQuantization",
                value: format!("bounds [{}, {}]", min, max),
            });
        }
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        Ok(Self { min, max, num_steps })
    }

    fn step(&self) -> f64 {
        (self.max - self.min) / (self.num_steps - 1) as f64
    }
}

pub fn encode(values: &[f64], grid: Grid) -> Vec<i32> {
    let step = grid.step();
    let top = grid.num_steps as i32 - 1;
    values
        .iter()
        .map(|&v| {
            if v <= grid.min || step == 0.0 {
                0
            } else if v >= grid.max {
                top
            } else {
                (((v - grid.min) / step).round() as i32).clamp(0, top)
            }
        })
        .collect()
}

pub fn decode(levels: &[i32], grid: Grid) -> Vec<f64> {
    let step = grid.step();
    levels.iter().map(|&k| grid.min + k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_and_clamp() {
        let grid = Grid::new(0.0, 1.0, 11).unwrap();
        let encoded = encode(&[-5.0, 0.0, 0.31, 0.5, 1.0, 7.0], grid);
        assert_eq!(encoded, vec![0, 0, 3, 5, 10, 10]);
        let decoded = decode(&encoded, grid);
        assert!((decoded[2] - 0.3).abs() < 1e-12);
        assert_eq!(decoded[5], 1.0);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let grid = Grid::new(10.0, -10.0, 3).unwrap();
        assert_eq!((grid.min, grid.max), (-10.0, 10.0));
        assert_eq!(encode(&[0.0], grid), vec![1]);
    }

    #[test]
    fn test_invalid_grid() {
        assert!(Grid::new(0.0, 1.0, 1).is_err());
        assert!(Grid::new(f64::NAN, 1.0, 4).is_err());
    }
}
