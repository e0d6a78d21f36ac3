//! Error type shared by model construction, scoring, and search.

/// Errors that can occur while building models, scoring, or searching.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// A model parameter is outside its valid domain.
    InvalidParameter {
        /// Parameter name (e.g. `"r"`, `"g"`).
        name: &'static str,
        /// Offending value.
        value: f64,
        /// Short description of the violated constraint.
        reason: &'static str,
    },
    /// Inclination at or beyond 90°, where `cos(inc)` vanishes.
    InclinationOutOfRange {
        /// Requested inclination in degrees.
        inc_deg: f64,
    },
    /// Two grids that must share a shape do not.
    ShapeMismatch {
        /// Expected `(height, width)`.
        expected: (usize, usize),
        /// Provided `(height, width)`.
        got: (usize, usize),
    },
    /// A sampled model pixel falls outside the image.
    ModelOutOfBounds {
        /// Row index of the offending sample.
        row: i64,
        /// Column index of the offending sample.
        col: i64,
        /// Image height.
        height: usize,
        /// Image width.
        width: usize,
    },
    /// A parameter range is empty, inverted, or not finite.
    EmptyParameterBox {
        /// Position of the offending range in the box.
        index: usize,
    },
    /// Grid enumeration would exceed the configured cell budget.
    GridTooLarge {
        /// Number of cells the grid would evaluate.
        cells: u128,
        /// Configured maximum.
        limit: u128,
    },
    /// Deprojection would produce a wider image than allowed.
    DeprojectionTooWide {
        /// Output width the stretch would produce.
        width: u64,
        /// Configured maximum width.
        limit: u64,
    },
    /// A parameter vector has the wrong length for its model.
    DimensionMismatch {
        /// Expected number of parameters.
        expected: usize,
        /// Provided number of parameters.
        got: usize,
    },
    /// Image has zero rows or columns.
    EmptyImage,
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid parameter {}={}: {}", name, value, reason),
            Self::InclinationOutOfRange { inc_deg } => {
                write!(
                    f,
                    "inclination {}° out of range: must satisfy |inc| < 90°",
                    inc_deg
                )
            }
            Self::ShapeMismatch { expected, got } => write!(
                f,
                "shape mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, got.0, got.1
            ),
            Self::ModelOutOfBounds {
                row,
                col,
                height,
                width,
            } => write!(
                f,
                "model out of bounds: pixel ({}, {}) outside {}x{} image",
                row, col, height, width
            ),
            Self::EmptyParameterBox { index } => {
                write!(f, "parameter range {} is empty or invalid", index)
            }
            Self::GridTooLarge { cells, limit } => {
                write!(f, "grid too large: {} cells exceeds limit {}", cells, limit)
            }
            Self::DeprojectionTooWide { width, limit } => write!(
                f,
                "deprojected width {} exceeds limit {}; inclination too close to 90°",
                width, limit
            ),
            Self::DimensionMismatch { expected, got } => {
                write!(
                    f,
                    "parameter vector length mismatch: need {}, got {}",
                    expected, got
                )
            }
            Self::EmptyImage => write!(f, "image has no pixels"),
        }
    }
}

impl std::error::Error for FitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_parameter() {
        let e = FitError::InvalidParameter {
            name: "g",
            value: 1.5,
            reason: "must lie in (-1, 1)",
        };
        assert_eq!(e.to_string(), "invalid parameter g=1.5: must lie in (-1, 1)");
    }

    #[test]
    fn display_grid_too_large() {
        let e = FitError::GridTooLarge {
            cells: 1_000_000,
            limit: 10,
        };
        assert!(e.to_string().contains("1000000"));
    }
}
