//! Error taxonomy for the render boundary.
//!
//! Render calls (charts, heatmaps, progress bars) fail fast and synchronously.
//! Engagement, panel, focus and tooltip logic never produce these errors: an
//! absent optional element simply disables that feature.

use thiserror::Error;

/// Which label axis of a heat matrix failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixAxis {
    Rows,
    Columns,
}

impl std::fmt::Display for MatrixAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows => write!(f, "row"),
            Self::Columns => write!(f, "column"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VizError {
    /// The target identifier does not resolve to a live element.
    #[error("element not found: #{0}")]
    ElementNotFound(String),

    /// A gradient stop is neither `#rgb`/`#rrggbb` nor `rgb(r,g,b)`.
    #[error("invalid color format: {0:?}")]
    InvalidColorFormat(String),

    /// Label count disagrees with the matrix shape.
    #[error("{axis} labels mismatch: expected {expected}, found {found}")]
    MissingMatrixLabels {
        axis: MatrixAxis,
        expected: usize,
        found: usize,
    },

    /// A color scale needs at least two stops.
    #[error("color scale needs at least 2 stops, got {0}")]
    InvalidColorScale(usize),

    /// Progress maximum must be strictly positive.
    #[error("max value must be > 0, got {0}")]
    InvalidRange(f64),

    #[error("config: {0}")]
    Config(String),

    /// The rendering surface rejected an operation.
    #[error("surface: {0}")]
    Surface(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = VizError::ElementNotFound("c1".into());
        assert_eq!(e.to_string(), "element not found: #c1");

        let e = VizError::MissingMatrixLabels {
            axis: MatrixAxis::Columns,
            expected: 3,
            found: 2,
        };
        assert_eq!(e.to_string(), "column labels mismatch: expected 3, found 2");
    }
}
