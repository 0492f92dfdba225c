//! Grid construction errors.

use thiserror::Error;

use crate::Tile;

/// Errors raised while assembling a [`Grid`](crate::Grid).
///
/// Queries on a built grid never fail; unreachable destinations are
/// reported as `None`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Width or depth is zero.
    #[error("grid dimensions must be non-zero (got {width}x{depth})")]
    EmptyDimensions {
        /// Requested width
        width: u32,
        /// Requested depth
        depth: u32,
    },

    /// The cell count does not fit in `u32`, or a side exceeds `i32::MAX`.
    #[error("grid dimensions {width}x{depth} are too large")]
    TooLarge {
        /// Requested width
        width: u32,
        /// Requested depth
        depth: u32,
    },

    /// A cell lies outside the declared dimensions.
    #[error("cell {tile} lies outside a {width}x{depth} grid")]
    OutOfBounds {
        /// Offending coordinate
        tile: Tile,
        /// Grid width
        width: u32,
        /// Grid depth
        depth: u32,
    },

    /// Two cells share a coordinate.
    #[error("duplicate cell at {0}")]
    DuplicateCell(Tile),

    /// A cell has a negative or non-finite movement cost.
    #[error("cell {tile} has invalid movement cost {cost}")]
    InvalidCost {
        /// Offending coordinate
        tile: Tile,
        /// The rejected cost
        cost: f32,
    },
}
