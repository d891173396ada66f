//! Error types for sense sources, resistance grids and the aggregator.

use std::fmt;

/// Errors arising from configuring sources, grids or the sense map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SenseError {
    /// A radius below zero was supplied at construction or on mutation.
    NegativeRadius {
        /// The rejected radius.
        radius: i32,
    },
    /// Attempted to build a resistance grid with zero cells.
    EmptyGrid,
    /// A flat buffer does not match the requested dimensions.
    DimensionMismatch {
        /// `width * height` of the requested grid.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
    /// A source type name did not match any known algorithm.
    UnknownSourceType {
        /// The unrecognised name.
        name: String,
    },
    /// A distance metric name did not match any known metric.
    UnknownDistance {
        /// The unrecognised name.
        name: String,
    },
    /// No source with this id is registered in the sense map.
    UnknownSource {
        /// Raw id value.
        id: u32,
    },
    /// A command-line argument was missing or malformed.
    InvalidArgument {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for SenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeRadius { radius } => {
                write!(f, "radius must be >= 0, got {radius}")
            }
            Self::EmptyGrid => write!(f, "resistance grid must have at least one cell"),
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "expected {expected} cells, got {actual}")
            }
            Self::UnknownSourceType { name } => write!(f, "unknown source type: {name:?}"),
            Self::UnknownDistance { name } => write!(f, "unknown distance metric: {name:?}"),
            Self::UnknownSource { id } => write!(f, "no sense source with id {id}"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl std::error::Error for SenseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_value() {
        let err = SenseError::NegativeRadius { radius: -3 };
        assert_eq!(err.to_string(), "radius must be >= 0, got -3");

        let err = SenseError::UnknownSourceType {
            name: "flood".into(),
        };
        assert!(err.to_string().contains("\"flood\""));
    }
}
