//! Sense propagation over obstruction-weighted 2D grids.
//!
//! A [`SenseSource`] emits from a point with a radius and distance metric;
//! [`propagate`] fills its local buffer from a [`ResistanceMap`] using
//! shadowcasting or one of the ripple variants, and a [`SenseMap`] merges
//! many sources into one global field.

pub mod config;
pub mod error;
pub mod geometry;
pub mod propagation;
pub mod render;
pub mod resistance;
pub mod sense_map;
pub mod source;


pub use config::{DemoConfig, Mode};
pub use error::SenseError;
pub use geometry::{AdjacencyRule, Coord, Direction, Distance};
pub use propagation::{PropagationAlgorithm, Ripple, Shadowcast, intensity_to_string, propagate};
pub use render::{field_to_string, save_ppm, to_ascii};
pub use resistance::{ResistanceGrid, ResistanceMap, flatten_grid};
pub use sense_map::{SenseMap, SourceId};
pub use source::{LocalIntensity, SenseSource, SourceType};
