//! Sense sources: configuration plus the local buffers a propagation fills.
//!
//! A source owns a square buffer of side `2 * radius + 1` centred on its
//! position. Local `(i, j)` maps to global `position - (radius, radius) + (i, j)`.
//! Buffers are scratch space: every enabled propagation re-initialises them
//! before running, so nothing leaks from one run into the next.

use std::fmt;
use std::str::FromStr;

use crate::error::SenseError;
use crate::geometry::{Coord, Distance};
use crate::propagation::LocalBuffers;
use crate::propagation::ripple::Ripple;

/// Which propagation algorithm a source uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceType {
    /// Binary line-of-sight with linear falloff.
    Shadowcast,
    /// Ripple sampling 1 neighbour: hugs the source, barely bends.
    RippleTight,
    /// Ripple sampling 2 neighbours.
    #[default]
    Ripple,
    /// Ripple sampling 3 neighbours.
    RippleLoose,
    /// Ripple sampling 6 neighbours: bends freely around corners.
    RippleVeryLoose,
}

impl SourceType {
    pub const ALL: [SourceType; 5] = [
        SourceType::Shadowcast,
        SourceType::RippleTight,
        SourceType::Ripple,
        SourceType::RippleLoose,
        SourceType::RippleVeryLoose,
    ];

    /// Ripple parameters, or `None` for shadowcasting.
    pub fn ripple(self) -> Option<Ripple> {
        match self {
            SourceType::Shadowcast => None,
            SourceType::RippleTight => Some(Ripple::TIGHT),
            SourceType::Ripple => Some(Ripple::NORMAL),
            SourceType::RippleLoose => Some(Ripple::LOOSE),
            SourceType::RippleVeryLoose => Some(Ripple::VERY_LOOSE),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceType::Shadowcast => "shadowcast",
            SourceType::RippleTight => "ripple_tight",
            SourceType::Ripple => "ripple",
            SourceType::RippleLoose => "ripple_loose",
            SourceType::RippleVeryLoose => "ripple_very_loose",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceType {
    type Err = SenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SenseError::UnknownSourceType { name: s.to_string() })
    }
}

/// A point emitter of some sense (light, sound, scent).
#[derive(Debug, Clone)]
pub struct SenseSource {
    source_type: SourceType,
    position: Coord,
    radius: u32,
    distance: Distance,
    enabled: bool,
    intensity: Vec<f64>,
    near_exposed: Vec<bool>,
}

impl SenseSource {
    /// Create an enabled source. Buffers are allocated once here.
    pub fn new(
        source_type: SourceType,
        position: impl Into<Coord>,
        radius: i32,
        distance: Distance,
    ) -> Result<Self, SenseError> {
        let radius = validate_radius(radius)?;
        let cells = side(radius) * side(radius);
        let mut source = SenseSource {
            source_type,
            position: position.into(),
            radius,
            distance,
            enabled: true,
            intensity: vec![0.0; cells],
            near_exposed: vec![false; cells],
        };
        source.reset_buffers();
        Ok(source)
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    pub fn set_source_type(&mut self, source_type: SourceType) {
        self.source_type = source_type;
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn set_position(&mut self, position: impl Into<Coord>) {
        self.position = position.into();
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Change the radius. Reallocates both buffers (discarding their
    /// contents) only when the value actually changes.
    pub fn set_radius(&mut self, radius: i32) -> Result<(), SenseError> {
        let radius = validate_radius(radius)?;
        if radius == self.radius {
            return Ok(());
        }
        log::debug!(
            "sense source at {:?}: radius {} -> {}, reallocating buffers",
            self.position,
            self.radius,
            radius
        );
        self.radius = radius;
        let cells = side(radius) * side(radius);
        self.intensity = vec![0.0; cells];
        self.near_exposed = vec![false; cells];
        self.reset_buffers();
        Ok(())
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    pub fn set_distance(&mut self, distance: Distance) {
        self.distance = distance;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Brightness lost per unit of distance: falls to exactly 0 at `radius + 1`.
    pub fn decay(&self) -> f64 {
        1.0 / (self.radius as f64 + 1.0)
    }

    /// Side length of the local buffers.
    pub fn size(&self) -> usize {
        side(self.radius)
    }

    /// Read-only view of the last computed intensities.
    pub fn local(&self) -> LocalIntensity<'_> {
        LocalIntensity {
            values: &self.intensity,
            size: self.size(),
            origin: self.origin(),
        }
    }

    /// Global position of local `(0, 0)`.
    pub fn origin(&self) -> Coord {
        let r = self.radius as i32;
        self.position - Coord::new(r, r)
    }

    #[cfg(test)]
    pub(crate) fn near_exposed(&self, i: usize, j: usize) -> bool {
        self.near_exposed[j * self.size() + i]
    }

    /// Zero everything, light the centre, clear the exposure marks.
    pub(crate) fn reset_buffers(&mut self) {
        let size = self.size();
        let center = self.radius as usize;
        self.intensity.fill(0.0);
        self.near_exposed.fill(false);
        self.intensity[center * size + center] = 1.0;
    }

    pub(crate) fn buffers_mut(&mut self) -> LocalBuffers<'_> {
        let origin = self.origin();
        let decay = self.decay();
        LocalBuffers {
            origin,
            radius: self.radius,
            size: side(self.radius),
            distance: self.distance,
            decay,
            intensity: &mut self.intensity,
            near_exposed: &mut self.near_exposed,
        }
    }
}

fn validate_radius(radius: i32) -> Result<u32, SenseError> {
    u32::try_from(radius).map_err(|_| SenseError::NegativeRadius { radius })
}

#[inline]
fn side(radius: u32) -> usize {
    2 * radius as usize + 1
}

/// Borrowed view of a source's local intensity buffer.
#[derive(Debug, Clone, Copy)]
pub struct LocalIntensity<'a> {
    values: &'a [f64],
    size: usize,
    origin: Coord,
}

impl<'a> LocalIntensity<'a> {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    /// Intensity at local `(i, j)`; `i` is the column.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.size && j < self.size,
            "local index ({i}, {j}) outside {0}x{0} buffer",
            self.size
        );
        self.values[j * self.size + i]
    }

    pub fn to_global(&self, i: usize, j: usize) -> Coord {
        self.origin + Coord::new(i as i32, j as i32)
    }

    /// Row-major values.
    pub fn as_slice(&self) -> &'a [f64] {
        self.values
    }

    /// Every cell with its global position, row by row.
    pub fn iter_global(&self) -> impl Iterator<Item = (Coord, f64)> + 'a {
        let size = self.size;
        let origin = self.origin;
        self.values.iter().enumerate().map(move |(idx, &value)| {
            let local = Coord::new((idx % size) as i32, (idx / size) as i32);
            (origin + local, value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_radius_is_rejected() {
        let err = SenseSource::new(SourceType::Shadowcast, (0, 0), -1, Distance::Chebyshev)
            .unwrap_err();
        assert_eq!(err, SenseError::NegativeRadius { radius: -1 });

        let mut source =
            SenseSource::new(SourceType::Shadowcast, (0, 0), 2, Distance::Chebyshev).unwrap();
        assert!(source.set_radius(-4).is_err());
        assert_eq!(source.radius(), 2);
    }

    #[test]
    fn fresh_source_has_lit_centre() {
        let source = SenseSource::new(SourceType::Ripple, (10, 7), 3, Distance::Euclidean).unwrap();
        let local = source.local();
        assert_eq!(local.size(), 7);
        assert_eq!(local.get(3, 3), 1.0);
        assert_eq!(local.as_slice().iter().filter(|&&v| v != 0.0).count(), 1);
        assert!(source.enabled());
    }

    #[test]
    fn radius_change_reallocates_only_when_different() {
        let mut source =
            SenseSource::new(SourceType::Ripple, (5, 5), 2, Distance::Chebyshev).unwrap();
        source.intensity[0] = 0.5;

        source.set_radius(2).unwrap();
        assert_eq!(source.local().get(0, 0), 0.5, "same radius must keep contents");

        source.set_radius(4).unwrap();
        assert_eq!(source.size(), 9);
        assert_eq!(source.near_exposed.len(), 81);
        assert_eq!(source.local().get(0, 0), 0.0);
        assert_eq!(source.local().get(4, 4), 1.0);
    }

    #[test]
    fn local_to_global_mapping() {
        let source =
            SenseSource::new(SourceType::Shadowcast, (10, 20), 2, Distance::Chebyshev).unwrap();
        let local = source.local();
        assert_eq!(local.origin(), Coord::new(8, 18));
        assert_eq!(local.to_global(2, 2), Coord::new(10, 20));
        assert_eq!(local.to_global(4, 0), Coord::new(12, 18));

        let centre = local
            .iter_global()
            .find(|&(_, v)| v == 1.0)
            .map(|(c, _)| c);
        assert_eq!(centre, Some(Coord::new(10, 20)));
    }

    #[test]
    fn decay_reaches_zero_one_past_radius() {
        let source = SenseSource::new(SourceType::Shadowcast, (0, 0), 3, Distance::Chebyshev).unwrap();
        assert!((source.decay() - 0.25).abs() < 1e-12);
        assert!((1.0 - source.decay() * 4.0).abs() < 1e-12);
    }

    #[test]
    fn source_type_names() {
        for t in SourceType::ALL {
            assert_eq!(t.name().parse::<SourceType>(), Ok(t));
        }
        assert_eq!(SourceType::Shadowcast.ripple(), None);
        assert_eq!(SourceType::RippleVeryLoose.ripple(), Some(Ripple::VERY_LOOSE));
        assert!(matches!(
            "ripple_medium".parse::<SourceType>(),
            Err(SenseError::UnknownSourceType { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn local_read_out_of_range_panics() {
        let source = SenseSource::new(SourceType::Shadowcast, (0, 0), 1, Distance::Chebyshev).unwrap();
        source.local().get(3, 0);
    }
}
