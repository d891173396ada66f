//! Per-source propagation engine.
//!
//! Two algorithm families fill a source's local buffer from a resistance
//! map: [`Shadowcast`] (binary visibility, linear falloff) and [`Ripple`]
//! (graded diffusion that honours partial resistance). Both implement
//! [`PropagationAlgorithm`]; [`propagate`] picks one from the source's
//! [`SourceType`](crate::SourceType).

pub mod ripple;
pub mod shadowcast;

pub use ripple::Ripple;
pub use shadowcast::Shadowcast;

use crate::geometry::{Coord, Distance};
use crate::resistance::ResistanceMap;
use crate::source::{SenseSource, SourceType};

/// An algorithm that spreads intensity outward from the centre of a local buffer.
pub trait PropagationAlgorithm {
    /// Fill `buf`, which arrives reset (centre at 1, everything else 0).
    fn spread<R: ResistanceMap + ?Sized>(&self, buf: &mut LocalBuffers<'_>, field: &R);
}

/// Run `source`'s algorithm against `field`.
///
/// Disabled sources are left untouched. Otherwise the buffers are reset
/// and refilled, so repeated calls with unchanged input give identical
/// results.
pub fn propagate<R: ResistanceMap + ?Sized>(source: &mut SenseSource, field: &R) {
    if !source.enabled() {
        return;
    }
    source.reset_buffers();

    let source_type = source.source_type();
    log::trace!(
        "propagating {} source at {:?} (radius {}, {})",
        source_type,
        source.position(),
        source.radius(),
        source.distance()
    );

    let mut buf = source.buffers_mut();
    match source_type {
        SourceType::Shadowcast => Shadowcast.spread(&mut buf, field),
        SourceType::RippleTight => Ripple::TIGHT.spread(&mut buf, field),
        SourceType::Ripple => Ripple::NORMAL.spread(&mut buf, field),
        SourceType::RippleLoose => Ripple::LOOSE.spread(&mut buf, field),
        SourceType::RippleVeryLoose => Ripple::VERY_LOOSE.spread(&mut buf, field),
    }
}

/// Mutable access to a source's buffers for the duration of one run.
///
/// Local coordinates are signed so neighbour arithmetic can step off the
/// edge; every read and write must still land inside `[0, size)`.
pub struct LocalBuffers<'a> {
    pub(crate) origin: Coord,
    pub(crate) radius: u32,
    pub(crate) size: usize,
    pub(crate) distance: Distance,
    pub(crate) decay: f64,
    pub(crate) intensity: &'a mut [f64],
    pub(crate) near_exposed: &'a mut [bool],
}

impl LocalBuffers<'_> {
    /// Local index of the source itself (both axes).
    #[inline]
    pub fn center(&self) -> i32 {
        self.radius as i32
    }

    #[inline]
    pub fn in_buffer(&self, i: i32, j: i32) -> bool {
        i >= 0 && j >= 0 && (i as usize) < self.size && (j as usize) < self.size
    }

    #[inline]
    pub fn to_global(&self, i: i32, j: i32) -> Coord {
        Coord::new(self.origin.x + i, self.origin.y + j)
    }

    /// Metric distance of local `(i, j)` from the centre.
    #[inline]
    pub fn distance_from_center(&self, i: i32, j: i32) -> f64 {
        let c = self.center();
        self.distance.calculate(i - c, j - c)
    }

    #[inline]
    pub fn intensity(&self, i: i32, j: i32) -> f64 {
        self.intensity[self.index(i, j)]
    }

    #[inline]
    pub fn set_intensity(&mut self, i: i32, j: i32, value: f64) {
        let idx = self.index(i, j);
        self.intensity[idx] = value;
    }

    #[inline]
    pub fn near_exposed(&self, i: i32, j: i32) -> bool {
        self.near_exposed[self.index(i, j)]
    }

    #[inline]
    pub fn mark_near_exposed(&mut self, i: i32, j: i32) {
        let idx = self.index(i, j);
        self.near_exposed[idx] = true;
    }

    #[inline]
    fn index(&self, i: i32, j: i32) -> usize {
        debug_assert!(
            self.in_buffer(i, j),
            "local index ({i}, {j}) outside {0}x{0} buffer",
            self.size
        );
        j as usize * self.size + i as usize
    }
}

/// Global resistance under local `(i, j)`; the caller has checked bounds.
#[inline]
pub(crate) fn resistance_at<R: ResistanceMap + ?Sized>(
    field: &R,
    buf: &LocalBuffers<'_>,
    i: i32,
    j: i32,
) -> f64 {
    let g = buf.to_global(i, j);
    field.resistance(g.x as usize, g.y as usize)
}

/// Whether local `(i, j)` lies on the map.
#[inline]
pub(crate) fn on_map<R: ResistanceMap + ?Sized>(
    field: &R,
    buf: &LocalBuffers<'_>,
    i: i32,
    j: i32,
) -> bool {
    let g = buf.to_global(i, j);
    field.in_bounds(g.x, g.y)
}

/// Format a local buffer for debugging, one row per line.
pub fn intensity_to_string(source: &SenseSource) -> String {
    let local = source.local();
    let mut result = String::new();
    for j in 0..local.size() {
        for i in 0..local.size() {
            result.push_str(&format!("{:5.2} ", local.get(i, j)));
        }
        result.push('\n');
    }
    result
}
