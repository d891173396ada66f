//! Ripple spread: graded diffusion that honours partial resistance.
//!
//! A FIFO worklist starts at the source. Popping a cell re-evaluates each
//! of its in-range neighbours: a neighbour's candidate brightness is the
//! best of `light - step * decay - resistance` over the `neighbors` cells
//! around it that sit closest to the source. A neighbour is requeued only
//! when its brightness strictly rises, so the worklist drains.
//!
//! Cells that sit on a wall, or whose sampled light was mostly inherited
//! (`indirects >= lit`), are marked near-exposed and never expand further.
//! That is what makes light curl back toward the source around corners;
//! sampling more neighbours lets it bend further.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::geometry::AdjacencyRule;
use crate::resistance::ResistanceMap;

use super::{LocalBuffers, PropagationAlgorithm, on_map, resistance_at};

/// Ripple spread sampling `neighbors` nearby cells per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ripple {
    pub neighbors: usize,
}

impl Ripple {
    pub const TIGHT: Ripple = Ripple { neighbors: 1 };
    pub const NORMAL: Ripple = Ripple { neighbors: 2 };
    pub const LOOSE: Ripple = Ripple { neighbors: 3 };
    pub const VERY_LOOSE: Ripple = Ripple { neighbors: 6 };

    pub fn new(neighbors: usize) -> Self {
        Ripple { neighbors }
    }
}

impl Default for Ripple {
    fn default() -> Self {
        Ripple::NORMAL
    }
}

/// A sampled neighbour and its distance from the source.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    i: i32,
    j: i32,
    from_center: f64,
}

impl PropagationAlgorithm for Ripple {
    fn spread<R: ResistanceMap + ?Sized>(&self, buf: &mut LocalBuffers<'_>, field: &R) {
        let center = buf.center();
        let max_distance = buf.radius as f64;
        let mut queue = VecDeque::new();
        queue.push_back((center, center));

        while let Some((i, j)) = queue.pop_front() {
            if buf.intensity(i, j) <= 0.0 || buf.near_exposed(i, j) {
                continue;
            }

            for dir in AdjacencyRule::EightWay.directions() {
                let (ni, nj) = (i + dir.dx, j + dir.dy);
                if !buf.in_buffer(ni, nj)
                    || !on_map(field, buf, ni, nj)
                    || buf.distance_from_center(ni, nj) > max_distance
                {
                    continue;
                }

                let surrounding = self.near_light(buf, field, ni, nj);
                if buf.intensity(ni, nj) < surrounding {
                    buf.set_intensity(ni, nj, surrounding);
                    if resistance_at(field, buf, ni, nj) < 1.0 {
                        queue.push_back((ni, nj));
                    }
                }
            }
        }
    }
}

impl Ripple {
    /// Best brightness `(i, j)` can draw from its sampled neighbours.
    /// Marks `(i, j)` near-exposed as a side effect.
    fn near_light<R: ResistanceMap + ?Sized>(
        &self,
        buf: &mut LocalBuffers<'_>,
        field: &R,
        i: i32,
        j: i32,
    ) -> f64 {
        let samples = self.nearest_to_source(buf, field, i, j);
        if samples.is_empty() {
            return 0.0;
        }

        let center = buf.center();
        let mut light = 0.0f64;
        let mut lit = 0usize;
        let mut indirects = 0usize;
        for c in &samples {
            let neighbor_light = buf.intensity(c.i, c.j);
            if neighbor_light <= 0.0 {
                continue;
            }
            lit += 1;
            if buf.near_exposed(c.i, c.j) {
                indirects += 1;
            }
            let step = buf.distance.calculate(c.i - i, c.j - j);
            let resistance = if (c.i, c.j) == (center, center) {
                0.0
            } else {
                resistance_at(field, buf, c.i, c.j)
            };
            light = light.max(neighbor_light - step * buf.decay - resistance);
        }

        if resistance_at(field, buf, i, j) >= 1.0 || indirects >= lit {
            buf.mark_near_exposed(i, j);
        }
        light
    }

    /// The `self.neighbors` in-range neighbours of `(i, j)` closest to the
    /// source, ties kept in enumeration order. Bounded insertion sort.
    fn nearest_to_source<R: ResistanceMap + ?Sized>(
        &self,
        buf: &LocalBuffers<'_>,
        field: &R,
        i: i32,
        j: i32,
    ) -> SmallVec<[Candidate; 8]> {
        let keep = self.neighbors.min(8);
        let mut nearest: SmallVec<[Candidate; 8]> = SmallVec::new();
        if keep == 0 {
            return nearest;
        }
        for dir in AdjacencyRule::EightWay.directions() {
            let (ni, nj) = (i + dir.dx, j + dir.dy);
            if !buf.in_buffer(ni, nj) || !on_map(field, buf, ni, nj) {
                continue;
            }
            let from_center = buf.distance_from_center(ni, nj);
            let slot = nearest
                .iter()
                .position(|c| from_center < c.from_center)
                .unwrap_or(nearest.len());
            if slot < keep {
                nearest.insert(
                    slot,
                    Candidate {
                        i: ni,
                        j: nj,
                        from_center,
                    },
                );
                nearest.truncate(keep);
            }
        }
        nearest
    }
}
