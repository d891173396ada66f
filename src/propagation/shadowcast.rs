//! Recursive shadowcasting with linear brightness falloff.
//!
//! Visibility is binary: a cell with resistance `>= 1` blocks sight, anything
//! less is transparent. Lit cells get `1 - decay * distance`. Each of the
//! eight octants is scanned ring by ring between a `start` and `end` slope;
//! hitting a wall mid-ring queues a continuation for the still-open range
//! beyond it. Continuations live on an explicit stack rather than the call
//! stack, and each one starts at least one ring further out, so the walk
//! terminates after at most `radius` rings per branch.

use crate::geometry::AdjacencyRule;
use crate::resistance::ResistanceMap;

use super::{LocalBuffers, PropagationAlgorithm, on_map, resistance_at};

/// Shadowcasting field of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shadowcast;

/// Maps octant-local `(dx, dy)` onto buffer axes.
#[derive(Debug, Clone, Copy)]
struct Octant {
    xx: i32,
    xy: i32,
    yx: i32,
    yy: i32,
}

/// One pending ring scan.
#[derive(Debug, Clone, Copy)]
struct ScanFrame {
    row: i32,
    start: f64,
    end: f64,
    octant: Octant,
}

/// Two octants per diagonal, in diagonal enumeration order.
fn octants() -> impl Iterator<Item = Octant> {
    AdjacencyRule::Diagonals.directions().iter().flat_map(|d| {
        [
            Octant {
                xx: 0,
                xy: d.dx,
                yx: d.dy,
                yy: 0,
            },
            Octant {
                xx: d.dx,
                xy: 0,
                yx: 0,
                yy: d.dy,
            },
        ]
    })
}

impl PropagationAlgorithm for Shadowcast {
    fn spread<R: ResistanceMap + ?Sized>(&self, buf: &mut LocalBuffers<'_>, field: &R) {
        let mut stack = Vec::new();
        for octant in octants() {
            stack.push(ScanFrame {
                row: 1,
                start: 1.0,
                end: 0.0,
                octant,
            });
            while let Some(frame) = stack.pop() {
                scan(frame, buf, field, &mut stack);
            }
        }
    }
}

/// Walk rings from `frame.row` outward until the range closes or the radius is hit.
fn scan<R: ResistanceMap + ?Sized>(
    frame: ScanFrame,
    buf: &mut LocalBuffers<'_>,
    field: &R,
    stack: &mut Vec<ScanFrame>,
) {
    let ScanFrame {
        row,
        mut start,
        end,
        octant,
    } = frame;
    if start < end {
        return;
    }

    let radius = buf.center();
    let max_distance = buf.radius as f64;
    let mut new_start = 0.0;
    let mut blocked = false;
    let mut distance = row;

    while distance <= radius && !blocked {
        let dy = -distance;
        for dx in -distance..=0 {
            let i = radius + dx * octant.xx + dy * octant.xy;
            let j = radius + dx * octant.yx + dy * octant.yy;
            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if !on_map(field, buf, i, j) || start < right_slope {
                continue;
            }
            if end > left_slope {
                break;
            }

            let d = buf.distance.calculate(dx, dy);
            if d <= max_distance {
                let bright = 1.0 - buf.decay * d;
                buf.set_intensity(i, j, bright);
            }

            let opaque = resistance_at(field, buf, i, j) >= 1.0;
            if blocked {
                if opaque {
                    new_start = right_slope;
                    continue;
                }
                blocked = false;
                start = new_start;
            } else if opaque && distance < radius {
                blocked = true;
                stack.push(ScanFrame {
                    row: distance + 1,
                    start,
                    end: left_slope,
                    octant,
                });
                new_start = right_slope;
            }
        }
        distance += 1;
    }
}
