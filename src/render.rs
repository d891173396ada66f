//! Diagnostics: turn intensity fields into text or images for inspection.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::resistance::ResistanceMap;

/// Shade ramp from dark to bright.
const RAMP: &[u8] = b" .:-=+*%@";

/// Convert an intensity (0.0-1.0) to a byte (0-255).
#[inline]
pub fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

/// Fixed-width numeric dump of a row-major field, one row per line.
pub fn field_to_string(field: &[f64], width: usize) -> String {
    let mut result = String::new();
    for row in field.chunks(width.max(1)) {
        for value in row {
            result.push_str(&format!("{value:5.2} "));
        }
        result.push('\n');
    }
    result
}

/// Shade-ramp picture of a field; opaque cells are drawn as `#`.
pub fn to_ascii<R: ResistanceMap>(field: &[f64], walls: &R) -> String {
    let width = walls.width();
    let height = walls.height();
    let mut result = String::with_capacity((width + 1) * height);
    for y in 0..height {
        for x in 0..width {
            if walls.resistance(x, y) >= 1.0 {
                result.push('#');
                continue;
            }
            let value = field[y * width + x].clamp(0.0, 1.0);
            let shade = if value <= 0.0 {
                0
            } else {
                1 + ((value * (RAMP.len() - 2) as f64).round() as usize).min(RAMP.len() - 2)
            };
            result.push(RAMP[shade] as char);
        }
        result.push('\n');
    }
    result
}

/// Write a field as a plain PPM, each cell `scale` x `scale` pixels.
/// Cells at or above `wall_threshold` resistance are drawn grey.
pub fn write_ppm<W: Write, R: ResistanceMap>(
    out: &mut W,
    field: &[f64],
    walls: Option<&R>,
    width: usize,
    height: usize,
    wall_threshold: f64,
    scale: usize,
) -> io::Result<()> {
    let img_width = width * scale;
    let img_height = height * scale;

    writeln!(out, "P3")?;
    writeln!(out, "{img_width} {img_height}")?;
    writeln!(out, "255")?;

    for img_y in 0..img_height {
        for img_x in 0..img_width {
            let x = img_x / scale;
            let y = img_y / scale;

            let is_wall = walls
                .map(|w| w.resistance(x, y) >= wall_threshold)
                .unwrap_or(false);

            let (r, g, b) = if is_wall {
                (64u8, 64u8, 64u8)
            } else {
                let v = to_byte(field[y * width + x]);
                (v, v, v)
            };
            write!(out, "{r} {g} {b} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Save a field and its walls to a PPM file.
pub fn save_ppm<R: ResistanceMap>(
    path: impl AsRef<Path>,
    field: &[f64],
    walls: &R,
    scale: usize,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_ppm(
        &mut out,
        field,
        Some(walls),
        walls.width(),
        walls.height(),
        1.0,
        scale,
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resistance::ResistanceGrid;

    #[test]
    fn byte_conversion_clamps() {
        assert_eq!(to_byte(-0.5), 0);
        assert_eq!(to_byte(0.5), 127);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(3.0), 255);
    }

    #[test]
    fn numeric_dump_layout() {
        let dump = field_to_string(&[1.0, 0.5, 0.0, 0.25], 2);
        assert_eq!(dump, " 1.00  0.50 \n 0.00  0.25 \n");
    }

    #[test]
    fn ascii_marks_walls_and_shades() {
        let mut walls = ResistanceGrid::new(3, 1).unwrap();
        walls.set(1, 0, 1.0);
        let art = to_ascii(&[1.0, 1.0, 0.0], &walls);
        assert_eq!(art, "@# \n");
    }

    #[test]
    fn ppm_header_and_pixels() {
        let mut walls = ResistanceGrid::new(2, 1).unwrap();
        walls.set(1, 0, 1.0);
        let mut out = Vec::new();
        write_ppm(&mut out, &[1.0, 0.0], Some(&walls), 2, 1, 1.0, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("4 2"));
        assert_eq!(lines.next(), Some("255"));
        assert_eq!(
            lines.next(),
            Some("255 255 255 255 255 255 64 64 64 64 64 64 ")
        );
        assert_eq!(lines.count(), 1);
    }
}
