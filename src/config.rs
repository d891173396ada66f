//! Configuration for the demo binary.

use std::path::PathBuf;

use crate::error::SenseError;
use crate::geometry::Distance;
use crate::source::SourceType;

/// What the binary should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Usage,
    Demo,
    Benchmark,
}

/// Settings for the demo room and its light.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub mode: Mode,
    /// Grid size (width x height in cells)
    pub grid_size: (usize, usize),
    pub radius: i32,
    pub source_type: SourceType,
    pub distance: Distance,
    /// Resistance of walls and pillars (>= 1.0 blocks sight)
    pub wall_resistance: f64,
    /// Resistance of the glass window
    pub glass_resistance: f64,
    /// Where to write a PPM of the result, if anywhere
    pub ppm_path: Option<PathBuf>,
    /// Pixel scale factor for the PPM
    pub scale: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Usage,
            grid_size: (40, 20),
            radius: 12,
            source_type: SourceType::Ripple,
            distance: Distance::Euclidean,
            wall_resistance: 1.0,
            glass_resistance: 0.5,
            ppm_path: None,
            scale: 12,
        }
    }
}

impl DemoConfig {
    /// Parse command-line arguments (without the program name).
    pub fn from_args<I, S>(args: I) -> Result<Self, SenseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = DemoConfig::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "--demo" => config.mode = Mode::Demo,
                "--benchmark" => config.mode = Mode::Benchmark,
                "--algorithm" => config.source_type = value(&mut args, arg)?.parse()?,
                "--distance" => config.distance = value(&mut args, arg)?.parse()?,
                "--radius" => config.radius = parse_number(&value(&mut args, arg)?, arg)?,
                "--size" => {
                    let raw = value(&mut args, arg)?;
                    let (w, h) = raw.split_once('x').ok_or_else(|| SenseError::InvalidArgument {
                        reason: format!("--size expects WxH, got {raw:?}"),
                    })?;
                    config.grid_size = (parse_number(w, arg)?, parse_number(h, arg)?);
                }
                "--ppm" => config.ppm_path = Some(PathBuf::from(value(&mut args, arg)?)),
                "--scale" => config.scale = parse_number(&value(&mut args, arg)?, arg)?,
                other => {
                    return Err(SenseError::InvalidArgument {
                        reason: format!("unknown flag {other:?}"),
                    });
                }
            }
        }
        if config.radius < 0 {
            return Err(SenseError::NegativeRadius {
                radius: config.radius,
            });
        }
        if config.grid_size.0 < 5 || config.grid_size.1 < 5 {
            return Err(SenseError::InvalidArgument {
                reason: format!("grid must be at least 5x5, got {:?}", config.grid_size),
            });
        }
        Ok(config)
    }
}

fn value<I, S>(args: &mut I, flag: &str) -> Result<String, SenseError>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    args.next()
        .map(|s| s.as_ref().to_string())
        .ok_or_else(|| SenseError::InvalidArgument {
            reason: format!("{flag} needs a value"),
        })
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, SenseError> {
    raw.parse().map_err(|_| SenseError::InvalidArgument {
        reason: format!("{flag}: {raw:?} is not a number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_prints_usage() {
        let config = DemoConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.mode, Mode::Usage);
    }

    #[test]
    fn parses_demo_flags() {
        let config = DemoConfig::from_args([
            "--demo",
            "--algorithm",
            "shadowcast",
            "--distance",
            "manhattan",
            "--radius",
            "7",
            "--size",
            "30x15",
            "--ppm",
            "out.ppm",
        ])
        .unwrap();
        assert_eq!(config.mode, Mode::Demo);
        assert_eq!(config.source_type, SourceType::Shadowcast);
        assert_eq!(config.distance, Distance::Manhattan);
        assert_eq!(config.radius, 7);
        assert_eq!(config.grid_size, (30, 15));
        assert_eq!(config.ppm_path, Some(PathBuf::from("out.ppm")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            DemoConfig::from_args(["--algorithm", "flood"]),
            Err(SenseError::UnknownSourceType { .. })
        ));
        assert_eq!(
            DemoConfig::from_args(["--radius", "-2"]),
            Err(SenseError::NegativeRadius { radius: -2 })
        );
        assert!(matches!(
            DemoConfig::from_args(["--radius"]),
            Err(SenseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            DemoConfig::from_args(["--size", "30"]),
            Err(SenseError::InvalidArgument { .. })
        ));
        assert!(matches!(
            DemoConfig::from_args(["--fast"]),
            Err(SenseError::InvalidArgument { .. })
        ));
    }
}
