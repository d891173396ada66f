use std::time::Instant;

use sensemap::{
    DemoConfig, Distance, Mode, ResistanceGrid, ResistanceMap, SenseError, SenseMap, SenseSource,
    SourceType, propagate, save_ppm, to_ascii,
};

fn main() {
    env_logger::init();

    let config = match DemoConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            print_usage();
            std::process::exit(2);
        }
    };

    let result = match config.mode {
        Mode::Usage => {
            print_usage();
            Ok(())
        }
        Mode::Demo => run_demo(&config),
        Mode::Benchmark => run_benchmark(&config),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Sense Map");
    println!("Run with --demo for a lit room printed to the terminal");
    println!("Run with --benchmark to test performance");
    println!();
    println!("Options:");
    println!("  --algorithm <shadowcast|ripple_tight|ripple|ripple_loose|ripple_very_loose>");
    println!("  --distance  <chebyshev|euclidean|manhattan>");
    println!("  --radius    <n>");
    println!("  --size      <W>x<H>");
    println!("  --ppm       <path>   also write the result as an image");
    println!("  --scale     <n>      pixels per cell in the image");
}

/// Room with a pillar row, a dividing wall with a door, and a glass window.
fn build_room(config: &DemoConfig) -> Result<ResistanceGrid, SenseError> {
    let (w, h) = config.grid_size;
    let wall = config.wall_resistance;
    let mut grid = ResistanceGrid::new(w, h)?;

    // Outer walls
    grid.fill_rect(0, 0, w, 1, wall);
    grid.fill_rect(0, h - 1, w, 1, wall);
    grid.fill_rect(0, 0, 1, h, wall);
    grid.fill_rect(w - 1, 0, 1, h, wall);

    // Dividing wall two thirds across, with a door and a window
    let divide = w * 2 / 3;
    grid.fill_rect(divide, 0, 1, h, wall);
    grid.set(divide, h / 3, 0.0);
    grid.fill_rect(divide, h * 2 / 3, 1, 2.min(h - 2 - h * 2 / 3), config.glass_resistance);

    // Pillars
    for x in (4..divide.saturating_sub(2)).step_by(5) {
        grid.set(x, h / 4, wall);
        grid.set(x, h - 1 - h / 4, wall);
    }

    if grid
        .as_slice()
        .iter()
        .any(|&r| !(0.0..=1.0).contains(&r))
    {
        log::warn!("demo room has resistance outside [0, 1]; results may exceed the unit range");
    }
    Ok(grid)
}

fn run_demo(config: &DemoConfig) -> Result<(), SenseError> {
    let grid = build_room(config)?;
    let (w, h) = config.grid_size;
    let light_pos = ((w / 3) as i32, (h / 2) as i32);

    let mut map = SenseMap::new(grid);
    map.add_source(SenseSource::new(
        config.source_type,
        light_pos,
        config.radius,
        config.distance,
    )?);

    let start = Instant::now();
    map.calculate();
    let elapsed = start.elapsed();

    println!(
        "{} source at {:?}, radius {}, {} distance ({:.3} ms)",
        config.source_type,
        light_pos,
        config.radius,
        config.distance,
        elapsed.as_secs_f64() * 1000.0
    );
    print!("{}", to_ascii(map.field(), map.resistance()));
    println!("{} cells sensed", map.current_sense_map().count());

    if let Some(path) = &config.ppm_path {
        save_ppm(path, map.field(), map.resistance(), config.scale).map_err(|e| {
            SenseError::InvalidArgument {
                reason: format!("cannot write {}: {e}", path.display()),
            }
        })?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_benchmark(config: &DemoConfig) -> Result<(), SenseError> {
    println!("=== Per-Source Propagation Benchmark ===\n");

    let iterations = 20;
    let radii = [5, 10, 20, 40];

    for radius in radii {
        let side = 2 * radius as usize + 3;
        let mut grid = ResistanceGrid::new(side, side)?;
        // Sparse pillars so every algorithm has something to route around
        for k in (2..side - 2).step_by(4) {
            grid.set(k, side / 3, 1.0);
            grid.set(side / 3, k, 0.5);
        }
        let center = (side / 2) as i32;

        println!("Radius: {radius} ({side}x{side} grid)");
        println!("-----------------------");
        for source_type in SourceType::ALL {
            let mut source = SenseSource::new(source_type, (center, center), radius, config.distance)?;
            let start = Instant::now();
            for _ in 0..iterations {
                propagate(&mut source, &grid);
            }
            let avg_ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;
            println!("  {:<18} {:.3} ms/iter", source_type.name(), avg_ms);
        }
        println!();
    }

    println!("=== Multi-Source Aggregation ===");
    println!("(Sequential vs rayon-parallel propagation)\n");

    let (width, height) = (120, 120);
    let grid = ResistanceGrid::new(width, height)?;
    let mut timings = Vec::new();
    for parallel in [false, true] {
        let mut map = SenseMap::new(grid.clone());
        map.set_parallel(parallel);
        for k in 0..16 {
            let pos = (10 + (k % 4) * 30, 10 + (k / 4) * 30);
            let source_type = SourceType::ALL[k as usize % SourceType::ALL.len()];
            map.add_source(SenseSource::new(source_type, pos, 15, Distance::Euclidean)?);
        }
        let start = Instant::now();
        for _ in 0..iterations {
            map.calculate();
        }
        timings.push(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64);
        log::debug!("{} cells sensed", map.current_sense_map().count());
    }

    let (sequential, parallel) = (timings[0], timings[1]);
    println!("Grid size: {}x{}, 16 sources", grid.width(), grid.height());
    println!("-----------------------");
    println!("  Sequential: {sequential:.3} ms/iter");
    println!("  Parallel:   {parallel:.3} ms/iter");
    println!("  Speedup: {:.2}x", sequential / parallel);
    Ok(())
}
