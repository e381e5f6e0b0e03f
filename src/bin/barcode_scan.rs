use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use rust_barcode::scan::prepare_regions;
use rust_barcode::tools::{expand_inputs, grayscale_stats, load_pixels, sweep_angles};
use rust_barcode::{
    CompositeDecoder, ErrorReport, PixelBuffer, RegionRect, Result, RotationSearch, ScanConfig,
    ScanReport, scan_bytes,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "barcode-scan", version, about = "Rotation-search barcode scanner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct ScanOptions {
    /// JSON config file (rotation, max_dim, regions)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Degrees between sampled angles
    #[arg(long)]
    angle_step: Option<u32>,
    /// Number of sampled angles
    #[arg(long)]
    angle_count: Option<u32>,
    /// First sampled angle in degrees
    #[arg(long)]
    start_angle: Option<u32>,
    /// Downscale so the longer side is at most this many pixels (0 = off)
    #[arg(long)]
    max_dim: Option<u32>,
    /// Region to search as x,y,width,height; repeatable
    #[arg(long = "region")]
    regions: Vec<RegionRect>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a single image and print the JSON report
    Scan {
        #[arg(long)]
        image: PathBuf,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
        #[command(flatten)]
        options: ScanOptions,
    },
    /// Scan many images (directories are expanded) and print one report per line
    Batch {
        inputs: Vec<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        options: ScanOptions,
    },
    /// Print grayscale stats and what every angle of the sweep decodes
    Debug {
        #[arg(long)]
        image: PathBuf,
        #[command(flatten)]
        options: ScanOptions,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let ok = match cli.command {
        Command::Scan {
            image,
            pretty,
            options,
        } => scan_cmd(&image, pretty, &options),
        Command::Batch {
            inputs,
            limit,
            options,
        } => batch_cmd(&inputs, limit, &options),
        Command::Debug { image, options } => debug_cmd(&image, &options),
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Config file (or environment), then command-line flags on top
fn build_config(options: &ScanOptions) -> Result<ScanConfig> {
    let mut config = match &options.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::from_env()?,
    };
    if let Some(step) = options.angle_step {
        config.rotation.angle_step = step;
    }
    if let Some(count) = options.angle_count {
        config.rotation.angle_count = count;
    }
    if let Some(start) = options.start_angle {
        config.rotation.start_angle = start % 360;
    }
    if let Some(max_dim) = options.max_dim {
        config.max_dim = max_dim;
    }
    if !options.regions.is_empty() {
        config.regions = options.regions.clone();
    }
    config.rotation.validate()?;
    Ok(config)
}

fn scan_file(path: &Path, config: &ScanConfig) -> Result<ScanReport> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    scan_bytes(&filename, &bytes, config, CompositeDecoder::default())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(err) => eprintln!("Failed to render report: {}", err),
    }
}

fn scan_cmd(image: &Path, pretty: bool, options: &ScanOptions) -> bool {
    let result = build_config(options).and_then(|config| scan_file(image, &config));
    match result {
        Ok(report) => {
            print_json(&report, pretty);
            true
        }
        Err(err) => {
            log::error!("scan of {} failed: {}", image.display(), err);
            print_json(&ErrorReport::from_error(&err), pretty);
            false
        }
    }
}

fn batch_cmd(inputs: &[PathBuf], limit: Option<usize>, options: &ScanOptions) -> bool {
    let config = match build_config(options) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            return false;
        }
    };

    let paths = expand_inputs(inputs, limit);
    let start = Instant::now();
    let results: Vec<Result<ScanReport>> = paths
        .par_iter()
        .map(|path| scan_file(path, &config))
        .collect();

    let mut decoded = 0usize;
    let mut failed = 0usize;
    for (path, result) in paths.iter().zip(&results) {
        match result {
            Ok(report) => {
                if !report.results.barcodes.is_empty() {
                    decoded += 1;
                }
                print_json(report, false);
            }
            Err(err) => {
                failed += 1;
                log::warn!("{}: {}", path.display(), err);
                print_json(&ErrorReport::from_error(err), false);
            }
        }
    }

    eprintln!(
        "Scanned {} images in {:.2?}: {} with barcodes, {} failed",
        paths.len(),
        start.elapsed(),
        decoded,
        failed
    );
    failed == 0
}

fn debug_cmd(image: &Path, options: &ScanOptions) -> bool {
    let config = match build_config(options) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            return false;
        }
    };
    // Full resolution; regions are cropped before downscaling, as in a scan.
    let regions = load_pixels(image, 0).and_then(|pixels| {
        println!(
            "Image: {} ({}x{}, {} channels)",
            image.display(),
            pixels.width(),
            pixels.height(),
            pixels.channels()
        );
        prepare_regions(&pixels, &config)
    });
    let regions = match regions {
        Ok(regions) => regions,
        Err(err) => {
            eprintln!("Failed to prepare image {}: {}", image.display(), err);
            return false;
        }
    };

    let decoder = CompositeDecoder::default();
    let search = match RotationSearch::with_config(&decoder, config.rotation) {
        Ok(search) => search,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            return false;
        }
    };

    for (rect, region) in &regions {
        match rect {
            Some(rect) => println!("Region {} ({}x{})", rect, region.width(), region.height()),
            None => println!("Whole image ({}x{})", region.width(), region.height()),
        }
        debug_region(region, &config, &search);
    }
    true
}

fn debug_region(
    region: &PixelBuffer,
    config: &ScanConfig,
    search: &RotationSearch<&CompositeDecoder>,
) {
    let stats = grayscale_stats(&region.to_grayscale());
    println!(
        "  Grayscale range: {}-{}, average: {}",
        stats.min, stats.max, stats.avg
    );

    for attempt in sweep_angles(region, config.rotation.angles(), search.decoder()) {
        println!(
            "  {:>3} deg: threshold={} black_ratio={:.2}% symbols={}",
            attempt.angle,
            attempt.threshold,
            attempt.binary.black_ratio * 100.0,
            attempt.symbols.len()
        );
        for symbol in &attempt.symbols {
            println!(
                "      {} {}",
                symbol.symbology,
                String::from_utf8_lossy(&symbol.content)
            );
        }
    }

    match search.search_symbols(region) {
        Some(hit) => {
            for symbol in &hit.symbols {
                println!(
                    "  Search: {} '{}' at {} deg",
                    symbol.symbology,
                    String::from_utf8_lossy(&symbol.content),
                    hit.angle
                );
            }
        }
        None => println!(
            "  Search: nothing after {} attempts",
            config.rotation.angle_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_takes_regions_and_start_angle() {
        let cli = Cli::try_parse_from([
            "barcode-scan",
            "debug",
            "--image",
            "shelf.png",
            "--region",
            "10,20,30,40",
            "--start-angle",
            "390",
            "--angle-step",
            "90",
            "--angle-count",
            "4",
        ])
        .unwrap();
        let Command::Debug { options, .. } = cli.command else {
            panic!("expected the debug subcommand");
        };

        let config = build_config(&options).unwrap();
        assert_eq!(config.regions, vec![RegionRect::new(10, 20, 30, 40)]);
        assert_eq!(config.rotation.angles().collect::<Vec<_>>(), vec![30, 120, 210, 300]);
    }

    #[test]
    fn test_invalid_sweep_rejected() {
        let cli = Cli::try_parse_from([
            "barcode-scan",
            "scan",
            "--image",
            "a.png",
            "--angle-step",
            "90",
            "--angle-count",
            "5",
        ])
        .unwrap();
        let Command::Scan { options, .. } = cli.command else {
            panic!("expected the scan subcommand");
        };
        assert!(build_config(&options).is_err());
    }
}
