//! Command-line interface for scan_treads
//!
//! Inspects a single tread image and prints the result record as JSON.

use scan_treads::{run_one_image, PipelineConfig};
use std::{
    env,
    path::{Path, PathBuf},
    process,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut visual_dir = PathBuf::from("output/visual");
    let mut image_path_arg: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --config requires a file argument");
                    process::exit(1);
                }
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 1;
            }
            "--visual" => {
                if i + 1 >= args.len() {
                    eprintln!("Error: --visual requires a directory argument");
                    process::exit(1);
                }
                visual_dir = PathBuf::from(&args[i + 1]);
                i += 1;
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if !arg.starts_with("--") => {
                if image_path_arg.is_none() {
                    image_path_arg = Some(arg.to_string());
                } else {
                    eprintln!("Error: Multiple image paths provided");
                    process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                eprintln!("Use --help for usage information");
                process::exit(1);
            }
        }
        i += 1;
    }

    let image_path_str = match image_path_arg {
        Some(path) => path,
        None => {
            print_help(&args[0]);
            process::exit(1);
        }
    };
    let image_path = Path::new(&image_path_str);

    if !image_path.exists() {
        eprintln!("Error: File '{}' does not exist", image_path.display());
        process::exit(1);
    }

    let config = match config_path {
        Some(path) => match PipelineConfig::from_json_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config file: {}", e);
                process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };

    match run_one_image(image_path, &visual_dir, &config) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing result: {}", e);
                    process::exit(1);
                }
            }

            eprintln!();
            eprintln!("Tread Inspection Summary:");
            eprintln!(
                "  Land-sea ratio: {:.4} [{:.2}, {:.2}] -> {}",
                report.land_sea.ratio,
                report.land_sea.threshold_low,
                report.land_sea.threshold_high,
                pass_str(report.land_sea.passed)
            );
            eprintln!(
                "  Symmetry: {:.4} (>= {:.2}, shift {}) -> {}",
                report.symmetry.score,
                report.symmetry.threshold,
                report.symmetry.best_shift,
                pass_str(report.symmetry.passed)
            );
            eprintln!("  Centerline: x={}", report.symmetry.center_x);
            eprintln!("  Visualization: {}", report.visual_path);

            if report.passed.iter().any(|&p| !p) {
                process::exit(2);
            }
        }
        Err(error) => {
            eprintln!("Inspection failed: {}", error);
            if error.is_content_failure() {
                eprintln!("Suggestion: {}", error.user_message());
            }
            process::exit(1);
        }
    }
}

fn pass_str(passed: bool) -> &'static str {
    if passed {
        "PASS"
    } else {
        "FAIL"
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <image_path>", program_name);
    eprintln!();
    eprintln!("Inspect a tire tread pattern image.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE    JSON pipeline configuration (default: built-in defaults)");
    eprintln!("  --visual DIR     Directory for the review composite (default: output/visual)");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Exit codes: 0 all checks passed, 1 error, 2 at least one check failed");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} tread.jpg", program_name);
    eprintln!("  {} --config run.json --visual out/ tread.png", program_name);
}
