//! Batch CLI for scan_treads with JSON configuration
//!
//! Processes every image under the configured input path, writes the
//! aggregate JSON report plus one visualization per image, and prints a
//! run summary.

use scan_treads::{run_batch, PipelineConfig, RunSummary};
use std::{env, fs, path::Path, process};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help(&args[0]);
        process::exit(1);
    }

    let config_path = Path::new(&args[1]);
    if !config_path.exists() {
        eprintln!("Error: Config file '{}' does not exist", config_path.display());
        process::exit(1);
    }

    let config = match PipelineConfig::from_json_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config file: {}", e);
            process::exit(1);
        }
    };

    eprintln!("Loaded configuration from {}", config_path.display());
    eprintln!("Input path: {}", config.input_path.display());
    eprintln!("Output path: {}", config.output_path.display());
    eprintln!();

    if let Err(e) = fs::create_dir_all(&config.output_path) {
        eprintln!("Error creating output directory: {}", e);
        process::exit(1);
    }
    let visual_dir = config.output_path.join("visual");

    let records = match run_batch(&config.input_path, &visual_dir, &config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error enumerating input: {}", e);
            process::exit(1);
        }
    };

    if records.is_empty() {
        eprintln!("No image files found in {}", config.input_path.display());
        process::exit(1);
    }

    let json_path = config.output_path.join("results.json");
    match serde_json::to_string_pretty(&records) {
        Ok(json) => {
            if let Err(e) = fs::write(&json_path, json) {
                eprintln!("Error writing report: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            process::exit(1);
        }
    }

    let summary = RunSummary::from_records(&records);

    eprintln!();
    eprintln!("***********************************");
    eprintln!("Total_image: {}", summary.total_images);
    eprintln!("===================================");
    for record in &records {
        eprintln!("File: {}", record.file_name());
        match record.error() {
            Some(error) => eprintln!("Error: {}", error),
            None => {
                let (passed, failed) = record.decision_counts();
                eprintln!("Passed_item: {}", passed);
                eprintln!("Failed_item: {}", failed);
            }
        }
        eprintln!("===================================");
    }
    eprintln!("Total_passed: {}", summary.total_passed);
    eprintln!("Total_failed: {}", summary.total_failed);
    eprintln!("JSON saved: {}", json_path.display());
    eprintln!("Visual saved: {}", visual_dir.display());
    eprintln!("***********************************");
    eprintln!();

    if summary.failed_images > 0 {
        process::exit(1);
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} <config.json>", program_name);
    eprintln!();
    eprintln!("Batch inspect tire tread pattern images using a JSON configuration.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json    JSON file containing the pipeline configuration,");
    eprintln!("                 including input_path and output_path");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG=info  Print per-image progress while processing");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} run_config.json", program_name);
    eprintln!("  RUST_LOG=info {} run_config.json", program_name);
}
