use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use yolo_post_core::PredictionBatch;
use yolo_post_nms::{CenterBox, bbox};

mod pipeline;
mod settings;

use settings::PostprocessConfig;

#[derive(Parser)]
#[command(name = "yolo-post")]
#[command(about = "Suppress overlapping YOLO detections in decoded prediction buffers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run suppression over a batch of predictions (JSON).
    Suppress {
        /// Decoded predictions (JSON): {"num_classes": C, "images": [[[tx, ty, tw, th, obj, ..]]]}
        #[arg(long)]
        input: PathBuf,

        /// Postprocessing config (TOML). Built-in defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Detector output head whose suppression settings apply.
        #[arg(long, default_value_t = 0)]
        head: usize,

        /// Override the minimum score for reported detections.
        #[arg(long)]
        min_score: Option<f32>,

        /// Where to write the result (JSON). Stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the IoU of two center-form boxes.
    Iou {
        /// First box as cx,cy,w,h
        #[arg(long, value_parser = parse_box, allow_hyphen_values = true)]
        a: [f32; 4],

        /// Second box as cx,cy,w,h
        #[arg(long, value_parser = parse_box, allow_hyphen_values = true)]
        b: [f32; 4],
    },

    /// Print the effective configuration.
    ShowConfig {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn parse_box(s: &str) -> std::result::Result<[f32; 4], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("{:?}: {}", v, e)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    values
        .try_into()
        .map_err(|values: Vec<f32>| format!("expected 4 values (cx,cy,w,h), got {}", values.len()))
}

fn load_config(path: Option<&Path>) -> Result<PostprocessConfig> {
    match path {
        Some(path) => PostprocessConfig::load(path),
        None => Ok(PostprocessConfig::default()),
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Suppress {
            input,
            config,
            head,
            min_score,
            out,
        } => {
            let config = load_config(config.as_deref())?;
            let batch = PredictionBatch::load(&input)?;
            info!("Loaded {} images from {:?}", batch.len(), input);

            let result = pipeline::run_suppression(batch, &config, head, min_score)?;
            let json = serde_json::to_string_pretty(&result)
                .context("Failed to serialize detections")?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write detections: {:?}", path))?;
                    info!("Detections written to {:?}", path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Iou { a, b } => {
            let (a, b) = (CenterBox::from_array(a), CenterBox::from_array(b));
            for (name, center) in [("a", &a), ("b", &b)] {
                if center.is_degenerate() {
                    anyhow::bail!("box {} is degenerate: {:?}", name, center);
                }
            }
            println!("{:.6}", bbox::iou(&a.to_corners(), &b.to_corners()));
        }
        Commands::ShowConfig { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
