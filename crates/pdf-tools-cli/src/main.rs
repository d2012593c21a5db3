mod logger;
mod prompt;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logger::StderrLogger;
use pdf_template::{ImageSource, KeepImages, TemplateOptions, ValueMap, ValueSource};
use prompt::TerminalPrompt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdft", about = "Fill placeholders in PDF templates", version)]
struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace {markers} and images in a template PDF
    Fill {
        /// Template PDF
        input: PathBuf,

        /// Output PDF file (overwritten if it exists)
        output: PathBuf,

        /// JSON object mapping marker names to values, instead of prompting
        #[arg(long)]
        values: Option<PathBuf>,

        /// Keep every image without asking
        #[arg(long)]
        keep_images: bool,

        /// JSON options file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Font size for substituted text, in points
        #[arg(long)]
        font_size: Option<f32>,
    },

    /// List the markers and images of a template
    Inspect {
        /// Template PDF
        input: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    StderrLogger::from_verbosity(cli.verbose, cli.quiet).init()?;

    match cli.command {
        Commands::Fill {
            input,
            output,
            values,
            keep_images,
            config,
            font_size,
        } => {
            let mut options = match &config {
                Some(path) => TemplateOptions::load(path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => TemplateOptions::default(),
            };
            if let Some(size) = font_size {
                options.font_size_pt = size;
            }

            let mut map = match &values {
                Some(path) => Some(
                    ValueMap::load(path)
                        .await
                        .with_context(|| format!("loading {}", path.display()))?,
                ),
                None => None,
            };
            let mut value_prompt = TerminalPrompt::stdio();
            let mut image_prompt = TerminalPrompt::stdio();
            let mut keep = KeepImages;

            let value_source: &mut dyn ValueSource = match map.as_mut() {
                Some(map) => map,
                None => &mut value_prompt,
            };
            let image_source: &mut dyn ImageSource = if keep_images {
                &mut keep
            } else {
                &mut image_prompt
            };
            let report = pdf_template::run(&input, &output, value_source, image_source, &options)
                .await
                .with_context(|| format!("filling {}", input.display()))?;

            println!("Markers: {}", report.markers.len());
            println!("Images replaced: {}", report.replaced_images());
            if !report.warnings.is_empty() {
                println!("Skipped items: {}", report.warnings.len());
                for warning in &report.warnings {
                    println!("  {}", warning);
                }
            }
            println!("Filled → {}", output.display());
        }

        Commands::Inspect { input } => {
            let doc = pdf_template::load_pdf(&input)
                .await
                .with_context(|| format!("loading {}", input.display()))?;
            let stats = pdf_template::inspect(&doc)?;

            println!("Template Statistics:");
            println!("  Pages: {}", stats.pages);
            println!("  Text blocks: {}", stats.text_blocks);
            println!("  Images: {} ({} placed)", stats.images, stats.placed_images);
            println!("  Markers: {}", stats.markers.len());
            for marker in &stats.markers {
                println!("    {{{}}}", marker);
            }
        }
    }

    Ok(())
}
