//! GlyphForge CLI - Training source generation
//!
//! Commands: generate, render-list, classes
//! Outputs JSON to stdout, logs to stderr
//! Returns non-zero on failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use glyphforge_core::{
    manifest::load_unicode_chars,
    ClassIndex, GenerationConfig, ImageSize, RenderListRequest, TrainingSourceEmitter,
};

#[derive(Parser)]
#[command(name = "glyphforge-cli")]
#[command(about = "GlyphForge CLI - Glyph Training Source Generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render character lists into both training layouts
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "training/t01")]
        output: PathBuf,

        /// Replay a config.json instead of the flags below
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Character list file (repeatable)
        #[arg(short, long = "list", required_unless_present = "config")]
        lists: Vec<PathBuf>,

        /// Font file (repeatable)
        #[arg(short, long = "font", required_unless_present = "config")]
        fonts: Vec<PathBuf>,

        /// Font size in pixels
        #[arg(long, default_value_t = 16)]
        font_size: u32,

        /// Image size as WxH
        #[arg(long, default_value = "30x30")]
        image_size: ImageSize,

        /// Image file extension
        #[arg(short, long, default_value = "jpg")]
        extension: String,
    },

    /// Render one list with one font, writing a generation log
    RenderList {
        /// Output directory
        #[arg(short, long, default_value = "public")]
        output: PathBuf,

        /// Character list file
        #[arg(short, long)]
        list: PathBuf,

        /// Font file
        #[arg(short, long)]
        font: PathBuf,

        /// Font size in pixels
        #[arg(long, default_value_t = 64)]
        font_size: u32,

        /// Image size as WxH
        #[arg(long, default_value = "128x128")]
        image_size: ImageSize,

        /// Image file extension
        #[arg(short, long, default_value = "png")]
        extension: String,
    },

    /// Write class_names.json for a classification directory
    Classes {
        /// The classification/ directory of a generated run
        #[arg(short, long)]
        classification_dir: PathBuf,

        /// Directory to write class_names.json into
        #[arg(short, long)]
        output: PathBuf,

        /// unicode_char.json used to show characters for class ids
        #[arg(short, long)]
        unicode_map: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let emitter = TrainingSourceEmitter::new();

    match cli.command {
        Commands::Generate { output, config, lists, fonts, font_size, image_size, extension } => {
            let config = match config {
                Some(path) => match GenerationConfig::load(&path) {
                    Ok(c) => c,
                    Err(e) => return fail(e),
                },
                None => GenerationConfig {
                    text_file_paths: lists,
                    font_paths: fonts,
                    font_size,
                    image_size,
                    extension,
                },
            };

            match emitter.generate(&output, &config) {
                Ok(summary) => {
                    let output = serde_json::json!({
                        "success": true,
                        "summary": summary,
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }

        Commands::RenderList { output, list, font, font_size, image_size, extension } => {
            let request = RenderListRequest {
                text_file_path: list,
                font_path: font,
                font_size,
                image_size,
                extension,
            };

            match emitter.render_list(&output, &request) {
                Ok(logs) => {
                    let output = serde_json::json!({
                        "success": true,
                        "images": logs.len(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output).unwrap());
                    ExitCode::SUCCESS
                }
                Err(e) => fail(e),
            }
        }

        Commands::Classes { classification_dir, output, unicode_map } => {
            let index = match ClassIndex::from_dir(&classification_dir) {
                Ok(i) => i,
                Err(e) => return fail(e),
            };
            let path = match index.write(&output) {
                Ok(p) => p,
                Err(e) => return fail(e),
            };

            let characters: Vec<Option<String>> = match unicode_map {
                Some(map_path) => match load_unicode_chars(&map_path) {
                    Ok(map) => (0..index.len())
                        .map(|i| index.character(i, &map).map(str::to_string))
                        .collect(),
                    Err(e) => return fail(e),
                },
                None => vec![],
            };

            let output = serde_json::json!({
                "success": true,
                "classes": index.len(),
                "path": path,
                "characters": characters,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
            ExitCode::SUCCESS
        }
    }
}

fn fail(error: impl std::fmt::Display) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", serde_json::to_string(&output).unwrap());
    ExitCode::FAILURE
}
