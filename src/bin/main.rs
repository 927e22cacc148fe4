//! Storybook CLI
//!
//! Inspect a book configuration, simulate page turns and export posed pages.

use clap::{Args, Parser, Subcommand, ValueEnum};
use storybook_pages::{
    build_pages, export_page_glb, export_page_raw, texture_ids, Book, BookConfig, StepEvent,
    TextureRegistry,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "storybook")]
#[command(author, version, about = "Simulate and export the pages of a 3D storybook", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
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
    /// List the pages of a book with their labels and textures
    Pages {
        /// Book configuration JSON (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Request a page and run frames, printing each page step and the final pose
    Simulate {
        #[command(flatten)]
        run: RunArgs,

        /// Print the final pose as pretty JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Export one page in its pose after a simulated run
    Export {
        #[command(flatten)]
        run: RunArgs,

        /// Page number to export
        #[arg(short, long)]
        page: usize,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Book configuration JSON (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page index to request before running
    #[arg(short, long)]
    target: Option<usize>,

    /// Number of frames to run
    #[arg(long, default_value = "120")]
    frames: usize,

    /// Seconds per frame
    #[arg(long, default_value = "0.016666668")]
    delta: f32,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF with skin and bone chain
    Glb,
    /// Flat vertex buffers and skinned positions as JSON
    Raw,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = log_level(cli.verbose, cli.quiet) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Pages { config } => list_pages(config.as_deref())?,
        Commands::Simulate { run, pretty } => {
            let (book, steps) = simulate(&run)?;
            for step in &steps {
                println!("{:>8.1}ms  page {} -> {}", step.at_ms, step.from, step.to);
            }
            let pose = book.pose();
            let json = if pretty {
                serde_json::to_string_pretty(&pose)?
            } else {
                serde_json::to_string(&pose)?
            };
            println!("{}", json);
        }
        Commands::Export {
            run,
            page,
            output,
            format,
        } => {
            let (book, _) = simulate(&run)?;
            export_page(&book, page, &output, format)?;
        }
    }

    Ok(())
}

/// Level forced by the `-v`/`-q` flags; `None` leaves `RUST_LOG` in charge.
fn log_level(verbose: u8, quiet: bool) -> Option<log::LevelFilter> {
    match verbose {
        0 if quiet => Some(log::LevelFilter::Error),
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn load_config(path: Option<&Path>) -> storybook_pages::Result<BookConfig> {
    match path {
        Some(path) => {
            log::info!("Loading config from {:?}", path);
            BookConfig::from_path(path)
        }
        None => Ok(BookConfig::default()),
    }
}

/// Build a book with every catalog texture available.
fn open_book(config: BookConfig) -> storybook_pages::Result<Book> {
    let pages = build_pages(&config.catalog)?;
    let textures = TextureRegistry::preloaded(texture_ids(&pages));
    Book::new(config, &textures)
}

fn list_pages(config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let book = open_book(load_config(config)?)?;
    let catalog = &book.config().catalog;

    println!("{} pages", book.page_count());
    for (page, label) in book.pages().iter().zip(book.page_labels()) {
        println!(
            "  {:<8} front {:<18} back {:<18}",
            label,
            page.spec().front,
            page.spec().back
        );
        println!("           {}", catalog.texture_uri(&page.spec().front));
        println!("           {}", catalog.texture_uri(&page.spec().back));
    }
    // The selector also offers the back cover.
    println!("  {:<8} (closed from the back)", format!("Page {}", book.page_count()));
    Ok(())
}

fn simulate(run: &RunArgs) -> Result<(Book, Vec<StepEvent>), Box<dyn std::error::Error>> {
    let mut book = open_book(load_config(run.config.as_deref())?)?;

    if let Some(target) = run.target {
        book.set_requested_page(target)?;
    }

    let mut steps = Vec::new();
    for _ in 0..run.frames {
        steps.extend(book.advance_frame(run.delta));
    }
    log::info!(
        "Ran {} frames to {:.0}ms, displayed page {}",
        run.frames,
        book.clock_ms(),
        book.delayed_page()
    );
    Ok((book, steps))
}

fn export_page(
    book: &Book,
    page: usize,
    output: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Glb => {
            let path = output.with_extension("glb");
            let glb_data = export_page_glb(book, page)?;
            fs::write(&path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), path);
        }
        OutputFormat::Raw => {
            let path = output.with_extension("json");
            let raw = export_page_raw(book, page)?;
            let json = serde_json::json!({
                "positions": raw.positions_flat(),
                "normals": raw.normals_flat(),
                "uvs": raw.uvs_flat(),
                "joints": raw.joints_flat(),
                "weights": raw.weights_flat(),
                "indices": raw.indices,
                "groups": raw.groups_flat(),
                "skinnedPositions": raw.skinned_positions_flat(),
            });
            fs::write(&path, serde_json::to_string(&json)?)?;
            println!(
                "Exported {} vertices, {} triangles to {:?}",
                raw.vertex_count(),
                raw.triangle_count(),
                path
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(log_level(0, false), None);
        assert_eq!(log_level(0, true), Some(LevelFilter::Error));
        assert_eq!(log_level(1, false), Some(LevelFilter::Info));
        assert_eq!(log_level(2, false), Some(LevelFilter::Debug));
        assert_eq!(log_level(3, false), Some(LevelFilter::Trace));
        assert_eq!(log_level(5, false), Some(LevelFilter::Trace));
        // Verbosity wins over quiet.
        assert_eq!(log_level(2, true), Some(LevelFilter::Debug));
    }

    #[test]
    fn test_verbose_flag_parses() {
        let cli = Cli::try_parse_from(["storybook", "-vv", "simulate", "--target", "2"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(log_level(cli.verbose, cli.quiet), Some(LevelFilter::Debug));
    }

    #[test]
    fn test_simulate_reaches_target() {
        let run = RunArgs {
            config: None,
            target: Some(2),
            frames: 60,
            delta: 1.0 / 60.0,
        };
        let (book, steps) = simulate(&run).unwrap();
        assert_eq!(book.delayed_page(), 2);
        assert_eq!(steps.iter().map(|s| s.to).collect::<Vec<_>>(), vec![1, 2]);
    }
}
