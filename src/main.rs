//! doping-scatter CLI - Render the cyclist doping scatter plot
//!
//! Fetches the dataset once, builds the chart and writes a standalone HTML page.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use doping_scatter::{
    chart::{ChartEvent, ChartView},
    html::{self, PageConfig},
    interaction::{PagePosition, PointerEvent},
    loader::{DatasetLoader, DATA_URL},
    scale::Canvas,
};

/// doping-scatter: race times by year, colored by doping allegations
#[derive(Parser, Debug)]
#[command(name = "doping-scatter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dataset URL
    #[arg(long, global = true, env = "DOPING_SCATTER_DATA_URL", default_value = DATA_URL)]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the dataset and write the chart page
    Render(RenderArgs),

    /// Fetch, render and hover a point, printing the tooltip state
    Hover(HoverArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Output directory for index.html, chart.svg and data.json
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Page title
    #[arg(long, default_value = "Doping Allegations in Professional Bicycle Racing")]
    title: String,
}

#[derive(Parser, Debug)]
struct HoverArgs {
    /// Index of the point to hover
    #[arg(short, long)]
    point: usize,

    /// Pointer page x coordinate
    #[arg(long, default_value = "0")]
    page_x: f64,

    /// Pointer page y coordinate
    #[arg(long, default_value = "0")]
    page_y: f64,

    /// Move the pointer off the point afterwards
    #[arg(long, default_value = "false")]
    unhover: bool,

    /// Output format (json, html)
    #[arg(long, default_value = "json")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let view = load_view(&cli.url).await?;

    match cli.command {
        Commands::Render(args) => render_command(&view, args),
        Commands::Hover(args) => hover_command(view, args),
    }
}

/// Fetch the dataset once and mount the chart
async fn load_view(url: &str) -> Result<ChartView> {
    let loader = DatasetLoader::new(url)
        .with_context(|| format!("Invalid dataset URL: {}", url))?;

    let dataset = loader.load().await;

    let mut view = ChartView::new(Canvas::default(), Utc::now());
    view.apply(ChartEvent::Loaded(dataset));
    Ok(view)
}

fn render_command(view: &ChartView, args: RenderArgs) -> Result<()> {
    let config = PageConfig {
        title: args.title,
        output_dir: args.output_dir,
    };

    let index = html::write_page(view, &config)
        .with_context(|| format!("Failed to write page to {:?}", config.output_dir))?;

    info!("Chart page generated at {:?}", index);
    Ok(())
}

fn hover_command(mut view: ChartView, args: HoverArgs) -> Result<()> {
    let points = view.scene().map(|s| s.dots().len()).unwrap_or(0);
    if args.point >= points {
        warn!("Point {} does not exist ({} points rendered)", args.point, points);
    }

    view.apply(ChartEvent::Pointer(PointerEvent::Over {
        point: args.point,
        page: PagePosition {
            x: args.page_x,
            y: args.page_y,
        },
    }));
    if args.unhover {
        view.apply(ChartEvent::Pointer(PointerEvent::Out { point: args.point }));
    }

    match args.format.as_str() {
        "html" => println!("{}", html::render_tooltip(view.tooltip())?),
        _ => println!("{}", serde_json::to_string_pretty(view.tooltip())?),
    }

    Ok(())
}
