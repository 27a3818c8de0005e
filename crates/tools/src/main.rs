use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use foundation::math::{Clip, PROJECTIONS};
use layers::parse_cell;
use tools::{HttpFetcher, SourceFetcher, render_headless};
use tracing::info;
use tracing_subscriber::EnvFilter;
use widget::render::standalone_document;
use widget::{H3Map, WidgetConfig};

#[derive(Debug, Parser)]
#[command(name = "h3map", about = "Render H3 cells on a world map")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the map to a standalone HTML document.
    Render(RenderArgs),
    /// List supported projection identifiers.
    Projections,
    /// Validate H3 cell identifiers.
    Cells {
        #[arg(required = true)]
        cells: Vec<String>,
    },
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    /// JSON configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "H3MAP_PROJECTION")]
    projection: Option<String>,
    /// Comma separated cell identifiers.
    #[arg(long, env = "H3MAP_AREAS", value_delimiter = ',')]
    areas: Option<Vec<String>>,
    /// URL or local path of a TopoJSON document.
    #[arg(long, env = "H3MAP_WORLD_SRC")]
    world_src: Option<String>,
    #[arg(long, env = "H3MAP_WORLD_COLL")]
    world_coll: Option<String>,
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    #[arg(long, default_value_t = 600.0)]
    height: f64,
    /// Output file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl RenderArgs {
    fn config(&self) -> Result<WidgetConfig> {
        let mut config = match &self.config {
            Some(path) => WidgetConfig::from_json_file(path)?,
            None => WidgetConfig::default(),
        };
        if let Some(projection) = &self.projection {
            config.projection = projection.clone();
        }
        if let Some(areas) = &self.areas {
            config.areas = areas.iter().map(|a| a.trim().to_string()).collect();
        }
        if let Some(src) = &self.world_src {
            config.world_geometry_src = src.clone();
        }
        if let Some(coll) = &self.world_coll {
            config.world_geometry_coll = coll.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Render(args) => cmd_render(args).await,
        Command::Projections => {
            cmd_projections();
            Ok(())
        }
        Command::Cells { cells } => cmd_cells(&cells),
    }
}

async fn cmd_render(args: RenderArgs) -> Result<()> {
    let config = args.config()?;
    let mut map = H3Map::from_config(&config).context("invalid configuration")?;
    let fetcher = SourceFetcher::new(HttpFetcher::default());

    let html = render_headless(&mut map, &fetcher, args.width, args.height).await;
    if map.is_loading() {
        match map.load_error() {
            Some(err) => bail!("map is still loading: {err}"),
            None => bail!("map is still loading"),
        }
    }

    let document = standalone_document("h3-map", &html);
    match &args.out {
        Some(path) => {
            std::fs::write(path, document).with_context(|| format!("write {}", path.display()))?;
            info!(
                out = %path.display(),
                cells = map.unique_areas().len(),
                projection = map.projection().id(),
                "map written"
            );
        }
        None => print!("{document}"),
    }
    Ok(())
}

fn cmd_projections() {
    for (id, kind) in PROJECTIONS {
        let clip = match kind.clip() {
            Clip::Antimeridian => "antimeridian".to_string(),
            Clip::Circle { radius_deg } => format!("circle {radius_deg}°"),
        };
        println!("{id}\t{clip}");
    }
}

fn cmd_cells(cells: &[String]) -> Result<()> {
    let mut invalid = 0usize;
    for id in cells {
        match parse_cell(id) {
            Ok(cell) => println!(
                "{cell}\tresolution={}\tpentagon={}",
                u8::from(cell.resolution()),
                cell.is_pentagon()
            ),
            Err(err) => {
                invalid += 1;
                println!("{id}\tinvalid: {err}");
            }
        }
    }
    if invalid > 0 {
        bail!("{invalid} of {} identifiers are invalid", cells.len());
    }
    Ok(())
}
