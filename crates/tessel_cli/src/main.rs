//! Tessel CLI
//!
//! Tessellates SVG path data or TOML scenes and reports the resulting
//! geometry and draw calls.

mod report;
mod scene;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tessel_gpu::{GraphicsContextSystem, SystemConfig};
use tessel_paint::GraphicsContext;
use tracing_subscriber::EnvFilter;

use report::Report;
use scene::{parse_color, CapArg, JoinArg, Scene, StrokeArgs};

/// Tessellate vector paths into GPU geometry
#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(about = "Tessellate vector paths into GPU geometry")]
#[command(version)]
struct Cli {
    /// System config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the report as JSON, including the emitted geometry
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill an SVG path
    Fill {
        /// SVG path data, e.g. "M0 0 L100 0 L50 80 Z"
        path: String,

        /// Fill color as #rrggbb or #rrggbbaa
        #[arg(long)]
        color: Option<String>,
    },

    /// Stroke an SVG path
    Stroke {
        path: String,

        #[arg(long, default_value = "1")]
        width: f32,

        /// 0 outside, 0.5 centered, 1 inside
        #[arg(long, default_value = "0.5")]
        alignment: f32,

        #[arg(long, value_enum, default_value_t = CapArg::Butt)]
        cap: CapArg,

        #[arg(long, value_enum, default_value_t = JoinArg::Miter)]
        join: JoinArg,

        #[arg(long, default_value = "10")]
        miter_limit: f32,

        #[arg(long)]
        color: Option<String>,
    },

    /// Draw every operation of a scene file
    Scene {
        /// Scene file (TOML)
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<SystemConfig> {
    let config = match path {
        Some(path) => SystemConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SystemConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn draw(command: &Commands, ctx: &mut GraphicsContext) -> Result<()> {
    match command {
        Commands::Fill { path, color } => {
            ctx.svg_path(path).context("Invalid path data")?;
            match parse_color(color.as_deref())? {
                Some(color) => ctx.fill_with(color),
                None => ctx.fill(),
            };
        }
        Commands::Stroke {
            path,
            width,
            alignment,
            cap,
            join,
            miter_limit,
            color,
        } => {
            let stroke = StrokeArgs {
                width: *width,
                alignment: *alignment,
                cap: *cap,
                join: *join,
                miter_limit: *miter_limit,
                color: color.clone(),
            };
            ctx.svg_path(path).context("Invalid path data")?;
            ctx.stroke_with(stroke.to_options()?);
        }
        Commands::Scene { file } => {
            let scene = Scene::load(file)?;
            tracing::info!("scene {} with {} ops", file.display(), scene.ops.len());
            scene.draw(ctx)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_ref())?;
    tracing::debug!("system config: {:?}", config);

    let mut system = GraphicsContextSystem::new(config);
    let mut ctx = system.create_context();
    draw(&cli.command, &mut ctx)?;

    let report = Report::build(&mut system, &mut ctx, cli.json);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    system.destroy_context(&mut ctx);
    Ok(())
}
