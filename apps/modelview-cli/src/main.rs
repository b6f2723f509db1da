mod script;

use anyhow::Context;
use clap::{Parser, Subcommand};
use modelview_assets::load_gltf;
use modelview_common::ViewerConfig;
use modelview_kernel::Controller;
use modelview_render::{DebugTextRenderer, RenderView, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modelview-cli", about = "CLI tool for model viewer operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Version,
    /// Load a model and print its summary
    Info {
        /// Path to a .gltf file
        asset: PathBuf,
    },
    /// Replay a YAML input script through the viewer without a window
    Simulate {
        /// Script file: a list of input events and `{ tick: N }` steps
        script: PathBuf,
        /// Model to load before replaying
        #[arg(short, long)]
        asset: Option<PathBuf>,
        /// Seconds per tick
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Print the frame after every tick step, not only at the end
        #[arg(long)]
        trace: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Commands::Version => {
            println!("modelview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", modelview_common::crate_info());
            println!("input: {}", modelview_input::crate_info());
            println!("assets: {}", modelview_assets::crate_info());
            println!("kernel: {}", modelview_kernel::crate_info());
            println!("render: {}", modelview_render::crate_info());
        }
        Commands::Info { asset } => {
            let model = load_gltf(&asset, |f| tracing::info!("{:.0}% loaded", f * 100.0))
                .with_context(|| format!("loading {}", asset.display()))?;
            println!("{}", asset.display());
            println!("{}", model.summary());
        }
        Commands::Simulate {
            script,
            asset,
            dt,
            trace,
        } => {
            let steps = script::load(&script)?;
            let mut controller = Controller::new(&config);
            if let Some(asset) = asset {
                match load_gltf(&asset, |_| {}) {
                    Ok(model) => controller.set_model(model),
                    // A failed load leaves the viewer running without a model.
                    Err(e) => tracing::error!("failed to load {}: {e}", asset.display()),
                }
            }

            let renderer = DebugTextRenderer::new();
            let view = RenderView::new(&config.camera, 16.0 / 9.0);
            script::run(&mut controller, &steps, dt, |c| {
                if trace {
                    let frame = renderer.render(c.model(), &view.at(c.state().camera_position()));
                    println!("--- frame {}\n{frame}", c.frame());
                }
            });

            let frame = renderer.render(
                controller.model(),
                &view.at(controller.state().camera_position()),
            );
            println!("=== after {} ticks", controller.frame());
            print!("{frame}");
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
