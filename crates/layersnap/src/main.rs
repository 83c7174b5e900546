use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use layersnap::app::collect::collect_at_depth;
use layersnap::infra::bridge::{
    HostBridge, ImageFilePayload, InboundMessage, MemorySink, OutboundMessage,
};
use layersnap::infra::config::Config;
use layersnap::infra::fixture::FixtureHost;
use layersnap::infra::host::SceneHost;

#[derive(Parser)]
#[command(author, version, about = "Depth-bounded raster export for scene trees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export nodes at a given depth to image files plus a manifest
    Export {
        /// Scene fixture file holding the selection
        #[arg(long)]
        scene: PathBuf,
        /// Tree depth to collect targets at (default from config)
        #[arg(long)]
        depth: Option<u32>,
        /// Output directory (default from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the nodes an export at a given depth would target
    Inspect {
        /// Scene fixture file holding the selection
        #[arg(long)]
        scene: PathBuf,
        /// Tree depth to collect targets at (default from config)
        #[arg(long)]
        depth: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    layersnap::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Export { scene, depth, out } => run_export(&config, scene, depth, out).await,
        Commands::Inspect { scene, depth } => run_inspect(&config, scene, depth),
    }
}

async fn run_export(
    config: &Config,
    scene: PathBuf,
    depth: Option<u32>,
    out: Option<PathBuf>,
) -> Result<()> {
    let host = FixtureHost::from_scene_file(&scene)?;
    let out_dir = out.unwrap_or_else(|| config.output.dir());

    let bridge = HostBridge::new(host, MemorySink::new()).with_default_depth(config.defaults.depth);
    bridge.handle(InboundMessage::Export { depth }).await;

    let mut completed = false;
    let mut last_error = None;
    for message in bridge.sink().take() {
        match message {
            OutboundMessage::Progress { current, total, component_name } => {
                info!(current, total, name = %component_name, "exporting");
            }
            OutboundMessage::Error { message } => {
                warn!(%message, "export reported an error");
                last_error = Some(message);
            }
            OutboundMessage::Complete { image_files, json_data, .. } => {
                completed = true;
                write_outputs(&out_dir, &config.output.manifest_file(), &image_files, &json_data)?;
            }
        }
    }

    if !completed {
        bail!(last_error.unwrap_or_else(|| "export produced no output".into()));
    }
    Ok(())
}

fn write_outputs(
    out_dir: &Path,
    manifest_file: &str,
    image_files: &[ImageFilePayload],
    json_data: &str,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;

    for image in image_files {
        let path = out_dir.join(&image.name);
        fs::write(&path, &image.data)
            .with_context(|| format!("failed to write image to {}", path.display()))?;
    }

    let manifest_path = out_dir.join(manifest_file);
    fs::write(&manifest_path, json_data)
        .with_context(|| format!("failed to write manifest to {}", manifest_path.display()))?;

    info!(
        images = image_files.len(),
        manifest = %manifest_path.display(),
        "export written"
    );
    Ok(())
}

fn run_inspect(config: &Config, scene: PathBuf, depth: Option<u32>) -> Result<()> {
    let host = FixtureHost::from_scene_file(&scene)?;
    let depth = depth.unwrap_or(config.defaults.depth);

    let selection = host.selection();
    if selection.is_empty() {
        bail!("scene has an empty selection");
    }

    let mut total = 0;
    for root in &selection {
        for node in collect_at_depth(root, depth) {
            println!("{}\t{:?}", node.name, node.kind);
            total += 1;
        }
    }
    println!("{total} node(s) at depth {depth}");
    Ok(())
}
