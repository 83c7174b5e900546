use std::fs;
use std::process::Command;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Regenerate the demo scene fixture under demos/
    Fixtures,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::Fixtures => write_fixtures()?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("cargo nextest run failed");
    }
    Ok(())
}

fn write_fixtures() -> Result<()> {
    let scene = json!({
        "selection": [
            {
                "name": "Design System",
                "kind": "FRAME",
                "children": [
                    {
                        "name": "Buttons",
                        "kind": "SECTION",
                        "children": [
                            { "name": "Btn: Primary/Large", "kind": "COMPONENT" },
                            { "name": "Btn: Primary/Small", "kind": "COMPONENT" }
                        ]
                    },
                    {
                        "name": "Icons",
                        "kind": "SECTION",
                        "children": [
                            { "name": "Icon / Close", "kind": "COMPONENT" },
                            { "name": "Icon / Menu", "kind": "COMPONENT" }
                        ]
                    }
                ]
            }
        ],
        "fail": []
    });

    fs::create_dir_all("demos")?;
    fs::write("demos/scene.json", serde_json::to_string_pretty(&scene)?)?;
    println!("wrote demos/scene.json");
    Ok(())
}
