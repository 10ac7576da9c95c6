//! xtask for auditrack - man pages and shell completions

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for auditrack")]
enum Task {
    /// Generate man pages from clap definitions
    GenerateManPages {
        /// Output directory for man pages
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
    /// Generate completion scripts for every supported shell
    GenerateCompletions {
        /// Output directory for completion scripts
        #[arg(short, long, default_value = "completions")]
        output: PathBuf,
    },
}

/// Subcommands that get their own `atr-<name>.1` page
const PAGED_SUBCOMMANDS: [&str; 6] = ["add", "remove", "sync", "mark", "filter", "progress"];

fn main() -> Result<()> {
    match Task::parse() {
        Task::GenerateManPages { output } => generate_man_pages(&output),
        Task::GenerateCompletions { output } => generate_completions(&output),
    }
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut cmd = auditrack::cli::Cli::command();

    let man_path = output_dir.join("atr.1");
    render_page(&cmd, &man_path)?;

    for name in PAGED_SUBCOMMANDS {
        if let Some(subcmd) = cmd.find_subcommand_mut(name) {
            let page = subcmd.clone().name(format!("atr-{name}"));
            render_page(&page, &output_dir.join(format!("atr-{name}.1")))?;
        }
    }

    println!("\nTo view: man {}", man_path.display());
    Ok(())
}

fn render_page(cmd: &clap::Command, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    clap_mangen::Man::new(cmd.clone()).render(&mut std::io::BufWriter::new(file))?;
    println!("Generated: {}", path.display());
    Ok(())
}

fn generate_completions(output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let mut cmd = auditrack::cli::Cli::command();
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
        let path = clap_complete::generate_to(shell, &mut cmd, "atr", output_dir)
            .with_context(|| format!("Failed to generate {shell} completions"))?;
        println!("Generated: {}", path.display());
    }
    Ok(())
}
