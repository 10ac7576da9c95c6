use anyhow::Result;
use auditrack::cli::{Cli, Commands};
use auditrack::output::{self, Verbosity};
use auditrack::{AuditContext, commands};
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("AUDITRACK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "auditrack=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Completions need no workspace or config
    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(());
    }

    let mut ctx = AuditContext::new(cli.root.clone())?;

    output::set_verbosity(if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose || ctx.config.output.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    });
    if cli.no_color || !ctx.config.output.color {
        output::set_color(false);
    }

    match cli.command {
        Commands::Add { paths } => commands::scope::add(&ctx, &paths)?,
        Commands::Remove { paths } => commands::scope::remove(&ctx, &paths)?,
        Commands::LoadScope { file } => commands::scope::load(&ctx, file.as_deref())?,
        Commands::Sync { paths } => commands::sync::execute(&ctx, &paths)?,
        Commands::Mark {
            status,
            file,
            function,
        } => commands::mark::execute(&ctx, status, &file, &function)?,
        Commands::MarkFile { status, file } => commands::mark::execute_file(&ctx, status, &file)?,
        Commands::Flag {
            flag,
            file,
            function,
            off,
        } => commands::flag::execute(&ctx, flag, &file, &function, !off)?,
        Commands::Filter {
            statuses,
            tags,
            reset,
        } => commands::filter::execute(&ctx, &statuses, &tags, reset)?,
        Commands::List { file, ids, all } => {
            commands::list::execute(&ctx, file.as_deref(), ids, all)?;
        }
        Commands::Status => commands::status::execute(&ctx)?,
        Commands::Progress { days, json } => commands::progress::execute(&ctx, days, json)?,
        Commands::Clear { yes } => commands::clear::execute(&ctx, yes)?,
        Commands::Config {
            key,
            value,
            unset,
            list,
        } => commands::config::execute(&mut ctx, key.as_deref(), value, unset, list)?,
        Commands::Completion { shell } => print_completions(shell, &mut Cli::command()),
    }

    Ok(())
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
