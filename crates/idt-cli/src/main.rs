use clap::Parser;

mod bootstrap;
mod cli;
mod commands;
mod pipeline;
mod sink;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("idt error: {error:#}");
            std::process::exit(1);
        }
    }
}

/// Returns the process exit status.
fn run() -> anyhow::Result<i32> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match &cli.command {
        cli::Commands::Check(args) => commands::check::handle(args),
        cli::Commands::Schema(args) => commands::schema::handle(args).map(|()| 0),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("IDT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
