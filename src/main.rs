//! docweave - assemble HTML documents from markdown templates.

use anyhow::Result;
use clap::Parser;
use docweave::{
    build::{build_site, render_single},
    cli::{Cli, Commands},
    config::SiteConfig,
    log,
    preprocess::PreprocessError,
    render::RenderError,
};
use std::{
    io::{Write, stdout},
    process::ExitCode,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Commands::Render { template, context } => {
            let html = render_single(&config, template, context)?;
            let mut stdout = stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
        Commands::Build { .. } => {
            build_site(&config)?;
        }
    }
    Ok(())
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file is fine for `render`; `build` falls back to the
/// defaults and says so.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.clone().unwrap_or_else(|| "./".into());
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        if cli.is_build() {
            log!("build"; "{} not found, using defaults", config_path.display());
        }
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    Ok(config)
}

/// Print every fun-dsl failure on its own line, other errors with their
/// cause chain.
fn report(err: &anyhow::Error) {
    match preprocess_errors(err) {
        Some(preprocess) => {
            for cause in err.chain().take_while(|e| e.downcast_ref::<RenderError>().is_none()) {
                log!("error"; "{}", cause);
            }
            for segment in &preprocess.errors {
                log!("error"; "{}", segment);
            }
        }
        None => log!("error"; "{:#}", err),
    }
}

fn preprocess_errors(err: &anyhow::Error) -> Option<&PreprocessError> {
    err.chain().find_map(|cause| match cause.downcast_ref::<RenderError>() {
        Some(RenderError::Preprocess(preprocess)) => Some(preprocess),
        _ => None,
    })
}
