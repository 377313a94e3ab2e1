//! spm — CLI front-end orchestrating the `spm-ops` Lifecycle Controller.

mod cli;
mod commands;
mod display;
mod error;
mod events;
mod logging;
mod spinner;

use crate::cli::Cli;
use crate::commands::Dispatch;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::spinner::Spinner;
use clap::Parser;
use console::Term;
use spm_config::{Config, ColorChoice};
use spm_ops::OpsCtx;
use std::process::ExitCode;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    logging::init(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            if !json_mode {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting spm");

    let mut config = Config::load(cli.global.config.as_deref()).await?;
    if let Some(color) = cli.global.color {
        config.general.color = color.into();
    }
    if cli.global.json {
        config.general.json = true;
    }

    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => Term::stderr().features().colors_supported(),
    };

    let (event_sender, mut event_receiver) = spm_events::channel();
    let ctx = OpsCtx::new(config.clone(), Some(event_sender))?;
    let event_handler = EventHandler::new(colors_enabled, cli.global.debug, config.general.json);

    let long_running = commands::is_long_running(&cli.command);
    let spinner = if long_running && !config.general.json && colors_enabled {
        Some(Spinner::start(format!("running {}", cli.command.name())))
    } else {
        None
    };

    let mut dispatch_future = Box::pin(commands::dispatch(cli.command, &ctx));
    let dispatch = loop {
        select! {
            result = &mut dispatch_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle(event);
                }
                break result;
            }
            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle(event);
                }
            }
        }
    };

    if let Some(spinner) = spinner {
        spinner.stop();
    }

    let dispatch = dispatch?;
    let renderer = OutputRenderer::new(config.general.json);

    match dispatch {
        Dispatch::Report(output) => {
            renderer
                .render(&output)
                .map_err(|e| CliError::InvalidArguments(e.to_string()))?;
            Ok(ExitCode::SUCCESS)
        }
        Dispatch::ExitStatus(status) => Ok(exit_code_from_status(status)),
    }
}

fn exit_code_from_status(status: std::process::ExitStatus) -> ExitCode {
    match status.code() {
        Some(code) => ExitCode::from(code.clamp(0, 255) as u8),
        None => ExitCode::FAILURE,
    }
}
