mod cli;
mod console;
mod settings;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reels_engine::{Controller, WebDriverDriver};
use reels_logging::{reels_error, reels_info, Lane};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    reels_logging::initialize(cli.log_destination(), cli.log_level.into());

    let mut app_settings = settings::load(&cli.settings)?;
    if let Some(endpoint) = &cli.webdriver {
        app_settings.webdriver.endpoint = endpoint.clone();
    }
    if cli.write_settings {
        settings::save(&cli.settings, &app_settings)?;
        println!("wrote {}", cli.settings.display());
        return Ok(ExitCode::SUCCESS);
    }

    let driver = WebDriverDriver::new(app_settings.webdriver.clone())
        .context("invalid WebDriver settings")?;
    let controller = Controller::new(app_settings.pipeline, Arc::new(driver));
    controller.subscribe(Arc::new(console::EventPrinter));

    reels_info!(
        Lane::Controller,
        "starting against {}",
        app_settings.webdriver.endpoint
    );
    if let Err(err) = controller.initialize().await {
        reels_error!(Lane::Controller, "initialize failed: {}", err);
        controller.shutdown().await;
        eprintln!("error: {err}");
        return Ok(ExitCode::FAILURE);
    }

    let outcome = console::run(&controller).await;
    controller.shutdown().await;
    outcome?;
    Ok(ExitCode::SUCCESS)
}
