use std::process::ExitCode;

use anyhow::Result;
use sheet_ranges::{cli, Config};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let (config, command) = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(path) = &config.project_config_path {
        log::debug!("Using project config {}", path.display());
    }

    cli::run(&config, command).await
}
