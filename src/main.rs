use anyhow::Result;
use log::{error, info};

use panthyr_gnss::cli::{build_cli, handle_subcommands};
use panthyr_gnss::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    info!("🖥️  panthyr-gnss v{}", panthyr_gnss::VERSION);

    let config = Config::from_matches(&matches)?;

    match handle_subcommands(&matches, &config).await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("❌ {}", e);
            Err(e.into())
        }
    }
}
