use std::sync::Arc;

use clap::Parser;
use color_eyre::{Result, eyre::eyre};
use desk::{
    cli::{Cli, Cmd},
    config::{self, Config},
    core::{app::DeskApp, state::PageId},
    headless,
};
use portal::{PortalApi, PortalClient};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.cmd, Cmd::Run { .. });

    desk::errors::init(interactive)?;
    // Konsole nur ohne TUI, sonst landet das Log im Alternate Screen
    let ctx = app::init::<DeskApp>(env!("CARGO_PKG_VERSION"), !interactive)
        .map_err(|e| eyre!("initialisation failed: {e}"))?;

    config::ensure_data_and_config_dirs_exist()?;
    let mut config = Config::new()?;
    if let Some(url) = cli.base_url {
        config.portal.base_url = url;
    }
    info!(portal = %config.portal.base_url, "configuration loaded");

    let api: Arc<dyn PortalApi> =
        Arc::new(PortalClient::new(&config.portal.base_url, config.timeout())?);
    let download_dir = config.download_dir(&ctx.path_context().downloads_dir());

    match cli.cmd {
        Cmd::Run { mode } => {
            let start = mode.map(PageId::from).unwrap_or_default();
            let mut app = DeskApp::new(config, api, download_dir, start);
            app.run().await?;
        }
        Cmd::Export(args) => {
            let dir = args.out.clone().unwrap_or(download_dir);
            match headless::export(api, dir, config.timing(), &args).await {
                Ok(report) => println!(
                    "exported {} opportunities ({} volunteers) to {}",
                    report.total_count,
                    report.total_volunteers,
                    report.path.display()
                ),
                Err(e) => {
                    error!("export failed: {e:#}");
                    return Err(e);
                }
            }
        }
        Cmd::Health => match headless::health(api.as_ref()).await {
            Ok(line) => println!("{line}"),
            Err(e) => {
                error!("{e:#}");
                return Err(e);
            }
        },
    }
    Ok(())
}
