use anyhow::Result;
use appshell::config::Config;
use appshell::logger::Logger;
use appshell::ui;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().nth(1).as_deref() == Some("--generate-config") {
        let path = Config::get_default_config_path()?;
        return Config::generate_default_config(path);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            eprintln!("\n💡 Fix the configuration file or generate a fresh one with --generate-config");
            return Ok(());
        }
    };

    let logger = Logger::from_config(config.logging.enabled)?;
    logger.install(config.logging.level_filter());
    log::info!("starting appshell");

    // Run the TUI application
    let result = ui::run_app(config, logger.clone()).await;
    logger.flush();
    result
}
