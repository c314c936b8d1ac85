//! Pet - tiny text editor entry point

use pet::app::PetApp;
use pet::config::AppConfig;

fn main() -> pet::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Pet...");

    let config = AppConfig::load();
    let result = PetApp::new(config).and_then(PetApp::run);
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    result
}
