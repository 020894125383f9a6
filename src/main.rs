/// Entry point.

mod app;
mod config;
mod domain;
mod error;
mod event_loop;
mod logging;
mod screen;
mod signals;
mod sim;
mod store;
mod ui;

use app::App;
use config::GameConfig;

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.log, &config.data_dir) {
        eprintln!("Warning: logging disabled ({e})");
    }
    tracing::info!(data_dir = %config.data_dir.display(), "starting");

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    let result = app.run();

    if let Err(e) = app.shutdown() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!("game error: {e}");
        eprintln!("Game error: {e}");
        std::process::exit(1);
    }

    tracing::info!("bye");
    println!("Thanks for playing Snake!");
}
