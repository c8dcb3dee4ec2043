//! Standalone viewer binary: `mirador [model.json]`.

use std::path::Path;

use mirador::options::ViewerOptions;
use mirador::Viewer;

/// Options file consulted when present in the working directory.
const OPTIONS_PATH: &str = "mirador.toml";

fn main() {
    env_logger::init();

    let mut builder = Viewer::builder();

    if let Some(path) = std::env::args().nth(1) {
        builder = builder.with_model(path);
    } else {
        log::info!("no model given, showing the demo sphere (usage: mirador <model.json>)");
    }

    let options_path = Path::new(OPTIONS_PATH);
    if options_path.exists() {
        match ViewerOptions::load(options_path) {
            Ok(options) => builder = builder.with_options(options),
            Err(e) => log::warn!("ignoring {OPTIONS_PATH}: {e}"),
        }
    }

    if let Err(e) = builder.build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
