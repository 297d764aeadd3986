use figure8::{Visualizer, VisualizerConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => VisualizerConfig::load_or_default(path),
        None => VisualizerConfig::default(),
    };

    log::info!("starting with {} particles", config.params.particle_count);

    if let Err(e) = Visualizer::new().with_config(config).run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
