use cymatic_simulator::app::CymaticApp;
use cymatic_simulator::{SimulatorConfig, SimulatorError};

fn main() -> Result<(), SimulatorError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SimulatorConfig::from_env()?;
    log::info!(
        "starting with {} particles, {}px raster",
        config.particle_count, config.raster_size
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 620.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cymatic Pattern Simulator",
        options,
        Box::new(|cc| Ok(Box::new(CymaticApp::new(cc, config)))),
    )?;
    Ok(())
}
