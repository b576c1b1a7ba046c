use eframe::egui;
use notos::app::{App, TITLE};
use notos::Config;

// ===================== Entry =====================
fn main() -> eframe::Result<()> {
    notos::init_logging();
    let cfg = Config::default();
    let size = [cfg.width, cfg.collapsed_height];
    log::info!("starting {} (tick {:?})", TITLE, cfg.tick);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_min_inner_size([cfg.width, cfg.collapsed_height])
            .with_decorations(false)
            .with_transparent(true)
            .with_always_on_top()
            .with_resizable(false)
            .with_taskbar(false)
            .with_mouse_passthrough(false)
            .with_title(TITLE),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, cfg))))
    )
}
