mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::scene`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use customizer_gui_lib::color;
pub use customizer_gui_lib::font;
pub use customizer_gui_lib::scene;
pub use customizer_gui_lib::state;

use app::{CustomizerApp, StartupModel};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stl_customizer=info,customizer_gui_lib=info".into()),
        )
        .init();

    let startup = parse_startup_arg(std::env::args().skip(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("STL Customizer")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "stl-customizer",
        native_options,
        Box::new(move |cc| Ok(Box::new(CustomizerApp::new(cc, startup)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

/// `--demo` or `--model <path>`; the last one given wins
fn parse_startup_arg(args: impl IntoIterator<Item = String>) -> Option<StartupModel> {
    let mut startup = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => startup = Some(StartupModel::Demo),
            "--model" => match args.next() {
                Some(path) => startup = Some(StartupModel::File(path.into())),
                None => tracing::warn!("--model needs a path"),
            },
            other => tracing::warn!("Ignoring unknown argument {other}"),
        }
    }
    startup
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse_startup_arg(args(&[])), None);
    }

    #[test]
    fn test_model_path() {
        assert_eq!(
            parse_startup_arg(args(&["--model", "plate.stl"])),
            Some(StartupModel::File("plate.stl".into()))
        );
    }

    #[test]
    fn test_last_argument_wins() {
        assert_eq!(
            parse_startup_arg(args(&["--model", "plate.stl", "--demo"])),
            Some(StartupModel::Demo)
        );
        assert_eq!(parse_startup_arg(args(&["--demo", "--model"])), Some(StartupModel::Demo));
    }
}
