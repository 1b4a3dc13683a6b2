use clap::Parser;
use env_logger::Env;

mod engine;
mod env;
mod featured;
mod maps;
mod mods;
mod networking;
mod process;
mod search;
mod storage;
mod ui;
mod util;

#[derive(Parser, Debug)]
#[command(
    name = "Skirmish Lobby",
    author,
    version,
    about = "Create-and-host dialog for Skirmish multiplayer matches"
)]
struct Cli {
    /// Print the lobby version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Skirmish Lobby {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_icon(default_icon())
            .with_inner_size(eframe::egui::vec2(900.0, 620.0)),
        ..Default::default()
    };
    eframe::run_native(
        "Skirmish Lobby",
        options,
        Box::new(|cc| Ok(Box::new(ui::LobbyApp::new(cc)))),
    )
}

fn default_icon() -> eframe::egui::IconData {
    // Simple 2x2 icon: dark background with an amber accent.
    let rgba: Vec<u8> = vec![
        18, 20, 26, 255, 232, 176, 60, 255, //
        18, 20, 26, 255, 190, 140, 44, 255,
    ];
    eframe::egui::IconData {
        rgba,
        width: 2,
        height: 2,
    }
}
