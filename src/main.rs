//! Blockfall — falling-block puzzle game in the terminal.

mod app;
mod game;
mod input;
mod piece;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::Parser;

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-block puzzle in the terminal. Stack pieces, clear rows, survive the speed-up.",
    long_about = "Blockfall is a terminal falling-block puzzle.\n\n\
        Pieces fall on a fixed 10x22 board; completed rows vanish and the fall speeds up \
        every 10 cleared lines. Soft and hard drops score extra points per row.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move       Up or k/i  Rotate    Down or j  Soft drop\n  \
        Enter/Space        Hard drop  q / Esc    Quit\n\n\
        After a game over, hard drop starts a new game. Use --theme to recolour the \
        pieces (btop-style theme[piece_l]=\"#RRGGBB\")."
)]
pub struct Args {
    /// Path to theme file (btop-style theme[key]="#RRGGBB"). Uses the built-in palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref()).unwrap_or_default();
    let mut app = App::new(&args, theme);
    app.run()?;
    Ok(())
}
