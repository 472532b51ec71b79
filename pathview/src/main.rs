//! pathview — interactive A* shortest-path visualizer for the terminal.
//!
//! The first primary click places the start cell, the second the end, and
//! further clicks or drags paint obstacles. Space runs the search,
//! animating the frontier as it expands; Escape interrupts a running
//! search.

mod controller;
mod recorder;

use std::time::Duration;

use clap::Parser;

use pathview_crossterm::CrosstermDriver;

use crate::controller::{Controller, Options};
use crate::recorder::FrameRecorder;

#[derive(Debug, Parser)]
#[command(
    name = "pathview",
    version,
    about = "Interactive A* shortest-path visualizer"
)]
struct Args {
    /// Rows (and columns) of the square board.
    #[arg(long, default_value_t = 25)]
    rows: i32,

    /// Pixel width of the square surface used for cell geometry.
    #[arg(long, default_value_t = 600)]
    width: i32,

    /// Delay between rendered search steps, in milliseconds.
    #[arg(long, default_value_t = 15)]
    delay_ms: u64,

    /// Obstacle probability for the random scatter key (r).
    #[arg(long, default_value_t = 0.28)]
    density: f64,

    /// Record every flushed frame as one JSON object per line.
    #[arg(long, value_name = "FILE")]
    record: Option<std::path::PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if args.rows < 2 {
        eprintln!("Error: --rows must be at least 2");
        std::process::exit(2);
    }
    if args.width / args.rows < 1 {
        eprintln!(
            "Error: --width {} leaves no room for {} rows",
            args.width, args.rows
        );
        std::process::exit(2);
    }

    let recorder = match &args.record {
        Some(path) => match FrameRecorder::create(path) {
            Ok(rec) => Some(rec),
            Err(e) => {
                eprintln!("Error: cannot open {}: {e}", path.display());
                std::process::exit(2);
            }
        },
        None => None,
    };

    let opts = Options {
        rows: args.rows,
        width: args.width,
        delay: Duration::from_millis(args.delay_ms),
        density: args.density.clamp(0.0, 1.0),
    };
    let mut controller = Controller::new(opts, CrosstermDriver::new(), recorder);
    if let Err(e) = controller.run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
