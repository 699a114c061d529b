// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use clap::Parser;

mod cli;

use cli::args::{Cli, Commands};
use pose_capture::error;

fn main() {
    let args = Cli::parse();

    let result = match &args.command {
        Commands::Replay(replay) => cli::replay::run_replay(replay),
        Commands::Analyze(analyze) => cli::analyze::run_analyze(analyze),
    };

    if let Err(err) = result {
        error!("{err}");
        process::exit(1);
    }
}
