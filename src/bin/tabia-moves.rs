// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use structopt::StructOpt;
use tabia::{CheckStatus, Game};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

/// Lists the legal moves of the side to move in a position.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Also print the board and check status.
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("TABIA_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Options::from_args();
    let game = Game::from_fen(&args.fen)?;
    if args.verbose {
        print!("{}", game.board());
        let status = match game.check_status() {
            CheckStatus::SingleCheck(checker) => {
                format!("check from {}", game.board().piece(checker).square())
            }
            other => format!("{:?}", other).to_lowercase(),
        };
        println!("{:<10} {}", "Status:", status);
        println!("{:<10} {}", "State:", game.game_state());
    }

    for (origin, destination) in game.legal_moves() {
        println!("{}{}", origin, destination);
    }

    Ok(())
}
