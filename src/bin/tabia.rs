// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    convert::TryFrom,
    fs::File,
    io::{self, BufRead, BufWriter, Write},
    path::PathBuf,
};

use structopt::StructOpt;
use tabia::{core::PieceKind, notation, Game, GameState};
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

/// Two players, one board. Moves are read from stdin in coordinate notation (e2e4, e7e8q).
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN of the position to start from, instead of the standard starting position.
    #[structopt(long)]
    fen: Option<String>,
    /// File to write the move log to, as JSON lines, once the game ends.
    #[structopt(long)]
    record: Option<PathBuf>,
}

const HELP: &str = "commands: <move> (e2e4, e7e8q) | moves <square> | board | help | quit";

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("TABIA_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Options::from_args();
    let mut game = match args.fen {
        Some(ref fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };

    println!("{}", game.board());
    println!("{}", HELP);
    prompt(&game)?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while let Some(line) = lines.next() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            None => {}
            Some("quit") | Some("exit") => break,
            Some("help") => println!("{}", HELP),
            Some("board") => println!("{}", game.board()),
            Some("moves") => match tokens.next().map(notation::parse_square) {
                Some(Ok(square)) => {
                    let moves: Vec<String> = game
                        .legal_moves_for(square)
                        .iter()
                        .map(|(destination, _)| destination.to_string())
                        .collect();
                    println!("{}: {}", square, moves.join(" "));
                }
                Some(Err(e)) => println!("error: {}", e),
                None => println!("usage: moves <square>"),
            },
            Some(text) => match notation::parse_move(text) {
                Ok((origin, destination, promotion)) => {
                    let result = game.attempt_move_with(origin, destination, || {
                        promotion.or_else(|| ask_promotion(&mut lines))
                    });
                    match result {
                        Ok(record) => {
                            println!("{} played {}", record.color, record);
                            println!("{}", game.board());
                        }
                        Err(e) => println!("error: {}", e),
                    }
                }
                Err(e) => println!("error: {}", e),
            },
        }

        if game.game_state() != GameState::InProgress {
            println!("{}", game.game_state());
            break;
        }

        prompt(&game)?;
    }

    if let Some(ref path) = args.record {
        let file = File::create(path)?;
        game.write_history(BufWriter::new(file))?;
    }

    Ok(())
}

fn prompt(game: &Game) -> io::Result<()> {
    if game.check_status().is_check() {
        print!("{} to move (check)> ", game.side_to_move());
    } else {
        print!("{} to move> ", game.side_to_move());
    }
    io::stdout().flush()
}

/// Asks which piece to promote to. An empty line, or the end of input, cancels the move.
fn ask_promotion<B: BufRead>(lines: &mut io::Lines<B>) -> Option<PieceKind> {
    loop {
        print!("promote to (q, r, b, n; empty line cancels)> ");
        let _ = io::stdout().flush();
        let line = lines.next()?.ok()?;
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match line.chars().next().map(PieceKind::try_from) {
            Some(Ok(kind)) if kind.is_promotion_target() && line.len() == 1 => return Some(kind),
            _ => println!("not a piece a pawn can promote to: {}", line),
        }
    }
}
