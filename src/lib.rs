// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `tabia` is a chess rules engine.
//!
//! It keeps the state of a game, works out which moves each piece may legally make, and knows when a king is in
//! check, mated or stalemated. Castling, en passant and promotion are all handled. It does not search for or
//! evaluate moves; it is the referee, not a player.
//!
//! Most callers want [`Game`]:
//!
//! ```
//! use tabia::{notation, Game, GameState};
//!
//! let mut game = Game::new();
//! for mov in &["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     let (origin, destination, promotion) = notation::parse_move(mov).unwrap();
//!     game.attempt_move(origin, destination, promotion).unwrap();
//! }
//! assert_eq!("checkmate, black wins", game.game_state().to_string());
//! assert!(matches!(game.game_state(), GameState::Checkmate(_)));
//! ```

pub mod board;
pub mod core;
pub mod game;
pub mod history;
pub mod movegen;
pub mod notation;
pub mod resolver;

pub use crate::board::{Board, Candidates, Piece, PieceId, Target};
pub use crate::game::{Game, GameState, MoveError};
pub use crate::history::MoveRecord;
pub use crate::resolver::CheckStatus;
