// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Coordinate notation, as typed by a player: `e4` for a square, `e2e4` or `e7e8q` for a move.
//!
//! Parsing only produces squares and an optional promotion piece; whether the move is legal, and whether the piece
//! is something a pawn may promote to, is for the game to decide.

use std::convert::TryFrom;

use thiserror::Error;

use crate::core::{PieceKind, Square, SquareParseError};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error(transparent)]
    Square(#[from] SquareParseError),
    #[error("expected a move like e2e4 or e7e8q, got {0:?}")]
    BadMove(String),
    #[error("unknown promotion piece: {0}")]
    UnknownPiece(char),
}

pub fn parse_square(text: &str) -> Result<Square, NotationError> {
    Ok(text.trim().parse()?)
}

/// Parses a move in coordinate notation into its origin, destination and promotion piece.
pub fn parse_move(text: &str) -> Result<(Square, Square, Option<PieceKind>), NotationError> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(NotationError::BadMove(text.to_owned()));
    }

    let origin = parse_square(&text[0..2])?;
    let destination = parse_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(PieceKind::try_from(c).map_err(|_| NotationError::UnknownPiece(c))?),
        None => None,
    };
    Ok((origin, destination, promotion))
}
