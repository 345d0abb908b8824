// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    board::PieceId,
    core::{Color, PieceKind, Square},
};

/// A move that has been played, as stored in a board's move log. Records are never modified after they are
/// appended; the engine only ever consults the most recent one, to decide en passant eligibility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// The square the moving piece left.
    pub origin: Square,
    /// The piece that moved. For promotions this is the pawn, not the piece that replaced it.
    pub piece: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    /// Whether an enemy piece was taken, including by en passant.
    pub capture: bool,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
    pub castle: bool,
    pub en_passant: bool,
}

impl MoveRecord {
    /// Whether this move advanced a pawn two ranks in one step.
    pub fn is_double_pawn_push(&self) -> bool {
        self.kind == PieceKind::Pawn
            && (self.origin.rank() as i8 - self.destination.rank() as i8).abs() == 2
    }

    /// Renders this move in coordinate notation, e.g. `e2e4` or `e7e8q`.
    pub fn as_coordinate(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.origin, self.destination, kind),
            None => format!("{}{}", self.origin, self.destination),
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_coordinate())
    }
}
