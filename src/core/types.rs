// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{convert::TryFrom, fmt, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square index out of range: {0}")]
    OutOfRange(u8),
    #[error("invalid file: {0}")]
    InvalidFile(char),
    #[error("invalid rank: {0}")]
    InvalidRank(char),
    #[error("expected two characters, got {0:?}")]
    BadLength(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

/// A square on the chessboard, addressed by rank and file.
///
/// Rank 0 is Black's back rank (rank 8 in algebraic notation) and rank 7 is White's back rank (rank 1). File 0 is
/// the a-file. The square is stored as the packed index `rank * 8 + file`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(pub(in crate::core) u8);

impl Square {
    /// Creates a new Square composed of a given rank and file. Both must be less than eight.
    pub const fn of(rank: u8, file: u8) -> Square {
        debug_assert!(rank < 8 && file < 8);
        Square(rank * 8 + file)
    }

    /// Returns the rank of this square, 0 through 7.
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Returns the file of this square, 0 through 7.
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Returns the square displaced by the given rank and file offsets, or None if that falls off the board.
    pub fn offset(self, ranks: i8, files: i8) -> Option<Square> {
        let rank = self.rank() as i8 + ranks;
        let file = self.file() as i8 + files;
        if (0..8).contains(&rank) && (0..8).contains(&file) {
            Some(Square::of(rank as u8, file as u8))
        } else {
            None
        }
    }

    /// Returns the closest square in the given direction, or None if the direction leads off of the board.
    pub fn towards(self, dir: Direction) -> Option<Square> {
        let (ranks, files) = dir.as_vector();
        self.offset(ranks, files)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Square {
    type Error = SquareParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 64 {
            return Err(SquareParseError::OutOfRange(value));
        }

        Ok(Square(value))
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(SquareParseError::BadLength(s.to_owned()));
        }

        let file = match chars[0] {
            c @ 'a'..='h' => c as u8 - b'a',
            c => return Err(SquareParseError::InvalidFile(c)),
        };
        let rank = match chars[1] {
            c @ '1'..='8' => b'8' - c as u8,
            c => return Err(SquareParseError::InvalidRank(c)),
        };

        Ok(Square::of(rank, file))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'8' - self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[display(fmt = "white")]
    White,
    #[display(fmt = "black")]
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The rank offset of a single pawn step for this color.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The rank this color's pieces start on.
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// The rank this color's pawns start on.
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The rank on which this color's pawns promote.
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Whether a pawn may promote into this kind.
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }

    /// Whether this kind slides along rays in the given direction.
    pub const fn slides_along(self, dir: Direction) -> bool {
        match self {
            PieceKind::Bishop => dir.is_diagonal(),
            PieceKind::Rook => !dir.is_diagonal(),
            PieceKind::Queen => true,
            _ => false,
        }
    }

    pub const fn is_slider(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
    }
}

impl TryFrom<char> for PieceKind {
    type Error = PieceParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = match value.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(PieceParseError::InvalidChar(value)),
        };

        Ok(kind)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        write!(f, "{}", c)
    }
}

/// Parses a FEN-style piece letter: uppercase is White, lowercase is Black.
pub fn piece_from_char(c: char) -> Result<(Color, PieceKind), PieceParseError> {
    let kind = PieceKind::try_from(c)?;
    let color = if c.is_ascii_uppercase() {
        Color::White
    } else {
        Color::Black
    };
    Ok((color, kind))
}

/// The FEN-style letter for a piece of the given color and kind.
pub fn piece_char(color: Color, kind: PieceKind) -> char {
    let c = kind.to_string().chars().next().unwrap_or('?');
    match color {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

/// One of the eight compass directions on the board. North points toward Black's back rank.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

pub const ORTHOGONAL_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const DIAGONAL_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

impl Direction {
    /// The (rank, file) offset of one step in this direction.
    pub const fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub const fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
        )
    }

    /// The direction leading from `from` to `to`, if the two squares share a rank, file or diagonal.
    pub fn between(from: Square, to: Square) -> Option<Direction> {
        if from == to {
            return None;
        }

        let ranks = to.rank() as i8 - from.rank() as i8;
        let files = to.file() as i8 - from.file() as i8;
        if ranks != 0 && files != 0 && ranks.abs() != files.abs() {
            return None;
        }

        let step = (ranks.signum(), files.signum());
        ALL_DIRECTIONS
            .iter()
            .copied()
            .find(|dir| dir.as_vector() == step)
    }
}

macro_rules! type_iterator {
    ($name:ident, $type:ident, $max:expr) => {
        pub struct $name(u8, u8);

        impl Iterator for $name {
            type Item = $type;

            fn next(&mut self) -> Option<Self::Item> {
                if self.0 >= self.1 {
                    None
                } else {
                    let next = self.0;
                    self.0 += 1;
                    Some($type(next))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name(0, $max)
            }
        }
    };
}

type_iterator!(AllSquares, Square, 64);

pub fn squares() -> AllSquares {
    AllSquares::default()
}

pub fn colors() -> ::std::vec::IntoIter<Color> {
    vec![Color::White, Color::Black].into_iter()
}
