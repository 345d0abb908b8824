// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    collections::BTreeMap,
    fmt::{self, Write},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::{self, *},
    history::MoveRecord,
};

/// An opaque handle to a piece owned by a [`Board`]. Handles stay valid for the lifetime of the board, including
/// after the piece is captured or promoted away.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(u16);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a piece would find on one of its candidate squares, classified when the candidate was generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// The square is empty.
    Empty,
    /// Moving here captures the given enemy piece. For en passant the captured pawn is not on this square.
    Capture(PieceId),
    /// A pawn's forward diagonal that holds no capturable piece. The square counts as attacked, but the pawn cannot
    /// move there.
    AttackOnly,
    /// The king's castling hop; the handle names the rook that castles with it.
    Castle(PieceId),
}

impl Target {
    /// Whether a piece may actually move onto a square classified this way.
    pub fn is_playable(self) -> bool {
        !matches!(self, Target::AttackOnly)
    }
}

/// A piece's candidate destinations, keyed by square.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidates(BTreeMap<Square, Target>);

impl Candidates {
    pub fn new() -> Candidates {
        Candidates(BTreeMap::new())
    }

    pub fn get(&self, square: Square) -> Option<Target> {
        self.0.get(&square).copied()
    }

    pub fn contains(&self, square: Square) -> bool {
        self.0.contains_key(&square)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, Target)> + '_ {
        self.0.iter().map(|(&sq, &target)| (sq, target))
    }

    /// Candidates a piece may actually be moved to, skipping attack-only squares.
    pub fn moves(&self) -> impl Iterator<Item = (Square, Target)> + '_ {
        self.iter().filter(|&(_, target)| target.is_playable())
    }

    pub fn has_moves(&self) -> bool {
        self.moves().next().is_some()
    }

    /// A copy of this map without attack-only squares.
    pub fn playable(&self) -> Candidates {
        Candidates(self.moves().collect())
    }

    pub fn squares(&self) -> SquareSet {
        self.0.keys().copied().collect()
    }

    pub(crate) fn insert(&mut self, square: Square, target: Target) {
        self.0.insert(square, target);
    }

    pub(crate) fn remove(&mut self, square: Square) -> Option<Target> {
        self.0.remove(&square)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }

    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Square, Target) -> bool,
    {
        self.0.retain(|&sq, target| keep(sq, *target));
    }
}

/// A single piece on the board.
#[derive(Clone, Debug)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    square: Square,
    /// Where this piece was created. Never changes.
    origin: Square,
    moved: bool,
    candidates: Candidates,
}

impl Piece {
    fn new(kind: PieceKind, color: Color, square: Square) -> Piece {
        Piece {
            kind,
            color,
            square,
            origin: square,
            moved: false,
            candidates: Candidates::new(),
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn square(&self) -> Square {
        self.square
    }

    pub fn origin(&self) -> Square {
        self.origin
    }

    /// Whether this piece has ever left the square it was created on.
    pub fn has_moved(&self) -> bool {
        self.moved || self.square != self.origin
    }

    pub fn candidates(&self) -> &Candidates {
        &self.candidates
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut Candidates {
        &mut self.candidates
    }

    pub(crate) fn set_candidates(&mut self, candidates: Candidates) {
        self.candidates = candidates;
    }

    /// Squares this piece could strike on its next move, according to its candidate map. Pawn pushes are movement,
    /// not threats, and castling hops are never threats.
    pub fn threats(&self) -> SquareSet {
        self.candidates
            .iter()
            .filter(|&(_, target)| match target {
                Target::Empty => self.kind != PieceKind::Pawn,
                Target::Capture(_) | Target::AttackOnly => true,
                Target::Castle(_) => false,
            })
            .map(|(sq, _)| sq)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("expected 1 {0} king, got {1}")]
    KingCount(Color, usize),
    #[error("more than one piece placed on {0}")]
    Occupied(Square),
    #[error("{0} pawn placed on its promotion rank at {1}")]
    PawnOnPromotionRank(Color, Square),
}

/// The state of a chess game: an 8x8 grid of pieces, the pieces themselves, the move log and the side to move.
///
/// Pieces live in an arena and are addressed by [`PieceId`]. Each color keeps an ordered roster of its live
/// pieces; captured pieces leave the roster and the grid but keep their arena slot, so old handles (for example in
/// the move log) never dangle.
#[derive(Clone, Debug)]
pub struct Board {
    arena: Vec<Piece>,
    /// Live pieces for each color, in setup order.
    rosters: [Vec<PieceId>; 2],
    grid: [Option<PieceId>; 64],
    kings: [PieceId; 2],
    history: Vec<MoveRecord>,
    side_to_move: Color,
}

impl Board {
    /// Builds a board from a list of pieces. Every piece starts unmoved on its given square, and the rosters keep
    /// the order of the list.
    pub fn from_placement<I>(pieces: I, side_to_move: Color) -> Result<Board, SetupError>
    where
        I: IntoIterator<Item = (Color, PieceKind, Square)>,
    {
        let mut arena: Vec<Piece> = Vec::new();
        let mut rosters = [Vec::new(), Vec::new()];
        let mut grid = [None; 64];
        for (color, kind, square) in pieces {
            if grid[square.as_u8() as usize].is_some() {
                return Err(SetupError::Occupied(square));
            }
            if kind == PieceKind::Pawn && square.rank() == color.promotion_rank() {
                return Err(SetupError::PawnOnPromotionRank(color, square));
            }

            let id = PieceId(arena.len() as u16);
            arena.push(Piece::new(kind, color, square));
            rosters[color as usize].push(id);
            grid[square.as_u8() as usize] = Some(id);
        }

        let sole_king = |color: Color| -> Result<PieceId, SetupError> {
            let kings: Vec<PieceId> = rosters[color as usize]
                .iter()
                .copied()
                .filter(|id| arena[id.index()].kind == PieceKind::King)
                .collect();
            match kings.as_slice() {
                [king] => Ok(*king),
                _ => Err(SetupError::KingCount(color, kings.len())),
            }
        };
        let kings = [sole_king(Color::White)?, sole_king(Color::Black)?];

        Ok(Board {
            arena,
            rosters,
            grid,
            kings,
            history: Vec::new(),
            side_to_move,
        })
    }

    pub fn start_position() -> Board {
        Board::from_fen(START_FEN).expect("start position is well-formed")
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.arena[id.index()]
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.arena[id.index()]
    }

    pub fn piece_at(&self, square: Square) -> Option<PieceId> {
        self.grid[square.as_u8() as usize]
    }

    /// The live pieces of the given color, in setup order (promoted pieces at the end).
    pub fn pieces(&self, color: Color) -> &[PieceId] {
        &self.rosters[color as usize]
    }

    pub fn king(&self, color: Color) -> PieceId {
        self.kings[color as usize]
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn occupancy(&self) -> SquareSet {
        core::squares()
            .filter(|&sq| self.piece_at(sq).is_some())
            .collect()
    }

    /// The union of the threat squares of every candidate map belonging to `color`.
    pub fn threats(&self, color: Color) -> SquareSet {
        self.pieces(color)
            .iter()
            .fold(SquareSet::empty(), |acc, &id| acc | self.piece(id).threats())
    }

    /// Every square attacked by a piece of `color`, given a (possibly hypothetical) occupancy of the board.
    pub fn attacked_by(&self, color: Color, occupancy: SquareSet) -> SquareSet {
        self.pieces(color).iter().fold(SquareSet::empty(), |acc, &id| {
            let piece = self.piece(id);
            acc | attacked_squares(piece.kind, piece.color, piece.square, occupancy)
        })
    }

    /// Whether `color`'s king is attacked by the opposing side in the current position.
    pub fn is_check(&self, color: Color) -> bool {
        let king = self.piece(self.king(color)).square;
        self.attacked_by(color.toggle(), self.occupancy())
            .contains(king)
    }
}

//
// Move execution, including the special moves.
//

impl Board {
    /// Plays a move that has already been validated against the moving piece's candidate map, appends it to the
    /// move log and passes the turn.
    pub(crate) fn make_move(
        &mut self,
        id: PieceId,
        destination: Square,
        target: Target,
        promotion: Option<PieceKind>,
    ) -> MoveRecord {
        let (kind, color, origin) = {
            let piece = self.piece(id);
            (piece.kind, piece.color, piece.square)
        };
        debug_assert!(target.is_playable(), "attack-only squares are never played");

        let mut capture = false;
        let mut castle = false;
        let mut en_passant = false;
        match target {
            Target::Empty | Target::AttackOnly => {}
            Target::Capture(victim) => {
                // En passant is the only capture where the victim is not on the destination square.
                en_passant = self.piece(victim).square != destination;
                self.remove_piece(victim);
                capture = true;
            }
            Target::Castle(rook) => {
                // The rook lands on the square the king crosses.
                let rook_square = Square::of(origin.rank(), (origin.file() + destination.file()) / 2);
                self.relocate(rook, rook_square);
                castle = true;
            }
        }

        self.relocate(id, destination);
        if let Some(promoted) = promotion {
            self.promote(id, promoted);
        }

        let record = MoveRecord {
            origin,
            piece: id,
            kind,
            color,
            capture,
            destination,
            promotion,
            castle,
            en_passant,
        };
        self.history.push(record);
        self.side_to_move = self.side_to_move.toggle();
        record
    }

    fn relocate(&mut self, id: PieceId, to: Square) {
        let from = self.piece(id).square;
        if self.piece_at(from) == Some(id) {
            self.grid[from.as_u8() as usize] = None;
        }
        self.grid[to.as_u8() as usize] = Some(id);
        let piece = self.piece_mut(id);
        piece.square = to;
        piece.moved = true;
    }

    fn remove_piece(&mut self, id: PieceId) {
        let (square, color) = {
            let piece = self.piece(id);
            debug_assert!(piece.kind != PieceKind::King, "kings are never captured");
            (piece.square, piece.color)
        };
        if self.piece_at(square) == Some(id) {
            self.grid[square.as_u8() as usize] = None;
        }
        self.rosters[color as usize].retain(|&live| live != id);
        self.piece_mut(id).candidates.clear();
    }

    /// Replaces a pawn with a new piece of the given kind on the same square.
    fn promote(&mut self, pawn: PieceId, kind: PieceKind) -> PieceId {
        let (square, color) = {
            let piece = self.piece(pawn);
            (piece.square, piece.color)
        };
        self.remove_piece(pawn);

        let id = PieceId(self.arena.len() as u16);
        let mut promoted = Piece::new(kind, color, square);
        promoted.moved = true;
        self.arena.push(promoted);
        self.rosters[color as usize].push(id);
        self.grid[square.as_u8() as usize] = Some(id);
        id
    }
}

//
// FEN parsing and generation.
//
// Only the piece placement and side to move fields are read; castling availability follows from which kings and
// rooks stand unmoved on their home squares, and en passant from the move log, so the remaining fields are
// accepted and ignored.
//

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Possible errors that can arise when parsing a FEN string into a `Board`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("unexpected EOF while reading")]
    UnexpectedEnd,
    #[error("invalid digit")]
    InvalidDigit,
    #[error("file does not sum to 8")]
    FileDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error(transparent)]
    Setup(#[from] SetupError),
}

impl Board {
    /// Constructs a new board from a FEN representation of a position.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Board, FenParseError> {
        use std::{iter::Peekable, str::Chars};

        type Stream<'a> = Peekable<Chars<'a>>;

        fn eat(iter: &mut Stream<'_>, expected: char) -> Result<(), FenParseError> {
            match iter.next() {
                Some(c) if c == expected => Ok(()),
                Some(c) => Err(FenParseError::UnexpectedChar(c)),
                None => Err(FenParseError::UnexpectedEnd),
            }
        }

        fn peek(iter: &mut Stream<'_>) -> Result<char, FenParseError> {
            iter.peek().copied().ok_or(FenParseError::UnexpectedEnd)
        }

        let iter = &mut fen.as_ref().chars().peekable();
        let mut pieces = Vec::new();
        for rank in 0..8u8 {
            let mut file = 0u8;
            while file < 8 {
                let c = peek(iter)?;
                // digits 1 through 8 indicate empty squares.
                if let Some(value) = c.to_digit(10) {
                    if !(1..=8).contains(&value) {
                        return Err(FenParseError::InvalidDigit);
                    }

                    file += value as u8;
                    if file > 8 {
                        return Err(FenParseError::FileDoesNotSumToEight);
                    }

                    iter.next();
                    continue;
                }

                let (color, kind) =
                    core::piece_from_char(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                pieces.push((color, kind, Square::of(rank, file)));
                iter.next();
                file += 1;
            }

            if rank != 7 {
                eat(iter, '/')?;
            }
        }

        let side_to_move = if iter.peek().is_none() {
            Color::White
        } else {
            eat(iter, ' ')?;
            match iter.next() {
                Some('w') => Color::White,
                Some('b') => Color::Black,
                _ => return Err(FenParseError::InvalidSideToMove),
            }
        };

        Ok(Board::from_placement(pieces, side_to_move)?)
    }

    /// The piece placement and side to move of this board, in FEN.
    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for rank in 0..8 {
            let mut empty_squares = 0;
            for file in 0..8 {
                match self.piece_at(Square::of(rank, file)) {
                    Some(id) => {
                        let piece = self.piece(id);
                        if empty_squares != 0 {
                            let _ = write!(&mut buf, "{}", empty_squares);
                        }
                        buf.push(core::piece_char(piece.color, piece.kind));
                        empty_squares = 0;
                    }
                    None => empty_squares += 1,
                }
            }

            if empty_squares != 0 {
                let _ = write!(&mut buf, "{}", empty_squares);
            }

            if rank != 7 {
                buf.push('/');
            }
        }

        buf.push(' ');
        match self.side_to_move {
            Color::White => buf.push('w'),
            Color::Black => buf.push('b'),
        }
        buf
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in 0..8 {
            for file in 0..8 {
                match self.piece_at(Square::of(rank, file)) {
                    Some(id) => {
                        let piece = self.piece(id);
                        write!(f, " {} ", core::piece_char(piece.color, piece.kind))?;
                    }
                    None => write!(f, " . ")?,
                }
            }

            writeln!(f, "| {}", 8 - rank)?;
        }

        for _ in 0..8 {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in b'a'..=b'h' {
            write!(f, " {} ", file as char)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::start_position()
    }
}
