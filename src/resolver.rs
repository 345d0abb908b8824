// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Check, pin and terminal-state resolution.
//!
//! [`resolve`] regenerates every candidate map on the board and then prunes the side to move's maps down to legal
//! moves. The opponent's maps are left pseudo-legal; they only serve as a record of what the opponent threatens.

use tracing::{debug, trace};

use crate::{
    board::{Board, PieceId, Target},
    core::{attacked_squares, between, Color, PieceKind, Square, SquareSet, ALL_DIRECTIONS},
    movegen,
};

/// The check state of the side to move, recomputed from scratch every ply.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    Safe,
    /// The king is attacked by exactly one piece.
    SingleCheck(PieceId),
    DoubleCheck,
    Checkmate,
    Stalemate,
}

impl CheckStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CheckStatus::Checkmate | CheckStatus::Stalemate)
    }

    pub fn is_check(self) -> bool {
        matches!(
            self,
            CheckStatus::SingleCheck(_) | CheckStatus::DoubleCheck | CheckStatus::Checkmate
        )
    }
}

/// Regenerates all candidate maps, opponent first, and leaves only legal moves in the side to move's maps.
pub fn resolve(board: &mut Board) -> CheckStatus {
    let us = board.side_to_move();
    movegen::generate_side(us.toggle(), board);
    movegen::generate_side(us, board);

    let king = board.king(us);
    let king_square = board.piece(king).square();
    let mut checkers = scan_rays(board, us, king_square);
    for &id in board.pieces(us.toggle()) {
        let piece = board.piece(id);
        if piece.kind() == PieceKind::Knight && piece.candidates().contains(king_square) {
            trace!(checker = %piece.square(), "knight check");
            checkers.push(id);
        }
    }

    filter_king_moves(board, us, king);
    filter_en_passant(board, us, king_square);

    match checkers.as_slice() {
        [] => {}
        [checker] => restrict_to_block_or_capture(board, us, *checker, king_square),
        _ => {
            for id in board.pieces(us).to_vec() {
                if id != king {
                    board.piece_mut(id).candidates_mut().clear();
                }
            }
        }
    }

    if !checkers.is_empty() {
        board
            .piece_mut(king)
            .candidates_mut()
            .retain(|_, target| !matches!(target, Target::Castle(_)));
    }

    let has_moves = board
        .pieces(us)
        .iter()
        .any(|&id| board.piece(id).candidates().has_moves());
    let status = match (checkers.as_slice(), has_moves) {
        ([], true) => CheckStatus::Safe,
        ([], false) => CheckStatus::Stalemate,
        (_, false) => CheckStatus::Checkmate,
        ([checker], true) => CheckStatus::SingleCheck(*checker),
        (_, true) => CheckStatus::DoubleCheck,
    };

    debug!(side = %us, status = ?status, checkers = checkers.len(), "resolved position");
    status
}

/// Walks the eight rays out of the king. Returns the pieces checking along a ray, and restricts every own piece
/// pinned against the king to the squares of its ray.
fn scan_rays(board: &mut Board, us: Color, king_square: Square) -> Vec<PieceId> {
    let mut checkers = Vec::new();
    for &dir in ALL_DIRECTIONS.iter() {
        let mut ray = SquareSet::empty();
        let mut blocker: Option<PieceId> = None;
        let mut cursor = king_square;
        while let Some(next) = cursor.towards(dir) {
            cursor = next;
            ray.insert(next);
            let id = match board.piece_at(next) {
                Some(id) => id,
                None => continue,
            };

            let piece = board.piece(id);
            let is_enemy = piece.color() != us;
            match blocker {
                None if is_enemy => {
                    if piece.kind() != PieceKind::King && piece.candidates().contains(king_square) {
                        trace!(checker = %next, direction = ?dir, "ray check");
                        checkers.push(id);
                    }
                    break;
                }
                None => blocker = Some(id),
                Some(pinned) => {
                    if is_enemy && piece.kind().slides_along(dir) {
                        trace!(pinned = %board.piece(pinned).square(), pinner = %next, "pin");
                        board
                            .piece_mut(pinned)
                            .candidates_mut()
                            .retain(|sq, _| ray.contains(sq));
                    }
                    break;
                }
            }
        }
    }
    checkers
}

/// Removes king destinations that would be attacked once the king stands there. The king is lifted from the
/// occupancy first, so a slider's line is not blocked by the very king it attacks.
fn filter_king_moves(board: &mut Board, us: Color, king: PieceId) {
    let origin = board.piece(king).square();
    let occupancy = board.occupancy().without(origin);
    let danger = board.attacked_by(us.toggle(), occupancy);
    board
        .piece_mut(king)
        .candidates_mut()
        .retain(|sq, target| match target {
            Target::Castle(_) => {
                let transit = Square::of(origin.rank(), (origin.file() + sq.file()) / 2);
                !danger.contains(origin) && !danger.contains(transit) && !danger.contains(sq)
            }
            _ => !danger.contains(sq),
        });
}

/// Drops en passant captures that would uncover an attack on the king. Both pawns leave their rank at once, which
/// is the one capture a pin scan cannot see.
fn filter_en_passant(board: &mut Board, us: Color, king_square: Square) {
    let occupancy = board.occupancy();
    for id in board.pieces(us).to_vec() {
        if board.piece(id).kind() != PieceKind::Pawn {
            continue;
        }

        let origin = board.piece(id).square();
        let mut exposing = Vec::new();
        for (destination, target) in board.piece(id).candidates().iter() {
            let victim = match target {
                Target::Capture(victim) if board.piece(victim).square() != destination => victim,
                _ => continue,
            };

            let after = occupancy
                .without(origin)
                .without(board.piece(victim).square())
                .with(destination);
            let exposed = board.pieces(us.toggle()).iter().any(|&enemy| {
                let piece = board.piece(enemy);
                enemy != victim
                    && attacked_squares(piece.kind(), piece.color(), piece.square(), after)
                        .contains(king_square)
            });
            if exposed {
                exposing.push(destination);
            }
        }

        for destination in exposing {
            trace!(pawn = %origin, %destination, "en passant exposes king");
            board.piece_mut(id).candidates_mut().remove(destination);
        }
    }
}

/// Under a single check, every piece but the king must capture the checker or step between it and the king.
fn restrict_to_block_or_capture(board: &mut Board, us: Color, checker: PieceId, king_square: Square) {
    let checker_square = board.piece(checker).square();
    let mut resolving = SquareSet::empty().with(checker_square);
    if board.piece(checker).kind().is_slider() {
        resolving |= between(king_square, checker_square);
    }

    let king = board.king(us);
    for id in board.pieces(us).to_vec() {
        if id == king {
            continue;
        }

        board
            .piece_mut(id)
            .candidates_mut()
            .retain(|sq, target| match target {
                Target::Capture(victim) if victim == checker => true,
                Target::Empty | Target::Capture(_) => resolving.contains(sq),
                Target::AttackOnly | Target::Castle(_) => false,
            });
    }
}
