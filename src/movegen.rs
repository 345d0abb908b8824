// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-piece candidate generation. Candidates are pseudo-legal: they respect how each piece moves and what stands
//! in its way, but pins and checks are left to the resolver.

use crate::{
    board::{Board, Candidates, PieceId, Target},
    core::{
        attacks, Color, Direction, PieceKind, Square, SquareSet, DIAGONAL_DIRECTIONS,
        ORTHOGONAL_DIRECTIONS,
    },
};

type Generator = fn(&Board, PieceId) -> Candidates;

/// Candidate generators, indexed by `PieceKind`.
const GENERATORS: [Generator; 6] = [
    pawn_candidates,
    knight_candidates,
    bishop_candidates,
    rook_candidates,
    queen_candidates,
    king_candidates,
];

/// Clears and rebuilds the candidate map of a single piece.
pub fn generate(id: PieceId, board: &mut Board) {
    let kind = board.piece(id).kind();
    let candidates = GENERATORS[kind as usize](board, id);
    board.piece_mut(id).set_candidates(candidates);
}

/// Rebuilds the candidate map of every live piece of the given color, in roster order.
pub fn generate_side(color: Color, board: &mut Board) {
    let roster = board.pieces(color).to_vec();
    for id in roster {
        generate(id, board);
    }
}

/// What a piece of `color` would find on `sq`: `None` if one of its own pieces is there.
fn classify(board: &Board, color: Color, sq: Square) -> Option<Target> {
    match board.piece_at(sq) {
        None => Some(Target::Empty),
        Some(other) if board.piece(other).color() != color => Some(Target::Capture(other)),
        Some(_) => None,
    }
}

fn step_candidates(board: &Board, id: PieceId, squares: SquareSet) -> Candidates {
    let color = board.piece(id).color();
    let mut candidates = Candidates::new();
    for sq in squares {
        if let Some(target) = classify(board, color, sq) {
            candidates.insert(sq, target);
        }
    }
    candidates
}

fn slide_candidates(board: &Board, id: PieceId, directions: &[Direction]) -> Candidates {
    let piece = board.piece(id);
    let mut candidates = Candidates::new();
    for &dir in directions {
        let mut cursor = piece.square();
        while let Some(next) = cursor.towards(dir) {
            match classify(board, piece.color(), next) {
                Some(Target::Empty) => candidates.insert(next, Target::Empty),
                Some(capture) => {
                    candidates.insert(next, capture);
                    break;
                }
                None => break,
            }
            cursor = next;
        }
    }
    candidates
}

fn pawn_candidates(board: &Board, id: PieceId) -> Candidates {
    let pawn = board.piece(id);
    let color = pawn.color();
    let sq = pawn.square();
    let mut candidates = Candidates::new();

    if let Some(single) = sq.offset(color.forward(), 0) {
        if board.piece_at(single).is_none() {
            candidates.insert(single, Target::Empty);
            if !pawn.has_moved() && sq.rank() == color.pawn_rank() {
                if let Some(double) = single.offset(color.forward(), 0) {
                    if board.piece_at(double).is_none() {
                        candidates.insert(double, Target::Empty);
                    }
                }
            }
        }
    }

    for diagonal in attacks::pawn_attacks(sq, color) {
        let target = match board.piece_at(diagonal) {
            Some(other) if board.piece(other).color() != color => Target::Capture(other),
            _ => Target::AttackOnly,
        };
        candidates.insert(diagonal, target);
    }

    // En passant: the previous move was an enemy pawn's double step that landed right beside this pawn.
    if let Some(last) = board.last_move() {
        if last.color != color
            && last.is_double_pawn_push()
            && board.piece_at(last.destination) == Some(last.piece)
        {
            let passed = last.destination;
            let adjacent = passed.rank() == sq.rank()
                && (passed.file() as i8 - sq.file() as i8).abs() == 1;
            if adjacent {
                if let Some(behind) = passed.offset(color.forward(), 0) {
                    candidates.insert(behind, Target::Capture(last.piece));
                }
            }
        }
    }

    candidates
}

fn knight_candidates(board: &Board, id: PieceId) -> Candidates {
    step_candidates(board, id, attacks::knight_attacks(board.piece(id).square()))
}

fn bishop_candidates(board: &Board, id: PieceId) -> Candidates {
    slide_candidates(board, id, &DIAGONAL_DIRECTIONS)
}

fn rook_candidates(board: &Board, id: PieceId) -> Candidates {
    slide_candidates(board, id, &ORTHOGONAL_DIRECTIONS)
}

fn queen_candidates(board: &Board, id: PieceId) -> Candidates {
    let mut candidates = bishop_candidates(board, id);
    for (sq, target) in rook_candidates(board, id).iter() {
        candidates.insert(sq, target);
    }
    candidates
}

/// King steps and castling. Only the side to move consults the opponent's threats; the other king's map is its
/// raw neighbourhood, which is exactly the set of squares it attacks.
fn king_candidates(board: &Board, id: PieceId) -> Candidates {
    let king = board.piece(id);
    let mut candidates = step_candidates(board, id, attacks::king_attacks(king.square()));
    if king.color() != board.side_to_move() {
        return candidates;
    }

    let threats = board.threats(king.color().toggle());
    candidates.retain(|sq, _| !threats.contains(sq));
    add_castles(board, id, threats, &mut candidates);
    candidates
}

fn add_castles(board: &Board, id: PieceId, threats: SquareSet, candidates: &mut Candidates) {
    let king = board.piece(id);
    let color = king.color();
    let home = color.home_rank();
    if king.has_moved() || king.square() != Square::of(home, 4) || threats.contains(king.square()) {
        return;
    }

    for &(rook_file, step) in &[(7u8, 1i8), (0u8, -1i8)] {
        let rook_square = Square::of(home, rook_file);
        let rook_id = match board.piece_at(rook_square) {
            Some(rook_id) => rook_id,
            None => continue,
        };

        let rook = board.piece(rook_id);
        if rook.kind() != PieceKind::Rook || rook.color() != color || rook.has_moved() {
            continue;
        }

        let path_clear = attacks::between(king.square(), rook_square)
            .into_iter()
            .all(|sq| board.piece_at(sq).is_none());
        if !path_clear {
            continue;
        }

        let transit = king.square().offset(0, step);
        let destination = king.square().offset(0, 2 * step);
        let (transit, destination) = match (transit, destination) {
            (Some(transit), Some(destination)) => (transit, destination),
            _ => continue,
        };
        if threats.contains(transit) || threats.contains(destination) {
            continue;
        }

        candidates.insert(destination, Target::Castle(rook_id));
    }
}
