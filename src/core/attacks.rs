// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Attack sets for every piece kind, computed against an occupancy set rather than a board. These answer "which
//! squares would this piece attack if it stood here" without building any hypothetical board.

use lazy_static::lazy_static;

use crate::core::*;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
];

struct JumpTable {
    table: [SquareSet; 64],
}

impl JumpTable {
    fn new(offsets: &[(i8, i8)]) -> JumpTable {
        let mut jt = JumpTable {
            table: [SquareSet::empty(); 64],
        };

        for sq in squares() {
            jt.table[sq.0 as usize] = offsets
                .iter()
                .filter_map(|&(ranks, files)| sq.offset(ranks, files))
                .collect();
        }

        jt
    }

    fn attacks(&self, sq: Square) -> SquareSet {
        self.table[sq.0 as usize]
    }
}

lazy_static! {
    static ref KNIGHT_TABLE: JumpTable = JumpTable::new(&KNIGHT_OFFSETS);
    static ref KING_TABLE: JumpTable = {
        let offsets: Vec<(i8, i8)> = ALL_DIRECTIONS.iter().map(|d| d.as_vector()).collect();
        JumpTable::new(&offsets)
    };
}

/// Squares reached by walking from `sq` in `dir`, stopping at (and including) the first occupied square.
pub fn ray_attacks(sq: Square, dir: Direction, occupancy: SquareSet) -> SquareSet {
    let mut attacks = SquareSet::empty();
    let mut cursor = sq;
    while let Some(next) = cursor.towards(dir) {
        attacks.insert(next);
        if occupancy.contains(next) {
            break;
        }
        cursor = next;
    }
    attacks
}

/// Squares strictly between two squares sharing a rank, file or diagonal. Empty if they are not aligned.
pub fn between(from: Square, to: Square) -> SquareSet {
    let mut set = SquareSet::empty();
    if let Some(dir) = Direction::between(from, to) {
        let mut cursor = from;
        while let Some(next) = cursor.towards(dir) {
            if next == to {
                break;
            }
            set.insert(next);
            cursor = next;
        }
    }
    set
}

pub fn pawn_attacks(sq: Square, color: Color) -> SquareSet {
    [-1, 1]
        .iter()
        .filter_map(|&files| sq.offset(color.forward(), files))
        .collect()
}

pub fn knight_attacks(sq: Square) -> SquareSet {
    KNIGHT_TABLE.attacks(sq)
}

pub fn king_attacks(sq: Square) -> SquareSet {
    KING_TABLE.attacks(sq)
}

pub fn bishop_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    DIAGONAL_DIRECTIONS
        .iter()
        .fold(SquareSet::empty(), |acc, &dir| {
            acc | ray_attacks(sq, dir, occupancy)
        })
}

pub fn rook_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    ORTHOGONAL_DIRECTIONS
        .iter()
        .fold(SquareSet::empty(), |acc, &dir| {
            acc | ray_attacks(sq, dir, occupancy)
        })
}

pub fn queen_attacks(sq: Square, occupancy: SquareSet) -> SquareSet {
    bishop_attacks(sq, occupancy) | rook_attacks(sq, occupancy)
}

/// The squares a piece of the given kind and color standing on `sq` attacks, given the occupancy of the board.
/// Occupied squares at the end of a ray are included regardless of color, so the result also covers squares the
/// piece defends.
pub fn attacked_squares(kind: PieceKind, color: Color, sq: Square, occupancy: SquareSet) -> SquareSet {
    match kind {
        PieceKind::Pawn => pawn_attacks(sq, color),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupancy),
        PieceKind::Rook => rook_attacks(sq, occupancy),
        PieceKind::Queen => queen_attacks(sq, occupancy),
        PieceKind::King => king_attacks(sq),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn knight_in_corner() {
        let attacks = knight_attacks(sq("a1"));
        assert_eq!(2, attacks.len());
        assert!(attacks.contains(sq("b3")));
        assert!(attacks.contains(sq("c2")));
    }

    #[test]
    fn king_in_center() {
        assert_eq!(8, king_attacks(sq("d4")).len());
        assert_eq!(3, king_attacks(sq("h8")).len());
    }

    #[test]
    fn pawn_attacks_point_forward() {
        let white = pawn_attacks(sq("e4"), Color::White);
        assert!(white.contains(sq("d5")));
        assert!(white.contains(sq("f5")));
        let black = pawn_attacks(sq("a5"), Color::Black);
        assert_eq!(1, black.len());
        assert!(black.contains(sq("b4")));
    }

    #[test]
    fn rook_stops_at_blocker() {
        let occupancy = SquareSet::empty().with(sq("d6"));
        let attacks = rook_attacks(sq("d4"), occupancy);
        assert!(attacks.contains(sq("d5")));
        assert!(attacks.contains(sq("d6")));
        assert!(!attacks.contains(sq("d7")));
        assert_eq!(12, attacks.len());
    }

    #[test]
    fn attacks_see_through_lifted_piece() {
        let occupancy = SquareSet::empty().with(sq("e4"));
        let rook = attacked_squares(PieceKind::Rook, Color::Black, sq("e8"), occupancy);
        assert!(!rook.contains(sq("e3")));
        let lifted = attacked_squares(
            PieceKind::Rook,
            Color::Black,
            sq("e8"),
            occupancy.without(sq("e4")),
        );
        assert!(lifted.contains(sq("e3")));
    }

    #[test]
    fn between_aligned_squares() {
        let set = between(sq("e1"), sq("e8"));
        assert_eq!(6, set.len());
        assert!(set.contains(sq("e2")));
        assert!(!set.contains(sq("e8")));
        assert_eq!(2, between(sq("a1"), sq("d4")).len());
        assert!(between(sq("a1"), sq("b3")).is_empty());
        assert!(between(sq("a1"), sq("a2")).is_empty());
    }
}
