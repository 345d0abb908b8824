// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::core::Square;
use std::fmt;
use std::iter::FromIterator;
use std::ops;

/// A set of squares on the chessboard. The implementation of SquareSet is designed to mirror
/// [`std::collections::HashSet`], but stores squares as bits of a single word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SquareSet(u64);

impl SquareSet {
    /// Creates a new, empty SquareSet.
    pub const fn empty() -> SquareSet {
        SquareSet(0)
    }

    /// Creates a new SquareSet with all squares present in the set.
    pub const fn all() -> SquareSet {
        SquareSet(0xFFFFFFFFFFFFFFFF)
    }

    /// Tests whether or not the given square is contained within this SquareSet.
    pub const fn contains(&self, square: Square) -> bool {
        self.0 & (1u64 << square.0) != 0
    }

    pub fn insert(&mut self, square: Square) {
        self.0 |= 1u64 << square.0;
    }

    pub fn remove(&mut self, square: Square) {
        self.0 &= !(1u64 << square.0);
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn and(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 & other.0)
    }

    pub const fn or(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 | other.0)
    }

    pub const fn not(self) -> SquareSet {
        SquareSet(!self.0)
    }

    /// Returns this set with the given square added, leaving `self` untouched.
    pub fn with(mut self, square: Square) -> SquareSet {
        self.insert(square);
        self
    }

    /// Returns this set with the given square removed, leaving `self` untouched.
    pub fn without(mut self, square: Square) -> SquareSet {
        self.remove(square);
        self
    }

    pub fn bits(self) -> u64 {
        self.0
    }
}

impl ops::BitOr for SquareSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl ops::BitOrAssign for SquareSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.or(rhs);
    }
}

impl ops::Not for SquareSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        SquareSet::not(self)
    }
}

impl ops::BitAnd for SquareSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = SquareSetIterator;

    fn into_iter(self) -> Self::IntoIter {
        SquareSetIterator(self.0)
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut set = SquareSet::empty();
        for sq in iter {
            set.insert(sq);
        }
        set
    }
}

impl fmt::Display for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in 0..8 {
            for file in 0..8 {
                if self.contains(Square::of(rank, file)) {
                    write!(f, " 1 ")?;
                } else {
                    write!(f, " . ")?;
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

/// An iterator over squares stored in a [`SquareSet`], in ascending index order.
pub struct SquareSetIterator(u64);

impl Iterator for SquareSetIterator {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let next = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(Square(next))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SquareSet;
    use crate::core::*;

    #[test]
    fn test_set_clear() {
        let a1 = Square::of(7, 0);
        let mut set = SquareSet::empty();
        assert!(!set.contains(a1));
        set.insert(a1);
        assert!(set.contains(a1));
        set.remove(a1);
        assert!(!set.contains(a1));
    }

    #[test]
    fn count() {
        let set: SquareSet = [Square::of(5, 0), Square::of(4, 0), Square::of(3, 0)]
            .iter()
            .copied()
            .collect();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn iter() {
        let mut set = SquareSet::empty();
        set.insert(Square::of(5, 0));
        set.insert(Square::of(3, 0));
        set.insert(Square::of(4, 0));
        let squares: Vec<_> = set.into_iter().collect();
        assert_eq!(
            squares,
            vec![Square::of(3, 0), Square::of(4, 0), Square::of(5, 0)]
        );
    }

    #[test]
    fn with_and_without_copy() {
        let e4 = Square::of(4, 4);
        let set = SquareSet::empty();
        let added = set.with(e4);
        assert!(set.is_empty());
        assert!(added.contains(e4));
        assert!(added.without(e4).is_empty());
    }

    #[test]
    fn complement() {
        let set = SquareSet::empty().with(Square::of(0, 0));
        assert_eq!(63, (!set).len());
        assert!((set & !set).is_empty());
        assert_eq!(SquareSet::all(), set | !set);
    }
}
