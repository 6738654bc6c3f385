/*
  fr-perft, a Chess960 perft engine.
  Copyright (C) 2022 Clayton Ramsey.

  fr-perft is free software: you can redistribute it and/or modify
  it under the terms of the GNU General Public License as published by
  the Free Software Foundation, either version 3 of the License, or
  (at your option) any later version.

  fr-perft is distributed in the hope that it will be useful,
  but WITHOUT ANY WARRANTY; without even the implied warranty of
  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
  GNU General Public License for more details.

  You should have received a copy of the GNU General Public License
  along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/

//! Squares, the atomic unit of a chessboard location.

use crate::direction::Direction;
use std::{
    cmp::max,
    convert::TryFrom,
    fmt::{Display, Formatter},
    mem::transmute,
    ops::{Add, AddAssign, Sub},
};

const FILE_NAMES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];
const RANK_NAMES: [char; 8] = ['1', '2', '3', '4', '5', '6', '7', '8'];

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// A single square on the board, numbered 0 (a1) through 63 (h8), rank-major.
pub enum Square {
    A1 = 0, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Construct a square from a 0-indexed rank and file. Returns `None` if either is out of
    /// `0..8`.
    #[must_use]
    pub fn new(rank: u8, file: u8) -> Option<Square> {
        if rank > 7 || file > 7 {
            return None;
        }
        Square::try_from((rank << 3) | file).ok()
    }

    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8 >> 3
    }

    #[must_use]
    pub const fn file(self) -> u8 {
        (self as u8) & 7
    }

    /// The lowercase file letter of this square, used both in algebraic notation and in
    /// Shredder-FEN castling-rights fields.
    #[must_use]
    pub const fn file_name(self) -> char {
        FILE_NAMES[self.file() as usize]
    }

    #[must_use]
    pub fn chebyshev_to(self, rhs: Square) -> u8 {
        let rank_diff = (i16::from(rhs.rank()) - i16::from(self.rank())).abs();
        let file_diff = (i16::from(rhs.file()) - i16::from(self.file())).abs();
        max(rank_diff, file_diff) as u8
    }

    #[must_use]
    pub fn file_distance(self, rhs: Square) -> u8 {
        (i16::from(rhs.file()) - i16::from(self.file())).unsigned_abs() as u8
    }

    /// This square as it would appear to the opposing player (rank mirrored).
    #[must_use]
    pub fn mirror_rank(self) -> Square {
        Square::new(7 - self.rank(), self.file()).unwrap()
    }

    /// Parse a two-character algebraic square name such as `"e4"`.
    ///
    /// # Errors
    /// Returns an error string if `s` is not exactly a lowercase file letter followed by a rank
    /// digit 1-8.
    pub fn from_algebraic(s: &str) -> Result<Square, &'static str> {
        if s.len() != 2 {
            return Err("square name must be 2 characters");
        }
        let mut chars = s.chars();
        let file = match FILE_NAMES.iter().position(|&c| c == chars.next().unwrap()) {
            Some(f) => f as u8,
            None => return Err("illegal file for square"),
        };
        let rank = match chars.next().unwrap().to_digit(10) {
            Some(n @ 1..=8) => (n - 1) as u8,
            _ => return Err("expected a rank digit 1-8"),
        };
        Ok(Square::new(rank, file).unwrap())
    }

    /// Construct the square of the lowest set bit in a nonzero `u64`.
    ///
    /// # Safety
    /// `bits` must be nonzero.
    #[must_use]
    pub unsafe fn unsafe_from_trailing(bits: u64) -> Square {
        transmute(bits.trailing_zeros() as u8)
    }
}

impl Add<Direction> for Square {
    type Output = Square;
    fn add(self, rhs: Direction) -> Square {
        unsafe { transmute(((self as i8) + rhs.value()) as u8 & 63) }
    }
}

impl AddAssign<Direction> for Square {
    fn add_assign(&mut self, rhs: Direction) {
        *self = *self + rhs;
    }
}

impl Sub<Square> for Square {
    type Output = Direction;
    fn sub(self, rhs: Square) -> Direction {
        Direction::new_raw((self as i8) - (rhs as i8))
    }
}

impl Sub<Direction> for Square {
    type Output = Square;
    fn sub(self, rhs: Direction) -> Square {
        unsafe { transmute(((self as i8) - rhs.value()) as u8 & 63) }
    }
}

impl TryFrom<u8> for Square {
    type Error = &'static str;
    fn try_from(x: u8) -> Result<Square, Self::Error> {
        if x <= Square::H8 as u8 {
            Ok(unsafe { transmute(x) })
        } else {
            Err("square index out of bounds")
        }
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_name(), RANK_NAMES[self.rank() as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_direction() {
        assert_eq!(Square::A1 + Direction::EAST, Square::B1);
        assert_eq!(Square::A1 + Direction::NORTHEAST, Square::B2);
    }

    #[test]
    fn from_algebraic_round_trips() {
        assert_eq!(Square::from_algebraic("e4"), Ok(Square::E4));
        assert_eq!(Square::from_algebraic("h8").unwrap().to_string(), "h8");
    }

    #[test]
    fn rejects_bad_algebraic() {
        assert!(Square::from_algebraic("i9").is_err());
        assert!(Square::from_algebraic("e").is_err());
    }

    #[test]
    fn file_distance_is_symmetric() {
        assert_eq!(Square::A1.file_distance(Square::H1), 7);
        assert_eq!(Square::H1.file_distance(Square::A1), 7);
    }
}
