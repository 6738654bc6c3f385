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

//! Castling rights and the Chess960-generalized per-game castling geometry.
//!
//! Orthodox chess hardcodes the king on e1/e8 and rooks on a1/h1/a8/h8. Chess960 allows any
//! back-rank arrangement, so the squares the king and rook start from (and therefore which
//! squares must be empty and unattacked for a given castle to be legal) are a property of the
//! *game*, not a constant — they are computed once from the starting position and carried
//! alongside the position for the rest of the search.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXorAssign, Not};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
/// Which side of the king a castle moves toward.
pub enum Flank {
    /// Short castle: king to the g-file, rook to the f-file.
    Kingside = 0,
    /// Long castle: king to the c-file, rook to the d-file.
    Queenside = 1,
}

impl Flank {
    pub const ALL: [Flank; 2] = [Flank::Kingside, Flank::Queenside];

    /// The file the king lands on for this flank.
    #[must_use]
    pub const fn king_dest_file(self) -> u8 {
        match self {
            Flank::Kingside => 6,
            Flank::Queenside => 2,
        }
    }

    /// The file the rook lands on for this flank.
    #[must_use]
    pub const fn rook_dest_file(self) -> u8 {
        match self {
            Flank::Kingside => 5,
            Flank::Queenside => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[repr(transparent)]
/// A 4-bit mask: bit 0 = white kingside, bit 1 = white queenside, bit 2 = black kingside,
/// bit 3 = black queenside.
pub struct CastleRights(pub u8);

impl CastleRights {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    const WK: u8 = 1 << 0;
    const WQ: u8 = 1 << 1;
    const BK: u8 = 1 << 2;
    const BQ: u8 = 1 << 3;

    #[must_use]
    pub const fn bit(color: Color, flank: Flank) -> u8 {
        match (color, flank) {
            (Color::White, Flank::Kingside) => Self::WK,
            (Color::White, Flank::Queenside) => Self::WQ,
            (Color::Black, Flank::Kingside) => Self::BK,
            (Color::Black, Flank::Queenside) => Self::BQ,
        }
    }

    #[must_use]
    pub const fn has(self, color: Color, flank: Flank) -> bool {
        self.0 & Self::bit(color, flank) != 0
    }

    pub fn set(&mut self, color: Color, flank: Flank) {
        self.0 |= Self::bit(color, flank);
    }

    pub fn clear(&mut self, color: Color, flank: Flank) {
        self.0 &= !Self::bit(color, flank);
    }

    /// Clear both rights for a color (used when that color's king moves off its start square).
    pub fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => self.0 &= !(Self::WK | Self::WQ),
            Color::Black => self.0 &= !(Self::BK | Self::BQ),
        }
    }
}

impl BitAnd for CastleRights {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
impl BitAndAssign for CastleRights {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}
impl BitOr for CastleRights {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}
impl BitOrAssign for CastleRights {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl BitXorAssign for CastleRights {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}
impl Not for CastleRights {
    type Output = Self;
    fn not(self) -> Self::Output {
        Self((!self.0) & Self::ALL.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// The per-game castling geometry, established once from the starting position and never
/// changed for the lifetime of a search: which squares the kings and rooks started on, and the
/// precomputed path/emptiness bitboards derived from them.
pub struct CastlingSetup {
    pub king_start: [Square; 2],
    /// `rook_start[color][flank]`.
    pub rook_start: [[Square; 2]; 2],
    /// Squares the king passes through (inclusive of origin and destination).
    pub castle_path: [[Bitboard; 2]; 2],
    /// Squares that must be empty of every piece except the castling king/rook themselves.
    pub castle_empty: [[Bitboard; 2]; 2],
}

impl CastlingSetup {
    /// Build the path/emptiness tables for a given set of king and rook starting squares. This
    /// must be re-run whenever the starting position changes (i.e. once, at FEN intake) — the
    /// geometry is a property of the game, not of any one move.
    #[must_use]
    pub fn new(king_start: [Square; 2], rook_start: [[Square; 2]; 2]) -> Self {
        let mut castle_path = [[Bitboard::EMPTY; 2]; 2];
        let mut castle_empty = [[Bitboard::EMPTY; 2]; 2];

        for (color_idx, &king_sq) in king_start.iter().enumerate() {
            let color = if color_idx == 0 { Color::White } else { Color::Black };
            let back_rank = color.back_rank();
            for &flank in &Flank::ALL {
                let rook_sq = rook_start[color_idx][flank as usize];
                let king_dest = Square::new(back_rank, flank.king_dest_file()).unwrap();
                let rook_dest = Square::new(back_rank, flank.rook_dest_file()).unwrap();

                let king_path = file_span(back_rank, king_sq.file(), king_dest.file())
                    .with_square(king_sq)
                    .with_square(king_dest);
                castle_path[color_idx][flank as usize] = king_path;

                let rook_path = file_span(back_rank, rook_sq.file(), rook_dest.file())
                    .with_square(rook_sq)
                    .with_square(rook_dest);

                let empty = (king_path | rook_path)
                    & !Bitboard::from(king_sq)
                    & !Bitboard::from(rook_sq);
                castle_empty[color_idx][flank as usize] = empty;
            }
        }

        Self { king_start, rook_start, castle_path, castle_empty }
    }
}

/// All squares on `rank` with file in the inclusive range between `file_a` and `file_b`.
fn file_span(rank: u8, file_a: u8, file_b: u8) -> Bitboard {
    let (lo, hi) = if file_a <= file_b { (file_a, file_b) } else { (file_b, file_a) };
    let mut bb = Bitboard::EMPTY;
    for file in lo..=hi {
        bb.insert(Square::new(rank, file).unwrap());
    }
    bb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthodox_kingside_path_matches_classical_squares() {
        let setup = CastlingSetup::new(
            [Square::E1, Square::E8],
            [[Square::H1, Square::A1], [Square::H8, Square::A8]],
        );
        let expected_path = Bitboard::EMPTY
            .with_square(Square::E1)
            .with_square(Square::F1)
            .with_square(Square::G1);
        assert_eq!(setup.castle_path[0][Flank::Kingside as usize], expected_path);
        let expected_empty = Bitboard::EMPTY.with_square(Square::F1).with_square(Square::G1);
        assert_eq!(setup.castle_empty[0][Flank::Kingside as usize], expected_empty);
    }

    #[test]
    fn rights_set_clear_round_trip() {
        let mut rights = CastleRights::NONE;
        rights.set(Color::White, Flank::Kingside);
        assert!(rights.has(Color::White, Flank::Kingside));
        assert!(!rights.has(Color::White, Flank::Queenside));
        rights.clear_color(Color::White);
        assert!(!rights.has(Color::White, Flank::Kingside));
    }
}
