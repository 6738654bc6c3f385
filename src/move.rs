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

//! A move, packed into 16 bits: 6 bits for the origin square, 6 for the destination, 2 for a
//! special-move flag, and 2 for the promotion piece (meaningful only when the flag says so).
//!
//! Castling is represented king-to-rook, per the Chess960 (and Shredder-FEN) convention: a
//! castling move's destination square is the square of the rook it castles with, not the king's
//! final square, so a move generator never needs to special-case "is the rook further than two
//! squares away" the way king-destination notation would force it to.

use crate::piece::Piece;
use crate::square::Square;
use std::fmt::{Display, Formatter};

const FLAG_MASK: u16 = 0xC000;
const PROMOTE_FLAG: u16 = 0x4000;
const CASTLE_FLAG: u16 = 0x8000;
const EN_PASSANT_FLAG: u16 = 0xC000;
const PROMOTE_PIECE_MASK: u16 = 0x3000;
const PROMOTE_PIECE_SHIFT: u16 = 12;
const FROM_MASK: u16 = 0x0FC0;
const FROM_SHIFT: u16 = 6;
const TO_MASK: u16 = 0x003F;

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
/// A single chess move, independent of the position it's played in.
pub struct Move(u16);

impl Move {
    /// An ordinary move (including double pawn pushes) with no special flag.
    #[must_use]
    pub fn normal(from: Square, to: Square) -> Move {
        Move(((from as u16) << FROM_SHIFT) | (to as u16))
    }

    /// A pawn promoting on arrival at `to`.
    #[must_use]
    pub fn promotion(from: Square, to: Square, promote_to: Piece) -> Move {
        let piece_bits = match promote_to {
            Piece::Knight => 0,
            Piece::Bishop => 1,
            Piece::Rook => 2,
            Piece::Queen => 3,
            _ => unreachable!("pawns only promote to knight, bishop, rook, or queen"),
        };
        Move(
            PROMOTE_FLAG
                | (piece_bits << PROMOTE_PIECE_SHIFT)
                | ((from as u16) << FROM_SHIFT)
                | (to as u16),
        )
    }

    /// A castling move. `to` is the square of the rook being castled with, not the king's final
    /// square.
    #[must_use]
    pub fn castle(king_from: Square, rook_from: Square) -> Move {
        Move(CASTLE_FLAG | ((king_from as u16) << FROM_SHIFT) | (rook_from as u16))
    }

    /// An en passant capture.
    #[must_use]
    pub fn en_passant(from: Square, to: Square) -> Move {
        Move(EN_PASSANT_FLAG | ((from as u16) << FROM_SHIFT) | (to as u16))
    }

    #[must_use]
    pub fn from_square(self) -> Square {
        Square::try_from(((self.0 & FROM_MASK) >> FROM_SHIFT) as u8).unwrap()
    }

    #[must_use]
    pub fn to_square(self) -> Square {
        Square::try_from((self.0 & TO_MASK) as u8).unwrap()
    }

    #[must_use]
    pub fn is_promotion(self) -> bool {
        self.0 & FLAG_MASK == PROMOTE_FLAG
    }

    #[must_use]
    pub fn is_castle(self) -> bool {
        self.0 & FLAG_MASK == CASTLE_FLAG
    }

    #[must_use]
    pub fn is_en_passant(self) -> bool {
        self.0 & FLAG_MASK == EN_PASSANT_FLAG
    }

    /// The piece a promotion move promotes to. Only meaningful when [`Move::is_promotion`].
    #[must_use]
    pub fn promote_to(self) -> Piece {
        match (self.0 & PROMOTE_PIECE_MASK) >> PROMOTE_PIECE_SHIFT {
            0 => Piece::Knight,
            1 => Piece::Bishop,
            2 => Piece::Rook,
            3 => Piece::Queen,
            _ => unreachable!(),
        }
    }

    /// Render in the coordinate form used by the perft driver's divide output: origin square,
    /// destination square, and (for promotions) a lowercase promotion letter. For castling moves
    /// the "destination" rendered is the square the king actually lands on (file 6 or file 2,
    /// whichever side the packed rook square lies on), not the rook square packed internally —
    /// this matches how most perft reference tools report Chess960 castles.
    #[must_use]
    pub fn to_coordinate(self) -> String {
        let from = self.from_square();
        if self.is_castle() {
            let rook_file = self.to_square().file();
            let dest_file = if rook_file > from.file() { 6 } else { 2 };
            let dest = Square::new(from.rank(), dest_file).unwrap();
            return format!("{from}{dest}");
        }
        let to = self.to_square();
        if self.is_promotion() {
            let promo_char = match self.promote_to() {
                Piece::Knight => 'n',
                Piece::Bishop => 'b',
                Piece::Rook => 'r',
                Piece::Queen => 'q',
                _ => unreachable!(),
            };
            format!("{from}{to}{promo_char}")
        } else {
            format!("{from}{to}")
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}

impl std::fmt::Debug for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Move({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_move_round_trips_squares() {
        let m = Move::normal(Square::E2, Square::E4);
        assert_eq!(m.from_square(), Square::E2);
        assert_eq!(m.to_square(), Square::E4);
        assert!(!m.is_promotion());
        assert!(!m.is_castle());
        assert!(!m.is_en_passant());
    }

    #[test]
    fn promotion_round_trips_piece() {
        for &piece in &[Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight] {
            let m = Move::promotion(Square::A7, Square::A8, piece);
            assert!(m.is_promotion());
            assert_eq!(m.promote_to(), piece);
        }
    }

    #[test]
    fn coordinate_form_has_promotion_suffix() {
        let m = Move::promotion(Square::A7, Square::A8, Piece::Queen);
        assert_eq!(m.to_coordinate(), "a7a8q");
    }

    #[test]
    fn castle_coordinate_uses_king_destination_file() {
        let m = Move::castle(Square::E1, Square::H1);
        assert_eq!(m.to_coordinate(), "e1g1");
    }

    #[test]
    fn queenside_castle_coordinate_uses_c_file() {
        let m = Move::castle(Square::E1, Square::A1);
        assert_eq!(m.to_coordinate(), "e1c1");
    }

    #[test]
    fn en_passant_is_distinguishable_from_normal_capture() {
        let m = Move::en_passant(Square::D5, Square::E6);
        assert!(m.is_en_passant());
        assert!(!m.is_promotion());
    }
}
