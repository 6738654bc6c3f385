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

//! Zobrist keys for incremental position hashing.
//!
//! Every key table is generated once, from a fixed seed, the first time it's touched; the seed
//! (not the resulting numbers) is what's pinned, so the tables never need to be checked in as a
//! giant literal block the way a from-scratch engine normally would.

use crate::castling::CastleRights;
use crate::color::Color;
use crate::piece::Piece;
use crate::square::Square;
use once_cell::sync::Lazy;

const SEED: u64 = 0x5A8C_3F19_D27B_0E61;

struct Tables {
    /// `piece[color][piece_kind][square]`
    piece: [[[u64; 64]; Piece::NUM]; 2],
    /// Indexed by en-passant file (0-7); file 8 is reserved for "no en-passant".
    en_passant: [u64; 9],
    /// Indexed by the raw [`CastleRights`] bitmask, 0-15.
    castling: [u64; 16],
    black_to_move: u64,
}

static TABLES: Lazy<Tables> = Lazy::new(|| {
    let mut rng = fastrand::Rng::with_seed(SEED);
    let mut piece = [[[0u64; 64]; Piece::NUM]; 2];
    for color_table in &mut piece {
        for piece_table in color_table.iter_mut() {
            for key in piece_table.iter_mut() {
                *key = rng.u64(..);
            }
        }
    }
    let mut en_passant = [0u64; 9];
    for key in &mut en_passant[..8] {
        *key = rng.u64(..);
    }
    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.u64(..);
    }
    Tables { piece, en_passant, castling, black_to_move: rng.u64(..) }
});

/// The key to XOR in or out for `piece` of `color` standing on `sq`.
#[must_use]
pub fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    TABLES.piece[color as usize][piece as usize - 1][sq as usize]
}

/// The key for the en-passant file, or the identity (0) if there is no en-passant square.
#[must_use]
pub fn en_passant_key(ep_square: Option<Square>) -> u64 {
    match ep_square {
        Some(sq) => TABLES.en_passant[sq.file() as usize],
        None => 0,
    }
}

/// The key for a full castling-rights bitmask.
#[must_use]
pub fn castling_key(rights: CastleRights) -> u64 {
    TABLES.castling[rights.0 as usize]
}

/// The key to XOR in when it is Black's turn to move (0 when White is to move, so the two sides
/// of a position never collide on parity alone).
#[must_use]
pub fn side_to_move_key(side: Color) -> u64 {
    match side {
        Color::White => 0,
        Color::Black => TABLES.black_to_move,
    }
}

/// The key to XOR in whenever the side to move flips, regardless of direction: since White
/// contributes 0 and Black contributes a fixed key, XORing this same value toggles between them.
#[must_use]
pub fn side_to_move_toggle() -> u64 {
    TABLES.black_to_move
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_keys_are_pairwise_distinct_on_one_square() {
        let mut seen = Vec::new();
        for &piece in &Piece::ALL {
            let key = piece_key(Color::White, piece, Square::E4);
            assert!(!seen.contains(&key), "collision for {piece:?}");
            seen.push(key);
        }
    }

    #[test]
    fn no_en_passant_contributes_zero() {
        assert_eq!(en_passant_key(None), 0);
        assert_ne!(en_passant_key(Some(Square::E3)), 0);
    }

    #[test]
    fn side_to_move_key_differs_between_colors() {
        assert_ne!(side_to_move_key(Color::White), side_to_move_key(Color::Black));
    }

    #[test]
    fn tables_are_deterministic_across_calls() {
        let a = piece_key(Color::Black, Piece::Queen, Square::D4);
        let b = piece_key(Color::Black, Piece::Queen, Square::D4);
        assert_eq!(a, b);
    }
}
