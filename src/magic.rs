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

//! Static attack tables: jump-piece lookups (king, knight, pawn) and magic-bitboard sliding
//! lookups (bishop, rook).
//!
//! Sliding attacks are found by the classic magic-multiplier technique: a per-square bitmask of
//! "relevant occupancy" squares, and a multiplier that hashes any occupancy subset of that mask
//! into a dense, collision-free table index. The multipliers are not baked in as constants;
//! they're found once by random search the first time a lookup table is touched, memoized behind
//! a [`once_cell::sync::Lazy`], the same way the search would run offline to produce a saved
//! table — we just never separately pin the result.
//!
//! When the `pext` feature is enabled, sliding attacks are instead served from
//! [`crate::movegen::pext`], which uses the x86_64 BMI2 `pext` instruction for indexing; the
//! relevant-occupancy masks and ray-casting helpers in this module are shared by both schemes so
//! the two stay structurally identical apart from the index function.

use crate::bitboard::Bitboard;
use crate::color::Color;
use crate::square::Square;

const fn diagonal_mask(sq: u8) -> u64 {
    const MAIN_DIAG: u64 = 0x8040_2010_0804_0201;
    let i = sq as i32;
    let main_diag = 8 * (i & 7) - (i & 56);
    let lshift = (-main_diag & (main_diag >> 31)) as u8;
    let rshift = (main_diag & (-main_diag >> 31)) as u8;
    (MAIN_DIAG >> rshift) << lshift
}

const fn anti_diagonal_mask(sq: u8) -> u64 {
    const ANTI_DIAG: u64 = 0x0102_0408_1020_4080;
    let i = sq as i32;
    let anti_diag = 56 - 8 * (i & 7) - (i & 56);
    let lshift = (-anti_diag & (anti_diag >> 31)) as u8;
    let rshift = (anti_diag & (-anti_diag >> 31)) as u8;
    (ANTI_DIAG >> rshift) << lshift
}

/// The relevant-occupancy mask for a rook on `sq`: its rank and file, excluding the edges and
/// `sq` itself (pieces on the very edge never block further sliding).
pub(crate) const fn rook_mask(sq: u8) -> u64 {
    let row_mask = 0x7E_u64 << (8 * (sq / 8));
    let col_mask = 0x0001_0101_0101_0100_u64 << (sq % 8);
    (row_mask ^ col_mask) & !(1_u64 << sq)
}

/// The relevant-occupancy mask for a bishop on `sq`: its two diagonals, excluding the board ring.
pub(crate) const fn bishop_mask(sq: u8) -> u64 {
    const RING: u64 = 0xFF81_8181_8181_81FF;
    (diagonal_mask(sq) ^ anti_diagonal_mask(sq)) & !RING
}

/// Scatter the bits of `index` into the set bits of `mask`, the inverse of a `pext` extraction.
/// Enumerates every occupancy subset relevant to a square.
pub(crate) const fn index_to_occupancy(index: usize, mask: u64) -> u64 {
    let mut result = 0u64;
    let mut remaining = mask;
    let mut i = 0;
    while remaining != 0 {
        let lsb = remaining & remaining.wrapping_neg();
        if index & (1 << i) != 0 {
            result |= lsb;
        }
        remaining &= remaining - 1;
        i += 1;
    }
    result
}

/// Cast rays from `sq` in each of the four given (rank-step, file-step) directions until blocked
/// by a piece in `occupancy` or the board edge, inclusive of the blocker.
pub(crate) const fn directional_attacks(sq: u8, dirs: [(i8, i8); 4], occupancy: u64) -> u64 {
    let mut result = 0u64;
    let mut d = 0;
    while d < 4 {
        let (dr, df) = dirs[d];
        let mut rank = (sq / 8) as i8;
        let mut file = (sq % 8) as i8;
        loop {
            rank += dr;
            file += df;
            if rank < 0 || rank > 7 || file < 0 || file > 7 {
                break;
            }
            let s = (rank * 8 + file) as u8;
            result |= 1_u64 << s;
            if occupancy & (1_u64 << s) != 0 {
                break;
            }
        }
        d += 1;
    }
    result
}

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// A resolved magic hash for one square: the relevant-occupancy mask, the multiplier, the index
/// width in bits, and the dense attack table it indexes into.
struct Magic {
    mask: u64,
    magic: u64,
    bits: u32,
    attacks: Vec<Bitboard>,
}

impl Magic {
    fn index(&self, occupancy: u64) -> usize {
        let masked = occupancy & self.mask;
        ((masked.wrapping_mul(self.magic)) >> (64 - self.bits)) as usize
    }

    fn attacks(&self, occupancy: u64) -> Bitboard {
        self.attacks[self.index(occupancy)]
    }
}

/// Low-bit-biased random candidate, matching the classic heuristic that magics with fewer set
/// bits find collision-free hashes faster.
fn random_sparse_u64(rng: &mut fastrand::Rng) -> u64 {
    rng.u64(..) & rng.u64(..) & rng.u64(..)
}

const MAX_MAGIC_TRIES: u32 = 1_000_000;

/// Search for a magic multiplier that perfectly hashes every occupancy subset of `mask` (there
/// are `2^mask.count_ones()` of them) into a table of `2^bits` entries with no collisions between
/// subsets that produce different attack sets.
fn find_magic(sq: u8, mask: u64, dirs: [(i8, i8); 4], seed: u64) -> Magic {
    let bits = mask.count_ones();
    let subset_count = 1usize << bits;

    let mut occupancies = Vec::with_capacity(subset_count);
    let mut attacks_for = Vec::with_capacity(subset_count);
    for i in 0..subset_count {
        let occ = index_to_occupancy(i, mask);
        occupancies.push(occ);
        attacks_for.push(Bitboard::new(directional_attacks(sq, dirs, occ)));
    }

    let mut rng = fastrand::Rng::with_seed(seed ^ u64::from(sq));
    for _ in 0..MAX_MAGIC_TRIES {
        let magic = random_sparse_u64(&mut rng);
        // A magic that loses too many high bits of the mask to the multiply can't spread subsets
        // across the whole table; this mirrors the sparseness check the brute-force search uses.
        if (mask.wrapping_mul(magic) >> 56).count_ones() < 6 {
            continue;
        }

        let mut table = vec![None; subset_count];
        let mut collided = false;
        for i in 0..subset_count {
            let key = ((occupancies[i].wrapping_mul(magic)) >> (64 - bits)) as usize;
            match table[key] {
                None => table[key] = Some(attacks_for[i]),
                Some(existing) if existing == attacks_for[i] => {}
                Some(_) => {
                    collided = true;
                    break;
                }
            }
        }
        if !collided {
            let attacks = table.into_iter().map(|a| a.unwrap_or(Bitboard::EMPTY)).collect();
            return Magic { mask, magic, bits, attacks };
        }
    }
    unreachable!("no magic multiplier found for square {sq} after {MAX_MAGIC_TRIES} tries");
}

fn build_magics(is_rook: bool) -> Vec<Magic> {
    let dirs = if is_rook { ROOK_DIRS } else { BISHOP_DIRS };
    let seed = if is_rook { 0x526F_6F6B_4D61_6769 } else { 0x4269_7368_6F70_4D61 };
    (0..64u8)
        .map(|sq| {
            let mask = if is_rook { rook_mask(sq) } else { bishop_mask(sq) };
            find_magic(sq, mask, dirs, seed)
        })
        .collect()
}

static ROOK_MAGICS: once_cell::sync::Lazy<Vec<Magic>> = once_cell::sync::Lazy::new(|| build_magics(true));
static BISHOP_MAGICS: once_cell::sync::Lazy<Vec<Magic>> = once_cell::sync::Lazy::new(|| build_magics(false));

#[cfg(not(feature = "pext"))]
#[must_use]
pub fn rook_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    ROOK_MAGICS[sq as usize].attacks(occupancy.as_u64())
}

#[cfg(not(feature = "pext"))]
#[must_use]
pub fn bishop_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    BISHOP_MAGICS[sq as usize].attacks(occupancy.as_u64())
}

#[cfg(feature = "pext")]
pub use crate::movegen::pext::{bishop_moves as bishop_attacks, rook_moves as rook_attacks};

/// Queen attacks are simply the union of rook and bishop attacks from the same square.
#[must_use]
pub fn queen_attacks(occupancy: Bitboard, sq: Square) -> Bitboard {
    rook_attacks(occupancy, sq) | bishop_attacks(occupancy, sq)
}

const fn jump_attacks(steps: [(i8, i8); 8]) -> [u64; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut result = 0u64;
        let mut i = 0;
        while i < 8 {
            let (dr, df) = steps[i];
            let r = rank + dr;
            let f = file + df;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                result |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = result;
        sq += 1;
    }
    table
}

const KING_STEPS: [(i8, i8); 8] =
    [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];
const KNIGHT_STEPS: [(i8, i8); 8] =
    [(2, 1), (2, -1), (1, 2), (-1, 2), (-2, 1), (-2, -1), (1, -2), (-1, -2)];

const KING_ATTACKS_TABLE: [u64; 64] = jump_attacks(KING_STEPS);
const KNIGHT_ATTACKS_TABLE: [u64; 64] = jump_attacks(KNIGHT_STEPS);

#[must_use]
pub fn king_attacks(sq: Square) -> Bitboard {
    Bitboard::new(KING_ATTACKS_TABLE[sq as usize])
}

#[must_use]
pub fn knight_attacks(sq: Square) -> Bitboard {
    Bitboard::new(KNIGHT_ATTACKS_TABLE[sq as usize])
}

const fn pawn_attack_table(white: bool) -> [u64; 64] {
    let dirs = if white { [(1, 1), (1, -1)] } else { [(-1, 1), (-1, -1)] };
    let mut table = [0u64; 64];
    let mut sq = 0u8;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut result = 0u64;
        let mut i = 0;
        while i < 2 {
            let (dr, df) = dirs[i];
            let r = rank + dr;
            let f = file + df;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                result |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = result;
        sq += 1;
    }
    table
}

const WHITE_PAWN_ATTACKS: [u64; 64] = pawn_attack_table(true);
const BLACK_PAWN_ATTACKS: [u64; 64] = pawn_attack_table(false);

/// The squares a pawn of `color` standing on `sq` would attack diagonally.
#[must_use]
pub fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    match color {
        Color::White => Bitboard::new(WHITE_PAWN_ATTACKS[sq as usize]),
        Color::Black => Bitboard::new(BLACK_PAWN_ATTACKS[sq as usize]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_mask_matches_known_values() {
        assert_eq!(rook_mask(Square::A1 as u8), 0x0001_0101_0101_017E);
        assert_eq!(rook_mask(Square::E1 as u8), 0x0010_1010_1010_106E);
    }

    #[test]
    fn bishop_mask_matches_known_values() {
        assert_eq!(bishop_mask(Square::A1 as u8), 0x0040_2010_0804_0200);
    }

    #[test]
    fn rook_on_empty_board_from_a1_sees_whole_edge() {
        let attacks = rook_attacks(Bitboard::EMPTY, Square::A1);
        assert!(attacks.contains(Square::A8));
        assert!(attacks.contains(Square::H1));
        assert!(!attacks.contains(Square::B2));
    }

    #[test]
    fn bishop_blocked_by_own_occupancy_stops_at_blocker() {
        let occ = Bitboard::EMPTY.with_square(Square::B2);
        let attacks = bishop_attacks(occ, Square::A1);
        assert_eq!(attacks, Bitboard::EMPTY.with_square(Square::B2));
    }

    #[test]
    fn rook_attacks_every_square_agree_with_ray_cast() {
        for sq in 0u8..64 {
            let square = Square::try_from(sq).unwrap();
            let occ = Bitboard::new(0x0000_1002_0000_0400);
            let expected = Bitboard::new(directional_attacks(sq, ROOK_DIRS, occ.as_u64()));
            assert_eq!(rook_attacks(occ, square), expected, "square {sq}");
        }
    }

    #[test]
    fn bishop_attacks_every_square_agree_with_ray_cast() {
        for sq in 0u8..64 {
            let square = Square::try_from(sq).unwrap();
            let occ = Bitboard::new(0x0040_0010_0000_2000);
            let expected = Bitboard::new(directional_attacks(sq, BISHOP_DIRS, occ.as_u64()));
            assert_eq!(bishop_attacks(occ, square), expected, "square {sq}");
        }
    }

    #[test]
    fn knight_attacks_from_corner_has_two_targets() {
        assert_eq!(knight_attacks(Square::A1).len(), 2);
    }

    #[test]
    fn pawn_attacks_are_mirrored_by_color() {
        let w = pawn_attacks(Color::White, Square::E4);
        let b = pawn_attacks(Color::Black, Square::E5);
        assert!(w.contains(Square::D5));
        assert!(w.contains(Square::F5));
        assert!(b.contains(Square::D4));
        assert!(b.contains(Square::F4));
    }
}
