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

//! Sliding attacks indexed by the BMI2 `pext` instruction instead of a magic multiply.
//!
//! `pext` extracts exactly the occupancy bits a square cares about into a dense integer with no
//! search needed to find a collision-free hash, so this table is built entirely at compile time,
//! unlike [`crate::magic`]'s randomized search. It costs more memory (one table slot per relevant
//! occupancy subset with no multiplicative sharing) and only pays off on hardware that actually
//! has the instruction, which is why it's an opt-in feature rather than the default.

use crate::bitboard::Bitboard;
use crate::magic::{bishop_mask, directional_attacks, index_to_occupancy, rook_mask};
use crate::square::Square;
use std::mem::{transmute, MaybeUninit};

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const fn table_size(is_rook: bool) -> usize {
    let mut total = 0;
    let mut sq = 0u8;
    while sq < 64 {
        let mask = if is_rook { rook_mask(sq) } else { bishop_mask(sq) };
        total += 1usize << mask.count_ones();
        sq += 1;
    }
    total
}

const fn construct_table<const N: usize>(is_rook: bool) -> [u64; N] {
    let mut table = [0u64; N];
    let mut offset = 0usize;
    let mut sq = 0u8;
    while sq < 64 {
        let mask = if is_rook { rook_mask(sq) } else { bishop_mask(sq) };
        let dirs = if is_rook { ROOK_DIRS } else { BISHOP_DIRS };
        let n = 1usize << mask.count_ones();
        let mut j = 0usize;
        while j < n {
            let occ = index_to_occupancy(j, mask);
            table[offset + j] = directional_attacks(sq, dirs, occ);
            j += 1;
        }
        offset += n;
        sq += 1;
    }
    table
}

const ROOK_TABLE_SIZE: usize = table_size(true);
const BISHOP_TABLE_SIZE: usize = table_size(false);
const ROOK_TABLE: [u64; ROOK_TABLE_SIZE] = construct_table(true);
const BISHOP_TABLE: [u64; BISHOP_TABLE_SIZE] = construct_table(false);

struct PextLookup {
    table: &'static [u64],
    mask: u64,
}

const fn construct_lookups(attacks_table: &'static [u64], is_rook: bool) -> [PextLookup; 64] {
    unsafe {
        let mut lookups: [MaybeUninit<PextLookup>; 64] = MaybeUninit::uninit().assume_init();
        let mut remaining = attacks_table;
        let mut sq = 0u8;
        while sq < 64 {
            let mask = if is_rook { rook_mask(sq) } else { bishop_mask(sq) };
            let (this_slice, rest) = remaining.split_at(1usize << mask.count_ones());
            lookups[sq as usize] = MaybeUninit::new(PextLookup { table: this_slice, mask });
            remaining = rest;
            sq += 1;
        }
        transmute(lookups)
    }
}

static ROOK_LOOKUPS: [PextLookup; 64] = construct_lookups(&ROOK_TABLE, true);
static BISHOP_LOOKUPS: [PextLookup; 64] = construct_lookups(&BISHOP_TABLE, false);

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi2")]
unsafe fn pext(occupancy: u64, mask: u64) -> u64 {
    std::arch::x86_64::_pext_u64(occupancy, mask)
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn pext(occupancy: u64, mask: u64) -> u64 {
    // Software fallback so the `pext` feature still builds (slowly) off x86_64; correctness
    // matches the hardware instruction's documented semantics exactly.
    let mut result = 0u64;
    let mut remaining = mask;
    let mut bit = 0u32;
    while remaining != 0 {
        let lsb = remaining & remaining.wrapping_neg();
        if occupancy & lsb != 0 {
            result |= 1u64 << bit;
        }
        remaining &= remaining - 1;
        bit += 1;
    }
    result
}

fn lookup(occupancy: u64, sq: u8, lookups: &'static [PextLookup; 64]) -> Bitboard {
    let entry = &lookups[sq as usize];
    let key = unsafe { pext(occupancy & entry.mask, entry.mask) } as usize;
    Bitboard::new(entry.table[key])
}

#[must_use]
pub fn rook_moves(occupancy: Bitboard, sq: Square) -> Bitboard {
    lookup(occupancy.as_u64(), sq as u8, &ROOK_LOOKUPS)
}

#[must_use]
pub fn bishop_moves(occupancy: Bitboard, sq: Square) -> Bitboard {
    lookup(occupancy.as_u64(), sq as u8, &BISHOP_LOOKUPS)
}
