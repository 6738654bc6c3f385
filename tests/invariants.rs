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

//! Property-based tests: random legal-move walks from a handful of starting positions, checking
//! that the invariants the rest of the crate relies on survive an arbitrary sequence of moves
//! rather than just the specific positions the unit tests happen to construct.

use fr_perft::movegen::{apply_move, legal_moves};
use fr_perft::{Color, Piece, Position};
use proptest::prelude::*;

const ROOTS: [&str; 3] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 0 1",
];

/// Walk `picks.len()` plies deep from `root`, choosing the `i`th legal move by `picks[i] %
/// moves.len()`, stopping early if a position has no legal moves. Returns every position visited,
/// including the root.
fn walk(root: &str, picks: &[u8]) -> Vec<Position> {
    let mut pos = Position::from_fen(root).expect("root FENs are fixed and must parse");
    let mut visited = vec![pos.clone()];
    for &pick in picks {
        let moves = legal_moves(&pos);
        if moves.is_empty() {
            break;
        }
        let mv = moves[pick as usize % moves.len()];
        pos = apply_move(&pos, mv);
        visited.push(pos.clone());
    }
    visited
}

/// Every square's mailbox entry agrees with exactly the bitboard it claims to belong to, and no
/// other bitboard of either color has that square set.
fn mailbox_matches_bitboards(pos: &Position) -> bool {
    for rank in 0..8u8 {
        for file in 0..8u8 {
            let sq = fr_perft::Square::new(rank, file).unwrap();
            let claimed = pos.piece_at(sq);
            for &color in &[Color::White, Color::Black] {
                for &piece in &Piece::ALL {
                    let bit_set = pos.piece_occupancy(color, piece).contains(sq);
                    let should_be_set = claimed == Some((color, piece));
                    if bit_set != should_be_set {
                        return false;
                    }
                }
            }
        }
    }
    true
}

fn castling_rights_point_at_origin_squares(pos: &Position) -> bool {
    for &color in &[Color::White, Color::Black] {
        for &flank in &fr_perft::castling::Flank::ALL {
            if !pos.castle_rights().has(color, flank) {
                continue;
            }
            let king_sq = pos.castling().king_start[color as usize];
            if pos.king_square(color) != king_sq {
                return false;
            }
            let rook_sq = pos.castling().rook_start[color as usize][flank as usize];
            if pos.piece_at(rook_sq) != Some((color, Piece::Rook)) {
                return false;
            }
        }
    }
    true
}

fn en_passant_square_on_correct_rank(pos: &Position) -> bool {
    match pos.ep_square() {
        // The pawn that just double-pushed belongs to whichever color is *not* now to move.
        None => true,
        Some(sq) => sq.rank() == (!pos.side_to_move()).ep_rank(),
    }
}

/// Recompute a position's Zobrist hash from scratch via the public `zobrist` functions, entirely
/// independent of `Position`'s own (private) incremental-maintenance path.
fn from_scratch_hash(pos: &Position) -> u64 {
    let mut hash = 0u64;
    for rank in 0..8u8 {
        for file in 0..8u8 {
            let sq = fr_perft::Square::new(rank, file).unwrap();
            if let Some((color, piece)) = pos.piece_at(sq) {
                hash ^= fr_perft::zobrist::piece_key(color, piece, sq);
            }
        }
    }
    hash ^= fr_perft::zobrist::en_passant_key(pos.ep_square());
    hash ^= fr_perft::zobrist::castling_key(pos.castle_rights());
    hash ^= fr_perft::zobrist::side_to_move_key(pos.side_to_move());
    hash
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of legal moves from any of the fixed roots, every reachable position
    /// still has exactly one king per color, a mailbox consistent with its bitboards, castling
    /// rights that still point at the pieces that earned them, an en-passant square (if any) on
    /// the rank the side to move's pawns pass over, and an incrementally maintained hash that
    /// agrees with a from-scratch recomputation over the same fields.
    #[test]
    fn legal_walks_preserve_position_invariants(
        root_idx in 0usize..ROOTS.len(),
        picks in prop::collection::vec(any::<u8>(), 0..12),
    ) {
        let visited = walk(ROOTS[root_idx], &picks);
        for pos in &visited {
            prop_assert_eq!(pos.piece_occupancy(Color::White, Piece::King).len(), 1);
            prop_assert_eq!(pos.piece_occupancy(Color::Black, Piece::King).len(), 1);
            prop_assert!(mailbox_matches_bitboards(pos));
            prop_assert!(castling_rights_point_at_origin_squares(pos));
            prop_assert!(en_passant_square_on_correct_rank(pos));
            prop_assert!(!pos.in_check(!pos.side_to_move()));
            prop_assert_eq!(pos.hash(), from_scratch_hash(pos));
        }
    }

    /// Two walks that pick the exact same moves from the exact same root must end in positions
    /// with identical hashes, since the hash is a pure function of the fields it covers.
    #[test]
    fn identical_walks_produce_identical_hashes(
        root_idx in 0usize..ROOTS.len(),
        picks in prop::collection::vec(any::<u8>(), 0..12),
    ) {
        let a = walk(ROOTS[root_idx], &picks);
        let b = walk(ROOTS[root_idx], &picks);
        prop_assert_eq!(a.last().unwrap().hash(), b.last().unwrap().hash());
    }
}
