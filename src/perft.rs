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

//! The perft driver itself: recursive leaf counting with a bulk-counting optimization at the last
//! ply, and an optional transposition cache for the rest of the tree.

use crate::cache::PerftCache;
use crate::movegen::{apply_move, legal_moves};
use crate::position::Position;
use crate::r#move::Move;

/// Count the number of leaf positions reachable from `pos` in exactly `depth` plies.
///
/// At `depth == 1`, the count of legal moves *is* the leaf count, so the last ply is never
/// actually descended into — this is the "bulk counting" every serious perft tool uses, since
/// generating and discarding 20 or so single-ply child positions only to count them one at a time
/// wastes most of a perft run's time at the bottom of the tree, where the vast majority of nodes
/// live.
pub fn perft(pos: &Position, depth: u8, cache: Option<&mut PerftCache>) -> u64 {
    perft_inner(pos, depth, cache)
}

fn perft_inner(pos: &Position, depth: u8, mut cache: Option<&mut PerftCache>) -> u64 {
    if depth == 0 {
        return 1;
    }
    if let Some(c) = cache.as_deref() {
        if let Some(count) = c.get(pos.hash(), depth) {
            return count;
        }
    }

    let moves = legal_moves(pos);
    if depth == 1 {
        return moves.len() as u64;
    }

    let count: u64 = moves
        .iter()
        .map(|&m| {
            let child = apply_move(pos, m);
            perft_inner(&child, depth - 1, cache.as_deref_mut())
        })
        .sum();

    if let Some(c) = cache.as_deref_mut() {
        c.insert(pos.hash(), depth, count);
    }
    count
}

/// Per-root-move leaf counts ("divide"): for each legal move from `pos`, how many leaves at
/// `depth` plies lie beneath it. Useful for bisecting a perft discrepancy against a reference
/// engine one ply at a time.
#[must_use]
pub fn divide(pos: &Position, depth: u8, mut cache: Option<&mut PerftCache>) -> Vec<(Move, u64)> {
    assert!(depth >= 1, "divide needs at least one ply to divide over");
    legal_moves(pos)
        .into_iter()
        .map(|m| {
            let child = apply_move(pos, m);
            let count = perft_inner(&child, depth - 1, cache.as_deref_mut());
            (m, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const ENDGAME_FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";

    #[test]
    fn start_position_matches_known_counts_through_depth_three() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(perft(&pos, 1, None), 20);
        assert_eq!(perft(&pos, 2, None), 400);
        assert_eq!(perft(&pos, 3, None), 8902);
    }

    #[test]
    fn kiwipete_matches_known_counts_through_depth_two() {
        let pos = Position::from_fen(KIWIPETE_FEN).unwrap();
        assert_eq!(perft(&pos, 1, None), 48);
        assert_eq!(perft(&pos, 2, None), 2039);
    }

    #[test]
    fn endgame_position_matches_known_counts_through_depth_three() {
        let pos = Position::from_fen(ENDGAME_FEN).unwrap();
        assert_eq!(perft(&pos, 1, None), 14);
        assert_eq!(perft(&pos, 2, None), 191);
        assert_eq!(perft(&pos, 3, None), 2812);
    }

    #[test]
    fn cached_and_uncached_runs_agree() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let mut cache = PerftCache::with_size_mb(1).unwrap();
        assert_eq!(perft(&pos, 3, Some(&mut cache)), perft(&pos, 3, None));
    }

    #[test]
    fn divide_sums_to_the_whole_perft_count() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let parts = divide(&pos, 3, None);
        let total: u64 = parts.iter().map(|&(_, n)| n).sum();
        assert_eq!(total, perft(&pos, 3, None));
        assert_eq!(parts.len(), 20);
    }
}
