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

//! A direct-mapped transposition cache for perft node counts.
//!
//! Unlike a search transposition table, entries here never need "best move" or bound-type
//! bookkeeping: a perft subtree's node count at a given depth is exact and position-independent
//! of how it was reached, so the only thing worth memoizing is `(hash, depth) -> count`.

use crate::error::PerftError;

#[derive(Clone, Copy)]
struct Entry {
    hash: u64,
    depth: u8,
    count: u64,
}

const EMPTY: Entry = Entry { hash: 0, depth: 0, count: 0 };

const MIN_BYTES: usize = 1 << 20; // 1 MiB
const MAX_BYTES: usize = 1 << 50; // 1 PiB

/// The largest power of two not exceeding `n` (`n` must be nonzero).
fn prev_power_of_two(n: usize) -> usize {
    1usize << (usize::BITS - 1 - n.leading_zeros())
}

/// A fixed-size, direct-mapped cache of perft subtree counts.
///
/// Slots are indexed by the low bits of the position's Zobrist hash. A collision between two
/// different positions simply evicts one of them per the replacement rule below; this never
/// produces an incorrect node count, only a cache miss that falls back to descending fully.
pub struct PerftCache {
    entries: Vec<Entry>,
    index_mask: u64,
}

impl PerftCache {
    /// Build a cache sized to roughly `requested_mb` megabytes, clamped to `[1 MiB, 1 PiB]` and
    /// rounded down to the nearest power of two number of entries.
    pub fn with_size_mb(requested_mb: usize) -> Result<PerftCache, PerftError> {
        let requested_bytes = requested_mb.saturating_mul(1 << 20);
        let clamped = requested_bytes.clamp(MIN_BYTES, MAX_BYTES);
        let entry_size = std::mem::size_of::<Entry>();
        let num_entries = prev_power_of_two((clamped / entry_size).max(1));

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(num_entries)
            .map_err(|_| PerftError::CacheAllocFailed { requested_bytes: clamped })?;
        entries.resize(num_entries, EMPTY);

        Ok(PerftCache { entries, index_mask: (num_entries as u64) - 1 })
    }

    fn index(&self, hash: u64) -> usize {
        (hash & self.index_mask) as usize
    }

    /// The cached node count for `(hash, depth)`, if an exact match occupies that slot.
    #[must_use]
    pub fn get(&self, hash: u64, depth: u8) -> Option<u64> {
        let entry = &self.entries[self.index(hash)];
        if entry.count != 0 && entry.hash == hash && entry.depth == depth {
            Some(entry.count)
        } else {
            None
        }
    }

    /// Record `count` for `(hash, depth)`. Never stores a zero count (a position with zero
    /// children at depth 1 is represented by simply never retrieving a hit, not by caching 0) and
    /// never called for `depth == 0`, since bulk-counting returns leaf counts directly without a
    /// recursive call to memoize.
    ///
    /// An existing entry in the slot is only overwritten unless it has the same key and a
    /// strictly greater stored node count than what's being written now — a greater count implies
    /// a deeper subtree's result, which is more valuable than what this call is about to store.
    pub fn insert(&mut self, hash: u64, depth: u8, count: u64) {
        debug_assert!(depth >= 1, "perft cache must not memoize depth-0 leaves");
        if count == 0 {
            return;
        }
        let idx = self.index(hash);
        let slot = &mut self.entries[idx];
        if !(slot.count != 0 && slot.hash == hash && slot.count > count) {
            *slot = Entry { hash, depth, count };
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}
