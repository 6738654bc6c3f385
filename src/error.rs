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

//! The error taxonomy for position intake and the perft driver.
//!
//! Every variant here is fatal: there is no partial recovery path anywhere in the core, so
//! callers are expected to print the diagnostic and exit nonzero.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
/// Failure to parse a FEN (or Shredder-FEN) string into a [`crate::Position`].
pub enum FenError {
    #[error("FEN has {found} whitespace-delimited fields, need at least 4")]
    TooFewFields { found: usize },

    #[error("FEN placement field is malformed: {reason}")]
    BadPlacement { reason: String },

    #[error("side-to-move field must be `w` or `b`, found {found:?}")]
    BadSideToMove { found: String },

    #[error("castling field has an unrecognized character {found:?}")]
    BadCastlingChar { found: char },

    #[error("castling right {flank:?} names no rook on the {side:?} side of the king")]
    NoCastlingRook { side: crate::color::Color, flank: crate::castling::Flank },

    #[error("en-passant square {found:?} is not a valid algebraic square")]
    BadEnPassant { found: String },

    #[error("position has {white_kings} white king(s) and {black_kings} black king(s), need exactly one each")]
    BadKingCount { white_kings: u32, black_kings: u32 },

    #[error("the side not to move is in check, so the position is illegal")]
    IllegalPosition,
}

#[derive(Debug, Error)]
/// Failures that can halt a perft run itself (as opposed to position intake).
pub enum PerftError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("failed to allocate a {requested_bytes}-byte perft cache")]
    CacheAllocFailed { requested_bytes: usize },

    #[error("bench suite total {actual} does not match the reference total {expected}")]
    BrokenMoveGenerator { expected: u64, actual: u64 },
}
