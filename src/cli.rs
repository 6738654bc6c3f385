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

//! Command-line surface: argument parsing lives here so [`crate::bin`]'s `main` is just wiring.

use clap::{Parser, Subcommand};

const DEFAULT_HASH_MB: usize = 16;

#[derive(Parser)]
#[command(name = "fr-perft", version, about = "A Chess960 perft engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Count leaf positions reachable from a FEN in exactly `depth` plies.
    Perft {
        fen: String,
        depth: u8,
        #[arg(default_value_t = DEFAULT_HASH_MB)]
        hash_mb: usize,
    },
    /// Run the fixed 12-position bench suite and report per-position and total node counts.
    Bench {
        #[arg(default_value_t = DEFAULT_HASH_MB)]
        hash_mb: usize,
    },
    /// Like `perft`, but report the leaf count under each individual root move.
    Split {
        fen: String,
        depth: u8,
        #[arg(default_value_t = DEFAULT_HASH_MB)]
        hash_mb: usize,
    },
    /// Report how many cache entries a given hash size would allocate, without running anything.
    Hash { mb: usize },
    /// Parse and validate a FEN, printing the resulting board and game state.
    Fen { fen: String },
}
