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

use clap::Parser;
use fr_perft::cli::{Cli, Command};
use fr_perft::{bench, cache::PerftCache, error::PerftError, movegen, perft, position::Position};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), PerftError> {
    match command {
        Command::Perft { fen, depth, hash_mb } => {
            let pos = Position::from_fen(&fen)?;
            let mut cache = PerftCache::with_size_mb(hash_mb)?;
            let start = std::time::Instant::now();
            let count = perft::perft(&pos, depth, Some(&mut cache));
            let elapsed = start.elapsed();
            info!(depth, hash_mb, nodes = count, ?elapsed, "perft complete");
            println!("{count}");
        }
        Command::Bench { hash_mb } => {
            let mut cache = PerftCache::with_size_mb(hash_mb)?;
            let start = std::time::Instant::now();
            let report = bench::run_bench(Some(&mut cache));
            let elapsed = start.elapsed();
            if report.total != bench::REFERENCE_TOTAL {
                return Err(PerftError::BrokenMoveGenerator {
                    expected: bench::REFERENCE_TOTAL,
                    actual: report.total,
                });
            }
            for &(name, count) in &report.per_position {
                println!("{name}: {count}");
            }
            println!("total: {}", report.total);
            let nps = report.total as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            info!(total = report.total, ?elapsed, nps, "bench complete");
        }
        Command::Split { fen, depth, hash_mb } => {
            let pos = Position::from_fen(&fen)?;
            let mut cache = PerftCache::with_size_mb(hash_mb)?;
            let divided = perft::divide(&pos, depth, Some(&mut cache));
            let mut total = 0u64;
            for (mv, count) in &divided {
                println!("{}: {count}", mv.to_coordinate());
                total += count;
            }
            println!("total: {total}");
        }
        Command::Hash { mb } => {
            let cache = PerftCache::with_size_mb(mb)?;
            println!("{} entries", cache.capacity());
        }
        Command::Fen { fen } => {
            let pos = Position::from_fen(&fen)?;
            println!("{pos}");
            println!("legal moves: {}", movegen::legal_moves(&pos).len());
        }
    }
    Ok(())
}
