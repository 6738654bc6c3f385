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

//! Legal move generation and copy-make move application.
//!
//! Positions are never mutated in place and undone; [`apply_move`] always returns a fresh child,
//! which keeps the generator itself simple at the cost of a clone per move. For a perft driver,
//! where the search tree is regenerated from a cache far more often than it's walked node by
//! node, that trade is the right one: it also means a position can be soundly reused after
//! generating moves from it, which a mutate/undo generator can't offer without extra bookkeeping.

#[cfg(feature = "pext")]
pub mod pext;

use crate::bitboard::Bitboard;
use crate::castling::Flank;
use crate::color::Color;
use crate::magic;
use crate::piece::Piece;
use crate::position::Position;
use crate::r#move::Move;
use crate::square::Square;
use crate::zobrist;

/// The widest legal move count ever observed from a reachable chess position, with margin; used
/// only to pre-size the move buffer.
pub const MAX_LEGAL_MOVES: usize = 218;

fn sign(color: Color) -> i8 {
    if color == Color::White {
        1
    } else {
        -1
    }
}

/// Every pseudo-legal move from `pos`: obeys piece movement rules and castling preconditions, but
/// may leave the mover's own king in check.
fn pseudo_legal_moves(pos: &Position, out: &mut Vec<Move>) {
    let us = pos.side_to_move();
    let them = !us;
    let occ = pos.occupancy();
    let own = pos.color_occupancy(us);
    let enemy = pos.color_occupancy(them);

    generate_pawn_moves(pos, us, occ, enemy, out);

    for sq in pos.piece_occupancy(us, Piece::Knight).as_iter() {
        for to in (magic::knight_attacks(sq) & !own).as_iter() {
            out.push(Move::normal(sq, to));
        }
    }
    for sq in pos.piece_occupancy(us, Piece::Bishop).as_iter() {
        for to in (magic::bishop_attacks(occ, sq) & !own).as_iter() {
            out.push(Move::normal(sq, to));
        }
    }
    for sq in pos.piece_occupancy(us, Piece::Rook).as_iter() {
        for to in (magic::rook_attacks(occ, sq) & !own).as_iter() {
            out.push(Move::normal(sq, to));
        }
    }
    for sq in pos.piece_occupancy(us, Piece::Queen).as_iter() {
        for to in (magic::queen_attacks(occ, sq) & !own).as_iter() {
            out.push(Move::normal(sq, to));
        }
    }

    let king_sq = pos.king_square(us);
    for to in (magic::king_attacks(king_sq) & !own).as_iter() {
        out.push(Move::normal(king_sq, to));
    }
    generate_castling_moves(pos, us, king_sq, out);
}

fn generate_pawn_moves(pos: &Position, us: Color, occ: Bitboard, enemy: Bitboard, out: &mut Vec<Move>) {
    let promote_rank = us.pawn_promote_rank();
    let push_dir = us.pawn_direction();

    for from in pos.piece_occupancy(us, Piece::Pawn).as_iter() {
        let one_step = from + push_dir;
        if !occ.contains(one_step) {
            push_pawn_move(from, one_step, promote_rank, out);
            if from.rank() == us.pawn_start_rank() {
                let two_steps = one_step + push_dir;
                if !occ.contains(two_steps) {
                    out.push(Move::normal(from, two_steps));
                }
            }
        }

        for to in (magic::pawn_attacks(us, from) & enemy).as_iter() {
            push_pawn_move(from, to, promote_rank, out);
        }

        if let Some(ep) = pos.ep_square() {
            if magic::pawn_attacks(us, from).contains(ep) {
                out.push(Move::en_passant(from, ep));
            }
        }
    }
}

fn push_pawn_move(from: Square, to: Square, promote_rank: u8, out: &mut Vec<Move>) {
    if to.rank() == promote_rank {
        for &piece in &Piece::PROMOTING {
            out.push(Move::promotion(from, to, piece));
        }
    } else {
        out.push(Move::normal(from, to));
    }
}

fn generate_castling_moves(pos: &Position, us: Color, king_sq: Square, out: &mut Vec<Move>) {
    if pos.in_check(us) {
        return;
    }
    let setup = pos.castling();
    for &flank in &Flank::ALL {
        if !pos.castle_rights().has(us, flank) {
            continue;
        }
        let rook_sq = setup.rook_start[us as usize][flank as usize];
        let empty_required = setup.castle_empty[us as usize][flank as usize];
        if !(pos.occupancy() & empty_required).is_empty() {
            continue;
        }
        let king_path = setup.castle_path[us as usize][flank as usize];
        let them = !us;
        if king_path.as_iter().any(|sq| pos.is_attacked_by(sq, them)) {
            continue;
        }
        out.push(Move::castle(king_sq, rook_sq));
    }
}

fn place_piece(pos: &mut Position, color: Color, piece: Piece, sq: Square, hash: &mut u64) {
    pos.mailbox_mut()[sq as usize] = piece as i8 * sign(color);
    pos.piece_bb_mut()[color as usize][piece as usize - 1].insert(sq);
    pos.color_bb_mut()[color as usize].insert(sq);
    *hash ^= zobrist::piece_key(color, piece, sq);
}

fn remove_piece(pos: &mut Position, color: Color, piece: Piece, sq: Square, hash: &mut u64) {
    pos.mailbox_mut()[sq as usize] = 0;
    pos.piece_bb_mut()[color as usize][piece as usize - 1].remove(sq);
    pos.color_bb_mut()[color as usize].remove(sq);
    *hash ^= zobrist::piece_key(color, piece, sq);
}

fn move_piece(pos: &mut Position, color: Color, piece: Piece, from: Square, to: Square, hash: &mut u64) {
    remove_piece(pos, color, piece, from, hash);
    place_piece(pos, color, piece, to, hash);
}

/// Apply `mv` to `pos`, returning the resulting child position. `mv` is trusted to have been
/// produced by this module's own generator for `pos`; no legality or even well-formedness
/// checking happens here.
#[must_use]
pub fn apply_move(pos: &Position, mv: Move) -> Position {
    let mut child = pos.clone();
    let us = pos.side_to_move();
    let them = !us;
    let from = mv.from_square();

    let mut hash = pos.hash();
    hash ^= zobrist::en_passant_key(pos.ep_square());
    hash ^= zobrist::castling_key(pos.castle_rights());

    let mut new_ep = None;
    let mut reset_halfmove = false;
    let mut moved_piece = Piece::King;

    if mv.is_castle() {
        let rook_from = mv.to_square();
        let flank = if rook_from.file() > from.file() { Flank::Kingside } else { Flank::Queenside };
        let king_dest = Square::new(from.rank(), flank.king_dest_file()).unwrap();
        let rook_dest = Square::new(from.rank(), flank.rook_dest_file()).unwrap();
        remove_piece(&mut child, us, Piece::King, from, &mut hash);
        remove_piece(&mut child, us, Piece::Rook, rook_from, &mut hash);
        place_piece(&mut child, us, Piece::King, king_dest, &mut hash);
        place_piece(&mut child, us, Piece::Rook, rook_dest, &mut hash);
    } else {
        let (_, piece) = pos.piece_at(from).expect("move origin must hold a piece");
        moved_piece = piece;
        let to = mv.to_square();

        if mv.is_en_passant() {
            let captured_sq = Square::new(from.rank(), to.file()).unwrap();
            remove_piece(&mut child, them, Piece::Pawn, captured_sq, &mut hash);
            reset_halfmove = true;
        } else if let Some((cap_color, cap_piece)) = pos.piece_at(to) {
            remove_piece(&mut child, cap_color, cap_piece, to, &mut hash);
            reset_halfmove = true;
        }

        if mv.is_promotion() {
            remove_piece(&mut child, us, Piece::Pawn, from, &mut hash);
            place_piece(&mut child, us, mv.promote_to(), to, &mut hash);
            reset_halfmove = true;
        } else {
            move_piece(&mut child, us, piece, from, to, &mut hash);
        }

        if piece == Piece::Pawn {
            reset_halfmove = true;
            if from.rank().abs_diff(to.rank()) == 2 {
                new_ep = Some(Square::new(us.ep_rank(), from.file()).unwrap());
            }
        }
    }

    let mut new_rights = pos.castle_rights();
    if mv.is_castle() || moved_piece == Piece::King {
        new_rights.clear_color(us);
    }
    for &color in &[Color::White, Color::Black] {
        for &flank in &Flank::ALL {
            let rook_sq = pos.castling().rook_start[color as usize][flank as usize];
            if from == rook_sq || mv.to_square() == rook_sq {
                new_rights.clear(color, flank);
            }
        }
    }

    child.set_ep_square(new_ep);
    child.set_castle_rights(new_rights);
    child.set_side_to_move(them);
    hash ^= zobrist::en_passant_key(new_ep);
    hash ^= zobrist::castling_key(new_rights);
    hash ^= zobrist::side_to_move_toggle();
    child.set_hash(hash);
    child.bump_clocks(reset_halfmove);

    child
}

/// Every legal move available to the side to move in `pos`.
#[must_use]
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(MAX_LEGAL_MOVES);
    pseudo_legal_moves(pos, &mut pseudo);
    let us = pos.side_to_move();
    pseudo.retain(|&mv| !apply_move(pos, mv).in_check(us));
    pseudo
}

/// Whether the side to move has at least one legal move, without paying for the full list.
#[must_use]
pub fn has_legal_move(pos: &Position) -> bool {
    let mut pseudo = Vec::with_capacity(MAX_LEGAL_MOVES);
    pseudo_legal_moves(pos, &mut pseudo);
    let us = pos.side_to_move();
    pseudo.iter().any(|&mv| !apply_move(pos, mv).in_check(us))
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn start_position_has_twenty_legal_moves() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(legal_moves(&pos).len(), 20);
    }

    #[test]
    fn king_cannot_move_into_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        let moves = legal_moves(&pos);
        assert!(!moves.iter().any(|m| m.from_square() == Square::E1 && m.to_square() == Square::F1));
    }

    #[test]
    fn en_passant_capture_is_generated_and_removes_captured_pawn() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
        let moves = legal_moves(&pos);
        let ep_move = moves.iter().find(|m| m.is_en_passant()).expect("en passant move must exist");
        let child = apply_move(&pos, *ep_move);
        assert!(child.piece_at(Square::D5).is_none());
        assert!(child.piece_at(Square::D6).is_some());
    }

    #[test]
    fn chess960_castling_moves_king_and_rook_to_fixed_files() {
        let pos = Position::from_fen("bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 0 1").unwrap();
        let moves = legal_moves(&pos);
        let castle = moves.iter().find(|m| m.is_castle() && m.to_square() == Square::H1);
        let castle = castle.expect("kingside castle with rook on h1 must be legal here");
        let child = apply_move(&pos, *castle);
        assert_eq!(child.king_square(Color::White), Square::G1);
        assert_eq!(child.piece_at(Square::F1), Some((Color::White, Piece::Rook)));
    }

    #[test]
    fn promotion_produces_four_distinct_children() {
        let pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = legal_moves(&pos);
        let promotions: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promotions.len(), 4);
    }

    #[test]
    fn apply_move_updates_hash_and_side_to_move() {
        let pos = Position::from_fen(START_FEN).unwrap();
        let mv = Move::normal(Square::E2, Square::E4);
        let child = apply_move(&pos, mv);
        assert_ne!(pos.hash(), child.hash());
        assert_eq!(child.side_to_move(), Color::Black);
        assert_eq!(child.ep_square(), Some(Square::E3));
    }
}
