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

//! The board: bitboards, a mailbox of signed piece codes, and the game state (side to move,
//! castling rights/geometry, en passant square) needed to generate moves from it.
//!
//! Positions are immutable once built; [`crate::movegen`] produces child positions by copying and
//! modifying rather than mutating a position in place and undoing later.

use crate::bitboard::Bitboard;
use crate::castling::{CastleRights, CastlingSetup, Flank};
use crate::color::Color;
use crate::error::FenError;
use crate::piece::Piece;
use crate::square::Square;
use crate::{magic, zobrist};
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// `piece_bb[color][piece as usize - 1]`
    piece_bb: [[Bitboard; Piece::NUM]; 2],
    /// Union of every piece of each color, kept alongside the per-piece boards since almost
    /// every move-generation step needs "is this square occupied by color X" rather than
    /// "which piece is on this square".
    color_bb: [Bitboard; 2],
    /// Signed piece code per square: magnitude is the piece kind (1=pawn..6=king), sign is White
    /// (+) or Black (-); 0 means empty.
    mailbox: [i8; 64],
    side_to_move: Color,
    castle_rights: CastleRights,
    ep_square: Option<Square>,
    castling: CastlingSetup,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

impl Position {
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let code = self.mailbox[sq as usize];
        if code == 0 {
            return None;
        }
        let color = if code > 0 { Color::White } else { Color::Black };
        Some((color, Piece::from_magnitude(code.unsigned_abs() as i8).unwrap()))
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castle_rights(&self) -> CastleRights {
        self.castle_rights
    }

    #[must_use]
    pub fn castling(&self) -> &CastlingSetup {
        &self.castling
    }

    #[must_use]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn occupancy(&self) -> Bitboard {
        self.color_bb[0] | self.color_bb[1]
    }

    #[must_use]
    pub fn color_occupancy(&self, color: Color) -> Bitboard {
        self.color_bb[color as usize]
    }

    #[must_use]
    pub fn piece_occupancy(&self, color: Color, piece: Piece) -> Bitboard {
        self.piece_bb[color as usize][piece as usize - 1]
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.piece_occupancy(color, Piece::King)
            .as_iter()
            .next()
            .expect("every legal position carries exactly one king per color")
    }

    /// All squares from which a piece of `attacker` could capture on `sq`, given the board's
    /// current occupancy.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, attacker: Color) -> Bitboard {
        let occ = self.occupancy();
        let mut attackers = Bitboard::EMPTY;
        attackers |= magic::pawn_attacks(!attacker, sq) & self.piece_occupancy(attacker, Piece::Pawn);
        attackers |= magic::knight_attacks(sq) & self.piece_occupancy(attacker, Piece::Knight);
        attackers |= magic::king_attacks(sq) & self.piece_occupancy(attacker, Piece::King);
        let bishop_like = self.piece_occupancy(attacker, Piece::Bishop) | self.piece_occupancy(attacker, Piece::Queen);
        attackers |= magic::bishop_attacks(occ, sq) & bishop_like;
        let rook_like = self.piece_occupancy(attacker, Piece::Rook) | self.piece_occupancy(attacker, Piece::Queen);
        attackers |= magic::rook_attacks(occ, sq) & rook_like;
        attackers
    }

    #[must_use]
    pub fn is_attacked_by(&self, sq: Square, attacker: Color) -> bool {
        !self.attackers_to(sq, attacker).is_empty()
    }

    #[must_use]
    pub fn in_check(&self, color: Color) -> bool {
        self.is_attacked_by(self.king_square(color), !color)
    }

    pub(crate) fn mailbox_mut(&mut self) -> &mut [i8; 64] {
        &mut self.mailbox
    }

    pub(crate) fn piece_bb_mut(&mut self) -> &mut [[Bitboard; Piece::NUM]; 2] {
        &mut self.piece_bb
    }

    pub(crate) fn color_bb_mut(&mut self) -> &mut [Bitboard; 2] {
        &mut self.color_bb
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub(crate) fn set_ep_square(&mut self, sq: Option<Square>) {
        self.ep_square = sq;
    }

    pub(crate) fn set_castle_rights(&mut self, rights: CastleRights) {
        self.castle_rights = rights;
    }

    pub(crate) fn set_hash(&mut self, hash: u64) {
        self.hash = hash;
    }

    pub(crate) fn bump_clocks(&mut self, reset_halfmove: bool) {
        self.halfmove_clock = if reset_halfmove { 0 } else { self.halfmove_clock + 1 };
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
    }

    /// Recompute the Zobrist hash from scratch. Used at FEN intake; incremental updates during
    /// move application are cheaper and live in [`crate::movegen`].
    fn recompute_hash(&mut self) {
        let mut hash = 0u64;
        for &color in &[Color::White, Color::Black] {
            for &piece in &Piece::ALL {
                for sq in self.piece_occupancy(color, piece).as_iter() {
                    hash ^= zobrist::piece_key(color, piece, sq);
                }
            }
        }
        hash ^= zobrist::en_passant_key(self.ep_square);
        hash ^= zobrist::castling_key(self.castle_rights);
        hash ^= zobrist::side_to_move_key(self.side_to_move);
        self.hash = hash;
    }

    /// Parse a (possibly Shredder-style) FEN string into a position, validating every invariant
    /// this crate relies on: legal piece placement, exactly one king per color, and that the side
    /// not to move isn't in check.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::TooFewFields { found: fields.len() });
        }

        let mut mailbox = [0i8; 64];
        let mut piece_bb = [[Bitboard::EMPTY; Piece::NUM]; 2];
        let mut color_bb = [Bitboard::EMPTY; 2];

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadPlacement {
                reason: format!("expected 8 ranks separated by '/', found {}", ranks.len()),
            });
        }
        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                    if file > 8 {
                        return Err(FenError::BadPlacement { reason: format!("rank {rank_str} overflows 8 files") });
                    }
                    continue;
                }
                if file >= 8 {
                    return Err(FenError::BadPlacement { reason: format!("rank {rank_str} overflows 8 files") });
                }
                let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
                let piece = Piece::from_code(c.to_ascii_uppercase())
                    .ok_or_else(|| FenError::BadPlacement { reason: format!("unrecognized piece char {c:?}") })?;
                let sq = Square::new(rank, file).unwrap();
                let code = piece as i8 * if color == Color::White { 1 } else { -1 };
                mailbox[sq as usize] = code;
                piece_bb[color as usize][piece as usize - 1].insert(sq);
                color_bb[color as usize].insert(sq);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::BadPlacement { reason: format!("rank {rank_str} does not cover 8 files") });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove { found: other.to_string() }),
        };

        let white_kings = piece_bb[Color::White as usize][Piece::King as usize - 1].len();
        let black_kings = piece_bb[Color::Black as usize][Piece::King as usize - 1].len();
        if white_kings != 1 || black_kings != 1 {
            return Err(FenError::BadKingCount { white_kings, black_kings });
        }
        let king_start = [
            piece_bb[Color::White as usize][Piece::King as usize - 1].as_iter().next().unwrap(),
            piece_bb[Color::Black as usize][Piece::King as usize - 1].as_iter().next().unwrap(),
        ];

        let (castle_rights, rook_start) = parse_castling(fields[2], &mailbox, king_start)?;

        let ep_square = match fields[3] {
            "-" => None,
            s => Some(Square::from_algebraic(s).map_err(|_| FenError::BadEnPassant { found: s.to_string() })?),
        };

        let halfmove_clock = fields.get(4).and_then(|s| s.parse().ok()).unwrap_or(0);
        let fullmove_number = fields.get(5).and_then(|s| s.parse().ok()).unwrap_or(1);

        let castling = CastlingSetup::new(king_start, rook_start);

        let mut pos = Position {
            piece_bb,
            color_bb,
            mailbox,
            side_to_move,
            castle_rights,
            ep_square,
            castling,
            halfmove_clock,
            fullmove_number,
            hash: 0,
        };
        pos.recompute_hash();

        if pos.in_check(!pos.side_to_move) {
            return Err(FenError::IllegalPosition);
        }

        Ok(pos)
    }
}

/// Parse a FEN/Shredder-FEN castling field, resolving which rook each right refers to.
///
/// Three notations are accepted, matching what Chess960 perft tools commonly emit: the classic
/// `KQkq` (meaning "outermost rook on that side of the king"), Shredder file letters (`HAha`,
/// naming the rook's starting file directly), and `-` for no rights.
fn parse_castling(
    field: &str,
    mailbox: &[i8; 64],
    king_start: [Square; 2],
) -> Result<(CastleRights, [[Square; 2]; 2]), FenError> {
    let mut rights = CastleRights::NONE;
    let mut rook_start = [[king_start[0], king_start[0]], [king_start[1], king_start[1]]];

    if field == "-" {
        return Ok((rights, rook_start));
    }

    for c in field.chars() {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let color_idx = color as usize;
        let back_rank = color.back_rank();
        let king_file = king_start[color_idx].file();

        let (flank, rook_file) = match c.to_ascii_uppercase() {
            'K' => {
                let file = outermost_rook_file(mailbox, back_rank, king_file, color, true)
                    .ok_or(FenError::NoCastlingRook { side: color, flank: Flank::Kingside })?;
                (Flank::Kingside, file)
            }
            'Q' => {
                let file = outermost_rook_file(mailbox, back_rank, king_file, color, false)
                    .ok_or(FenError::NoCastlingRook { side: color, flank: Flank::Queenside })?;
                (Flank::Queenside, file)
            }
            letter @ 'A'..='H' => {
                let file = letter as u8 - b'A';
                let rook_sq = Square::new(back_rank, file).unwrap();
                if mailbox[rook_sq as usize] != Piece::Rook as i8 * sign(color) {
                    return Err(FenError::NoCastlingRook {
                        side: color,
                        flank: if file > king_file { Flank::Kingside } else { Flank::Queenside },
                    });
                }
                let flank = if file > king_file { Flank::Kingside } else { Flank::Queenside };
                (flank, file)
            }
            _ => return Err(FenError::BadCastlingChar { found: c }),
        };

        rights.set(color, flank);
        rook_start[color_idx][flank as usize] = Square::new(back_rank, rook_file).unwrap();
    }

    Ok((rights, rook_start))
}

fn sign(color: Color) -> i8 {
    if color == Color::White {
        1
    } else {
        -1
    }
}

/// Find the file of the rook furthest from the king on the given side (`kingside = true` looks
/// to higher files, `false` to lower files), as classic `KQkq` notation requires.
fn outermost_rook_file(mailbox: &[i8; 64], rank: u8, king_file: u8, color: Color, kingside: bool) -> Option<u8> {
    let rook_code = Piece::Rook as i8 * sign(color);
    let files: Box<dyn Iterator<Item = u8>> = if kingside {
        Box::new((king_file + 1..8).rev())
    } else {
        Box::new(0..king_file)
    };
    for file in files {
        let sq = Square::new(rank, file).unwrap();
        if mailbox[sq as usize] == rook_code {
            return Some(file);
        }
    }
    None
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let sq = Square::new(rank, file).unwrap();
                let c = match self.piece_at(sq) {
                    Some((Color::White, piece)) => piece.code(),
                    Some((Color::Black, piece)) => piece.code().to_ascii_lowercase(),
                    None => '.',
                };
                write!(f, "{c} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "{:?} to move", self.side_to_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn start_position_parses_with_full_rights() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castle_rights(), CastleRights::ALL);
        assert_eq!(pos.ep_square(), None);
        assert_eq!(pos.king_square(Color::White), Square::E1);
    }

    #[test]
    fn rejects_missing_king() {
        let fen = "8/8/8/8/8/8/8/8 w - - 0 1";
        assert!(matches!(Position::from_fen(fen), Err(FenError::BadKingCount { .. })));
    }

    #[test]
    fn rejects_opponent_already_in_check() {
        // White king on e1 attacked by a black rook on e8 with Black to move is illegal: it is
        // White's check to have already answered.
        let fen = "4r3/8/8/8/8/8/8/4K3 b - - 0 1";
        assert_eq!(Position::from_fen(fen), Err(FenError::IllegalPosition));
    }

    #[test]
    fn shredder_fen_resolves_rook_files_for_chess960_start() {
        let fen = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.castle_rights(), CastleRights(0b1111));
        assert_eq!(pos.king_square(Color::White), Square::G1);
        assert_eq!(pos.castling().rook_start[0][Flank::Kingside as usize], Square::H1);
        assert_eq!(pos.castling().rook_start[0][Flank::Queenside as usize], Square::F1);
    }

    #[test]
    fn classic_kqkq_resolves_to_corner_rooks_in_chess960_setup() {
        let fen = "bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w KQkq - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.castling().rook_start[0][Flank::Kingside as usize], Square::H1);
        assert_eq!(pos.castling().rook_start[0][Flank::Queenside as usize], Square::F1);
    }
}
