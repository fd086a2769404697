//! Board state: 12 piece bitboards, derived occupancy masks, side to move,
//! castling rights and en-passant square, rebuilt wholesale from FEN.
//!
//! No incremental make/unmake exists here; move application belongs to a
//! move-generation layer on top of this crate. The one query the core owns
//! is [`Board::is_square_attacked`].

use std::fmt;

use thiserror::Error;

use crate::bitboard::Bitboard;
use crate::tables::AttackTables;
use crate::types::{CastlingRights, Color, Piece, PieceType, Square};

pub const STARTING_POSITION_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 space-separated fields, found {0}")]
    MissingFields(usize),
    #[error("unexpected character {0:?} in piece placement")]
    BadPieceChar(char),
    #[error("piece placement does not describe 8 ranks of 8 files")]
    BadPlacementShape,
    #[error("side to move must be `w` or `b`, found {0:?}")]
    BadSideToMove(String),
    #[error("invalid castling rights field {0:?}")]
    BadCastlingRights(String),
    #[error("invalid en passant field {0:?}")]
    BadEnPassant(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Board {
    /// One bitboard per piece kind, indexed by `(Color, PieceType)` through
    /// [`Board::piece_bb`]. Kinds never share a set square.
    pieces: [[Bitboard; 6]; 2],
    /// Derived from `pieces`, never mutated independently.
    occupancy: [Bitboard; 2],
    occupied: Bitboard,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
}

impl Board {
    /// The standard starting position.
    pub fn new() -> Board {
        Self::from_fen(STARTING_POSITION_FEN)
            .expect("starting position FEN is well-formed")
    }

    /// Parse a FEN string, rebuilding the whole board state.
    ///
    /// Malformed input is rejected rather than best-effort parsed: a
    /// silently misparsed board corrupts every downstream attack query.
    /// Trailing halfmove/fullmove counters are accepted but ignored.
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(FenError::MissingFields(fields.len()));
        }

        let mut pieces = [[Bitboard::EMPTY; 6]; 2];
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::BadPlacementShape);
        }
        // FEN lists rank 8 first.
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - row;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip == 9 {
                        return Err(FenError::BadPieceChar(c));
                    }
                    file += skip as usize;
                } else {
                    let piece = Piece::from_fen_char(c).ok_or(FenError::BadPieceChar(c))?;
                    if file >= 8 {
                        return Err(FenError::BadPlacementShape);
                    }
                    let sq = Square::from_index((rank * 8 + file) as u8);
                    let bb =
                        &mut pieces[piece.color.index()][piece.piece_type.index()];
                    *bb = bb.with(sq);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::BadPlacementShape);
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::BadSideToMove(other.to_string())),
        };

        let castling = CastlingRights::from_fen_field(fields[2])
            .ok_or_else(|| FenError::BadCastlingRights(fields[2].to_string()))?;

        let en_passant = match fields[3] {
            "-" => None,
            other => Some(
                Square::from_algebraic(other)
                    .ok_or_else(|| FenError::BadEnPassant(other.to_string()))?,
            ),
        };

        let mut board = Board {
            pieces,
            occupancy: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            side_to_move,
            castling,
            en_passant,
        };
        board.recompute_occupancy();
        Ok(board)
    }

    fn recompute_occupancy(&mut self) {
        for color in Color::ALL {
            let mut occ = Bitboard::EMPTY;
            for bb in self.pieces[color.index()] {
                occ |= bb;
            }
            self.occupancy[color.index()] = occ;
        }
        self.occupied =
            self.occupancy[Color::White.index()] | self.occupancy[Color::Black.index()];
    }

    /// The bitboard for one piece kind.
    #[inline(always)]
    pub fn piece_bb(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.pieces[color.index()][piece_type.index()]
    }

    /// All squares occupied by `color`.
    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// All occupied squares.
    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// The piece on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        for color in Color::ALL {
            if !self.occupancy(color).contains(sq) {
                continue;
            }
            for piece_type in PieceType::ALL {
                if self.piece_bb(color, piece_type).contains(sq) {
                    return Some(Piece::new(color, piece_type));
                }
            }
        }
        None
    }

    /// Is `sq` attacked by any piece of `by`?
    ///
    /// Pure query over the current snapshot; short-circuits on the first
    /// attacking piece kind.
    pub fn is_square_attacked(&self, sq: Square, by: Color, tables: &AttackTables) -> bool {
        // A pawn of `by` attacks sq exactly when a pawn of the other color
        // standing on sq would attack the pawn's square.
        let pawns = self.piece_bb(by, PieceType::Pawn);
        if (tables.pawn_attacks(by.opponent(), sq) & pawns).any() {
            return true;
        }
        if (tables.knight_attacks(sq) & self.piece_bb(by, PieceType::Knight)).any() {
            return true;
        }
        if (tables.king_attacks(sq) & self.piece_bb(by, PieceType::King)).any() {
            return true;
        }
        let queens = self.piece_bb(by, PieceType::Queen);
        let diagonal = self.piece_bb(by, PieceType::Bishop) | queens;
        if (tables.bishop_attacks(sq, self.occupied) & diagonal).any() {
            return true;
        }
        let orthogonal = self.piece_bb(by, PieceType::Rook) | queens;
        (tables.rook_attacks(sq, self.occupied) & orthogonal).any()
    }

    /// Serialize back to FEN. The ignored halfmove/fullmove counters are
    /// emitted as `0 1`.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_run = 0;
            for file in 0..8 {
                let sq = Square::from_index((rank * 8 + file) as u8);
                match self.piece_at(sq) {
                    Some(piece) => {
                        if empty_run > 0 {
                            fen.push(char::from_digit(empty_run, 10).unwrap());
                            empty_run = 0;
                        }
                        fen.push(piece.to_fen_char());
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                fen.push(char::from_digit(empty_run, 10).unwrap());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });
        fen.push(' ');
        fen.push_str(&self.castling.to_string());
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(" 0 1");
        fen
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl fmt::Display for Board {
    /// Grid with FEN piece letters, rank 8 on top, plus the state fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::from_index((rank * 8 + file) as u8);
                let c = self.piece_at(sq).map_or('.', Piece::to_fen_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "     a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "     side to move: {}", self.side_to_move.to_human())?;
        writeln!(f, "     castling: {}", self.castling)?;
        match self.en_passant {
            Some(sq) => write!(f, "     en passant: {sq}"),
            None => write!(f, "     en passant: -"),
        }
    }
}
