//! Precomputed attack tables: built once, read-only afterwards.
//!
//! [`AttackTables`] owns everything the hot path needs: the three leaper
//! tables and the two magic-indexed slider tables. It is constructed
//! explicitly by [`AttackTables::build`] and passed by reference to
//! consumers; the [`tables`] accessor provides a process-wide instance for
//! callers that do not want to thread one through.

use once_cell::sync::Lazy;

use crate::attacks::{
    king_attacks_mask, knight_attacks_mask, occupancy_subset, pawn_attacks_mask,
    relevant_occupancy, slider_attacks,
};
use crate::bitboard::Bitboard;
use crate::magic::{MagicError, BISHOP_MAGICS, ROOK_MAGICS};
use crate::types::{Color, Slider, Square};

/// Per-square lookup parameters for one slider table.
#[derive(Debug, Clone, Copy)]
pub struct MagicEntry {
    /// Relevant occupancy mask; board occupancy is ANDed down to this.
    pub mask: Bitboard,
    /// Multiplicative hash constant.
    pub magic: u64,
    /// `64 - popcount(mask)`.
    pub shift: u32,
    /// Start of this square's block in the shared attack table.
    pub offset: usize,
}

impl MagicEntry {
    const EMPTY: MagicEntry = MagicEntry {
        mask: Bitboard::EMPTY,
        magic: 0,
        shift: 0,
        offset: 0,
    };

    #[inline(always)]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

pub struct AttackTables {
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    bishop_entries: [MagicEntry; 64],
    rook_entries: [MagicEntry; 64],
    bishop_table: Vec<Bitboard>,
    rook_table: Vec<Bitboard>,
}

impl AttackTables {
    /// Build every table from the baked-in magic constants.
    pub fn build() -> Result<AttackTables, MagicError> {
        Self::build_with(&BISHOP_MAGICS, &ROOK_MAGICS)
    }

    /// Build with caller-supplied magic constants (freshly searched ones,
    /// for instance). Fails if any constant hashes two occupancies with
    /// different attack sets to the same slot; a corrupt constant can never
    /// survive into a queryable table.
    pub fn build_with(
        bishop_magics: &[u64; 64],
        rook_magics: &[u64; 64],
    ) -> Result<AttackTables, MagicError> {
        let mut pawn = [[Bitboard::EMPTY; 64]; 2];
        let mut knight = [Bitboard::EMPTY; 64];
        let mut king = [Bitboard::EMPTY; 64];
        for sq in Square::all() {
            pawn[Color::White.index()][sq.index()] = pawn_attacks_mask(Color::White, sq);
            pawn[Color::Black.index()][sq.index()] = pawn_attacks_mask(Color::Black, sq);
            knight[sq.index()] = knight_attacks_mask(sq);
            king[sq.index()] = king_attacks_mask(sq);
        }

        let (bishop_entries, bishop_table) = build_slider_table(Slider::Bishop, bishop_magics)?;
        let (rook_entries, rook_table) = build_slider_table(Slider::Rook, rook_magics)?;

        Ok(AttackTables {
            pawn,
            knight,
            king,
            bishop_entries,
            rook_entries,
            bishop_table,
            rook_table,
        })
    }

    /// Capture squares of a pawn of `color` on `sq`.
    #[inline(always)]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index()]
    }

    #[inline(always)]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    #[inline(always)]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    /// Bishop attacks from `sq` with the board occupied as `occupied`.
    /// Mask, multiply, shift, index: no branches, no recomputation.
    #[inline(always)]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_table[self.bishop_entries[sq.index()].index(occupied)]
    }

    #[inline(always)]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook_table[self.rook_entries[sq.index()].index(occupied)]
    }

    #[inline(always)]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    /// Slider attacks dispatched by tag; the per-piece methods above are
    /// what the hot path uses.
    pub fn slider_attacks(&self, slider: Slider, sq: Square, occupied: Bitboard) -> Bitboard {
        match slider {
            Slider::Bishop => self.bishop_attacks(sq, occupied),
            Slider::Rook => self.rook_attacks(sq, occupied),
        }
    }
}

/// Fill one slider's table: for every square, hash every occupancy subset
/// of the relevant mask with the square's magic and store the ray-cast
/// attack set at the hashed slot.
fn build_slider_table(
    slider: Slider,
    magics: &[u64; 64],
) -> Result<([MagicEntry; 64], Vec<Bitboard>), MagicError> {
    let mut entries = [MagicEntry::EMPTY; 64];
    let mut table = Vec::new();
    let mut offset = 0usize;

    for sq in Square::all() {
        let mask = relevant_occupancy(slider, sq);
        let bits = mask.count();
        let shift = 64 - bits;
        let size = 1usize << bits;
        let magic = magics[sq.index()];

        table.resize(offset + size, Bitboard::EMPTY);
        for index in 0..size {
            let occ = occupancy_subset(index, mask);
            let attacks = slider_attacks(slider, sq, occ);
            let slot = offset + (occ.0.wrapping_mul(magic) >> shift) as usize;
            if table[slot].is_empty() {
                table[slot] = attacks;
            } else if table[slot] != attacks {
                return Err(MagicError::Collision {
                    slider,
                    square: sq,
                    magic,
                });
            }
        }

        entries[sq.index()] = MagicEntry {
            mask,
            magic,
            shift,
            offset,
        };
        offset += size;
    }

    Ok((entries, table))
}

static TABLES: Lazy<AttackTables> = Lazy::new(|| {
    AttackTables::build().expect("baked-in magic constants must build collision-free tables")
});

/// Process-wide attack tables, built on first use.
#[inline]
pub fn tables() -> &'static AttackTables {
    &TABLES
}
