//! Ground-truth attack geometry, computed by walking the board.
//!
//! Everything here is pure and table-free: leaper masks are built from
//! single shifts guarded by the file edge masks, slider attacks by casting
//! rays square by square. The magic subsystem ([`crate::magic`],
//! [`crate::tables`]) is validated against and populated from these
//! functions; they are the definition of correctness, not the fast path.

use crate::bitboard::Bitboard;
use crate::types::{Color, Slider, Square};

/// Relevant-occupancy popcount per square for bishops. Fixed by geometry.
#[rustfmt::skip]
pub const BISHOP_RELEVANT_BITS: [u32; 64] = [
    6, 5, 5, 5, 5, 5, 5, 6,
    5, 5, 5, 5, 5, 5, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 9, 9, 7, 5, 5,
    5, 5, 7, 7, 7, 7, 5, 5,
    5, 5, 5, 5, 5, 5, 5, 5,
    6, 5, 5, 5, 5, 5, 5, 6,
];

/// Relevant-occupancy popcount per square for rooks. Fixed by geometry.
#[rustfmt::skip]
pub const ROOK_RELEVANT_BITS: [u32; 64] = [
    12, 11, 11, 11, 11, 11, 11, 12,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    11, 10, 10, 10, 10, 10, 10, 11,
    12, 11, 11, 11, 11, 11, 11, 12,
];

/// Diagonal capture squares for a pawn of `color` on `sq`. Forward pushes
/// are not attacks and are excluded.
pub fn pawn_attacks_mask(color: Color, sq: Square) -> Bitboard {
    let bb = Bitboard::square(sq);
    match color {
        Color::White => ((bb << 9) & !Bitboard::FILE_A) | ((bb << 7) & !Bitboard::FILE_H),
        Color::Black => ((bb >> 7) & !Bitboard::FILE_A) | ((bb >> 9) & !Bitboard::FILE_H),
    }
}

pub fn knight_attacks_mask(sq: Square) -> Bitboard {
    let bb = Bitboard::square(sq);
    let mut attacks = Bitboard::EMPTY;
    // Each offset is masked so a knight on the a/b or g/h files cannot wrap
    // around to the far side of the board.
    attacks |= (bb << 17) & !Bitboard::FILE_A; // up 2, right 1
    attacks |= (bb << 15) & !Bitboard::FILE_H; // up 2, left 1
    attacks |= (bb << 10) & !(Bitboard::FILE_A | Bitboard::FILE_B); // up 1, right 2
    attacks |= (bb << 6) & !(Bitboard::FILE_G | Bitboard::FILE_H); // up 1, left 2
    attacks |= (bb >> 15) & !Bitboard::FILE_A; // down 2, right 1
    attacks |= (bb >> 17) & !Bitboard::FILE_H; // down 2, left 1
    attacks |= (bb >> 6) & !(Bitboard::FILE_A | Bitboard::FILE_B); // down 1, right 2
    attacks |= (bb >> 10) & !(Bitboard::FILE_G | Bitboard::FILE_H); // down 1, left 2
    attacks
}

pub fn king_attacks_mask(sq: Square) -> Bitboard {
    let bb = Bitboard::square(sq);
    let mut attacks = Bitboard::EMPTY;
    attacks |= bb << 8; // up
    attacks |= (bb << 9) & !Bitboard::FILE_A; // up right
    attacks |= (bb << 7) & !Bitboard::FILE_H; // up left
    attacks |= (bb << 1) & !Bitboard::FILE_A; // right
    attacks |= bb >> 8; // down
    attacks |= (bb >> 7) & !Bitboard::FILE_A; // down right
    attacks |= (bb >> 9) & !Bitboard::FILE_H; // down left
    attacks |= (bb >> 1) & !Bitboard::FILE_H; // left
    attacks
}

const BISHOP_DIRECTIONS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

fn directions(slider: Slider) -> [(i32, i32); 4] {
    match slider {
        Slider::Bishop => BISHOP_DIRECTIONS,
        Slider::Rook => ROOK_DIRECTIONS,
    }
}

/// Squares whose occupancy can change a slider's attacks from `sq`.
///
/// Each ray stops one square short of the board edge: a piece on the edge
/// square can never block anything because the attack ray always includes
/// the edge square itself.
pub fn relevant_occupancy(slider: Slider, sq: Square) -> Bitboard {
    let rank = sq.rank().index() as i32;
    let file = sq.file().index() as i32;
    let mut mask = Bitboard::EMPTY;

    for (dr, df) in directions(slider) {
        let mut r = rank + dr;
        let mut f = file + df;
        while (dr == 0 || (1..7).contains(&r)) && (df == 0 || (1..7).contains(&f)) {
            mask |= Bitboard(1u64 << (r * 8 + f));
            r += dr;
            f += df;
        }
    }
    mask
}

/// True ray-cast attacks from `sq` given `occupancy`.
///
/// Each ray includes every traversed square and stops immediately after
/// including the first occupied one: a blocker is always attacked (it could
/// be captured), squares behind it never are.
pub fn slider_attacks(slider: Slider, sq: Square, occupancy: Bitboard) -> Bitboard {
    let rank = sq.rank().index() as i32;
    let file = sq.file().index() as i32;
    let mut attacks = Bitboard::EMPTY;

    for (dr, df) in directions(slider) {
        let mut r = rank + dr;
        let mut f = file + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let target = Bitboard(1u64 << (r * 8 + f));
            attacks |= target;
            if (occupancy & target).any() {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// The `index`-th subset of `mask`.
///
/// The set bits of `mask`, lowest first, form an ordered list of slots; bit
/// `j` of `index` decides whether slot `j` is included. For a mask with `k`
/// bits this is a bijection between `0..2^k` and the subsets of the mask.
pub fn occupancy_subset(index: usize, mask: Bitboard) -> Bitboard {
    debug_assert!(index < (1 << mask.count()));
    let mut subset = Bitboard::EMPTY;
    let mut remaining = mask;
    let mut slot = 0;
    while let Some(sq) = remaining.pop_lsb() {
        if index & (1 << slot) != 0 {
            subset |= Bitboard::square(sq);
        }
        slot += 1;
    }
    subset
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn knight_attacks_center() {
        // Knight on e4 attacks d2, f2, c3, g3, c5, g5, d6, f6.
        let attacks = knight_attacks_mask(Square::E4);
        assert_eq!(attacks.count(), 8);
        for sq in [
            Square::D2,
            Square::F2,
            Square::C3,
            Square::G3,
            Square::C5,
            Square::G5,
            Square::D6,
            Square::F6,
        ] {
            assert!(attacks.contains(sq), "expected knight on e4 to attack {sq}");
        }
    }

    #[test]
    fn knight_attacks_do_not_wrap() {
        // Knight on a1 attacks only b3 and c2.
        let attacks = knight_attacks_mask(Square::A1);
        assert_eq!(attacks.count(), 2);
        assert!(attacks.contains(Square::B3));
        assert!(attacks.contains(Square::C2));

        // Knight on h4 must not reach the a or b files.
        let attacks = knight_attacks_mask(Square::H4);
        assert!((attacks & (Bitboard::FILE_A | Bitboard::FILE_B)).is_empty());
    }

    #[test]
    fn king_attacks_counts() {
        assert_eq!(king_attacks_mask(Square::E4).count(), 8);
        assert_eq!(king_attacks_mask(Square::A1).count(), 3);
        assert_eq!(king_attacks_mask(Square::H8).count(), 3);
        assert_eq!(king_attacks_mask(Square::A4).count(), 5);
    }

    #[test]
    fn pawn_attacks_by_color() {
        // White pawn on e4 attacks d5 and f5.
        let attacks = pawn_attacks_mask(Color::White, Square::E4);
        assert_eq!(attacks.count(), 2);
        assert!(attacks.contains(Square::D5));
        assert!(attacks.contains(Square::F5));

        // Black pawn on e5 attacks d4 and f4.
        let attacks = pawn_attacks_mask(Color::Black, Square::E5);
        assert_eq!(attacks.count(), 2);
        assert!(attacks.contains(Square::D4));
        assert!(attacks.contains(Square::F4));
    }

    #[test]
    fn pawn_attacks_do_not_wrap() {
        let attacks = pawn_attacks_mask(Color::White, Square::A2);
        assert_eq!(attacks.count(), 1);
        assert!(attacks.contains(Square::B3));

        let attacks = pawn_attacks_mask(Color::Black, Square::H5);
        assert_eq!(attacks.count(), 1);
        assert!(attacks.contains(Square::G4));
    }

    #[test]
    fn pawn_attacks_vanish_past_last_rank() {
        assert!(pawn_attacks_mask(Color::White, Square::E8).is_empty());
        assert!(pawn_attacks_mask(Color::Black, Square::E1).is_empty());
    }

    #[test]
    fn relevant_occupancy_matches_fixed_bit_counts() {
        for sq in Square::all() {
            assert_eq!(
                relevant_occupancy(Slider::Rook, sq).count(),
                ROOK_RELEVANT_BITS[sq.index()],
                "rook mask popcount mismatch on {sq}"
            );
            assert_eq!(
                relevant_occupancy(Slider::Bishop, sq).count(),
                BISHOP_RELEVANT_BITS[sq.index()],
                "bishop mask popcount mismatch on {sq}"
            );
        }
    }

    #[test]
    fn relevant_occupancy_excludes_edges() {
        // Bishop masks never touch any edge of the board.
        let edges =
            Bitboard::FILE_A | Bitboard::FILE_H | Bitboard::RANK_1 | Bitboard::RANK_8;
        for sq in Square::all() {
            assert!(
                (relevant_occupancy(Slider::Bishop, sq) & edges).is_empty(),
                "bishop mask for {sq} touches an edge"
            );
        }

        // Rook mask from e4 stops short of the edge in each ray direction.
        let mask = relevant_occupancy(Slider::Rook, Square::E4);
        assert!(!mask.contains(Square::E8));
        assert!(!mask.contains(Square::E1));
        assert!(!mask.contains(Square::A4));
        assert!(!mask.contains(Square::H4));
        assert!(mask.contains(Square::E7));
        assert!(mask.contains(Square::B4));
    }

    #[test]
    fn rook_attacks_on_empty_board() {
        // Full rank and file minus the origin: 14 squares.
        let attacks = slider_attacks(Slider::Rook, Square::E4, Bitboard::EMPTY);
        assert_eq!(attacks.count(), 14);
        assert!(!attacks.contains(Square::E4));
        assert!(attacks.contains(Square::E8));
        assert!(attacks.contains(Square::A4));
    }

    #[test]
    fn rook_attacks_stop_at_blocker() {
        // Rook on a1, blocker on a4: a2 a3 a4 up the file, b1..h1 on the rank.
        let occupancy = Bitboard::square(Square::A4);
        let attacks = slider_attacks(Slider::Rook, Square::A1, occupancy);
        assert_eq!(attacks.count(), 10);
        assert!(attacks.contains(Square::A4), "blocker square is attacked");
        assert!(!attacks.contains(Square::A5), "nothing beyond the blocker");
        assert!(attacks.contains(Square::H1));
    }

    #[test]
    fn bishop_attacks_on_empty_board() {
        let attacks = slider_attacks(Slider::Bishop, Square::E4, Bitboard::EMPTY);
        assert_eq!(attacks.count(), 13);
        assert!(attacks.contains(Square::B1));
        assert!(attacks.contains(Square::H7));
        assert!(attacks.contains(Square::A8));
        assert!(attacks.contains(Square::H1));
    }

    #[test]
    fn bishop_attacks_stop_at_blockers() {
        // Bishop on e4, blockers on c2 and g6.
        let occupancy = Bitboard::square(Square::C2) | Bitboard::square(Square::G6);
        let attacks = slider_attacks(Slider::Bishop, Square::E4, occupancy);
        assert!(attacks.contains(Square::C2));
        assert!(attacks.contains(Square::G6));
        assert!(!attacks.contains(Square::B1));
        assert!(!attacks.contains(Square::H7));
    }

    #[test]
    fn occupancy_subsets_are_a_bijection() {
        let mask = relevant_occupancy(Slider::Bishop, Square::D4);
        let count = 1usize << mask.count();
        assert_eq!(count, 512);

        let mut seen = HashSet::new();
        for index in 0..count {
            let subset = occupancy_subset(index, mask);
            assert_eq!(subset & mask, subset, "subset {index} escapes the mask");
            assert!(seen.insert(subset), "subset {index} duplicates an earlier one");
        }
        assert_eq!(seen.len(), count);
    }

    #[test]
    fn occupancy_subset_extremes() {
        let mask = relevant_occupancy(Slider::Rook, Square::A1);
        assert_eq!(occupancy_subset(0, mask), Bitboard::EMPTY);
        let last = (1usize << mask.count()) - 1;
        assert_eq!(occupancy_subset(last, mask), mask);
    }
}
