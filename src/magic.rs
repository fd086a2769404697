//! Magic numbers: the multiplicative hash constants behind O(1) slider
//! attack lookups, and the randomized search that discovers them.
//!
//! For a square with relevant-occupancy mask `m` (`k` set bits), a magic
//! constant `c` maps every occupancy subset `occ` of `m` to the table index
//! `(occ * c) >> (64 - k)`. The constant is valid when no two subsets with
//! *different* attack sets share an index; subsets with equal attack sets
//! may alias freely, which is what lets the table stay `2^k` entries small.
//!
//! The baked-in constants below are the well-known collision-free set; they
//! can be regenerated with the `find_magics` binary, which runs
//! [`find_all_magics`] and prints these arrays as Rust source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;

use crate::attacks::{occupancy_subset, relevant_occupancy, slider_attacks};
use crate::bitboard::Bitboard;
use crate::types::{Slider, Square};

/// Bishop magic constants, one per square.
#[rustfmt::skip]
pub const BISHOP_MAGICS: [u64; 64] = [
    0x0002020202020200, 0x0002020202020000, 0x0004010202000000, 0x0004040080000000,
    0x0001104000000000, 0x0000821040000000, 0x0000410410400000, 0x0000104104104000,
    0x0000040404040400, 0x0000020202020200, 0x0000040102020000, 0x0000040400800000,
    0x0000011040000000, 0x0000008210400000, 0x0000004104104000, 0x0000002082082000,
    0x0004000808080800, 0x0002000404040400, 0x0001000202020200, 0x0000800802004000,
    0x0000800400A00000, 0x0000200100884000, 0x0000400082082000, 0x0000200041041000,
    0x0002080010101000, 0x0001040008080800, 0x0000208004010400, 0x0000404004010200,
    0x0000840000802000, 0x0000404002011000, 0x0000808001041000, 0x0000404000820800,
    0x0001041000202000, 0x0000820800101000, 0x0000104400080800, 0x0000020080080080,
    0x0000404040040100, 0x0000808100020100, 0x0001010100020800, 0x0000808080010400,
    0x0000820820004000, 0x0000410410002000, 0x0000082088001000, 0x0000002011000800,
    0x0000080100400400, 0x0001010101000200, 0x0002020202000400, 0x0001010101000200,
    0x0000410410400000, 0x0000208208200000, 0x0000002084100000, 0x0000000020880000,
    0x0000001002020000, 0x0000040408020000, 0x0004040404040000, 0x0002020202020000,
    0x0000104104104000, 0x0000002082082000, 0x0000000020841000, 0x0000000000208800,
    0x0000000010020200, 0x0000000404080200, 0x0000040404040400, 0x0002020202020200,
];

/// Rook magic constants, one per square.
#[rustfmt::skip]
pub const ROOK_MAGICS: [u64; 64] = [
    0x0080001020400080, 0x0040001000200040, 0x0080081000200080, 0x0080040800100080,
    0x0080020400080080, 0x0080010200040080, 0x0080008001000200, 0x0080002040800100,
    0x0000800020400080, 0x0000400020005000, 0x0000801000200080, 0x0000800800100080,
    0x0000800400080080, 0x0000800200040080, 0x0000800100020080, 0x0000800040800100,
    0x0000208000400080, 0x0000404000201000, 0x0000808010002000, 0x0000808008001000,
    0x0000808004000800, 0x0000808002000400, 0x0000010100020004, 0x0000020000408104,
    0x0000208080004000, 0x0000200040005000, 0x0000100080200080, 0x0000080080100080,
    0x0000040080080080, 0x0000020080040080, 0x0000010080800200, 0x0000800080004100,
    0x0000204000800080, 0x0000200040401000, 0x0000100080802000, 0x0000080080801000,
    0x0000040080800800, 0x0000020080800400, 0x0000020001010004, 0x0000800040800100,
    0x0000204000808000, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000010002008080, 0x0000004081020004,
    0x0000204000800080, 0x0000200040008080, 0x0000100020008080, 0x0000080010008080,
    0x0000040008008080, 0x0000020004008080, 0x0000800100020080, 0x0000800041000080,
    0x00FFFCDDFCED714A, 0x007FFCDDFCED714A, 0x003FFFCDFFD88096, 0x0000040810002101,
    0x0001000204080011, 0x0001000204000801, 0x0001000082000401, 0x0001FFFAABFAD1A2,
];

/// Default retry budget for one square's search. Well under a second per
/// square in practice; the budget exists so a failure is an error, never a
/// hang or a silently corrupt constant.
pub const DEFAULT_SEARCH_BUDGET: u64 = 100_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MagicError {
    /// The randomized search ran out of candidates. Initialization must
    /// abort on this; an unfound constant has no usable fallback value.
    #[error("magic search for the {slider:?} on {square} exhausted its budget of {budget} candidates")]
    SearchExhausted {
        slider: Slider,
        square: Square,
        budget: u64,
    },
    /// A supplied constant hashed two occupancies with different attack
    /// sets to the same slot while a table was being filled.
    #[error("magic constant {magic:#018x} for the {slider:?} on {square} is not collision-free")]
    Collision {
        slider: Slider,
        square: Square,
        magic: u64,
    },
}

/// Candidate constants with few set bits hash far better for this
/// construction, so AND three independent draws together.
fn sparse_candidate<R: Rng>(rng: &mut R) -> u64 {
    rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>()
}

/// Search for a collision-free magic constant for one square and slider.
///
/// Precomputes every occupancy subset of the relevant mask with its
/// ground-truth attack set, then tries sparse random candidates until one
/// assigns all `2^k` subsets without mapping two different attack sets to
/// the same index. Deterministic for a given `rng` state.
pub fn find_magic<R: Rng>(
    slider: Slider,
    square: Square,
    rng: &mut R,
    budget: u64,
) -> Result<u64, MagicError> {
    let mask = relevant_occupancy(slider, square);
    let bits = mask.count();
    let shift = 64 - bits;
    let size = 1usize << bits;

    let mut occupancies = Vec::with_capacity(size);
    let mut reference = Vec::with_capacity(size);
    for index in 0..size {
        let occ = occupancy_subset(index, mask);
        occupancies.push(occ);
        reference.push(slider_attacks(slider, square, occ));
    }

    // Slider attack sets always contain at least one square, so the empty
    // bitboard can mark unclaimed slots.
    let mut used = vec![Bitboard::EMPTY; size];

    'candidates: for _ in 0..budget {
        let candidate = sparse_candidate(rng);

        // Cheap pre-filter: candidates whose product with the mask leaves
        // too few bits in the top byte almost never hash well.
        if (mask.0.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        used.fill(Bitboard::EMPTY);
        for i in 0..size {
            let index = (occupancies[i].0.wrapping_mul(candidate) >> shift) as usize;
            if used[index].is_empty() {
                used[index] = reference[i];
            } else if used[index] != reference[i] {
                continue 'candidates;
            }
        }
        return Ok(candidate);
    }

    Err(MagicError::SearchExhausted {
        slider,
        square,
        budget,
    })
}

/// Search all 64 squares for one slider type, in parallel.
///
/// Each square's search is independent and writes a disjoint slot, so the
/// squares are simply fanned out over the rayon pool. Every square gets its
/// own generator derived from `seed`, keeping results reproducible
/// regardless of scheduling.
pub fn find_all_magics(slider: Slider, seed: u64, budget: u64) -> Result<[u64; 64], MagicError> {
    let found: Result<Vec<u64>, MagicError> = (0u8..64)
        .into_par_iter()
        .map(|index| {
            let square = Square::from_index(index);
            let mut rng = StdRng::seed_from_u64(seed ^ ((slider as u64) << 8) ^ index as u64);
            find_magic(slider, square, &mut rng, budget)
        })
        .collect();

    let mut magics = [0u64; 64];
    for (slot, magic) in magics.iter_mut().zip(found?) {
        *slot = magic;
    }
    Ok(magics)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustively check that `magic` is collision-free for its square.
    fn assert_valid_magic(slider: Slider, square: Square, magic: u64) {
        let mask = relevant_occupancy(slider, square);
        let bits = mask.count();
        let shift = 64 - bits;
        let size = 1usize << bits;
        let mut used = vec![Bitboard::EMPTY; size];

        for index in 0..size {
            let occ = occupancy_subset(index, mask);
            let attacks = slider_attacks(slider, square, occ);
            let slot = (occ.0.wrapping_mul(magic) >> shift) as usize;
            if used[slot].is_empty() {
                used[slot] = attacks;
            } else {
                assert_eq!(
                    used[slot], attacks,
                    "magic {magic:#018x} collides on {square} at slot {slot}"
                );
            }
        }
    }

    #[test]
    fn search_finds_valid_rook_magic() {
        let mut rng = StdRng::seed_from_u64(1804289383);
        for square in [Square::A1, Square::E4, Square::H8] {
            let magic = find_magic(Slider::Rook, square, &mut rng, DEFAULT_SEARCH_BUDGET)
                .expect("rook magic search should succeed");
            assert_valid_magic(Slider::Rook, square, magic);
        }
    }

    #[test]
    fn search_finds_valid_bishop_magic() {
        let mut rng = StdRng::seed_from_u64(1804289383);
        for square in [Square::D4, Square::A8, Square::C1] {
            let magic = find_magic(Slider::Bishop, square, &mut rng, DEFAULT_SEARCH_BUDGET)
                .expect("bishop magic search should succeed");
            assert_valid_magic(Slider::Bishop, square, magic);
        }
    }

    #[test]
    fn search_is_deterministic_for_a_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let first = find_magic(Slider::Bishop, Square::D4, &mut a, DEFAULT_SEARCH_BUDGET);
        let second = find_magic(Slider::Bishop, Square::D4, &mut b, DEFAULT_SEARCH_BUDGET);
        assert_eq!(first, second);
    }

    #[test]
    fn exhausted_budget_is_an_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = find_magic(Slider::Rook, Square::A1, &mut rng, 0);
        assert_eq!(
            result,
            Err(MagicError::SearchExhausted {
                slider: Slider::Rook,
                square: Square::A1,
                budget: 0,
            })
        );
    }

    #[test]
    fn baked_in_magics_spot_check() {
        // The full exhaustive check over all squares and subsets lives in
        // tests/attack_tables.rs; keep a couple of squares here so a bad
        // edit to the constant arrays fails fast.
        assert_valid_magic(Slider::Rook, Square::A1, ROOK_MAGICS[Square::A1.index()]);
        assert_valid_magic(Slider::Rook, Square::H8, ROOK_MAGICS[Square::H8.index()]);
        assert_valid_magic(
            Slider::Bishop,
            Square::D4,
            BISHOP_MAGICS[Square::D4.index()],
        );
    }
}
