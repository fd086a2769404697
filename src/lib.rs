//! Bitboard board representation and magic-bitboard attack generation.
//!
//! The crate builds, once, a set of precomputed attack tables (leapers by
//! square, sliders by square and hashed occupancy) and exposes O(1) attack
//! lookups plus a FEN-parsed [`board::Board`] with an
//! `is_square_attacked` query. Move generation, search and evaluation are
//! deliberately out of scope.

pub mod types;
pub mod bitboard;
pub mod attacks;
pub mod magic;
pub mod tables;
pub mod board;
