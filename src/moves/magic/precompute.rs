//! Builds the magic bitboard attack tables used by `structs::MagicTables`.
//!
//! The relevant-occupancy mask for a square is simply its slider attack set on
//! an otherwise empty board; every subset of that mask is tried as a blocker
//! configuration against the scan-based attack functions in `attacks`, and a
//! magic multiplier is searched for that hashes every subset to the slot
//! holding its correct attack bitboard (`search::find_magic_number_for_square`).

use super::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seeding strategy for magic number search. Magic numbers only need to be
/// internally consistent (hash every blocker subset to the right attack set);
/// a fixed seed makes table construction — and therefore every dependent
/// search result — reproducible across runs.
#[derive(Debug, Clone, Copy)]
pub enum MagicTableSeed {
    Fixed(u64),
}

/// Enumerates every subset of `mask` by distributing the bits of `index`
/// across `mask`'s set bit positions (the standard "bit distribution" trick).
fn subset_from_index(index: usize, mut mask: u64) -> u64 {
    let mut result = 0u64;
    let mut i = index;
    while mask != 0 {
        let bit = mask & mask.wrapping_neg();
        mask &= mask - 1;
        if i & 1 != 0 {
            result |= bit;
        }
        i >>= 1;
    }
    result
}

fn build_entry(
    square: usize,
    scan_fn: fn(usize, u64) -> u64,
    rng: &mut StdRng,
) -> Result<MagicEntry, String> {
    let mask = scan_fn(square, 0);
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let num_subsets = 1usize << bits;

    let mut blockers = Vec::with_capacity(num_subsets);
    let mut attacks = Vec::with_capacity(num_subsets);
    for i in 0..num_subsets {
        let blocker = subset_from_index(i, mask);
        blockers.push(blocker);
        attacks.push(scan_fn(square, blocker));
    }

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let mut table = vec![0u64; num_subsets];
    for i in 0..num_subsets {
        let idx = ((blockers[i].wrapping_mul(magic)) >> shift) as usize;
        table[idx] = attacks[i];
    }

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table: table.into_boxed_slice(),
    })
}

pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let MagicTableSeed::Fixed(seed) = seed;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for sq in 0..64 {
        rook_entries.push(build_entry(sq, rook_attacks_per_square, &mut rng)?);
        bishop_entries.push(build_entry(sq, bishop_attacks_per_square, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}
