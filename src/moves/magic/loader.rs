//! Process-wide magic table instance.
//!
//! Table construction runs a randomized magic-number search, so the tables
//! are built once from a fixed seed and memoized; callers (movegen, search,
//! eval, tests) get back a cheap clone of the cached instance.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;

const MAGIC_SEED: u64 = 0xC0FF_EE15_B00B_1E5;

pub fn load_magic_tables() -> MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES
        .get_or_init(|| {
            generate_magic_tables(MagicTableSeed::Fixed(MAGIC_SEED))
                .expect("magic table generation must succeed for a fixed seed")
        })
        .clone()
}
