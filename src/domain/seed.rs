//! Deterministic per-fixture seeds.
//!
//! Every random draw in a run derives from the base seed and the fixture
//! id, so results never depend on evaluation order or thread scheduling.

/// Purpose salt for bootstrap replicates.
pub const BOOTSTRAP_SALT: u64 = 0x6f75_7430_3562_6f6f;

/// Purpose salt for synthetic odds noise.
pub const ODDS_SALT: u64 = 0x6f64_6473_6e6f_6973;

/// Seed for `purpose` draws on `fixture_id` under `base_seed`.
pub fn fixture_seed(base_seed: u64, fixture_id: &str, salt: u64) -> u64 {
    splitmix64(base_seed ^ fnv1a(fixture_id.as_bytes()) ^ salt)
}

/// 64-bit FNV-1a hash.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
