//! Popcount kernels over packed `u64` blocks
//!
//! The Sokal-Michener similarity of two bitstrings is the fraction of bit
//! positions where they agree:
//!
//! ```text
//! sm(a, b) = popcount(!(a ^ b)) / width
//! ```
//!
//! # Architecture Selection
//!
//! | Platform       | Path                     | Instruction        |
//! |----------------|--------------------------|--------------------|
//! | x86_64+POPCNT  | `matching_bits_popcnt`   | `popcnt r64`       |
//! | aarch64        | scalar (LLVM lowers it)  | `cnt` + `addv`     |
//! | other          | scalar                   | bit-twiddling      |

/// Bits per packed block
pub const BLOCK_BITS: usize = 64;

/// Number of blocks needed to hold `bits` bits
#[inline]
pub const fn blocks_for(bits: usize) -> usize {
    bits.div_ceil(BLOCK_BITS)
}

/// Mask selecting the used bits of the last block of a `bits`-wide vector
#[inline]
pub const fn tail_mask(bits: usize) -> u64 {
    match bits % BLOCK_BITS {
        0 => u64::MAX,
        r => (1u64 << r) - 1,
    }
}

// ============================================================================
// x86_64 POPCNT (runtime feature detection)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "popcnt")]
#[inline]
unsafe fn matching_bits_popcnt(a: &[u64], b: &[u64], last_mask: u64) -> u32 {
    // count_ones lowers to a single popcnt inside this feature region
    matching_bits_scalar(a, b, last_mask)
}

// ============================================================================
// Scalar fallback
// ============================================================================

#[inline(always)]
fn matching_bits_scalar(a: &[u64], b: &[u64], last_mask: u64) -> u32 {
    let n = a.len();
    if n == 0 {
        return 0;
    }

    let mut count = 0u32;
    for i in 0..n - 1 {
        count += (!(a[i] ^ b[i])).count_ones();
    }
    count + (!(a[n - 1] ^ b[n - 1]) & last_mask).count_ones()
}

// ============================================================================
// Public dispatch functions
// ============================================================================

/// Count bit positions (within the first `bits` bits) where `a` and `b` agree
///
/// Both 0-0 and 1-1 positions count as matches.
#[inline]
pub fn matching_bits(a: &[u64], b: &[u64], bits: usize) -> u32 {
    debug_assert_eq!(a.len(), b.len(), "Block count mismatch");
    debug_assert_eq!(a.len(), blocks_for(bits), "Width does not match block count");

    let last_mask = tail_mask(bits);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("popcnt") {
            return unsafe { matching_bits_popcnt(a, b, last_mask) };
        }
    }

    matching_bits_scalar(a, b, last_mask)
}

/// Sokal-Michener similarity in `[0, 1]` over the first `bits` bits
#[inline]
pub fn sokal_michener(a: &[u64], b: &[u64], bits: usize) -> f32 {
    if bits == 0 {
        return 0.0;
    }
    matching_bits(a, b, bits) as f32 / bits as f32
}
