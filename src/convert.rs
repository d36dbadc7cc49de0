//! Conversions from raw PCM scalars to normalized `f64` samples.
//!
//! Unsigned `N`-bit values are mapped linearly from `[0, 2^N]` onto
//! `[-1.0, 1.0]`. Signed `N`-bit values are mapped linearly from
//! `[-2^(N-1), 2^(N-1)]` onto `[-1.0, 1.0]`, so the most negative value maps
//! to exactly `-1.0` and the most positive value lands just short of `1.0`.

use symphonia::core::sample::{i24, u24};

const TWO_POW_7: f64 = 128.0;
const TWO_POW_8: f64 = 256.0;
const TWO_POW_15: f64 = 32_768.0;
const TWO_POW_16: f64 = 65_536.0;
const TWO_POW_23: f64 = 8_388_608.0;
const TWO_POW_24: f64 = 16_777_216.0;
const TWO_POW_31: f64 = 2_147_483_648.0;
const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

#[inline]
fn unsigned_to_normal(value: f64, range: f64) -> f64 {
    normalized((value / range) * 2.0 - 1.0)
}

#[inline]
fn signed_to_normal(value: f64, half_range: f64) -> f64 {
    normalized(value / half_range)
}

#[inline]
fn normalized(r: f64) -> f64 {
    debug_assert!(r >= -1.0, "{} >= -1.0", r);
    debug_assert!(r <= 1.0, "{} <= 1.0", r);
    r
}

/// Convert a PCM sample in `u8` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_u8_to_f64(s: u8) -> f64 {
    unsigned_to_normal(f64::from(s), TWO_POW_8)
}

/// Convert a PCM sample in `u16` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_u16_to_f64(s: u16) -> f64 {
    unsigned_to_normal(f64::from(s), TWO_POW_16)
}

/// Convert a PCM sample in `u24` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_u24_to_f64(s: u24) -> f64 {
    // Only the low 24 bits are significant.
    unsigned_to_normal(f64::from(s.0 & 0x00ff_ffff), TWO_POW_24)
}

/// Convert a PCM sample in `u32` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_u32_to_f64(s: u32) -> f64 {
    unsigned_to_normal(f64::from(s), TWO_POW_32)
}

/// Convert a PCM sample in `u64` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_u64_to_f64(s: u64) -> f64 {
    unsigned_to_normal(s as f64, TWO_POW_64)
}

/// Convert a PCM sample in `i8` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_i8_to_f64(s: i8) -> f64 {
    signed_to_normal(f64::from(s), TWO_POW_7)
}

/// Convert a PCM sample in `i16` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_i16_to_f64(s: i16) -> f64 {
    signed_to_normal(f64::from(s), TWO_POW_15)
}

/// Convert a PCM sample in `i24` format to `f64` format in the
/// range `[-1.0, 1.0]`. The inner value must already be sign-extended.
#[inline]
pub fn pcm_i24_to_f64(s: i24) -> f64 {
    signed_to_normal(f64::from(s.0), TWO_POW_23)
}

/// Convert a PCM sample in `i32` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_i32_to_f64(s: i32) -> f64 {
    signed_to_normal(f64::from(s), TWO_POW_31)
}

/// Convert a PCM sample in `i64` format to `f64` format in the
/// range `[-1.0, 1.0]`.
#[inline]
pub fn pcm_i64_to_f64(s: i64) -> f64 {
    signed_to_normal(s as f64, TWO_POW_63)
}

/// Sign-extend the low 24 bits of `raw` into an `i24`.
#[inline]
pub fn sign_extend_i24(raw: u32) -> i24 {
    i24(((raw << 8) as i32) >> 8)
}
