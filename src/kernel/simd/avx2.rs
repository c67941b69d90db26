// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! AVX2 kernels, twice the width of their [`super::sse2`] counterparts.
//! Same division of labor: unmodulated `ALPHA`/`MUL`/`PMA` and
//! colorkey/FIVE551/ALPHATEST run packed 256-bit integer arithmetic across
//! the whole block; the modulated float blends (`COPY`, `ALPHA`, `MUL`,
//! `PMA`) run the same per-pixel packed-`f32` math as their `sse2`
//! counterparts (four channels is only a 128-bit vector, so there is no
//! wider single-pixel float op to reach for) over twice as many pixels;
//! gamma modes fall back to the scalar kernel per lane, same as `sse2`.

use core::arch::x86_64::*;

use crate::color::Color;
use crate::kernel::scalar;
use crate::pixel::codec::{from_bytes, get_byte, load32, store32};

#[inline]
fn float2byte(x: f32) -> u8 {
    (x + 0.5) as i32 as u8
}

#[inline]
fn clamp0_255(x: f32) -> f32 {
    if !(x >= 0.0) {
        0.0
    } else if x > 255.0 {
        255.0
    } else {
        x
    }
}

/// Loads the four logical channels of a decoded pixel into one `__m128`,
/// lane `i` holding channel `i`.
#[inline]
unsafe fn channels_ps(p: u32) -> __m128 {
    _mm_set_ps(get_byte(p, 3) as f32, get_byte(p, 2) as f32, get_byte(p, 1) as f32, get_byte(p, 0) as f32)
}

#[inline]
unsafe fn extract_ps(v: __m128) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    _mm_storeu_ps(out.as_mut_ptr(), v);
    out
}

#[inline]
unsafe fn select_bytes(mask: __m256i, a: __m256i, b: __m256i) -> __m256i {
    _mm256_or_si256(_mm256_and_si256(mask, a), _mm256_andnot_si256(mask, b))
}

#[inline]
unsafe fn div255_round_epi16(n: __m256i) -> __m256i {
    let n = _mm256_add_epi16(n, _mm256_set1_epi16(128));
    _mm256_srli_epi16(_mm256_add_epi16(n, _mm256_srli_epi16(n, 8)), 8)
}

/// Processes 8 pixels (32 bytes) of unmodulated `ALPHA`.
///
/// # Safety
/// `src`/`dst` must each be valid for a 32-byte read (`dst` also for a
/// write), and the CPU must support AVX2.
#[target_feature(enable = "avx2")]
pub unsafe fn alpha_8(src: *const u8, dst: *mut u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let zero = _mm256_setzero_si256();

    // _mm256_unpacklo/hi_epi8 operate within each 128-bit lane, so this
    // widens 4 pixels per lane exactly like the SSE2 version does for the
    // whole register.
    let s_lo = _mm256_unpacklo_epi8(sv, zero);
    let s_hi = _mm256_unpackhi_epi8(sv, zero);
    let d_lo = _mm256_unpacklo_epi8(dv, zero);
    let d_hi = _mm256_unpackhi_epi8(dv, zero);

    let a_lo = _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(s_lo, 0xFF), 0xFF);
    let a_hi = _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(s_hi, 0xFF), 0xFF);
    let c_lo = _mm256_sub_epi16(_mm256_set1_epi16(255), a_lo);
    let c_hi = _mm256_sub_epi16(_mm256_set1_epi16(255), a_hi);

    let alpha_lane = _mm256_set_epi16(-1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0);
    let s_lo_mul = select_bytes(alpha_lane, _mm256_set1_epi16(255), s_lo);
    let s_hi_mul = select_bytes(alpha_lane, _mm256_set1_epi16(255), s_hi);

    let prod_lo = _mm256_add_epi16(_mm256_mullo_epi16(s_lo_mul, a_lo), _mm256_mullo_epi16(d_lo, c_lo));
    let prod_hi = _mm256_add_epi16(_mm256_mullo_epi16(s_hi_mul, a_hi), _mm256_mullo_epi16(d_hi, c_hi));
    let blended = _mm256_packus_epi16(div255_round_epi16(prod_lo), div255_round_epi16(prod_hi));

    let alpha_byte = _mm256_and_si256(sv, _mm256_set1_epi32(0xFF00_0000u32 as i32));
    let alpha_byte_mask = _mm256_cmpeq_epi32(alpha_byte, _mm256_setzero_si256());
    let result = select_bytes(alpha_byte_mask, dv, blended);
    _mm256_storeu_si256(dst.cast(), result);

    _mm256_zeroupper();
}

/// Processes 8 pixels (32 bytes) of unmodulated `MUL`.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn mul_8(src: *const u8, dst: *mut u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let zero = _mm256_setzero_si256();

    let s_lo = _mm256_unpacklo_epi8(sv, zero);
    let s_hi = _mm256_unpackhi_epi8(sv, zero);
    let d_lo = _mm256_unpacklo_epi8(dv, zero);
    let d_hi = _mm256_unpackhi_epi8(dv, zero);

    let prod_lo = _mm256_mullo_epi16(s_lo, d_lo);
    let prod_hi = _mm256_mullo_epi16(s_hi, d_hi);
    let blended = _mm256_packus_epi16(div255_round_epi16(prod_lo), div255_round_epi16(prod_hi));

    let mask_d0 = _mm256_cmpeq_epi32(dv, zero);
    let step1 = select_bytes(mask_d0, dv, blended);
    let mask_s0 = _mm256_cmpeq_epi32(sv, zero);
    let step2 = select_bytes(mask_s0, zero, step1);
    let mask_sallones = _mm256_cmpeq_epi32(sv, _mm256_set1_epi32(-1));
    let result = select_bytes(mask_sallones, dv, step2);
    _mm256_storeu_si256(dst.cast(), result);

    _mm256_zeroupper();
}

/// Processes 8 pixels (32 bytes) of unmodulated `PMA`. Same structure as
/// [`alpha_8`] without the alpha-lane swap; see `sse2::pma_4`.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn pma_8(src: *const u8, dst: *mut u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let zero = _mm256_setzero_si256();

    let s_lo = _mm256_unpacklo_epi8(sv, zero);
    let s_hi = _mm256_unpackhi_epi8(sv, zero);
    let d_lo = _mm256_unpacklo_epi8(dv, zero);
    let d_hi = _mm256_unpackhi_epi8(dv, zero);

    let a_lo = _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(s_lo, 0xFF), 0xFF);
    let a_hi = _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(s_hi, 0xFF), 0xFF);
    let c_lo = _mm256_sub_epi16(_mm256_set1_epi16(255), a_lo);
    let c_hi = _mm256_sub_epi16(_mm256_set1_epi16(255), a_hi);

    let t_lo = div255_round_epi16(_mm256_mullo_epi16(d_lo, c_lo));
    let t_hi = div255_round_epi16(_mm256_mullo_epi16(d_hi, c_hi));
    let blended = _mm256_packus_epi16(_mm256_add_epi16(t_lo, s_lo), _mm256_add_epi16(t_hi, s_hi));

    let alpha_byte = _mm256_and_si256(sv, _mm256_set1_epi32(0xFF00_0000u32 as i32));
    let mask_opaque = _mm256_cmpeq_epi32(alpha_byte, _mm256_set1_epi32(0xFF00_0000u32 as i32));
    let mask_d0 = _mm256_cmpeq_epi32(dv, zero);
    let mask_early = _mm256_or_si256(mask_opaque, mask_d0);
    let result = select_bytes(mask_early, sv, blended);
    _mm256_storeu_si256(dst.cast(), result);

    _mm256_zeroupper();
}

/// Processes 8 pixels of modulated `COPY`. 256-bit registers have no
/// wider single-pixel float layout to offer over `sse2::copy_modulated_4`
/// (4 channels fit a 128-bit vector), so this loops the same `__m128` math
/// over twice as many pixels.
///
/// # Safety
/// Same as [`alpha_8`], plus every 4-byte-stride pointer in between.
#[target_feature(enable = "avx2")]
pub unsafe fn copy_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    let color_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let prod = extract_ps(_mm_mul_ps(color_v, channels_ps(s)));
        store32(
            dst.add(i * 4),
            from_bytes(
                float2byte(clamp0_255(prod[0])),
                float2byte(clamp0_255(prod[1])),
                float2byte(clamp0_255(prod[2])),
                float2byte(clamp0_255(prod[3])),
            ),
        );
    }
}

/// Processes 8 pixels of modulated `ALPHA`. See [`copy_modulated_8`].
///
/// # Safety
/// Same as [`copy_modulated_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn alpha_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    if color[3] == 0.0 {
        return;
    }
    let m_v = _mm_set_ps(1.0, color[2], color[1], color[0]);
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        if s <= 0x00FF_FFFF {
            continue;
        }
        let d = load32(dst.add(i * 4));
        let sa = get_byte(s, 3) as f32;
        let c_v = _mm_set1_ps(color[3] * sa);
        let sv = _mm_set_ps(255.0, get_byte(s, 2) as f32, get_byte(s, 1) as f32, get_byte(s, 0) as f32);
        let dv = channels_ps(d);
        let prod = _mm_mul_ps(_mm_mul_ps(sv, m_v), c_v);
        let rest = _mm_mul_ps(dv, _mm_sub_ps(_mm_set1_ps(255.0), c_v));
        let scaled = extract_ps(_mm_mul_ps(_mm_add_ps(prod, rest), _mm_set1_ps(1.0 / 255.0)));
        store32(
            dst.add(i * 4),
            from_bytes(float2byte(scaled[0]), float2byte(scaled[1]), float2byte(scaled[2]), float2byte(scaled[3])),
        );
    }
}

/// Processes 8 pixels of modulated `MUL`. See [`copy_modulated_8`].
///
/// # Safety
/// Same as [`copy_modulated_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn mul_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    let m_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        if s == 0 {
            store32(dst.add(i * 4), 0);
            continue;
        }
        let d = load32(dst.add(i * 4));
        if d == 0 {
            continue;
        }
        let prod = _mm_mul_ps(_mm_mul_ps(channels_ps(s), channels_ps(d)), m_v);
        let scaled = extract_ps(_mm_mul_ps(prod, _mm_set1_ps(1.0 / 255.0)));
        store32(
            dst.add(i * 4),
            from_bytes(
                float2byte(clamp0_255(scaled[0])),
                float2byte(clamp0_255(scaled[1])),
                float2byte(clamp0_255(scaled[2])),
                float2byte(clamp0_255(scaled[3])),
            ),
        );
    }
}

/// Processes 8 pixels of modulated `PMA`. See [`copy_modulated_8`].
///
/// # Safety
/// Same as [`copy_modulated_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn pma_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    let m_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        if s == 0 {
            continue;
        }
        let d = load32(dst.add(i * 4));
        let sa = get_byte(s, 3) as f32;
        let c2 = color[3] * sa;
        let term1 = _mm_mul_ps(channels_ps(s), m_v);
        let term2 = _mm_mul_ps(_mm_mul_ps(channels_ps(d), _mm_set1_ps(255.0 - c2)), _mm_set1_ps(1.0 / 255.0));
        let sum = extract_ps(_mm_add_ps(term1, term2));
        store32(
            dst.add(i * 4),
            from_bytes(
                float2byte(clamp0_255(sum[0])),
                float2byte(clamp0_255(sum[1])),
                float2byte(clamp0_255(sum[2])),
                float2byte(clamp0_255(sum[3])),
            ),
        );
    }
}

/// Processes 32 pixels (32 bytes) of modulated `COLORKEY8`.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn colorkey8_32(src: *const u8, dst: *mut u8, key: u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let mask_eq = _mm256_cmpeq_epi8(sv, _mm256_set1_epi8(key as i8));
    let result = select_bytes(mask_eq, dv, sv);
    _mm256_storeu_si256(dst.cast(), result);
    _mm256_zeroupper();
}

/// Processes 16 pixels (32 bytes) of modulated `COLORKEY16`.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn colorkey16_16(src: *const u8, dst: *mut u8, key: u16) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let mask_eq = _mm256_cmpeq_epi16(sv, _mm256_set1_epi16(key as i16));
    let result = select_bytes(mask_eq, dv, sv);
    _mm256_storeu_si256(dst.cast(), result);
    _mm256_zeroupper();
}

/// Processes 16 pixels (32 bytes) of `FIVE551`.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn five551_16(src: *const u8, dst: *mut u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let top_bit = _mm256_set1_epi16(0x8000u16 as i16);
    let mask_copy = _mm256_cmpeq_epi16(_mm256_and_si256(sv, top_bit), top_bit);
    let result = select_bytes(mask_copy, sv, dv);
    _mm256_storeu_si256(dst.cast(), result);
    _mm256_zeroupper();
}

/// Processes 8 pixels (32 bytes) of modulated `ALPHATEST` at an arbitrary
/// threshold.
///
/// # Safety
/// Same as [`alpha_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn alpha_test_8(src: *const u8, dst: *mut u8, threshold: u8) {
    let sv = _mm256_loadu_si256(src.cast());
    let dv = _mm256_loadu_si256(dst.cast());
    let bias = _mm256_set1_epi32(i32::MIN);
    let sv_biased = _mm256_xor_si256(sv, bias);
    let threshold_dword = (threshold as i32) << 24;
    let t_biased = _mm256_xor_si256(_mm256_set1_epi32(threshold_dword), bias);
    let mask_lt = _mm256_cmpgt_epi32(t_biased, sv_biased);
    let mask_keep = _mm256_xor_si256(mask_lt, _mm256_set1_epi32(-1));
    let result = select_bytes(mask_keep, sv, dv);
    _mm256_storeu_si256(dst.cast(), result);
    _mm256_zeroupper();
}

/// `GAMMA`, unmodulated, 8 pixels: scalar per lane, same rationale as
/// [`super::sse2::gamma_4`].
///
/// # Safety
/// Same as [`alpha_8`], plus every 4-pixel-stride pointer in between.
#[target_feature(enable = "avx2")]
pub unsafe fn gamma_8(src: *const u8, dst: *mut u8) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::gamma(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `GAMMA`, modulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn gamma_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::gamma_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `PMG`, unmodulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn pmg_8(src: *const u8, dst: *mut u8) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::pmg(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `PMG`, modulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn pmg_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::pmg_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `MUG`, unmodulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn mug_8(src: *const u8, dst: *mut u8) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::mug(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `MUG`, modulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn mug_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::mug_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `CPYG`, modulated, 8 pixels: scalar per lane. See [`gamma_8`].
///
/// # Safety
/// Same as [`gamma_8`].
#[target_feature(enable = "avx2")]
pub unsafe fn copy_gamma_modulated_8(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..8 {
        let s = load32(src.add(i * 4));
        let out = scalar::copy_gamma_modulated(s, color);
        store32(dst.add(i * 4), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::codec::{load16, load32, load8, store16, store32, store8};

    /// Same generator as the sse2 test module's; duplicated rather than
    /// shared since the two modules' test blocks run at different widths
    /// and are otherwise independent.
    fn lcg_bytes(seed: u32, n: usize) -> Vec<u8> {
        let mut state = seed | 1;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn alpha_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(1, 32);
        let mut d_block = lcg_bytes(2, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            alpha_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::alpha(sp, dp) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn mul_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(3, 32);
        let mut d_block = lcg_bytes(4, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            mul_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::mul(sp, dp) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn colorkey8_32_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let mut s = lcg_bytes(5, 32);
        s[3] = 42;
        s[17] = 42;
        let mut d_block = lcg_bytes(6, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            colorkey8_32(s.as_ptr(), d_block.as_mut_ptr(), 42);
            for i in 0..32 {
                if let Some(out) = scalar::colorkey8(load8(s.as_ptr().add(i)), 42) {
                    store8(d_scalar.as_mut_ptr().add(i), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn colorkey16_16_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(7, 32);
        let mut d_block = lcg_bytes(8, 32);
        let mut d_scalar = d_block.clone();
        let key = load16(s.as_ptr());
        unsafe {
            colorkey16_16(s.as_ptr(), d_block.as_mut_ptr(), key);
            for i in 0..16 {
                if let Some(out) = scalar::colorkey16(load16(s.as_ptr().add(i * 2)), key) {
                    store16(d_scalar.as_mut_ptr().add(i * 2), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn five551_16_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(9, 32);
        let mut d_block = lcg_bytes(10, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            five551_16(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..16 {
                if let Some(out) = scalar::five551(load16(s.as_ptr().add(i * 2))) {
                    store16(d_scalar.as_mut_ptr().add(i * 2), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn alpha_test_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(11, 32);
        let mut d_block = lcg_bytes(12, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            alpha_test_8(s.as_ptr(), d_block.as_mut_ptr(), 128);
            for i in 0..8 {
                if let Some(out) = scalar::alpha_test(load32(s.as_ptr().add(i * 4)), 128) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn gamma_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(13, 32);
        let mut d_block = lcg_bytes(14, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            gamma_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::gamma(sp, dp) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn pma_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(15, 32);
        let mut d_block = lcg_bytes(16, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            pma_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                store32(d_scalar.as_mut_ptr().add(i * 4), scalar::pma(sp, dp));
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn copy_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.75f32, 1.25, 0.5, 1.0];
        let s = lcg_bytes(17, 32);
        let mut d_block = lcg_bytes(18, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            copy_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                store32(d_scalar.as_mut_ptr().add(i * 4), scalar::copy_modulated(sp, color));
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn alpha_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.3f32, 0.9, 1.1, 0.6];
        let s = lcg_bytes(19, 32);
        let mut d_block = lcg_bytes(20, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            alpha_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::alpha_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn mul_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.6f32, 0.4, 0.9, 0.8];
        let s = lcg_bytes(21, 32);
        let mut d_block = lcg_bytes(22, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            mul_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::mul_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn pma_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [1.2f32, 0.8, 0.3, 0.7];
        let s = lcg_bytes(23, 32);
        let mut d_block = lcg_bytes(24, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            pma_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::pma_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn gamma_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.5f32, 0.9, 1.1, 0.4];
        let s = lcg_bytes(25, 32);
        let mut d_block = lcg_bytes(26, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            gamma_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::gamma_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn pmg_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(27, 32);
        let mut d_block = lcg_bytes(28, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            pmg_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::pmg(sp, dp) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn pmg_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.85f32, 0.35, 0.65, 0.55];
        let s = lcg_bytes(29, 32);
        let mut d_block = lcg_bytes(30, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            pmg_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::pmg_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn mug_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let s = lcg_bytes(31, 32);
        let mut d_block = lcg_bytes(32, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            mug_8(s.as_ptr(), d_block.as_mut_ptr());
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::mug(sp, dp) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn mug_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [0.2f32, 0.7, 1.3, 0.45];
        let s = lcg_bytes(33, 32);
        let mut d_block = lcg_bytes(34, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            mug_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                let dp = load32(d_scalar.as_ptr().add(i * 4));
                if let Some(out) = scalar::mug_modulated(sp, dp, color) {
                    store32(d_scalar.as_mut_ptr().add(i * 4), out);
                }
            }
        }
        assert_eq!(d_block, d_scalar);
    }

    #[test]
    fn copy_gamma_modulated_8_matches_scalar_per_pixel() {
        if !std::is_x86_feature_detected!("avx2") {
            return;
        }
        let color: Color = [1.1f32, 0.95, 0.2, 0.6];
        let s = lcg_bytes(35, 32);
        let mut d_block = lcg_bytes(36, 32);
        let mut d_scalar = d_block.clone();
        unsafe {
            copy_gamma_modulated_8(s.as_ptr(), d_block.as_mut_ptr(), color);
            for i in 0..8 {
                let sp = load32(s.as_ptr().add(i * 4));
                store32(d_scalar.as_mut_ptr().add(i * 4), scalar::copy_gamma_modulated(sp, color));
            }
        }
        assert_eq!(d_block, d_scalar);
    }
}
