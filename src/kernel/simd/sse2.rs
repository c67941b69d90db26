// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! SSE2 kernels. Each processes one fixed-size block and is byte-identical
//! to running [`crate::kernel::scalar`] once per pixel in that block.
//!
//! Unmodulated `ALPHA`/`MUL`/`PMA` and colorkey/`FIVE551`/`ALPHATEST` run
//! packed integer arithmetic across the whole 4-pixel block. The modulated
//! blends (`COPY`, `ALPHA`, `MUL`, `PMA`) use the same per-channel `f32` math
//! as the scalar kernel — `color` is a per-blit constant, not a per-pixel
//! value, so each pixel's four channels become one `__m128` of packed
//! floats and the blend runs as a handful of `mulps`/`addps` in the same
//! order the scalar function uses, keeping every lane bit-identical. Gamma
//! modes (`GAMMA`, `PMG`, `MUG`, `CPYG`) are the exception: the per-lane
//! sRGB table lookup has no cheap SIMD gather, so those blocks just call
//! the scalar kernel once per lane.

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
unsafe fn select_bytes(mask: __m128i, a: __m128i, b: __m128i) -> __m128i {
    _mm_or_si128(_mm_and_si128(mask, a), _mm_andnot_si128(mask, b))
}

#[inline]
unsafe fn div255_round_epi16(n: __m128i) -> __m128i {
    let n = _mm_add_epi16(n, _mm_set1_epi16(128));
    _mm_srli_epi16(_mm_add_epi16(n, _mm_srli_epi16(n, 8)), 8)
}

/// Processes 4 pixels (16 bytes) of unmodulated `ALPHA`.
///
/// # Safety
/// `src`/`dst` must each be valid for a 16-byte read (`dst` also for a
/// write), and the CPU must support SSE2.
#[target_feature(enable = "sse2")]
pub unsafe fn alpha_4(src: *const u8, dst: *mut u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let zero = _mm_setzero_si128();

    let s_lo = _mm_unpacklo_epi8(sv, zero);
    let s_hi = _mm_unpackhi_epi8(sv, zero);
    let d_lo = _mm_unpacklo_epi8(dv, zero);
    let d_hi = _mm_unpackhi_epi8(dv, zero);

    // Broadcast each pixel's alpha (lane 3 of its 4-lane group) across all
    // 4 lanes of that group.
    let a_lo = _mm_shufflehi_epi16(_mm_shufflelo_epi16(s_lo, 0xFF), 0xFF);
    let a_hi = _mm_shufflehi_epi16(_mm_shufflelo_epi16(s_hi, 0xFF), 0xFF);
    let c_lo = _mm_sub_epi16(_mm_set1_epi16(255), a_lo);
    let c_hi = _mm_sub_epi16(_mm_set1_epi16(255), a_hi);

    // The alpha channel itself blends as if its own sample were 255
    // (cla(255, Da, Sa)), not its true value; swap lanes 3 and 7 to 255
    // before the multiply.
    let alpha_lane = _mm_set_epi16(-1, 0, 0, 0, -1, 0, 0, 0);
    let s_lo_mul = select_bytes(alpha_lane, _mm_set1_epi16(255), s_lo);
    let s_hi_mul = select_bytes(alpha_lane, _mm_set1_epi16(255), s_hi);

    let prod_lo = _mm_add_epi16(_mm_mullo_epi16(s_lo_mul, a_lo), _mm_mullo_epi16(d_lo, c_lo));
    let prod_hi = _mm_add_epi16(_mm_mullo_epi16(s_hi_mul, a_hi), _mm_mullo_epi16(d_hi, c_hi));
    let blended = _mm_packus_epi16(div255_round_epi16(prod_lo), div255_round_epi16(prod_hi));

    // True where the source's alpha byte (the top byte of the pixel) is zero.
    let alpha_byte = _mm_and_si128(sv, _mm_set1_epi32(0xFF00_0000u32 as i32));
    let alpha_byte_mask = _mm_cmpeq_epi32(alpha_byte, _mm_setzero_si128());
    let result = select_bytes(alpha_byte_mask, dv, blended);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 4 pixels (16 bytes) of unmodulated `MUL`.
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn mul_4(src: *const u8, dst: *mut u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let zero = _mm_setzero_si128();

    let s_lo = _mm_unpacklo_epi8(sv, zero);
    let s_hi = _mm_unpackhi_epi8(sv, zero);
    let d_lo = _mm_unpacklo_epi8(dv, zero);
    let d_hi = _mm_unpackhi_epi8(dv, zero);

    let prod_lo = _mm_mullo_epi16(s_lo, d_lo);
    let prod_hi = _mm_mullo_epi16(s_hi, d_hi);
    let blended = _mm_packus_epi16(div255_round_epi16(prod_lo), div255_round_epi16(prod_hi));

    let mask_d0 = _mm_cmpeq_epi32(dv, zero);
    let step1 = select_bytes(mask_d0, dv, blended);
    let mask_s0 = _mm_cmpeq_epi32(sv, zero);
    let step2 = select_bytes(mask_s0, zero, step1);
    let mask_sallones = _mm_cmpeq_epi32(sv, _mm_set1_epi32(-1));
    let result = select_bytes(mask_sallones, dv, step2);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 4 pixels (16 bytes) of unmodulated `PMA`. Same broadcast-alpha
/// structure as [`alpha_4`], but without the alpha-lane swap: `PMA` applies
/// `clp` to every channel including alpha, using the source alpha for all
/// four.
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn pma_4(src: *const u8, dst: *mut u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let zero = _mm_setzero_si128();

    let s_lo = _mm_unpacklo_epi8(sv, zero);
    let s_hi = _mm_unpackhi_epi8(sv, zero);
    let d_lo = _mm_unpacklo_epi8(dv, zero);
    let d_hi = _mm_unpackhi_epi8(dv, zero);

    let a_lo = _mm_shufflehi_epi16(_mm_shufflelo_epi16(s_lo, 0xFF), 0xFF);
    let a_hi = _mm_shufflehi_epi16(_mm_shufflelo_epi16(s_hi, 0xFF), 0xFF);
    let c_lo = _mm_sub_epi16(_mm_set1_epi16(255), a_lo);
    let c_hi = _mm_sub_epi16(_mm_set1_epi16(255), a_hi);

    let t_lo = div255_round_epi16(_mm_mullo_epi16(d_lo, c_lo));
    let t_hi = div255_round_epi16(_mm_mullo_epi16(d_hi, c_hi));
    // `_mm_packus_epi16` saturates to 0..255, matching `saturating_add_u32`.
    let blended = _mm_packus_epi16(_mm_add_epi16(t_lo, s_lo), _mm_add_epi16(t_hi, s_hi));

    let alpha_byte = _mm_and_si128(sv, _mm_set1_epi32(0xFF00_0000u32 as i32));
    let mask_opaque = _mm_cmpeq_epi32(alpha_byte, _mm_set1_epi32(0xFF00_0000u32 as i32));
    let mask_d0 = _mm_cmpeq_epi32(dv, zero);
    let mask_early = _mm_or_si128(mask_opaque, mask_d0);
    let result = select_bytes(mask_early, sv, blended);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 4 pixels of modulated `COPY`: `color` is constant for the
/// whole blit, so each pixel's 4 channels become one `__m128` of packed
/// `f32` and the scale-and-round runs as packed float ops.
///
/// # Safety
/// Same as [`alpha_4`], plus every 4-byte-stride pointer in between.
#[target_feature(enable = "sse2")]
pub unsafe fn copy_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    let color_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..4 {
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

/// Processes 4 pixels of modulated `ALPHA`, mirroring
/// `crate::kernel::scalar::clam`'s operation order per channel.
///
/// # Safety
/// Same as [`copy_modulated_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn alpha_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    if color[3] == 0.0 {
        return;
    }
    let m_v = _mm_set_ps(1.0, color[2], color[1], color[0]);
    for i in 0..4 {
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

/// Processes 4 pixels of modulated `MUL`.
///
/// # Safety
/// Same as [`copy_modulated_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn mul_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    let m_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..4 {
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

/// Processes 4 pixels of modulated `PMA`.
///
/// # Safety
/// Same as [`copy_modulated_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn pma_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    let m_v = _mm_set_ps(color[3], color[2], color[1], color[0]);
    for i in 0..4 {
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

/// Processes 16 pixels (16 bytes) of modulated `COLORKEY8`.
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn colorkey8_16(src: *const u8, dst: *mut u8, key: u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let mask_eq = _mm_cmpeq_epi8(sv, _mm_set1_epi8(key as i8));
    let result = select_bytes(mask_eq, dv, sv);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 8 pixels (16 bytes) of modulated `COLORKEY16`.
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn colorkey16_8(src: *const u8, dst: *mut u8, key: u16) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let mask_eq = _mm_cmpeq_epi16(sv, _mm_set1_epi16(key as i16));
    let result = select_bytes(mask_eq, dv, sv);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 8 pixels (16 bytes) of `FIVE551`.
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn five551_8(src: *const u8, dst: *mut u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let top_bit = _mm_set1_epi16(0x8000u16 as i16);
    let mask_copy = _mm_cmpeq_epi16(_mm_and_si128(sv, top_bit), top_bit);
    let result = select_bytes(mask_copy, sv, dv);
    _mm_storeu_si128(dst.cast(), result);
}

/// Processes 4 pixels (16 bytes) of modulated `ALPHATEST` at an arbitrary
/// threshold (128 is just the caller passing `128`).
///
/// # Safety
/// Same as [`alpha_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn alpha_test_4(src: *const u8, dst: *mut u8, threshold: u8) {
    let sv = _mm_loadu_si128(src.cast());
    let dv = _mm_loadu_si128(dst.cast());
    let bias = _mm_set1_epi32(i32::MIN);
    let sv_biased = _mm_xor_si128(sv, bias);
    let threshold_dword = (threshold as i32) << 24;
    let t_biased = _mm_xor_si128(_mm_set1_epi32(threshold_dword), bias);
    let mask_lt = _mm_cmpgt_epi32(t_biased, sv_biased); // true where S < T
    let mask_keep = _mm_xor_si128(mask_lt, _mm_set1_epi32(-1)); // S >= T
    let result = select_bytes(mask_keep, sv, dv);
    _mm_storeu_si128(dst.cast(), result);
}

/// `GAMMA`, unmodulated, 4 pixels: no vectorized gamma table lookup exists,
/// so this calls the scalar kernel once per pixel.
///
/// # Safety
/// Same as [`alpha_4`], plus every 4-pixel-stride pointer in between.
#[target_feature(enable = "sse2")]
pub unsafe fn gamma_4(src: *const u8, dst: *mut u8) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::gamma(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `GAMMA`, modulated, 4 pixels: scalar per lane, same rationale as
/// [`gamma_4`].
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn gamma_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::gamma_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `PMG`, unmodulated, 4 pixels: scalar per lane, same rationale as
/// [`gamma_4`].
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn pmg_4(src: *const u8, dst: *mut u8) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::pmg(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `PMG`, modulated, 4 pixels.
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn pmg_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::pmg_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `MUG`, unmodulated, 4 pixels: scalar per lane, same rationale as
/// [`gamma_4`].
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn mug_4(src: *const u8, dst: *mut u8) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::mug(s, d) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `MUG`, modulated, 4 pixels.
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn mug_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        let d = load32(dst.add(i * 4));
        if let Some(out) = scalar::mug_modulated(s, d, color) {
            store32(dst.add(i * 4), out);
        }
    }
}

/// `CPYG`, modulated, 4 pixels: scalar per lane, same rationale as
/// [`gamma_4`]. Unmodulated `CPYG` is a plain byte copy and never reaches
/// the row driver's SIMD dispatch.
///
/// # Safety
/// Same as [`gamma_4`].
#[target_feature(enable = "sse2")]
pub unsafe fn copy_gamma_modulated_4(src: *const u8, dst: *mut u8, color: Color) {
    for i in 0..4 {
        let s = load32(src.add(i * 4));
        store32(dst.add(i * 4), scalar::copy_gamma_modulated(s, color));
    }
}
