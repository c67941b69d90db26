// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Row driver: walks the clipped source/destination rectangle by stride,
//! decomposing each row into the largest pixel runs the active SIMD tier
//! supports before falling back to the scalar kernel for the remainder.

pub mod unroll;

use crate::color::{Color, Modulation};
use crate::cpu::Tier;
#[cfg(target_arch = "x86_64")]
use crate::kernel::simd::{avx2, sse2};
use crate::kernel::{apply_pixel, simd};
use crate::mode::Mode;

/// Walks rows `y0..y1` of the clipped source subrectangle, writing to the
/// destination offset by `(x, y)`.
///
/// # Safety
/// `src_base`/`dst_base` must be valid for every pixel address the walk
/// touches, i.e. `[0, x1) x [0, y1)` scaled by the respective strides plus
/// the `(x, y)` destination offset.
#[allow(clippy::too_many_arguments)]
pub unsafe fn run(
    mode: Mode,
    tier: Tier,
    color: Option<Color>,
    modulation: Modulation,
    src_base: *const u8,
    src_stride: i32,
    dst_base: *mut u8,
    dst_stride: i32,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    x: i32,
    y: i32,
) {
    let width = x1 - x0;
    let height = y1 - y0;
    if width <= 0 || height <= 0 {
        return;
    }

    let pixel_size = mode.pixel_size() as isize;
    let plain_copy = mode.is_plain_copy_when_unmodulated() && !modulation.modulated;
    let row_bytes = width as usize * pixel_size as usize;

    for row in 0..height {
        let sy = y0 + row;
        let dy = sy + y;
        let src_row = src_base.offset(sy as isize * src_stride as isize + x0 as isize * pixel_size);
        let dst_row =
            dst_base.offset(dy as isize * dst_stride as isize + (x0 + x) as isize * pixel_size);

        if plain_copy {
            std::ptr::copy_nonoverlapping(src_row, dst_row, row_bytes);
        } else {
            unroll::run_row(mode, tier, color, modulation, src_row, dst_row, width);
        }
    }
}

#[must_use]
const fn sse2_width(pixel_size: i32) -> i32 {
    match pixel_size {
        1 => simd::SSE2_WIDTH_8,
        2 => simd::SSE2_WIDTH_16,
        _ => simd::SSE2_WIDTH_32,
    }
}

#[must_use]
const fn avx2_width(pixel_size: i32) -> i32 {
    match pixel_size {
        1 => simd::AVX2_WIDTH_8,
        2 => simd::AVX2_WIDTH_16,
        _ => simd::AVX2_WIDTH_32,
    }
}

/// Consumes `width` pixels starting at `src`/`dst`, using the largest
/// available run size first.
///
/// # Safety
/// Same as [`run`], restricted to `width` pixels at `src`/`dst`.
pub(crate) unsafe fn run_generic(
    mode: Mode,
    tier: Tier,
    color: Option<Color>,
    modulation: Modulation,
    src: *const u8,
    dst: *mut u8,
    width: i32,
) {
    let pixel_size = mode.pixel_size();
    let modulated = modulation.modulated;
    let mut remaining = width;
    let mut s = src;
    let mut d = dst;

    if tier == Tier::Avx2 && mode.allow_avx2(modulated) {
        let w = avx2_width(pixel_size);
        while remaining >= w {
            simd_block_avx2(mode, color, modulation, s, d);
            s = s.add((w * pixel_size) as usize);
            d = d.add((w * pixel_size) as usize);
            remaining -= w;
        }
    }
    if matches!(tier, Tier::Avx2 | Tier::Sse2) && mode.allow_sse2(modulated) {
        let w = sse2_width(pixel_size);
        while remaining >= w {
            simd_block_sse2(mode, color, modulation, s, d);
            s = s.add((w * pixel_size) as usize);
            d = d.add((w * pixel_size) as usize);
            remaining -= w;
        }
    }
    while remaining > 0 {
        apply_pixel(mode, s, d, color, modulation);
        s = s.add(pixel_size as usize);
        d = d.add(pixel_size as usize);
        remaining -= 1;
    }
}

/// Dispatches one SSE2 block for modes where [`Mode::allow_sse2`] is true.
///
/// `color` is only read by modes that [`Mode::uses_modulation`] when
/// `modulation.modulated` is set; `color::normalize` never sets `modulated`
/// without also supplying a `color`, so the `expect` on those arms never
/// fires.
///
/// # Safety
/// `src`/`dst` must be valid for the block width implied by `mode`, and the
/// CPU must support SSE2.
#[cfg(target_arch = "x86_64")]
unsafe fn simd_block_sse2(mode: Mode, color: Option<Color>, modulation: Modulation, src: *const u8, dst: *mut u8) {
    let modulated = modulation.modulated;
    match mode {
        Mode::Copy => {
            sse2::copy_modulated_4(src, dst, color.expect("modulated COPY carries a color"));
        }
        Mode::Alpha if modulated => {
            sse2::alpha_modulated_4(src, dst, color.expect("modulated ALPHA carries a color"));
        }
        Mode::Alpha => sse2::alpha_4(src, dst),
        Mode::Pma if modulated => {
            sse2::pma_modulated_4(src, dst, color.expect("modulated PMA carries a color"));
        }
        Mode::Pma => sse2::pma_4(src, dst),
        Mode::Mul if modulated => {
            sse2::mul_modulated_4(src, dst, color.expect("modulated MUL carries a color"));
        }
        Mode::Mul => sse2::mul_4(src, dst),
        Mode::Gamma if modulated => {
            sse2::gamma_modulated_4(src, dst, color.expect("modulated GAMMA carries a color"));
        }
        Mode::Gamma => sse2::gamma_4(src, dst),
        Mode::Pmg if modulated => {
            sse2::pmg_modulated_4(src, dst, color.expect("modulated PMG carries a color"));
        }
        Mode::Pmg => sse2::pmg_4(src, dst),
        Mode::Mug if modulated => {
            sse2::mug_modulated_4(src, dst, color.expect("modulated MUG carries a color"));
        }
        Mode::Mug => sse2::mug_4(src, dst),
        Mode::CopyGamma => {
            sse2::copy_gamma_modulated_4(src, dst, color.expect("modulated CPYG carries a color"));
        }
        Mode::ColorKey8 => sse2::colorkey8_16(src, dst, modulation.key8),
        Mode::ColorKey16 => sse2::colorkey16_8(src, dst, modulation.key16),
        Mode::Five551 => sse2::five551_8(src, dst),
        Mode::AlphaTest => {
            let threshold = if modulation.alpha_128 { 128 } else { modulation.key8 };
            sse2::alpha_test_4(src, dst, threshold);
        }
    }
}

/// Dispatches one AVX2 block. See [`simd_block_sse2`].
///
/// # Safety
/// Same as [`simd_block_sse2`], at the AVX2 block width and feature.
#[cfg(target_arch = "x86_64")]
unsafe fn simd_block_avx2(mode: Mode, color: Option<Color>, modulation: Modulation, src: *const u8, dst: *mut u8) {
    let modulated = modulation.modulated;
    match mode {
        Mode::Copy => {
            avx2::copy_modulated_8(src, dst, color.expect("modulated COPY carries a color"));
        }
        Mode::Alpha if modulated => {
            avx2::alpha_modulated_8(src, dst, color.expect("modulated ALPHA carries a color"));
        }
        Mode::Alpha => avx2::alpha_8(src, dst),
        Mode::Pma if modulated => {
            avx2::pma_modulated_8(src, dst, color.expect("modulated PMA carries a color"));
        }
        Mode::Pma => avx2::pma_8(src, dst),
        Mode::Mul if modulated => {
            avx2::mul_modulated_8(src, dst, color.expect("modulated MUL carries a color"));
        }
        Mode::Mul => avx2::mul_8(src, dst),
        Mode::Gamma if modulated => {
            avx2::gamma_modulated_8(src, dst, color.expect("modulated GAMMA carries a color"));
        }
        Mode::Gamma => avx2::gamma_8(src, dst),
        Mode::Pmg if modulated => {
            avx2::pmg_modulated_8(src, dst, color.expect("modulated PMG carries a color"));
        }
        Mode::Pmg => avx2::pmg_8(src, dst),
        Mode::Mug if modulated => {
            avx2::mug_modulated_8(src, dst, color.expect("modulated MUG carries a color"));
        }
        Mode::Mug => avx2::mug_8(src, dst),
        Mode::CopyGamma => {
            avx2::copy_gamma_modulated_8(src, dst, color.expect("modulated CPYG carries a color"));
        }
        Mode::ColorKey8 => avx2::colorkey8_32(src, dst, modulation.key8),
        Mode::ColorKey16 => avx2::colorkey16_16(src, dst, modulation.key16),
        Mode::Five551 => avx2::five551_16(src, dst),
        Mode::AlphaTest => {
            let threshold = if modulation.alpha_128 { 128 } else { modulation.key8 };
            avx2::alpha_test_8(src, dst, threshold);
        }
    }
}

/// `cpu::tier` never resolves to `Sse2`/`Avx2` off x86_64, so these are
/// unreachable; they exist only so [`run_generic`] compiles on every target.
#[cfg(not(target_arch = "x86_64"))]
unsafe fn simd_block_sse2(
    _mode: Mode,
    _color: Option<Color>,
    _modulation: Modulation,
    _src: *const u8,
    _dst: *mut u8,
) {
    unreachable!("no SSE2 tier off x86_64")
}

#[cfg(not(target_arch = "x86_64"))]
unsafe fn simd_block_avx2(
    _mode: Mode,
    _color: Option<Color>,
    _modulation: Modulation,
    _src: *const u8,
    _dst: *mut u8,
) {
    unreachable!("no AVX2 tier off x86_64")
}
