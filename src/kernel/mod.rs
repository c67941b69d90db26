// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Per-pixel composition kernels and their SIMD tiers.

pub mod scalar;
pub mod simd;

use crate::color::{Color, Modulation};
use crate::mode::Mode;
use crate::pixel::codec::{load16, load32, load8, store16, store32, store8};

/// Applies one pixel of `mode` at `src`/`dst`, dispatching to the matching
/// scalar kernel. `color` and `modulation` are `None`/default when the blit
/// is unmodulated. This is the reference path every SIMD kernel is checked
/// against; the row driver falls back to it for any run not large enough to
/// vectorize.
///
/// # Safety
/// `src` must be valid for a read, and `dst` for a read-modify-write, of
/// `mode.pixel_size()` bytes.
#[inline]
pub unsafe fn apply_pixel(mode: Mode, src: *const u8, dst: *mut u8, color: Option<Color>, modulation: Modulation) {
    match mode {
        Mode::Copy => {
            let s = load32(src);
            let out = match color {
                Some(c) if modulation.modulated => scalar::copy_modulated(s, c),
                _ => s,
            };
            store32(dst, out);
        }
        Mode::Alpha => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::alpha_modulated(s, d, c),
                _ => scalar::alpha(s, d),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::Pma => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::pma_modulated(s, d, c),
                _ => Some(scalar::pma(s, d)),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::Gamma => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::gamma_modulated(s, d, c),
                _ => scalar::gamma(s, d),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::Pmg => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::pmg_modulated(s, d, c),
                _ => scalar::pmg(s, d),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::Mul => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::mul_modulated(s, d, c),
                _ => scalar::mul(s, d),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::Mug => {
            let s = load32(src);
            let d = load32(dst);
            let out = match color {
                Some(c) if modulation.modulated => scalar::mug_modulated(s, d, c),
                _ => scalar::mug(s, d),
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
        Mode::CopyGamma => {
            let s = load32(src);
            let out = match color {
                Some(c) if modulation.modulated => scalar::copy_gamma_modulated(s, c),
                _ => s,
            };
            store32(dst, out);
        }
        Mode::ColorKey8 => {
            let s = load8(src);
            if modulation.modulated {
                if let Some(out) = scalar::colorkey8(s, modulation.key8) {
                    store8(dst, out);
                }
            } else {
                store8(dst, s);
            }
        }
        Mode::ColorKey16 => {
            let s = load16(src);
            if modulation.modulated {
                if let Some(out) = scalar::colorkey16(s, modulation.key16) {
                    store16(dst, out);
                }
            } else {
                store16(dst, s);
            }
        }
        Mode::Five551 => {
            let s = load16(src);
            if let Some(out) = scalar::five551(s) {
                store16(dst, out);
            }
        }
        Mode::AlphaTest => {
            let s = load32(src);
            if !modulation.modulated {
                store32(dst, s);
                return;
            }
            let out = if modulation.alpha_128 {
                scalar::alpha_test_128(s)
            } else {
                scalar::alpha_test(s, modulation.key8)
            };
            if let Some(out) = out {
                store32(dst, out);
            }
        }
    }
}
