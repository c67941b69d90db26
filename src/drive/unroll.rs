// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Small-width specialization: for row widths at or below [`crate::config::UNROLL`],
//! route through a width-monomorphized instantiation of the chunk
//! decomposition instead of the generic runtime loop, so the compiler sees
//! the pixel count as a compile-time constant and can unroll/inline freely.
//! Above the limit (or when `UNROLL` is 0), the generic loop runs directly.

use crate::color::{Color, Modulation};
use crate::cpu::Tier;
use crate::mode::Mode;

use super::run_generic;

/// Processes one row of `width` pixels, routing through the matching
/// width-specialized arm when `width <= mode.unroll_limit()`.
///
/// # Safety
/// `src`/`dst` must be valid for `width` pixels of `mode.pixel_size()` each.
pub unsafe fn run_row(
    mode: Mode,
    tier: Tier,
    color: Option<Color>,
    modulation: Modulation,
    src: *const u8,
    dst: *mut u8,
    width: i32,
) {
    if width <= 0 {
        return;
    }
    if mode.unroll_limit() > 0 && width <= mode.unroll_limit() {
        dispatch_unrolled(mode, tier, color, modulation, src, dst, width);
    } else {
        run_generic(mode, tier, color, modulation, src, dst, width);
    }
}

/// A single width arm, monomorphized so `W` is a compile-time constant in
/// the chunk-decomposition loops of [`run_generic`].
#[inline(always)]
unsafe fn run_fixed_width<const W: i32>(
    mode: Mode,
    tier: Tier,
    color: Option<Color>,
    modulation: Modulation,
    src: *const u8,
    dst: *mut u8,
) {
    run_generic(mode, tier, color, modulation, src, dst, W);
}

macro_rules! unrolled_widths {
    ($mode:expr, $tier:expr, $color:expr, $modulation:expr, $src:expr, $dst:expr, $width:expr, [$($w:literal),* $(,)?]) => {
        match $width {
            $($w => run_fixed_width::<$w>($mode, $tier, $color, $modulation, $src, $dst),)*
            _ => run_generic($mode, $tier, $color, $modulation, $src, $dst, $width),
        }
    };
}

#[inline]
unsafe fn dispatch_unrolled(
    mode: Mode,
    tier: Tier,
    color: Option<Color>,
    modulation: Modulation,
    src: *const u8,
    dst: *mut u8,
    width: i32,
) {
    unrolled_widths!(
        mode, tier, color, modulation, src, dst, width,
        [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16,
         17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32]
    )
}
