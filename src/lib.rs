// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Correctly-rounded 2D software blitter with runtime SIMD dispatch.
//!
//! [`blit`] composes a rectangular source surface onto a rectangular
//! destination surface under one of twelve [`Mode`]s, each with
//! correctly-rounded arithmetic and, on `x86_64`, a cached choice between
//! scalar, SSE2, and AVX2 inner loops. There is no allocation, no `Result`,
//! and no panic over the documented input domain: out-of-range input is a
//! silent no-op, matching the library's total-function contract.
//!
//! ```
//! use jiao_blit::{blit, Mode};
//!
//! let src = [0xCCu8, 0xBB, 0xAA, 0x80]; // R=0xCC G=0xBB B=0xAA A=0x80, little-endian memory
//! let mut dst = [0x33u8, 0x22, 0x11, 0x7F];
//! unsafe {
//!     blit(
//!         1, 1, 4, src.as_ptr(),
//!         1, 1, 4, dst.as_mut_ptr(),
//!         0, 0, None, Mode::Alpha as i32,
//!     );
//! }
//! assert_eq!(dst, [0x80, 0x6F, 0x5E, 0xBF]);
//! ```

pub mod color;
pub mod config;
pub mod cpu;
pub mod drive;
mod error;
pub mod kernel;
pub mod mode;
pub mod pixel;
pub mod srgb;

pub use color::Color;
pub use cpu::Tier;
pub use mode::Mode;
pub use pixel::surface::{RawSurface, RawSurfaceMut, SurfaceBoundsError, SurfaceView, SurfaceViewMut};

const _: () = {
    assert!(u8::BITS == 8);
    assert!(u16::BITS == 16);
    assert!(u32::BITS == 32);
};

/// Composites `src_w x src_h` pixels from `src` onto `dst` at destination
/// offset `(x, y)`, under `mode`.
///
/// Implements the dispatcher contract: on first call (of any `blit` in the
/// process), probes the CPU and builds the gamma tables; rejects `mode`
/// values outside the twelve defined modes (or gamma modes when compiled
/// out) as a no-op; normalizes `color` into a modulation/colorkey/threshold
/// decision; clips the source rectangle against the destination; resolves a
/// row driver from the (tier, mode, modulated) triple; and runs it. A
/// zero-size call (either surface `0x0`) is a valid warm-up: it still runs
/// the first-call initialization before returning.
///
/// # Safety
/// `src` must be valid for `src_h * src_stride` bytes and `dst` for
/// `dst_h * dst_stride` bytes (when the respective dimension is positive).
/// The library performs no bounds checking beyond the caller-declared
/// dimensions and stride, and source/destination must not overlap (overlap
/// is undefined behavior, matching the composited nature of the blend).
#[allow(clippy::too_many_arguments)]
pub unsafe fn blit(
    src_w: i32,
    src_h: i32,
    src_stride: i32,
    src: *const u8,
    dst_w: i32,
    dst_h: i32,
    dst_stride: i32,
    dst: *mut u8,
    x: i32,
    y: i32,
    color: Option<Color>,
    mode: i32,
) {
    // Step 1: first-call initialization. Cheap on every later call (an
    // atomic load plus, for the gamma tables, a `lazy_static` check).
    srgb::init();
    let tier = cpu::tier();

    // Step 2: reject out-of-range / compiled-out modes.
    let Some(mode) = Mode::from_raw(mode) else {
        error::mode_rejected(mode);
        return;
    };

    // Steps 3-4: normalize the modulation color.
    if color::alpha_test_rejects_all(mode, color) {
        return;
    }
    let modulation = color::normalize(mode, color);

    // Step 5: clip source against destination.
    let x0 = 0.max(-x);
    let x1 = src_w.min(dst_w - x);
    let y0 = 0.max(-y);
    let y1 = src_h.min(dst_h - y);
    if x1 <= x0 || y1 <= y0 {
        error::clip_empty(src_w, src_h, dst_w, dst_h, x, y);
        return;
    }

    // Steps 6-7: resolve and run the row driver.
    error::tier_chosen(mode, tier);
    drive::run(
        mode, tier, color, modulation, src, src_stride, dst, dst_stride, x0, y0, x1, y1, x, y,
    );
}

/// Safe convenience entry point for callers holding `&[u8]`/`&mut [u8]`
/// rather than raw pointers. Bounds are checked against `stride`/`height`
/// when the views were constructed; this delegates to [`blit`] once those
/// checks have already passed.
#[allow(clippy::too_many_arguments)]
pub fn blit_surface(src: &SurfaceView<'_>, dst: &mut SurfaceViewMut<'_>, x: i32, y: i32, color: Option<Color>, mode: i32) {
    let raw_src = src.as_raw();
    let raw_dst = dst.as_raw_mut();
    unsafe {
        blit(
            raw_src.width,
            raw_src.height,
            raw_src.stride,
            raw_src.ptr,
            raw_dst.width,
            raw_dst.height,
            raw_dst.stride,
            raw_dst.ptr,
            x,
            y,
            color,
            mode,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel::codec::{from_bytes, load32};

    /// The dispatcher-level scenarios live in `tests/blit_scenarios.rs` as
    /// integration tests against the public API; this one stays colocated
    /// since it doubles as a sanity check that the crate-root re-exports
    /// used by the doctest above actually resolve.
    #[test]
    fn alpha_single_pixel_matches_worked_example() {
        let mut src = [0u8; 4];
        let mut dst = [0u8; 4];
        unsafe {
            pixel::codec::store32(src.as_mut_ptr(), from_bytes(0xCC, 0xBB, 0xAA, 0x80));
            pixel::codec::store32(dst.as_mut_ptr(), from_bytes(0x33, 0x22, 0x11, 0x7F));
            blit(
                1, 1, 4, src.as_ptr(),
                1, 1, 4, dst.as_mut_ptr(),
                0, 0, None, Mode::Alpha as i32,
            );
            assert_eq!(load32(dst.as_ptr()), 0xBF5E_6F80);
        }
    }
}
