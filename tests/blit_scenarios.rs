// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! End-to-end `blit()` scenarios driven entirely through the public API.

use jiao_blit::pixel::codec::{from_bytes, load16, load32, store16, store32};
use jiao_blit::{blit, Mode};

#[test]
fn alpha_single_pixel_matches_worked_example() {
    // Dispatch decisions (tier chosen, mode rejected, empty clip) are only
    // visible through `log`; initialize a subscriber so a developer running
    // this suite with `RUST_LOG=trace` can see them.
    let _ = env_logger::try_init();

    let mut src = [0u8; 4];
    let mut dst = [0u8; 4];
    unsafe {
        store32(src.as_mut_ptr(), from_bytes(0xCC, 0xBB, 0xAA, 0x80));
        store32(dst.as_mut_ptr(), from_bytes(0x33, 0x22, 0x11, 0x7F));
        blit(
            1, 1, 4, src.as_ptr(),
            1, 1, 4, dst.as_mut_ptr(),
            0, 0, None, Mode::Alpha as i32,
        );
        // Sa=128: output alpha = 128 + round(127*127/255) = 191 = 0xBF.
        assert_eq!(load32(dst.as_ptr()), 0xBF5E_6F80);
    }
}

#[test]
fn copy_of_overhanging_square_only_touches_visible_pixel() {
    // 2x2 src placed at (-1,-1) over a 4x4 dst: only the source's
    // bottom-right pixel (1,1) is visible, landing on dst (0,0).
    let mut src = [0u8; 2 * 2 * 4];
    let mut dst = [0u8; 4 * 4 * 4];
    unsafe {
        store32(src.as_mut_ptr().add(3 * 4), 0x1122_3344);
        blit(
            2, 2, 8, src.as_ptr(),
            4, 4, 16, dst.as_mut_ptr(),
            -1, -1, None, Mode::Copy as i32,
        );
        assert_eq!(load32(dst.as_ptr()), 0x1122_3344);
        assert!(dst[4..].iter().all(|&b| b == 0));
    }
}

#[test]
fn colorkey8_run_of_eight() {
    let mut src = [7u8, 9, 7, 255, 7, 7, 9, 9];
    let mut dst = [1u8, 2, 3, 4, 5, 6, 7, 8];
    unsafe {
        blit(
            8, 1, 8, src.as_mut_ptr(),
            8, 1, 8, dst.as_mut_ptr(),
            0, 0, Some([7.0, 0.0, 0.0, 0.0]), Mode::ColorKey8 as i32,
        );
    }
    assert_eq!(dst, [1, 9, 3, 255, 5, 6, 9, 9]);
}

#[test]
fn five551_two_pixels() {
    let mut src = [0u8; 4];
    let mut dst = [0u8; 4];
    unsafe {
        store16(src.as_mut_ptr(), 0x8001);
        store16(src.as_mut_ptr().add(2), 0x7FFE);
        store16(dst.as_mut_ptr(), 0x1234);
        store16(dst.as_mut_ptr().add(2), 0x5678);
        blit(
            2, 1, 4, src.as_ptr(),
            2, 1, 4, dst.as_mut_ptr(),
            0, 0, None, Mode::Five551 as i32,
        );
        assert_eq!(load16(dst.as_ptr()), 0x8001);
        assert_eq!(load16(dst.as_ptr().add(2)), 0x5678);
    }
}

#[test]
fn alpha_test_threshold_128() {
    let mut src = [0u8; 12];
    let mut dst = [0u8; 12];
    unsafe {
        store32(src.as_mut_ptr(), from_bytes(0, 0, 0, 127));
        store32(src.as_mut_ptr().add(4), from_bytes(0, 0, 0, 128));
        store32(src.as_mut_ptr().add(8), from_bytes(0, 0, 0, 129));
        blit(
            3, 1, 12, src.as_ptr(),
            3, 1, 12, dst.as_mut_ptr(),
            0, 0, Some([128.0, 0.0, 0.0, 0.0]), Mode::AlphaTest as i32,
        );
        assert_eq!(load32(dst.as_ptr()), 0);
        assert_eq!(load32(dst.as_ptr().add(4)), from_bytes(0, 0, 0, 128));
        assert_eq!(load32(dst.as_ptr().add(8)), from_bytes(0, 0, 0, 129));
    }
}

#[test]
fn empty_clip_leaves_destination_untouched() {
    let src = [0u8; 4];
    let mut dst = [0xABu8; 4];
    unsafe {
        blit(
            1, 1, 4, src.as_ptr(),
            1, 1, 4, dst.as_mut_ptr(),
            10, 10, None, Mode::Copy as i32,
        );
    }
    assert_eq!(dst, [0xAB; 4]);
}

#[test]
fn rejected_mode_leaves_destination_untouched() {
    let src = [0xFFu8; 4];
    let mut dst = [0x00u8; 4];
    unsafe {
        blit(1, 1, 4, src.as_ptr(), 1, 1, 4, dst.as_mut_ptr(), 0, 0, None, 99);
    }
    assert_eq!(dst, [0x00; 4]);
}

#[test]
fn warm_up_call_with_zero_dimensions_is_a_no_op() {
    let src = [0u8; 0];
    let mut dst = [0u8; 0];
    unsafe {
        blit(0, 0, 0, src.as_ptr(), 0, 0, 0, dst.as_mut_ptr(), 0, 0, None, Mode::Copy as i32);
    }
}
