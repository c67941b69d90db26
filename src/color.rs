// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Normalization of the caller-supplied `color` argument: the
//! "is this blit actually modulated" decision, and the shared colorkey /
//! alpha-test threshold derivation, including the fractional-threshold
//! round-up rule (37.5 rejects alpha 37 but passes alpha 38).

use crate::mode::Mode;

/// The modulation color, in `R, G, B, A` order regardless of memory
/// endianness.
pub type Color = [f32; 4];

/// Result of normalizing a caller-supplied `color` argument against a mode:
/// whether the blit is modulated, and (for ALPHATEST) whether the
/// alpha-128 fast path applies.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modulation {
    pub modulated: bool,
    pub alpha_128: bool,
    /// 8-bit colorkey/threshold, valid when `modulated` and mode is
    /// COLORKEY8 or ALPHATEST.
    pub key8: u8,
    /// 16-bit colorkey, valid when `modulated` and mode is COLORKEY16.
    pub key16: u16,
}

impl Modulation {
    const NONE: Self = Self {
        modulated: false,
        alpha_128: false,
        key8: 0,
        key16: 0,
    };
}

/// Decides whether `color` has a non-neutral effect for `mode`:
///
/// - `color == None` is never modulated.
/// - COLORKEY8/16: modulated iff `color[0]` is in range; out-of-range (or
///   NaN) means "no key / unconditional copy".
/// - FIVE551: never modulated (ignores color entirely).
/// - ALPHATEST: modulated iff the threshold is in `[0, 255]`; the
///   `alpha_128` fast path additionally requires the threshold to lie in the
///   half-open interval `(127, 128]`. A threshold `> 255` means "no-op",
///   signaled to the caller via `reject_all`.
/// - All other modes: modulated unless `color == {1,1,1,1}` exactly.
#[must_use]
pub fn normalize(mode: Mode, color: Option<Color>) -> Modulation {
    let Some(color) = color else {
        return Modulation::NONE;
    };

    match mode {
        Mode::ColorKey8 => {
            if (0.0..=255.0).contains(&color[0]) {
                let key16 = color[0] as i32 as u16;
                Modulation {
                    modulated: true,
                    alpha_128: false,
                    key8: key16 as u8,
                    key16,
                }
            } else {
                Modulation::NONE
            }
        }
        Mode::ColorKey16 => {
            if (0.0..=65535.0).contains(&color[0]) {
                let key16 = color[0] as i32 as u16;
                Modulation {
                    modulated: true,
                    alpha_128: false,
                    key8: 0,
                    key16,
                }
            } else {
                Modulation::NONE
            }
        }
        Mode::Five551 => Modulation::NONE,
        Mode::AlphaTest => {
            let modulated = (0.0..=255.0).contains(&color[0]);
            let alpha_128 = color[0] > 127.0 && color[0] <= 128.0;
            // Round the truncated threshold up whenever the float value is
            // not itself an exact integer, so e.g. 37.5 rejects alpha 37 and
            // passes alpha 38.
            let mut key8 = color[0] as i32 as u8;
            if modulated && f32::from(key8) != color[0] {
                key8 = key8.wrapping_add(1);
            }
            Modulation {
                modulated,
                alpha_128,
                key8,
                key16: 0,
            }
        }
        _ => Modulation {
            modulated: color != [1.0, 1.0, 1.0, 1.0],
            alpha_128: false,
            key8: 0,
            key16: 0,
        },
    }
}

/// A threshold `> 255` for ALPHATEST means every pixel is rejected (a no-op),
/// distinct from "unmodulated" (threshold absent or `<= 0`, meaning every
/// pixel passes).
#[must_use]
pub fn alpha_test_rejects_all(mode: Mode, color: Option<Color>) -> bool {
    mode == Mode::AlphaTest && color.is_some_and(|c| c[0] > 255.0)
}
