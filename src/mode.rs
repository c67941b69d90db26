// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! The twelve composition modes and the per-mode predicates (pixel size,
//! SIMD tier vetoes, unroll limit) that drive kernel and row-driver
//! selection.

use crate::config;

/// One of the twelve composition rules. Discriminants are part of the public
/// ABI and must never change.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Copy = 0,
    Alpha = 1,
    Pma = 2,
    Gamma = 3,
    Pmg = 4,
    ColorKey8 = 5,
    ColorKey16 = 6,
    Five551 = 7,
    Mul = 8,
    Mug = 9,
    AlphaTest = 10,
    CopyGamma = 11,
}

impl Mode {
    /// Maps a raw `i32` mode value onto a [`Mode`], rejecting anything
    /// outside `COPY..=CPYG` or a gamma mode when gamma support is compiled
    /// out, both of which the dispatcher treats as a no-op.
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        let mode = match raw {
            0 => Self::Copy,
            1 => Self::Alpha,
            2 => Self::Pma,
            3 => Self::Gamma,
            4 => Self::Pmg,
            5 => Self::ColorKey8,
            6 => Self::ColorKey16,
            7 => Self::Five551,
            8 => Self::Mul,
            9 => Self::Mug,
            10 => Self::AlphaTest,
            11 => Self::CopyGamma,
            _ => return None,
        };
        if mode.is_gamma() && !config::gamma_enabled() {
            return None;
        }
        Some(mode)
    }

    /// Bytes per pixel for this mode.
    #[must_use]
    pub const fn pixel_size(self) -> i32 {
        match self {
            Self::ColorKey8 => 1,
            Self::ColorKey16 | Self::Five551 => 2,
            _ => 4,
        }
    }

    /// Whether the RGB channels of this mode are sRGB-encoded in memory
    /// (alpha is always linear).
    #[must_use]
    pub const fn is_gamma(self) -> bool {
        matches!(self, Self::Gamma | Self::Pmg | Self::Mug | Self::CopyGamma)
    }

    /// Whether this mode ever reads the per-blit modulation color at all
    /// (FIVE551 ignores it unconditionally).
    #[must_use]
    pub const fn uses_modulation(self) -> bool {
        !matches!(self, Self::Five551)
    }

    /// Per-mode veto of the SSE2 tier: whether a genuine vectorized kernel
    /// exists for this `(mode, modulated)` pair in
    /// [`crate::kernel::simd::sse2`]. Every `(mode, modulated)` pair the row
    /// driver can actually reach has one (unmodulated COPY/COLORKEY8/
    /// COLORKEY16/ALPHATEST/CPYG never reach this check at all, since the
    /// row driver routes them to a direct byte copy first), so this is
    /// unconditional; the parameter is kept so a future mode without full
    /// coverage has somewhere to plug in a veto without changing the call
    /// sites.
    #[must_use]
    #[allow(unused_variables)]
    pub const fn allow_sse2(self, modulated: bool) -> bool {
        true
    }

    /// Per-mode veto of the AVX2 tier. See [`Self::allow_sse2`]; AVX2 has the
    /// same kernel coverage as SSE2 in this crate.
    #[must_use]
    pub const fn allow_avx2(self, modulated: bool) -> bool {
        self.allow_sse2(modulated)
    }

    /// Maximum row width that gets a fully unrolled straight-line case.
    /// All modes currently share the crate-wide [`config::UNROLL`] constant;
    /// the per-mode override point exists so a future mode could opt for a
    /// narrower limit without touching the row driver.
    #[must_use]
    pub const fn unroll_limit(self) -> i32 {
        config::UNROLL
    }

    /// Whether an unmodulated blit in this mode reduces to a verbatim byte
    /// copy of the row, letting the row driver skip the kernel entirely and
    /// call `ptr::copy_nonoverlapping`. FIVE551 is excluded: it always
    /// applies its high-bit test, modulated or not.
    #[must_use]
    pub const fn is_plain_copy_when_unmodulated(self) -> bool {
        matches!(
            self,
            Self::Copy | Self::ColorKey8 | Self::ColorKey16 | Self::AlphaTest | Self::CopyGamma
        )
    }
}
