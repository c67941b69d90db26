// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Runtime SIMD tier selection, probed once and cached.
//!
//! [`std::is_x86_feature_detected!`] itself caches nothing across calls on
//! some targets, and the probe involves a syscall on a few platforms, so the
//! result is latched into an [`AtomicU8`] tri-state the first time
//! [`tier`] runs.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::config;

/// SIMD tier to dispatch to for a given blit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Scalar,
    Sse2,
    Avx2,
}

const UNINIT: u8 = 0;
const SCALAR: u8 = 1;
const SSE2: u8 = 2;
const AVX2: u8 = 3;

static CACHED_TIER: AtomicU8 = AtomicU8::new(UNINIT);

/// Returns the SIMD tier to use, probing the CPU on first call.
///
/// Honors the `no-simd`/`no-avx2`/`no-runtime-cpu-detection` features: with
/// runtime detection disabled, the tier is fixed from
/// `cfg(target_feature = ..)` at compile time instead of probed.
#[must_use]
pub fn tier() -> Tier {
    if !config::simd_enabled() {
        return Tier::Scalar;
    }

    let cached = CACHED_TIER.load(Ordering::Relaxed);
    let resolved = match cached {
        SCALAR => return Tier::Scalar,
        SSE2 => return Tier::Sse2,
        AVX2 => return Tier::Avx2,
        _ => probe(),
    };
    CACHED_TIER.store(
        match resolved {
            Tier::Scalar => SCALAR,
            Tier::Sse2 => SSE2,
            Tier::Avx2 => AVX2,
        },
        Ordering::Relaxed,
    );
    resolved
}

#[cfg(target_arch = "x86_64")]
fn probe() -> Tier {
    if config::runtime_cpu_detection() {
        if config::avx2_enabled() && std::is_x86_feature_detected!("avx2") {
            return Tier::Avx2;
        }
        if std::is_x86_feature_detected!("sse2") {
            return Tier::Sse2;
        }
        return Tier::Scalar;
    }
    if config::avx2_enabled() && cfg!(target_feature = "avx2") {
        return Tier::Avx2;
    }
    if cfg!(target_feature = "sse2") {
        return Tier::Sse2;
    }
    Tier::Scalar
}

#[cfg(not(target_arch = "x86_64"))]
fn probe() -> Tier {
    Tier::Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_is_stable_across_repeated_calls() {
        let first = tier();
        let second = tier();
        assert_eq!(first, second);
    }

    #[test]
    fn scalar_is_always_a_legal_tier() {
        // Every platform must be able to fall back to this; nothing to
        // assert beyond "the enum has the variant and compiles".
        let _ = Tier::Scalar;
    }
}
