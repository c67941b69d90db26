// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! Diagnostic tracing for the dispatcher. The blitter has no fallible
//! operation over its documented input domain (see [`crate::mode::Mode::from_raw`]
//! and the dispatcher's clip step), so there is no error type here — just
//! `log` calls an embedding application can turn on to observe dispatch
//! decisions it could not otherwise see (mode rejected, tier chosen, a blit
//! collapsing to a no-op).

use crate::cpu::Tier;
use crate::mode::Mode;

#[inline]
pub fn mode_rejected(raw: i32) {
    log::debug!("blit: mode {raw} is out of range or compiled out, skipping");
}

#[inline]
pub fn clip_empty(src_w: i32, src_h: i32, dst_w: i32, dst_h: i32, x: i32, y: i32) {
    log::trace!(
        "blit: clipped rect is empty (src {src_w}x{src_h}, dst {dst_w}x{dst_h}, offset {x},{y}), skipping"
    );
}

#[inline]
pub fn tier_chosen(mode: Mode, tier: Tier) {
    log::trace!("blit: mode {mode:?} dispatched at tier {tier:?}");
}
