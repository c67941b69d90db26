// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

//! sRGB <-> linear conversion: a lazily built 256-entry forward table and a
//! 4097-entry reverse table, plus four selectable polynomial/rational
//! approximations for builds that trade a little accuracy for no table
//! memory and no gather-style lookups in vectorized code.
//!
//! The reference functions are:
//!
//! ```text
//! linear2srgb(c) = if c <= 0.0031308 { 12.92 * c } else { 1.055 * c.powf(1.0/2.4) - 0.055 }
//! srgb2linear(c)  = if c <= 0.04045  { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
//! ```
//!
//! The table builder never calls `powf`: each successive table entry is
//! derived from the previous one by multiplying by a truncated Taylor
//! expansion of the local exponent step, which is accurate enough to make
//! every 256^3 `(src, dst, alpha)` combination round-trip identically
//! whether the host computes in `f64` or x87 80-bit extended precision.

use lazy_static::lazy_static;

const STEPS: usize = 4096;

struct Tables {
    srgb2linear: [f64; 256],
    linear2srgb_start: [u8; STEPS + 1],
    linear2srgb_threshold: [f64; STEPS + 1],
}

/// Returns an approximation of `(((x+y)/255+0.055)/(x/255+0.055))^2.4 - 1`,
/// accurate to a couple of ULP for the `y` in `{0.5, 1.0}` the table builder
/// calls it with.
fn gamma_scale_factor(x: f64, y: f64) -> f64 {
    let t = y / (x + 14.025); // 255 * 0.055
    let z = t / (2.0 + t); // log(1+t) = log((1+z)/(1-z))
    let z2 = z * z;
    let mut z = 2.0 * z * (1.0 + z2 * (1.0 / 3.0 + z2 * (0.2 + z2 * (1.0 / 7.0 + z2 / 9.0))));
    // x^2.4 = (x^1.2)^2
    z *= 1.2;
    let z = z * (1.0
        + 0.5 * z * (1.0
            + z / 3.0 * (1.0
                + 0.25 * z * (1.0
                    + 0.2 * z * (1.0
                        + z / 6.0 * (1.0 + z / 7.0 * (1.0 + 0.125 * z)))))));
    z * (2.0 + z)
}

fn build_tables() -> Tables {
    let mut srgb2linear = [0.0f64; 256];
    let mut linear2srgb_start = [0u8; STEPS + 1];
    let mut linear2srgb_threshold = [0.0f64; STEPS + 1];

    let mut j: usize = 0;
    let mut x_next = 0.0033465357638991608_f64; // srgb2linear(11/255)
    for i in 0..256_i32 {
        let (x, y);
        if i < 11 {
            const C: f64 = 3294.6; // 255 * 12.92
            x = f64::from(i) / C;
            y = if i == 10 {
                0.003188300904430532 // srgb2linear(10.5/255)
            } else {
                (f64::from(i) + 0.5) / C
            };
        } else {
            if i == 255 {
                x_next = 1.0;
            }
            x = x_next;
            y = x + x * gamma_scale_factor(f64::from(i), 0.5);
            x_next += x_next * gamma_scale_factor(f64::from(i), 1.0);
        }
        srgb2linear[i as usize] = x;
        let m = (y * STEPS as f64) as i64;
        let m = m.clamp(0, STEPS as i64) as usize;
        while j <= m {
            linear2srgb_start[j] = i as u8;
            linear2srgb_threshold[j] = y;
            j += 1;
        }
    }

    Tables {
        srgb2linear,
        linear2srgb_start,
        linear2srgb_threshold,
    }
}

lazy_static! {
    static ref TABLES: Tables = build_tables();
}

/// Forces construction of the gamma tables. Exposed so callers that care
/// about predictable latency can warm the cache ahead of the first blit.
pub fn init() {
    lazy_static::initialize(&TABLES);
}

#[inline]
#[must_use]
pub fn clamp0_1(x: f64) -> f64 {
    if !(x >= 0.0) {
        0.0
    } else if x > 1.0 {
        1.0
    } else {
        x
    }
}

#[cfg(not(any(
    feature = "gamma-approx-0",
    feature = "gamma-approx-1",
    feature = "gamma-approx-2",
    feature = "gamma-approx-3"
)))]
mod tabled {
    use super::TABLES;

    #[inline]
    #[must_use]
    pub fn srgb2linear(x: u8) -> f64 {
        TABLES.srgb2linear[x as usize]
    }

    #[inline]
    #[must_use]
    pub fn linear2srgb(x: f64) -> u8 {
        let id = (x * 4096.0) as usize;
        let id = id.min(super::STEPS);
        TABLES.linear2srgb_start[id] + u8::from(x >= TABLES.linear2srgb_threshold[id])
    }
}

#[cfg(feature = "gamma-approx-0")]
mod approx0 {
    //! Rational 4/2 (srgb2linear) / rational 4/4 (linear2srgb). Most
    //! accurate approximation tier.
    const S2L_P1: f64 = 3.504336698800e-04;
    const S2L_P2: f64 = 1.375386972964e-05;
    const S2L_P3: f64 = 8.945664356306e-07;
    const S2L_P4: f64 = 3.622358507480e-09;
    const S2L_Q1: f64 = 9.18394954e-02;
    const S2L_Q2: f64 = 1.03252838e-04;

    const L2S_P1: f64 = 2.1703371664100814e+03;
    const L2S_P2: f64 = 5.4589682843458904e+06;
    const L2S_P3: f64 = 1.4517409768971977e+08;
    const L2S_P4: f64 = 2.3353720686367840e+08;
    const L2S_Q1: f64 = 1.2498314123010732e+03;
    const L2S_Q2: f64 = 1.3553779734820861e+05;
    const L2S_Q3: f64 = 9.8910205374230759e+05;
    const L2S_Q4: f64 = 3.8066791818310641e+05;

    #[inline]
    #[must_use]
    pub fn srgb2linear(x: u8) -> f64 {
        let y = f64::from(x);
        let p = y * (S2L_P1 + y * (S2L_P2 + y * (S2L_P3 + y * S2L_P4)));
        let q = 1.0 + y * (S2L_Q1 + y * S2L_Q2);
        p / q
    }

    #[inline]
    #[must_use]
    pub fn linear2srgb(x: f64) -> u8 {
        let p = x * (L2S_P1 + x * (L2S_P2 + x * (L2S_P3 + x * L2S_P4)));
        let q = 1.0 + x * (L2S_Q1 + x * (L2S_Q2 + x * (L2S_Q3 + x * L2S_Q4)));
        ((p / q) + 0.5) as i32 as u8
    }
}

#[cfg(feature = "gamma-approx-1")]
mod approx1 {
    //! 5th degree polynomial (srgb2linear) / rational 3/2 (linear2srgb).
    const S2L_C1: f64 = 2.169755680e-04;
    const S2L_C2: f64 = 5.821137890e-06;
    const S2L_C3: f64 = 6.077312940e-08;
    const S2L_C4: f64 = -1.554613300e-10;
    const S2L_C5: f64 = 2.001283376e-13;

    const L2S_P1: f64 = 3.8763097396320477e+03;
    const L2S_P2: f64 = 4.9039460967320607e+04;
    const L2S_P3: f64 = 1.7125066590537979e+04;
    const L2S_Q1: f64 = 7.0676114602914467e+01;
    const L2S_Q2: f64 = 2.0299383558332335e+02;

    #[inline]
    #[must_use]
    pub fn srgb2linear(x: u8) -> f64 {
        let y = f64::from(x);
        y * (S2L_C1 + y * (S2L_C2 + y * (S2L_C3 + y * (S2L_C4 + y * S2L_C5))))
    }

    #[inline]
    #[must_use]
    pub fn linear2srgb(x: f64) -> u8 {
        let p = x * (L2S_P1 + x * (L2S_P2 + x * L2S_P3));
        let q = 1.0 + x * (L2S_Q1 + x * L2S_Q2);
        ((p / q) + 0.5) as i32 as u8
    }
}

#[cfg(feature = "gamma-approx-2")]
mod approx2 {
    //! 3rd degree polynomial (srgb2linear) / rational 2/2 (linear2srgb).
    const S2L_C1: f64 = 7.1150847263545382e-05;
    const S2L_C2: f64 = 1.0264384548986879e-05;
    const S2L_C3: f64 = 1.8961933413237702e-08;

    const L2S_P1: f64 = 3.3262919020957675e+03;
    const L2S_P2: f64 = 1.6696757946598922e+04;
    const L2S_Q1: f64 = 4.2616518139966423e+01;
    const L2S_Q2: f64 = 3.4905245972561779e+01;

    #[inline]
    #[must_use]
    pub fn srgb2linear(x: u8) -> f64 {
        let y = f64::from(x);
        y * (S2L_C1 + y * (S2L_C2 + y * S2L_C3))
    }

    #[inline]
    #[must_use]
    pub fn linear2srgb(x: f64) -> u8 {
        let p = x * (L2S_P1 + x * L2S_P2);
        let q = 1.0 + x * (L2S_Q1 + x * L2S_Q2);
        ((p / q) + 0.5) as i32 as u8
    }
}

#[cfg(feature = "gamma-approx-3")]
mod approx3 {
    //! 3rd degree polynomial on [0;255] / [0;1]. Coarsest, cheapest tier.
    const S2L_C1: f64 = 7.1150847263545382e-05;
    const S2L_C2: f64 = 1.0264384548986879e-05;
    const S2L_C3: f64 = 1.8961933413237702e-08;

    const L2S_C1: f64 = 9.4081185756021148e+02;
    const L2S_C2: f64 = -1.4968549011399689e+03;
    const L2S_C3: f64 = 8.1104304357975741e+02;

    #[inline]
    #[must_use]
    pub fn srgb2linear(x: u8) -> f64 {
        let y = f64::from(x);
        y * (S2L_C1 + y * (S2L_C2 + y * S2L_C3))
    }

    #[inline]
    #[must_use]
    pub fn linear2srgb(x: f64) -> u8 {
        let v = x * (L2S_C1 + x * (L2S_C2 + x * L2S_C3));
        (v + 0.5) as i32 as u8
    }
}

#[cfg(not(any(
    feature = "gamma-approx-0",
    feature = "gamma-approx-1",
    feature = "gamma-approx-2",
    feature = "gamma-approx-3"
)))]
pub use tabled::{linear2srgb, srgb2linear};

#[cfg(feature = "gamma-approx-0")]
pub use approx0::{linear2srgb, srgb2linear};

#[cfg(feature = "gamma-approx-1")]
pub use approx1::{linear2srgb, srgb2linear};

#[cfg(feature = "gamma-approx-2")]
pub use approx2::{linear2srgb, srgb2linear};

#[cfg(feature = "gamma-approx-3")]
pub use approx3::{linear2srgb, srgb2linear};
