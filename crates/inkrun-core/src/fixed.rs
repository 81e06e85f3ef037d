// this_file: crates/inkrun-core/src/fixed.rs

//! 26.6 fixed point and its conversion to whole pixels
//!
//! Shapers and outline metrics hand us positions in 1/64 pixel units. Each use
//! gets one rounding rule and keeps it:
//!
//! - pen advances and offsets truncate (`>> 6`), since they accumulate;
//! - bounding-box minima floor;
//! - bounding-box maxima ceil, so antialiased edges are never cut off.

use std::ops::{Add, AddAssign, Neg, Sub};

/// A signed 26.6 fixed-point value: 26 integer bits, 6 fractional bits.
///
/// ```rust
/// use inkrun_core::fixed::F26Dot6;
///
/// let x = F26Dot6::from_raw(-65); // -1.015625
/// assert_eq!(x.to_pixel_truncate(), -2);
/// assert_eq!(x.to_pixel_floor(), -2);
/// assert_eq!(x.to_pixel_ceil(), -1);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct F26Dot6(i32);

impl F26Dot6 {
    pub const FRAC_BITS: u32 = 6;
    pub const FRAC_MASK: i32 = (1 << Self::FRAC_BITS) - 1;
    pub const ONE: F26Dot6 = F26Dot6(1 << Self::FRAC_BITS);
    pub const ZERO: F26Dot6 = F26Dot6(0);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        F26Dot6(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whole pixels, exactly representable
    #[inline]
    pub const fn from_pixels(px: i32) -> Self {
        F26Dot6(px << Self::FRAC_BITS)
    }

    /// Scale a font-unit value to 26.6 at `pixel_size` pixels per em.
    ///
    /// Rounds half away from zero to the nearest 1/64.
    pub fn from_font_units(units: i32, pixel_size: u32, units_per_em: u16) -> Self {
        let upem = i64::from(units_per_em.max(1));
        let scaled = i64::from(units) * i64::from(pixel_size) * 64;
        let half = upem / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / upem
        } else {
            (scaled - half) / upem
        };
        F26Dot6(saturate(rounded))
    }

    /// Largest 26.6 value not above `px`
    pub fn floor_from_f32(px: f32) -> Self {
        F26Dot6(saturate((f64::from(px) * 64.0).floor() as i64))
    }

    /// Smallest 26.6 value not below `px`
    pub fn ceil_from_f32(px: f32) -> Self {
        F26Dot6(saturate((f64::from(px) * 64.0).ceil() as i64))
    }

    /// Pen accumulation rule: arithmetic shift, rounds toward negative infinity
    #[inline]
    pub const fn to_pixel_truncate(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    /// Bounding-box minimum rule
    #[inline]
    pub const fn to_pixel_floor(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    /// Bounding-box maximum rule
    #[inline]
    pub const fn to_pixel_ceil(self) -> i32 {
        ((self.0 as i64 + Self::FRAC_MASK as i64) >> Self::FRAC_BITS) as i32
    }

    #[inline]
    pub const fn frac(self) -> i32 {
        self.0 & Self::FRAC_MASK
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / 64.0
    }
}

fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl Add for F26Dot6 {
    type Output = F26Dot6;

    #[inline]
    fn add(self, rhs: F26Dot6) -> F26Dot6 {
        F26Dot6(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for F26Dot6 {
    #[inline]
    fn add_assign(&mut self, rhs: F26Dot6) {
        *self = *self + rhs;
    }
}

impl Sub for F26Dot6 {
    type Output = F26Dot6;

    #[inline]
    fn sub(self, rhs: F26Dot6) -> F26Dot6 {
        F26Dot6(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for F26Dot6 {
    type Output = F26Dot6;

    #[inline]
    fn neg(self) -> F26Dot6 {
        F26Dot6(self.0.saturating_neg())
    }
}
