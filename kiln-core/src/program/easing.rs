//! Easing curves for ramp segments
//!
//! Every curve maps normalized progress `k` in [0, 1] to eased progress in
//! [0, 1]. Inputs at or beyond the ends return exactly 0 or 1.

use core::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interpolation method of a segment
///
/// The discriminant is the numeric code used in program files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum EasingKind {
    /// Hold the target, no interpolation
    None = 0,
    #[default]
    Linear = 1,
    QuadIn = 2,
    QuadOut = 3,
    QuadInOut = 4,
    CubicIn = 5,
    CubicOut = 6,
    CubicInOut = 7,
    QuartIn = 8,
    QuartOut = 9,
    QuartInOut = 10,
    QuintIn = 11,
    QuintOut = 12,
    QuintInOut = 13,
    SineIn = 14,
    SineOut = 15,
    SineInOut = 16,
}

/// Shape of a polynomial curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    In,
    Out,
    InOut,
}

impl EasingKind {
    /// All kinds in code order
    pub const ALL: [EasingKind; 17] = [
        EasingKind::None,
        EasingKind::Linear,
        EasingKind::QuadIn,
        EasingKind::QuadOut,
        EasingKind::QuadInOut,
        EasingKind::CubicIn,
        EasingKind::CubicOut,
        EasingKind::CubicInOut,
        EasingKind::QuartIn,
        EasingKind::QuartOut,
        EasingKind::QuartInOut,
        EasingKind::QuintIn,
        EasingKind::QuintOut,
        EasingKind::QuintInOut,
        EasingKind::SineIn,
        EasingKind::SineOut,
        EasingKind::SineInOut,
    ];

    /// Numeric code used in program files
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up a kind by numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Lowercase name accepted by the `METHOD` parameter
    pub const fn name(self) -> &'static str {
        match self {
            EasingKind::None => "none",
            EasingKind::Linear => "linear",
            EasingKind::QuadIn => "quad_in",
            EasingKind::QuadOut => "quad_out",
            EasingKind::QuadInOut => "quad_in_out",
            EasingKind::CubicIn => "cubic_in",
            EasingKind::CubicOut => "cubic_out",
            EasingKind::CubicInOut => "cubic_in_out",
            EasingKind::QuartIn => "quart_in",
            EasingKind::QuartOut => "quart_out",
            EasingKind::QuartInOut => "quart_in_out",
            EasingKind::QuintIn => "quint_in",
            EasingKind::QuintOut => "quint_out",
            EasingKind::QuintInOut => "quint_in_out",
            EasingKind::SineIn => "sine_in",
            EasingKind::SineOut => "sine_out",
            EasingKind::SineInOut => "sine_in_out",
        }
    }

    /// Look up a kind by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Parse either a name or a numeric code
    pub fn parse(value: &str) -> Option<Self> {
        match value.parse::<u8>() {
            Ok(code) => Self::from_code(code),
            Err(_) => Self::from_name(value),
        }
    }

    /// Whether segments of this kind interpolate at all
    pub const fn interpolates(self) -> bool {
        !matches!(self, EasingKind::None)
    }

    /// Apply the curve to progress `k`
    ///
    /// `None` has no curve and returns `k` unchanged; callers hold the
    /// target instead of calling this.
    pub fn ease(self, k: f32) -> f32 {
        if k <= 0.0 {
            return 0.0;
        }
        if k >= 1.0 {
            return 1.0;
        }

        match self {
            EasingKind::None | EasingKind::Linear => k,
            EasingKind::QuadIn => power(k, 2, Variant::In),
            EasingKind::QuadOut => power(k, 2, Variant::Out),
            EasingKind::QuadInOut => power(k, 2, Variant::InOut),
            EasingKind::CubicIn => power(k, 3, Variant::In),
            EasingKind::CubicOut => power(k, 3, Variant::Out),
            EasingKind::CubicInOut => power(k, 3, Variant::InOut),
            EasingKind::QuartIn => power(k, 4, Variant::In),
            EasingKind::QuartOut => power(k, 4, Variant::Out),
            EasingKind::QuartInOut => power(k, 4, Variant::InOut),
            EasingKind::QuintIn => power(k, 5, Variant::In),
            EasingKind::QuintOut => power(k, 5, Variant::Out),
            EasingKind::QuintInOut => power(k, 5, Variant::InOut),
            EasingKind::SineIn => 1.0 - libm::cosf(k * PI / 2.0),
            EasingKind::SineOut => libm::sinf(k * PI / 2.0),
            EasingKind::SineInOut => -0.5 * (libm::cosf(PI * k) - 1.0),
        }
    }
}

/// Polynomial easing of degree `p`
fn power(k: f32, p: u32, variant: Variant) -> f32 {
    match variant {
        Variant::In => pow(k, p),
        Variant::Out => 1.0 - pow(1.0 - k, p),
        Variant::InOut => {
            let v = k * 2.0;
            if v < 1.0 {
                0.5 * pow(v, p)
            } else {
                1.0 - 0.5 * libm::fabsf(pow(2.0 - v, p))
            }
        }
    }
}

fn pow(base: f32, exp: u32) -> f32 {
    (0..exp).fold(1.0, |acc, _| acc * base)
}
