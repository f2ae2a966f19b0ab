//! Exact rotation angles as rational multiples of π.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A rotation angle, stored exactly as `num/den · π` and normalized to
/// `[0, 2π)`.
///
/// Equality and addition are exact, so terms with equal parities can be
/// combined without floating-point drift and synthesis output is
/// reproducible bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Angle {
    /// Numerator of the π multiple.
    num: i64,
    /// Denominator of the π multiple, always positive.
    den: i64,
}

impl Angle {
    /// Create an angle of `num/den · π`, reduced and normalized to `[0, 2π)`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "angle denominator must be non-zero");
        let (mut num, mut den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs());
        if g > 1 {
            num /= g as i64;
            den /= g as i64;
        }
        // Wrap into [0, 2π): num/den · π mod 2π ⟺ num mod 2·den.
        num = num.rem_euclid(2 * den);
        if num == 0 {
            den = 1;
        }
        Self { num, den }
    }

    /// The zero angle.
    pub fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// The angle π.
    pub fn pi() -> Self {
        Self { num: 1, den: 1 }
    }

    /// The angle π/`den`.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn pi_over(den: i64) -> Self {
        Self::new(1, den)
    }

    /// Numerator of the normalized π multiple.
    #[inline]
    pub fn num(&self) -> i64 {
        self.num
    }

    /// Denominator of the normalized π multiple.
    #[inline]
    pub fn den(&self) -> i64 {
        self.den
    }

    /// Check if this is the zero angle.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Approximate this angle as a floating-point radian value.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64 * std::f64::consts::PI
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.num * rhs.den + rhs.num * self.den, self.den * rhs.den)
    }
}

impl AddAssign for Angle {
    fn add_assign(&mut self, rhs: Angle) {
        *self = *self + rhs;
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::new(-self.num, self.den)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        self + (-rhs)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.num, self.den) {
            (0, _) => write!(f, "0"),
            (1, 1) => write!(f, "π"),
            (n, 1) => write!(f, "{n}π"),
            (1, d) => write!(f, "π/{d}"),
            (n, d) => write!(f, "{n}π/{d}"),
        }
    }
}
