// =============================================================================
// Numeric helpers for evaluation markers and client rule bodies
// =============================================================================

use crate::error::EvalError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

fn integer_operand(name: &str, value: &BigRational) -> Result<BigInt, EvalError> {
    if value.is_integer() {
        Ok(value.to_integer())
    } else {
        Err(EvalError::NonInteger(name.to_string()))
    }
}

/// Greatest common divisor of two integers (always non-negative).
pub fn gcd(a: &BigRational, b: &BigRational) -> Result<BigRational, EvalError> {
    let a = integer_operand("gcd", a)?;
    let b = integer_operand("gcd", b)?;
    Ok(BigRational::from_integer(a.gcd(&b)))
}

/// Least common multiple of two integers (always non-negative).
pub fn lcm(a: &BigRational, b: &BigRational) -> Result<BigRational, EvalError> {
    let a = integer_operand("lcm", a)?;
    let b = integer_operand("lcm", b)?;
    Ok(BigRational::from_integer(a.lcm(&b)))
}

#[inline]
pub fn abs(value: &BigRational) -> BigRational {
    value.abs()
}

/// -1, 0 or 1.
#[inline]
pub fn sign(value: &BigRational) -> BigRational {
    value.signum()
}

fn exact_root(n: &BigInt, index: u32) -> Option<BigInt> {
    let root = n.nth_root(index);
    (num_traits::pow(root.clone(), index as usize) == *n).then_some(root)
}

/// Exact `index`-th root of a rational.
///
/// Negative indices give the reciprocal root (`nth_root(8, -3) = 1/2`). Odd
/// roots of negative values are negative; even roots of negative values and
/// roots that are not rational are errors.
pub fn nth_root(value: &BigRational, index: i64) -> Result<BigRational, EvalError> {
    if index == 0 {
        return Err(EvalError::DivisionByZero);
    }

    let inexact = || EvalError::InexactRoot {
        value: value.to_string(),
        index,
    };
    let n = u32::try_from(index.unsigned_abs()).map_err(|_| inexact())?;
    if value.is_negative() && n % 2 == 0 {
        return Err(inexact());
    }

    let numer = exact_root(value.numer(), n).ok_or_else(inexact)?;
    let denom = exact_root(value.denom(), n).ok_or_else(inexact)?;
    let root = BigRational::new(numer, denom);

    if index > 0 {
        Ok(root)
    } else if root.is_zero() {
        Err(EvalError::DivisionByZero)
    } else {
        Ok(root.recip())
    }
}

/// Largest exponent magnitude `pow` will compute.
pub const MAX_EXPONENT: i32 = 10_000;

/// `base^exponent` for integer exponents and exact rational exponents
/// (`8^(2/3) = 4`). Exponent numerators beyond [`MAX_EXPONENT`] in magnitude
/// are unsupported.
pub fn pow(base: &BigRational, exponent: &BigRational) -> Result<BigRational, EvalError> {
    let unsupported = || EvalError::Unsupported(format!("{}^{}", base, exponent));

    let power = exponent
        .numer()
        .to_i32()
        .filter(|power| power.unsigned_abs() <= MAX_EXPONENT.unsigned_abs())
        .ok_or_else(unsupported)?;
    let root_index = exponent.denom().to_i64().ok_or_else(unsupported)?;

    if power < 0 && base.is_zero() {
        return Err(EvalError::DivisionByZero);
    }

    let radical = if root_index == 1 {
        base.clone()
    } else {
        nth_root(base, root_index)?
    };
    Ok(radical.pow(power))
}

/// Prime factorization of `|n|` as ascending `(prime, exponent)` pairs.
/// Empty for 0 and ±1.
pub fn prime_factorization(n: &BigInt) -> Vec<(BigInt, u32)> {
    let mut remaining = n.abs();
    let mut factors = Vec::new();
    if remaining <= BigInt::one() {
        return factors;
    }

    let mut divide_out = |remaining: &mut BigInt, p: &BigInt| {
        let mut exponent = 0;
        while (&*remaining % p).is_zero() {
            *remaining /= p;
            exponent += 1;
        }
        if exponent > 0 {
            factors.push((p.clone(), exponent));
        }
    };

    divide_out(&mut remaining, &BigInt::from(2));
    let mut p = BigInt::from(3);
    while &p * &p <= remaining {
        divide_out(&mut remaining, &p);
        p += 2u32;
    }
    if remaining > BigInt::one() {
        factors.push((remaining, 1));
    }

    factors
}
