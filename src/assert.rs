//! The assertion engine.
//!
//! Every assertion returns a [`TestResult`]. Test bodies propagate it with `?`,
//! so a unit stops at its first failing assertion and the unit boundary turns
//! the failure into a `Failed` outcome.
//!
//! The optional [`Tag`] is supplied by the caller. The `check_*` macros pass the
//! current file and line:
//!
//! ```rust
//! use topcheck::prelude::*;
//!
//! fn addition() -> TestResult {
//!     let sum = 2 + 2;
//!     check_eq!(4, sum)?;
//!     check_close!(0.3, 0.1 + 0.2, 1e-9)?;
//!     Ok(())
//! }
//! # addition().unwrap();
//! ```

use std::fmt;
use std::ops::Sub;

use crate::diagnostics::{AssertionFailure, Failure, Tag, TestResult};

mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating point types accepted by [`assert_almost_equal`].
pub trait Float:
    Copy + PartialOrd + Sub<Output = Self> + fmt::Display + fmt::Debug + private::Sealed
{
    const ZERO: Self;
    fn abs(self) -> Self;
    fn is_finite(self) -> bool;
    fn to_f64(self) -> f64;
}

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl Float for $ty {
                const ZERO: Self = 0.0;
                fn abs(self) -> Self {
                    <$ty>::abs(self)
                }
                fn is_finite(self) -> bool {
                    <$ty>::is_finite(self)
                }
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_float!(f32, f64);

/// Passes iff `expected == actual`.
pub fn assert_equal<T>(expected: &T, actual: &T, tag: Option<&Tag>) -> TestResult
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if expected == actual {
        return Ok(());
    }
    Err(AssertionFailure::new(format!("expected ({:?}), actual ({:?})", expected, actual))
        .with_values(format!("{:#?}", expected), format!("{:#?}", actual))
        .with_tag(tag)
        .into())
}

/// Passes iff `unexpected != actual`.
pub fn assert_not_equal<T>(unexpected: &T, actual: &T, tag: Option<&Tag>) -> TestResult
where
    T: PartialEq + fmt::Debug + ?Sized,
{
    if unexpected != actual {
        return Ok(());
    }
    Err(AssertionFailure::new(format!("expected a value other than ({:?})", unexpected))
        .with_tag(tag)
        .into())
}

/// Passes iff `|expected - actual| < epsilon`.
///
/// The bound is strict: a difference exactly equal to `epsilon` fails. A
/// non-finite or negative `epsilon` makes the call itself invalid, which is
/// reported as a unit fault rather than an assertion failure.
pub fn assert_almost_equal<F: Float>(
    expected: F,
    actual: F,
    epsilon: F,
    tag: Option<&Tag>,
) -> TestResult {
    if !epsilon.is_finite() || epsilon < F::ZERO {
        let location = tag.filter(|t| !t.is_empty()).map(|t| format!(" ({})", t));
        return Err(Failure::fault(format!(
            "invalid epsilon {}: must be finite and non-negative{}",
            epsilon,
            location.unwrap_or_default()
        )));
    }
    let delta = (expected - actual).abs();
    if delta < epsilon {
        return Ok(());
    }
    Err(AssertionFailure::new(format!(
        "expected ({}), actual ({}), difference {} is not within epsilon {}",
        expected, actual, delta, epsilon
    ))
    .with_values(expected.to_string(), actual.to_string())
    .with_epsilon(epsilon.to_f64())
    .with_tag(tag)
    .into())
}

/// Passes iff `condition` is true.
pub fn assert_true(condition: bool, tag: Option<&Tag>) -> TestResult {
    if condition {
        return Ok(());
    }
    Err(AssertionFailure::new("expected condition to be true, got false")
        .with_values("true", "false")
        .with_tag(tag)
        .into())
}

/// Passes iff `condition` is false.
pub fn assert_false(condition: bool, tag: Option<&Tag>) -> TestResult {
    if !condition {
        return Ok(());
    }
    Err(AssertionFailure::new("expected condition to be false, got true")
        .with_values("false", "true")
        .with_tag(tag)
        .into())
}

/// [`assert_equal`] tagged with the calling file and line.
#[macro_export]
macro_rules! check_eq {
    ($expected:expr, $actual:expr $(,)?) => {
        $crate::assert::assert_equal(
            &$expected,
            &$actual,
            Some(&$crate::Tag::here(file!(), line!())),
        )
    };
}

/// [`assert_not_equal`] tagged with the calling file and line.
#[macro_export]
macro_rules! check_ne {
    ($unexpected:expr, $actual:expr $(,)?) => {
        $crate::assert::assert_not_equal(
            &$unexpected,
            &$actual,
            Some(&$crate::Tag::here(file!(), line!())),
        )
    };
}

/// [`assert_almost_equal`] tagged with the calling file and line.
#[macro_export]
macro_rules! check_close {
    ($expected:expr, $actual:expr, $epsilon:expr $(,)?) => {
        $crate::assert::assert_almost_equal(
            $expected,
            $actual,
            $epsilon,
            Some(&$crate::Tag::here(file!(), line!())),
        )
    };
}

/// [`assert_true`] tagged with the calling file and line.
#[macro_export]
macro_rules! check_true {
    ($condition:expr $(,)?) => {
        $crate::assert::assert_true($condition, Some(&$crate::Tag::here(file!(), line!())))
    };
}

/// [`assert_false`] tagged with the calling file and line.
#[macro_export]
macro_rules! check_false {
    ($condition:expr $(,)?) => {
        $crate::assert::assert_false($condition, Some(&$crate::Tag::here(file!(), line!())))
    };
}

#[cfg(test)]
mod assert_tests {
    use super::*;

    fn assertion(result: TestResult) -> AssertionFailure {
        match result {
            Err(Failure::Assertion(failure)) => failure,
            other => panic!("expected an assertion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_equal_is_reflexive() {
        assert!(assert_equal(&0, &0, None).is_ok());
        assert!(assert_equal("text", "text", None).is_ok());
        assert!(assert_equal(&vec![1, 2, 3], &vec![1, 2, 3], None).is_ok());
        assert!(assert_equal(&Some('x'), &Some('x'), None).is_ok());
    }

    #[test]
    fn test_equal_failure_mentions_both_values() {
        let failure = assertion(assert_equal(&4, &5, None));
        let msg = failure.to_string();
        assert!(msg.contains('4'));
        assert!(msg.contains('5'));
        assert_eq!(failure.expected.as_deref(), Some("4"));
        assert_eq!(failure.actual.as_deref(), Some("5"));
    }

    #[test]
    fn test_not_equal() {
        assert!(assert_not_equal(&1, &2, None).is_ok());
        let failure = assertion(assert_not_equal(&1, &1, None));
        assert!(failure.to_string().contains("other than (1)"));
    }

    #[test]
    fn test_almost_equal_within_epsilon() {
        assert!(assert_almost_equal(0.3, 0.1 + 0.2, 1e-9, None).is_ok());
        assert!(assert_almost_equal(1.0f32, 1.0f32, 0.001, None).is_ok());
    }

    #[test]
    fn test_almost_equal_is_strict_at_boundary() {
        let failure = assertion(assert_almost_equal(1.0, 1.5, 0.5, None));
        assert_eq!(failure.epsilon, Some(0.5));
        assert!(assert_almost_equal(1.0, 1.0 + 1e-9, 1e-9, None).is_err());
    }

    #[test]
    fn test_almost_equal_with_zero_epsilon_always_fails() {
        let result = assert_almost_equal(2.0, 2.0, 0.0, None);
        assert!(matches!(result, Err(Failure::Assertion(_))));
    }

    #[test]
    fn test_almost_equal_nan_is_a_failure_not_a_fault() {
        let result = assert_almost_equal(f64::NAN, 1.0, 0.1, None);
        assert!(matches!(result, Err(Failure::Assertion(_))));
    }

    #[test]
    fn test_invalid_epsilon_is_a_fault() {
        for epsilon in [-1.0, f64::NAN, f64::INFINITY] {
            let result = assert_almost_equal(1.0, 1.0, epsilon, None);
            assert!(
                matches!(result, Err(Failure::Fault { .. })),
                "epsilon {} should be rejected",
                epsilon
            );
        }
    }

    #[test]
    fn test_true_and_false() {
        assert!(assert_true(true, None).is_ok());
        assert!(assert_false(false, None).is_ok());
        assert!(assertion(assert_true(1 > 2, None))
            .to_string()
            .contains("to be true"));
        assert!(assertion(assert_false(true, None))
            .to_string()
            .contains("to be false"));
    }

    #[test]
    fn test_macros_record_location() {
        let failure = assertion(crate::check_eq!(1, 2));
        let tag = failure.tag.unwrap();
        assert_eq!(tag.file.as_deref(), Some(file!()));
        assert!(tag.line.is_some());
        assert!(crate::check_true!(true).is_ok());
        assert!(crate::check_false!(false).is_ok());
        assert!(crate::check_ne!("a", "b").is_ok());
        assert!(crate::check_close!(0.3, 0.1 + 0.2, 1e-9).is_ok());
    }
}
