use crate::error::{Error, Result};

/// Checks that a numerical value is in `[0, 1]`, returning an [`Error::InvalidParameter`] naming the
/// offending field if not
///
/// ### Example
/// ```ignore
/// let gamma = 2.0;
/// check_unit_interval!(gamma)?;
/// ```
/// This fails with the message "invalid value for \`gamma\`: 2 (expected a value in [0, 1])".
macro_rules! check_unit_interval {
    ($var:expr) => {
        $crate::util::unit_interval(stringify!($var), $var as f64)
    };
}

pub(crate) use check_unit_interval;

pub(crate) fn unit_interval(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name: field_name(name),
            value,
            expected: "a value in [0, 1]",
        })
    }
}

/// `config.alpha` -> `alpha`
fn field_name(expr: &'static str) -> &'static str {
    expr.rsplit('.').next().unwrap_or(expr).trim()
}

/// Number of distinct elements in a slice
pub fn unique_count<T: Eq + std::hash::Hash>(items: &[T]) -> usize {
    items.iter().collect::<std::collections::HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_interval_bounds() {
        assert!(unit_interval("x", 0.5).is_ok());
        assert!(unit_interval("x", 0.0).is_ok());
        assert!(unit_interval("x", 1.0).is_ok());
        assert!(unit_interval("x", 1.5).is_err());
        assert!(unit_interval("x", -0.1).is_err());
        assert!(unit_interval("x", f64::NAN).is_err());
    }

    #[test]
    fn macro_names_field() {
        struct Config {
            gamma: f32,
        }
        let config = Config { gamma: 2.0 };
        let err = check_unit_interval!(config.gamma).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "gamma", .. }));
        assert_eq!(
            err.to_string(),
            "invalid value for `gamma`: 2 (expected a value in [0, 1])"
        );
    }

    #[test]
    fn unique_count_ignores_repeats() {
        assert_eq!(unique_count(&[(0, 0), (1, 0), (0, 0), (1, 0), (2, 0)]), 3);
        assert_eq!(unique_count::<(i32, i32)>(&[]), 0);
    }
}
