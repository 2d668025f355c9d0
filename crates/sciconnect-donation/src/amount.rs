/// Smallest amount an order is ever created for.
pub const MIN_AMOUNT: u64 = 1;

/// Coerce free-form amount input into a whole donation amount.
///
/// Anything that is not a finite number of at least 1 becomes 1. Fractions
/// are truncated.
pub fn clamp_amount(input: &str) -> u64 {
    let value = match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return MIN_AMOUNT,
    };
    if value < MIN_AMOUNT as f64 {
        return MIN_AMOUNT;
    }
    // Saturating float-to-int cast.
    value.trunc() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_amounts() {
        assert_eq!(clamp_amount("25"), 25);
        assert_eq!(clamp_amount(" 100 "), 100);
        assert_eq!(clamp_amount("1"), 1);
    }

    #[test]
    fn test_fractions_truncate() {
        assert_eq!(clamp_amount("2.7"), 2);
        assert_eq!(clamp_amount("1.999"), 1);
    }

    #[test]
    fn test_below_minimum() {
        assert_eq!(clamp_amount("-5"), 1);
        assert_eq!(clamp_amount("0"), 1);
        assert_eq!(clamp_amount("0.5"), 1);
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(clamp_amount(""), 1);
        assert_eq!(clamp_amount("abc"), 1);
        assert_eq!(clamp_amount("NaN"), 1);
        assert_eq!(clamp_amount("inf"), 1);
        assert_eq!(clamp_amount("$20"), 1);
    }

    #[test]
    fn test_huge_value_saturates() {
        assert_eq!(clamp_amount("1e30"), u64::MAX);
    }
}
