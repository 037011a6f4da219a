//! Display formatting for scan rows

/// Format `value` with `digits` significant digits in the style of C's `%g`.
///
/// Fixed notation is used while the decimal exponent lies in
/// `[-4, digits)`, scientific notation (`1.5e-05`, `2e+06`) otherwise.
/// Trailing zeros and a dangling decimal point are removed.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let digits = digits.max(1);
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

/// Two-decimal percentage, e.g. `7.07%`
pub fn format_pct(value: f64) -> String {
    format!("{:.2}%", value)
}

fn trim_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_notation() {
        assert_eq!(format_significant(103.0, 6), "103");
        assert_eq!(format_significant(106.0, 6), "106");
        assert_eq!(format_significant(64123.4, 6), "64123.4");
        assert_eq!(format_significant(0.5, 6), "0.5");
        assert_eq!(format_significant(1.234567891, 6), "1.23457");
        assert_eq!(format_significant(0.0001234, 6), "0.0001234");
        assert_eq!(format_significant(0.0, 6), "0");
        assert_eq!(format_significant(-2.5, 6), "-2.5");
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(format_significant(0.000012345, 6), "1.2345e-05");
        assert_eq!(format_significant(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_significant(2_000_000.0, 6), "2e+06");
        assert_eq!(format_significant(999999.7, 6), "1e+06");
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(format_significant(f64::NAN, 6), "nan");
        assert_eq!(format_significant(f64::INFINITY, 6), "inf");
        assert_eq!(format_significant(f64::NEG_INFINITY, 6), "-inf");
    }

    #[test]
    fn test_percentages() {
        assert_eq!(format_pct(7.0707070707), "7.07%");
        assert_eq!(format_pct(3.0), "3.00%");
        assert_eq!(format_pct(-1.005), "-1.00%");
    }
}
