//! Premium display formatting.

pub const CURRENCY_SYMBOL: &str = "₹";

/// Group an integer's digits in threes: `1234567` → `1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `₹ 12,345`
pub fn format_premium(premium: i64) -> String {
    format!("{} {}", CURRENCY_SYMBOL, group_thousands(premium))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(19925), "19,925");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-4500), "-4,500");
    }

    #[test]
    fn test_format_premium() {
        assert_eq!(format_premium(12345), "₹ 12,345");
        assert_eq!(format_premium(i64::MIN), "₹ -9,223,372,036,854,775,808");
    }
}
