/// Format an amount in cents as a euro string, e.g. `1250` -> `€12.50`.
pub fn format_price(cents: i64) -> String {
    let abs_cents = cents.unsigned_abs();
    let major = abs_cents / 100;
    let minor = abs_cents % 100;
    let sign = if cents < 0 { "-" } else { "" };

    format!("{sign}€{major}.{minor:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_and_fractional_amounts() {
        assert_eq!(format_price(0), "€0.00");
        assert_eq!(format_price(5), "€0.05");
        assert_eq!(format_price(1250), "€12.50");
        assert_eq!(format_price(-399), "-€3.99");
    }
}
