//! Coupon rules shared by the storefront preview and the authoritative
//! server check. Pure: nothing here touches `used_count`.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{
    models::{Coupon, CouponSummary, CouponValidation, DiscountType},
    money::format_price,
};

pub const INVALID_MESSAGE: &str = "Invalid or expired coupon";
pub const NOT_YET_ACTIVE_MESSAGE: &str = "This coupon is not active yet";
pub const EXPIRED_MESSAGE: &str = "This coupon has expired";
pub const USAGE_LIMIT_MESSAGE: &str = "This coupon has reached its usage limit";

/// Check `coupon` against a cart subtotal (cents) at `now`.
///
/// Rules run in order and the first failure wins: exists and active, start
/// date, end date, usage limit, minimum purchase.
pub fn evaluate_coupon(
    coupon: Option<&Coupon>,
    cart_subtotal: i64,
    now: DateTime<Utc>,
) -> CouponValidation {
    let Some(coupon) = coupon.filter(|c| c.is_active) else {
        return rejected(INVALID_MESSAGE);
    };

    if coupon.valid_from.is_some_and(|from| from > now) {
        return rejected(NOT_YET_ACTIVE_MESSAGE);
    }

    if coupon.valid_until.is_some_and(|until| until < now) {
        return rejected(EXPIRED_MESSAGE);
    }

    if coupon
        .max_uses
        .is_some_and(|max_uses| coupon.used_count >= max_uses)
    {
        return rejected(USAGE_LIMIT_MESSAGE);
    }

    if cart_subtotal < coupon.min_purchase {
        return rejected(format!(
            "A minimum purchase of {} is required",
            format_price(coupon.min_purchase)
        ));
    }

    let discount_amount = calculate_discount(coupon.discount_type, coupon.discount_value, cart_subtotal);

    CouponValidation {
        valid: true,
        coupon: Some(CouponSummary::from(coupon)),
        discount_amount,
        message: applied_message(coupon),
    }
}

/// Discount in cents, never more than the subtotal and never negative.
pub fn calculate_discount(discount_type: DiscountType, value: i64, cart_subtotal: i64) -> i64 {
    let subtotal = cart_subtotal.max(0);
    let discount = match discount_type {
        DiscountType::Percentage => percent_of(value, subtotal),
        DiscountType::Fixed => value,
    };
    discount.clamp(0, subtotal)
}

fn percent_of(percent: i64, amount: i64) -> i64 {
    let applied = Decimal::from(amount) * Decimal::from(percent) / Decimal::ONE_HUNDRED;
    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(amount)
}

fn applied_message(coupon: &Coupon) -> String {
    if let Some(description) = coupon.description.as_ref().filter(|d| !d.is_empty()) {
        return description.clone();
    }
    match coupon.discount_type {
        DiscountType::Percentage => format!("{}% discount applied", coupon.discount_value),
        DiscountType::Fixed => format!("{} discount applied", format_price(coupon.discount_value)),
    }
}

fn rejected(message: impl Into<String>) -> CouponValidation {
    CouponValidation {
        valid: false,
        coupon: None,
        discount_amount: 0,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: "SUMMER".into(),
            description: None,
            discount_type,
            discount_value: value,
            valid_from: None,
            valid_until: None,
            max_uses: None,
            used_count: 0,
            min_purchase: 0,
            is_active: true,
        }
    }

    #[test]
    fn missing_or_inactive_coupon_is_invalid() {
        let now = Utc::now();
        assert_eq!(evaluate_coupon(None, 1000, now).message, INVALID_MESSAGE);

        let mut inactive = coupon(DiscountType::Fixed, 500);
        inactive.is_active = false;
        let result = evaluate_coupon(Some(&inactive), 1000, now);
        assert!(!result.valid);
        assert_eq!(result.message, INVALID_MESSAGE);
    }

    #[test]
    fn date_window_is_enforced() {
        let now = Utc::now();
        let mut early = coupon(DiscountType::Fixed, 500);
        early.valid_from = Some(now + Duration::days(1));
        assert_eq!(evaluate_coupon(Some(&early), 1000, now).message, NOT_YET_ACTIVE_MESSAGE);

        let mut late = coupon(DiscountType::Fixed, 500);
        late.valid_until = Some(now - Duration::days(1));
        assert_eq!(evaluate_coupon(Some(&late), 1000, now).message, EXPIRED_MESSAGE);
    }

    #[test]
    fn first_failing_rule_wins() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, 500);
        c.valid_until = Some(now - Duration::days(1));
        c.max_uses = Some(1);
        c.used_count = 1;
        c.min_purchase = 10_000;

        assert_eq!(evaluate_coupon(Some(&c), 100, now).message, EXPIRED_MESSAGE);
    }

    #[test]
    fn usage_limit_reached() {
        let mut c = coupon(DiscountType::Percentage, 10);
        c.max_uses = Some(5);
        c.used_count = 5;

        assert_eq!(evaluate_coupon(Some(&c), 1000, Utc::now()).message, USAGE_LIMIT_MESSAGE);
    }

    #[test]
    fn minimum_purchase_message_includes_amount() {
        let mut c = coupon(DiscountType::Percentage, 10);
        c.min_purchase = 5000;

        let result = evaluate_coupon(Some(&c), 4999, Utc::now());

        assert!(!result.valid);
        assert_eq!(result.message, "A minimum purchase of €50.00 is required");
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(calculate_discount(DiscountType::Percentage, 15, 1010), 152);
        assert_eq!(calculate_discount(DiscountType::Percentage, 10, 1004), 100);
    }

    #[test]
    fn fixed_discount_is_clamped_to_subtotal() {
        let c = coupon(DiscountType::Fixed, 5000);

        let result = evaluate_coupon(Some(&c), 3000, Utc::now());

        assert!(result.valid);
        assert_eq!(result.discount_amount, 3000);
    }

    #[test]
    fn valid_coupon_reports_summary_and_message() {
        let c = coupon(DiscountType::Percentage, 20);

        let result = evaluate_coupon(Some(&c), 2000, Utc::now());

        assert!(result.valid);
        assert_eq!(result.discount_amount, 400);
        assert_eq!(result.message, "20% discount applied");
        assert_eq!(result.coupon.map(|s| s.code), Some("SUMMER".to_string()));
    }
}
