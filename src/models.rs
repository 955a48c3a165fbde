use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Price in cents.
    pub price: i64,
    /// Discounted price in euros (not cents).
    pub discount_price: Option<Decimal>,
    pub discount_end_date: Option<DateTime<Utc>>,
    pub stock: i32,
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Each entry is `"Name:#HEX"`.
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub artist: Option<String>,
}

impl Product {
    pub fn discount_price_cents(&self) -> Option<i64> {
        self.discount_price.and_then(|price| {
            (price * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
    }

    /// The discounted price in cents, if the discount undercuts the list
    /// price and has not ended at `now`.
    pub fn active_discount_price(&self, now: DateTime<Utc>) -> Option<i64> {
        let cents = self.discount_price_cents()?;
        if cents >= self.price {
            return None;
        }
        match self.discount_end_date {
            Some(end) if end <= now => None,
            _ => Some(cents),
        }
    }

    pub fn effective_price(&self, now: DateTime<Utc>) -> i64 {
        self.active_discount_price(now).unwrap_or(self.price)
    }

    /// Stock as an unsigned quantity; negative stock counts as none.
    pub fn available_stock(&self) -> u32 {
        u32::try_from(self.stock).unwrap_or(0)
    }

    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    pub fn color_options(&self) -> Vec<ColorOption> {
        self.colors.iter().map(|c| ColorOption::parse(c)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ColorOption {
    pub name: String,
    pub hex: Option<String>,
}

impl ColorOption {
    /// Parse `"Navy:#1a1a2e"`; a value without a `:#` suffix is a bare name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((name, hex)) if hex.starts_with('#') => Self {
                name: name.trim().to_string(),
                hex: Some(hex.trim().to_string()),
            },
            _ => Self {
                name: raw.trim().to_string(),
                hex: None,
            },
        }
    }
}

/// Identity of a cart line: one line per product, size and color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey {
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
}

impl CartKey {
    pub fn new(product_id: Uuid, size: &str, color: &str) -> Self {
        Self {
            product_id,
            size: size.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl CartLine {
    pub fn key(&self) -> CartKey {
        CartKey::new(self.product.id, &self.size, &self.color)
    }

    pub fn matches(&self, product_id: Uuid, size: &str, color: &str) -> bool {
        self.product.id == product_id && self.size == size && self.color == color
    }

    pub fn has_active_discount(&self, now: DateTime<Utc>) -> bool {
        self.product.active_discount_price(now).is_some()
    }

    pub fn unit_price(&self, now: DateTime<Utc>) -> i64 {
        self.product.effective_price(now)
    }

    pub fn line_total(&self, now: DateTime<Utc>) -> i64 {
        self.unit_price(now) * i64::from(self.quantity)
    }

    pub fn to_row(&self) -> CartRow {
        CartRow {
            product_id: self.product.id,
            quantity: i32::try_from(self.quantity).unwrap_or(i32::MAX),
            size: self.size.clone(),
            color: self.color.clone(),
        }
    }
}

/// A cart line as stored in the per-user remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartRow {
    pub product_id: Uuid,
    pub quantity: i32,
    pub size: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WishlistEntry {
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    pub items: Vec<CartLine>,
}

impl Reservation {
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    /// Anything other than `percentage` is treated as a fixed amount.
    pub fn from_db(value: &str) -> Self {
        if value.eq_ignore_ascii_case("percentage") {
            DiscountType::Percentage
        } else {
            DiscountType::Fixed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percent for `percentage`, cents for `fixed`.
    pub discount_value: i64,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    /// Minimum cart subtotal in cents.
    pub min_purchase: i64,
    pub is_active: bool,
}

/// The part of a coupon that is safe to show to shoppers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CouponSummary {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: i64,
}

impl From<&Coupon> for CouponSummary {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code.clone(),
            description: coupon.description.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub coupon: Option<CouponSummary>,
    /// Discount in cents; zero when invalid.
    pub discount_amount: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub rating: i16,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReviewStats {
    pub average_rating: f64,
    pub total_reviews: i64,
    pub rating_5: i64,
    pub rating_4: i64,
    pub rating_3: i64,
    pub rating_2: i64,
    pub rating_1: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: String,
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockNotification {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_email: String,
    pub user_id: Option<Uuid>,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn product(price: i64, discount: Option<Decimal>, end: Option<DateTime<Utc>>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Tee".into(),
            slug: "tee".into(),
            description: None,
            price,
            discount_price: discount,
            discount_end_date: end,
            stock: 3,
            sizes: vec!["M".into()],
            colors: vec![],
            images: vec![],
            artist: None,
        }
    }

    #[test]
    fn discount_applies_until_end_date() {
        let now = Utc::now();
        let p = product(1500, Some(Decimal::new(1000, 2)), Some(now + Duration::hours(1)));

        assert_eq!(p.effective_price(now), 1000);
        assert_eq!(p.effective_price(now + Duration::hours(2)), 1500);
    }

    #[test]
    fn discount_not_below_list_price_is_ignored() {
        let now = Utc::now();
        let p = product(1500, Some(Decimal::new(1500, 2)), None);

        assert_eq!(p.active_discount_price(now), None);
        assert_eq!(p.effective_price(now), 1500);
    }

    #[test]
    fn discount_price_converts_euros_to_cents() {
        let p = product(2000, Some(Decimal::new(12995, 3)), None);

        assert_eq!(p.discount_price_cents(), Some(1300));
    }

    #[test]
    fn color_option_parses_name_and_hex() {
        assert_eq!(
            ColorOption::parse("Navy:#1a1a2e"),
            ColorOption {
                name: "Navy".into(),
                hex: Some("#1a1a2e".into())
            }
        );
        assert_eq!(ColorOption::parse("Black").hex, None);
    }

    #[test]
    fn reservation_remaining_never_negative() {
        let now = Utc::now();
        let reservation = Reservation {
            start_time: now - Duration::minutes(20),
            expires_at: now - Duration::minutes(5),
            items: vec![],
        };

        assert!(reservation.is_expired(now));
        assert_eq!(reservation.remaining(now), Duration::zero());
    }

    #[test]
    fn line_reports_discount_and_variant_options() {
        let now = Utc::now();
        let mut p = product(2000, Some(Decimal::new(1500, 2)), None);
        p.colors = vec!["Navy:#1a1a2e".into(), "Sand".into()];
        let line = CartLine {
            product: p.clone(),
            quantity: 2,
            size: "M".into(),
            color: "Navy:#1a1a2e".into(),
        };

        assert!(line.has_active_discount(now));
        assert_eq!(line.line_total(now), 3000);
        assert!(p.offers_size("M"));
        assert!(!p.offers_size("XXL"));
        let names: Vec<String> = p.color_options().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Navy".to_string(), "Sand".to_string()]);
    }

    #[test]
    fn unknown_discount_type_is_fixed() {
        assert_eq!(DiscountType::from_db("percentage"), DiscountType::Percentage);
        assert_eq!(DiscountType::from_db("amount"), DiscountType::Fixed);
    }
}
