use chrono::Utc;
use rand::Rng;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::{
    audit,
    dto::coupons::{GeneratedCouponCode, ValidateCouponRequest},
    entity::coupons::{Column as CouponCol, Entity as Coupons, Model as CouponModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Coupon, CouponValidation, DiscountType},
    response::ApiResponse,
    services::coupon::evaluate_coupon,
    state::AppState,
};

pub const CODE_PREFIX: &str = "PROMO-";
pub const CODE_SUFFIX_LEN: usize = 6;
pub const CODE_MAX_ATTEMPTS: usize = 10;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Authoritative coupon check. Codes are matched case-insensitively and
/// `used_count` is never touched here.
pub async fn validate_coupon(
    state: &AppState,
    payload: ValidateCouponRequest,
) -> AppResult<ApiResponse<CouponValidation>> {
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("coupon code is required".to_string()));
    }

    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code.clone()))
        .one(&state.orm)
        .await?
        .map(coupon_from_entity);

    let validation = evaluate_coupon(coupon.as_ref(), payload.cart_total, Utc::now());
    tracing::debug!(%code, valid = validation.valid, "coupon validated");

    Ok(ApiResponse::success("Coupon checked", validation, None))
}

/// Pick an unused `PROMO-XXXXXX` code.
pub async fn generate_coupon_code(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<GeneratedCouponCode>> {
    ensure_admin(user)?;

    for attempt in 1..=CODE_MAX_ATTEMPTS {
        let code = random_code();
        let taken = Coupons::find()
            .filter(CouponCol::Code.eq(code.clone()))
            .count(&state.orm)
            .await?;
        if taken > 0 {
            tracing::debug!(attempt, %code, "generated coupon code already taken");
            continue;
        }

        audit::record(
            &state.pool,
            Some(user.user_id),
            "coupon_code_generate",
            "coupons",
            serde_json::json!({ "code": code }),
        )
        .await;

        return Ok(ApiResponse::success(
            "Coupon code generated",
            GeneratedCouponCode { code },
            None,
        ));
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "no free coupon code after {CODE_MAX_ATTEMPTS} attempts"
    )))
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

pub fn random_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{CODE_PREFIX}{suffix}")
}

pub(crate) fn coupon_from_entity(model: CouponModel) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        description: model.description,
        discount_type: DiscountType::from_db(&model.discount_type),
        discount_value: model.discount_value,
        valid_from: model.valid_from.map(|dt| dt.with_timezone(&Utc)),
        valid_until: model.valid_until.map(|dt| dt.with_timezone(&Utc)),
        max_uses: model.max_uses,
        used_count: model.used_count,
        min_purchase: model.min_purchase,
        is_active: model.is_active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("  welcome10 "), "WELCOME10");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn random_codes_have_prefix_and_alphanumeric_suffix() {
        let code = random_code();
        let suffix = code.strip_prefix(CODE_PREFIX).unwrap_or_default();

        assert_eq!(suffix.len(), CODE_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
}
