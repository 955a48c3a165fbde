use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::{
    audit,
    dto::newsletter::SubscribeRequest,
    entity::newsletter_subscribers::{
        ActiveModel as SubscriberActive, Column as SubscriberCol, Entity as Subscribers,
        Model as SubscriberModel,
    },
    error::{AppError, AppResult},
    models::NewsletterSubscriber,
    response::ApiResponse,
    state::AppState,
};

pub const DEFAULT_SOURCE: &str = "website";

pub async fn subscribe(
    state: &AppState,
    payload: SubscribeRequest,
) -> AppResult<ApiResponse<NewsletterSubscriber>> {
    let email = normalize_email(&payload.email)?;
    let name = payload.name.filter(|n| !n.trim().is_empty());
    let source = payload
        .source
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let existing = Subscribers::find()
        .filter(SubscriberCol::Email.eq(email.clone()))
        .one(&state.orm)
        .await?;

    let (subscriber, message) = match existing {
        Some(row) if row.is_active => {
            return Err(AppError::BadRequest(
                "this email is already subscribed".to_string(),
            ));
        }
        Some(row) => {
            let mut active = row.into_active_model();
            active.is_active = Set(true);
            active.subscribed_at = Set(Utc::now().into());
            active.unsubscribed_at = Set(None);
            if name.is_some() {
                active.name = Set(name);
            }
            (active.update(&state.orm).await?, "Subscription reactivated")
        }
        None => {
            let row = SubscriberActive {
                id: Set(Uuid::new_v4()),
                email: Set(email.clone()),
                name: Set(name),
                source: Set(source),
                is_active: Set(true),
                subscribed_at: NotSet,
                unsubscribed_at: Set(None),
            }
            .insert(&state.orm)
            .await?;
            (row, "Subscribed")
        }
    };

    audit::record(
        &state.pool,
        None,
        "newsletter_subscribe",
        "newsletter_subscribers",
        serde_json::json!({ "email": subscriber.email }),
    )
    .await;

    Ok(ApiResponse::success(
        message,
        subscriber_from_entity(subscriber),
        None,
    ))
}

/// Trimmed, lowercased address; rejects anything without a dotted domain.
pub fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }
    let dotted_domain = email
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.') && !domain.ends_with('.'));
    if !email.validate_email() || !dotted_domain {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }
    Ok(email)
}

fn subscriber_from_entity(model: SubscriberModel) -> NewsletterSubscriber {
    NewsletterSubscriber {
        id: model.id,
        email: model.email,
        name: model.name,
        source: model.source,
        is_active: model.is_active,
        subscribed_at: model.subscribed_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lowercased() {
        assert!(matches!(
            normalize_email("  Ana@Example.COM "),
            Ok(ref email) if email == "ana@example.com"
        ));
    }

    #[test]
    fn rejects_missing_or_malformed_email() {
        for raw in ["", "   ", "ana", "ana@", "ana@localhost", "@example.com"] {
            assert!(
                matches!(normalize_email(raw), Err(AppError::BadRequest(_))),
                "{raw:?} should be rejected"
            );
        }
    }
}
