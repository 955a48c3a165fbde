use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod cart;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod params;
pub mod products;
pub mod sizing;
pub mod stock_notifications;

// State is attached by the caller.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/coupons", coupons::router())
        .nest("/newsletter", newsletter::router())
        .nest("/stock-notifications", stock_notifications::router())
        .nest("/size-recommendation", sizing::router())
        .nest("/admin", admin::router())
}
