pub mod cart_service;
pub mod cart_store;
pub mod coupon;
pub mod coupon_service;
pub mod newsletter_service;
pub mod product_service;
pub mod reservation;
pub mod review_service;
pub mod sizing;
pub mod stock_alert_service;
pub mod wishlist_store;
