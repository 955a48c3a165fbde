pub mod cart;
pub mod coupons;
pub mod newsletter;
pub mod products;
pub mod reviews;
pub mod sizing;
pub mod stock_notifications;
