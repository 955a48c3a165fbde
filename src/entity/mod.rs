pub mod cart_items;
pub mod coupons;
pub mod newsletter_subscribers;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod stock_notifications;

pub use cart_items::Entity as CartItems;
pub use coupons::Entity as Coupons;
pub use newsletter_subscribers::Entity as NewsletterSubscribers;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use stock_notifications::Entity as StockNotifications;
