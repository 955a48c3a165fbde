use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{CartRowList, ReplaceCartRequest},
        coupons::{GeneratedCouponCode, ValidateCouponRequest},
        newsletter::SubscribeRequest,
        products::{ProductList, ProductLookupRequest},
        reviews::{CreateReviewRequest, ProductReviews},
        sizing::SizeRecommendationRequest,
        stock_notifications::StockNotificationRequest,
    },
    models::{
        CartRow, CouponSummary, CouponValidation, DiscountType, NewsletterSubscriber, Product,
        Review, ReviewStats, StockNotification,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, cart, coupons, health, newsletter, params, products, sizing as sizing_routes,
        stock_notifications,
    },
    services::sizing::{FitPreference, Size, SizeRecommendation},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::search_products,
        products::lookup_products,
        products::get_product,
        products::list_reviews,
        products::create_review,
        cart::cart_list,
        cart::replace_cart,
        coupons::validate_coupon,
        admin::generate_coupon_code,
        newsletter::subscribe,
        stock_notifications::subscribe,
        sizing_routes::recommend
    ),
    components(
        schemas(
            Product,
            CartRow,
            DiscountType,
            CouponSummary,
            CouponValidation,
            Review,
            ReviewStats,
            NewsletterSubscriber,
            StockNotification,
            Size,
            FitPreference,
            SizeRecommendation,
            ProductList,
            ProductLookupRequest,
            CartRowList,
            ReplaceCartRequest,
            ValidateCouponRequest,
            GeneratedCouponCode,
            CreateReviewRequest,
            ProductReviews,
            SubscribeRequest,
            StockNotificationRequest,
            SizeRecommendationRequest,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CouponValidation>,
            ApiResponse<ProductReviews>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Catalog reads and search"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Cart", description = "Per-user cart rows"),
        (name = "Coupons", description = "Coupon validation"),
        (name = "Admin", description = "Admin endpoints"),
        (name = "Newsletter", description = "Newsletter subscriptions"),
        (name = "Stock alerts", description = "Back-in-stock notifications"),
        (name = "Sizing", description = "Size recommendation"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
