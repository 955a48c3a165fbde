use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::products::ProductList,
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
    storage::{OrmProductCatalog, ProductCatalog},
};

pub const SEARCH_MIN_CHARS: usize = 2;
pub const SEARCH_LIMIT: u64 = 10;
pub const LOOKUP_MAX_IDS: usize = 100;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = contains_pattern(search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    if query.in_stock.unwrap_or(false) {
        condition = condition.add(Column::Stock.gt(0));
    }

    if query.on_sale.unwrap_or(false) {
        // discount_price is in euros, price in cents.
        condition = condition
            .add(Column::DiscountPrice.is_not_null())
            .add(
                Expr::expr(Expr::col(Column::DiscountPrice).mul(100))
                    .lt(Expr::col(Column::Price)),
            )
            .add(
                Condition::any()
                    .add(Column::DiscountEndDate.is_null())
                    .add(Column::DiscountEndDate.gt(Utc::now())),
            );
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items: Vec<Product> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

/// Wraps user input in `%..%` for ILIKE, escaping its own wildcards.
fn contains_pattern(raw: &str) -> String {
    let mut pattern = String::with_capacity(raw.len() + 2);
    pattern.push('%');
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let result = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    let result = match result {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", result, None))
}

/// Case-insensitive match on name or artist, capped at ten results.
/// Queries shorter than two characters return nothing.
pub async fn search_products(
    state: &AppState,
    query: Option<String>,
) -> AppResult<ApiResponse<ProductList>> {
    let query = query.unwrap_or_default();
    let query = query.trim();
    if query.chars().count() < SEARCH_MIN_CHARS {
        return Ok(ApiResponse::success(
            "Search",
            ProductList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    }

    let pattern = contains_pattern(query);
    let items = Products::find()
        .filter(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Artist).ilike(pattern)),
        )
        .order_by_asc(Column::Name)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Search",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

/// Batch read by id, as used by cart hydration.
pub async fn lookup_products(
    state: &AppState,
    ids: Vec<Uuid>,
) -> AppResult<ApiResponse<ProductList>> {
    if ids.len() > LOOKUP_MAX_IDS {
        return Err(AppError::BadRequest(format!(
            "at most {LOOKUP_MAX_IDS} ids per lookup"
        )));
    }

    let catalog = OrmProductCatalog::new(state.orm.clone());
    let items = catalog.products_by_ids(&ids).await?;

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::empty()),
    ))
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        price: model.price,
        discount_price: model.discount_price,
        discount_end_date: model.discount_end_date.map(|dt| dt.with_timezone(&Utc)),
        stock: model.stock,
        sizes: model.sizes,
        colors: model.colors,
        images: model.images,
        artist: model.artist,
    }
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("tee"), "%tee%");
        assert_eq!(contains_pattern("%%"), "%\\%\\%%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
