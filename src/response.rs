use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_missing_meta_as_null() -> anyhow::Result<()> {
        let body = ApiResponse::success("Size recommendation", "L", None);
        let json = serde_json::to_value(&body)?;

        assert_eq!(
            json,
            serde_json::json!({ "message": "Size recommendation", "data": "L", "meta": null })
        );
        Ok(())
    }

    #[test]
    fn empty_meta_has_no_paging() -> anyhow::Result<()> {
        let json = serde_json::to_value(Meta::empty())?;
        assert_eq!(json, serde_json::json!({ "page": null, "per_page": null, "total": null }));
        Ok(())
    }
}
