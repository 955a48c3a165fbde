use storefront_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response
        .0
        .data
        .ok_or_else(|| anyhow::anyhow!("missing health data"))?;
    assert_eq!(data.status, "ok");
    assert_eq!(data.service, "storefront-api");
    assert!(!data.version.is_empty());
    Ok(())
}
