//! Scenarios against the live API named by HOSTNAMEAPI (e.g. https://dummyjson.com/).
//! Ignored by default; run with `cargo test --test live_api_test -- --ignored`.

use anyhow::Result;
use e2e_accelerator::domain::resources::{AddUserRequest, ProductCategory, ProductList, User};
use e2e_accelerator::{AppConfig, ListQuery, StoreApiClient};

async fn logged_in_client() -> Result<StoreApiClient> {
    let config = AppConfig::from_env()?;
    let mut client = StoreApiClient::new(&config.api)?;
    client.init().await?;
    Ok(client)
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_init_returns_token() -> Result<()> {
    let config = AppConfig::from_env()?;
    let mut client = StoreApiClient::new(&config.api)?;

    let login = client.init().await?;

    assert_eq!(login.status.as_u16(), 200);
    assert!(client.token().is_some());
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_get_user_by_id() -> Result<()> {
    let client = logged_in_client().await?;

    let user: User = client.get_user_by_id(3).await?.json()?;

    assert_eq!(user.id, Some(3));
    assert_eq!(user.email.as_deref(), Some("sophia.brown@x.dummyjson.com"));
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_unknown_user_is_not_found() -> Result<()> {
    let client = logged_in_client().await?;

    let outcome = client.get_user_by_id(406).await?;

    assert_eq!(outcome.status.as_u16(), 404);
    assert_eq!(outcome.status_text, "Not Found");
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_add_user_echoes_payload() -> Result<()> {
    let client = logged_in_client().await?;
    let request = AddUserRequest {
        first_name: "Lettuce".to_string(),
        last_name: "H".to_string(),
        age: 23,
        username: "lettuceH".to_string(),
        gender: "female".to_string(),
        email: "test@test.com".to_string(),
        password: "test123".to_string(),
        maiden_name: None,
        birth_date: None,
        image: None,
        blood_group: None,
        height: None,
        weight: None,
        eye_color: None,
        university: None,
        role: None,
        extra: Default::default(),
    };

    let outcome = client.add_user(&request).await?;
    assert_eq!(outcome.status.as_u16(), 201);

    let user: User = outcome.json()?;
    assert!(user.id.is_some());
    assert_eq!(user.username.as_deref(), Some("lettuceH"));
    assert_eq!(user.age, Some(23));
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_products_by_category_match_category() -> Result<()> {
    let client = logged_in_client().await?;

    let categories: Vec<ProductCategory> = client.get_products_categories().await?.json()?;
    let category = categories.first().expect("at least one category");

    let outcome = client.get_products_by_category(&category.slug).await?;
    assert_eq!(outcome.status.as_u16(), 200);

    let list: ProductList = outcome.json()?;
    for product in &list.products {
        assert_eq!(
            product.category.as_deref().map(str::to_lowercase),
            Some(category.slug.to_lowercase())
        );
    }
    Ok(())
}

#[tokio::test]
#[ignore = "calls the live API"]
async fn test_paginated_selection() -> Result<()> {
    let client = logged_in_client().await?;
    let query = ListQuery::new().limit(3).skip(0).select(["title", "price"]);

    let list: ProductList = client.get_products(&query).await?.json()?;

    assert!(list.products.len() <= 3);
    assert_eq!(list.skip, 0);
    assert_eq!(list.limit, 3);
    for product in &list.products {
        assert!(product.title.is_some());
        assert!(product.price.is_some());
        assert!(product.description.is_none());
        assert!(product.category.is_none());
    }
    Ok(())
}
