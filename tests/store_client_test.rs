use anyhow::Result;
use e2e_accelerator::domain::resources::{
    AddProductRequest, AuthResponse, Product, ProductList, UpdateProductRequest,
    UpdateUserRequest, User,
};
use e2e_accelerator::{ApiConfig, AcceleratorError, Credentials, ListQuery, StoreApiClient};
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> StoreApiClient {
    let config = ApiConfig::new(server.base_url(), Credentials::new("emilys", "emilyspass"));
    StoreApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_init_attaches_bearer_token() -> Result<()> {
    let server = MockServer::start();

    let login_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/auth/login")
            .header("content-type", "application/json")
            .json_body(json!({"username": "emilys", "password": "emilyspass"}));
        then.status(200).json_body(json!({
            "id": 1,
            "username": "emilys",
            "accessToken": "token-1",
            "refreshToken": "refresh-1"
        }));
    });
    let user_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/users/3")
            .header("authorization", "Bearer token-1");
        then.status(200).json_body(json!({
            "id": 3,
            "firstName": "Sophia",
            "email": "sophia.brown@x.dummyjson.com"
        }));
    });

    let mut client = client_for(&server);
    let login = client.init().await?;
    assert_eq!(login.status.as_u16(), 200);
    assert_eq!(login.json::<AuthResponse>()?.access_token.as_deref(), Some("token-1"));
    assert_eq!(client.token(), Some("token-1"));

    let user: User = client.get_user_by_id(3).await?.json()?;

    login_mock.assert();
    user_mock.assert();
    assert_eq!(user.id, Some(3));
    assert_eq!(user.email.as_deref(), Some("sophia.brown@x.dummyjson.com"));
    Ok(())
}

#[tokio::test]
async fn test_init_twice_keeps_a_single_latest_authorization_header() -> Result<()> {
    let server = MockServer::start();

    let mut first_login = server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200).json_body(json!({"accessToken": "old-token"}));
    });

    let mut client = client_for(&server);
    client.init().await?;
    first_login.assert();
    first_login.delete();

    let second_login = server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(200).json_body(json!({"accessToken": "new-token"}));
    });
    client.init().await?;
    second_login.assert();

    let values: Vec<_> = client.http().headers().get_all("authorization").iter().collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0], "Bearer new-token");

    let products_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/products/1")
            .header("authorization", "Bearer new-token");
        then.status(200).json_body(json!({"id": 1, "title": "Essence Mascara Lash Princess"}));
    });
    let product: Product = client.get_product_by_id(1).await?.json()?;
    products_mock.assert();
    assert_eq!(product.id, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_rejected_login_leaves_client_unauthenticated() -> Result<()> {
    let server = MockServer::start();

    let login_mock = server.mock(|when, then| {
        when.method(POST).path("/auth/login");
        then.status(400).json_body(json!({"message": "Invalid credentials"}));
    });
    let me_mock = server.mock(|when, then| {
        when.method(GET).path("/users/1");
        then.status(401).json_body(json!({"message": "Access Token is required"}));
    });

    let mut client = client_for(&server);
    let login = client.init().await?;

    login_mock.assert();
    assert_eq!(login.status.as_u16(), 400);
    assert!(!client.is_authenticated());
    assert!(client.http().headers().get("authorization").is_none());

    let outcome = client.get_user_by_id(1).await?;
    me_mock.assert();
    assert_eq!(outcome.status.as_u16(), 401);
    assert_eq!(outcome.status_text, "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn test_missing_user_is_a_404_outcome() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/users/406");
        then.status(404)
            .json_body(json!({"message": "User with id '406' not found"}));
    });

    let client = client_for(&server);
    let outcome = client.get_user_by_id(406).await?;

    api_mock.assert();
    assert_eq!(outcome.status.as_u16(), 404);
    assert_eq!(outcome.status_text, "Not Found");
    let body: User = outcome.json()?;
    assert_eq!(body.id, None);
    assert_eq!(body.message.as_deref(), Some("User with id '406' not found"));
    Ok(())
}

#[tokio::test]
async fn test_product_list_sends_only_provided_parameters() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/products")
            .query_param("limit", "3")
            .query_param("skip", "0")
            .query_param("select", "title,price");
        then.status(200).json_body(json!({
            "products": [
                {"id": 1, "title": "Essence Mascara Lash Princess", "price": 9.99},
                {"id": 2, "title": "Eyeshadow Palette with Mirror", "price": 19.99},
                {"id": 3, "title": "Powder Canister", "price": 14.99}
            ],
            "total": 194,
            "skip": 0,
            "limit": 3
        }));
    });

    let client = client_for(&server);
    let query = ListQuery::new().limit(3).skip(0).select(["title,price"]);
    let list: ProductList = client.get_products(&query).await?.json()?;

    api_mock.assert();
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

#[tokio::test]
async fn test_product_list_without_parameters() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/products");
        then.status(200)
            .json_body(json!({"products": [], "total": 0, "skip": 0, "limit": 30}));
    });

    let client = client_for(&server);
    let list: ProductList = client.get_products(&ListQuery::new()).await?.json()?;

    api_mock.assert();
    assert!(list.products.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_delete_product_targets_doubled_id_path() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(DELETE).path("/products/11");
        then.status(200).json_body(json!({"id": 11, "isDeleted": true}));
    });

    let client = client_for(&server);
    let outcome = client.delete_product_by_id(1).await?;

    api_mock.assert();
    let deleted: Product = outcome.json()?;
    assert_eq!(deleted.is_deleted, Some(true));
    Ok(())
}

#[tokio::test]
async fn test_user_and_product_writes() -> Result<()> {
    let server = MockServer::start();
    let put_user = server.mock(|when, then| {
        when.method(PUT)
            .path("/users/40")
            .json_body(json!({"firstName": "Updated Name", "email": "updated.email@example.com"}));
        then.status(200).json_body(json!({
            "id": 40,
            "firstName": "Updated Name",
            "email": "updated.email@example.com"
        }));
    });
    let patch_product = server.mock(|when, then| {
        when.method(httpmock::Method::PATCH)
            .path("/products/1")
            .json_body(json!({"stock": 999}));
        then.status(200).json_body(json!({"id": 1, "stock": 999}));
    });
    let add_product = server.mock(|when, then| {
        when.method(POST).path("/products/add").json_body(json!({
            "title": "BMW Pencil",
            "price": 2.99,
            "category": "stationery",
            "description": "TEST"
        }));
        then.status(201).json_body(json!({
            "id": 195,
            "title": "BMW Pencil",
            "price": 2.99,
            "category": "stationery"
        }));
    });

    let client = client_for(&server);

    let user: User = client
        .put_user_by_id(
            40,
            &UpdateUserRequest {
                first_name: Some("Updated Name".to_string()),
                email: Some("updated.email@example.com".to_string()),
                ..Default::default()
            },
        )
        .await?
        .json()?;
    assert_eq!(user.first_name.as_deref(), Some("Updated Name"));

    let patched: Product = client
        .patch_product_by_id(
            1,
            &UpdateProductRequest {
                stock: Some(999),
                ..Default::default()
            },
        )
        .await?
        .json()?;
    assert_eq!(patched.stock, Some(999));

    let created = client
        .add_product(&AddProductRequest {
            title: "BMW Pencil".to_string(),
            price: 2.99,
            category: "stationery".to_string(),
            description: Some("TEST".to_string()),
            brand: None,
            stock: None,
        })
        .await?;
    assert_eq!(created.status.as_u16(), 201);
    let product: Product = created.json()?;
    assert!(product.id.is_some());
    assert_eq!(product.price, Some(2.99));

    put_user.assert();
    patch_product.assert();
    add_product.assert();
    Ok(())
}

#[tokio::test]
async fn test_network_failure_is_wrapped_with_resource_context() {
    let config = ApiConfig::new("http://127.0.0.1:1", Credentials::new("emilys", "emilyspass"));
    let client = StoreApiClient::new(&config).unwrap();

    let error = client.get_product_by_id(7).await.unwrap_err();

    assert!(error.is_network_failure());
    assert!(matches!(error, AcceleratorError::Request { .. }));
    assert!(error.to_string().starts_with("get product 7: "));
}

#[tokio::test]
async fn test_login_network_failure_is_an_error() {
    let config = ApiConfig::new("http://127.0.0.1:1", Credentials::new("emilys", "emilyspass"));
    let mut client = StoreApiClient::new(&config).unwrap();

    let error = client.init().await.unwrap_err();

    assert!(error.is_network_failure());
    assert!(error.to_string().starts_with("authenticate as 'emilys'"));
    assert!(!client.is_authenticated());
}
