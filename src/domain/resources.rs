//! Request and response payloads for the store API under test.
//!
//! Response types keep every field optional so that partial payloads
//! (`select=title,price`, error bodies, deleted resources) still decode;
//! a field the server did not send is `None`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(alias = "token", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<u64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub maiden_name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub is_deleted: Option<bool>,
    pub deleted_on: Option<String>,
    /// Error bodies such as `{"message": "User with id '450' not found"}`.
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub username: String,
    pub gender: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Nested objects (address, bank, company, ...) passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub stock: Option<i64>,
    pub tags: Option<Vec<String>>,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub thumbnail: Option<String>,
    pub is_deleted: Option<bool>,
    pub deleted_on: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    pub title: String,
    pub price: f64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_order_quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selected_fields_leave_the_rest_empty() {
        let list: ProductList = serde_json::from_value(json!({
            "products": [
                {"id": 1, "title": "Essence Mascara Lash Princess", "price": 9.99},
                {"id": 2, "title": "Eyeshadow Palette with Mirror", "price": 19.99}
            ],
            "total": 194,
            "skip": 0,
            "limit": 2
        }))
        .unwrap();

        assert_eq!(list.products.len(), 2);
        for product in &list.products {
            assert!(product.title.is_some());
            assert!(product.price.is_some());
            assert!(product.description.is_none());
            assert!(product.category.is_none());
        }
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let patch = UpdateProductRequest {
            stock: Some(999),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"stock": 999}));
    }

    #[test]
    fn test_auth_response_accepts_legacy_token_field() {
        let legacy: AuthResponse = serde_json::from_value(json!({"token": "abc"})).unwrap();
        assert_eq!(legacy.access_token.as_deref(), Some("abc"));

        let current: AuthResponse =
            serde_json::from_value(json!({"accessToken": "def", "refreshToken": "ghi"})).unwrap();
        assert_eq!(current.access_token.as_deref(), Some("def"));
        assert_eq!(current.refresh_token.as_deref(), Some("ghi"));
    }

    #[test]
    fn test_add_user_request_uses_camel_case() {
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
            extra: serde_json::Map::new(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["firstName"], "Lettuce");
        assert_eq!(value["lastName"], "H");
        assert!(value.get("maidenName").is_none());
    }
}
