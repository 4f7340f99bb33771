//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::response::Resource;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub pic_url: String,
    #[serde(skip)]
    pub pic_id: Option<String>,
    pub is_popular: bool,
    pub is_available: bool,
    pub rating: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// A discount counts only when it is strictly positive
    pub fn has_discount(&self) -> bool {
        self.discount_price.is_some_and(|d| d > Decimal::ZERO)
    }

    /// Price the customer pays
    pub fn final_price(&self) -> Decimal {
        match self.discount_price {
            Some(d) if d > Decimal::ZERO => d,
            _ => self.price,
        }
    }
}

/// Product as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub has_discount: bool,
    pub final_price: Decimal,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            has_discount: product.has_discount(),
            final_price: product.final_price(),
            product,
        }
    }
}

impl Resource for ProductResponse {
    const ONE: &'static str = "product";
    const MANY: &'static str = "products";
}

/// Lightweight row for store menus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProductBrief {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub pic_url: String,
    pub is_available: bool,
    pub rating: Decimal,
}

impl Resource for ProductBrief {
    const ONE: &'static str = "product";
    const MANY: &'static str = "products";
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub store_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_popular: bool,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub is_available: Option<bool>,
    pub is_popular: Option<bool>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: Decimal, discount: Option<Decimal>) -> Product {
        Product {
            id: 5,
            store_id: 1,
            category_id: 2,
            name: "Margherita".into(),
            description: None,
            price,
            discount_price: discount,
            pic_url: "https://img/p.jpg".into(),
            pic_id: None,
            is_popular: false,
            is_available: true,
            rating: Decimal::ZERO,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_final_price_uses_positive_discount() {
        let p = product(Decimal::new(1000, 2), Some(Decimal::new(850, 2)));
        assert!(p.has_discount());
        assert_eq!(p.final_price(), Decimal::new(850, 2));
    }

    #[test]
    fn test_zero_or_missing_discount_ignored() {
        let p = product(Decimal::new(1000, 2), Some(Decimal::ZERO));
        assert!(!p.has_discount());
        assert_eq!(p.final_price(), Decimal::new(1000, 2));

        let p = product(Decimal::new(1000, 2), None);
        assert!(!p.has_discount());
        assert_eq!(p.final_price(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_response_flattens_product() {
        let resp = ProductResponse::from(product(Decimal::new(1000, 2), Some(Decimal::new(500, 2))));
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json["storeId"], 1);
        assert_eq!(json["hasDiscount"], true);
        assert_eq!(json["finalPrice"], 5.0);
        assert!(json.get("picId").is_none());
    }

    #[test]
    fn test_create_defaults() {
        let req: ProductCreate = serde_json::from_str(
            r#"{"storeId":1,"categoryId":2,"name":"Soup","price":4.5}"#,
        )
        .unwrap();
        assert!(req.is_available);
        assert!(!req.is_popular);
        assert_eq!(req.price, Decimal::new(45, 1));
    }
}
