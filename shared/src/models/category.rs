//! Category Model

use serde::{Deserialize, Serialize};

use crate::response::Resource;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "imageUrl")]
    pub pic_url: Option<String>,
    #[serde(skip)]
    pub pic_id: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Resource for Category {
    const ONE: &'static str = "category";
    const MANY: &'static str = "categories";
}

/// Id/name/status projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CategoryBrief {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub sort_order: i32,
}

impl Resource for CategoryBrief {
    const ONE: &'static str = "category";
    const MANY: &'static str = "categories";
}

/// Count of categories per activity flag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub is_active: bool,
    pub count: i64,
}

/// Create / update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// `GET /api/categories/info`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryServiceInfo {
    pub service_name: &'static str,
    pub version: &'static str,
    pub active_categories_count: i64,
    pub status: &'static str,
}

impl CategoryServiceInfo {
    pub fn active(count: i64) -> Self {
        Self {
            service_name: "Categories Service",
            version: "1.0.0",
            active_categories_count: count,
            status: "Active",
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pic_url_exposed_as_image_url() {
        let cat = Category {
            id: 1,
            name: "Pizza".into(),
            description: None,
            pic_url: Some("https://img/c.jpg".into()),
            pic_id: Some("categories/x".into()),
            is_active: true,
            sort_order: 3,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_value(cat).unwrap();
        assert_eq!(json["imageUrl"], "https://img/c.jpg");
        assert_eq!(json["sortOrder"], 3);
        assert!(json.get("picId").is_none());
    }

    #[test]
    fn test_payload_defaults() {
        let p: CategoryPayload = serde_json::from_str(r#"{"name":"Drinks"}"#).unwrap();
        assert!(p.is_active);
        assert_eq!(p.sort_order, 0);
    }

    #[test]
    fn test_service_info_shape() {
        let json = serde_json::to_value(CategoryServiceInfo::active(4)).unwrap();
        assert_eq!(json["serviceName"], "Categories Service");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["activeCategoriesCount"], 4);
        assert_eq!(json["status"], "Active");
    }
}
