//! Response envelopes
//!
//! Successful responses wrap their payload with `success`, `message` and a
//! millisecond `timestamp`. Collections are keyed by the resource's plural
//! name (`stores`, `products`, ...) and single items by its singular name.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::util::now_millis;

/// Names a resource inside an envelope
pub trait Resource {
    /// Key for a single item, e.g. `store`
    const ONE: &'static str;
    /// Key for a collection, e.g. `stores`
    const MANY: &'static str;
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=0&size=20` query parameters (zero-based pages)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    /// Requested size clamped to `1..=MAX_PAGE_SIZE`
    pub fn size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page()) * i64::from(self.size())
    }

    /// Rows to fetch: one extra row tells whether a next page exists
    pub fn probe_limit(&self) -> i64 {
        i64::from(self.size()) + 1
    }
}

/// A page of rows fetched with [`PageQuery::probe_limit`]
#[derive(Debug, Clone)]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub page: u32,
    pub size: u32,
}

impl<T> Slice<T> {
    pub fn from_probe(mut rows: Vec<T>, query: &PageQuery) -> Self {
        let size = query.size();
        let has_next = rows.len() > size as usize;
        rows.truncate(size as usize);
        Self {
            items: rows,
            has_next,
            page: query.page(),
            size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Slice<U> {
        Slice {
            items: self.items.into_iter().map(f).collect(),
            has_next: self.has_next,
            page: self.page,
            size: self.size,
        }
    }
}

/// Paginated envelope:
/// `{<many>, totalCount, hasNext, hasPrevious, currentPage, pageSize, success, message, timestamp}`
#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    pub slice: Slice<T>,
    pub message: Option<String>,
    pub timestamp: i64,
}

impl<T> PageResponse<T> {
    pub fn new(slice: Slice<T>) -> Self {
        Self {
            slice,
            message: None,
            timestamp: now_millis(),
        }
    }
}

impl<T: Serialize + Resource> Serialize for PageResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(9))?;
        map.serialize_entry(T::MANY, &self.slice.items)?;
        map.serialize_entry("totalCount", &self.slice.items.len())?;
        map.serialize_entry("hasNext", &self.slice.has_next)?;
        map.serialize_entry("hasPrevious", &(self.slice.page > 0))?;
        map.serialize_entry("currentPage", &self.slice.page)?;
        map.serialize_entry("pageSize", &self.slice.size)?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

/// Unpaginated envelope: `{<many>, totalCount, success, message, timestamp}`
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub message: Option<String>,
    pub timestamp: i64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            message: None,
            timestamp: now_millis(),
        }
    }
}

impl<T: Serialize + Resource> Serialize for ListResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry(T::MANY, &self.items)?;
        map.serialize_entry("totalCount", &self.items.len())?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

/// Single-item envelope: `{<one>, success, message, timestamp}`
#[derive(Debug, Clone)]
pub struct ItemResponse<T> {
    pub item: T,
    pub message: Option<String>,
    pub timestamp: i64,
}

impl<T> ItemResponse<T> {
    pub fn new(item: T) -> Self {
        Self {
            item,
            message: None,
            timestamp: now_millis(),
        }
    }

    pub fn with_message(item: T, message: impl Into<String>) -> Self {
        Self {
            item,
            message: Some(message.into()),
            timestamp: now_millis(),
        }
    }
}

impl<T: Serialize + Resource> Serialize for ItemResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(T::ONE, &self.item)?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

/// Extra context attached to favorite responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_count: i64,
    pub user_id: i64,
    pub operation: String,
}

/// Generic data envelope: `{data, success, message, timestamp, metadata?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl<T> DataResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            success: true,
            message: message.into(),
            timestamp: now_millis(),
            metadata: None,
        }
    }

    /// Successful operation with no payload
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: true,
            message: message.into(),
            timestamp: now_millis(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Dish {
        id: i64,
    }

    impl Resource for Dish {
        const ONE: &'static str = "dish";
        const MANY: &'static str = "dishes";
    }

    #[test]
    fn test_page_query_defaults_and_clamp() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 0);
        assert_eq!(q.size(), 20);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.probe_limit(), 21);

        let q = PageQuery {
            page: Some(3),
            size: Some(500),
        };
        assert_eq!(q.size(), MAX_PAGE_SIZE);
        assert_eq!(q.offset(), 300);

        let q = PageQuery {
            page: Some(1),
            size: Some(0),
        };
        assert_eq!(q.size(), 1);
    }

    #[test]
    fn test_slice_detects_next_page() {
        let q = PageQuery {
            page: Some(0),
            size: Some(2),
        };
        let slice = Slice::from_probe(vec![1, 2, 3], &q);
        assert_eq!(slice.items, vec![1, 2]);
        assert!(slice.has_next);

        let slice = Slice::from_probe(vec![1, 2], &q);
        assert!(!slice.has_next);
    }

    #[test]
    fn test_page_response_shape() {
        let q = PageQuery {
            page: Some(1),
            size: Some(2),
        };
        let slice = Slice::from_probe(vec![Dish { id: 1 }, Dish { id: 2 }, Dish { id: 3 }], &q);
        let json = serde_json::to_value(PageResponse::new(slice)).unwrap();

        assert_eq!(json["dishes"].as_array().unwrap().len(), 2);
        assert_eq!(json["totalCount"], 2);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrevious"], true);
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["success"], true);
        assert!(json["message"].is_null());
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_item_and_list_response_keys() {
        let json = serde_json::to_value(ItemResponse::new(Dish { id: 9 })).unwrap();
        assert_eq!(json["dish"]["id"], 9);
        assert_eq!(json["success"], true);

        let json = serde_json::to_value(ListResponse::new(vec![Dish { id: 1 }])).unwrap();
        assert_eq!(json["dishes"][0]["id"], 1);
        assert_eq!(json["totalCount"], 1);
    }

    #[test]
    fn test_data_response_metadata_optional() {
        let json = serde_json::to_value(DataResponse::success(true, "ok")).unwrap();
        assert_eq!(json["data"], true);
        assert!(json.get("metadata").is_none());

        let resp = DataResponse::<()>::empty("removed").with_metadata(ResponseMetadata {
            total_count: 0,
            user_id: 7,
            operation: "REMOVE".into(),
        });
        let json = serde_json::to_value(resp).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["metadata"]["userId"], 7);
        assert_eq!(json["metadata"]["operation"], "REMOVE");
    }
}
