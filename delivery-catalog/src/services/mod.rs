//! Outbound integrations and image processing

pub mod geocoding;
pub mod image_convert;
pub mod storage;

pub use geocoding::GeocodingService;
pub use image_convert::{ImageConverter, ProcessedImage};
pub use storage::{CloudinaryStorage, ImageStorage, StoredImage};
