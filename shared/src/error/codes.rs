//! Unified error codes for the delivery catalog
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store errors
//! - 4xxx: Product errors
//! - 5xxx: Category errors
//! - 6xxx: Favorite errors
//! - 7xxx: File / image errors
//! - 8xxx: External service errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so clients can branch on
/// a number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Caller does not own the resource
    NotOwner = 2004,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Owner already has an active store with this name
    StoreNameExists = 3002,
    /// Store is not active
    StoreInactive = 3003,
    /// Address could not be resolved
    AddressInvalid = 3004,

    // ==================== 4xxx: Product ====================
    /// Product not found
    ProductNotFound = 4001,
    /// Product has invalid price
    ProductInvalidPrice = 4002,
    /// Product image is required
    ProductImageRequired = 4003,

    // ==================== 5xxx: Category ====================
    /// Category not found
    CategoryNotFound = 5001,
    /// Category name already exists
    CategoryNameExists = 5002,

    // ==================== 6xxx: Favorite ====================
    /// Store is not in the user's favorites
    FavoriteNotFound = 6001,
    /// Store is already in the user's favorites
    FavoriteAlreadyExists = 6002,

    // ==================== 7xxx: File / Image ====================
    /// File too large
    FileTooLarge = 7001,
    /// Unsupported file format
    UnsupportedFileFormat = 7002,
    /// Invalid image file
    InvalidImageFile = 7003,
    /// No file provided
    NoFileProvided = 7004,
    /// Empty file
    EmptyFile = 7005,
    /// Image processing failed
    ImageProcessingFailed = 7006,
    /// File storage failed
    FileStorageFailed = 7007,

    // ==================== 8xxx: External services ====================
    /// Geocoding failed
    GeocodingFailed = 8001,
    /// Geocoding unavailable
    GeocodingUnavailable = 8002,
    /// Storage provider rejected the request
    StorageProviderError = 8101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Authorization required",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotOwner => "Resource belongs to another user",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::StoreNameExists => "Store with this name already exists",
            ErrorCode::StoreInactive => "Store is not active",
            ErrorCode::AddressInvalid => "Address could not be resolved",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::ProductImageRequired => "Product image is required",

            // Category
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // Favorite
            ErrorCode::FavoriteNotFound => "Store is not in favorites",
            ErrorCode::FavoriteAlreadyExists => "Store is already in favorites",

            // File / Image
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // External services
            ErrorCode::GeocodingFailed => "Geocoding failed",
            ErrorCode::GeocodingUnavailable => "Geocoding service unavailable",
            ErrorCode::StorageProviderError => "Image storage provider error",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::NotOwner),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::StoreNameExists),
            3003 => Ok(ErrorCode::StoreInactive),
            3004 => Ok(ErrorCode::AddressInvalid),

            // Product
            4001 => Ok(ErrorCode::ProductNotFound),
            4002 => Ok(ErrorCode::ProductInvalidPrice),
            4003 => Ok(ErrorCode::ProductImageRequired),

            // Category
            5001 => Ok(ErrorCode::CategoryNotFound),
            5002 => Ok(ErrorCode::CategoryNameExists),

            // Favorite
            6001 => Ok(ErrorCode::FavoriteNotFound),
            6002 => Ok(ErrorCode::FavoriteAlreadyExists),

            // File / Image
            7001 => Ok(ErrorCode::FileTooLarge),
            7002 => Ok(ErrorCode::UnsupportedFileFormat),
            7003 => Ok(ErrorCode::InvalidImageFile),
            7004 => Ok(ErrorCode::NoFileProvided),
            7005 => Ok(ErrorCode::EmptyFile),
            7006 => Ok(ErrorCode::ImageProcessingFailed),
            7007 => Ok(ErrorCode::FileStorageFailed),

            // External services
            8001 => Ok(ErrorCode::GeocodingFailed),
            8002 => Ok(ErrorCode::GeocodingUnavailable),
            8101 => Ok(ErrorCode::StorageProviderError),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
