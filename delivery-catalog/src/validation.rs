//! Input validation helpers
//!
//! Length limits mirror the column sizes in `migrations/0001_catalog.sql`.

use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{
    AddressInput, CategoryPayload, NearbyStoreQuery, ProductCreate, ProductUpdate, StoreCreate,
    StoreUpdate,
};

// ── Text length limits ──────────────────────────────────────────────

pub const MAX_STORE_NAME_LEN: usize = 100;
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
pub const MAX_CATEGORY_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_PRODUCT_DESCRIPTION_LEN: usize = 1000;
pub const MAX_STREET_LEN: usize = 200;
pub const MAX_CITY_LEN: usize = 100;
pub const MAX_POSTAL_CODE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_SEARCH_LEN: usize = 100;

// ── Numeric bounds ──────────────────────────────────────────────────

pub const DELIVERY_RADIUS_KM: (i32, i32) = (1, 50);
pub const DELIVERY_TIME_MIN: (i32, i32) = (10, 180);
pub const NEARBY_RADIUS_KM: (f64, f64) = (1.0, 50.0);
pub const NEARBY_LIMIT: (usize, usize) = (1, 100);

fn max_delivery_fee() -> Decimal {
    Decimal::new(9_999_999, 2)
}

fn max_price() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_field(field, format!("{field} must not be empty")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", value.chars().count()),
        ));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::invalid_field(
            field,
            format!("{field} is too long ({} chars, max {max_len})", v.chars().count()),
        ));
    }
    Ok(())
}

/// Inclusive bounds check; NaN is outside every range
pub fn validate_range<T: PartialOrd + Copy + std::fmt::Display>(
    value: Option<T>,
    field: &str,
    (min, max): (T, T),
) -> Result<(), AppError> {
    if let Some(v) = value
        && !(min..=max).contains(&v)
    {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Money amount: within bounds and at most two fraction digits
pub fn validate_amount(
    value: Option<Decimal>,
    field: &str,
    min: Decimal,
    max: Decimal,
) -> Result<(), AppError> {
    let Some(v) = value else {
        return Ok(());
    };
    if v < min || v > max {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must be between {min} and {max}"),
        ));
    }
    if v.normalize().scale() > 2 {
        return Err(AppError::invalid_field(
            field,
            format!("{field} must have at most 2 decimal places"),
        ));
    }
    Ok(())
}

/// `+` optional, then 2 to 15 digits not starting with 0
pub fn validate_phone(value: &Option<String>) -> Result<(), AppError> {
    let Some(phone) = value.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !valid {
        return Err(AppError::invalid_field("phone", "Invalid phone number format"));
    }
    Ok(())
}

pub fn validate_email(value: &Option<String>) -> Result<(), AppError> {
    let Some(email) = value.as_deref().filter(|e| !e.is_empty()) else {
        return Ok(());
    };
    validate_optional_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::invalid_field("email", "Invalid email format"));
    }
    Ok(())
}

// ── Entity payloads ─────────────────────────────────────────────────

pub fn validate_address(address: &AddressInput) -> Result<(), AppError> {
    validate_required_text(&address.street, "address.street", MAX_STREET_LEN)?;
    validate_required_text(&address.city, "address.city", MAX_CITY_LEN)?;
    validate_optional_text(&address.region, "address.region", MAX_CITY_LEN)?;
    validate_optional_text(&address.country, "address.country", MAX_CITY_LEN)?;
    validate_optional_text(&address.postal_code, "address.postalCode", MAX_POSTAL_CODE_LEN)?;
    validate_range(address.latitude, "address.latitude", (Decimal::from(-90), Decimal::from(90)))?;
    validate_range(
        address.longitude,
        "address.longitude",
        (Decimal::from(-180), Decimal::from(180)),
    )?;
    Ok(())
}

pub fn validate_store_create(req: &StoreCreate) -> Result<(), AppError> {
    validate_required_text(&req.name, "name", MAX_STORE_NAME_LEN)?;
    validate_optional_text(&req.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_address(&req.address)?;
    validate_phone(&req.phone)?;
    validate_email(&req.email)?;
    validate_range(req.delivery_radius, "deliveryRadius", DELIVERY_RADIUS_KM)?;
    validate_amount(req.delivery_fee, "deliveryFee", Decimal::ZERO, max_delivery_fee())?;
    validate_range(req.estimated_delivery_time, "estimatedDeliveryTime", DELIVERY_TIME_MIN)?;
    Ok(())
}

pub fn validate_store_update(req: &StoreUpdate) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_STORE_NAME_LEN)?;
    }
    validate_optional_text(&req.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(address) = &req.address {
        validate_address(address)?;
    }
    validate_phone(&req.phone)?;
    validate_email(&req.email)?;
    validate_range(req.delivery_radius, "deliveryRadius", DELIVERY_RADIUS_KM)?;
    validate_amount(req.delivery_fee, "deliveryFee", Decimal::ZERO, max_delivery_fee())?;
    validate_range(req.estimated_delivery_time, "estimatedDeliveryTime", DELIVERY_TIME_MIN)?;
    Ok(())
}

pub fn validate_product_create(req: &ProductCreate) -> Result<(), AppError> {
    validate_required_text(&req.name, "name", MAX_PRODUCT_NAME_LEN)?;
    validate_optional_text(&req.description, "description", MAX_PRODUCT_DESCRIPTION_LEN)?;
    validate_amount(Some(req.price), "price", Decimal::new(1, 2), max_price())?;
    validate_amount(req.discount_price, "discountPrice", Decimal::ZERO, max_price())?;
    Ok(())
}

pub fn validate_product_update(req: &ProductUpdate) -> Result<(), AppError> {
    if let Some(name) = &req.name {
        validate_required_text(name, "name", MAX_PRODUCT_NAME_LEN)?;
    }
    validate_optional_text(&req.description, "description", MAX_PRODUCT_DESCRIPTION_LEN)?;
    validate_amount(req.price, "price", Decimal::new(1, 2), max_price())?;
    validate_amount(req.discount_price, "discountPrice", Decimal::ZERO, max_price())?;
    Ok(())
}

pub fn validate_category(req: &CategoryPayload) -> Result<(), AppError> {
    validate_required_text(&req.name, "name", MAX_CATEGORY_NAME_LEN)?;
    validate_optional_text(&req.description, "description", MAX_DESCRIPTION_LEN)?;
    Ok(())
}

pub fn validate_nearby(query: &NearbyStoreQuery) -> Result<(), AppError> {
    validate_range(Some(query.latitude), "latitude", (-90.0, 90.0))?;
    validate_range(Some(query.longitude), "longitude", (-180.0, 180.0))?;
    validate_range(Some(query.radius_km), "radiusKm", NEARBY_RADIUS_KM)?;
    validate_range(Some(query.limit), "limit", NEARBY_LIMIT)?;
    Ok(())
}

/// Trimmed search term, required and bounded
pub fn search_term(name: &str) -> Result<String, AppError> {
    validate_required_text(name, "name", MAX_SEARCH_LEN)?;
    Ok(name.trim().to_string())
}
