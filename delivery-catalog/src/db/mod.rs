//! Database access layer
//!
//! Free functions over `&PgPool`, one module per table.

pub mod category;
pub mod favorite;
pub mod product;
pub mod store;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `%term%` for ILIKE, with LIKE wildcards in the term escaped
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
