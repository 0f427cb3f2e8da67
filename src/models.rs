/// A shortened URL record from the `url_pairs` table.
///
/// Rows are written once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UrlPair {
    /// The long-form URL exactly as submitted.
    pub url: String,
    /// The generated alias.
    pub s_url: String,
}

impl UrlPair {
    pub fn new(url: impl Into<String>, s_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            s_url: s_url.into(),
        }
    }
}
