//! Business details printed on statements.

use serde::Serialize;

pub const DEFAULT_BUSINESS_NAME: &str = "My Business";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BusinessProfile {
    pub name: String,
    /// Empty when not set.
    pub phone: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUSINESS_NAME.to_string(),
            phone: String::new(),
        }
    }
}
