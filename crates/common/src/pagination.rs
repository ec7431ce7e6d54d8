//! Pagination utilities shared by services and HTTP handlers.

use serde::Deserialize;

/// Pagination parameters, usable directly as an axum `Query`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Pagination {
    /// 1-based page index
    #[serde(default = "default_page")]
    pub page: u32,
    /// items per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 { 1 }
fn default_per_page() -> u32 { 20 }

impl Pagination {
    /// Clamp to sane defaults and convert to a 0-based page index and page size.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: default_page(), per_page: default_per_page() } }
}
