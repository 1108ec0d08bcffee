//! List query and paginated result models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Patient;

/// Fixed number of rows per page.
pub const PAGE_SIZE: u32 = 20;

/// Column the list is sorted by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    #[serde(rename = "patientID")]
    PatientId,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "age")]
    Age,
}

impl SortField {
    /// Value of the `sort_by` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::PatientId => "patientID",
            SortField::Name => "name",
            SortField::Age => "age",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patientid" | "patient_id" | "id" => Ok(SortField::PatientId),
            "name" => Ok(SortField::Name),
            "age" => Ok(SortField::Age),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Value of the `sort_order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Search, paging and sorting parameters driving one list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Substring matched against patient ID and name
    pub search: String,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size: PAGE_SIZE,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl QueryState {
    /// Search term as sent on the wire; `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Query-string pairs for `GET /patients`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if let Some(term) = self.search_term() {
            params.push(("search", term.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("page_size", self.page_size.to_string()));
        params.push(("sort_by", self.sort_field.as_str().to_string()));
        params.push(("sort_order", self.sort_order.as_str().to_string()));
        params
    }

    /// Zero-based row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// Number of pages needed for `total` rows; 0 when there are no rows.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if total == 0 || page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One page of patients plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<Patient>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl ResultPage {
    /// Build a page, deriving `total_pages` from `total`.
    pub fn new(items: Vec<Patient>, total: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
