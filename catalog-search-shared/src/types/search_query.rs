//! Search query intents for the product index.
//!
//! A query intent describes *what* the caller wants (text, category scope,
//! price range in a currency, facets to filter on, sort, page). Translating an
//! intent into a search-engine query body is the job of the query translator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of hits per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Deepest hit a paginated search may reach (`from + size`).
///
/// Matches the engine's default `index.max_result_window`.
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Field holding the legacy single-currency price.
pub const LEGACY_PRICE_FIELD: &str = "price";

/// Currencies that have a dedicated price field in the index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    USD,
    EUR,
    UAH,
}

impl Currency {
    /// Every indexed currency, in a stable order.
    pub const ALL: [Currency; 3] = [Currency::USD, Currency::EUR, Currency::UAH];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::UAH => "UAH",
        }
    }

    /// The document field holding the price in this currency.
    pub fn price_field(&self) -> &'static str {
        match self {
            Currency::USD => "priceUSD",
            Currency::EUR => "priceEUR",
            Currency::UAH => "priceUAH",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "UAH" => Ok(Currency::UAH),
            other => Err(format!("unsupported currency '{}'", other)),
        }
    }
}

/// Resolve the price field for an optional currency.
///
/// Falls back to the legacy unified field only when no currency is given.
pub fn price_field_for(currency: Option<Currency>) -> &'static str {
    currency
        .map(|c| c.price_field())
        .unwrap_or(LEGACY_PRICE_FIELD)
}

/// Inclusive price bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Filters shared by search and aggregation requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Free-text term, matched fuzzily.
    #[serde(default)]
    pub text: Option<String>,
    /// Category scope; expands to the category and all of its descendants.
    #[serde(default)]
    pub category_slug: Option<String>,
    /// Explicit category list. When non-empty, `category_slug` is ignored.
    #[serde(default)]
    pub category_slugs: Vec<String>,
    #[serde(default)]
    pub price: Option<PriceRange>,
    /// Currency whose price field the range and price sort apply to.
    #[serde(default)]
    pub currency: Option<Currency>,
    /// Tag slugs; a product matches if it has any of them.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Subcategory slugs; a product matches if it lists any of them.
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub seller_id: Option<i64>,
}

impl SearchFilters {
    /// The category slug that must be expanded into a closure, if any.
    ///
    /// Returns `None` when an explicit category list is present, since that
    /// list already expresses the full category intent.
    pub fn closure_slug(&self) -> Option<&str> {
        if !self.category_slugs.is_empty() {
            return None;
        }
        self.category_slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The free-text term, if it contains anything besides whitespace.
    pub fn text_term(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Fields a search can be sorted on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Relevance,
    Title,
    Description,
    CategoryName,
    SellerCompanyName,
    Price,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
    Views,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s.trim() {
            "relevance" | "_score" => SortField::Relevance,
            "title" => SortField::Title,
            "description" => SortField::Description,
            "categoryName" | "category" => SortField::CategoryName,
            "sellerCompanyName" | "companyName" | "seller" => SortField::SellerCompanyName,
            "price" => SortField::Price,
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "publishedAt" => SortField::PublishedAt,
            "views" => SortField::Views,
            other => return Err(format!("unsupported sort field '{}'", other)),
        };
        Ok(field)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unsupported sort direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// A paginated search request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntent {
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for SearchIntent {
    fn default() -> Self {
        Self {
            filters: SearchFilters::default(),
            sort: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl SearchIntent {
    /// A first-page search with the given filters.
    pub fn with_filters(filters: SearchFilters) -> Self {
        Self {
            filters,
            ..Default::default()
        }
    }

    /// Page number clamped to at least 1.
    pub fn effective_page(&self) -> usize {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset of the first hit of the requested page, saturating on overflow.
    pub fn offset(&self) -> usize {
        (self.effective_page() - 1).saturating_mul(self.effective_page_size())
    }

    /// `from + size` of the requested page, or `None` if it overflows.
    pub fn window_end(&self) -> Option<usize> {
        (self.effective_page() - 1)
            .checked_mul(self.effective_page_size())?
            .checked_add(self.effective_page_size())
    }

    /// True when the requested page lies inside `MAX_RESULT_WINDOW`.
    pub fn within_result_window(&self) -> bool {
        self.window_end().is_some_and(|end| end <= MAX_RESULT_WINDOW)
    }
}

/// A facet/statistics request over the same filters as a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AggregationIntent {
    #[serde(default)]
    pub filters: SearchFilters,
}

impl AggregationIntent {
    pub fn new(filters: SearchFilters) -> Self {
        Self { filters }
    }
}

impl From<&SearchIntent> for AggregationIntent {
    fn from(intent: &SearchIntent) -> Self {
        Self {
            filters: intent.filters.clone(),
        }
    }
}
