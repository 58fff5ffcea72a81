//! Query translation.
//!
//! Pure builders that turn a typed search or aggregation intent into an
//! engine request body, and parsers for the engine's responses.

mod aggregation;
mod filters;
mod response;
mod search;
mod sort;

pub use aggregation::{build_aggregation_query, price_stats_name};
pub use filters::{CategoryScope, TEXT_FIELDS};
pub use response::{parse_aggregation_response, parse_search_response};
pub use search::build_search_query;
pub use sort::{build_sort, sort_field_name};
