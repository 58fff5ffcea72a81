//! Sort clause construction.

use catalog_search_shared::{price_field_for, Currency, SortDirection, SortField, SortSpec};
use serde_json::{json, Value};

/// Index field a sort resolves to.
///
/// Text fields sort on their normalized `keyword` sub-field; price sorts on
/// the field of the requested currency.
pub fn sort_field_name(field: SortField, currency: Option<Currency>) -> &'static str {
    match field {
        SortField::Relevance => "_score",
        SortField::Title => "title.keyword",
        SortField::Description => "description.keyword",
        SortField::CategoryName => "categoryName.keyword",
        SortField::SellerCompanyName => "sellerCompanyName.keyword",
        SortField::Price => price_field_for(currency),
        SortField::CreatedAt => "createdAt",
        SortField::UpdatedAt => "updatedAt",
        SortField::PublishedAt => "publishedAt",
        SortField::Views => "views",
    }
}

/// Build the sort array for a search body.
///
/// Without an explicit sort, text searches order by relevance and plain
/// listings by newest first. Product id breaks ties so paging is stable.
pub fn build_sort(sort: Option<&SortSpec>, currency: Option<Currency>, has_text: bool) -> Vec<Value> {
    let spec = sort.copied().unwrap_or_else(|| {
        if has_text {
            SortSpec::new(SortField::Relevance, SortDirection::Desc)
        } else {
            SortSpec::new(SortField::CreatedAt, SortDirection::Desc)
        }
    });

    let field = sort_field_name(spec.field, currency);
    let primary = if spec.field == SortField::Relevance {
        json!({ field: { "order": spec.direction.as_str() } })
    } else {
        json!({ field: { "order": spec.direction.as_str(), "missing": "_last" } })
    };

    vec![primary, json!({ "id": { "order": "asc" } })]
}
