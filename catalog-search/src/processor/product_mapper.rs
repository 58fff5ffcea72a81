//! Product document mapper.
//!
//! Turns a fully populated product into the denormalized search document.
//! Pure: no I/O and no failure mode. Every optional field gets a default.

use std::collections::HashSet;

use catalog_search_shared::{
    CategoryRef, CategorySummary, DocumentCategory, DocumentImage, DocumentSeller, DocumentTag,
    HierarchyEntry, PopulatedProduct, SearchDocument, Seller,
};
use tracing::{debug, instrument};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_STATUS: &str = "available";
pub const DEFAULT_CONDITION: &str = "new";

/// Maps populated products to search documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductMapper;

impl ProductMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map one product.
    pub fn map(&self, product: &PopulatedProduct) -> SearchDocument {
        map_product_to_document(product)
    }

    /// Map a whole catalog, preserving input order.
    #[instrument(skip(self, products), fields(product_count = products.len()))]
    pub fn map_batch(&self, products: &[PopulatedProduct]) -> Vec<SearchDocument> {
        let documents: Vec<SearchDocument> = products.iter().map(map_product_to_document).collect();
        debug!(document_count = documents.len(), "Mapped product batch");
        documents
    }
}

/// Build the search document for `product`.
pub fn map_product_to_document(product: &PopulatedProduct) -> SearchDocument {
    let category = product.category.as_ref();
    let parent = category.and_then(|c| c.parent.as_deref());
    let seller = product.seller.as_ref().map(flatten_seller);

    SearchDocument {
        id: product.id,
        title: product.title.clone().unwrap_or_default(),
        slug: product.slug.clone(),
        sku: product.sku.clone(),
        description: product.description.clone(),
        price: product.price.unwrap_or(0.0),
        price_usd: product.price_usd.unwrap_or(0.0),
        price_eur: product.price_eur.unwrap_or(0.0),
        price_uah: product.price_uah.unwrap_or(0.0),
        currency: non_empty_or(&product.currency, DEFAULT_CURRENCY),
        status: non_empty_or(&product.status, DEFAULT_STATUS),
        views: product.views.unwrap_or(0),
        created_at: product.created_at,
        updated_at: product.updated_at,
        published_at: product.published_at,
        attributes: product.attributes.clone(),
        available: product.available.unwrap_or(true),
        condition: non_empty_or(&product.condition, DEFAULT_CONDITION),
        video_url: product.video_url.clone(),

        category: category.map(|c| DocumentCategory {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
            description: c.description.clone(),
            parent: c.parent.as_deref().map(summarize),
        }),
        category_id: category.map(|c| c.id),
        category_name: category.map(|c| c.name.clone()),
        category_slug: category.map(|c| c.slug.clone()),
        parent_category_id: parent.map(|p| p.id),
        parent_category_name: parent.map(|p| p.name.clone()),
        parent_category_slug: parent.map(|p| p.slug.clone()),
        category_hierarchy: category.map(build_hierarchy).unwrap_or_default(),

        tags: map_tags(product),

        seller_id: seller.as_ref().map(|s| s.id),
        seller_company_name: seller.as_ref().and_then(|s| s.company_name.clone()),
        seller,

        images: product
            .images
            .iter()
            .map(|image| DocumentImage {
                id: image.id,
                url: image.url.clone(),
                alternative_text: image.alternative_text.clone(),
                width: image.width,
                height: image.height,
            })
            .collect(),
        subcategories: product.subcategories.iter().map(summarize).collect(),
    }
}

fn non_empty_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn summarize(category: &CategoryRef) -> CategorySummary {
    CategorySummary {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
    }
}

/// The direct category at level 0, then each ancestor. A category seen
/// twice ends the walk.
fn build_hierarchy(category: &CategoryRef) -> Vec<HierarchyEntry> {
    let mut hierarchy = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(category);

    while let Some(c) = current {
        if !seen.insert(c.id) {
            break;
        }
        hierarchy.push(HierarchyEntry {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
            level: hierarchy.len() as u32,
        });
        current = c.parent.as_deref();
    }

    hierarchy
}

fn map_tags(product: &PopulatedProduct) -> Vec<DocumentTag> {
    let mut seen = HashSet::new();
    product
        .tags
        .iter()
        .filter(|tag| seen.insert(tag.id))
        .map(|tag| DocumentTag {
            id: tag.id,
            name: tag.name.clone(),
            slug: tag.slug.clone(),
        })
        .collect()
}

fn flatten_seller(seller: &Seller) -> DocumentSeller {
    let metadata = seller.metadata.as_ref();

    DocumentSeller {
        id: seller.id,
        username: seller.username.clone(),
        email: seller.email.clone(),
        company_name: metadata.and_then(|m| m.company_name.clone()),
        business_type: metadata.and_then(|m| m.business_type.clone()),
        country: metadata.and_then(|m| m.country.clone()),
        avatar_url: metadata
            .and_then(|m| m.avatar.as_ref())
            .map(|avatar| avatar.url.clone()),
    }
}
