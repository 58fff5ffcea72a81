//! Row types and the pure assembly of populated products from them.

use std::collections::{HashMap, HashSet};

use catalog_search_shared::{Category, CategoryRef, MediaFile, PopulatedProduct, Seller, Tag};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::profile::PopulateProfile;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub id: i64,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub price_usd: Option<f64>,
    pub price_eur: Option<f64>,
    pub price_uah: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub views: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub attributes: Option<Value>,
    pub available: Option<bool>,
    pub condition: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            parent_id: row.parent_id,
        }
    }
}

/// One row of a `<owner>_<field>_links` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub owner_id: i64,
    pub target_id: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TagRow {
    pub owner_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SellerRow {
    pub owner_id: i64,
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub metadata_id: Option<i64>,
    pub company_name: Option<String>,
    pub business_type: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MediaRow {
    pub owner_id: i64,
    pub id: i64,
    pub url: String,
    pub name: Option<String>,
    pub alternative_text: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub mime: Option<String>,
}

impl From<MediaRow> for MediaFile {
    fn from(row: MediaRow) -> Self {
        MediaFile {
            id: row.id,
            url: row.url,
            name: row.name,
            alternative_text: row.alternative_text,
            width: row.width,
            height: row.height,
            mime: row.mime,
        }
    }
}

/// Relations loaded for a page of products, keyed by product id.
#[derive(Debug, Default)]
pub(crate) struct ProductRelations {
    /// Every category referenced, including ancestors when requested.
    pub categories: HashMap<i64, CategoryRow>,
    pub category_links: HashMap<i64, i64>,
    pub subcategory_links: HashMap<i64, Vec<i64>>,
    pub tags: HashMap<i64, Vec<Tag>>,
    pub sellers: HashMap<i64, Seller>,
    pub images: HashMap<i64, Vec<MediaFile>>,
}

/// Build the category of `id` with its ancestor chain.
///
/// Stops at a missing parent or at an id already on the chain, so cyclic
/// parent links produce a finite chain.
pub(crate) fn category_chain(
    id: i64,
    categories: &HashMap<i64, CategoryRow>,
    with_ancestors: bool,
) -> Option<CategoryRef> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(id);

    while let Some(category_id) = current {
        if !visited.insert(category_id) {
            break;
        }
        let Some(row) = categories.get(&category_id) else {
            break;
        };
        chain.push(row);
        if !with_ancestors {
            break;
        }
        current = row.parent_id;
    }

    chain.into_iter().rev().fold(None, |parent, row| {
        Some(CategoryRef {
            id: row.id,
            name: row.name.clone(),
            slug: row.slug.clone(),
            description: row.description.clone(),
            parent: parent.map(Box::new),
        })
    })
}

/// Combine a product row with its loaded relations.
pub(crate) fn assemble_product(
    row: ProductRow,
    relations: &ProductRelations,
    profile: PopulateProfile,
) -> PopulatedProduct {
    let id = row.id;

    let category = relations
        .category_links
        .get(&id)
        .and_then(|category_id| {
            category_chain(*category_id, &relations.categories, profile.category_ancestors())
        });

    let subcategories = relations
        .subcategory_links
        .get(&id)
        .map(|ids| {
            ids.iter()
                .filter_map(|sub_id| category_chain(*sub_id, &relations.categories, false))
                .collect()
        })
        .unwrap_or_default();

    PopulatedProduct {
        id,
        title: row.title,
        slug: row.slug,
        sku: row.sku,
        description: row.description,
        price: row.price,
        price_usd: row.price_usd,
        price_eur: row.price_eur,
        price_uah: row.price_uah,
        currency: row.currency,
        status: row.status,
        views: row.views,
        created_at: row.created_at,
        updated_at: row.updated_at,
        published_at: row.published_at,
        attributes: row.attributes,
        available: row.available,
        condition: row.condition,
        video_url: row.video_url,
        category,
        tags: relations.tags.get(&id).cloned().unwrap_or_default(),
        seller: relations.sellers.get(&id).cloned(),
        images: relations.images.get(&id).cloned().unwrap_or_default(),
        subcategories,
    }
}
