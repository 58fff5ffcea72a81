use std::collections::HashMap;

use async_trait::async_trait;
use catalog_search_shared::{Category, MediaFile, PopulatedProduct, Seller, SellerMetadata, Tag};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use super::rows::{
    assemble_product, CategoryRow, LinkRow, MediaRow, ProductRelations, ProductRow, SellerRow,
    TagRow,
};
use crate::{PopulateProfile, PrimaryStore, StoreError};

/// Products loaded per round trip when scanning the whole catalog.
const PRODUCT_PAGE_SIZE: i64 = 500;

const PRODUCT_MORPH_TYPE: &str = "api::product.product";
const SELLER_METADATA_MORPH_TYPE: &str = "api::seller-metadata.seller-metadata";

const PRODUCT_COLUMNS: &str = r#"
    SELECT p.id, p.title, p.slug, p.sku, p.description,
           p.price::float8 AS price,
           p.price_usd::float8 AS price_usd,
           p.price_eur::float8 AS price_eur,
           p.price_uah::float8 AS price_uah,
           p.currency, p.status, p.views,
           p.created_at, p.updated_at, p.published_at,
           p.attributes, p.available, p.condition, p.video_url
    FROM products p
"#;

const CATEGORY_COLUMNS: &str = r#"
    SELECT c.id, c.name, c.slug, c.description, l.inv_category_id AS parent_id
    FROM categories c
    LEFT JOIN categories_parent_links l ON l.category_id = c.id
"#;

pub struct PostgresPrimaryStore {
    pool: PgPool,
}

impl PostgresPrimaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    async fn populate(
        &self,
        rows: Vec<ProductRow>,
        profile: PopulateProfile,
    ) -> Result<Vec<PopulatedProduct>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut relations = ProductRelations::default();

        let mut category_ids = Vec::new();
        if profile.category() {
            for link in self.load_links("products_category_links", "category_id", "id", &ids).await? {
                category_ids.push(link.target_id);
                relations.category_links.insert(link.owner_id, link.target_id);
            }
        }
        if profile.subcategories() {
            for link in self
                .load_links("products_subcategories_links", "category_id", "category_order, id", &ids)
                .await?
            {
                category_ids.push(link.target_id);
                relations
                    .subcategory_links
                    .entry(link.owner_id)
                    .or_default()
                    .push(link.target_id);
            }
        }
        relations.categories = self
            .load_categories(category_ids, profile.category_ancestors())
            .await?;

        if profile.tags() {
            relations.tags = self.load_tags(&ids).await?;
        }
        if profile.seller() {
            relations.sellers = self.load_sellers(&ids).await?;
        }
        if profile.images() {
            relations.images = self.load_media(PRODUCT_MORPH_TYPE, "images", &ids).await?;
        }

        Ok(rows
            .into_iter()
            .map(|row| assemble_product(row, &relations, profile))
            .collect())
    }

    async fn load_links(
        &self,
        table: &str,
        target_column: &str,
        order_by: &str,
        product_ids: &[i64],
    ) -> Result<Vec<LinkRow>, StoreError> {
        let sql = format!(
            "SELECT product_id AS owner_id, {target_column} AS target_id \
             FROM {table} WHERE product_id = ANY($1) ORDER BY product_id, {order_by}"
        );

        let links = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(links)
    }

    /// Load categories by id, following parent links up to the roots when
    /// `with_ancestors` is set. Ids already loaded are never fetched twice,
    /// so cyclic parent links terminate.
    async fn load_categories(
        &self,
        ids: Vec<i64>,
        with_ancestors: bool,
    ) -> Result<HashMap<i64, CategoryRow>, StoreError> {
        let mut categories: HashMap<i64, CategoryRow> = HashMap::new();
        let mut pending = ids;
        pending.sort_unstable();
        pending.dedup();

        while !pending.is_empty() {
            let sql = format!("{CATEGORY_COLUMNS} WHERE c.id = ANY($1)");
            let rows = sqlx::query_as::<_, CategoryRow>(&sql)
                .bind(&pending)
                .fetch_all(&self.pool)
                .await?;

            let mut next = Vec::new();
            for row in rows {
                if with_ancestors {
                    if let Some(parent_id) = row.parent_id {
                        next.push(parent_id);
                    }
                }
                categories.insert(row.id, row);
            }

            next.retain(|id| !categories.contains_key(id));
            next.sort_unstable();
            next.dedup();
            pending = next;
        }

        Ok(categories)
    }

    async fn load_tags(&self, product_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, StoreError> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT l.product_id AS owner_id, t.id, t.name, t.slug
            FROM products_tags_links l
            JOIN tags t ON t.id = l.tag_id
            WHERE l.product_id = ANY($1)
            ORDER BY l.product_id, l.tag_order, l.id
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags.entry(row.owner_id)
                .or_default()
                .push(Tag::new(row.id, row.name, row.slug));
        }
        Ok(tags)
    }

    async fn load_sellers(&self, product_ids: &[i64]) -> Result<HashMap<i64, Seller>, StoreError> {
        let rows = sqlx::query_as::<_, SellerRow>(
            r#"
            SELECT l.product_id AS owner_id, u.id, u.username, u.email,
                   m.id AS metadata_id, m.company_name, m.business_type, m.country
            FROM products_seller_links l
            JOIN up_users u ON u.id = l.user_id
            LEFT JOIN seller_metadata m ON m.user_id = u.id
            WHERE l.product_id = ANY($1)
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let metadata_ids: Vec<i64> = rows.iter().filter_map(|row| row.metadata_id).collect();
        let avatars = if metadata_ids.is_empty() {
            HashMap::new()
        } else {
            self.load_media(SELLER_METADATA_MORPH_TYPE, "avatar", &metadata_ids)
                .await?
        };

        let mut sellers = HashMap::new();
        for row in rows {
            let metadata = row.metadata_id.map(|metadata_id| SellerMetadata {
                company_name: row.company_name,
                business_type: row.business_type,
                country: row.country,
                avatar: avatars
                    .get(&metadata_id)
                    .and_then(|files| files.first().cloned()),
            });

            sellers.insert(
                row.owner_id,
                Seller {
                    id: row.id,
                    username: row.username,
                    email: row.email,
                    metadata,
                },
            );
        }
        Ok(sellers)
    }

    /// Media attached to `related_type` rows through the polymorphic link
    /// table, grouped by owner id in link order.
    async fn load_media(
        &self,
        related_type: &str,
        field: &str,
        owner_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<MediaFile>>, StoreError> {
        let rows = sqlx::query_as::<_, MediaRow>(
            r#"
            SELECT m.related_id AS owner_id, f.id, f.url, f.name, f.alternative_text,
                   f.width, f.height, f.mime
            FROM files_related_morphs m
            JOIN files f ON f.id = m.file_id
            WHERE m.related_type = $1 AND m.field = $2 AND m.related_id = ANY($3)
            ORDER BY m.related_id, m."order", m.id
            "#,
        )
        .bind(related_type)
        .bind(field)
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut media: HashMap<i64, Vec<MediaFile>> = HashMap::new();
        for row in rows {
            media.entry(row.owner_id).or_default().push(row.into());
        }
        Ok(media)
    }
}

#[async_trait]
impl PrimaryStore for PostgresPrimaryStore {
    async fn find_product_by_id(
        &self,
        id: i64,
        profile: PopulateProfile,
    ) -> Result<Option<PopulatedProduct>, StoreError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(self.populate(vec![row], profile).await?.into_iter().next())
    }

    async fn find_all_products(
        &self,
        profile: PopulateProfile,
    ) -> Result<Vec<PopulatedProduct>, StoreError> {
        let sql = format!("{PRODUCT_COLUMNS} WHERE p.id > $1 ORDER BY p.id LIMIT $2");
        let mut products = Vec::new();
        let mut last_id = 0_i64;

        loop {
            let rows = sqlx::query_as::<_, ProductRow>(&sql)
                .bind(last_id)
                .bind(PRODUCT_PAGE_SIZE)
                .fetch_all(&self.pool)
                .await?;

            let Some(last) = rows.last() else {
                break;
            };
            last_id = last.id;
            let page_len = rows.len();

            products.extend(self.populate(rows, profile).await?);
            debug!(loaded = products.len(), "Loaded product page");

            if (page_len as i64) < PRODUCT_PAGE_SIZE {
                break;
            }
        }

        Ok(products)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let sql = format!("{CATEGORY_COLUMNS} WHERE c.slug = $1");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    async fn find_child_categories(&self, parent_id: i64) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT c.id, c.name, c.slug, c.description, l.inv_category_id AS parent_id
            FROM categories c
            JOIN categories_parent_links l ON l.category_id = c.id
            WHERE l.inv_category_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}
