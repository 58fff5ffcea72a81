//! Integration tests for the PostgreSQL primary store.
//!
//! These tests require a real PostgreSQL database and use SQLx test macros
//! to ensure proper test isolation and cleanup.
//!
//! Run with: `cargo test --test postgres_primary_store`

use catalog_store_repository::{PopulateProfile, PostgresPrimaryStore, PrimaryStore};

/// Seeds a small catalog:
///
/// weapons (1) -> rifles (2) -> bolt-action (3) -> scopes (4), plus a
/// standalone `optics` (5). Product 42 sits in rifles with one tag, a seller
/// with metadata and avatar, two images and an optics subcategory.
async fn seed_catalog(pool: &sqlx::PgPool) {
    let statements = [
        "INSERT INTO categories (id, name, slug, description) VALUES
            (1, 'Weapons', 'weapons', NULL),
            (2, 'Rifles', 'rifles', 'Long guns'),
            (3, 'Bolt action', 'bolt-action', NULL),
            (4, 'Scopes', 'scopes', NULL),
            (5, 'Optics', 'optics', NULL)",
        "INSERT INTO categories_parent_links (category_id, inv_category_id) VALUES
            (2, 1), (3, 2), (4, 3)",
        "INSERT INTO tags (id, name, slug) VALUES (10, 'Used', 'used'), (11, 'Rare', 'rare')",
        "INSERT INTO up_users (id, username, email) VALUES (7, 'gunsmith', 'shop@example.com')",
        "INSERT INTO seller_metadata (id, user_id, company_name, business_type, country)
            VALUES (70, 7, 'Gunsmith Ltd', 'company', 'UA')",
        "INSERT INTO files (id, name, url, width, height, mime) VALUES
            (100, 'front.jpg', '/uploads/front.jpg', 800, 600, 'image/jpeg'),
            (101, 'back.jpg', '/uploads/back.jpg', 800, 600, 'image/jpeg'),
            (102, 'avatar.png', '/uploads/avatar.png', 64, 64, 'image/png')",
        "INSERT INTO files_related_morphs (file_id, related_id, related_type, field, \"order\") VALUES
            (101, 42, 'api::product.product', 'images', 2),
            (100, 42, 'api::product.product', 'images', 1),
            (102, 70, 'api::seller-metadata.seller-metadata', 'avatar', 1)",
        "INSERT INTO products (id, title, price_usd, price_eur, price_uah, status, views, available)
            VALUES
            (42, 'AK furniture set', 100.00, 90.00, 4000.00, 'available', 12, TRUE),
            (43, 'Sling', 15.50, NULL, NULL, NULL, NULL, NULL)",
        "INSERT INTO products_category_links (product_id, category_id) VALUES (42, 2), (43, 5)",
        "INSERT INTO products_subcategories_links (product_id, category_id, category_order)
            VALUES (42, 5, 1)",
        "INSERT INTO products_tags_links (product_id, tag_id, tag_order) VALUES (42, 10, 1)",
        "INSERT INTO products_seller_links (product_id, user_id) VALUES (42, 7)",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await.unwrap();
    }
}

// ============================================================================
// Products
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_product_by_id_full_profile(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let product = store
        .find_product_by_id(42, PopulateProfile::ProductFull)
        .await
        .unwrap()
        .expect("product 42 exists");

    assert_eq!(product.title.as_deref(), Some("AK furniture set"));
    assert_eq!(product.price_usd, Some(100.0));
    assert_eq!(product.price_eur, Some(90.0));
    assert_eq!(product.price_uah, Some(4000.0));
    assert_eq!(product.views, Some(12));

    let category = product.category.expect("category populated");
    assert_eq!(category.slug, "rifles");
    assert_eq!(category.description.as_deref(), Some("Long guns"));
    let parent = category.parent.expect("parent populated");
    assert_eq!(parent.slug, "weapons");
    assert!(parent.parent.is_none());

    assert_eq!(product.tags.len(), 1);
    assert_eq!(product.tags[0].slug, "used");

    let seller = product.seller.expect("seller populated");
    assert_eq!(seller.username.as_deref(), Some("gunsmith"));
    let metadata = seller.metadata.expect("seller metadata populated");
    assert_eq!(metadata.company_name.as_deref(), Some("Gunsmith Ltd"));
    assert_eq!(metadata.country.as_deref(), Some("UA"));
    assert_eq!(
        metadata.avatar.map(|avatar| avatar.url).as_deref(),
        Some("/uploads/avatar.png")
    );

    let image_urls: Vec<&str> = product.images.iter().map(|image| image.url.as_str()).collect();
    assert_eq!(image_urls, vec!["/uploads/front.jpg", "/uploads/back.jpg"]);

    assert_eq!(product.subcategories.len(), 1);
    assert_eq!(product.subcategories[0].slug, "optics");
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_product_by_id_card_profile(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let product = store
        .find_product_by_id(42, PopulateProfile::ProductCard)
        .await
        .unwrap()
        .unwrap();

    let category = product.category.unwrap();
    assert_eq!(category.slug, "rifles");
    assert!(category.parent.is_none());
    assert!(product.tags.is_empty());
    assert!(product.seller.is_none());
    assert!(product.subcategories.is_empty());
    assert_eq!(product.images.len(), 2);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_product_by_id_missing(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let product = store
        .find_product_by_id(999, PopulateProfile::ProductFull)
        .await
        .unwrap();

    assert!(product.is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_product_with_empty_relations(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let product = store
        .find_product_by_id(43, PopulateProfile::ProductFull)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(product.price_usd, Some(15.5));
    assert!(product.price_eur.is_none());
    assert!(product.status.is_none());
    assert!(product.seller.is_none());
    assert!(product.tags.is_empty());
    assert!(product.images.is_empty());
    assert_eq!(product.category.unwrap().slug, "optics");
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_all_products(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let products = store
        .find_all_products(PopulateProfile::ProductFull)
        .await
        .unwrap();

    let ids: Vec<i64> = products.iter().map(|product| product.id).collect();
    assert_eq!(ids, vec![42, 43]);
    assert_eq!(products[0].tags.len(), 1);
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_all_products_empty_catalog(pool: sqlx::PgPool) {
    let store = PostgresPrimaryStore::new(pool);

    let products = store
        .find_all_products(PopulateProfile::ProductFull)
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_cyclic_parent_links_terminate(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    sqlx::query("INSERT INTO categories_parent_links (category_id, inv_category_id) VALUES (1, 2)")
        .execute(&pool)
        .await
        .unwrap();
    let store = PostgresPrimaryStore::new(pool);

    let product = store
        .find_product_by_id(42, PopulateProfile::ProductFull)
        .await
        .unwrap()
        .unwrap();

    let category = product.category.unwrap();
    assert_eq!(category.slug, "rifles");
    let parent = category.parent.unwrap();
    assert_eq!(parent.slug, "weapons");
    assert!(parent.parent.is_none());
}

// ============================================================================
// Categories
// ============================================================================

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_category_by_slug(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let rifles = store.find_category_by_slug("rifles").await.unwrap().unwrap();
    assert_eq!(rifles.id, 2);
    assert_eq!(rifles.parent_id, Some(1));

    let weapons = store.find_category_by_slug("weapons").await.unwrap().unwrap();
    assert_eq!(weapons.parent_id, None);

    assert!(store.find_category_by_slug("nonexistent").await.unwrap().is_none());
}

#[sqlx::test(migrations = "src/postgres/migrations")]
async fn test_find_child_categories(pool: sqlx::PgPool) {
    seed_catalog(&pool).await;
    let store = PostgresPrimaryStore::new(pool);

    let children = store.find_child_categories(2).await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].slug, "bolt-action");
    assert_eq!(children[0].parent_id, Some(2));

    let leaf_children = store.find_child_categories(4).await.unwrap();
    assert!(leaf_children.is_empty());
}
