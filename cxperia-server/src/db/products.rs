//! Product catalog persistence

use cxperia_common::db::Product;
use cxperia_common::Result;
use sqlx::SqlitePool;

use super::{found, like_pattern};

pub async fn insert_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO products (id, brand_id, name, description, category, image_urls,
                              price, currency, usage_duration_days, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&product.id)
    .bind(&product.brand_id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.image_urls)
    .bind(product.price)
    .bind(&product.currency)
    .bind(product.usage_duration_days)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Product owned by `brand_id`
pub async fn get_product(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .fetch_optional(pool)
        .await?;
    found(product, "Product")
}

pub async fn list_products(
    pool: &SqlitePool,
    brand_id: &str,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT * FROM products
        WHERE brand_id = ?1 AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\')
        ORDER BY created_at DESC
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(brand_id)
    .bind(search.map(like_pattern))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn count_products(pool: &SqlitePool, brand_id: &str, search: Option<&str>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products WHERE brand_id = ?1 AND (?2 IS NULL OR name LIKE ?2 ESCAPE '\\')",
    )
    .bind(brand_id)
    .bind(search.map(like_pattern))
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// All products of a brand by name, for the public viewer
pub async fn list_all_products(pool: &SqlitePool, brand_id: &str) -> Result<Vec<Product>> {
    let products =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE brand_id = ? ORDER BY name ASC")
            .bind(brand_id)
            .fetch_all(pool)
            .await?;
    Ok(products)
}

/// Full overwrite of the editable columns
pub async fn update_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET name = ?, description = ?, category = ?, image_urls = ?, price = ?,
            currency = ?, usage_duration_days = ?, updated_at = ?
        WHERE id = ? AND brand_id = ?
        "#,
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.image_urls)
    .bind(product.price)
    .bind(&product.currency)
    .bind(product.usage_duration_days)
    .bind(product.updated_at)
    .bind(&product.id)
    .bind(&product.brand_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a product (its experiences cascade); false if nothing matched
pub async fn delete_product(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
pub(crate) fn sample_product(brand_id: &str, name: &str) -> Product {
    let now = chrono::Utc::now();
    Product {
        id: super::new_id(),
        brand_id: brand_id.to_string(),
        name: name.to_string(),
        description: None,
        category: Some("skincare".to_string()),
        image_urls: sqlx::types::Json(vec!["https://img.test/a.png".to_string()]),
        price: Some(24.5),
        currency: "USD".to_string(),
        usage_duration_days: Some(90),
        created_at: now,
        updated_at: now,
    }
}
