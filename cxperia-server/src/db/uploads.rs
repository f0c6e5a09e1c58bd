//! Upload metadata (the media itself lives with the hosting provider)

use cxperia_common::db::Upload;
use cxperia_common::Result;
use sqlx::SqlitePool;

pub async fn insert_upload(pool: &SqlitePool, upload: &Upload) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO uploads (id, brand_id, url, public_id, resource_type, bytes, format, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&upload.id)
    .bind(&upload.brand_id)
    .bind(&upload.url)
    .bind(&upload.public_id)
    .bind(&upload.resource_type)
    .bind(upload.bytes)
    .bind(&upload.format)
    .bind(upload.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_uploads(
    pool: &SqlitePool,
    brand_id: &str,
    resource_type: Option<&str>,
) -> Result<Vec<Upload>> {
    let uploads = sqlx::query_as::<_, Upload>(
        r#"
        SELECT * FROM uploads
        WHERE brand_id = ?1 AND (?2 IS NULL OR resource_type = ?2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(brand_id)
    .bind(resource_type)
    .fetch_all(pool)
    .await?;
    Ok(uploads)
}

pub async fn delete_upload(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM uploads WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
