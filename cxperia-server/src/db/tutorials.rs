//! Tutorial content persistence

use cxperia_common::db::Tutorial;
use cxperia_common::Result;
use sqlx::SqlitePool;

use super::found;

pub async fn insert_tutorial(pool: &SqlitePool, tutorial: &Tutorial) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tutorials (id, brand_id, experience_id, title, description, video_url,
                               thumbnail_url, is_published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tutorial.id)
    .bind(&tutorial.brand_id)
    .bind(&tutorial.experience_id)
    .bind(&tutorial.title)
    .bind(&tutorial.description)
    .bind(&tutorial.video_url)
    .bind(&tutorial.thumbnail_url)
    .bind(tutorial.is_published)
    .bind(tutorial.created_at)
    .bind(tutorial.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_tutorial(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<Tutorial> {
    let tutorial =
        sqlx::query_as::<_, Tutorial>("SELECT * FROM tutorials WHERE id = ? AND brand_id = ?")
            .bind(id)
            .bind(brand_id)
            .fetch_optional(pool)
            .await?;
    found(tutorial, "Tutorial")
}

pub async fn list_tutorials(pool: &SqlitePool, brand_id: &str) -> Result<Vec<Tutorial>> {
    let tutorials = sqlx::query_as::<_, Tutorial>(
        "SELECT * FROM tutorials WHERE brand_id = ? ORDER BY created_at DESC",
    )
    .bind(brand_id)
    .fetch_all(pool)
    .await?;
    Ok(tutorials)
}

/// Published tutorials for a public page: the experience's own first, then brand-wide
pub async fn list_public_tutorials(
    pool: &SqlitePool,
    brand_id: &str,
    experience_id: &str,
) -> Result<Vec<Tutorial>> {
    let tutorials = sqlx::query_as::<_, Tutorial>(
        r#"
        SELECT * FROM tutorials
        WHERE brand_id = ?1 AND is_published = 1
          AND (experience_id IS NULL OR experience_id = ?2)
        ORDER BY (experience_id = ?2) DESC, created_at DESC
        "#,
    )
    .bind(brand_id)
    .bind(experience_id)
    .fetch_all(pool)
    .await?;
    Ok(tutorials)
}

pub async fn update_tutorial(pool: &SqlitePool, tutorial: &Tutorial) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tutorials
        SET experience_id = ?, title = ?, description = ?, video_url = ?, thumbnail_url = ?,
            is_published = ?, updated_at = ?
        WHERE id = ? AND brand_id = ?
        "#,
    )
    .bind(&tutorial.experience_id)
    .bind(&tutorial.title)
    .bind(&tutorial.description)
    .bind(&tutorial.video_url)
    .bind(&tutorial.thumbnail_url)
    .bind(tutorial.is_published)
    .bind(tutorial.updated_at)
    .bind(&tutorial.id)
    .bind(&tutorial.brand_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_tutorial(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tutorials WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::brands::{insert_brand, sample_brand};
    use crate::db::experiences::{insert_experience, sample_experience};
    use crate::db::new_id;
    use crate::db::products::{insert_product, sample_product};
    use crate::db::test_support::test_pool;

    fn tutorial(brand_id: &str, experience_id: Option<&str>, title: &str, published: bool) -> Tutorial {
        let now = chrono::Utc::now();
        Tutorial {
            id: new_id(),
            brand_id: brand_id.to_string(),
            experience_id: experience_id.map(str::to_string),
            title: title.to_string(),
            description: None,
            video_url: Some("https://video.test/v.mp4".to_string()),
            thumbnail_url: None,
            is_published: published,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_public_tutorials_filter_and_order() {
        let (pool, _dir) = test_pool().await;
        let brand = sample_brand("B");
        insert_brand(&pool, &brand).await.unwrap();
        let product = sample_product(&brand.id, "P");
        insert_product(&pool, &product).await.unwrap();
        let exp = sample_experience(&brand.id, &product.id);
        insert_experience(&pool, &exp).await.unwrap();
        let other = sample_experience(&brand.id, &product.id);
        insert_experience(&pool, &other).await.unwrap();

        insert_tutorial(&pool, &tutorial(&brand.id, None, "brand-wide", true)).await.unwrap();
        insert_tutorial(&pool, &tutorial(&brand.id, Some(&exp.id), "own", true)).await.unwrap();
        insert_tutorial(&pool, &tutorial(&brand.id, Some(&other.id), "other", true)).await.unwrap();
        insert_tutorial(&pool, &tutorial(&brand.id, None, "draft", false)).await.unwrap();

        let public = list_public_tutorials(&pool, &brand.id, &exp.id).await.unwrap();
        let titles: Vec<_> = public.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["own", "brand-wide"]);

        assert_eq!(list_tutorials(&pool, &brand.id).await.unwrap().len(), 4);
    }
}
