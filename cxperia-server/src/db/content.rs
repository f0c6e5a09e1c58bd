//! Experience child records: usage steps, ingredients, feature toggles

use cxperia_common::db::{DigitalInstruction, Feature, FeatureFlag, Ingredient};
use cxperia_common::Result;
use sqlx::SqlitePool;

use super::{found, new_id};

/// New usage step, before numbering
#[derive(Debug, Clone)]
pub struct NewInstruction {
    pub title: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
}

pub async fn list_instructions(pool: &SqlitePool, experience_id: &str) -> Result<Vec<DigitalInstruction>> {
    let steps = sqlx::query_as::<_, DigitalInstruction>(
        "SELECT * FROM digital_instructions WHERE experience_id = ? ORDER BY step_number ASC",
    )
    .bind(experience_id)
    .fetch_all(pool)
    .await?;
    Ok(steps)
}

/// Replace all steps of an experience, numbering them 1..=n in order
pub async fn replace_instructions(
    pool: &SqlitePool,
    experience_id: &str,
    steps: &[NewInstruction],
) -> Result<Vec<DigitalInstruction>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM digital_instructions WHERE experience_id = ?")
        .bind(experience_id)
        .execute(&mut *tx)
        .await?;

    let mut stored = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let row = DigitalInstruction {
            id: new_id(),
            experience_id: experience_id.to_string(),
            step_number: index as i64 + 1,
            title: step.title.clone(),
            description: step.description.clone(),
            media_url: step.media_url.clone(),
        };
        sqlx::query(
            r#"
            INSERT INTO digital_instructions (id, experience_id, step_number, title, description, media_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.experience_id)
        .bind(row.step_number)
        .bind(&row.title)
        .bind(&row.description)
        .bind(&row.media_url)
        .execute(&mut *tx)
        .await?;
        stored.push(row);
    }

    tx.commit().await?;
    Ok(stored)
}

pub async fn list_ingredients(pool: &SqlitePool, experience_id: &str) -> Result<Vec<Ingredient>> {
    let ingredients = sqlx::query_as::<_, Ingredient>(
        "SELECT * FROM ingredients WHERE experience_id = ? ORDER BY position ASC, name ASC",
    )
    .bind(experience_id)
    .fetch_all(pool)
    .await?;
    Ok(ingredients)
}

/// Next free position at the end of an experience's ingredient list
pub async fn next_ingredient_position(pool: &SqlitePool, experience_id: &str) -> Result<i64> {
    let next: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(position) + 1, 0) FROM ingredients WHERE experience_id = ?",
    )
    .bind(experience_id)
    .fetch_one(pool)
    .await?;
    Ok(next)
}

pub async fn insert_ingredient(pool: &SqlitePool, ingredient: &Ingredient) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ingredients (id, brand_id, experience_id, name, description, is_allergen, position)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&ingredient.id)
    .bind(&ingredient.brand_id)
    .bind(&ingredient.experience_id)
    .bind(&ingredient.name)
    .bind(&ingredient.description)
    .bind(ingredient.is_allergen)
    .bind(ingredient.position)
    .execute(pool)
    .await?;
    Ok(())
}

/// Ingredient owned by `brand_id`
pub async fn get_ingredient(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<Ingredient> {
    let ingredient =
        sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ? AND brand_id = ?")
            .bind(id)
            .bind(brand_id)
            .fetch_optional(pool)
            .await?;
    found(ingredient, "Ingredient")
}

pub async fn update_ingredient(pool: &SqlitePool, ingredient: &Ingredient) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE ingredients SET name = ?, description = ?, is_allergen = ?, position = ?
        WHERE id = ? AND brand_id = ?
        "#,
    )
    .bind(&ingredient.name)
    .bind(&ingredient.description)
    .bind(ingredient.is_allergen)
    .bind(ingredient.position)
    .bind(&ingredient.id)
    .bind(&ingredient.brand_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_ingredient(pool: &SqlitePool, brand_id: &str, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = ? AND brand_id = ?")
        .bind(id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every known feature with its flag; missing rows take the feature default
pub async fn list_features(pool: &SqlitePool, experience_id: &str) -> Result<Vec<FeatureFlag>> {
    let stored = sqlx::query_as::<_, FeatureFlag>(
        "SELECT feature_name, enabled FROM experience_features WHERE experience_id = ?",
    )
    .bind(experience_id)
    .fetch_all(pool)
    .await?;

    Ok(Feature::ALL
        .iter()
        .map(|feature| FeatureFlag {
            feature_name: feature.as_str().to_string(),
            enabled: stored
                .iter()
                .find(|row| row.feature_name == feature.as_str())
                .map(|row| row.enabled)
                .unwrap_or_else(|| feature.enabled_by_default()),
        })
        .collect())
}

/// Replace the feature set: listed features enabled, every other one disabled
pub async fn replace_features(
    pool: &SqlitePool,
    experience_id: &str,
    enabled: &[Feature],
) -> Result<Vec<FeatureFlag>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM experience_features WHERE experience_id = ?")
        .bind(experience_id)
        .execute(&mut *tx)
        .await?;

    for feature in Feature::ALL {
        sqlx::query(
            "INSERT INTO experience_features (experience_id, feature_name, enabled) VALUES (?, ?, ?)",
        )
        .bind(experience_id)
        .bind(feature.as_str())
        .bind(enabled.contains(&feature))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    list_features(pool, experience_id).await
}

/// Names of enabled features, for the public viewer
pub fn enabled_names(flags: &[FeatureFlag]) -> Vec<String> {
    flags
        .iter()
        .filter(|flag| flag.enabled)
        .map(|flag| flag.feature_name.clone())
        .collect()
}
