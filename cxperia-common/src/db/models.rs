//! Database row models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;

/// Profile role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    BrandAdmin,
    SuperAdmin,
    SalesAdmin,
}

impl Role {
    /// Platform operators (admin panel access)
    pub fn is_operator(self) -> bool {
        matches!(self, Role::SuperAdmin | Role::SalesAdmin)
    }
}

/// Brand subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

/// Optional sections of an experience page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    ProductDetails,
    UsageInstructions,
    Ingredients,
    Tutorials,
    CustomerService,
    Feedback,
}

impl Feature {
    pub const ALL: [Feature; 6] = [
        Feature::ProductDetails,
        Feature::UsageInstructions,
        Feature::Ingredients,
        Feature::Tutorials,
        Feature::CustomerService,
        Feature::Feedback,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::ProductDetails => "product_details",
            Feature::UsageInstructions => "usage_instructions",
            Feature::Ingredients => "ingredients",
            Feature::Tutorials => "tutorials",
            Feature::CustomerService => "customer_service",
            Feature::Feedback => "feedback",
        }
    }

    /// State of a feature that has no row yet
    pub fn enabled_by_default(self) -> bool {
        matches!(self, Feature::ProductDetails)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown feature '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub plan: Plan,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub brand_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_urls: Json<Vec<String>>,
    pub price: Option<f64>,
    pub currency: String,
    pub usage_duration_days: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experience {
    pub id: String,
    pub brand_id: String,
    pub product_id: String,
    pub slug: Option<String>,
    pub is_published: bool,
    pub theme: String,
    pub primary_color: Option<String>,
    pub public_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub tutorial_video_url: Option<String>,
    pub support_email: Option<String>,
    pub support_phone: Option<String>,
    pub support_url: Option<String>,
    pub scan_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One usage step of an experience
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DigitalInstruction {
    pub id: String,
    pub experience_id: String,
    pub step_number: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: String,
    pub brand_id: String,
    pub experience_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_allergen: bool,
    pub position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeatureFlag {
    pub feature_name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tutorial {
    pub id: String,
    pub brand_id: String,
    pub experience_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomerFeedback {
    pub id: String,
    pub brand_id: String,
    pub experience_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformFeedback {
    pub id: String,
    pub brand_id: String,
    pub profile_id: Option<String>,
    pub category: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Metadata of an externally hosted media asset
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Upload {
    pub id: String,
    pub brand_id: String,
    pub url: String,
    pub public_id: Option<String>,
    pub resource_type: String,
    pub bytes: Option<i64>,
    pub format: Option<String>,
    pub created_at: DateTime<Utc>,
}
