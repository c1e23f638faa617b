//! Product Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed catalog categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clothing,
    Jewelery,
    Shoes,
    Accessories,
    Electronics,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Clothing,
        Category::Jewelery,
        Category::Shoes,
        Category::Accessories,
        Category::Electronics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clothing => "clothing",
            Category::Jewelery => "jewelery",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Electronics => "electronics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category label that is not one of [`Category::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownCategory(label.to_string()))
    }
}

/// Stock of one size within a color variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: String,
    #[serde(default)]
    pub quantity: u32,
}

impl SizeStock {
    pub fn new(size: impl Into<String>, quantity: u32) -> Self {
        Self {
            size: size.into(),
            quantity,
        }
    }
}

/// One color of a product with its per-size stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    pub color: String,
    #[serde(default)]
    pub sizes: Vec<SizeStock>,
}

impl ColorVariant {
    pub fn new(color: impl Into<String>, sizes: Vec<SizeStock>) -> Self {
        Self {
            color: color.into(),
            sizes,
        }
    }
}

/// Customer review, appended to the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: i64,
    pub user_name: String,
    #[serde(default)]
    pub comment: String,
    /// 0..=5
    pub rating: f64,
    pub created_at: i64,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    /// Primary image
    pub image: String,
    /// Gallery, first entry defaults to `image`
    #[serde(default)]
    pub carousel_images: Vec<String>,
    /// Current selling price
    pub price: f64,
    /// Price before discount
    pub old_price: Option<f64>,
    /// Free-text discount label, e.g. "40% off"
    pub offer: Option<String>,
    #[serde(default)]
    pub variants: Vec<ColorVariant>,
    /// Technical details (ram, storage, ...)
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Sum of all variant quantities; set directly for variant-less products
    pub stock: u32,
    pub in_stock: bool,
    /// Mean review rating, 0..=5
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Seller user reference
    pub seller: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Create product payload (admin form)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<Category>,
    #[serde(default)]
    pub image: String,
    pub carousel_images: Option<Vec<String>>,
    /// When absent it is derived from `old_price` and `offer`
    pub price: Option<f64>,
    pub old_price: Option<f64>,
    pub offer: Option<String>,
    #[serde(default)]
    pub variants: Vec<ColorVariant>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    /// Only used for products without variants
    pub stock: Option<u32>,
    pub seller: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub carousel_images: Option<Vec<String>>,
    pub price: Option<f64>,
    pub old_price: Option<f64>,
    pub offer: Option<String>,
    /// Replaces the whole variant list and recomputes stock
    pub variants: Option<Vec<ColorVariant>>,
    pub specifications: Option<BTreeMap<String, String>>,
    /// Ignored when `variants` is present
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
}

/// Review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    #[serde(default)]
    pub comment: String,
    pub rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("clothing".parse::<Category>(), Ok(Category::Clothing));
        assert_eq!(" Electronics ".parse::<Category>(), Ok(Category::Electronics));
        assert_eq!(
            "food".parse::<Category>(),
            Err(UnknownCategory("food".to_string()))
        );
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&Category::Jewelery).unwrap();
        assert_eq!(json, "\"jewelery\"");
    }

    #[test]
    fn test_variant_quantity_defaults_to_zero() {
        let v: ColorVariant =
            serde_json::from_str(r#"{"color":"Black","sizes":[{"size":"M"}]}"#).unwrap();
        assert_eq!(v.sizes[0].quantity, 0);
    }
}
