//! Catalog seed data
//!
//! Seed entries use the regular create payload. Older catalog exports carry a
//! single `color`/`size` pair plus a `stock` count instead of a variant list;
//! those are folded into one variant.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{ColorVariant, ProductCreate, SizeStock};
use std::path::Path;

/// Size label used when a legacy entry names a color but no size
const DEFAULT_SIZE_LABEL: &str = "Normal";

/// One product of a seed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub product: ProductCreate,
    /// Legacy single color
    pub color: Option<String>,
    /// Legacy single size
    pub size: Option<String>,
}

impl SeedProduct {
    /// Create payload with the legacy color/size/stock folded into variants
    pub fn into_create(self) -> ProductCreate {
        let mut product = self.product;
        let color = self.color.as_deref().map(str::trim).filter(|c| !c.is_empty());

        if product.variants.is_empty()
            && let Some(color) = color
        {
            let size = self
                .size
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SIZE_LABEL);
            let quantity = product.stock.take().unwrap_or(0);
            product.variants = vec![ColorVariant::new(color, vec![SizeStock::new(size, quantity)])];
        }
        product
    }
}

/// Read a JSON array of [`SeedProduct`]
pub fn load_seed_file(path: impl AsRef<Path>) -> AppResult<Vec<SeedProduct>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::with_message(ErrorCode::ConfigError, format!("Cannot read seed file: {e}"))
            .with_detail("path", path.display().to_string())
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        AppError::with_message(ErrorCode::ConfigError, format!("Invalid seed file: {e}"))
            .with_detail("path", path.display().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_entry_becomes_single_variant() {
        let entry: SeedProduct = serde_json::from_str(
            r#"{
                "title": "Premium Cotton T-Shirt (Men's)",
                "category": "clothing",
                "image": "https://img.example/tee.png",
                "price": 599,
                "old_price": 999,
                "offer": "40% off",
                "color": "Blue",
                "size": "M",
                "stock": 150
            }"#,
        )
        .unwrap();

        let create = entry.into_create();
        assert_eq!(
            create.variants,
            vec![ColorVariant::new("Blue", vec![SizeStock::new("M", 150)])]
        );
        assert_eq!(create.stock, None);
    }

    #[test]
    fn test_legacy_color_without_size() {
        let entry: SeedProduct = serde_json::from_str(
            r#"{"title":"Necklace","category":"jewelery","image":"x","price":2499,"color":"Gold","stock":5}"#,
        )
        .unwrap();
        let create = entry.into_create();
        assert_eq!(create.variants[0].sizes[0].size, "Normal");
    }

    #[test]
    fn test_plain_entry_keeps_counter() {
        let entry: SeedProduct = serde_json::from_str(
            r#"{"title":"Phone","category":"electronics","image":"x","price":19000,"stock":50}"#,
        )
        .unwrap();
        let create = entry.into_create();
        assert!(create.variants.is_empty());
        assert_eq!(create.stock, Some(50));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = load_seed_file("/definitely/not/here.json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigError);
    }
}
