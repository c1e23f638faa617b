//! Stock aggregation over color/size variants

use shared::models::{ColorVariant, SizeStock};
use std::collections::HashSet;

/// Derived stock figures of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockSummary {
    pub stock: u32,
    pub in_stock: bool,
}

impl StockSummary {
    pub fn from_count(stock: u32) -> Self {
        Self {
            stock,
            in_stock: stock > 0,
        }
    }

    pub fn from_variants(variants: &[ColorVariant]) -> Self {
        Self::from_count(total_stock(variants))
    }
}

/// Sum of all size quantities across all variants (saturating)
pub fn total_stock(variants: &[ColorVariant]) -> u32 {
    variants
        .iter()
        .flat_map(|v| v.sizes.iter())
        .fold(0u32, |acc, s| acc.saturating_add(s.quantity))
}

/// Admin form submit filter: drop variants with a blank color and sizes with
/// a blank label, trim what remains.
pub fn normalize_variants(variants: Vec<ColorVariant>) -> Vec<ColorVariant> {
    variants
        .into_iter()
        .filter_map(|variant| {
            let color = variant.color.trim();
            if color.is_empty() {
                return None;
            }
            let sizes = variant
                .sizes
                .into_iter()
                .filter_map(|s| {
                    let label = s.size.trim();
                    (!label.is_empty()).then(|| SizeStock::new(label, s.quantity))
                })
                .collect();
            Some(ColorVariant::new(color, sizes))
        })
        .collect()
}

/// Distinct size labels in first-seen order
pub fn unique_sizes(variants: &[ColorVariant]) -> Vec<&str> {
    let mut seen = HashSet::new();
    variants
        .iter()
        .flat_map(|v| v.sizes.iter())
        .map(|s| s.size.as_str())
        .filter(|label| seen.insert(*label))
        .collect()
}

/// Color labels in variant order
pub fn colors(variants: &[ColorVariant]) -> Vec<&str> {
    variants.iter().map(|v| v.color.as_str()).collect()
}

/// Mutable quantity of one exact color/size pair (first match wins)
pub(crate) fn quantity_slot<'a>(
    variants: &'a mut [ColorVariant],
    color: &str,
    size: &str,
) -> Option<&'a mut u32> {
    variants
        .iter_mut()
        .find(|v| v.color == color)?
        .sizes
        .iter_mut()
        .find(|s| s.size == size)
        .map(|s| &mut s.quantity)
}
