//! Shopper color/size selection against a product's variants

use shared::error::{AppError, ErrorCode};
use shared::models::Product;
use thiserror::Error;

/// Color and size picked on the product page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub color: Option<String>,
    pub size: Option<String>,
}

impl Selection {
    pub fn new(color: Option<&str>, size: Option<&str>) -> Self {
        Self {
            color: color.map(str::to_string),
            size: size.map(str::to_string),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Selected color, blank counts as unselected
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Selected size, blank counts as unselected
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Why a selection cannot go into the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select a Color")]
    ColorRequired,
    #[error("Please select a Size")]
    SizeRequired,
    #[error("This variation is temporarily out of stock")]
    OutOfStock,
}

impl SelectionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SelectionError::ColorRequired => ErrorCode::VariantColorRequired,
            SelectionError::SizeRequired => ErrorCode::VariantSizeRequired,
            SelectionError::OutOfStock => ErrorCode::ProductOutOfStock,
        }
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

/// Quantity available for the current selection.
///
/// With both color and size picked this is the stock of that exact pair
/// (0 when the pair does not exist); otherwise the product's aggregate stock.
pub fn available_quantity(product: &Product, selection: &Selection) -> u32 {
    match (selection.color(), selection.size()) {
        (Some(color), Some(size)) => product
            .variants
            .iter()
            .find(|v| v.color == color)
            .and_then(|v| v.sizes.iter().find(|s| s.size == size))
            .map_or(0, |s| s.quantity),
        _ => product.stock,
    }
}

/// Check a selection before it is added to the cart.
///
/// Products with variants need a color, then a size. Returns the available
/// quantity for the selection.
pub fn validate_selection(product: &Product, selection: &Selection) -> Result<u32, SelectionError> {
    if product.has_variants() {
        if selection.color().is_none() {
            return Err(SelectionError::ColorRequired);
        }
        if selection.size().is_none() {
            return Err(SelectionError::SizeRequired);
        }
    }

    match available_quantity(product, selection) {
        0 => Err(SelectionError::OutOfStock),
        available => Ok(available),
    }
}

/// Quantity stepper bounded by `1..=available`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityPicker {
    quantity: u32,
    available: u32,
}

impl QuantityPicker {
    pub fn new(available: u32) -> Self {
        Self {
            quantity: 1,
            available,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    /// Returns false when already at the available stock
    pub fn increment(&mut self) -> bool {
        if self.quantity < self.available {
            self.quantity += 1;
            true
        } else {
            false
        }
    }

    /// Returns false when already at 1
    pub fn decrement(&mut self) -> bool {
        if self.quantity > 1 {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }

    /// New selection changed the available stock; keep quantity in range
    pub fn set_available(&mut self, available: u32) {
        self.available = available;
        self.quantity = self.quantity.min(available).max(1);
    }
}
