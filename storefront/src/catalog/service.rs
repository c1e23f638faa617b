//! Catalog Service - products, listings, reviews

use super::query::{ProductQuery, matches_search};
use super::seed::SeedProduct;
use crate::audit_log;
use crate::core::Config;
use crate::inventory::{StockSummary, normalize_variants};
use crate::pricing::price_from_offer;
use crate::storage::Storage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_price, validate_rating, validate_required_text,
};
use shared::PaginatedResponse;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Category, ColorVariant, Product, ProductCreate, ProductUpdate, Review, ReviewCreate,
};
use shared::util::{now_millis, snowflake_id};

// =============================================================================
// Types
// =============================================================================

/// Catalog-wide stock figures, logged by the maintenance binary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryReport {
    pub total_products: usize,
    pub active_products: usize,
    /// Units across all active products
    pub total_units: u64,
    /// Titles of active products with nothing left
    pub out_of_stock: Vec<String>,
    /// Active product count per category
    pub per_category: Vec<(Category, usize)>,
}

// =============================================================================
// CatalogService
// =============================================================================

/// Product administration and shopper-facing catalog reads
#[derive(Debug, Clone)]
pub struct CatalogService {
    storage: Storage,
    public_page_size: u32,
    admin_page_size: u32,
}

impl CatalogService {
    pub fn new(storage: Storage, config: &Config) -> Self {
        Self {
            storage,
            public_page_size: config.public_page_size,
            admin_page_size: config.admin_page_size,
        }
    }

    // ========== Admin writes ==========

    /// Create a product from the admin form
    pub fn create_product(&self, payload: ProductCreate) -> AppResult<Product> {
        let product = build_product(payload, now_millis())?;

        let txn = self.storage.begin_write()?;
        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(
            product_id = product.id,
            title = %product.title,
            stock = product.stock,
            "Product created"
        );
        audit_log!("admin", "create_product", format!("product:{}", product.id));
        Ok(product)
    }

    /// Partial update. A new variant list replaces the old one and recomputes
    /// stock; a bare stock value only applies to products without variants.
    pub fn update_product(&self, id: i64, payload: ProductUpdate) -> AppResult<Product> {
        let txn = self.storage.begin_write()?;
        let mut product = self
            .storage
            .get_product_txn(&txn, id)?
            .ok_or_else(|| AppError::product_not_found(id))?;

        apply_update(&mut product, payload)?;
        product.updated_at = now_millis();

        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(product_id = id, stock = product.stock, "Product updated");
        audit_log!("admin", "update_product", format!("product:{id}"));
        Ok(product)
    }

    /// Soft delete: the product leaves public listings but stays readable by id
    pub fn delete_product(&self, id: i64) -> AppResult<()> {
        let txn = self.storage.begin_write()?;
        let mut product = self
            .storage
            .get_product_txn(&txn, id)?
            .ok_or_else(|| AppError::product_not_found(id))?;

        product.is_active = false;
        product.updated_at = now_millis();
        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(product_id = id, "Product deactivated");
        audit_log!("admin", "delete_product", format!("product:{id}"));
        Ok(())
    }

    // ========== Reads ==========

    /// Product by id, including inactive ones
    pub fn get_product(&self, id: i64) -> AppResult<Product> {
        self.storage
            .get_product(id)?
            .ok_or_else(|| AppError::product_not_found(id))
    }

    /// Filtered, newest-first page of products
    pub fn list_products(&self, query: &ProductQuery) -> AppResult<PaginatedResponse<Product>> {
        let category = query.category_filter()?;
        let active = query.active_filter();
        let needle = query.needle();

        let mut matching: Vec<Product> = self
            .storage
            .get_all_products()?
            .into_iter()
            .filter(|p| active.is_none_or(|a| p.is_active == a))
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| needle.as_deref().is_none_or(|n| matches_search(p, n)))
            .collect();
        sort_newest_first(&mut matching);

        let default_limit = match query.audience {
            super::Audience::Public => self.public_page_size,
            super::Audience::Admin => self.admin_page_size,
        };
        let page = query.page_number();
        let limit = query.page_size(default_limit);
        let total = matching.len() as u64;

        let data = matching
            .into_iter()
            .skip(PaginatedResponse::<Product>::offset(page, limit))
            .take(limit as usize)
            .collect();

        Ok(PaginatedResponse::new(data, total, page, limit))
    }

    /// Active products of one category, newest first
    pub fn products_by_category(&self, category: &str) -> AppResult<Vec<Product>> {
        let category: Category = category.parse().map_err(|_| {
            AppError::new(ErrorCode::ProductInvalidCategory).with_detail("category", category)
        })?;

        let mut products: Vec<Product> = self
            .storage
            .get_all_products()?
            .into_iter()
            .filter(|p| p.is_active && p.category == category)
            .collect();
        sort_newest_first(&mut products);
        Ok(products)
    }

    // ========== Reviews ==========

    /// Append a review and refresh the product's mean rating
    pub fn add_review(
        &self,
        product_id: i64,
        user_id: i64,
        payload: ReviewCreate,
    ) -> AppResult<Product> {
        let txn = self.storage.begin_write()?;
        let mut product = self
            .storage
            .get_product_txn(&txn, product_id)?
            .ok_or_else(|| AppError::product_not_found(product_id))?;
        let user = self
            .storage
            .get_user_txn(&txn, user_id)?
            .ok_or_else(|| AppError::user_not_found(user_id))?;

        validate_rating(payload.rating)?;
        validate_optional_text(&Some(payload.comment.clone()), "comment", MAX_NOTE_LEN)?;

        product.reviews.push(Review {
            user_id,
            user_name: user.name,
            comment: payload.comment.trim().to_string(),
            rating: payload.rating,
            created_at: now_millis(),
        });
        product.rating = mean_rating(&product.reviews);
        product.updated_at = now_millis();

        self.storage.store_product(&txn, &product)?;
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(product_id, user_id, rating = product.rating, "Review added");
        Ok(product)
    }

    // ========== Seeding & reporting ==========

    /// Insert seed products in one transaction; returns how many were stored
    pub fn seed(&self, entries: Vec<SeedProduct>) -> AppResult<usize> {
        let now = now_millis();
        let products = entries
            .into_iter()
            .enumerate()
            // Later entries get later timestamps so seed order reads as age order
            .map(|(i, entry)| build_product(entry.into_create(), now + i as i64))
            .collect::<AppResult<Vec<_>>>()?;

        let txn = self.storage.begin_write()?;
        for product in &products {
            self.storage.store_product(&txn, product)?;
        }
        txn.commit().map_err(crate::storage::StorageError::from)?;

        tracing::info!(count = products.len(), "Catalog seeded");
        Ok(products.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.storage.product_count()? == 0)
    }

    pub fn inventory_report(&self) -> AppResult<InventoryReport> {
        let products = self.storage.get_all_products()?;
        let active: Vec<&Product> = products.iter().filter(|p| p.is_active).collect();

        Ok(InventoryReport {
            total_products: products.len(),
            active_products: active.len(),
            total_units: active.iter().map(|p| u64::from(p.stock)).sum(),
            out_of_stock: active
                .iter()
                .filter(|p| !p.in_stock)
                .map(|p| p.title.clone())
                .collect(),
            per_category: Category::ALL
                .into_iter()
                .map(|c| (c, active.iter().filter(|p| p.category == c).count()))
                .collect(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Mean of review ratings, two decimals
fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let sum: f64 = reviews.iter().map(|r| r.rating).sum();
    (sum / reviews.len() as f64 * 100.0).round() / 100.0
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_variants(variants: &[ColorVariant]) -> AppResult<()> {
    for variant in variants {
        validate_required_text(&variant.color, "color", MAX_SHORT_TEXT_LEN)?;
        for size in &variant.sizes {
            validate_required_text(&size.size, "size", MAX_SHORT_TEXT_LEN)?;
        }
    }
    Ok(())
}

fn gallery(images: Option<Vec<String>>, primary: &str) -> Vec<String> {
    let images: Vec<String> = images
        .unwrap_or_default()
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if images.is_empty() {
        vec![primary.to_string()]
    } else {
        images
    }
}

/// Validate a create payload and build the stored product
fn build_product(payload: ProductCreate, now: i64) -> AppResult<Product> {
    let offer = non_blank(payload.offer);
    let price = payload
        .price
        .or_else(|| price_from_offer(payload.old_price, offer.as_deref()));

    let title = payload.title.trim();
    let image = payload.image.trim();
    let (Some(category), Some(price), false, false) =
        (payload.category, price, title.is_empty(), image.is_empty())
    else {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Title, category, price, and image are required fields",
        ));
    };

    validate_required_text(title, "title", MAX_NAME_LEN)?;
    validate_required_text(image, "image", MAX_URL_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&offer, "offer", MAX_SHORT_TEXT_LEN)?;
    validate_price(price, "price")?;
    if let Some(old_price) = payload.old_price {
        validate_price(old_price, "old_price")?;
    }

    let variants = normalize_variants(payload.variants);
    validate_variants(&variants)?;
    let summary = if variants.is_empty() {
        StockSummary::from_count(payload.stock.unwrap_or(0))
    } else {
        StockSummary::from_variants(&variants)
    };

    Ok(Product {
        id: snowflake_id(),
        title: title.to_string(),
        description: non_blank(payload.description),
        category,
        carousel_images: gallery(payload.carousel_images, image),
        image: image.to_string(),
        price,
        old_price: payload.old_price,
        offer,
        variants,
        specifications: payload.specifications,
        stock: summary.stock,
        in_stock: summary.in_stock,
        rating: 0.0,
        reviews: Vec::new(),
        seller: payload.seller,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Apply a partial update in place
fn apply_update(product: &mut Product, payload: ProductUpdate) -> AppResult<()> {
    if let Some(title) = payload.title {
        validate_required_text(&title, "title", MAX_NAME_LEN)?;
        product.title = title.trim().to_string();
    }
    if let Some(description) = payload.description {
        validate_optional_text(&Some(description.clone()), "description", MAX_NOTE_LEN)?;
        product.description = non_blank(Some(description));
    }
    if let Some(category) = payload.category {
        product.category = category;
    }
    if let Some(image) = payload.image {
        validate_required_text(&image, "image", MAX_URL_LEN)?;
        product.image = image.trim().to_string();
    }
    if let Some(images) = payload.carousel_images {
        product.carousel_images = gallery(Some(images), &product.image);
    }
    if let Some(specifications) = payload.specifications {
        product.specifications = specifications;
    }

    // Pricing: an explicit price wins, otherwise re-derive when its inputs change
    let pricing_inputs_changed = payload.old_price.is_some() || payload.offer.is_some();
    if let Some(old_price) = payload.old_price {
        validate_price(old_price, "old_price")?;
        product.old_price = Some(old_price);
    }
    if let Some(offer) = payload.offer {
        let offer = non_blank(Some(offer));
        validate_optional_text(&offer, "offer", MAX_SHORT_TEXT_LEN)?;
        product.offer = offer;
    }
    match payload.price {
        Some(price) => {
            validate_price(price, "price")?;
            product.price = price;
        }
        None if pricing_inputs_changed => {
            if let Some(price) = price_from_offer(product.old_price, product.offer.as_deref()) {
                product.price = price;
            }
        }
        None => {}
    }

    // Stock: variants are the source of truth when present
    if let Some(variants) = payload.variants {
        let variants = normalize_variants(variants);
        validate_variants(&variants)?;
        let summary = StockSummary::from_variants(&variants);
        product.variants = variants;
        product.stock = summary.stock;
        product.in_stock = summary.in_stock;
    } else if let Some(stock) = payload.stock {
        if product.has_variants() {
            tracing::warn!(
                product_id = product.id,
                stock,
                "Ignoring direct stock update on a product with variants"
            );
        } else {
            let summary = StockSummary::from_count(stock);
            product.stock = summary.stock;
            product.in_stock = summary.in_stock;
        }
    }

    if let Some(is_active) = payload.is_active {
        product.is_active = is_active;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Audience;
    use shared::models::{Role, SizeStock, User};

    fn service() -> CatalogService {
        let storage = Storage::open_in_memory().unwrap();
        CatalogService::new(storage, &Config::with_overrides("/tmp/unused"))
    }

    fn tee() -> ProductCreate {
        ProductCreate {
            title: "Premium Cotton T-Shirt".to_string(),
            description: Some("Soft cotton tee".to_string()),
            category: Some(Category::Clothing),
            image: "https://img.example/tee.png".to_string(),
            price: Some(599.0),
            old_price: Some(999.0),
            offer: Some("40% off".to_string()),
            variants: vec![
                ColorVariant::new("Black", vec![SizeStock::new("M", 5), SizeStock::new("L", 3)]),
                ColorVariant::new("Red", vec![SizeStock::new("M", 2)]),
            ],
            ..Default::default()
        }
    }

    fn plain(title: &str, category: Category, stock: u32) -> ProductCreate {
        ProductCreate {
            title: title.to_string(),
            category: Some(category),
            image: "https://img.example/x.png".to_string(),
            price: Some(100.0),
            stock: Some(stock),
            ..Default::default()
        }
    }

    fn insert_user(storage: &Storage, id: i64, name: &str) {
        let user = User {
            id,
            name: name.to_string(),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
            verified: true,
            verification_token: None,
            role: Role::User,
            addresses: vec![],
            created_at: 0,
            updated_at: 0,
        };
        let txn = storage.begin_write().unwrap();
        storage.store_user(&txn, &user).unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_create_computes_stock_and_defaults() {
        let svc = service();
        let product = svc.create_product(tee()).unwrap();

        assert_eq!(product.stock, 10);
        assert!(product.in_stock);
        assert!(product.is_active);
        assert_eq!(product.carousel_images, vec![product.image.clone()]);
        assert_eq!(svc.get_product(product.id).unwrap(), product);
    }

    #[test]
    fn test_create_ignores_stock_field_when_variants_present() {
        let svc = service();
        let mut payload = tee();
        payload.stock = Some(999);
        assert_eq!(svc.create_product(payload).unwrap().stock, 10);
    }

    #[test]
    fn test_create_requires_fields() {
        let svc = service();
        for payload in [
            ProductCreate {
                title: "  ".to_string(),
                ..tee()
            },
            ProductCreate {
                category: None,
                ..tee()
            },
            ProductCreate {
                image: String::new(),
                ..tee()
            },
            ProductCreate {
                price: None,
                old_price: None,
                ..tee()
            },
        ] {
            let err = svc.create_product(payload).unwrap_err();
            assert_eq!(err.code, ErrorCode::RequiredField);
            assert_eq!(
                err.message,
                "Title, category, price, and image are required fields"
            );
            assert_eq!(err.http_status(), shared::http::StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_create_derives_missing_price() {
        let svc = service();
        let product = svc
            .create_product(ProductCreate {
                price: None,
                old_price: Some(4999.0),
                offer: Some("50% off".to_string()),
                ..tee()
            })
            .unwrap();
        assert_eq!(product.price, 2500.0);
    }

    #[test]
    fn test_create_rejects_negative_price() {
        let err = service()
            .create_product(ProductCreate {
                price: Some(-1.0),
                ..tee()
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidPrice);
    }

    #[test]
    fn test_create_filters_blank_variant_rows() {
        let svc = service();
        let product = svc
            .create_product(ProductCreate {
                variants: vec![
                    ColorVariant::new("Black", vec![SizeStock::new("M", 4), SizeStock::new("", 7)]),
                    ColorVariant::new(" ", vec![SizeStock::new("L", 9)]),
                ],
                ..tee()
            })
            .unwrap();
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.stock, 4);
    }

    #[test]
    fn test_update_variants_recomputes_stock() {
        let svc = service();
        let product = svc.create_product(tee()).unwrap();

        let updated = svc
            .update_product(
                product.id,
                ProductUpdate {
                    variants: Some(vec![ColorVariant::new(
                        "Black",
                        vec![SizeStock::new("M", 0)],
                    )]),
                    stock: Some(50),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stock, 0);
        assert!(!updated.in_stock);
    }

    #[test]
    fn test_update_stock_only_for_plain_products() {
        let svc = service();
        let phone = svc.create_product(plain("Phone", Category::Electronics, 5)).unwrap();
        let updated = svc
            .update_product(
                phone.id,
                ProductUpdate {
                    stock: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stock, 0);
        assert!(!updated.in_stock);

        let tee = svc.create_product(tee()).unwrap();
        let updated = svc
            .update_product(
                tee.id,
                ProductUpdate {
                    stock: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.stock, 10);
    }

    #[test]
    fn test_update_rederives_price_from_offer() {
        let svc = service();
        let product = svc.create_product(tee()).unwrap();
        let updated = svc
            .update_product(
                product.id,
                ProductUpdate {
                    offer: Some("50% off".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price, 500.0);
    }

    #[test]
    fn test_update_missing_product() {
        let err = service()
            .update_product(42, ProductUpdate::default())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);
    }

    #[test]
    fn test_soft_delete_hides_from_public_listing() {
        let svc = service();
        let product = svc.create_product(tee()).unwrap();
        svc.delete_product(product.id).unwrap();

        assert!(!svc.get_product(product.id).unwrap().is_active);
        assert_eq!(svc.list_products(&ProductQuery::public()).unwrap().total, 0);
        assert_eq!(svc.list_products(&ProductQuery::admin()).unwrap().total, 1);
        assert_eq!(
            svc.list_products(&ProductQuery::admin().active(true))
                .unwrap()
                .total,
            0
        );
        assert_eq!(
            svc.delete_product(7).unwrap_err().code,
            ErrorCode::ProductNotFound
        );
    }

    #[test]
    fn test_list_paginates_newest_first() {
        let svc = service();
        let entries = (0..25)
            .map(|i| SeedProduct {
                product: plain(&format!("Item {i}"), Category::Accessories, 1),
                color: None,
                size: None,
            })
            .collect();
        svc.seed(entries).unwrap();

        let first = svc.list_products(&ProductQuery::public()).unwrap();
        assert_eq!(first.total, 25);
        assert_eq!(first.limit, 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.data[0].title, "Item 24");

        let last = svc.list_products(&ProductQuery::public().page(3)).unwrap();
        assert_eq!(last.data.len(), 5);
        assert_eq!(last.data[4].title, "Item 0");

        let admin = svc.list_products(&ProductQuery::admin()).unwrap();
        assert_eq!(admin.limit, 20);
        assert_eq!(admin.total_pages, 2);
        assert_eq!(ProductQuery::admin().audience, Audience::Admin);
    }

    #[test]
    fn test_list_filters_category_and_search() {
        let svc = service();
        svc.create_product(tee()).unwrap();
        svc.create_product(plain("Elegant Gold Necklace", Category::Jewelery, 3))
            .unwrap();
        svc.create_product(plain("Running Shoes", Category::Shoes, 3))
            .unwrap();

        let jewelery = svc
            .list_products(&ProductQuery::public().category("jewelery"))
            .unwrap();
        assert_eq!(jewelery.total, 1);

        let all = svc
            .list_products(&ProductQuery::public().category("all"))
            .unwrap();
        assert_eq!(all.total, 3);

        // Title and description both match, case-insensitively
        let gold = svc.list_products(&ProductQuery::public().search("GOLD")).unwrap();
        assert_eq!(gold.data[0].title, "Elegant Gold Necklace");
        let cotton = svc
            .list_products(&ProductQuery::public().search("soft cotton"))
            .unwrap();
        assert_eq!(cotton.total, 1);

        let err = svc
            .list_products(&ProductQuery::public().category("food"))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductInvalidCategory);
    }

    #[test]
    fn test_products_by_category() {
        let svc = service();
        let a = svc.create_product(plain("A", Category::Shoes, 1)).unwrap();
        let b = svc.create_product(plain("B", Category::Shoes, 1)).unwrap();
        svc.create_product(plain("C", Category::Clothing, 1)).unwrap();
        svc.delete_product(a.id).unwrap();

        let shoes = svc.products_by_category("shoes").unwrap();
        assert_eq!(shoes.len(), 1);
        assert_eq!(shoes[0].id, b.id);
    }

    #[test]
    fn test_add_review_updates_mean_rating() {
        let svc = service();
        insert_user(&svc.storage, 1, "Asha");
        insert_user(&svc.storage, 2, "Ravi");
        let product = svc.create_product(tee()).unwrap();

        svc.add_review(
            product.id,
            1,
            ReviewCreate {
                comment: "Great fit".to_string(),
                rating: 5.0,
            },
        )
        .unwrap();
        let product = svc
            .add_review(
                product.id,
                2,
                ReviewCreate {
                    comment: String::new(),
                    rating: 4.0,
                },
            )
            .unwrap();

        assert_eq!(product.reviews.len(), 2);
        assert_eq!(product.reviews[0].user_name, "Asha");
        assert_eq!(product.rating, 4.5);
    }

    #[test]
    fn test_add_review_errors() {
        let svc = service();
        insert_user(&svc.storage, 1, "Asha");
        let product = svc.create_product(tee()).unwrap();
        let review = |rating| ReviewCreate {
            comment: String::new(),
            rating,
        };

        let err = svc.add_review(99, 1, review(4.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ProductNotFound);

        let err = svc.add_review(product.id, 99, review(4.0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);

        let err = svc.add_review(product.id, 1, review(6.0)).unwrap_err();
        assert_eq!(err.message, "Rating must be between 0 and 5");
        assert!(svc.get_product(product.id).unwrap().reviews.is_empty());
    }

    #[test]
    fn test_inventory_report() {
        let svc = service();
        svc.create_product(tee()).unwrap();
        svc.create_product(plain("Phone", Category::Electronics, 0))
            .unwrap();

        let report = svc.inventory_report().unwrap();
        assert_eq!(report.total_products, 2);
        assert_eq!(report.total_units, 10);
        assert_eq!(report.out_of_stock, vec!["Phone".to_string()]);
        assert!(report.per_category.contains(&(Category::Clothing, 1)));
        assert!(!svc.is_empty().unwrap());
    }
}
