//! # Product Types
//!
//! Catalog types for the pharmacy storefront.
//! Products are loaded from `config/products.toml` and never mutated at runtime.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Over-the-counter medicine
    Otc,
    /// Prescription-only medicine
    Prescription,
    /// Vitamins and supplements
    Supplement,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Otc, Category::Prescription, Category::Supplement];

    /// Returns the identifier used in query strings and config files
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Otc => "otc",
            Category::Prescription => "prescription",
            Category::Supplement => "supplement",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Otc => "Over the Counter",
            Category::Prescription => "Prescription",
            Category::Supplement => "Supplements",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::InvalidRequest(format!("Unknown category: {}", s)))
    }
}

/// A medicine or supplement in the catalog.
///
/// Prices are integers in the store's currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier (e.g., "paracetamol-500")
    pub id: String,

    /// Brand name
    pub name: String,

    /// Generic (salt) name
    pub generic_name: String,

    pub manufacturer: String,

    /// Selling price
    pub price: i64,

    /// List price before discount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,

    /// Image reference
    #[serde(default)]
    pub image: String,

    pub category: Category,

    #[serde(default = "default_true")]
    pub in_stock: bool,

    #[serde(default)]
    pub requires_prescription: bool,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub usage: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<String>,

    #[serde(default)]
    pub dosage: String,

    /// Pack size label (e.g., "10 tablets")
    #[serde(default)]
    pub quantity: String,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create an in-stock product with empty descriptive fields
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: i64,
        category: Category,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            generic_name: String::new(),
            manufacturer: String::new(),
            price,
            original_price: None,
            image: String::new(),
            category,
            in_stock: true,
            requires_prescription: category == Category::Prescription,
            description: String::new(),
            usage: String::new(),
            side_effects: None,
            dosage: String::new(),
            quantity: String::new(),
        }
    }

    /// Builder: set generic name
    pub fn with_generic_name(mut self, generic_name: impl Into<String>) -> Self {
        self.generic_name = generic_name.into();
        self
    }

    /// Builder: set list price
    pub fn with_original_price(mut self, original_price: i64) -> Self {
        self.original_price = Some(original_price);
        self
    }

    /// Builder: override the prescription requirement
    pub fn with_prescription(mut self, required: bool) -> Self {
        self.requires_prescription = required;
        self
    }

    /// Builder: mark out of stock
    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Check catalog invariants for this record
    pub fn validate(&self) -> StoreResult<()> {
        if self.id.trim().is_empty() {
            return Err(StoreError::Configuration(format!(
                "Product '{}' has an empty id",
                self.name
            )));
        }
        if self.price <= 0 {
            return Err(StoreError::Configuration(format!(
                "Product {} must have a positive price",
                self.id
            )));
        }
        if let Some(original) = self.original_price {
            if original < self.price {
                return Err(StoreError::Configuration(format!(
                    "Product {}: original_price {} is below price {}",
                    self.id, original, self.price
                )));
            }
        }
        Ok(())
    }

    /// Percentage saved against the list price, rounded to the nearest whole percent
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original <= self.price || original <= 0 {
            return None;
        }
        let saved = (original - self.price) as f64 / original as f64 * 100.0;
        Some(saved.round() as u32)
    }

    fn matches_text(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.generic_name.to_lowercase().contains(needle)
    }
}

/// Catalog search filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Restrict to one category (None = all)
    pub category: Option<Category>,
    /// Case-insensitive match against name or generic name
    pub text: Option<String>,
}

impl ProductQuery {
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            category: None,
            text: Some(text.into()),
        }
    }

    fn matches(&self, product: &Product) -> bool {
        let in_category = self.category.map_or(true, |c| product.category == c);
        let needle = self
            .text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .unwrap_or_default();
        in_category && product.matches_text(&needle)
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Find a product that can currently be added to a cart
    pub fn require_in_stock(&self, id: &str) -> StoreResult<&Product> {
        let product = self.get(id).ok_or_else(|| StoreError::ProductNotFound {
            product_id: id.to_string(),
        })?;
        if !product.in_stock {
            return Err(StoreError::ProductUnavailable {
                product_id: id.to_string(),
            });
        }
        Ok(product)
    }

    pub fn in_stock_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.in_stock)
    }

    /// Filter the catalog, preserving catalog order
    pub fn search(&self, query: &ProductQuery) -> impl Iterator<Item = &Product> + '_ {
        let query = query.clone();
        self.products.iter().filter(move |p| query.matches(p))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load and validate a catalog from a TOML string
    pub fn from_toml(toml_str: &str) -> StoreResult<Self> {
        let catalog: ProductCatalog = toml::from_str(toml_str)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate every product and reject duplicate ids
    pub fn validate(&self) -> StoreResult<()> {
        let mut seen = std::collections::HashSet::new();
        for product in &self.products {
            product.validate()?;
            if !seen.insert(product.id.as_str()) {
                return Err(StoreError::Configuration(format!(
                    "Duplicate product id: {}",
                    product.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> ProductCatalog {
        let mut catalog = ProductCatalog::new();
        catalog.add(
            Product::new("dolo-650", "Dolo 650", 30, Category::Otc)
                .with_generic_name("Paracetamol"),
        );
        catalog.add(
            Product::new("augmentin-625", "Augmentin 625 Duo", 220, Category::Prescription)
                .with_generic_name("Amoxicillin + Clavulanic Acid")
                .with_original_price(250),
        );
        catalog.add(
            Product::new("limcee", "Limcee", 25, Category::Supplement)
                .with_generic_name("Vitamin C")
                .out_of_stock(),
        );
        catalog
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("otc".parse::<Category>().unwrap(), Category::Otc);
        assert_eq!(
            " Prescription ".parse::<Category>().unwrap(),
            Category::Prescription
        );
        assert!("all".parse::<Category>().is_err());
        assert_eq!(Category::Supplement.label(), "Supplements");
    }

    #[test]
    fn test_prescription_default_follows_category() {
        let rx = Product::new("x", "X", 10, Category::Prescription);
        assert!(rx.requires_prescription);
        let otc = Product::new("y", "Y", 10, Category::Otc);
        assert!(!otc.requires_prescription);
    }

    #[test]
    fn test_product_validation() {
        assert!(Product::new("ok", "Ok", 10, Category::Otc).validate().is_ok());
        assert!(Product::new("", "Empty", 10, Category::Otc).validate().is_err());
        assert!(Product::new("zero", "Zero", 0, Category::Otc).validate().is_err());
        assert!(Product::new("cheap", "Cheap", 100, Category::Otc)
            .with_original_price(90)
            .validate()
            .is_err());
    }

    #[test]
    fn test_discount_percent() {
        let product = Product::new("d", "D", 75, Category::Otc).with_original_price(100);
        assert_eq!(product.discount_percent(), Some(25));
        let full_price = Product::new("f", "F", 75, Category::Otc);
        assert_eq!(full_price.discount_percent(), None);
    }

    #[test]
    fn test_search_by_category_and_text() {
        let catalog = sample_catalog();

        let all: Vec<_> = catalog.search(&ProductQuery::default()).collect();
        assert_eq!(all.len(), 3);

        let rx: Vec<_> = catalog
            .search(&ProductQuery::category(Category::Prescription))
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(rx, vec!["augmentin-625"]);

        let by_generic: Vec<_> = catalog
            .search(&ProductQuery::text("PARACETAMOL"))
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(by_generic, vec!["dolo-650"]);

        let none = ProductQuery {
            category: Some(Category::Otc),
            text: Some("vitamin".into()),
        };
        assert_eq!(catalog.search(&none).count(), 0);
    }

    #[test]
    fn test_require_in_stock() {
        let catalog = sample_catalog();
        assert!(catalog.require_in_stock("dolo-650").is_ok());
        assert!(matches!(
            catalog.require_in_stock("limcee"),
            Err(StoreError::ProductUnavailable { .. })
        ));
        assert!(matches!(
            catalog.require_in_stock("nope"),
            Err(StoreError::ProductNotFound { .. })
        ));
        assert_eq!(catalog.in_stock_products().count(), 2);
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml = r#"
            [[products]]
            id = "cetzine"
            name = "Cetzine"
            generic_name = "Cetirizine"
            manufacturer = "GSK"
            price = 18
            original_price = 20
            category = "otc"
            quantity = "10 tablets"

            [[products]]
            id = "azee-500"
            name = "Azee 500"
            generic_name = "Azithromycin"
            manufacturer = "Cipla"
            price = 119
            category = "prescription"
            requires_prescription = true
        "#;

        let catalog = ProductCatalog::from_toml(toml).unwrap();
        assert_eq!(catalog.len(), 2);
        let azee = catalog.get("azee-500").unwrap();
        assert!(azee.requires_prescription);
        assert!(azee.in_stock);
        assert_eq!(catalog.get("cetzine").unwrap().quantity, "10 tablets");
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let toml = r#"
            [[products]]
            id = "dup"
            name = "A"
            generic_name = ""
            manufacturer = ""
            price = 1
            category = "otc"

            [[products]]
            id = "dup"
            name = "B"
            generic_name = ""
            manufacturer = ""
            price = 2
            category = "otc"
        "#;
        assert!(matches!(
            ProductCatalog::from_toml(toml),
            Err(StoreError::Configuration(_))
        ));
    }
}
