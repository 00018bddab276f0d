//! Static product catalog.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Money,
}

/// A named group of products, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub products: Vec<Product>,
}

/// Fixed reference data: category → ordered list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Creates a catalog from categories.
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Builds a catalog from `(category, [(product, price)])` tuples.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a [(&'a str, i64)])>,
    ) -> Self {
        let categories = entries
            .into_iter()
            .map(|(name, products)| Category {
                name: name.to_string(),
                products: products
                    .iter()
                    .map(|&(product, price)| Product {
                        name: product.to_string(),
                        price: Money::new(price),
                    })
                    .collect(),
            })
            .collect();
        Self { categories }
    }

    /// The festival bar menu.
    pub fn beizlifest() -> Self {
        Self::from_entries([
            (
                "BIER",
                &[("Feldschlösschen", 5), ("Pabst", 5), ("Zöndstoff", 5)][..],
            ),
            (
                "DIVERSES",
                &[
                    ("Smirnoff Ice", 6),
                    ("Weisswein Glas", 6),
                    ("Weisswein Flasche", 36),
                    ("Gespirtzter Weisswein", 7),
                    ("Cüpli / Hugo", 6),
                    ("Aperol Spritz", 10),
                ][..],
            ),
            (
                "LONGDRINKS",
                &[
                    ("Whisky", 10),
                    ("Vodka", 10),
                    ("Gin", 10),
                    ("Captain", 10),
                    ("Flying Hirsch", 10),
                ][..],
            ),
            (
                "SHOTS",
                &[
                    ("Jägermeister", 5),
                    ("Saurer Apfel", 5),
                    ("Feigling", 5),
                    ("Berliner Luft", 5),
                ][..],
            ),
            (
                "SOFTGETRÄNKE",
                &[
                    ("Mineral mit/ohne", 2),
                    ("Sprite", 4),
                    ("Coca Cola", 4),
                    ("Ice Tea", 4),
                    ("Bitterlemon / Tonic", 4),
                    ("Ginger Ale", 4),
                    ("El Tony", 5),
                    ("Orangensaft", 5),
                    ("Red Bull", 5),
                ][..],
            ),
            ("ESSEN", &[("Plättli", 18), ("Hot Dog", 5)][..]),
        ])
    }

    /// Returns all categories in display order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Returns a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Looks up the unit price of a product.
    pub fn price_of(&self, category: &str, product: &str) -> Result<Money, ValidationError> {
        let cat = self
            .category(category)
            .ok_or_else(|| ValidationError::UnknownCategory {
                category: category.to_string(),
            })?;

        cat.products
            .iter()
            .find(|p| p.name == product)
            .map(|p| p.price)
            .ok_or_else(|| ValidationError::UnknownProduct {
                category: category.to_string(),
                product: product.to_string(),
            })
    }
}
