//! Price Catalog
//!
//! Static mapping from SKU to price and credit grant. Immutable after
//! construction, so it is thread-safe to share by reference.

use serde::{Deserialize, Serialize};

/// Purchasable credit bundles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sku {
    /// One rendering credit
    Single,
    /// Five rendering credits
    Pack5,
    /// Full marketing kit (12 credits)
    Marketing,
}

impl Sku {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sku::Single => "single",
            Sku::Pack5 => "pack5",
            Sku::Marketing => "marketing",
        }
    }
}

/// A single catalog entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Bundle identifier
    pub sku: Sku,

    /// Price in currency minor units (USD cents)
    pub amount_cents: i64,

    /// Credits granted on fulfillment
    pub credits_granted: u32,

    /// Product name shown on the checkout page
    pub display_name: String,
}

/// Read-only price catalog, defined at startup
pub struct PriceCatalog {
    entries: Vec<PriceEntry>,
}

impl PriceCatalog {
    /// The standard renderbot price list
    pub fn standard() -> Self {
        Self {
            entries: vec![
                PriceEntry {
                    sku: Sku::Single,
                    amount_cents: 2900,
                    credits_granted: 1,
                    display_name: "1 Rendering Credit".into(),
                },
                PriceEntry {
                    sku: Sku::Pack5,
                    amount_cents: 9900,
                    credits_granted: 5,
                    display_name: "5 Rendering Credits".into(),
                },
                PriceEntry {
                    sku: Sku::Marketing,
                    amount_cents: 29900,
                    credits_granted: 12,
                    display_name: "Full Marketing Kit (12 credits)".into(),
                },
            ],
        }
    }

    /// Look up an entry by SKU
    pub fn lookup(&self, sku: Sku) -> Option<&PriceEntry> {
        self.entries.iter().find(|e| e.sku == sku)
    }

    /// All entries, in display order
    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog() {
        let catalog = PriceCatalog::standard();

        let single = catalog.lookup(Sku::Single).unwrap();
        assert_eq!(single.amount_cents, 2900);
        assert_eq!(single.credits_granted, 1);

        let pack = catalog.lookup(Sku::Pack5).unwrap();
        assert_eq!(pack.amount_cents, 9900);
        assert_eq!(pack.credits_granted, 5);

        let kit = catalog.lookup(Sku::Marketing).unwrap();
        assert_eq!(kit.amount_cents, 29900);
        assert_eq!(kit.credits_granted, 12);
    }

    #[test]
    fn test_entries_are_positive() {
        for entry in PriceCatalog::standard().entries() {
            assert!(entry.amount_cents > 0);
            assert!(entry.credits_granted > 0);
        }
    }
}
