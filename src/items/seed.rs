//! Initial catalog loading.
//!
//! A seed file is a JSON array of loosely-typed item records. Prices may be
//! plain numbers or display strings such as `"$621.34 USD"`. When no usable
//! file is available the built-in sample catalog is used instead.

use serde::Deserialize;
use std::path::Path;

use super::models::Item;
use crate::error::{PriceFeedError, Result};

const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedPrice {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedItem {
    id: Option<String>,
    name: Option<String>,
    price: Option<SeedPrice>,
    category: Option<String>,
    image_url: Option<String>,
    available: Option<bool>,
}

impl From<SeedItem> for Item {
    fn from(seed: SeedItem) -> Self {
        let price = match seed.price {
            Some(SeedPrice::Number(n)) => n,
            Some(SeedPrice::Text(s)) => parse_price(&s),
            None => 0.0,
        };

        Item {
            id: seed
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            name: seed.name.unwrap_or_default(),
            category: seed.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            price,
            available: seed.available.unwrap_or(true),
            image_url: seed.image_url,
        }
    }
}

/// Parse a human readable price such as `"$621.34 USD"` into `621.34`.
///
/// Everything except ASCII digits and `.` is stripped; anything left that
/// still does not parse yields `0.0`.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    cleaned.parse().unwrap_or(0.0)
}

/// Read a seed file strictly. Empty arrays are rejected.
pub fn read_seed_file(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)?;
    let seeds: Vec<SeedItem> = serde_json::from_str(&content)?;

    if seeds.is_empty() {
        return Err(PriceFeedError::InvalidInput(format!(
            "Seed file {} contains no items",
            path.display()
        )));
    }

    Ok(seeds.into_iter().map(Item::from).collect())
}

/// Load the starting catalog, falling back to [`sample_catalog`].
pub fn load_catalog(path: Option<&Path>) -> Vec<Item> {
    let Some(path) = path else {
        tracing::debug!("No seed file configured, using sample catalog");
        return sample_catalog();
    };

    match read_seed_file(path) {
        Ok(items) => {
            tracing::info!(
                "Loaded {} items from seed file {}",
                items.len(),
                path.display()
            );
            items
        },
        Err(e) => {
            tracing::warn!(
                "Failed to load seed file {}: {}. Using sample catalog",
                path.display(),
                e
            );
            sample_catalog()
        },
    }
}

/// Built-in catalog used when no seed file is available.
pub fn sample_catalog() -> Vec<Item> {
    vec![
        Item::new("item1", "Cap signed by Peso Pluma", "Memorabilia", parse_price("$621.34 USD"))
            .with_image("Gorra.jpeg"),
        Item::new("item2", "Helmet signed by Rosalía", "Memorabilia", parse_price("$734.57 USD"))
            .with_image("casco.png"),
        Item::new("item3", "Bad Bunny jacket", "Memorabilia", parse_price("$521.89 USD"))
            .with_image("chamarra.png"),
        Item::new(
            "item4",
            "Fernando Delgadillo guitar",
            "Instruments",
            parse_price("$823.12 USD"),
        )
        .with_image("guitarra.png"),
        Item::new("item5", "Jersey signed by Snoop Dogg", "Clothing", parse_price("$355.67 USD"))
            .with_image("jersey.png"),
        Item::new("item6", "Cardi B signed garment", "Clothing", parse_price("$674.23 USD"))
            .with_image("prenda.png"),
        Item::new(
            "item7",
            "Guitar signed by Coldplay",
            "Instruments",
            parse_price("$458.91 USD"),
        )
        .with_image("coldplay.png"),
    ]
}
