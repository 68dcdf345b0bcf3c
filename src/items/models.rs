use serde::{Deserialize, Serialize};

/// An item listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Item {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            price,
            available: true,
            image_url: None,
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }
}

/// Catalog filter. Every `None` field is skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl ItemFilter {
    /// Build a filter from raw query-string values.
    ///
    /// Blank or unparseable values drop that filter rather than failing the request.
    pub fn from_raw(
        category: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
        available: Option<&str>,
    ) -> Self {
        fn non_blank(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        Self {
            category: non_blank(category).map(str::to_string),
            min_price: non_blank(min_price).and_then(|v| v.parse().ok()),
            max_price: non_blank(max_price).and_then(|v| v.parse().ok()),
            available: non_blank(available).and_then(|v| v.to_ascii_lowercase().parse().ok()),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.category
            .as_deref()
            .is_none_or(|c| item.category.eq_ignore_ascii_case(c))
            && self.min_price.is_none_or(|min| item.price >= min)
            && self.max_price.is_none_or(|max| item.price <= max)
            && self.available.is_none_or(|a| item.available == a)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.available.is_none()
    }
}
