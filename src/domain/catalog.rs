use crate::domain::money::Yen;
use serde::{Deserialize, Serialize};

/// Catalog genre. The set is closed: the catalog store rejects any other label.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Category {
    #[serde(rename = "コロッケ類")]
    Croquette,
    #[serde(rename = "FF1")]
    Fryer,
    #[serde(rename = "なまもの")]
    Chilled,
    #[serde(rename = "常温")]
    Shelf,
    #[serde(rename = "中華まん")]
    SteamedBun,
    #[serde(rename = "サラダ")]
    Salad,
    #[serde(rename = "おにぎり")]
    RiceBall,
    #[serde(rename = "飲み物")]
    Drink,
}

/// A sellable item as it appears in the catalog.
///
/// Field names follow the catalog import columns (`name,price,genre,image`).
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MenuItem {
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Yen,
    #[serde(rename = "genre")]
    pub category: Category,
    #[serde(rename = "image", default)]
    pub image_ref: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, unit_price: Yen, category: Category) -> Self {
        Self {
            name: name.into(),
            unit_price,
            category,
            image_ref: String::new(),
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }
}
