//! The fixed soda line-up and the menu keys that select it.

pub const COKE: &str = "Coke";
pub const FANTA: &str = "Fanta";
pub const SPRITE: &str = "Sprite";

/// Seed data for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub quantity: i32,
    pub price: i32,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, quantity: i32, price: i32) -> Self {
        Self { name: name.into(), quantity, price }
    }
}

/// Stock the machine starts with when nothing else is configured.
pub fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new(COKE, 50, 5),
        CatalogEntry::new(FANTA, 32, 4),
        CatalogEntry::new(SPRITE, 15, 3),
    ]
}

/// Maps a menu key (`1`, `2`, `3`) to a soda name.
pub fn name_for_key(key: &str) -> Option<&'static str> {
    match key.trim() {
        "1" => Some(COKE),
        "2" => Some(FANTA),
        "3" => Some(SPRITE),
        _ => None,
    }
}
