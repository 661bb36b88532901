#![allow(dead_code)]

use register_drill::config::GameConfig;
use register_drill::domain::catalog::{Category, MenuItem};
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

/// The two-item catalog used by the round scenarios.
pub fn ab_catalog() -> Vec<MenuItem> {
    vec![
        MenuItem::new("A", 100, Category::Shelf).with_image("x"),
        MenuItem::new("B", 200, Category::Drink).with_image("y"),
    ]
}

pub fn write_catalog(path: &Path, items: &[MenuItem]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    for item in items {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_config(path: &Path, config: &GameConfig) -> Result<(), Error> {
    let mut file = File::create(path)?;
    file.write_all(serde_json::to_string_pretty(config)?.as_bytes())?;
    Ok(())
}

/// A config where the first failure ends the game.
pub fn sudden_death() -> GameConfig {
    GameConfig {
        lives: 1,
        ..GameConfig::default()
    }
}
