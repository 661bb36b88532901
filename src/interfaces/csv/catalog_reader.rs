use crate::domain::catalog::MenuItem;
use crate::error::{RegisterError, Result};
use std::io::Read;

/// Reads menu items from a CSV source with the columns `name,price,genre,image`.
///
/// Wraps `csv::Reader`, trims whitespace and tolerates a missing trailing `image` column.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates menu items.
    pub fn items(self) -> impl Iterator<Item = Result<MenuItem>> {
        self.reader.into_deserialize().map(|result| {
            let item: MenuItem = result?;
            if item.name.is_empty() {
                return Err(RegisterError::InvalidMenuItem(
                    "item name is empty".to_string(),
                ));
            }
            if item.unit_price == 0 {
                return Err(RegisterError::InvalidMenuItem(format!(
                    "{} has a price of 0",
                    item.name
                )));
            }
            Ok(item)
        })
    }

    /// Reads the whole catalog, failing on the first bad row.
    pub fn read_all(self) -> Result<Vec<MenuItem>> {
        self.items().collect()
    }
}
