use crate::domain::catalog::MenuItem;
use crate::domain::money::Yen;
use crate::error::{RegisterError, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One line of an order: an item, the price it sells at and how many.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct OrderLine {
    pub item_name: String,
    pub unit_price: Yen,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(item_name: impl Into<String>, unit_price: Yen, quantity: u32) -> Self {
        Self {
            item_name: item_name.into(),
            unit_price,
            quantity,
        }
    }

    pub fn total(&self) -> Yen {
        self.unit_price.saturating_mul(Yen::from(self.quantity))
    }
}

fn lines_total(lines: &[OrderLine]) -> Yen {
    lines
        .iter()
        .map(OrderLine::total)
        .fold(0, Yen::saturating_add)
}

/// The order a customer presents. Item names are unique and lines keep the order in
/// which items were first drawn.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct CustomerOrder {
    lines: Vec<OrderLine>,
}

impl CustomerOrder {
    /// Builds an order from picked items, merging repeats into one line.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a MenuItem>,
    {
        let mut lines: Vec<OrderLine> = Vec::new();
        for item in items {
            match lines.iter_mut().find(|line| line.item_name == item.name) {
                Some(line) => line.quantity += 1,
                None => lines.push(OrderLine::new(item.name.clone(), item.unit_price, 1)),
            }
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> Yen {
        lines_total(&self.lines)
    }

    /// Sum of quantities across lines, i.e. the number of items drawn.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Lines the operator has rung up so far in the current round.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Default)]
pub struct OperatorOrder {
    lines: Vec<OrderLine>,
}

impl OperatorOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> Yen {
        lines_total(&self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `item`, opening a new line or incrementing the existing one.
    pub fn add(&mut self, item: &MenuItem) {
        match self.lines.iter_mut().find(|line| line.item_name == item.name) {
            Some(line) => line.quantity += 1,
            None => self
                .lines
                .push(OrderLine::new(item.name.clone(), item.unit_price, 1)),
        }
    }

    /// Removes one unit; a line that drops to zero disappears.
    pub fn decrement(&mut self, item_name: &str) -> Result<()> {
        let index = self.position(item_name)?;
        self.lines[index].quantity -= 1;
        if self.lines[index].quantity == 0 {
            self.lines.remove(index);
        }
        Ok(())
    }

    /// Removes the whole line for `item_name`.
    pub fn remove(&mut self, item_name: &str) -> Result<OrderLine> {
        let index = self.position(item_name)?;
        Ok(self.lines.remove(index))
    }

    fn position(&self, item_name: &str) -> Result<usize> {
        self.lines
            .iter()
            .position(|line| line.item_name == item_name)
            .ok_or_else(|| RegisterError::ItemNotInOrder(item_name.to_string()))
    }
}

/// Draws a customer order: the number of draws is uniform over `draws`, every draw is
/// uniform over the whole catalog with replacement.
pub fn generate_order<R: Rng + ?Sized>(
    catalog: &[MenuItem],
    draws: RangeInclusive<u32>,
    rng: &mut R,
) -> Result<CustomerOrder> {
    if catalog.is_empty() {
        return Err(RegisterError::EmptyCatalog);
    }
    let count = rng.gen_range(draws);
    generate_order_with_draws(catalog, count, rng)
}

/// Same as [`generate_order`] with a fixed number of draws.
pub fn generate_order_with_draws<R: Rng + ?Sized>(
    catalog: &[MenuItem],
    draws: u32,
    rng: &mut R,
) -> Result<CustomerOrder> {
    let picked = (0..draws)
        .map(|_| catalog.choose(rng).ok_or(RegisterError::EmptyCatalog))
        .collect::<Result<Vec<_>>>()?;
    if picked.is_empty() {
        return Err(RegisterError::EmptyCatalog);
    }
    Ok(CustomerOrder::from_items(picked))
}

/// Multiset equality over `(item_name, unit_price, quantity)`, ignoring line order.
///
/// Any difference in any line fails the whole comparison.
pub fn orders_match(expected: &[OrderLine], actual: &[OrderLine]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut expected: Vec<&OrderLine> = expected.iter().collect();
    let mut actual: Vec<&OrderLine> = actual.iter().collect();
    expected.sort_by(|a, b| a.item_name.cmp(&b.item_name));
    actual.sort_by(|a, b| a.item_name.cmp(&b.item_name));

    expected.iter().zip(actual.iter()).all(|(e, a)| {
        e.item_name == a.item_name && e.unit_price == a.unit_price && e.quantity == a.quantity
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Category;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> Vec<MenuItem> {
        vec![
            MenuItem::new("からあげクン", 248, Category::Fryer),
            MenuItem::new("コロッケ", 108, Category::Croquette),
            MenuItem::new("サラダ", 522, Category::Salad),
        ]
    }

    #[test]
    fn test_from_items_merges_duplicates_in_first_seen_order() {
        let items = catalog();
        let order = CustomerOrder::from_items([&items[1], &items[0], &items[1], &items[1]]);

        assert_eq!(
            order.lines(),
            &[
                OrderLine::new("コロッケ", 108, 3),
                OrderLine::new("からあげクン", 248, 1),
            ]
        );
        assert_eq!(order.subtotal(), 572);
        assert_eq!(order.item_count(), 4);
    }

    #[test]
    fn test_generate_order_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(3);
        let result = generate_order(&[], 1..=6, &mut rng);
        assert!(matches!(result, Err(RegisterError::EmptyCatalog)));
    }

    #[test]
    fn test_generate_order_with_draws_counts_every_draw() {
        let mut rng = StdRng::seed_from_u64(11);
        let order = generate_order_with_draws(&catalog(), 5, &mut rng).unwrap();
        assert_eq!(order.item_count(), 5);
        assert!(order.lines().len() <= 3);
    }

    #[test]
    fn test_operator_order_add_decrement_remove() {
        let items = catalog();
        let mut order = OperatorOrder::new();
        order.add(&items[0]);
        order.add(&items[0]);
        order.add(&items[2]);
        assert_eq!(order.total(), 248 * 2 + 522);

        order.decrement("からあげクン").unwrap();
        assert_eq!(order.lines()[0].quantity, 1);
        order.decrement("からあげクン").unwrap();
        assert_eq!(order.lines().len(), 1);

        let removed = order.remove("サラダ").unwrap();
        assert_eq!(removed.quantity, 1);
        assert!(order.is_empty());

        assert!(matches!(
            order.decrement("サラダ"),
            Err(RegisterError::ItemNotInOrder(_))
        ));
    }

    #[test]
    fn test_orders_match_ignores_line_order() {
        let a = vec![OrderLine::new("A", 100, 1), OrderLine::new("B", 200, 2)];
        let b = vec![OrderLine::new("B", 200, 2), OrderLine::new("A", 100, 1)];
        assert!(orders_match(&a, &b));
        assert!(orders_match(&b, &a));
    }

    #[test]
    fn test_orders_match_is_strict() {
        let a = vec![OrderLine::new("A", 100, 1), OrderLine::new("B", 200, 2)];

        let quantity = vec![OrderLine::new("A", 100, 1), OrderLine::new("B", 200, 1)];
        let price = vec![OrderLine::new("A", 90, 1), OrderLine::new("B", 200, 2)];
        let missing = vec![OrderLine::new("A", 100, 1)];

        assert!(!orders_match(&a, &quantity));
        assert!(!orders_match(&a, &price));
        assert!(!orders_match(&a, &missing));
        assert!(!orders_match(&a, &[]));
    }
}
