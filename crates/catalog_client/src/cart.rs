use serde::Serialize;
use shared::domain::{Product, ProductKey};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

/// Session-only cart. Lines keep insertion order and are never removed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Returns the line's quantity after the add.
    pub fn add(&mut self, product: &Product) -> u32 {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.key == product.key)
        {
            line.quantity = line.quantity.saturating_add(1);
            return line.quantity;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        1
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn quantity_of(&self, key: &ProductKey) -> u32 {
        self.lines
            .iter()
            .find(|line| &line.product.key == key)
            .map_or(0, |line| line.quantity)
    }

    /// Badge count: sum of all line quantities.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
