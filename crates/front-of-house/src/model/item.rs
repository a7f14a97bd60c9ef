//! Menu items as they appear on an order.
//!
//! A [`MenuItem`] is identified by its [`ItemId`] alone: two copies of the same item
//! with different stock levels or prices still compare equal, which is what lets an
//! order's item list be folded into an occurrence map.

use row_store::{Row, Violation};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::iter::Sum;
use std::ops::Add;

/// Type-safe identifier for menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

/// An amount of money in pence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price(pub u64);

impl Price {
    pub fn times(self, count: u32) -> Price {
        Price(self.0 * u64::from(count))
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, other: Price) -> Price {
        Price(self.0 + other.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::default(), Add::add)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "£{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Menu sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Sides,
    Tacos,
    Quesadillas,
    Burritos,
    Enchiladas,
    Salads,
    Extras,
    SoftDrinks,
    Mocktails,
    Beers,
    Cocktails,
    Tequilas,
    Spirits,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::Sides,
        Category::Tacos,
        Category::Quesadillas,
        Category::Burritos,
        Category::Enchiladas,
        Category::Salads,
        Category::Extras,
        Category::SoftDrinks,
        Category::Mocktails,
        Category::Beers,
        Category::Cocktails,
        Category::Tequilas,
        Category::Spirits,
    ];

    /// Looks a category up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| format!("{c:?}").eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub calories: u32,
    pub category: Category,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub allergens: BTreeSet<String>,
    pub stock: u32,
}

impl MenuItem {
    /// Creates an item with no stock, no dietary flags and no allergens.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: Price, category: Category) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price,
            calories: 0,
            category,
            vegetarian: false,
            vegan: false,
            gluten_free: false,
            allergens: BTreeSet::new(),
            stock: 0,
        }
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_allergen(mut self, allergen: impl Into<String>) -> Self {
        self.allergens.insert(allergen.into());
        self
    }

    /// Marks the item vegan, which also makes it vegetarian.
    pub fn vegan(mut self) -> Self {
        self.vegan = true;
        self.vegetarian = true;
        self
    }

    pub fn vegetarian(mut self) -> Self {
        self.vegetarian = true;
        self
    }

    pub fn gluten_free(mut self) -> Self {
        self.gluten_free = true;
        self
    }
}

impl PartialEq for MenuItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MenuItem {}

impl PartialOrd for MenuItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MenuItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for MenuItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Changes a [`MenuItem`] row accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuPatch {
    /// Removes units from stock. Refused when the stock would go negative.
    TakeStock(u32),
    Restock(u32),
    SetPrice(Price),
}

impl Row for MenuItem {
    type Key = ItemId;
    type Patch = MenuPatch;
    const TABLE: &'static str = "menu";

    fn key(&self) -> ItemId {
        self.id
    }

    fn apply(&mut self, patch: MenuPatch) -> Result<(), Violation> {
        match patch {
            MenuPatch::TakeStock(units) => {
                let stock = self.stock;
                self.stock = stock
                    .checked_sub(units)
                    .ok_or_else(|| Violation::new("stock", stock, format!("cannot take {units}")))?;
            }
            MenuPatch::Restock(units) => self.stock = self.stock.saturating_add(units),
            MenuPatch::SetPrice(price) => self.price = price,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_compare_by_id_only() {
        let a = MenuItem::new(1, "Nachos", Price(450), Category::Sides).with_stock(3);
        let b = MenuItem::new(1, "Nachos (large)", Price(650), Category::Sides);
        assert_eq!(a, b);
        assert!(a < MenuItem::new(2, "Churros", Price(300), Category::Extras));
    }

    #[test]
    fn test_take_stock_refuses_to_go_negative() {
        let mut item = MenuItem::new(4, "Horchata", Price(350), Category::SoftDrinks).with_stock(2);
        assert!(item.apply(MenuPatch::TakeStock(2)).is_ok());
        let violation = item.apply(MenuPatch::TakeStock(1)).unwrap_err();
        assert_eq!(violation.column, "stock");
        assert_eq!(violation.value, "0");
    }

    #[test]
    fn test_price_display_and_category_lookup() {
        assert_eq!(Price(1205).to_string(), "£12.05");
        assert_eq!(Price(450).times(3), Price(1350));
        assert_eq!(Category::from_name("softdrinks"), Some(Category::SoftDrinks));
        assert_eq!(Category::from_name("pizza"), None);
    }
}
