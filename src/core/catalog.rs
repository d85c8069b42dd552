//! Catalog - read-mostly reference data priced by campus services.
//!
//! The ledger never owns catalog entries; it only charges the price a provider
//! declares at the moment of purchase.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A canteen menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    /// Menu section (e.g. "Snacks"); unrelated to ledger categories
    #[serde(default)]
    pub category: String,
}

/// An outstanding library fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryFine {
    pub id: String,
    pub book: String,
    pub days_overdue: u32,
    pub amount: Decimal,
}

/// A campus event open for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Registration fee; zero for free events
    #[serde(default)]
    pub fee: Decimal,
}

/// Source of prices for every chargeable campus service.
pub trait CatalogProvider: Send + Sync {
    /// Current canteen menu.
    fn menu(&self) -> Vec<MenuItem>;

    /// Library fines outstanding for a student.
    fn fines_for(&self, identity_id: &str) -> Vec<LibraryFine>;

    /// Events open for registration.
    fn events(&self) -> Vec<EventListing>;

    /// Price of one printed page.
    fn print_cost_per_page(&self) -> Decimal;

    /// Looks up one menu item by id.
    fn menu_item(&self, item_id: &str) -> Option<MenuItem> {
        self.menu().into_iter().find(|item| item.id == item_id)
    }
}

/// Catalog contents as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogData {
    pub menu: Vec<MenuItem>,
    pub fines: Vec<LibraryFine>,
    pub events: Vec<EventListing>,
    pub print_cost_per_page: Decimal,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            menu: vec![
                menu_item("1", "Veg Sandwich", 80, "Snacks"),
                menu_item("2", "Chicken Wrap", 140, "Main"),
                menu_item("3", "Cold Coffee", 60, "Beverages"),
                menu_item("4", "Masala Dosa", 90, "Main"),
                menu_item("5", "Fruit Salad", 100, "Healthy"),
                menu_item("6", "Brownie", 70, "Dessert"),
            ],
            fines: vec![
                LibraryFine {
                    id: "1".to_string(),
                    book: "Introduction to Algorithms".to_string(),
                    days_overdue: 12,
                    amount: Decimal::new(120, 0),
                },
                LibraryFine {
                    id: "2".to_string(),
                    book: "Clean Code".to_string(),
                    days_overdue: 3,
                    amount: Decimal::new(30, 0),
                },
            ],
            events: vec![
                event("1", "Tech Symposium 2024", "Oct 25, 2024", "Annual tech gathering.", 250),
                event("2", "Campus Music Fest", "Nov 05, 2024", "Live bands and food stalls.", 500),
                event("3", "AI Workshop", "Oct 30, 2024", "Hands-on session with Gemini.", 0),
            ],
            print_cost_per_page: Decimal::new(5, 0),
        }
    }
}

fn menu_item(id: &str, name: &str, price: i64, section: &str) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price: Decimal::new(price, 0),
        category: section.to_string(),
    }
}

fn event(id: &str, title: &str, date: &str, description: &str, fee: i64) -> EventListing {
    EventListing {
        id: id.to_string(),
        title: title.to_string(),
        date: date.to_string(),
        description: description.to_string(),
        fee: Decimal::new(fee, 0),
    }
}

/// A fixed catalog. Every student sees the same fines.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    data: CatalogData,
}

impl StaticCatalog {
    /// Wraps configured catalog contents.
    #[must_use]
    pub const fn new(data: CatalogData) -> Self {
        Self { data }
    }
}

impl CatalogProvider for StaticCatalog {
    fn menu(&self) -> Vec<MenuItem> {
        self.data.menu.clone()
    }

    fn fines_for(&self, _identity_id: &str) -> Vec<LibraryFine> {
        self.data.fines.clone()
    }

    fn events(&self) -> Vec<EventListing> {
        self.data.events.clone()
    }

    fn print_cost_per_page(&self) -> Decimal {
        self.data.print_cost_per_page
    }
}
