//! Query handlers for the catalog context.
//!
//! Read-only projections built from view snapshots.

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::product::Product;

/// One category section of the cashier menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection {
    /// Category name, or `None` for products whose category is unknown.
    pub category: Option<String>,
    /// Products listed under the category, in input order.
    pub products: Vec<Product>,
}

/// Groups products under their categories for the cashier screen.
///
/// Sections follow the category order given; empty categories are kept so
/// the cashier still sees them. Products referencing a category that does
/// not exist end up in a trailing section with `category: None`.
#[must_use]
pub fn cashier_menu(categories: &[Category], products: &[Product]) -> Vec<MenuSection> {
    let mut sections: Vec<MenuSection> = categories
        .iter()
        .map(|category| MenuSection {
            category: Some(category.name.clone()),
            products: products
                .iter()
                .filter(|p| p.category == category.name)
                .cloned()
                .collect(),
        })
        .collect();

    let orphans: Vec<Product> = products
        .iter()
        .filter(|p| !categories.iter().any(|c| c.name == p.category))
        .cloned()
        .collect();
    if !orphans.is_empty() {
        sections.push(MenuSection {
            category: None,
            products: orphans,
        });
    }
    sections
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
        }
    }

    fn product(id: &str, name: &str, category: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: dec!(1.00),
            category: category.into(),
        }
    }

    #[test]
    fn test_cashier_menu_groups_products_by_category() {
        // Arrange
        let categories = vec![category("c1", "Drinks"), category("c2", "Snacks")];
        let products = vec![
            product("p1", "Crisps", "Snacks"),
            product("p2", "Tea", "Drinks"),
            product("p3", "Water", "Drinks"),
        ];

        // Act
        let menu = cashier_menu(&categories, &products);

        // Assert
        assert_eq!(menu.len(), 2);
        assert_eq!(menu[0].category.as_deref(), Some("Drinks"));
        assert_eq!(
            menu[0].products.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["p2", "p3"]
        );
        assert_eq!(menu[1].category.as_deref(), Some("Snacks"));
        assert_eq!(menu[1].products.len(), 1);
    }

    #[test]
    fn test_cashier_menu_keeps_empty_categories_and_collects_orphans() {
        let categories = vec![category("c1", "Desserts")];
        let products = vec![product("p1", "Tea", "Drinks")];

        let menu = cashier_menu(&categories, &products);

        assert_eq!(menu.len(), 2);
        assert!(menu[0].products.is_empty());
        assert_eq!(menu[1].category, None);
        assert_eq!(menu[1].products[0].id, "p1");
    }

    #[test]
    fn test_cashier_menu_of_empty_catalog_is_empty() {
        assert!(cashier_menu(&[], &[]).is_empty());
    }
}
