//! Category display formatting
//!
//! Categories print as a tree with their subcategories underneath.

use crate::models::CategoryWithSubcategories;

/// Format categories as a tree
pub fn format_category_tree(categories: &[CategoryWithSubcategories]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'plan init' to create the Inflow category.".to_string();
    }

    let mut output = String::new();

    for (i, cws) in categories.iter().enumerate() {
        output.push_str(&format!("{}\n", cws.category.name));

        if cws.subcategories.is_empty() {
            output.push_str("  (no subcategories)\n");
        } else {
            for (j, sub) in cws.subcategories.iter().enumerate() {
                let is_last = j == cws.subcategories.len() - 1;
                let prefix = if is_last { "└── " } else { "├── " };
                let marker = if sub.is_inflow_marker() { " (inflow)" } else { "" };

                output.push_str(&format!("  {}{}{}\n", prefix, sub.name, marker));
            }
        }

        if i < categories.len() - 1 {
            output.push('\n');
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Subcategory, UserId, READY_TO_ASSIGN};

    #[test]
    fn test_tree() {
        let user = UserId::new();
        let inflow = Category::new(user, "Inflow");
        let home = Category::new(user, "Home");
        let tree = vec![
            CategoryWithSubcategories {
                subcategories: vec![
                    Subcategory::new(user, home.id, "Hydro"),
                    Subcategory::new(user, home.id, "Rent"),
                ],
                category: home,
            },
            CategoryWithSubcategories {
                subcategories: vec![Subcategory::new(user, inflow.id, READY_TO_ASSIGN)],
                category: inflow,
            },
        ];

        let output = format_category_tree(&tree);
        assert!(output.contains("├── Hydro"));
        assert!(output.contains("└── Rent"));
        assert!(output.contains("└── Ready to Assign (inflow)"));
    }

    #[test]
    fn test_empty() {
        assert!(format_category_tree(&[]).contains("plan init"));
    }
}
