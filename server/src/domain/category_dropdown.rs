//! Selection state for the grouped category filter dropdown
//!
//! Items live in groups. The item with id [`ALL_ITEM_ID`] is a pseudo-item:
//! it is checked exactly when every other item is checked, and toggling it
//! flips every other item.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Id of the "select all" pseudo-item
pub const ALL_ITEM_ID: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub items: Vec<CategoryItem>,
}

/// Dropdown state: the groups as currently displayed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryDropdown {
    groups: Vec<CategoryGroup>,
}

impl CategoryDropdown {
    pub fn new(groups: Vec<CategoryGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<CategoryGroup> {
        self.groups
    }

    fn items(&self) -> impl Iterator<Item = &CategoryItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut CategoryItem> {
        self.groups.iter_mut().flat_map(|g| g.items.iter_mut())
    }

    /// Whether every item other than "all" is checked
    pub fn all_selected(&self) -> bool {
        self.items()
            .filter(|i| i.id != ALL_ITEM_ID)
            .all(|i| i.checked)
    }

    /// Ids of the checked items, excluding "all"
    pub fn selected_ids(&self) -> Vec<&str> {
        self.items()
            .filter(|i| i.id != ALL_ITEM_ID && i.checked)
            .map(|i| i.id.as_str())
            .collect()
    }

    /// Toggle the item with `id`. Unknown ids only resync "all".
    pub fn on_selected(&mut self, id: &str) {
        if id == ALL_ITEM_ID {
            let was_checked = self
                .items()
                .find(|i| i.id == ALL_ITEM_ID)
                .is_some_and(|i| i.checked);
            for item in self.items_mut().filter(|i| i.id != ALL_ITEM_ID) {
                item.checked = !was_checked;
            }
        } else if let Some(item) = self.items_mut().find(|i| i.id == id) {
            item.checked = !item.checked;
        }

        let all = self.all_selected();
        if let Some(item) = self.items_mut().find(|i| i.id == ALL_ITEM_ID) {
            item.checked = all;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, checked: bool) -> CategoryItem {
        CategoryItem {
            id: id.to_string(),
            label: id.to_uppercase(),
            checked,
        }
    }

    fn dropdown(all: bool, a: bool, b: bool, c: bool) -> CategoryDropdown {
        CategoryDropdown::new(vec![
            CategoryGroup {
                label: None,
                items: vec![item("all", all)],
            },
            CategoryGroup {
                label: Some("Filter by category".to_string()),
                items: vec![item("analytics", a), item("chat", b)],
            },
            CategoryGroup {
                label: Some("More".to_string()),
                items: vec![item("voice", c)],
            },
        ])
    }

    #[test]
    fn test_toggle_all_checks_everything() {
        let mut state = dropdown(false, true, false, false);
        state.on_selected("all");
        assert!(state.items().all(|i| i.checked));
        assert_eq!(state.selected_ids(), vec!["analytics", "chat", "voice"]);
    }

    #[test]
    fn test_toggle_all_when_checked_clears_everything() {
        let mut state = dropdown(true, true, true, true);
        state.on_selected("all");
        assert!(state.items().all(|i| !i.checked));
        assert!(state.selected_ids().is_empty());
    }

    #[test]
    fn test_toggling_last_item_checks_all() {
        let mut state = dropdown(false, true, true, false);
        state.on_selected("voice");
        assert!(state.all_selected());
        assert!(state.items().find(|i| i.id == "all").unwrap().checked);
    }

    #[test]
    fn test_unchecking_item_unchecks_all() {
        let mut state = dropdown(true, true, true, true);
        state.on_selected("chat");
        let all = state.items().find(|i| i.id == "all").unwrap();
        assert!(!all.checked);
        assert_eq!(state.selected_ids(), vec!["analytics", "voice"]);
    }

    #[test]
    fn test_unknown_id_leaves_items_alone() {
        let mut state = dropdown(false, true, false, false);
        let before = state.clone();
        state.on_selected("missing");
        assert_eq!(state, before);
    }
}
