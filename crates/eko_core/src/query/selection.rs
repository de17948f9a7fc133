//! Multi-select state for bulk actions.

use std::collections::BTreeSet;
use uuid::Uuid;

/// Ids ticked on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one id; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.ids.remove(&id) {
            return false;
        }
        self.ids.insert(id);
        true
    }

    /// Selects every id on the visible page, or clears the selection when
    /// the whole page is already selected.
    pub fn toggle_page(&mut self, page_ids: &[Uuid]) {
        let all_selected = !page_ids.is_empty() && page_ids.iter().all(|id| self.ids.contains(id));
        self.ids.clear();
        if !all_selected {
            self.ids.extend(page_ids.iter().copied());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }
}

impl FromIterator<Uuid> for Selection {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use uuid::Uuid;

    #[test]
    fn toggle_flips_membership() {
        let id = Uuid::new_v4();
        let mut selection = Selection::new();
        assert!(selection.toggle(id));
        assert!(selection.contains(&id));
        assert!(!selection.toggle(id));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_page_selects_then_clears() {
        let page = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut selection = Selection::new();
        selection.toggle(page[0]);

        selection.toggle_page(&page);
        assert_eq!(selection.len(), 2);

        selection.toggle_page(&page);
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_page_replaces_selection_from_other_pages() {
        let off_page = Uuid::new_v4();
        let page = vec![Uuid::new_v4()];
        let mut selection = Selection::from_iter([off_page]);
        selection.toggle_page(&page);
        assert!(!selection.contains(&off_page));
        assert!(selection.contains(&page[0]));
    }
}
