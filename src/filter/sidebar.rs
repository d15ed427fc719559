use super::PropertyIndex;

/// One row of the filter sidebar.
pub enum SidebarRow {
    /// Property-key heading with its distinct-value count.
    Header { key: &'static str, distinct: usize },
    /// Checkbox for one (key, value) group, pre-checked at build.
    Checkbox {
        key: &'static str,
        value: String,
        size: usize,
        checked: bool,
    },
}

/// Flattened checkbox model derived from the property index. A single
/// dispatch through `toggle_selected` replaces per-checkbox callbacks:
/// the group is looked up from the index at toggle time.
pub struct Sidebar {
    pub rows: Vec<SidebarRow>,
    selected: Option<usize>,
}

impl Sidebar {
    /// Placeholder sidebar shown while the dataset loads.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            selected: None,
        }
    }

    /// One header per indexed key, one pre-checked checkbox per value
    /// bucket, in the index's display order. Selection starts on the
    /// first checkbox.
    pub fn from_index(index: &PropertyIndex) -> Self {
        let mut rows = Vec::new();
        for &key in index.keys() {
            rows.push(SidebarRow::Header {
                key,
                distinct: index.distinct_values(key),
            });
            for (value, ids) in index.values(key) {
                rows.push(SidebarRow::Checkbox {
                    key,
                    value: value.to_string(),
                    size: ids.len(),
                    checked: true,
                });
            }
        }
        let selected = rows
            .iter()
            .position(|row| matches!(row, SidebarRow::Checkbox { .. }));
        Self { rows, selected }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Move selection to the next checkbox row, skipping headers.
    pub fn select_next(&mut self) {
        let Some(current) = self.selected else { return };
        let next = self.rows[current + 1..]
            .iter()
            .position(|row| matches!(row, SidebarRow::Checkbox { .. }))
            .map(|offset| current + 1 + offset);
        if let Some(next) = next {
            self.selected = Some(next);
        }
    }

    /// Move selection to the previous checkbox row, skipping headers.
    pub fn select_prev(&mut self) {
        let Some(current) = self.selected else { return };
        let prev = self.rows[..current]
            .iter()
            .rposition(|row| matches!(row, SidebarRow::Checkbox { .. }));
        if let Some(prev) = prev {
            self.selected = Some(prev);
        }
    }

    /// Flip the selected checkbox and return the (key, value, visible)
    /// dispatch target for the visibility store.
    pub fn toggle_selected(&mut self) -> Option<(&'static str, String, bool)> {
        let idx = self.selected?;
        match &mut self.rows[idx] {
            SidebarRow::Checkbox {
                key,
                value,
                checked,
                ..
            } => {
                *checked = !*checked;
                Some((*key, value.clone(), *checked))
            }
            SidebarRow::Header { .. } => None,
        }
    }
}
