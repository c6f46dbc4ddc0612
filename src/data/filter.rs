use std::collections::BTreeSet;
use std::fmt;

use super::model::{Partition, WellRecord, WellTable};

// ---------------------------------------------------------------------------
// Selection criteria: rebuilt from UI state on every interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    /// Every one of these curves must be present. Empty → no constraint.
    pub required_curves: BTreeSet<String>,
    /// Partitions to keep. Empty → nothing passes.
    pub partitions: BTreeSet<Partition>,
    /// Wells picked on the map. `None` and `Some(empty)` both mean
    /// "nothing picked yet" and do not restrict the result.
    pub interactive: Option<BTreeSet<String>>,
}

impl Default for SelectionCriteria {
    /// No required curves, both partitions, no map selection.
    fn default() -> Self {
        Self {
            required_curves: BTreeSet::new(),
            partitions: Partition::ALL.into_iter().collect(),
            interactive: None,
        }
    }
}

impl SelectionCriteria {
    /// The map selection, if it restricts anything.
    fn active_interactive(&self) -> Option<&BTreeSet<String>> {
        self.interactive.as_ref().filter(|ids| !ids.is_empty())
    }
}

/// Whether a well passes the curve and partition criteria. The map
/// selection is not considered here.
pub fn qualifies(well: &WellRecord, criteria: &SelectionCriteria) -> bool {
    criteria.required_curves.iter().all(|c| well.has_curve(c))
        && criteria.partitions.contains(&well.partition)
}

/// Indices of wells passing the curve and partition criteria, in table order.
pub fn qualified_indices(table: &WellTable, criteria: &SelectionCriteria) -> Vec<usize> {
    table
        .wells
        .iter()
        .enumerate()
        .filter(|(_, w)| qualifies(w, criteria))
        .map(|(i, _)| i)
        .collect()
}

/// Apply all criteria and return the surviving wells in table order.
///
/// Map-selected identifiers that do not qualify, or do not exist, are
/// dropped without error.
pub fn select_wells(table: &WellTable, criteria: &SelectionCriteria) -> Selection {
    let picked = criteria.active_interactive();
    let wells = table
        .wells
        .iter()
        .filter(|w| qualifies(w, criteria))
        .filter(|w| picked.map_or(true, |ids| ids.contains(&w.name)))
        .map(|w| w.name.clone())
        .collect();
    Selection { wells }
}

// ---------------------------------------------------------------------------
// Selection result
// ---------------------------------------------------------------------------

/// Ordered identifiers of the selected wells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub wells: Vec<String>,
}

impl Selection {
    pub fn count(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    /// The text block shown under the map, ready to paste into a script:
    ///
    /// ```text
    ///
    /// You have selected 2 wells.
    ///
    /// selected_wells = ['15/9-13', '16/1-2']
    /// ```
    pub fn render(&self) -> String {
        let quoted: Vec<String> = self.wells.iter().map(|w| quote(w)).collect();
        format!(
            "\nYou have selected {} wells.\n\nselected_wells = [{}]",
            self.count(),
            quoted.join(", ")
        )
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Single-quote an identifier, escaping backslashes and single quotes.
fn quote(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 2);
    out.push('\'');
    for ch in id.chars() {
        if ch == '\'' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}
