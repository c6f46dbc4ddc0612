use std::collections::BTreeSet;
use std::path::Path;

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::filter::{Selection, SelectionCriteria, qualified_indices, select_wells};
use crate::data::loader;
use crate::data::model::{PARTITION_COLUMN, Partition, WellTable};

/// What a drag on the map does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    #[default]
    Pan,
    BoxSelect,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Availability table (None until a dataset is loaded).
    pub table: Option<WellTable>,

    /// Current curve / partition / map-selection criteria.
    pub criteria: SelectionCriteria,

    /// Indices of wells passing curves and partitions (cached).
    pub qualified: Vec<usize>,

    /// Result of the full filter (cached).
    pub selection: Selection,

    /// Which metadata column is used for colouring.
    pub color_column: Option<String>,

    /// Active colour map.
    pub color_map: Option<ColorMap>,

    pub map_mode: MapMode,

    /// Plot-space corner where the current box drag started.
    pub box_start: Option<[f64; 2]>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            table: None,
            criteria: SelectionCriteria::default(),
            qualified: Vec::new(),
            selection: Selection::default(),
            color_column: None,
            color_map: None,
            map_mode: MapMode::default(),
            box_start: None,
            status_message: None,
        }
    }

    /// Load the dataset named in the config, if it names one.
    pub fn load_configured_dataset(&mut self) {
        if let (Some(meta), Some(logs)) = (
            self.config.metadata_path.clone(),
            self.config.log_path.clone(),
        ) {
            self.load_dataset(&meta, &logs);
        }
    }

    /// Load metadata and logs; on failure keep the current table and report.
    pub fn load_dataset(&mut self, metadata_path: &Path, log_path: &Path) {
        match loader::load_dataset(metadata_path, log_path, &self.config) {
            Ok(table) => {
                log::info!(
                    "Loaded {} wells with {} catalog curves",
                    table.len(),
                    table.catalog.len()
                );
                self.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly built table and reset the criteria.
    pub fn set_table(&mut self, table: WellTable) {
        self.criteria = SelectionCriteria {
            required_curves: self
                .config
                .required_curves
                .iter()
                .filter(|c| table.catalog.contains(c))
                .cloned()
                .collect(),
            ..SelectionCriteria::default()
        };
        self.color_column = Some(PARTITION_COLUMN.to_string());
        self.table = Some(table);
        self.rebuild_color_map();
        self.box_start = None;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the cached qualified indices and selection.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.qualified = qualified_indices(table, &self.criteria);
            self.selection = select_wells(table, &self.criteria);
            log::debug!(
                "{} wells qualify, {} selected",
                self.qualified.len(),
                self.selection.count()
            );
        }
    }

    fn rebuild_color_map(&mut self) {
        self.color_map = match (&self.table, &self.color_column) {
            (Some(table), Some(col)) => table
                .unique_values
                .get(col)
                .map(ColorMap::new),
            _ => None,
        };
    }

    /// Set colour column and rebuild the map.
    pub fn set_color_column(&mut self, col: String) {
        self.color_column = Some(col);
        self.rebuild_color_map();
    }

    pub fn toggle_curve(&mut self, curve: &str) {
        if !self.criteria.required_curves.remove(curve) {
            self.criteria.required_curves.insert(curve.to_string());
        }
        self.refilter();
    }

    /// Require every catalog curve.
    pub fn require_all_curves(&mut self) {
        if let Some(table) = &self.table {
            self.criteria.required_curves = table.catalog.iter().map(str::to_string).collect();
            self.refilter();
        }
    }

    pub fn require_no_curves(&mut self) {
        self.criteria.required_curves.clear();
        self.refilter();
    }

    pub fn toggle_partition(&mut self, partition: Partition) {
        if !self.criteria.partitions.remove(&partition) {
            self.criteria.partitions.insert(partition);
        }
        self.refilter();
    }

    /// Replace the map selection. An empty set leaves the result unrestricted.
    pub fn select_on_map(&mut self, wells: BTreeSet<String>) {
        self.criteria.interactive = Some(wells);
        self.refilter();
    }

    pub fn clear_map_selection(&mut self) {
        self.criteria.interactive = None;
        self.box_start = None;
        self.refilter();
    }

    /// Select every well inside the (lon, lat) rectangle spanned by two corners.
    pub fn select_in_box(&mut self, a: [f64; 2], b: [f64; 2]) {
        let Some(table) = &self.table else {
            return;
        };
        let (lon_min, lon_max) = (a[0].min(b[0]), a[0].max(b[0]));
        let (lat_min, lat_max) = (a[1].min(b[1]), a[1].max(b[1]));
        let picked = table
            .wells
            .iter()
            .filter(|w| (lon_min..=lon_max).contains(&w.longitude))
            .filter(|w| (lat_min..=lat_max).contains(&w.latitude))
            .map(|w| w.name.clone())
            .collect();
        self.select_on_map(picked);
    }

    /// Whether a well is part of the current map selection.
    pub fn is_picked(&self, well: &str) -> bool {
        self.criteria
            .interactive
            .as_ref()
            .is_some_and(|ids| ids.contains(well))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CurveCatalog, WellRecord};

    fn state() -> AppState {
        let mut a = WellRecord::new("A", Partition::Training, 58.0, 2.0);
        a.curves.insert("GR".into(), true);
        a.curves.insert("RHOB".into(), false);
        let mut b = WellRecord::new("B", Partition::Test, 59.0, 3.0);
        b.curves.insert("GR".into(), true);
        b.curves.insert("RHOB".into(), true);
        let mut c = WellRecord::new("C", Partition::Training, 61.0, 4.0);
        c.curves.insert("GR".into(), false);
        c.curves.insert("RHOB".into(), true);

        let config = AppConfig {
            required_curves: vec!["GR".into(), "NOT_IN_CATALOG".into()],
            ..AppConfig::default()
        };
        let mut state = AppState::new(config);
        state.set_table(WellTable::from_wells(
            vec![a, b, c],
            CurveCatalog::new(["GR", "RHOB"]),
        ));
        state
    }

    #[test]
    fn new_table_applies_configured_curves() {
        let state = state();
        assert_eq!(
            state.criteria.required_curves,
            BTreeSet::from(["GR".to_string()])
        );
        assert_eq!(state.selection.wells, ["A", "B"]);
        assert_eq!(state.qualified, [0, 1]);
        assert_eq!(state.color_column.as_deref(), Some(PARTITION_COLUMN));
        assert!(state.color_map.is_some());
    }

    #[test]
    fn curve_and_partition_toggles_refilter() {
        let mut state = state();
        state.toggle_curve("RHOB");
        assert_eq!(state.selection.wells, ["B"]);
        state.toggle_curve("GR");
        assert_eq!(state.selection.wells, ["B", "C"]);
        state.toggle_partition(Partition::Test);
        assert_eq!(state.selection.wells, ["C"]);
        state.require_no_curves();
        assert_eq!(state.selection.wells, ["A", "C"]);
        state.require_all_curves();
        assert!(state.selection.is_empty());
    }

    #[test]
    fn box_selection_restricts_until_cleared() {
        let mut state = state();
        state.select_in_box([3.5, 62.0], [1.5, 57.0]);
        assert!(state.is_picked("A") && state.is_picked("B") && !state.is_picked("C"));
        assert_eq!(state.selection.wells, ["A", "B"]);

        state.select_in_box([1.9, 57.9], [2.1, 58.1]);
        assert_eq!(state.selection.wells, ["A"]);
        assert_eq!(state.qualified, [0, 1]);

        state.clear_map_selection();
        assert_eq!(state.selection.wells, ["A", "B"]);
        assert!(!state.is_picked("A"));
    }

    #[test]
    fn empty_box_shows_everything() {
        let mut state = state();
        state.select_in_box([10.0, 10.0], [11.0, 11.0]);
        assert_eq!(state.criteria.interactive, Some(BTreeSet::new()));
        assert_eq!(state.selection.wells, ["A", "B"]);
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = state();
        state.load_dataset(Path::new("missing.csv"), Path::new("missing.parquet"));
        assert!(state.status_message.is_some());
        assert_eq!(state.table.as_ref().map(WellTable::len), Some(3));
    }
}
