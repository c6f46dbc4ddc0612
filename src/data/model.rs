use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use super::DataError;

/// Canonical metadata keys the loader maps well-known columns onto.
pub const OPERATOR: &str = "operator";
pub const PURPOSE: &str = "purpose";
pub const COMPLETION_YEAR: &str = "completion_year";
pub const FORMATION: &str = "formation";

/// Pseudo-column exposing the partition tag to the colour-by selector.
pub const PARTITION_COLUMN: &str = "partition";

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a metadata column
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value as found in the well header table.
/// Must be `Ord` because it keys the colour map and the unique-value index.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl MetadataValue {
    fn rank(&self) -> u8 {
        match self {
            MetadataValue::Null => 0,
            MetadataValue::Bool(_) => 1,
            MetadataValue::Integer(_) => 2,
            MetadataValue::Float(_) => 3,
            MetadataValue::String(_) => 4,
        }
    }

    /// Guess the type of a raw text cell. Empty cells become `Null`.
    pub fn guess(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return MetadataValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return MetadataValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return MetadataValue::Float(f);
        }
        match s {
            "true" | "True" => MetadataValue::Bool(true),
            "false" | "False" => MetadataValue::Bool(false),
            _ => MetadataValue::String(s.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MetadataValue::Null)
    }
}

impl Eq for MetadataValue {}

impl PartialOrd for MetadataValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MetadataValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MetadataValue::Bool(a), MetadataValue::Bool(b)) => a.cmp(b),
            (MetadataValue::Integer(a), MetadataValue::Integer(b)) => a.cmp(b),
            (MetadataValue::Float(a), MetadataValue::Float(b)) => a.total_cmp(b),
            (MetadataValue::String(a), MetadataValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Which subset of the dataset a well belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Partition {
    Training,
    Test,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Training, Partition::Test];

    pub fn label(self) -> &'static str {
        match self {
            Partition::Training => "Training",
            Partition::Test => "Test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Partition {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "training" | "train" => Ok(Partition::Training),
            "test" => Ok(Partition::Test),
            _ => Err(DataError::UnknownPartition(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CurveCatalog
// ---------------------------------------------------------------------------

/// Curves of the FORCE 2020 lithology dataset.
pub const DEFAULT_CURVES: [&str; 15] = [
    "CALI", "BS", "DCAL", "ROP", "RDEP", "RSHA", "RMED", "SP", "DTS", "DTC", "NPHI", "PEF",
    "GR", "RHOB", "DRHO",
];

/// Fixed, ordered set of known curve names. Duplicates are dropped on
/// construction, keeping the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveCatalog {
    names: Vec<String>,
}

impl CurveCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        CurveCatalog { names }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, curve: &str) -> bool {
        self.names.iter().any(|n| n == curve)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CurveCatalog {
    fn default() -> Self {
        CurveCatalog::new(DEFAULT_CURVES)
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – raw depth samples, consumed by the availability builder
// ---------------------------------------------------------------------------

/// Per-well, per-curve depth samples. `None` marks a missing reading.
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    samples: HashMap<String, BTreeMap<String, Vec<Option<f64>>>>,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample. `NaN` is stored as missing.
    pub fn push(&mut self, well: &str, curve: &str, value: Option<f64>) {
        let value = value.filter(|v| !v.is_nan());
        self.samples
            .entry(well.to_string())
            .or_default()
            .entry(curve.to_string())
            .or_default()
            .push(value);
    }

    pub fn samples(&self, well: &str, curve: &str) -> Option<&[Option<f64>]> {
        self.samples
            .get(well)
            .and_then(|curves| curves.get(curve))
            .map(Vec::as_slice)
    }

    pub fn wells(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(String::as_str)
    }

    /// Total number of stored samples, missing ones included.
    pub fn sample_count(&self) -> usize {
        self.samples
            .values()
            .flat_map(|curves| curves.values())
            .map(Vec::len)
            .sum()
    }
}

// ---------------------------------------------------------------------------
// WellRecord – one row of the availability table
// ---------------------------------------------------------------------------

/// A well with its header metadata and per-curve availability flags.
#[derive(Debug, Clone, PartialEq)]
pub struct WellRecord {
    pub name: String,
    pub partition: Partition,
    pub latitude: f64,
    pub longitude: f64,
    /// Descriptive columns: canonical key (or raw header) → value.
    pub metadata: BTreeMap<String, MetadataValue>,
    /// Curve name → at least one valid reading exists.
    pub curves: BTreeMap<String, bool>,
}

impl WellRecord {
    /// A well with no metadata and no availability computed yet.
    pub fn new(name: impl Into<String>, partition: Partition, latitude: f64, longitude: f64) -> Self {
        WellRecord {
            name: name.into(),
            partition,
            latitude,
            longitude,
            metadata: BTreeMap::new(),
            curves: BTreeMap::new(),
        }
    }

    pub fn has_curve(&self, curve: &str) -> bool {
        self.curves.get(curve).copied().unwrap_or(false)
    }

    /// Value of a metadata column, with `partition` resolved from the tag.
    pub fn value(&self, column: &str) -> MetadataValue {
        if column == PARTITION_COLUMN {
            return MetadataValue::String(self.partition.label().to_string());
        }
        self.metadata
            .get(column)
            .cloned()
            .unwrap_or(MetadataValue::Null)
    }
}

// ---------------------------------------------------------------------------
// WellTable – the complete availability table
// ---------------------------------------------------------------------------

/// All wells in metadata-file order, plus indices used by the UI.
#[derive(Debug, Clone)]
pub struct WellTable {
    pub wells: Vec<WellRecord>,
    pub catalog: CurveCatalog,
    /// Metadata columns available for colouring, `partition` first.
    pub column_names: Vec<String>,
    /// For each metadata column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<MetadataValue>>,
}

impl WellTable {
    /// Build column indices from wells whose availability is already set.
    pub fn from_wells(wells: Vec<WellRecord>, catalog: CurveCatalog) -> Self {
        let mut columns: BTreeSet<String> = BTreeSet::new();
        for well in &wells {
            columns.extend(well.metadata.keys().cloned());
        }

        let mut column_names = vec![PARTITION_COLUMN.to_string()];
        column_names.extend(columns.into_iter().filter(|c| c != PARTITION_COLUMN));

        let unique_values = column_names
            .iter()
            .map(|col| {
                let values: BTreeSet<MetadataValue> = wells.iter().map(|w| w.value(col)).collect();
                (col.clone(), values)
            })
            .collect();

        WellTable {
            wells,
            catalog,
            column_names,
            unique_values,
        }
    }

    pub fn len(&self) -> usize {
        self.wells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&WellRecord> {
        self.wells.iter().find(|w| w.name == name)
    }

    /// Number of wells with at least one valid reading of `curve`.
    pub fn coverage(&self, curve: &str) -> usize {
        self.wells.iter().filter(|w| w.has_curve(curve)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_parses_dataset_labels() {
        assert_eq!("Training".parse::<Partition>().unwrap(), Partition::Training);
        assert_eq!(" test ".parse::<Partition>().unwrap(), Partition::Test);
        assert!(matches!(
            "Validation".parse::<Partition>(),
            Err(DataError::UnknownPartition(tag)) if tag == "Validation"
        ));
    }

    #[test]
    fn catalog_keeps_first_occurrence_order() {
        let catalog = CurveCatalog::new(["GR", "RHOB", "GR", "", "NPHI"]);
        assert_eq!(catalog.iter().collect::<Vec<_>>(), ["GR", "RHOB", "NPHI"]);
        assert!(catalog.contains("RHOB"));
        assert!(!catalog.contains("DTS"));
    }

    #[test]
    fn measurement_table_stores_nan_as_missing() {
        let mut table = MeasurementTable::new();
        table.push("15/9-13", "GR", Some(f64::NAN));
        table.push("15/9-13", "GR", Some(42.0));
        assert_eq!(table.samples("15/9-13", "GR"), Some(&[None, Some(42.0)][..]));
        assert_eq!(table.samples("15/9-13", "RHOB"), None);
        assert_eq!(table.sample_count(), 2);
    }

    #[test]
    fn metadata_guess_and_order() {
        assert_eq!(MetadataValue::guess("1987"), MetadataValue::Integer(1987));
        assert_eq!(MetadataValue::guess("59.5"), MetadataValue::Float(59.5));
        assert_eq!(MetadataValue::guess(""), MetadataValue::Null);
        assert_eq!(
            MetadataValue::guess("Equinor"),
            MetadataValue::String("Equinor".into())
        );
        assert!(MetadataValue::Null < MetadataValue::Integer(0));
        assert!(MetadataValue::Integer(5) < MetadataValue::String("a".into()));
    }

    #[test]
    fn table_indexes_partition_column_first() {
        let mut a = WellRecord::new("A", Partition::Training, 58.0, 2.0);
        a.metadata
            .insert(OPERATOR.into(), MetadataValue::String("Statoil".into()));
        a.curves.insert("GR".into(), true);
        let b = WellRecord::new("B", Partition::Test, 59.0, 2.5);

        let table = WellTable::from_wells(vec![a, b], CurveCatalog::new(["GR"]));
        assert_eq!(table.column_names, [PARTITION_COLUMN, OPERATOR]);
        assert_eq!(table.unique_values[PARTITION_COLUMN].len(), 2);
        assert!(table.unique_values[OPERATOR].contains(&MetadataValue::Null));
        assert_eq!(table.coverage("GR"), 1);
        assert_eq!(table.get("B").map(|w| w.partition), Some(Partition::Test));
    }
}
