use std::collections::{BTreeMap, HashSet};

use super::model::{CurveCatalog, MeasurementTable, WellRecord, WellTable};

/// Whether `well` has at least one non-missing reading of `curve`.
/// No samples at all counts as absent.
pub fn has_curve(measurements: &MeasurementTable, well: &str, curve: &str) -> bool {
    measurements
        .samples(well, curve)
        .is_some_and(|samples| samples.iter().any(|s| s.is_some_and(|v| !v.is_nan())))
}

/// Availability flags of one well for every catalog curve.
pub fn curve_availability(
    measurements: &MeasurementTable,
    well: &str,
    catalog: &CurveCatalog,
) -> BTreeMap<String, bool> {
    catalog
        .iter()
        .map(|curve| (curve.to_string(), has_curve(measurements, well, curve)))
        .collect()
}

/// Annotate every well with its curve availability and index the result.
///
/// Wells keep their input order. Wells missing from `measurements` get
/// `false` for every curve; measurement wells without a metadata row are
/// ignored.
pub fn build_availability(
    wells: Vec<WellRecord>,
    measurements: &MeasurementTable,
    catalog: CurveCatalog,
) -> WellTable {
    let wells: Vec<WellRecord> = wells
        .into_iter()
        .map(|mut well| {
            well.curves = curve_availability(measurements, &well.name, &catalog);
            well
        })
        .collect();

    let known: HashSet<&str> = wells.iter().map(|w| w.name.as_str()).collect();
    let orphans = measurements.wells().filter(|name| !known.contains(name)).count();
    if orphans > 0 {
        log::warn!("{orphans} wells in the log data have no metadata row and were skipped");
    }

    WellTable::from_wells(wells, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Partition;

    fn measurements() -> MeasurementTable {
        let mut m = MeasurementTable::new();
        m.push("A", "GR", Some(55.0));
        m.push("A", "GR", None);
        m.push("A", "RHOB", None);
        m.push("A", "RHOB", Some(f64::NAN));
        m.push("B", "GR", None);
        m.push("B", "RHOB", Some(2.45));
        m.push("ORPHAN", "GR", Some(1.0));
        m
    }

    fn wells() -> Vec<WellRecord> {
        vec![
            WellRecord::new("A", Partition::Training, 58.1, 1.9),
            WellRecord::new("B", Partition::Test, 59.4, 2.2),
            WellRecord::new("C", Partition::Training, 60.0, 3.0),
        ]
    }

    #[test]
    fn any_valid_sample_marks_curve_present() {
        let m = measurements();
        assert!(has_curve(&m, "A", "GR"));
        assert!(!has_curve(&m, "A", "RHOB"), "all missing or NaN");
        assert!(!has_curve(&m, "B", "GR"));
        assert!(has_curve(&m, "B", "RHOB"));
        assert!(!has_curve(&m, "A", "NPHI"), "no samples at all");
    }

    #[test]
    fn builds_flags_for_every_catalog_curve() {
        let catalog = CurveCatalog::new(["GR", "RHOB", "NPHI"]);
        let table = build_availability(wells(), &measurements(), catalog);

        let names: Vec<&str> = table.wells.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);

        for well in &table.wells {
            assert_eq!(well.curves.len(), 3, "{} lacks a flag", well.name);
        }
        let a = table.get("A").unwrap();
        assert_eq!(
            (a.has_curve("GR"), a.has_curve("RHOB"), a.has_curve("NPHI")),
            (true, false, false)
        );
        let b = table.get("B").unwrap();
        assert_eq!((b.has_curve("GR"), b.has_curve("RHOB")), (false, true));
    }

    #[test]
    fn wells_without_measurements_have_nothing() {
        let table = build_availability(wells(), &measurements(), CurveCatalog::default());
        let c = table.get("C").unwrap();
        assert!(c.curves.values().all(|present| !present));
        assert!(table.get("ORPHAN").is_none());
    }

    #[test]
    fn build_is_order_independent() {
        let catalog = CurveCatalog::new(["GR", "RHOB"]);
        let forward = build_availability(wells(), &measurements(), catalog.clone());
        let mut reversed_input = wells();
        reversed_input.reverse();
        let reversed = build_availability(reversed_input, &measurements(), catalog);

        for well in &forward.wells {
            assert_eq!(reversed.get(&well.name).unwrap().curves, well.curves);
        }
    }
}
