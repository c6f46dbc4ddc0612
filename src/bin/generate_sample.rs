use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const CURVES: [&str; 15] = [
    "CALI", "BS", "DCAL", "ROP", "RDEP", "RSHA", "RMED", "SP", "DTS", "DTC", "NPHI", "PEF",
    "GR", "RHOB", "DRHO",
];

/// Typical (mean, spread) per curve, same order as `CURVES`.
const CURVE_RANGES: [(f64, f64); 15] = [
    (12.0, 2.0),   // CALI in
    (12.25, 0.0),  // BS in
    (0.5, 0.4),    // DCAL in
    (25.0, 10.0),  // ROP m/h
    (2.0, 1.5),    // RDEP ohm.m
    (1.5, 1.0),    // RSHA ohm.m
    (1.8, 1.2),    // RMED ohm.m
    (60.0, 25.0),  // SP mV
    (220.0, 40.0), // DTS us/ft
    (100.0, 20.0), // DTC us/ft
    (0.3, 0.08),   // NPHI v/v
    (3.5, 1.0),    // PEF b/e
    (70.0, 25.0),  // GR API
    (2.35, 0.15),  // RHOB g/cc
    (0.02, 0.03),  // DRHO g/cc
];

const OPERATORS: [&str; 5] = [
    "Equinor Energy AS",
    "Statoil Petroleum AS",
    "Esso Norge AS",
    "Norsk Hydro",
    "Aker BP ASA",
];
const PURPOSES: [&str; 3] = ["WILDCAT", "APPRAISAL", "PRODUCTION"];
const FORMATIONS: [&str; 6] = [
    "HUGIN FM",
    "DRAUPNE FM",
    "UTSIRA FM",
    "STATFJORD GP",
    "SKAGERRAK FM",
    "NESS FM",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct SampleWell {
    name: String,
    partition: &'static str,
    lat: f64,
    lon: f64,
    /// Curves logged in this well.
    logged: Vec<bool>,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(2020);

    let wells: Vec<SampleWell> = (0..40)
        .map(|i| {
            let quadrant = 15 + (i % 21);
            let block = 1 + (i * 7) % 12;
            SampleWell {
                name: format!("{quadrant}/{block}-{}", 1 + i % 9),
                partition: if rng.chance(0.8) { "Training" } else { "Test" },
                lat: rng.range(56.5, 61.8),
                lon: rng.range(1.8, 4.2),
                logged: CURVES.iter().map(|_| rng.chance(0.7)).collect(),
            }
        })
        .collect();

    write_metadata("sample_wells.csv", &wells, &mut rng)?;
    let samples = write_logs("sample_logs.parquet", &wells, &mut rng)?;

    println!(
        "Wrote {} wells to sample_wells.csv and {samples} depth samples to sample_logs.parquet",
        wells.len()
    );
    Ok(())
}

fn write_metadata(path: &str, wells: &[SampleWell], rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating metadata CSV")?;
    writer.write_record([
        "wlbWellboreName",
        "Dataset",
        "lat",
        "lon",
        "wlbDrillingOperator",
        "wlbPurpose",
        "wlbCompletionYear",
        "wlbFormationAtTD",
    ])?;
    for well in wells {
        let lat = format!("{:.5}", well.lat);
        let lon = format!("{:.5}", well.lon);
        let year = (1975 + rng.next_u64() % 45).to_string();
        writer.write_record([
            well.name.as_str(),
            well.partition,
            lat.as_str(),
            lon.as_str(),
            rng.pick(&OPERATORS),
            rng.pick(&PURPOSES),
            year.as_str(),
            rng.pick(&FORMATIONS),
        ])?;
    }
    writer.flush().context("writing metadata CSV")?;
    Ok(())
}

/// Wide log table: WELL, DEPTH_MD, one nullable Float64 column per curve.
/// Curves not logged in a well are all-null; logged ones have null gaps.
fn write_logs(path: &str, wells: &[SampleWell], rng: &mut SimpleRng) -> Result<usize> {
    let mut well_col = StringBuilder::new();
    let mut depth_col = Float64Builder::new();
    let mut curve_cols: Vec<Float64Builder> =
        CURVES.iter().map(|_| Float64Builder::new()).collect();
    let mut rows = 0usize;

    for well in wells {
        let top = rng.range(400.0, 1500.0);
        let n_samples = 200 + (rng.next_u64() % 300) as usize;
        for step in 0..n_samples {
            well_col.append_value(&well.name);
            depth_col.append_value(top + step as f64 * 0.152);
            for (c, builder) in curve_cols.iter_mut().enumerate() {
                let (mean, spread) = CURVE_RANGES[c];
                if well.logged[c] && !rng.chance(0.15) {
                    builder.append_value(mean + spread * rng.range(-1.0, 1.0));
                } else {
                    builder.append_null();
                }
            }
            rows += 1;
        }
    }

    let mut fields = vec![
        Field::new("WELL", DataType::Utf8, false),
        Field::new("DEPTH_MD", DataType::Float64, false),
    ];
    fields.extend(CURVES.iter().map(|c| Field::new(*c, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> =
        vec![Arc::new(well_col.finish()), Arc::new(depth_col.finish())];
    columns.extend(curve_cols.iter_mut().map(|b| Arc::new(b.finish()) as ArrayRef));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating log parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing log batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(rows)
}
