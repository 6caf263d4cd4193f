//! Synthetic measurement files
//!
//! Produces `station;temperature\n` rows from a fixed list of weather stations
//! with plausible mean temperatures. Output is fully determined by
//! `(rows, stations, seed)`, so tests and benchmarks can regenerate identical
//! inputs.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::temperature::FixedPoint;

/// Base stations and their mean temperature in tenths
const STATIONS: &[(&str, i16)] = &[
    ("Abha", 180),
    ("Abidjan", 260),
    ("Accra", 264),
    ("Addis Ababa", 160),
    ("Adelaide", 173),
    ("Anchorage", 28),
    ("Bangkok", 286),
    ("Bulawayo", 189),
    ("Cairo", 214),
    ("Cape Town", 162),
    ("Dakar", 240),
    ("Dikson", -111),
    ("Dodoma", 227),
    ("Halifax", 75),
    ("Hamburg", 97),
    ("Harbin", 50),
    ("Helsinki", 59),
    ("Istanbul", 139),
    ("Jakarta", 267),
    ("Kabul", 121),
    ("Kuala Lumpur", 273),
    ("Lhasa", 76),
    ("Lima", 198),
    ("Moscow", 58),
    ("Nouakchott", 257),
    ("Nuuk", -26),
    ("Palembang", 273),
    ("Phoenix", 239),
    ("Reykjavík", 43),
    ("São Paulo", 199),
    ("St. John's", 50),
    ("Tokyo", 154),
    ("Ürümqi", 74),
    ("Vladivostok", 49),
    ("Yakutsk", -88),
    ("Zürich", 93),
];

/// Spread around each station's mean, in tenths
const SPREAD: i16 = 150;

/// Station name for index `idx`; indices past the base list get a numeric suffix
pub fn station_name(idx: usize) -> String {
    let (base, _) = STATIONS[idx % STATIONS.len()];
    match idx / STATIONS.len() {
        0 => base.to_string(),
        round => format!("{base} {round}"),
    }
}

fn station_mean(idx: usize) -> i16 {
    STATIONS[idx % STATIONS.len()].1
}

/// Write `rows` measurements over `stations` distinct stations.
pub fn write_measurements<W: Write>(
    out: W,
    rows: u64,
    stations: usize,
    seed: u64,
) -> io::Result<()> {
    let stations = stations.max(1);
    let names: Vec<String> = (0..stations).map(station_name).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = BufWriter::with_capacity(1 << 20, out);

    for _ in 0..rows {
        let idx = rng.gen_range(0..stations);
        let tenths = (station_mean(idx) + rng.gen_range(-SPREAD..=SPREAD))
            .clamp(FixedPoint::MIN.tenths(), FixedPoint::MAX.tenths());
        writeln!(out, "{};{}", names[idx], FixedPoint::from_tenths(tenths))?;
    }
    out.flush()
}

/// Generate a measurement file at `path`.
pub fn generate_file(path: &Path, rows: u64, stations: usize, seed: u64) -> io::Result<()> {
    let file = File::create(path)?;
    write_measurements(file, rows, stations, seed)
}

/// Generate measurements into memory
pub fn generate_bytes(rows: u64, stations: usize, seed: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_measurements(&mut buf, rows, stations, seed);
    buf
}
