//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use campus_tally::reading::ReadingStore;

/// Library building sample readings (4 rows, 65 kWh).
pub const LIBRARY_CSV: &str = "timestamp,kwh,building
2024-01-01 10:00,12,Library
2024-01-01 14:00,15,Library
2024-01-02 11:00,18,Library
2024-01-03 13:00,20,Library
";

/// Admin building sample readings (4 rows, 105 kWh).
pub const ADMIN_CSV: &str = "timestamp,kwh,building
2024-01-01 09:00,25,Admin
2024-01-02 10:00,30,Admin
2024-01-03 11:00,22,Admin
2024-01-03 15:00,28,Admin
";

/// Ten-day single-station weather sample with gaps.
pub const WEATHER_CSV: &str = "Date,Temperature,Rainfall,Humidity
2024-01-01,26,0,70
2024-01-02,27,5,72
2024-01-03,,2,68
2024-01-04,29,,75
2024-01-05,30,10,
2024-02-01,31,0,80
2024-02-02,32,0,82
2024-02-03,33,,78
2024-02-04,,4,77
2024-02-05,34,1,79
";

/// The three-reading scenario: Library 12 + 18, Admin 25.
pub fn scenario_store() -> ReadingStore {
    let mut store = ReadingStore::new();
    for (entity, ts, value) in [
        ("Library", "2024-01-01", "12"),
        ("Library", "2024-01-02", "18"),
        ("Admin", "2024-01-01", "25"),
    ] {
        store
            .add(entity, ts, value)
            .expect("scenario reading should parse");
    }
    store
}

/// Writes the two campus building files into `dir`.
pub fn write_campus_csvs(dir: &Path) {
    fs::write(dir.join("library.csv"), LIBRARY_CSV).expect("write library.csv");
    fs::write(dir.join("admin.csv"), ADMIN_CSV).expect("write admin.csv");
}

/// Writes the weather sample into `dir` as `weather.csv`.
pub fn write_weather_csv(dir: &Path) {
    fs::write(dir.join("weather.csv"), WEATHER_CSV).expect("write weather.csv");
}
