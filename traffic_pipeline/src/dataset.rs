//! CSV ingestion and the forward-fill stage.
//!
//! Cells are kept as `Option` so the two missing-value stages stay visible:
//! [`Dataset::forward_fill`] runs on the raw rows, mean imputation runs later
//! on the feature matrix (see [`crate::imputer`]).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::record::RawRecord;

/// Column names as they appear in the summary, in CSV order.
pub const COLUMNS: [&str; 8] = [
    "holiday",
    "temp",
    "rain_1h",
    "snow_1h",
    "weather",
    "date",
    "time",
    "traffic_volume",
];

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    holiday: usize,
    temp: usize,
    rain_1h: usize,
    snow_1h: usize,
    weather: usize,
    date: Option<usize>,
    time: Option<usize>,
    traffic_volume: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();

        let find = |names: &[&str]| names.iter().find_map(|n| map.get(*n).copied());
        let require = |names: &[&str], label: &'static str| {
            find(names).ok_or(PipelineError::MissingColumn(label))
        };

        Ok(Self {
            holiday: require(&["holiday"], "holiday")?,
            temp: require(&["temp", "temperature"], "temp")?,
            rain_1h: require(&["rain_1h"], "rain_1h")?,
            snow_1h: require(&["snow_1h"], "snow_1h")?,
            weather: require(&["weather", "weather_main"], "weather")?,
            date: find(&["date"]),
            time: find(&["time"]),
            traffic_volume: require(&["traffic_volume"], "traffic_volume")?,
        })
    }
}

fn text_cell(record: &StringRecord, idx: usize) -> Option<String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number_cell(
    record: &StringRecord,
    idx: usize,
    line: usize,
    column: &'static str,
) -> Result<Option<f64>> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<f64>()
            .map(|v| if v.is_nan() { None } else { Some(v) })
            .map_err(|_| PipelineError::InvalidNumber {
                line,
                column,
                value: raw.to_string(),
            }),
    }
}

/// Rows of the historical dataset, in file order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<RawRecord>,
}

impl Dataset {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        let ds = Self::from_reader(file)?;
        info!(path = %path.display(), rows = ds.len(), "dataset loaded");
        Ok(ds)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let cols = ColumnIndex::from_headers(reader.headers()?)?;

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            // header is line 1
            let line = idx + 2;
            let record = result?;
            rows.push(RawRecord {
                holiday: text_cell(&record, cols.holiday),
                temp: number_cell(&record, cols.temp, line, "temp")?,
                rain_1h: number_cell(&record, cols.rain_1h, line, "rain_1h")?,
                snow_1h: number_cell(&record, cols.snow_1h, line, "snow_1h")?,
                weather: text_cell(&record, cols.weather),
                date: cols.date.and_then(|i| text_cell(&record, i)),
                time: cols.time.and_then(|i| text_cell(&record, i)),
                traffic_volume: number_cell(&record, cols.traffic_volume, line, "traffic_volume")?,
            });
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stage 1 of missing-value handling: each empty cell takes the value of
    /// the same column in the previous row. Leading empty cells stay empty.
    pub fn forward_fill(&mut self) {
        fn fill<T: Clone>(slot: &mut Option<T>, last: &mut Option<T>) {
            match slot {
                Some(v) => *last = Some(v.clone()),
                None => *slot = last.clone(),
            }
        }

        let mut last = RawRecord::default();
        let mut filled = 0usize;
        for row in &mut self.rows {
            let before = missing_in_row(row);
            fill(&mut row.holiday, &mut last.holiday);
            fill(&mut row.temp, &mut last.temp);
            fill(&mut row.rain_1h, &mut last.rain_1h);
            fill(&mut row.snow_1h, &mut last.snow_1h);
            fill(&mut row.weather, &mut last.weather);
            fill(&mut row.date, &mut last.date);
            fill(&mut row.time, &mut last.time);
            fill(&mut row.traffic_volume, &mut last.traffic_volume);
            filled += before - missing_in_row(row);
        }
        debug!(filled, "forward fill done");
    }

    /// Number of empty cells per column, in [`COLUMNS`] order.
    pub fn missing_counts(&self) -> [(&'static str, usize); 8] {
        let mut counts = COLUMNS.map(|c| (c, 0usize));
        for row in &self.rows {
            let flags = [
                row.holiday.is_none(),
                row.temp.is_none(),
                row.rain_1h.is_none(),
                row.snow_1h.is_none(),
                row.weather.is_none(),
                row.date.is_none(),
                row.time.is_none(),
                row.traffic_volume.is_none(),
            ];
            for (slot, missing) in counts.iter_mut().zip(flags) {
                slot.1 += missing as usize;
            }
        }
        counts
    }
}

fn missing_in_row(row: &RawRecord) -> usize {
    [
        row.holiday.is_none(),
        row.temp.is_none(),
        row.rain_1h.is_none(),
        row.snow_1h.is_none(),
        row.weather.is_none(),
        row.date.is_none(),
        row.time.is_none(),
        row.traffic_volume.is_none(),
    ]
    .into_iter()
    .filter(|m| *m)
    .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
holiday,temp,rain_1h,snow_1h,weather,date,Time,traffic_volume
None,,0.0,0.0,Clouds,02-10-2012,09:00:00,5545
,289.36,,0.0,,02-10-2012,10:00:00,4516
Columbus Day,290.1,0.5,0.0,Rain,02-10-2012,11:00:00,
";

    #[test]
    fn parses_headers_case_insensitively() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.rows[0].time.as_deref(), Some("09:00:00"));
        assert_eq!(ds.rows[0].temp, None);
        assert_eq!(ds.rows[1].holiday, None);
        assert_eq!(ds.rows[2].traffic_volume, None);
    }

    #[test]
    fn forward_fill_uses_previous_row() {
        let mut ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        ds.forward_fill();
        // leading cell has nothing to copy from
        assert_eq!(ds.rows[0].temp, None);
        assert_eq!(ds.rows[1].holiday.as_deref(), Some("None"));
        assert_eq!(ds.rows[1].rain_1h, Some(0.0));
        assert_eq!(ds.rows[1].weather.as_deref(), Some("Clouds"));
        assert_eq!(ds.rows[2].traffic_volume, Some(4516.0));
    }

    #[test]
    fn missing_counts_before_fill() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let counts = ds.missing_counts();
        assert_eq!(counts[0], ("holiday", 1));
        assert_eq!(counts[1], ("temp", 1));
        assert_eq!(counts[7], ("traffic_volume", 1));
    }

    #[test]
    fn rejects_non_numeric_cell() {
        let csv = "holiday,temp,rain_1h,snow_1h,weather,traffic_volume\nNone,warm,0,0,Clear,10\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidNumber { line: 2, column: "temp", .. }
        ));
    }

    #[test]
    fn reports_missing_column() {
        let csv = "holiday,temp,rain_1h,weather,traffic_volume\nNone,280,0,Clear,10\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn("snow_1h")));
    }
}
