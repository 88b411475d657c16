//! Textual dataset summary for the exploration command.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::dataset::{Dataset, COLUMNS};
use crate::record::{RawRecord, MISSING_CATEGORY};

const HEAD_ROWS: usize = 5;

/// Numeric columns, in the order used by the correlation table.
pub const NUMERIC_COLUMNS: [&str; 4] = ["temp", "rain_1h", "snow_1h", "traffic_volume"];

fn numeric(r: &RawRecord) -> [Option<f64>; 4] {
    [r.temp, r.rain_1h, r.snow_1h, r.traffic_volume]
}

/// Descriptive statistics of one numeric column, ignoring missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: &'static str,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    fn compute(name: &'static str, values: impl Iterator<Item = Option<f64>>) -> Self {
        let mut v: Vec<f64> = values.flatten().collect();
        v.sort_by(f64::total_cmp);
        let count = v.len();
        if count == 0 {
            return Self {
                name,
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }
        let mean = v.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            (v.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        Self {
            name,
            count,
            mean,
            std,
            min: v[0],
            q25: quantile(&v, 0.25),
            median: quantile(&v, 0.5),
            q75: quantile(&v, 0.75),
            max: v[count - 1],
        }
    }
}

/// Pearson correlation over the pairs where both sides are present. `NaN`
/// for fewer than two pairs or a constant side.
fn pearson(pairs: &[(f64, f64)]) -> f64 {
    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Linear interpolation between closest ranks of sorted `v`.
fn quantile(v: &[f64], q: f64) -> f64 {
    let pos = q * (v.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    v[lo] + (v[hi] - v[lo]) * (pos - lo as f64)
}

#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub n_rows: usize,
    pub n_columns: usize,
    pub head: Vec<RawRecord>,
    pub stats: Vec<ColumnStats>,
    pub missing: Vec<(&'static str, usize)>,
    /// Weather categories after forward fill, most frequent first.
    pub weather_counts: Vec<(String, usize)>,
    /// Pairwise correlation of [`NUMERIC_COLUMNS`] after forward fill.
    pub correlation: [[f64; 4]; 4],
    /// Traffic volume statistics per weather category, in `weather_counts` order.
    pub traffic_by_weather: Vec<(String, ColumnStats)>,
}

impl DatasetSummary {
    /// Summarize `raw` as loaded; missing counts are taken before any fill.
    pub fn compute(raw: &Dataset) -> Self {
        let rows = &raw.rows;
        let stats = vec![
            ColumnStats::compute("temp", rows.iter().map(|r| r.temp)),
            ColumnStats::compute("rain_1h", rows.iter().map(|r| r.rain_1h)),
            ColumnStats::compute("snow_1h", rows.iter().map(|r| r.snow_1h)),
            ColumnStats::compute("traffic_volume", rows.iter().map(|r| r.traffic_volume)),
        ];

        let mut filled = raw.clone();
        filled.forward_fill();
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for r in &filled.rows {
            let w = r.weather.as_deref().unwrap_or(MISSING_CATEGORY);
            let c = counts.entry(w.to_string()).or_insert_with(|| {
                order.push(w.to_string());
                0
            });
            *c += 1;
        }
        let mut weather_counts: Vec<(String, usize)> = order
            .into_iter()
            .map(|w| {
                let c = counts[&w];
                (w, c)
            })
            .collect();
        // stable: ties keep first-seen order
        weather_counts.sort_by(|a, b| b.1.cmp(&a.1));

        let values: Vec<[Option<f64>; 4]> = filled.rows.iter().map(numeric).collect();
        let mut correlation = [[f64::NAN; 4]; 4];
        for (i, row) in correlation.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                let pairs: Vec<(f64, f64)> = values
                    .iter()
                    .filter_map(|v| Some((v[i]?, v[j]?)))
                    .collect();
                *cell = pearson(&pairs);
            }
        }

        let traffic_by_weather = weather_counts
            .iter()
            .map(|(w, _)| {
                let volumes = filled
                    .rows
                    .iter()
                    .filter(|r| r.weather.as_deref().unwrap_or(MISSING_CATEGORY) == w)
                    .map(|r| r.traffic_volume);
                (w.clone(), ColumnStats::compute("traffic_volume", volumes))
            })
            .collect();

        Self {
            n_rows: rows.len(),
            n_columns: COLUMNS.len(),
            head: rows.iter().take(HEAD_ROWS).cloned().collect(),
            stats,
            missing: raw.missing_counts().to_vec(),
            weather_counts,
            correlation,
            traffic_by_weather,
        }
    }

    pub fn render(&self) -> String {
        fn cell<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(T::to_string).unwrap_or_else(|| "NaN".into())
        }

        let mut out = String::new();
        let _ = writeln!(out, "Dataset Shape: ({}, {})\n", self.n_rows, self.n_columns);

        let _ = writeln!(out, "First {} Rows:", self.head.len());
        let _ = writeln!(out, "{}", COLUMNS.join("\t"));
        for r in &self.head {
            let cells = [
                cell(&r.holiday),
                cell(&r.temp),
                cell(&r.rain_1h),
                cell(&r.snow_1h),
                cell(&r.weather),
                cell(&r.date),
                cell(&r.time),
                cell(&r.traffic_volume),
            ];
            let _ = writeln!(out, "{}", cells.join("\t"));
        }

        let _ = writeln!(out, "\nDataset Summary:");
        stats_table(&mut out, self.stats.iter().map(|s| (s.name, s)));

        let _ = writeln!(out, "\nMissing Values:");
        for (name, n) in &self.missing {
            let _ = writeln!(out, "{name:<16}{n:>10}");
        }

        let _ = writeln!(out, "\nWeather Conditions:");
        for (w, n) in &self.weather_counts {
            let _ = writeln!(out, "{w:<16}{n:>10}");
        }

        let _ = writeln!(out, "\nCorrelation Matrix:");
        let _ = write!(out, "{:<16}", "");
        for name in NUMERIC_COLUMNS {
            let _ = write!(out, "{name:>16}");
        }
        out.push('\n');
        for (name, row) in NUMERIC_COLUMNS.iter().zip(&self.correlation) {
            let _ = write!(out, "{name:<16}");
            for r in row {
                let _ = write!(out, "{r:>16.3}");
            }
            out.push('\n');
        }

        let _ = writeln!(out, "\nTraffic Volume by Weather:");
        stats_table(
            &mut out,
            self.traffic_by_weather.iter().map(|(w, s)| (w.as_str(), s)),
        );
        out
    }
}

fn stats_table<'a>(out: &mut String, rows: impl Iterator<Item = (&'a str, &'a ColumnStats)>) {
    let _ = writeln!(
        out,
        "{:<16}{:>10}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}{:>12}",
        "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for (label, s) in rows {
        let _ = writeln!(
            out,
            "{:<16}{:>10}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}{:>12.3}",
            label, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
holiday,temp,rain_1h,snow_1h,weather,date,time,traffic_volume
None,280,0,0,Clouds,d,t,100
None,290,,0,Clear,d,t,200
None,,0,0,,d,t,300
None,300,0,0,Clear,d,t,400
None,310,0,0,Rain,d,t,
None,320,0,0,Clouds,d,t,600
";

    #[test]
    fn describes_numeric_columns() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let s = DatasetSummary::compute(&ds);
        assert_eq!((s.n_rows, s.n_columns), (6, 8));
        assert_eq!(s.head.len(), 5);

        let temp = &s.stats[0];
        assert_eq!(temp.count, 5);
        assert_eq!(temp.mean, 300.0);
        assert_eq!(temp.min, 280.0);
        assert_eq!(temp.median, 300.0);
        assert_eq!(temp.q25, 290.0);
        assert!((temp.std - 250f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn missing_counted_before_fill_weather_after() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let s = DatasetSummary::compute(&ds);
        assert!(s.missing.contains(&("temp", 1)));
        assert!(s.missing.contains(&("traffic_volume", 1)));
        // the empty weather cell inherits "Clear"
        assert_eq!(s.weather_counts[0], ("Clear".to_string(), 3));
        assert_eq!(s.weather_counts[1], ("Clouds".to_string(), 2));

        let text = s.render();
        assert!(text.starts_with("Dataset Shape: (6, 8)"));
        assert!(text.contains("Missing Values:"));
    }

    #[test]
    fn correlation_after_fill() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let s = DatasetSummary::compute(&ds);
        let temp_volume = s.correlation[0][3];
        assert!((s.correlation[0][0] - 1.0).abs() < 1e-12);
        assert_eq!(temp_volume, s.correlation[3][0]);
        assert!(temp_volume > 0.9, "{temp_volume}");
        // snow_1h never varies
        assert!(s.correlation[2][3].is_nan());

        let text = s.render();
        assert!(text.contains("Correlation Matrix:"));
        assert!(text.contains("Traffic Volume by Weather:"));
    }

    #[test]
    fn traffic_grouped_by_weather() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let s = DatasetSummary::compute(&ds);
        let labels: Vec<&str> = s.traffic_by_weather.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(labels, ["Clear", "Clouds", "Rain"]);

        // Clear rows carry 200, 300 and 400
        let clear = &s.traffic_by_weather[0].1;
        assert_eq!(clear.count, 3);
        assert_eq!(clear.mean, 300.0);
        assert_eq!((clear.min, clear.max), (200.0, 400.0));

        // the Rain row's empty target inherits 400
        let rain = &s.traffic_by_weather[2].1;
        assert_eq!((rain.count, rain.mean), (1, 400.0));
    }

    #[test]
    fn pearson_edge_cases() {
        assert!((pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]) - 1.0).abs() < 1e-12);
        assert!((pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]) + 1.0).abs() < 1e-12);
        assert!(pearson(&[(1.0, 1.0)]).is_nan());
    }

    #[test]
    fn quantile_interpolates() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
    }
}
