/// Holiday choices offered by the form. "None" is a regular category.
pub const HOLIDAYS: [&str; 12] = [
    "None",
    "Columbus Day",
    "Veterans Day",
    "Thanksgiving Day",
    "Christmas Day",
    "New Years Day",
    "Washingtons Birthday",
    "Memorial Day",
    "Independence Day",
    "State Fair",
    "Labor Day",
    "Martin Luther King Jr Day",
];

pub const WEATHER: [&str; 11] = [
    "Clouds",
    "Clear",
    "Rain",
    "Drizzle",
    "Mist",
    "Haze",
    "Fog",
    "Thunderstorm",
    "Snow",
    "Squall",
    "Smoke",
];

/// Column order of the feature matrix. Training and serving must agree on it.
pub const FEATURE_ORDER: [&str; N_FEATURES] = ["holiday", "temp", "rain_1h", "snow_1h", "weather"];
pub const N_FEATURES: usize = 5;

pub(crate) const HOLIDAY_IDX: usize = 0;
pub(crate) const TEMP_IDX: usize = 1;
pub(crate) const RAIN_IDX: usize = 2;
pub(crate) const SNOW_IDX: usize = 3;
pub(crate) const WEATHER_IDX: usize = 4;

/// Category assigned to cells that are still empty after forward fill.
pub const MISSING_CATEGORY: &str = "Unknown";

/// One CSV row. `None` marks an empty cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub holiday: Option<String>,
    pub temp: Option<f64>,
    pub rain_1h: Option<f64>,
    pub snow_1h: Option<f64>,
    pub weather: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub traffic_volume: Option<f64>,
}

/// A single record submitted for prediction, already parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    pub holiday: String,
    pub temp: f64,
    pub rain_1h: f64,
    pub snow_1h: f64,
    pub weather: String,
}
