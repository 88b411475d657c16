use serde::Deserialize;

/// Raw form submission. Fields stay strings so that a bad number becomes an
/// error line on the page instead of a rejected request.
#[derive(Deserialize, Debug, Default)]
pub struct PredictForm {
    pub holiday: Option<String>,
    pub temp: Option<String>,
    pub rain: Option<String>,
    pub snow: Option<String>,
    pub weather: Option<String>,
}

/// What the index page shows besides the form itself.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageView {
    pub prediction_text: Option<String>,
    pub error_text: Option<String>,
    /// Set when a category was replaced by the sentinel code.
    pub notice_text: Option<String>,
}
