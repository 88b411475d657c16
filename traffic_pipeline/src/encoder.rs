use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Code used for categories that were not seen while fitting.
pub const UNSEEN_CODE: f64 = -1.0;

/// Maps category strings to integer codes in first-seen order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "EncoderRepr", into = "EncoderRepr")]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct EncoderRepr {
    classes: Vec<String>,
}

impl From<EncoderRepr> for LabelEncoder {
    fn from(repr: EncoderRepr) -> Self {
        Self::from_classes(repr.classes)
    }
}

impl From<LabelEncoder> for EncoderRepr {
    fn from(enc: LabelEncoder) -> Self {
        Self {
            classes: enc.classes,
        }
    }
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut enc = Self::default();
        for v in values {
            if !enc.index.contains_key(v) {
                enc.index.insert(v.to_string(), enc.classes.len());
                enc.classes.push(v.to_string());
            }
        }
        enc
    }

    fn from_classes(classes: Vec<String>) -> Self {
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { classes, index }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    pub fn transform(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Code as a feature value, or [`UNSEEN_CODE`] for unknown categories.
    pub fn encode_or_sentinel(&self, value: &str) -> f64 {
        self.transform(value)
            .map(|c| c as f64)
            .unwrap_or(UNSEEN_CODE)
    }
}
