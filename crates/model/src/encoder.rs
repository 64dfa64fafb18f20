//! Label encoding for categorical order attributes
//!
//! A [`LabelEncoder`] maps the distinct strings seen while training to dense
//! codes `0..k-1`, assigned in sorted order. The codes are part of the model
//! contract: coefficients fitted on one encoding are meaningless under another,
//! so encoders are persisted next to the model and never refitted at serving time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{ModelError, Result};
use crate::features::CategoricalColumn;

/// Bidirectional mapping between category strings and integer codes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

/// Outcome of encoding one categorical value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoded {
    pub code: usize,
    /// True when the value was unseen and the fallback class was substituted
    pub fallback: bool,
}

impl LabelEncoder {
    /// Fit an encoder over the observed values. Classes are de-duplicated
    /// and sorted, so the code of a class is its sorted position.
    pub fn fit<I, S>(column: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(ModelError::InvalidEncoder {
                column: column.to_string(),
                reason: "no values to fit".to_string(),
            });
        }

        Ok(Self {
            classes: classes.into_iter().collect(),
        })
    }

    /// Known classes in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code for a known class, `None` if the value was never seen in training
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    /// Class string for a code
    pub fn inverse_transform(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// The class substituted for unseen values: the first known class.
    pub fn fallback_class(&self) -> &str {
        // validate() guarantees at least one class
        self.classes.first().map(String::as_str).unwrap_or_default()
    }

    /// Encode a value, substituting the fallback class when it is unknown.
    ///
    /// This is a lossy-but-available policy: the prediction still happens,
    /// but with the first known class standing in for the unseen one.
    pub fn encode_or_fallback(&self, value: &str) -> Encoded {
        match self.transform(value) {
            Some(code) => Encoded {
                code,
                fallback: false,
            },
            None => Encoded {
                code: self.transform(self.fallback_class()).unwrap_or(0),
                fallback: true,
            },
        }
    }

    /// Check the invariants a persisted encoder must hold
    pub fn validate(&self, column: &str) -> Result<()> {
        let invalid = |reason: &str| ModelError::InvalidEncoder {
            column: column.to_string(),
            reason: reason.to_string(),
        };

        if self.classes.is_empty() {
            return Err(invalid("class list is empty"));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(invalid("classes are not strictly sorted"));
        }
        Ok(())
    }
}

/// One fitted encoder per categorical column, keyed by column name
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderSet {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: CategoricalColumn, encoder: LabelEncoder) {
        self.encoders.insert(column.name().to_string(), encoder);
    }

    pub fn get(&self, column: CategoricalColumn) -> Result<&LabelEncoder> {
        self.encoders
            .get(column.name())
            .ok_or_else(|| ModelError::MissingEncoder(column.name().to_string()))
    }

    /// Iterate `(column name, encoder)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelEncoder)> {
        self.encoders
            .iter()
            .map(|(name, encoder)| (name.as_str(), encoder))
    }

    /// Every categorical column must be present and every encoder valid
    pub fn validate(&self) -> Result<()> {
        for column in CategoricalColumn::ALL {
            self.get(column)?.validate(column.name())?;
        }
        Ok(())
    }
}
