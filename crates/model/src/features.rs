//! Feature layout shared by training and serving

use serde::{Deserialize, Serialize};

use crate::encoder::EncoderSet;
use crate::errors::Result;

/// Number of model inputs: three category codes plus boxes shipped
pub const FEATURE_COUNT: usize = 4;

/// Feature names in model input order, as they appear in the training CSV
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["Sales Person", "Country", "Product", "Boxes Shipped"];

/// Categorical columns, each with its own label encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalColumn {
    SalesPerson,
    Country,
    Product,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 3] = [
        CategoricalColumn::SalesPerson,
        CategoricalColumn::Country,
        CategoricalColumn::Product,
    ];

    /// Column header, also the encoder key in the persisted encoder set
    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::SalesPerson => "Sales Person",
            CategoricalColumn::Country => "Country",
            CategoricalColumn::Product => "Product",
        }
    }

    /// Position in the feature vector
    pub fn index(self) -> usize {
        match self {
            CategoricalColumn::SalesPerson => 0,
            CategoricalColumn::Country => 1,
            CategoricalColumn::Product => 2,
        }
    }
}

/// One order description before encoding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderFeatures {
    pub sales_person: String,
    pub country: String,
    pub product: String,
    pub boxes: f64,
}

impl OrderFeatures {
    pub fn category(&self, column: CategoricalColumn) -> &str {
        match column {
            CategoricalColumn::SalesPerson => &self.sales_person,
            CategoricalColumn::Country => &self.country,
            CategoricalColumn::Product => &self.product,
        }
    }
}

/// Fixed-order numeric input for the regression model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Encoded order plus the columns that needed the unseen-category fallback
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedOrder {
    pub features: FeatureVector,
    pub fallbacks: Vec<CategoricalColumn>,
}

impl EncoderSet {
    /// Encode an order with the persisted encoders.
    ///
    /// Unseen categories are replaced by the encoder's first known class
    /// and reported in [`EncodedOrder::fallbacks`]; they never fail.
    pub fn encode(&self, order: &OrderFeatures) -> Result<EncodedOrder> {
        let mut values = [0.0; FEATURE_COUNT];
        let mut fallbacks = Vec::new();

        for column in CategoricalColumn::ALL {
            let encoded = self.get(column)?.encode_or_fallback(order.category(column));
            if encoded.fallback {
                fallbacks.push(column);
            }
            values[column.index()] = encoded.code as f64;
        }
        values[FEATURE_COUNT - 1] = order.boxes;

        Ok(EncodedOrder {
            features: FeatureVector(values),
            fallbacks,
        })
    }
}
