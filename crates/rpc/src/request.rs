//! Typed prediction request

use choco_model::OrderFeatures;
use serde::Deserialize;

use crate::errors::ServiceError;

/// Body of `POST /predict`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub sales_person: String,
    pub country: String,
    pub product: String,
    pub boxes: BoxCount,
}

/// Boxes shipped, sent either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BoxCount {
    Number(f64),
    Text(String),
}

impl BoxCount {
    pub fn value(&self) -> Result<f64, ServiceError> {
        let value = match self {
            BoxCount::Number(value) => *value,
            BoxCount::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                ServiceError::MalformedRequest(format!("boxes is not a number: {text:?}"))
            })?,
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(ServiceError::MalformedRequest(
                "boxes must be finite".to_string(),
            ))
        }
    }
}

impl PredictRequest {
    /// Decode the typed request from the raw payload
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, ServiceError> {
        serde_json::from_value(payload.clone())
            .map_err(|err| ServiceError::MalformedRequest(err.to_string()))
    }

    pub fn into_order(self) -> Result<OrderFeatures, ServiceError> {
        let boxes = self.boxes.value()?;
        Ok(OrderFeatures {
            sales_person: self.sales_person,
            country: self.country,
            product: self.product,
            boxes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_boxes_number_or_string() {
        let numeric = PredictRequest::from_payload(&json!({
            "sales_person": "A", "country": "UK", "product": "P", "boxes": 50
        }))
        .unwrap();
        assert_eq!(numeric.into_order().unwrap().boxes, 50.0);

        let text = PredictRequest::from_payload(&json!({
            "sales_person": "A", "country": "UK", "product": "P", "boxes": " 12.5 "
        }))
        .unwrap();
        assert_eq!(text.into_order().unwrap().boxes, 12.5);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let err = PredictRequest::from_payload(&json!({
            "sales_person": "A", "country": "UK", "product": "P"
        }))
        .unwrap_err();
        assert!(matches!(err, ServiceError::MalformedRequest(_)));
        assert!(err.to_string().contains("boxes"));
    }

    #[test]
    fn test_non_numeric_boxes_is_malformed() {
        let request = PredictRequest::from_payload(&json!({
            "sales_person": "A", "country": "UK", "product": "P", "boxes": "many"
        }))
        .unwrap();
        assert!(matches!(
            request.into_order(),
            Err(ServiceError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let err = PredictRequest::from_payload(&json!({
            "sales_person": 7, "country": "UK", "product": "P", "boxes": 1
        }))
        .unwrap_err();
        assert!(matches!(err, ServiceError::MalformedRequest(_)));
    }
}
