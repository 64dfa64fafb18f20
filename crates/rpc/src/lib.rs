//! Chocolate sales prediction API
//!
//! `POST /predict` encodes an order with the persisted encoders, evaluates
//! the linear model and logs the request; `GET /history` returns the latest
//! logged predictions.

pub mod context;
pub mod errors;
pub mod request;
pub mod server;

pub use context::{AppContext, Prediction};
pub use errors::ServiceError;
pub use request::{BoxCount, PredictRequest};
pub use server::{build_router, start_server, PredictResponse};
