//! Command Handlers 实现

mod prediction_handlers;

pub use prediction_handlers::PredictionSession;
