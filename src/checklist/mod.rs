pub mod definition;
pub mod engine;
pub mod evaluator;
pub mod session;
pub mod telemetry;
