pub mod engine;
pub mod processing;
