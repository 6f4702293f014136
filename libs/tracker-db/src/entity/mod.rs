pub mod mcap_observation;
pub mod processed_token;

// Re-exports for convenience
pub use mcap_observation::McapObservation;
pub use processed_token::ProcessedToken;
