pub mod attributes;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod model;
pub mod prediction;
pub mod recommendation;
pub mod threshold_validation;
pub mod types;
pub mod variance;
pub mod variant;
