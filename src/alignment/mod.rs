pub mod diff;
pub mod metrics;
pub mod operations;
pub mod range;
pub mod report;
pub mod tokenization;
