pub mod tracker;

pub use tracker::{AddOutcome, ExportFormat, TrackerApp};
