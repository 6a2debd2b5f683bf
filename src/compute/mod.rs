// =============================================================================
// Computation Module
// =============================================================================
//
// Pure, side-effect-free numeric layer of the pipeline.  Every public function
// returns `Option<f64>` (or `Status::Unknown`) so callers are forced to handle
// insufficient-data and numerical-edge-case scenarios.  Nothing in here does
// I/O; the orchestrator feeds it fetched series and publishes what comes back.

pub mod links;
pub mod stats;
pub mod status;

pub use links::compute_all;
