//! Run planning and execution

mod executor;
mod planner;

pub use executor::RunExecutor;
pub use planner::plan;
