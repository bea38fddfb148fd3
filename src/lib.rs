//! Binary Support Vector Machine trained with simplified SMO
//!
//! Pairwise coordinate ascent on the SVM dual, following the simplified
//! Sequential Minimal Optimization procedure popularized by Stanford CS229:
//! random second-index selection, box-clipped closed-form updates and the
//! classic bias tie-break.

pub mod api;
pub mod core;
pub mod data;
pub mod kernel;
pub mod model;
pub mod solver;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, SVM};
pub use crate::core::error::{InputError, Result, SVMError};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::DataFormat;
pub use crate::kernel::{Kernel, LinearKernel};
pub use crate::model::TrainedSVM;
pub use crate::solver::{SMOSolver, SweepProgress};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
