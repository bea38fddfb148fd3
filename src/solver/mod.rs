//! SVM solver implementations
//!
//! The simplified Sequential Minimal Optimization (SMO) algorithm together
//! with the pieces it is built from: the margin (decision function) used for
//! error estimates and the random partner selection.

pub mod margin;
pub mod selection;
pub mod smo;

pub use self::margin::*;
pub use self::selection::*;
pub use self::smo::*;
