//! Dense linear-system backends for the reduced DC power-flow system.
//!
//! The power-flow solver never cares how `B_reduced · θ = P` is solved, only
//! that a singular system comes back as [`DcFlowError::SingularSystem`](crate::DcFlowError)
//! instead of garbage angles. [`SolverKind`] picks a backend by name.

pub mod backend;
pub mod registry;

pub use backend::{FaerSolver, GaussSolver, LinearSystemBackend};
pub use registry::SolverKind;
