//! DC power flow
//!
//! - [`susceptance`]: B′ assembly and slack reduction
//! - [`dc`]: the solver, its solution type, and flow recovery from angles
//!
//! ## Sign convention
//!
//! Injections are generation minus load. A positive line flow runs from the
//! line's `from_bus` to its `to_bus`; swapping the endpoints flips the sign.

pub mod dc;
pub mod susceptance;

pub use dc::{
    dc_power_flow, line_flows_from_angles, DcPowerFlowSolution, DcPowerFlowSolver, FlowSummary,
    LineFlow, MISMATCH_WARN_THRESHOLD,
};
pub use susceptance::{build_bus_susceptance, reduce_for_slack, ReducedSystem};
