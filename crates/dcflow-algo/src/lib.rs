//! # dcflow-algo: DC power-flow solver
//!
//! Turns a [`dcflow_core::Network`] into bus angles and line flows. See
//! [`power_flow`] for the algorithm and [`DcPowerFlowSolver`] for the knobs.

pub mod power_flow;

pub use power_flow::{
    dc_power_flow, line_flows_from_angles, DcPowerFlowSolution, DcPowerFlowSolver, FlowSummary,
    LineFlow,
};
