//! # dcflow-core: network model for DC power flow
//!
//! Provides the data structures shared by the solver and the CLI.
//!
//! ## Design
//!
//! A [`Network`] is an **undirected multigraph** where:
//! - **Nodes** are [`Bus`]es carrying a net real-power injection
//! - **Edges** are [`Line`]s carrying a series reactance
//!
//! Bus ids are handed out in insertion order and double as the row index of
//! the susceptance matrix, so angle vectors are always in bus-id order. Line
//! ids are handed out the same way and index the flow vector. Parallel lines
//! between the same pair of buses are allowed and accumulate in the matrix.
//!
//! One bus is the **slack**: its angle is pinned to zero and it absorbs
//! whatever the other injections leave over. Bus 0 is the slack unless
//! [`Network::with_slack`] says otherwise.
//!
//! ## Quick Start
//!
//! ```rust
//! use dcflow_core::*;
//!
//! let mut network = Network::new();
//! let b0 = network.add_bus("North", PerUnit(1.0));
//! let b1 = network.add_bus("South", PerUnit(-1.0));
//! network.add_line(b0, b1, ReactancePu(0.1)).unwrap();
//!
//! assert_eq!(network.slack(), b0);
//! assert!(!network.validate().has_errors());
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Validation issue collection
//! - [`graph_utils`] - Connectivity and island analysis
//! - [`solver`] - Dense linear-system backends
//! - [`units`] - Unit newtypes for power, reactance, and angles

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Graph, Undirected};
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod solver;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{DcFlowError, DcFlowResult};
pub use graph_utils::*;
pub use solver::*;
pub use units::{Degrees, Megawatts, PerUnit, Radians, ReactancePu, SusceptancePu};

/// Injection sums below this magnitude count as balanced.
pub const BALANCE_TOLERANCE: f64 = 1e-9;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for BusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bus {}", self.0)
    }
}

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    /// Net real-power injection (generation minus load) in per-unit
    pub injection: PerUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Series reactance (per-unit), strictly positive for a solvable network
    pub reactance: ReactancePu,
    /// Out-of-service lines contribute nothing to the susceptance matrix
    pub in_service: bool,
}

impl Line {
    #[inline]
    pub fn susceptance(&self) -> SusceptancePu {
        self.reactance.to_susceptance()
    }

    pub fn is_self_loop(&self) -> bool {
        self.from_bus == self.to_bus
    }
}

/// Buses and lines of one DC power-flow case plus the slack designation.
#[derive(Debug, Clone)]
pub struct Network {
    pub graph: Graph<Bus, Line, Undirected>,
    slack: BusId,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            slack: BusId(0),
        }
    }

    /// Designate the slack bus. Checked by [`Network::validate`], not here,
    /// so the slack can be chosen before its bus is added.
    pub fn with_slack(mut self, slack: BusId) -> Self {
        self.slack = slack;
        self
    }

    pub fn set_slack(&mut self, slack: BusId) {
        self.slack = slack;
    }

    pub fn slack(&self) -> BusId {
        self.slack
    }

    /// Append a bus; its id is its position in insertion order.
    pub fn add_bus(&mut self, name: impl Into<String>, injection: PerUnit) -> BusId {
        let id = BusId(self.graph.node_count());
        let idx = self.graph.add_node(Bus {
            id,
            name: name.into(),
            injection,
        });
        debug_assert_eq!(idx.index(), id.value());
        id
    }

    /// Connect two existing buses. Reactance is not checked here; a bad value
    /// surfaces in [`Network::validate`] alongside every other issue.
    pub fn add_line(
        &mut self,
        from_bus: BusId,
        to_bus: BusId,
        reactance: ReactancePu,
    ) -> DcFlowResult<LineId> {
        for bus in [from_bus, to_bus] {
            if self.bus(bus).is_none() {
                return Err(DcFlowError::InvalidNetwork(format!(
                    "line {}-{} references unknown {} ({} buses defined)",
                    from_bus.value(),
                    to_bus.value(),
                    bus,
                    self.bus_count()
                )));
            }
        }
        let id = LineId(self.graph.edge_count());
        self.graph.add_edge(
            NodeIndex::new(from_bus.value()),
            NodeIndex::new(to_bus.value()),
            Line {
                id,
                name: format!("Line {}-{}", from_bus.value(), to_bus.value()),
                from_bus,
                to_bus,
                reactance,
                in_service: true,
            },
        );
        Ok(id)
    }

    pub fn set_line_in_service(&mut self, line: LineId, in_service: bool) -> DcFlowResult<()> {
        self.line_mut(line)?.in_service = in_service;
        Ok(())
    }

    /// Swap a line's endpoints. Flow on it is reported with the opposite sign.
    pub fn reverse_line(&mut self, line: LineId) -> DcFlowResult<()> {
        let line = self.line_mut(line)?;
        std::mem::swap(&mut line.from_bus, &mut line.to_bus);
        line.name = format!("Line {}-{}", line.from_bus.value(), line.to_bus.value());
        Ok(())
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.graph.node_weight(NodeIndex::new(id.value()))
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.graph.edge_weight(EdgeIndex::new(id.value()))
    }

    fn line_mut(&mut self, id: LineId) -> DcFlowResult<&mut Line> {
        self.graph
            .edge_weight_mut(EdgeIndex::new(id.value()))
            .ok_or_else(|| DcFlowError::InvalidNetwork(format!("unknown {}", id)))
    }

    /// Buses in id order
    pub fn buses(&self) -> impl Iterator<Item = &Bus> {
        self.graph.node_weights()
    }

    /// Lines in id order, in service or not
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.graph.edge_weights()
    }

    pub fn in_service_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines().filter(|line| line.in_service)
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn line_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Net injection vector in bus order
    pub fn injections(&self) -> Vec<PerUnit> {
        self.buses().map(|bus| bus.injection).collect()
    }

    /// Sum of all injections; the slack absorbs whatever this is away from zero.
    pub fn total_injection(&self) -> PerUnit {
        self.buses().map(|bus| bus.injection).sum()
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats {
            num_buses: self.bus_count(),
            num_lines: self.line_count(),
            ..NetworkStats::default()
        };
        for bus in self.buses() {
            if bus.injection.value() > 0.0 {
                stats.total_generation += bus.injection;
            } else {
                stats.total_load += -bus.injection;
            }
        }
        stats.in_service_lines = self.in_service_lines().count();
        stats
    }

    /// Check everything a DC power flow needs before it builds a matrix.
    ///
    /// Errors: fewer than two buses, unknown slack, non-finite injection,
    /// non-positive or non-finite reactance, a line that starts and ends at
    /// the same bus. Warnings: an injection vector that does not sum to zero,
    /// and buses with no in-service line.
    pub fn validate(&self) -> Diagnostics {
        let mut diag = Diagnostics::new();

        if self.bus_count() < 2 {
            diag.add_error(
                "topology",
                &format!(
                    "DC power flow needs at least 2 buses, found {}",
                    self.bus_count()
                ),
            );
        }
        if self.bus(self.slack).is_none() {
            diag.add_error(
                "reference",
                &format!(
                    "slack {} does not exist ({} buses defined)",
                    self.slack,
                    self.bus_count()
                ),
            );
        }

        for bus in self.buses() {
            if !bus.injection.is_finite() {
                diag.add_error_with_entity(
                    "parameter",
                    &format!("injection {} is not finite", bus.injection.value()),
                    &bus.id.to_string(),
                );
            }
        }

        for line in self.lines() {
            let entity = line.id.to_string();
            if !line.reactance.is_valid() {
                diag.add_error_with_entity(
                    "parameter",
                    &format!(
                        "reactance must be positive and finite, got {}",
                        line.reactance.value()
                    ),
                    &entity,
                );
            }
            if line.is_self_loop() {
                diag.add_error_with_entity(
                    "topology",
                    &format!("line starts and ends at {}", line.from_bus),
                    &entity,
                );
            }
        }

        let total = self.total_injection();
        if total.is_finite() && total.value().abs() > BALANCE_TOLERANCE {
            diag.add_warning(
                "balance",
                &format!(
                    "injections sum to {:.6} pu; the slack absorbs the mismatch",
                    total.value()
                ),
            );
        }

        for bus in self.buses() {
            let idx = NodeIndex::new(bus.id.value());
            let connected = self
                .graph
                .edges(idx)
                .any(|edge| edge.weight().in_service && !edge.weight().is_self_loop());
            if !connected && self.bus_count() > 1 {
                diag.add_warning_with_entity(
                    "topology",
                    "bus has no in-service line",
                    &bus.id.to_string(),
                );
            }
        }

        diag
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_lines: usize,
    pub in_service_lines: usize,
    /// Sum of positive injections
    pub total_generation: PerUnit,
    /// Sum of negative injections, reported positive
    pub total_load: PerUnit,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} lines ({} in service), generation {:.4} pu, load {:.4} pu",
            self.num_buses,
            self.num_lines,
            self.in_service_lines,
            self.total_generation.value(),
            self.total_load.value()
        )
    }
}
