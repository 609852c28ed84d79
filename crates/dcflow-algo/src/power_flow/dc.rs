use std::fmt;
use std::sync::Arc;

use dcflow_core::{
    graph_utils, BusId, DcFlowError, DcFlowResult, GaussSolver, LineId, LinearSystemBackend,
    Network, PerUnit, Radians,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::susceptance::{build_bus_susceptance, reduce_for_slack};

/// Non-slack buses whose outflow misses their injection by more than this get a warning.
pub const MISMATCH_WARN_THRESHOLD: f64 = 1e-6;

/// Real-power flow on one in-service line. Positive means `from_bus` → `to_bus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFlow {
    pub line: LineId,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub flow: PerUnit,
}

/// Result of one DC power flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcPowerFlowSolution {
    /// Backend that solved the reduced system
    pub solver: String,
    pub slack: BusId,
    /// One angle per bus in bus-id order; the slack entry is exactly zero
    pub angles: Vec<Radians>,
    /// Scheduled net injections the solve was run against, in bus-id order
    pub injections: Vec<PerUnit>,
    /// One entry per in-service line, in line-id order
    pub flows: Vec<LineFlow>,
}

/// Headline numbers for a solved case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    pub buses: usize,
    pub lines: usize,
    pub total_generation: PerUnit,
    pub total_load: PerUnit,
    pub slack_injection: PerUnit,
    pub min_flow: Option<PerUnit>,
    pub max_flow: Option<PerUnit>,
    pub max_abs_flow: Option<PerUnit>,
    pub max_mismatch: f64,
}

impl DcPowerFlowSolution {
    pub fn angle(&self, bus: BusId) -> Option<Radians> {
        self.angles.get(bus.value()).copied()
    }

    /// `None` for unknown or out-of-service lines.
    pub fn flow(&self, line: LineId) -> Option<PerUnit> {
        self.flows
            .iter()
            .find(|flow| flow.line == line)
            .map(|flow| flow.flow)
    }

    /// Net power leaving each bus over its lines, in bus-id order. Flows naming
    /// a bus outside the angle vector are skipped.
    pub fn bus_balance(&self) -> Vec<PerUnit> {
        let mut outflow = vec![PerUnit::ZERO; self.angles.len()];
        for flow in &self.flows {
            if let Some(from) = outflow.get_mut(flow.from_bus.value()) {
                *from += flow.flow;
            }
            if let Some(to) = outflow.get_mut(flow.to_bus.value()) {
                *to += -flow.flow;
            }
        }
        outflow
    }

    /// What the slack actually supplies. Equals its scheduled injection only
    /// when the injection vector was balanced.
    pub fn slack_injection(&self) -> PerUnit {
        self.bus_balance()
            .get(self.slack.value())
            .copied()
            .unwrap_or(PerUnit::ZERO)
    }

    /// Largest |outflow − injection| over non-slack buses; solver round-off only.
    pub fn max_mismatch(&self) -> f64 {
        self.bus_balance()
            .iter()
            .zip(&self.injections)
            .enumerate()
            .filter(|(bus, _)| *bus != self.slack.value())
            .map(|(_, (outflow, injection))| (*outflow - *injection).value().abs())
            .fold(0.0, f64::max)
    }

    pub fn summary(&self) -> FlowSummary {
        let flows: Vec<PerUnit> = self.flows.iter().map(|f| f.flow).collect();
        let min_flow = flows.iter().copied().reduce(|a, b| if b < a { b } else { a });
        let max_flow = flows.iter().copied().reduce(|a, b| if b > a { b } else { a });
        let max_abs_flow = flows.iter().map(|f| f.abs()).reduce(|a, b| if b > a { b } else { a });
        FlowSummary {
            buses: self.angles.len(),
            lines: self.flows.len(),
            total_generation: self.injections.iter().filter(|p| p.value() > 0.0).sum(),
            total_load: -self
                .injections
                .iter()
                .filter(|p| p.value() < 0.0)
                .sum::<PerUnit>(),
            slack_injection: self.slack_injection(),
            min_flow,
            max_flow,
            max_abs_flow,
            max_mismatch: self.max_mismatch(),
        }
    }
}

/// Flow on every in-service line for a given full angle vector.
///
/// `angles` must hold one entry per bus in bus-id order.
pub fn line_flows_from_angles(network: &Network, angles: &[Radians]) -> DcFlowResult<Vec<LineFlow>> {
    if angles.len() != network.bus_count() {
        return Err(DcFlowError::InvalidNetwork(format!(
            "angle vector has {} entries for {} buses",
            angles.len(),
            network.bus_count()
        )));
    }
    Ok(network
        .in_service_lines()
        .map(|line| LineFlow {
            line: line.id,
            from_bus: line.from_bus,
            to_bus: line.to_bus,
            flow: line
                .susceptance()
                .flow(angles[line.from_bus.value()], angles[line.to_bus.value()]),
        })
        .collect())
}

/// DC power-flow solver.
///
/// **Algorithm:** solves the linearized equation B′θ = P where B′ is the bus
/// susceptance matrix, θ the bus voltage angles, and P the net injections.
/// B′ is singular (angles are only defined up to a constant), so the slack
/// row and column are removed and the slack angle is pinned at zero.
/// Branch flows follow as f = (θ_from − θ_to) / x.
///
/// **Assumptions:** small angle differences, flat voltage magnitudes, and
/// lossless lines. Not suitable when reactive power or losses matter.
///
/// # Example
///
/// ```
/// use dcflow_algo::DcPowerFlowSolver;
/// use dcflow_core::{Network, PerUnit, ReactancePu, SolverKind};
///
/// let mut network = Network::new();
/// let a = network.add_bus("A", PerUnit(0.5));
/// let b = network.add_bus("B", PerUnit(-0.5));
/// network.add_line(a, b, ReactancePu(0.1)).unwrap();
///
/// let solution = DcPowerFlowSolver::new()
///     .with_backend(SolverKind::Faer.build_solver())
///     .solve(&network)
///     .unwrap();
/// assert!((solution.flows[0].flow.value() - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone)]
pub struct DcPowerFlowSolver {
    backend: Arc<dyn LinearSystemBackend>,
    topology_check: bool,
}

impl Default for DcPowerFlowSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DcPowerFlowSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DcPowerFlowSolver")
            .field("backend", &self.backend.name())
            .field("topology_check", &self.topology_check)
            .finish()
    }
}

impl DcPowerFlowSolver {
    /// Gauss-Jordan backend with the reachability pre-check enabled.
    pub fn new() -> Self {
        Self {
            backend: Arc::new(GaussSolver::default()),
            topology_check: true,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn LinearSystemBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// When on, a bus with no in-service path to the slack is reported by name
    /// before any matrix is built. When off, the backend's own singularity
    /// detection has to catch it.
    pub fn with_topology_check(mut self, enabled: bool) -> Self {
        self.topology_check = enabled;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn solve(&self, network: &Network) -> DcFlowResult<DcPowerFlowSolution> {
        let _span = tracing::info_span!(
            "dc_power_flow",
            buses = network.bus_count(),
            lines = network.line_count(),
            solver = self.backend.name()
        )
        .entered();

        let diagnostics = network.validate();
        for issue in diagnostics.warnings() {
            warn!("{}", issue);
        }
        diagnostics.into_result()?;

        let slack = network.slack();
        if self.topology_check {
            let stranded = graph_utils::unreachable_from(network, slack);
            if !stranded.is_empty() {
                let names: Vec<String> = stranded.iter().map(|bus| bus.to_string()).collect();
                return Err(DcFlowError::SingularSystem(format!(
                    "{} cannot reach slack {} over in-service lines",
                    names.join(", "),
                    slack
                )));
            }
        }

        let susceptance = build_bus_susceptance(network);
        let injections = network.injections();
        let raw_injections: Vec<f64> = injections.iter().map(|p| p.value()).collect();
        let reduced = reduce_for_slack(&susceptance, &raw_injections, slack)?;
        debug!(
            dimension = reduced.matrix.len(),
            "solving slack-reduced susceptance system"
        );

        let reduced_angles = self
            .backend
            .solve(&reduced.matrix, &reduced.rhs)
            .map_err(|err| match err {
                DcFlowError::SingularSystem(detail) => DcFlowError::SingularSystem(format!(
                    "reduced susceptance matrix is not invertible; a bus is disconnected from slack {} ({})",
                    slack, detail
                )),
                other => other,
            })?;

        let angles: Vec<Radians> = reduced
            .expand(&reduced_angles)
            .into_iter()
            .map(Radians)
            .collect();
        let flows = line_flows_from_angles(network, &angles)?;

        let solution = DcPowerFlowSolution {
            solver: self.backend.name().to_string(),
            slack,
            angles,
            injections,
            flows,
        };

        let mismatch = solution.max_mismatch();
        if mismatch > MISMATCH_WARN_THRESHOLD {
            warn!(mismatch, "bus balance mismatch exceeds threshold");
        }
        info!(
            slack_injection = solution.slack_injection().value(),
            max_mismatch = mismatch,
            "DC power flow solved"
        );
        Ok(solution)
    }
}

/// Run a DC power flow with the default solver configuration.
pub fn dc_power_flow(network: &Network) -> DcFlowResult<DcPowerFlowSolution> {
    DcPowerFlowSolver::new().solve(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcflow_core::{ReactancePu, SolverKind};

    fn build_simple_network() -> Network {
        let mut network = Network::new();
        let b0 = network.add_bus("Bus 0", PerUnit(0.8));
        let b1 = network.add_bus("Bus 1", PerUnit(-0.8));
        network.add_line(b0, b1, ReactancePu(0.1)).unwrap();
        network
    }

    #[test]
    fn two_bus_angle_and_flow() {
        let solution = dc_power_flow(&build_simple_network()).unwrap();

        assert_eq!(solution.angles[0], Radians::ZERO);
        assert!((solution.angles[1].value() + 0.08).abs() < 1e-12);
        assert!((solution.flows[0].flow.value() - 0.8).abs() < 1e-12);
        assert_eq!(solution.solver, "gauss");
    }

    #[test]
    fn slack_absorbs_imbalance() {
        let mut network = Network::new();
        let b0 = network.add_bus("Bus 0", PerUnit(0.0));
        let b1 = network.add_bus("Bus 1", PerUnit(-0.3));
        network.add_line(b0, b1, ReactancePu(0.2)).unwrap();

        let solution = dc_power_flow(&network).unwrap();
        assert!((solution.slack_injection().value() - 0.3).abs() < 1e-12);
        assert!(solution.max_mismatch() < 1e-12);
    }

    #[test]
    fn non_default_slack_is_pinned() {
        let network = build_simple_network().with_slack(BusId::new(1));
        let solution = dc_power_flow(&network).unwrap();

        assert_eq!(solution.angle(BusId::new(1)), Some(Radians::ZERO));
        assert!((solution.angles[0].value() - 0.08).abs() < 1e-12);
        assert!((solution.flows[0].flow.value() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn invalid_network_is_rejected_before_solving() {
        let mut network = build_simple_network();
        network
            .add_line(BusId::new(0), BusId::new(1), ReactancePu(0.0))
            .unwrap();

        let err = dc_power_flow(&network).unwrap_err();
        assert!(matches!(err, DcFlowError::InvalidNetwork(_)), "{err}");
    }

    #[test]
    fn line_flows_need_a_full_angle_vector() {
        let network = build_simple_network();
        let err = line_flows_from_angles(&network, &[Radians::ZERO]).unwrap_err();
        assert!(matches!(err, DcFlowError::InvalidNetwork(_)));
    }

    #[test]
    fn summary_reports_range_and_totals() {
        let solution = DcPowerFlowSolver::new()
            .with_backend(SolverKind::Faer.build_solver())
            .solve(&build_simple_network())
            .unwrap();
        let summary = solution.summary();

        assert_eq!(summary.buses, 2);
        assert_eq!(summary.lines, 1);
        assert!((summary.total_generation.value() - 0.8).abs() < 1e-12);
        assert!((summary.total_load.value() - 0.8).abs() < 1e-12);
        assert_eq!(summary.min_flow, summary.max_flow);
        assert!((summary.max_abs_flow.unwrap().value() - 0.8).abs() < 1e-12);
        assert_eq!(solution.solver, "faer");
    }

    #[test]
    fn bus_balance_skips_unknown_buses() {
        let json = r#"{
            "solver": "gauss",
            "slack": 0,
            "angles": [0.0, -0.08],
            "injections": [0.8, -0.8],
            "flows": [
                {"line": 0, "from_bus": 0, "to_bus": 1, "flow": 0.8},
                {"line": 1, "from_bus": 1, "to_bus": 5, "flow": 0.3}
            ]
        }"#;
        let solution: DcPowerFlowSolution = serde_json::from_str(json).unwrap();
        let balance = solution.bus_balance();

        assert_eq!(balance.len(), 2);
        assert!((balance[0].value() - 0.8).abs() < 1e-12);
        assert!((balance[1].value() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn solver_debug_names_backend() {
        let solver = DcPowerFlowSolver::new().with_topology_check(false);
        let debug = format!("{:?}", solver);
        assert!(debug.contains("gauss"));
        assert!(debug.contains("topology_check: false"));
    }
}
