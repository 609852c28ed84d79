use dcflow_core::{BusId, DcFlowError, DcFlowResult, Network};

/// Builds the bus susceptance matrix (B′) used in the DC power-flow linear system.
///
/// Each in-service line contributes +1/x on both diagonals and −1/x on the two
/// off-diagonals, so parallel lines simply accumulate. The result is symmetric
/// with zero row sums, which is why it has to be reduced before solving.
/// Rows and columns are in bus-id order.
pub fn build_bus_susceptance(network: &Network) -> Vec<Vec<f64>> {
    let n = network.bus_count();
    let mut susceptance = vec![vec![0.0; n]; n];
    for line in network.in_service_lines() {
        if line.is_self_loop() {
            continue;
        }
        let i = line.from_bus.value();
        let j = line.to_bus.value();
        if i >= n || j >= n {
            continue;
        }
        let b = line.susceptance().value();
        susceptance[i][j] -= b;
        susceptance[j][i] -= b;
        susceptance[i][i] += b;
        susceptance[j][j] += b;
    }
    susceptance
}

/// The slack-reduced system `B_reduced · θ_reduced = P_reduced`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedSystem {
    pub matrix: Vec<Vec<f64>>,
    pub rhs: Vec<f64>,
    /// Bus behind each row, i.e. every bus except the slack, in id order
    pub buses: Vec<BusId>,
    pub slack: BusId,
}

impl ReducedSystem {
    /// Re-insert the slack at angle exactly 0 and place solved angles back in bus order.
    ///
    /// Rows naming a bus outside the full system are dropped.
    pub fn expand(&self, reduced_angles: &[f64]) -> Vec<f64> {
        let mut angles = vec![0.0; self.buses.len() + 1];
        for (bus, &theta) in self.buses.iter().zip(reduced_angles) {
            if let Some(slot) = angles.get_mut(bus.value()) {
                *slot = theta;
            }
        }
        if let Some(slot) = angles.get_mut(self.slack.value()) {
            *slot = 0.0;
        }
        angles
    }
}

/// Drop the slack row, column, and injection.
///
/// The full B′ only fixes angles up to a common offset; pinning the slack at
/// zero removes that freedom and leaves a non-singular system whenever every
/// bus can reach the slack.
pub fn reduce_for_slack(
    susceptance: &[Vec<f64>],
    injections: &[f64],
    slack: BusId,
) -> DcFlowResult<ReducedSystem> {
    let s = slack.value();
    if s >= susceptance.len() {
        return Err(DcFlowError::InvalidNetwork(format!(
            "slack {} is outside a {}-bus susceptance matrix",
            slack,
            susceptance.len()
        )));
    }
    let keep: Vec<usize> = (0..susceptance.len()).filter(|&i| i != s).collect();

    let matrix = keep
        .iter()
        .map(|&i| keep.iter().map(|&j| susceptance[i][j]).collect())
        .collect();
    let rhs = keep
        .iter()
        .map(|&i| injections.get(i).copied().unwrap_or(0.0))
        .collect();

    Ok(ReducedSystem {
        matrix,
        rhs,
        buses: keep.into_iter().map(BusId::new).collect(),
        slack,
    })
}
