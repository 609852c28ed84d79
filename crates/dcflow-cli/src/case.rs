//! The three-bus case shipped with the binary.
//!
//! One generator at bus 0 feeds two loads over a meshed triangle:
//!
//! ```text
//!        x = 0.1
//!   0 ─────────── 1   (-40 MW)
//!    \           /
//!  x=0.2      x=0.15
//!      \       /
//!          2          (-60 MW)
//! ```

use dcflow_core::{BusId, DcFlowError, DcFlowResult, Megawatts, Network, ReactancePu};

pub const DEFAULT_BASE_MVA: f64 = 100.0;

/// Net injections in MW, bus order. Bus 0 is the slack.
pub const INJECTIONS_MW: [f64; 3] = [100.0, -40.0, -60.0];

/// `(from, to, reactance pu)`, line-id order.
pub const LINES: [(usize, usize, f64); 3] = [(0, 1, 0.1), (0, 2, 0.2), (1, 2, 0.15)];

/// Build the shipped case on the given MVA base.
pub fn three_bus_case(base_mva: f64) -> DcFlowResult<Network> {
    if !base_mva.is_finite() || base_mva <= 0.0 {
        return Err(DcFlowError::Config(format!(
            "base MVA must be positive, got {}",
            base_mva
        )));
    }

    let mut network = Network::new();
    let buses: Vec<BusId> = INJECTIONS_MW
        .iter()
        .enumerate()
        .map(|(i, &mw)| network.add_bus(format!("Bus {i}"), Megawatts(mw).to_per_unit(base_mva)))
        .collect();
    for (from, to, x) in LINES {
        network.add_line(buses[from], buses[to], ReactancePu(x))?;
    }
    Ok(network.with_slack(buses[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_case_is_balanced_and_valid() {
        let network = three_bus_case(DEFAULT_BASE_MVA).unwrap();
        assert_eq!(network.bus_count(), 3);
        assert_eq!(network.line_count(), 3);
        assert_eq!(network.slack(), BusId::new(0));
        assert!(network.total_injection().value().abs() < 1e-12);
        let diagnostics = network.validate();
        assert_eq!(diagnostics.error_count(), 0);
        assert_eq!(diagnostics.warning_count(), 0);
        assert!((network.injections()[1].value() + 0.4).abs() < 1e-12);
    }

    #[test]
    fn base_scales_per_unit_injections() {
        let network = three_bus_case(200.0).unwrap();
        assert!((network.injections()[0].value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_base() {
        for base in [0.0, -100.0, f64::NAN] {
            let err = three_bus_case(base).unwrap_err();
            assert!(matches!(err, DcFlowError::Config(_)), "{err}");
        }
    }
}
