use crate::{BusId, Network};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Topology summary over in-service lines (density/degree/islands).
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub bus_count: usize,
    pub line_count: usize,
    pub islands: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
}

/// One electrically connected group of buses.
#[derive(Debug, Clone, Serialize)]
pub struct Island {
    pub island_id: usize,
    /// Member buses in id order
    pub buses: Vec<BusId>,
}

/// Aggregated island analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<Island>,
    /// `assignments[bus]` is the island id of that bus
    pub assignments: Vec<usize>,
}

impl IslandAnalysis {
    pub fn island_of(&self, bus: BusId) -> Option<usize> {
        self.assignments.get(bus.value()).copied()
    }
}

/// In-service neighbours of a bus. Self-loops never connect anything.
fn live_neighbors(network: &Network, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
    network
        .graph
        .edges(node)
        .filter(|edge| edge.weight().in_service && !edge.weight().is_self_loop())
        .map(move |edge| {
            if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            }
        })
}

/// Degree statistics and island count, ignoring out-of-service lines.
pub fn graph_stats(network: &Network) -> GraphStats {
    let bus_count = network.bus_count();
    let degrees: Vec<usize> = network
        .graph
        .node_indices()
        .map(|node| live_neighbors(network, node).count())
        .collect();
    let min_degree = *degrees.iter().min().unwrap_or(&0);
    let max_degree = *degrees.iter().max().unwrap_or(&0);
    let avg_degree = if bus_count == 0 {
        0.0
    } else {
        degrees.iter().copied().sum::<usize>() as f64 / bus_count as f64
    };
    GraphStats {
        bus_count,
        line_count: network.in_service_lines().count(),
        islands: find_islands(network).islands.len(),
        min_degree,
        avg_degree,
        max_degree,
    }
}

/// Labels connected components by breadth-first search over in-service lines.
pub fn find_islands(network: &Network) -> IslandAnalysis {
    let mut visited = HashSet::new();
    let mut islands = Vec::new();
    let mut assignments = vec![0; network.bus_count()];
    for start in network.graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let island_id = islands.len();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        let mut members = Vec::new();
        while let Some(node) = queue.pop_front() {
            if !visited.insert(node) {
                continue;
            }
            members.push(BusId::new(node.index()));
            assignments[node.index()] = island_id;
            for neighbor in live_neighbors(network, node) {
                if !visited.contains(&neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort_unstable();
        islands.push(Island {
            island_id,
            buses: members,
        });
    }
    IslandAnalysis {
        islands,
        assignments,
    }
}

/// Buses with no in-service path to `root`, in id order.
///
/// A non-empty result means the slack-reduced susceptance matrix is singular.
pub fn unreachable_from(network: &Network, root: BusId) -> Vec<BusId> {
    if network.bus(root).is_none() {
        return network.buses().map(|bus| bus.id).collect();
    }
    let analysis = find_islands(network);
    let root_island = analysis.assignments[root.value()];
    network
        .buses()
        .map(|bus| bus.id)
        .filter(|bus| analysis.assignments[bus.value()] != root_island)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineId, PerUnit, ReactancePu};

    fn square_with_spur() -> Network {
        // 0 - 1
        // |   |
        // 3 - 2    4 (spur to 2)
        let mut network = Network::new();
        let buses: Vec<BusId> = (0..5)
            .map(|i| network.add_bus(format!("Bus {i}"), PerUnit(0.0)))
            .collect();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (2, 4)] {
            network
                .add_line(buses[a], buses[b], ReactancePu(0.1))
                .unwrap();
        }
        network
    }

    #[test]
    fn connected_network_is_one_island() {
        let network = square_with_spur();
        let analysis = find_islands(&network);
        assert_eq!(analysis.islands.len(), 1);
        assert_eq!(analysis.islands[0].buses.len(), 5);
        assert!(unreachable_from(&network, BusId::new(0)).is_empty());

        let stats = graph_stats(&network);
        assert_eq!(stats.islands, 1);
        assert_eq!(stats.min_degree, 1);
        assert_eq!(stats.max_degree, 3);
        assert!((stats.avg_degree - 2.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_service_spur_strands_its_bus() {
        let mut network = square_with_spur();
        network.set_line_in_service(LineId::new(4), false).unwrap();

        let analysis = find_islands(&network);
        assert_eq!(analysis.islands.len(), 2);
        assert_ne!(
            analysis.island_of(BusId::new(4)),
            analysis.island_of(BusId::new(0))
        );
        assert_eq!(
            unreachable_from(&network, BusId::new(0)),
            vec![BusId::new(4)]
        );
        assert_eq!(graph_stats(&network).line_count, 4);
    }

    #[test]
    fn split_network_reports_far_side() {
        let mut network = square_with_spur();
        network.set_line_in_service(LineId::new(0), false).unwrap();
        network.set_line_in_service(LineId::new(2), false).unwrap();

        // 0-3 and 1-2-4 remain
        assert_eq!(
            unreachable_from(&network, BusId::new(3)),
            vec![BusId::new(1), BusId::new(2), BusId::new(4)]
        );
    }
}
