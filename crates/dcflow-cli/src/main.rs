use anyhow::Context;
use clap::Parser;
use dcflow_algo::DcPowerFlowSolver;
use dcflow_cli::{case, cli::Cli, common::ReportOptions, report};
use dcflow_core::{graph_utils, BusId, LineId, SolverKind};
use std::io::{self, Write};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let kind: SolverKind = cli.solver.parse()?;

    let mut network =
        case::three_bus_case(cli.base_mva).context("building the three-bus case")?;
    network.set_slack(BusId::new(cli.slack));
    for &line in &cli.out_of_service {
        network
            .set_line_in_service(LineId::new(line), false)
            .with_context(|| format!("taking line {line} out of service"))?;
    }
    let topology = graph_utils::graph_stats(&network);
    debug!(
        islands = topology.islands,
        min_degree = topology.min_degree,
        max_degree = topology.max_degree,
        "network topology"
    );
    info!("Solving {} with the {} backend", network.stats(), kind);

    let solution = DcPowerFlowSolver::new()
        .with_backend(kind.build_solver())
        .with_topology_check(!cli.no_topology_check)
        .solve(&network)
        .context("solving DC power flow")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_report(&network, &solution, &ReportOptions::from(cli), &mut out)?;
    out.flush()?;
    Ok(())
}
