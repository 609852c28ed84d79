use crate::common::OutputFormat;
use clap::Parser;

/// Solve the built-in three-bus DC power flow and print angles and line flows.
#[derive(Parser, Debug)]
#[command(name = "dcflow", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "warn")]
    pub log_level: tracing::Level,

    /// Linear solver backend (gauss, faer)
    #[arg(long, default_value = "gauss")]
    pub solver: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Decimal places for angles and per-unit flows
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(0..=12))]
    pub precision: u8,

    /// Report angles in degrees instead of radians
    #[arg(long)]
    pub degrees: bool,

    /// Bus whose angle is pinned to zero
    #[arg(long, default_value_t = 0, value_name = "BUS")]
    pub slack: usize,

    /// System MVA base
    #[arg(long, default_value_t = 100.0)]
    pub base_mva: f64,

    /// Take a line out of service by id (repeatable)
    #[arg(long = "out-of-service", value_name = "LINE")]
    pub out_of_service: Vec<usize>,

    /// Skip the reachability check and let the linear solver detect islands
    #[arg(long)]
    pub no_topology_check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_shipped_case() {
        let cli = Cli::try_parse_from(["dcflow"]).unwrap();
        assert_eq!(cli.log_level, tracing::Level::WARN);
        assert_eq!(cli.solver, "gauss");
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.precision, 4);
        assert_eq!(cli.base_mva, 100.0);
        assert_eq!(cli.slack, 0);
        assert!(cli.out_of_service.is_empty());
        assert!(!cli.degrees && !cli.no_topology_check);
    }

    #[test]
    fn out_of_service_is_repeatable() {
        let cli = Cli::try_parse_from([
            "dcflow",
            "--out-of-service",
            "0",
            "--out-of-service",
            "2",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.out_of_service, vec![0, 2]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn precision_is_bounded() {
        assert!(Cli::try_parse_from(["dcflow", "--precision", "13"]).is_err());
    }
}
