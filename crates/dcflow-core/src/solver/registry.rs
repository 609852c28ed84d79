use super::backend::{FaerSolver, GaussSolver, LinearSystemBackend};
use crate::error::DcFlowError;
use std::str::FromStr;
use std::sync::Arc;

/// Simple registry of available linear backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverKind {
    #[default]
    Gauss,
    Faer,
}

impl FromStr for SolverKind {
    type Err = DcFlowError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "gauss" | "default" => Ok(SolverKind::Gauss),
            "faer" => Ok(SolverKind::Faer),
            other => Err(DcFlowError::Config(format!(
                "unknown solver '{}'; supported values: {}",
                other,
                SolverKind::available().join(", ")
            ))),
        }
    }
}

impl SolverKind {
    pub fn build_solver(self) -> Arc<dyn LinearSystemBackend> {
        match self {
            SolverKind::Gauss => Arc::new(GaussSolver::default()),
            SolverKind::Faer => Arc::new(FaerSolver::default()),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["gauss", "faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Gauss => "gauss",
            SolverKind::Faer => "faer",
        }
    }
}

impl std::fmt::Display for SolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_kind_parsing_supports_all_engines() {
        assert_eq!("gauss".parse::<SolverKind>().unwrap(), SolverKind::Gauss);
        assert_eq!("DEFAULT".parse::<SolverKind>().unwrap(), SolverKind::Gauss);
        assert_eq!("faer".parse::<SolverKind>().unwrap(), SolverKind::Faer);
        let err = "cholesky".parse::<SolverKind>().unwrap_err();
        assert!(matches!(err, DcFlowError::Config(_)));
        assert!(err.to_string().contains("gauss, faer"));
    }

    #[test]
    fn built_solver_names_match_kind() {
        for name in SolverKind::available() {
            let kind: SolverKind = name.parse().unwrap();
            assert_eq!(kind.build_solver().name(), kind.as_str());
        }
    }

    #[test]
    fn solver_backend_options_solve_diagonal_system() {
        let matrix = vec![vec![2.0, 0.0], vec![0.0, 3.0]];
        let rhs = vec![4.0, 6.0];

        for kind in [SolverKind::Gauss, SolverKind::Faer] {
            let solution = kind.build_solver().solve(&matrix, &rhs).unwrap();
            assert!((solution[0] - 2.0).abs() < 1e-12);
            assert!((solution[1] - 2.0).abs() < 1e-12);
        }
    }
}
