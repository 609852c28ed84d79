use clap::ValueEnum;

/// Output format for solved cases.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable aligned table (default)
    #[default]
    Table,
    /// Pretty-printed JSON with angles, flows, and summary
    Json,
    /// One CSV row per angle and per line flow
    Csv,
}

/// Unit used when reporting bus angles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    pub fn label(self) -> &'static str {
        match self {
            AngleUnit::Radians => "radians",
            AngleUnit::Degrees => "degrees",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            AngleUnit::Radians => "rad",
            AngleUnit::Degrees => "deg",
        }
    }
}

/// Rendering knobs shared by every output format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportOptions {
    pub format: OutputFormat,
    pub precision: usize,
    pub angle_unit: AngleUnit,
    pub base_mva: f64,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            precision: 4,
            angle_unit: AngleUnit::Radians,
            base_mva: 100.0,
        }
    }
}

impl From<&crate::cli::Cli> for ReportOptions {
    fn from(cli: &crate::cli::Cli) -> Self {
        Self {
            format: cli.format,
            precision: usize::from(cli.precision),
            angle_unit: if cli.degrees {
                AngleUnit::Degrees
            } else {
                AngleUnit::Radians
            },
            base_mva: cli.base_mva,
        }
    }
}
