//! Rendering of solved cases to table, JSON, or CSV.

use crate::common::{AngleUnit, OutputFormat, ReportOptions};
use anyhow::Result;
use dcflow_algo::{DcPowerFlowSolution, FlowSummary, LineFlow};
use dcflow_core::{BusId, LineId, Megawatts, Network, PerUnit, Radians};
use serde::Serialize;
use std::io::Write;
use tabwriter::TabWriter;

pub fn write_report<W: Write>(
    network: &Network,
    solution: &DcPowerFlowSolution,
    options: &ReportOptions,
    out: &mut W,
) -> Result<()> {
    match options.format {
        OutputFormat::Table => write_table(network, solution, options, out),
        OutputFormat::Json => write_json(network, solution, options, out),
        OutputFormat::Csv => write_csv(solution, options, out),
    }
}

fn angle_value(angle: Radians, unit: AngleUnit) -> f64 {
    match unit {
        AngleUnit::Radians => angle.value(),
        AngleUnit::Degrees => angle.to_degrees().value(),
    }
}

fn bus_name(network: &Network, bus: BusId) -> String {
    network
        .bus(bus)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| bus.to_string())
}

fn line_name(network: &Network, line: LineId) -> String {
    network
        .line(line)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| line.to_string())
}

fn write_table<W: Write>(
    network: &Network,
    solution: &DcPowerFlowSolution,
    options: &ReportOptions,
    out: &mut W,
) -> Result<()> {
    let precision = options.precision;
    let mut tw = TabWriter::new(&mut *out);

    writeln!(tw, "Bus voltage angles ({}):", options.angle_unit.label())?;
    for (i, angle) in solution.angles.iter().enumerate() {
        writeln!(
            tw,
            "  {}\t{:.*}",
            bus_name(network, BusId::new(i)),
            precision,
            angle_value(*angle, options.angle_unit)
        )?;
    }
    writeln!(tw)?;

    writeln!(tw, "Line flows:")?;
    writeln!(tw, "  LINE\tFLOW (pu)\tFLOW (MW)")?;
    for flow in &solution.flows {
        writeln!(
            tw,
            "  {} -> {}\t{:.*}\t{:.2}",
            flow.from_bus.value(),
            flow.to_bus.value(),
            precision,
            flow.flow.value(),
            flow.flow.to_megawatts(options.base_mva).value()
        )?;
    }
    tw.flush()?;
    drop(tw);

    let summary = solution.summary();
    writeln!(out)?;
    writeln!(
        out,
        "Solver {}; slack {} supplies {:.*} pu ({:.2} MW)",
        solution.solver,
        solution.slack,
        precision,
        summary.slack_injection.value(),
        summary.slack_injection.to_megawatts(options.base_mva).value()
    )?;
    if let Some(peak) = heaviest_line(&solution.flows) {
        writeln!(
            out,
            "Heaviest line: {} at {:.*} pu",
            line_name(network, peak.line),
            precision,
            peak.flow.abs().value()
        )?;
    }
    Ok(())
}

fn heaviest_line(flows: &[LineFlow]) -> Option<&LineFlow> {
    flows
        .iter()
        .reduce(|a, b| if b.flow.abs() > a.flow.abs() { b } else { a })
}

#[derive(Serialize)]
struct JsonReport {
    solver: String,
    slack: BusId,
    base_mva: f64,
    angle_unit: &'static str,
    buses: Vec<BusRow>,
    lines: Vec<LineRow>,
    summary: FlowSummary,
}

#[derive(Serialize)]
struct BusRow {
    id: BusId,
    name: String,
    injection_pu: PerUnit,
    angle: f64,
}

#[derive(Serialize)]
struct LineRow {
    id: LineId,
    name: String,
    from_bus: BusId,
    to_bus: BusId,
    flow_pu: PerUnit,
    flow_mw: Megawatts,
}

fn write_json<W: Write>(
    network: &Network,
    solution: &DcPowerFlowSolution,
    options: &ReportOptions,
    out: &mut W,
) -> Result<()> {
    let buses = solution
        .angles
        .iter()
        .zip(&solution.injections)
        .enumerate()
        .map(|(i, (angle, injection))| BusRow {
            id: BusId::new(i),
            name: bus_name(network, BusId::new(i)),
            injection_pu: *injection,
            angle: angle_value(*angle, options.angle_unit),
        })
        .collect();
    let lines = solution
        .flows
        .iter()
        .map(|flow| LineRow {
            id: flow.line,
            name: line_name(network, flow.line),
            from_bus: flow.from_bus,
            to_bus: flow.to_bus,
            flow_pu: flow.flow,
            flow_mw: flow.flow.to_megawatts(options.base_mva),
        })
        .collect();

    let report = JsonReport {
        solver: solution.solver.clone(),
        slack: solution.slack,
        base_mva: options.base_mva,
        angle_unit: options.angle_unit.short(),
        buses,
        lines,
        summary: solution.summary(),
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow {
    record: &'static str,
    id: usize,
    from_bus: Option<usize>,
    to_bus: Option<usize>,
    value: String,
    unit: &'static str,
    value_mw: Option<String>,
}

fn write_csv<W: Write>(
    solution: &DcPowerFlowSolution,
    options: &ReportOptions,
    out: &mut W,
) -> Result<()> {
    let precision = options.precision;
    let mut wtr = csv::Writer::from_writer(&mut *out);

    for (i, angle) in solution.angles.iter().enumerate() {
        wtr.serialize(CsvRow {
            record: "angle",
            id: i,
            from_bus: None,
            to_bus: None,
            value: format!("{:.*}", precision, angle_value(*angle, options.angle_unit)),
            unit: options.angle_unit.short(),
            value_mw: None,
        })?;
    }
    for flow in &solution.flows {
        wtr.serialize(CsvRow {
            record: "flow",
            id: flow.line.value(),
            from_bus: Some(flow.from_bus.value()),
            to_bus: Some(flow.to_bus.value()),
            value: format!("{:.*}", precision, flow.flow.value()),
            unit: "pu",
            value_mw: Some(format!(
                "{:.2}",
                flow.flow.to_megawatts(options.base_mva).value()
            )),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{three_bus_case, DEFAULT_BASE_MVA};
    use dcflow_algo::DcPowerFlowSolver;

    fn render(options: ReportOptions) -> String {
        let network = three_bus_case(DEFAULT_BASE_MVA).unwrap();
        let solution = DcPowerFlowSolver::new().solve(&network).unwrap();
        let mut buf = Vec::new();
        write_report(&network, &solution, &options, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn table_lists_angles_then_flows() {
        let text = render(ReportOptions::default());
        let angles = text.find("Bus voltage angles (radians):").unwrap();
        let flows = text.find("Line flows:").unwrap();
        assert!(angles < flows);
        assert!(text.contains("-0.0578"));
        assert!(text.contains("-0.0844"));
        assert!(text.contains("0 -> 1"));
        assert!(text.contains("57.78"));
        assert!(text.contains("17.78"));
        assert!(text.contains("slack Bus 0 supplies 1.0000 pu (100.00 MW)"));
        assert!(text.contains("Heaviest line: Line 0-1"));
    }

    #[test]
    fn table_honors_precision_and_degrees() {
        let text = render(ReportOptions {
            precision: 2,
            angle_unit: AngleUnit::Degrees,
            ..ReportOptions::default()
        });
        assert!(text.contains("Bus voltage angles (degrees):"));
        assert!(text.contains("-3.31"));
        assert!(!text.contains("-3.310"));
        assert!(text.contains("0.58"));
    }

    #[test]
    fn json_carries_raw_values() {
        let text = render(ReportOptions {
            format: OutputFormat::Json,
            ..ReportOptions::default()
        });
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["solver"], "gauss");
        assert_eq!(json["angle_unit"], "rad");
        assert_eq!(json["buses"][0]["angle"], 0.0);
        let theta1 = json["buses"][1]["angle"].as_f64().unwrap();
        assert!((theta1 + 78.0 / 1350.0).abs() < 1e-12);
        assert_eq!(json["lines"].as_array().unwrap().len(), 3);
        assert_eq!(json["lines"][2]["name"], "Line 1-2");
        assert!((json["summary"]["slack_injection"].as_f64().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn csv_has_one_row_per_angle_and_flow() {
        let text = render(ReportOptions {
            format: OutputFormat::Csv,
            ..ReportOptions::default()
        });
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "record,id,from_bus,to_bus,value,unit,value_mw");
        assert_eq!(lines.len(), 1 + 3 + 3);
        assert_eq!(lines[1], "angle,0,,,0.0000,rad,");
        assert_eq!(lines[4], "flow,0,0,1,0.5778,pu,57.78");
    }
}
