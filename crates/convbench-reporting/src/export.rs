use std::io::Write;
use std::path::Path;

use convbench_core::{BenchmarkReport, ConversionOutcome, FidelityReport};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            _ => Err(format!(
                "unknown export format: '{s}' (expected: json, csv, markdown, text)"
            )),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a benchmark report to the given format.
pub fn render_benchmark(
    report: &BenchmarkReport,
    format: ExportFormat,
) -> Result<String, ReportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ExportFormat::Csv => Ok(benchmark_csv(report)),
        ExportFormat::Markdown => Ok(benchmark_markdown(report)),
        ExportFormat::Text => Ok(benchmark_text(report)),
    }
}

/// Render a single fidelity report to the given format.
pub fn render_fidelity(
    report: &FidelityReport,
    format: ExportFormat,
) -> Result<String, ReportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ExportFormat::Csv => Ok(fidelity_csv(std::slice::from_ref(report))),
        ExportFormat::Markdown => Ok(fidelity_markdown(std::slice::from_ref(report))),
        ExportFormat::Text => Ok(fidelity_text(report)),
    }
}

/// Render a benchmark report and write it to `path`.
pub fn export_benchmark(
    report: &BenchmarkReport,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let content = render_benchmark(report, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Render a fidelity report and write it to `path`.
pub fn export_fidelity(
    report: &FidelityReport,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ReportError> {
    let content = render_fidelity(report, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn outcome_status(o: &ConversionOutcome) -> &'static str {
    if o.success { "ok" } else { "failed" }
}

/// Escape a CSV field: quote it when it contains a comma, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn benchmark_csv(report: &BenchmarkReport) -> String {
    let mut out =
        String::from("method,status,duration_ms,original_size,output_size,artifact,error\n");
    for o in &report.outcomes {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_field(&o.method),
            outcome_status(o),
            o.duration_ms,
            o.original_size,
            o.output_size,
            csv_field(o.artifact.as_deref().unwrap_or("")),
            csv_field(o.error_message.as_deref().unwrap_or("")),
        ));
    }
    out
}

fn benchmark_markdown(report: &BenchmarkReport) -> String {
    let mut out = String::from("# Conversion benchmark\n\n");
    out.push_str(&format!(
        "- Attempted: {}\n- Success rate: {:.1}%\n- Average duration: {:.1} ms\n",
        report.total_attempted,
        report.success_rate * 100.0,
        report.average_duration_ms,
    ));
    if let Some(fastest) = &report.fastest_method {
        out.push_str(&format!("- Fastest: {fastest}\n"));
    }
    if let Some(slowest) = &report.slowest_method {
        out.push_str(&format!("- Slowest: {slowest}\n"));
    }
    out.push_str("\n| Method | Status | Duration (ms) | Output size | Error |\n");
    out.push_str("|---|---|---|---|---|\n");
    for o in &report.outcomes {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            o.method,
            outcome_status(o),
            o.duration_ms,
            o.output_size,
            o.error_message.as_deref().unwrap_or(""),
        ));
    }
    if let Some(rankings) = &report.rankings {
        out.push_str("\n## Fidelity ranking\n\n");
        out.push_str(&fidelity_markdown(rankings));
    }
    out
}

fn benchmark_text(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Attempted {} converter(s), success rate {:.1}%, average {:.1} ms\n",
        report.total_attempted,
        report.success_rate * 100.0,
        report.average_duration_ms,
    ));
    match (&report.fastest_method, &report.slowest_method) {
        (Some(fastest), Some(slowest)) => {
            out.push_str(&format!("Fastest: {fastest}  Slowest: {slowest}\n"));
        }
        _ => out.push_str("No successful conversions\n"),
    }
    out.push('\n');
    for o in &report.outcomes {
        match &o.error_message {
            None => out.push_str(&format!(
                "  {:<16} ok      {:>6} ms  {:>8} bytes\n",
                o.method, o.duration_ms, o.output_size
            )),
            Some(err) => out.push_str(&format!(
                "  {:<16} FAILED  {:>6} ms  {err}\n",
                o.method, o.duration_ms
            )),
        }
    }
    if let Some(rankings) = &report.rankings {
        out.push('\n');
        for (i, r) in rankings.iter().enumerate() {
            out.push_str(&format!(
                "  #{} {:<16} score {:.3} ({})\n",
                i + 1,
                r.converter_name,
                r.overall_score,
                r.quality_tier
            ));
        }
    }
    out
}

fn fidelity_csv(reports: &[FidelityReport]) -> String {
    let mut out = String::from(
        "converter,score,tier,unit_count_accurate,text_similarity,script_accuracy,structure_intact,issues,validation_error\n",
    );
    for r in reports {
        out.push_str(&format!(
            "{},{:.4},{},{},{:.4},{:.4},{},{},{}\n",
            csv_field(&r.converter_name),
            r.overall_score,
            r.quality_tier,
            r.unit_count_accurate,
            r.text_similarity,
            r.script_accuracy,
            r.structure_intact,
            csv_field(&r.issues.join("; ")),
            csv_field(r.validation_error.as_deref().unwrap_or("")),
        ));
    }
    out
}

fn fidelity_markdown(reports: &[FidelityReport]) -> String {
    let mut out =
        String::from("| Converter | Score | Tier | Units | Text | Script | Structure |\n");
    out.push_str("|---|---|---|---|---|---|---|\n");
    for r in reports {
        out.push_str(&format!(
            "| {} | {:.3} | {} | {} | {:.3} | {:.3} | {} |\n",
            r.converter_name,
            r.overall_score,
            r.quality_tier,
            check_mark(r.unit_count_accurate),
            r.text_similarity,
            r.script_accuracy,
            check_mark(r.structure_intact),
        ));
    }
    let issues: Vec<&FidelityReport> = reports.iter().filter(|r| !r.issues.is_empty()).collect();
    if !issues.is_empty() {
        out.push_str("\n### Issues\n\n");
        for r in issues {
            for issue in &r.issues {
                out.push_str(&format!("- **{}**: {}\n", r.converter_name, issue));
            }
        }
    }
    out
}

fn fidelity_text(report: &FidelityReport) -> String {
    if let Some(error) = &report.validation_error {
        return format!(
            "{}: validation error: {}\n",
            report.converter_name, error
        );
    }
    let mut out = format!(
        "{}: score {:.3} ({})\n",
        report.converter_name, report.overall_score, report.quality_tier
    );
    out.push_str(&format!(
        "  unit count      {} (expected {}, got {})\n",
        pass_fail(report.unit_count_accurate),
        report.expected_unit_count,
        report.actual_unit_count
    ));
    out.push_str(&format!(
        "  text similarity {} ({:.2}%)\n",
        pass_fail(report.text_accurate),
        report.text_similarity * 100.0
    ));
    out.push_str(&format!(
        "  script chars    {} ({:.2}%, {} of {})\n",
        pass_fail(report.script_accurate),
        report.script_accuracy * 100.0,
        report.output_script_chars,
        report.original_script_chars
    ));
    out.push_str(&format!(
        "  structure       {}\n",
        pass_fail(report.structure_intact)
    ));
    for issue in &report.issues {
        out.push_str(&format!("  ! {issue}\n"));
    }
    out
}

fn check_mark(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

fn pass_fail(ok: bool) -> &'static str {
    if ok { "pass" } else { "FAIL" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convbench_core::{QualityTier, ValidatorConfig};
    use std::str::FromStr;

    fn sample_benchmark() -> BenchmarkReport {
        BenchmarkReport {
            outcomes: vec![
                ConversionOutcome::success("fast", 120, 1000, 900, "/tmp/a.pdf"),
                ConversionOutcome::failure("broken", 5, "renderer, quoth it, \"died\""),
            ],
            fastest_method: Some("fast".into()),
            slowest_method: Some("fast".into()),
            average_duration_ms: 120.0,
            success_rate: 0.5,
            total_attempted: 2,
            rankings: None,
        }
    }

    fn sample_fidelity() -> FidelityReport {
        let validator = convbench_core::FidelityValidator::new(ValidatorConfig::default());
        let profile = |text: &str, units| convbench_core::DocumentProfile {
            text: text.to_string(),
            unit_count: units,
            script_char_count: convbench_core::count_script_chars(text),
            total_char_count: text.chars().count(),
        };
        validator.assess(&profile("中文测试 123", 1), &profile("中文测试 123", 1), "fast")
    }

    #[test]
    fn format_parsing() {
        assert_eq!(ExportFormat::from_str("json").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_str("MD").unwrap(), ExportFormat::Markdown);
        assert_eq!(ExportFormat::from_str("text").unwrap(), ExportFormat::Text);
        assert!(ExportFormat::from_str("xml").is_err());
    }

    #[test]
    fn json_round_trips_through_serde() {
        let rendered = render_benchmark(&sample_benchmark(), ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["total_attempted"], 2);
        assert_eq!(value["outcomes"][0]["method"], "fast");
        // Failure outcomes serialize without an artifact key.
        assert!(value["outcomes"][1].get("artifact").is_none());
    }

    #[test]
    fn csv_has_header_plus_row_per_outcome() {
        let rendered = render_benchmark(&sample_benchmark(), ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("method,status"));
        assert!(lines[1].starts_with("fast,ok,120"));
        // Quoted because the message contains commas and quotes.
        assert!(lines[2].contains("\"renderer, quoth it, \"\"died\"\"\""));
    }

    #[test]
    fn markdown_contains_stats_and_table() {
        let rendered = render_benchmark(&sample_benchmark(), ExportFormat::Markdown).unwrap();
        assert!(rendered.contains("# Conversion benchmark"));
        assert!(rendered.contains("Success rate: 50.0%"));
        assert!(rendered.contains("| fast | ok | 120 |"));
    }

    #[test]
    fn text_lists_failures_with_messages() {
        let rendered = render_benchmark(&sample_benchmark(), ExportFormat::Text).unwrap();
        assert!(rendered.contains("Fastest: fast"));
        assert!(rendered.contains("FAILED"));
        assert!(rendered.contains("died"));
    }

    #[test]
    fn fidelity_text_shows_tier_and_checks() {
        let report = sample_fidelity();
        assert_eq!(report.quality_tier, QualityTier::Excellent);
        let rendered = render_fidelity(&report, ExportFormat::Text).unwrap();
        assert!(rendered.contains("excellent"));
        assert!(rendered.contains("unit count      pass"));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_benchmark(&sample_benchmark(), ExportFormat::Json, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"total_attempted\": 2"));
    }
}
