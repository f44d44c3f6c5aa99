use std::io::Write;

use convbench_core::{BenchmarkReport, ConversionOutcome, FidelityReport, QualityTier};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one conversion outcome.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &ConversionOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    if outcome.success {
        let label = if color.enabled() {
            format!("{}", "OK".green())
        } else {
            "OK".to_string()
        };
        writeln!(
            w,
            "{} {} in {} ms ({} -> {} bytes)",
            label, outcome.method, outcome.duration_ms, outcome.original_size, outcome.output_size
        )?;
        if let Some(artifact) = &outcome.artifact {
            writeln!(w, "   artifact: {artifact}")?;
        }
    } else {
        let label = if color.enabled() {
            format!("{}", "FAILED".red())
        } else {
            "FAILED".to_string()
        };
        writeln!(
            w,
            "{} {} after {} ms: {}",
            label,
            outcome.method,
            outcome.duration_ms,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        )?;
    }
    Ok(())
}

/// Print the benchmark summary: stats header, per-converter lines, and the
/// fidelity ranking when present.
pub fn print_benchmark(
    w: &mut dyn Write,
    report: &BenchmarkReport,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Attempted {} converter(s), success rate {:.1}%, average {:.1} ms",
        report.total_attempted,
        report.success_rate * 100.0,
        report.average_duration_ms
    )?;
    match (&report.fastest_method, &report.slowest_method) {
        (Some(fastest), Some(slowest)) => {
            writeln!(w, "Fastest: {fastest}  Slowest: {slowest}")?;
        }
        _ => writeln!(w, "No successful conversions")?,
    }
    writeln!(w)?;

    for outcome in &report.outcomes {
        write!(w, "  ")?;
        print_outcome(w, outcome, color)?;
    }

    if let Some(rankings) = &report.rankings {
        writeln!(w)?;
        writeln!(w, "Fidelity ranking:")?;
        for (i, fidelity) in rankings.iter().enumerate() {
            print_ranked(w, i + 1, fidelity, color)?;
        }
    }
    Ok(())
}

fn print_ranked(
    w: &mut dyn Write,
    rank: usize,
    report: &FidelityReport,
    color: ColorMode,
) -> std::io::Result<()> {
    if let Some(error) = &report.validation_error {
        return writeln!(
            w,
            "  #{rank} {} validation error: {error}",
            report.converter_name
        );
    }
    writeln!(
        w,
        "  #{rank} {:<16} score {:.3} {}",
        report.converter_name,
        report.overall_score,
        tier_label(report.quality_tier, color)
    )
}

/// Print a full fidelity report with per-check detail.
pub fn print_fidelity(
    w: &mut dyn Write,
    report: &FidelityReport,
    color: ColorMode,
) -> std::io::Result<()> {
    if let Some(error) = &report.validation_error {
        let label = if color.enabled() {
            format!("{}", "VALIDATION ERROR".red())
        } else {
            "VALIDATION ERROR".to_string()
        };
        writeln!(w, "{label} ({}): {error}", report.converter_name)?;
        return Ok(());
    }

    writeln!(
        w,
        "{}: score {:.3} {}",
        report.converter_name,
        report.overall_score,
        tier_label(report.quality_tier, color)
    )?;
    writeln!(
        w,
        "  unit count      {} (expected {}, got {})",
        check(report.unit_count_accurate, color),
        report.expected_unit_count,
        report.actual_unit_count
    )?;
    writeln!(
        w,
        "  text similarity {} ({:.2}%)",
        check(report.text_accurate, color),
        report.text_similarity * 100.0
    )?;
    writeln!(
        w,
        "  script chars    {} ({:.2}%, {} of {})",
        check(report.script_accurate, color),
        report.script_accuracy * 100.0,
        report.output_script_chars,
        report.original_script_chars
    )?;
    writeln!(
        w,
        "  structure       {}",
        check(report.structure_intact, color)
    )?;
    for issue in &report.issues {
        if color.enabled() {
            writeln!(w, "  {} {}", "!".yellow(), issue)?;
        } else {
            writeln!(w, "  ! {issue}")?;
        }
    }
    Ok(())
}

/// Print the converter list with availability markers.
pub fn print_converters(
    w: &mut dyn Write,
    converters: &[(String, bool)],
    color: ColorMode,
) -> std::io::Result<()> {
    if converters.is_empty() {
        writeln!(w, "No converters configured")?;
        return Ok(());
    }
    for (name, available) in converters {
        let marker = match (available, color.enabled()) {
            (true, true) => format!("{}", "available".green()),
            (true, false) => "available".to_string(),
            (false, true) => format!("{}", "unavailable".dimmed()),
            (false, false) => "unavailable".to_string(),
        };
        writeln!(w, "  {name:<20} {marker}")?;
    }
    Ok(())
}

fn tier_label(tier: QualityTier, color: ColorMode) -> String {
    if !color.enabled() {
        return format!("({tier})");
    }
    match tier {
        QualityTier::Excellent => format!("({})", tier.green()),
        QualityTier::Good => format!("({})", tier.cyan()),
        QualityTier::Fair => format!("({})", tier.yellow()),
        QualityTier::Poor => format!("({})", tier.red()),
    }
}

fn check(ok: bool, color: ColorMode) -> String {
    match (ok, color.enabled()) {
        (true, true) => format!("{}", "pass".green()),
        (true, false) => "pass".to_string(),
        (false, true) => format!("{}", "FAIL".red()),
        (false, false) => "FAIL".to_string(),
    }
}
