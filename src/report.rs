//! Plain-text reports printed by the command-line tools.

use std::io::{self, Write};

use crate::compare::ShareComparison;
use crate::dataset::{scores, ScoreRecord};
use crate::error::PromotionError;
use crate::stats::{percentile_table, CorrelationMatrix, Metric, Summary, REPORT_PERCENTILES};
use crate::threshold::{qualifying_at, ThresholdResult};

fn to_io(err: PromotionError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

/// Short summary printed after generating a dataset.
pub fn write_dataset_statistics(out: &mut impl Write, records: &[ScoreRecord]) -> io::Result<()> {
    let n = records.len();
    writeln!(out, "\n=== Dataset Statistics ===")?;
    writeln!(out, "Total Volunteers: {}", n)?;
    if n == 0 {
        return Ok(());
    }
    let mean = |metric: Metric| metric.values(records).iter().sum::<f64>() / n as f64;
    writeln!(out, "Average Score: {:.2}", mean(Metric::TotalScore))?;
    writeln!(out, "Average Tasks per Volunteer: {:.2}", mean(Metric::TasksCompleted))?;
    writeln!(out, "Average Mark: {:.2}", mean(Metric::AverageMark))?;
    writeln!(out, "Average Rating: {:.2}", mean(Metric::AverageRating))?;
    let s = Summary::of(&scores(records)).map_err(to_io)?;
    writeln!(out, "Score Range: {} - {}", s.min, s.max)?;
    Ok(())
}

pub fn write_basic_statistics(out: &mut impl Write, records: &[ScoreRecord]) -> io::Result<()> {
    writeln!(out, "=== Basic Dataset Statistics ===")?;
    writeln!(out, "Total volunteers: {}", records.len())?;
    for metric in Metric::all() {
        let s = Summary::of(&metric.values(records)).map_err(to_io)?;
        writeln!(out, "\n{} Statistics:", metric.column())?;
        writeln!(out, "  Mean: {:.2}", s.mean)?;
        writeln!(out, "  Median: {:.2}", s.median)?;
        if *metric == Metric::TotalScore {
            writeln!(out, "  Std Dev: {:.2}", s.std_dev)?;
        }
        writeln!(out, "  Min: {:.2}", s.min)?;
        writeln!(out, "  Max: {:.2}", s.max)?;
    }
    Ok(())
}

pub fn write_percentile_tables(out: &mut impl Write, records: &[ScoreRecord]) -> io::Result<()> {
    writeln!(out, "\n=== Percentile Analysis ===")?;
    for metric in Metric::all() {
        let table = percentile_table(&metric.values(records), &REPORT_PERCENTILES).map_err(to_io)?;
        writeln!(out, "{} Percentiles:", metric.column())?;
        for (p, value) in table {
            match metric {
                Metric::TasksCompleted => writeln!(out, "  {}th percentile: {:.0}", p, value)?,
                Metric::TotalScore => writeln!(out, "  {}th percentile: {:.1}", p, value)?,
                _ => writeln!(out, "  {}th percentile: {:.2}", p, value)?,
            }
        }
    }
    Ok(())
}

/// The cutoff for one "top X%" share.
pub fn write_promotion_threshold(
    out: &mut impl Write,
    result: &ThresholdResult,
    top_share: f64,
) -> io::Result<()> {
    writeln!(out, "\n=== Promotion Threshold Analysis ===")?;
    writeln!(out, "Target: Top {}% of volunteers", top_share)?;
    writeln!(out, "Score Threshold: >= {:.0}", result.cutoff)?;
    writeln!(
        out,
        "Volunteers Promoted: {} ({:.1}%)",
        result.promoted_count, result.promoted_percentage
    )?;
    writeln!(
        out,
        "Expected: ~{:.0} volunteers",
        result.population_size as f64 * top_share / 100.0
    )?;
    Ok(())
}

fn write_row(out: &mut impl Write, label: &str, result: &ThresholdResult) -> io::Result<()> {
    writeln!(
        out,
        "{:<20} {:<12.0} {:<10} {:<11.1}%",
        label, result.cutoff, result.promoted_count, result.promoted_percentage
    )
}

fn describe_delta(delta: i64, what: &str) -> String {
    match delta {
        d if d > 0 => format!("   - Your choice promotes {} MORE volunteers than {}", d, what),
        d if d < 0 => format!("   - Your choice promotes {} FEWER volunteers than {}", -d, what),
        _ => format!("   - Your choice promotes the SAME number as {}", what),
    }
}

pub fn write_share_comparison(out: &mut impl Write, cmp: &ShareComparison) -> io::Result<()> {
    let chosen = cmp.chosen.top_share.unwrap_or_default();
    writeln!(out, "\n=== Promotion Percentile Comparison ===")?;
    writeln!(out, "Comparing your choice (top {}%) with common thresholds", chosen)?;
    writeln!(out, "\n{:<20} {:<12} {:<10} {:<12}", "Method", "Threshold", "Promoted", "Percentage")?;
    writeln!(out, "{}", "-".repeat(55))?;
    write_row(out, &format!("Top {}% (chosen)", chosen), &cmp.chosen.result)?;
    for entry in &cmp.common {
        write_row(out, &format!("Top {}%", entry.top_share.unwrap_or_default()), &entry.result)?;
    }
    writeln!(out, "{}", "-".repeat(55))?;
    write_row(out, "Median Score", &cmp.median)?;
    write_row(out, "Mean Score", &cmp.mean)?;

    writeln!(out, "\nAnalysis:")?;
    for entry in &cmp.common {
        let what = format!("top {}%", entry.top_share.unwrap_or_default());
        writeln!(out, "{}", describe_delta(cmp.delta(&entry.result), &what))?;
    }
    writeln!(out, "{}", describe_delta(cmp.median_delta(), "median threshold"))?;
    writeln!(out, "{}", describe_delta(cmp.mean_delta(), "mean threshold"))?;
    Ok(())
}

pub fn write_correlations(out: &mut impl Write, matrix: &CorrelationMatrix) -> io::Result<()> {
    writeln!(out, "\n=== Performance Correlations ===")?;
    write!(out, "{:<16}", "")?;
    for m in &matrix.metrics {
        write!(out, "{:>16}", m.column())?;
    }
    writeln!(out)?;
    for a in &matrix.metrics {
        write!(out, "{:<16}", a.column())?;
        for b in &matrix.metrics {
            write!(out, "{:>16.3}", matrix.get(*a, *b).unwrap_or(f64::NAN))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// How many volunteers clear a fixed score, optionally listing them.
pub fn write_score_probe(
    out: &mut impl Write,
    records: &[ScoreRecord],
    min_score: f64,
    show_volunteers: bool,
) -> io::Result<()> {
    let qualified = qualifying_at(&scores(records), min_score);
    let pct = if records.is_empty() {
        0.0
    } else {
        qualified.len() as f64 / records.len() as f64 * 100.0
    };
    writeln!(out, "\n=== Testing Score Threshold ===")?;
    writeln!(out, "Criteria: Score >= {}", min_score)?;
    writeln!(out, "Qualified volunteers: {} ({:.1}%)", qualified.len(), pct)?;
    if qualified.is_empty() {
        writeln!(out, "No volunteers meet this criteria. Consider lowering the threshold.")?;
    } else if show_volunteers {
        writeln!(out, "\nQualified volunteers for 'Active Volunteer' promotion:")?;
        for i in qualified {
            writeln!(out, "  {}: Score={}", records[i].name, records[i].total_score)?;
        }
    }
    Ok(())
}
