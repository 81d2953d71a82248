use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use volunteer_promotion::compare::compare_top_shares;
use volunteer_promotion::config::AnalysisConfig;
use volunteer_promotion::dataset::{apply_score_floor, load_records, scores, DatasetFormat};
use volunteer_promotion::logging::init_tracing;
use volunteer_promotion::report::{
    write_basic_statistics, write_correlations, write_percentile_tables, write_promotion_threshold,
    write_score_probe, write_share_comparison,
};
use volunteer_promotion::stats::correlation_matrix;
use volunteer_promotion::threshold::{compute_threshold, top_share_to_percentile, ThresholdMethod};

#[derive(Parser, Debug)]
#[command(name = "analyze_volunteers")]
#[command(about = "Analyze a volunteer dataset and suggest promotion thresholds")]
struct Args {
    /// Dataset file to analyze
    #[arg(default_value = "volunteers.csv")]
    dataset: PathBuf,

    /// Read the detailed JSON format instead of the summary CSV
    #[arg(long)]
    json: bool,

    /// Only analyze volunteers scoring at least this much
    #[arg(long, value_name = "SCORE")]
    above: Option<f64>,

    /// Promote the top PCT% of volunteers (default: 10)
    #[arg(long, value_name = "PCT")]
    percentile: Option<f64>,

    /// JSON file with analysis settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if self.above.is_some() {
            config.min_score = self.above;
        }
        if let Some(share) = self.percentile {
            config.top_share = share;
        }
        Ok(config)
    }
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.to_config()?;
    let format = if args.json { DatasetFormat::Json } else { DatasetFormat::Csv };

    let mut records = load_records(&args.dataset, format)?;
    tracing::info!(path = %args.dataset.display(), records = records.len(), "loaded dataset");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(min_score) = config.min_score {
        let before = records.len();
        records = apply_score_floor(&records, min_score);
        writeln!(
            out,
            "Filtered to {} volunteers with score >= {} (from {})",
            records.len(),
            min_score,
            before
        )?;
    }
    if records.is_empty() {
        writeln!(out, "No volunteers to analyze.")?;
        return Ok(());
    }

    write_basic_statistics(&mut out, &records)?;
    write_percentile_tables(&mut out, &records)?;

    let totals = scores(&records);
    let target = top_share_to_percentile(config.top_share)?;
    let threshold = compute_threshold(&totals, ThresholdMethod::Percentile, target)?;
    write_promotion_threshold(&mut out, &threshold, config.top_share)?;

    let comparison = compare_top_shares(&totals, config.top_share, &config.common_shares)?;
    write_share_comparison(&mut out, &comparison)?;

    if records.len() > 1 {
        write_correlations(&mut out, &correlation_matrix(&records)?)?;
    }

    write_score_probe(&mut out, &records, config.probe_score, false)?;
    Ok(())
}
