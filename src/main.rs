use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use volunteer_promotion::config::GeneratorConfig;
use volunteer_promotion::dataset::{save_detailed_json, save_summary_csv, summary_records};
use volunteer_promotion::logging::init_tracing;
use volunteer_promotion::names::NameRegistry;
use volunteer_promotion::population::PopulationGenerator;
use volunteer_promotion::report::write_dataset_statistics;

#[derive(Parser, Debug)]
#[command(name = "volunteer_promotion")]
#[command(about = "Generate volunteer performance datasets")]
struct Args {
    /// Number of volunteers to generate (default: 50)
    #[arg(long)]
    size: Option<usize>,

    /// Fraction of high performers (default: 0.20)
    #[arg(long)]
    high_performers: Option<f64>,

    /// Fraction of low performers (default: 0.20)
    #[arg(long)]
    low_performers: Option<f64>,

    /// Minimum tasks per volunteer (default: 3)
    #[arg(long)]
    min_tasks: Option<u32>,

    /// Maximum tasks per volunteer (default: 15)
    #[arg(long)]
    max_tasks: Option<u32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output filename prefix (default: volunteers)
    #[arg(short, long)]
    output: Option<String>,

    /// Also generate detailed JSON with all tasks
    #[arg(long)]
    detailed: bool,

    /// Date task dates count back from, YYYY-MM-DD (default: today).
    /// Fix it together with --seed for byte-identical datasets.
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// JSON file with generator settings; flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file replacing the embedded name lists
    #[arg(long)]
    names: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(size) = self.size {
            config.size = size;
        }
        if let Some(high) = self.high_performers {
            config.high_performers = high;
        }
        if let Some(low) = self.low_performers {
            config.low_performers = low;
        }
        if let Some(min) = self.min_tasks {
            config.min_tasks = min;
        }
        if let Some(max) = self.max_tasks {
            config.max_tasks = max;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        config.detailed |= self.detailed;
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
    let ratios = config.ratios()?;
    let task_range = config.task_range()?;

    // Initialize RNG
    let seed = config.seed.unwrap_or_else(|| rand::random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let reference_date = args.reference_date.unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(seed, %reference_date, size = config.size, "generating dataset");

    let mut generator = PopulationGenerator::new(reference_date);
    if let Some(path) = &args.names {
        generator = generator.with_registry(NameRegistry::load_from(path)?);
    }
    let population = generator.generate(config.size, &ratios, task_range, &mut rng)?;
    let records = summary_records(&population);

    let csv_path = PathBuf::from(format!("{}.csv", config.output));
    save_summary_csv(&records, &csv_path)?;
    println!("Dataset saved to {}", csv_path.display());

    if config.detailed {
        let json_path = PathBuf::from(format!("{}_detailed.json", config.output));
        save_detailed_json(&population, &json_path)?;
        println!("Detailed dataset saved to {}", json_path.display());
    }

    let stdout = std::io::stdout();
    write_dataset_statistics(&mut stdout.lock(), &records)?;
    Ok(())
}
