#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `waterborne`: predicts waterborne disease case counts and risk levels
//! from water-quality samples.
//!
//! Without a subcommand it runs the interactive form. `predict` takes a
//! sample from a JSON file or flags, `columns` and `vocabulary` print the
//! encoding contract the model artifacts must match.

mod interactive;
mod render;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use waterborne_input_models::{CanonicalInput, InputRecord};
use waterborne_predict::{
    PredictError, PredictionContext, PredictorConfig, predict, predict_report,
};
use waterborne_predict_models::PredictionMode;

/// Predict waterborne disease cases and risk level.
#[derive(Parser)]
#[command(name = "waterborne")]
#[command(about = "Predict waterborne disease cases and risk level from water-quality samples")]
struct Cli {
    /// Path to a `waterborne.toml` config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute (default: interactive).
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in a sample interactively.
    Interactive,

    /// Predict from a JSON file or command-line fields.
    Predict(PredictArgs),

    /// Print the regression and classification column orders.
    Columns,

    /// Print the category vocabulary.
    Vocabulary,
}

#[derive(Args)]
struct PredictArgs {
    /// JSON file holding one sample. Replaces the field flags.
    #[arg(long, conflicts_with_all = [
        "region", "community", "season", "turbidity", "ecoli_count",
        "nitrate", "ph", "year", "month",
    ])]
    input: Option<PathBuf>,

    /// Region, e.g. "Urban Slum".
    #[arg(long)]
    region: Option<String>,

    /// Community, e.g. "Kibera".
    #[arg(long)]
    community: Option<String>,

    /// "Dry" or "Rainy".
    #[arg(long)]
    season: Option<String>,

    /// Turbidity in NTU.
    #[arg(long)]
    turbidity: Option<f64>,

    /// E. coli count in CFU/100ml.
    #[arg(long)]
    ecoli_count: Option<i64>,

    /// Nitrate in mg/L.
    #[arg(long)]
    nitrate: Option<f64>,

    #[arg(long)]
    ph: Option<f64>,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    month: Option<i32>,

    /// Which prediction to make.
    #[arg(long, value_enum, default_value = "both")]
    mode: ModeArg,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

/// Prediction mode as chosen on the command line or in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Case count and risk level.
    Both,
    CaseCount,
    RiskLevel,
}

impl ModeArg {
    const ALL: &[Self] = &[Self::Both, Self::CaseCount, Self::RiskLevel];

    #[must_use]
    const fn label(self) -> &'static str {
        match self {
            Self::Both => "Case count and risk level",
            Self::CaseCount => PredictionMode::CaseCount.label(),
            Self::RiskLevel => PredictionMode::RiskLevel.label(),
        }
    }

    const fn single(self) -> Option<PredictionMode> {
        match self {
            Self::Both => None,
            Self::CaseCount => Some(PredictionMode::CaseCount),
            Self::RiskLevel => Some(PredictionMode::RiskLevel),
        }
    }
}

/// Errors assembling a sample from `predict` arguments.
#[derive(Debug, Error)]
enum SampleError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid sample in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing {}; pass them or use --input", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl PredictArgs {
    fn record(&self) -> Result<InputRecord, SampleError> {
        if let Some(path) = &self.input {
            return read_record(path);
        }

        let mut missing = Vec::new();
        let mut need = |name: &'static str, present: bool| {
            if !present {
                missing.push(name);
            }
        };
        need("--region", self.region.is_some());
        need("--community", self.community.is_some());
        need("--season", self.season.is_some());
        need("--turbidity", self.turbidity.is_some());
        need("--ecoli-count", self.ecoli_count.is_some());
        need("--nitrate", self.nitrate.is_some());
        need("--ph", self.ph.is_some());
        need("--year", self.year.is_some());
        need("--month", self.month.is_some());

        match (
            &self.region,
            &self.community,
            &self.season,
            self.turbidity,
            self.ecoli_count,
            self.nitrate,
            self.ph,
            self.year,
            self.month,
        ) {
            (
                Some(region),
                Some(community),
                Some(season),
                Some(turbidity),
                Some(ecoli_count),
                Some(nitrate),
                Some(ph),
                Some(year),
                Some(month),
            ) => Ok(InputRecord {
                region: region.clone(),
                community: community.clone(),
                season: season.clone(),
                turbidity,
                ecoli_count,
                nitrate,
                ph,
                year,
                month,
            }),
            _ => Err(SampleError::MissingFields(missing)),
        }
    }
}

fn read_record(path: &Path) -> Result<InputRecord, SampleError> {
    let text = std::fs::read_to_string(path).map_err(|source| SampleError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| SampleError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors producing the output for one prediction.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("Failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runs `mode` on `input` and renders the outcome as text or JSON.
///
/// # Errors
///
/// Returns [`RunError`] if the prediction fails or the result cannot be
/// serialized.
pub fn run_mode(
    context: &PredictionContext,
    mode: ModeArg,
    input: &CanonicalInput,
    json: bool,
) -> Result<String, RunError> {
    let rendered = match mode.single() {
        None => {
            let report = predict_report(context, input)?;
            if json {
                serde_json::to_string_pretty(&report)?
            } else {
                render::report(&report)
            }
        }
        Some(mode) => {
            let result = predict(context, mode, input)?;
            if json {
                serde_json::to_string_pretty(&result)?
            } else {
                render::result(&result)
            }
        }
    };
    Ok(rendered)
}

fn load_context(config: Option<&Path>) -> Result<PredictionContext, Box<dyn std::error::Error>> {
    let config = PredictorConfig::load(config)?;
    Ok(PredictionContext::load(&config)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let context = load_context(cli.config.as_deref())?;
            interactive::run(&context)?;
        }
        Commands::Predict(args) => {
            let input = CanonicalInput::try_from(args.record()?)?;
            let context = load_context(cli.config.as_deref())?;
            println!("{}", run_mode(&context, args.mode, &input, args.json)?);
        }
        Commands::Columns => print!("{}", render::columns()),
        Commands::Vocabulary => print!("{}", render::vocabulary()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_predict_flags() {
        let cli = Cli::try_parse_from([
            "waterborne",
            "predict",
            "--region",
            "Urban Slum",
            "--community",
            "Kibera",
            "--season",
            "Rainy",
            "--turbidity",
            "1",
            "--ecoli-count",
            "0",
            "--nitrate",
            "1",
            "--ph",
            "7",
            "--year",
            "2023",
            "--month",
            "6",
            "--mode",
            "risk-level",
        ])
        .unwrap();
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict subcommand");
        };
        assert_eq!(args.mode, ModeArg::RiskLevel);
        let record = args.record().unwrap();
        assert_eq!(record.community, "Kibera");
        assert_eq!(record.month, 6);
        assert!(CanonicalInput::try_from(record).is_ok());
    }

    #[test]
    fn missing_flags_are_listed() {
        let cli = Cli::try_parse_from(["waterborne", "predict", "--region", "Rural"]).unwrap();
        let Some(Commands::Predict(args)) = cli.command else {
            panic!("expected predict subcommand");
        };
        assert_eq!(args.mode, ModeArg::Both);
        let err = args.record().unwrap_err();
        let SampleError::MissingFields(missing) = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(missing.len(), 8);
        assert!(!missing.contains(&"--region"));
        assert!(missing.contains(&"--ecoli-count"));
    }

    #[test]
    fn input_file_conflicts_with_field_flags() {
        assert!(
            Cli::try_parse_from([
                "waterborne",
                "predict",
                "--input",
                "sample.json",
                "--region",
                "Rural",
            ])
            .is_err()
        );
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["waterborne", "--config", "custom.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }

    fn bundled_context() -> PredictionContext {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = PredictorConfig::from_toml("", Some(&root)).unwrap();
        PredictionContext::load(&config).unwrap()
    }

    fn kibera() -> CanonicalInput {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample.json");
        CanonicalInput::try_from(read_record(&path).unwrap()).unwrap()
    }

    #[test]
    fn json_output_is_parseable_report() {
        let text = run_mode(&bundled_context(), ModeArg::Both, &kibera(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["case_count"], 96);
        assert_eq!(value["risk"]["label"], "Low");
        assert_eq!(value["risk"]["confidence"]["status"], "available");
    }

    #[test]
    fn text_output_for_single_mode() {
        let text = run_mode(&bundled_context(), ModeArg::CaseCount, &kibera(), false).unwrap();
        assert_eq!(text, "Estimated Total Waterborne Cases: 96");
    }

    #[test]
    fn every_mode_has_a_label() {
        for mode in ModeArg::ALL {
            assert!(!mode.label().is_empty());
        }
        assert_eq!(ModeArg::Both.single(), None);
        assert_eq!(ModeArg::CaseCount.single(), Some(PredictionMode::CaseCount));
    }
}
