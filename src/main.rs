use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use nutrition_rag::Result;
use nutrition_rag::commands::{ingest, init_config, recommend, show_config, status};
use nutrition_rag::recommend::LabPanel;

#[derive(Parser)]
#[command(name = "nutrition-rag")]
#[command(
    about = "Evidence-based nutrition recommendations from lab panels, grounded in clinical guideline documents"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration
    Config {
        /// Write the configuration file so it can be edited
        #[arg(long)]
        init: bool,
    },
    /// Ingest a guideline document or a directory tree of documents
    Ingest {
        /// File or directory to ingest; defaults to the configured docs directory
        path: Option<PathBuf>,
    },
    /// Generate a nutrition recommendation from lab values
    Recommend {
        #[command(flatten)]
        labs: LabArgs,
    },
    /// Show service health and collection statistics
    Status,
}

#[derive(Args)]
struct LabArgs {
    /// Fasting glucose in mg/dL
    #[arg(long)]
    glucose_fasting: Option<f64>,
    /// A1C percentage
    #[arg(long)]
    a1c: Option<f64>,
    /// Total cholesterol in mg/dL
    #[arg(long)]
    total_cholesterol: Option<f64>,
    /// LDL cholesterol in mg/dL
    #[arg(long)]
    ldl: Option<f64>,
    /// HDL cholesterol in mg/dL
    #[arg(long)]
    hdl: Option<f64>,
    /// Triglycerides in mg/dL
    #[arg(long)]
    triglycerides: Option<f64>,
    /// Systolic blood pressure in mmHg
    #[arg(long)]
    systolic_bp: Option<f64>,
    /// Diastolic blood pressure in mmHg
    #[arg(long)]
    diastolic_bp: Option<f64>,
    /// Body mass index
    #[arg(long)]
    bmi: Option<f64>,
    /// Estimated glomerular filtration rate
    #[arg(long)]
    egfr: Option<f64>,
}

impl From<LabArgs> for LabPanel {
    fn from(labs: LabArgs) -> Self {
        Self {
            glucose_fasting: labs.glucose_fasting,
            a1c: labs.a1c,
            total_cholesterol: labs.total_cholesterol,
            ldl: labs.ldl,
            hdl: labs.hdl,
            triglycerides: labs.triglycerides,
            systolic_bp: labs.systolic_bp,
            diastolic_bp: labs.diastolic_bp,
            bmi: labs.bmi,
            egfr: labs.egfr,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { init } => {
            if init {
                init_config()?;
            } else {
                show_config()?;
            }
        }
        Commands::Ingest { path } => {
            ingest(path.as_deref())?;
        }
        Commands::Recommend { labs } => {
            recommend(&labs.into())?;
        }
        Commands::Status => {
            status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["nutrition-rag", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ingest_with_optional_path() {
        let cli = Cli::try_parse_from(["nutrition-rag", "ingest"]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["nutrition-rag", "ingest", "/docs/guidelines"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { path } = parsed.command {
                assert_eq!(path, Some(PathBuf::from("/docs/guidelines")));
            }
        }
    }

    #[test]
    fn recommend_collects_lab_flags() {
        let cli = Cli::try_parse_from([
            "nutrition-rag",
            "recommend",
            "--a1c",
            "7.1",
            "--ldl",
            "150",
            "--systolic-bp",
            "145",
        ]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Recommend { labs } = parsed.command {
                let panel: LabPanel = labs.into();
                assert_eq!(panel.a1c, Some(7.1));
                assert_eq!(panel.ldl, Some(150.0));
                assert_eq!(panel.systolic_bp, Some(145.0));
                assert_eq!(panel.glucose_fasting, None);
            }
        }
    }

    #[test]
    fn recommend_accepts_no_flags() {
        // Validation of an empty panel happens in the pipeline, not the
        // argument parser.
        let cli = Cli::try_parse_from(["nutrition-rag", "recommend"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn config_init_flag() {
        let cli = Cli::try_parse_from(["nutrition-rag", "config", "--init"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { init } = parsed.command {
                assert!(init);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["nutrition-rag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["nutrition-rag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
