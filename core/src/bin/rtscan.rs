use clap::{Parser, ValueEnum};
use log::error;
use rtlink_core::cli::setup_logging;
use rtlink_core::{ingest_paths, validate, Batch, StudyReport, ValidationConfig};
use std::path::PathBuf;
use std::process;

/// CLI tool listing the studies and series of a set of DICOM files
#[derive(Parser, Debug)]
#[command(name = "rtscan")]
#[command(about = "List studies, series and validation warnings of DICOM files")]
#[command(version)]
struct Cli {
    /// DICOM files or directories (searched recursively)
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Minimum number of instances per image series
    #[arg(long, default_value_t = 1)]
    min_instances: usize,

    /// Require a CT series in every study
    #[arg(long)]
    require_image_series: bool,

    /// Skip the UID format check
    #[arg(long)]
    skip_uid_check: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut batch = match ingest_paths(&cli.paths).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Failed to read input: {}", e);
            eprintln!("Error: Failed to read input: {}", e);
            process::exit(1);
        }
    };

    let config = ValidationConfig::default()
        .with_min_instance_count(cli.min_instances)
        .require_image_series(cli.require_image_series)
        .validate_uids(!cli.skip_uid_check);
    let blocking = validate(&mut batch.studies, &config);

    output_studies(&batch, cli.format);

    if blocking > 0 {
        process::exit(2);
    }
}

fn output_studies(batch: &Batch, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            print!("{}", StudyReport::new(&batch.studies));
            for file in &batch.ignored {
                println!("ignored {}: {}", file.name, file.reason);
            }
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(batch) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = batch;
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(batch: &Batch) -> Result<String, serde_json::Error> {
    use rtlink_core::model::ValueSet;
    use rtlink_core::{IgnoredFile, Warning};
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct SeriesJson<'a> {
        series_instance_uid: Option<&'a str>,
        modality: &'a str,
        description: &'a str,
        date: &'a str,
        instance_count: usize,
        inconsistent_parameters: BTreeMap<&'static str, &'a ValueSet>,
        warnings: &'a [Warning],
    }

    #[derive(Serialize)]
    struct StudyJson<'a> {
        study_instance_uid: Option<&'a str>,
        study_type: String,
        date: &'a str,
        description: &'a str,
        patient_sex: &'a ValueSet,
        patient_birth_date: &'a ValueSet,
        ready: bool,
        warnings: &'a [Warning],
        series: Vec<SeriesJson<'a>>,
    }

    #[derive(Serialize)]
    struct Output<'a> {
        studies: Vec<StudyJson<'a>>,
        ignored: &'a [IgnoredFile],
    }

    let studies = batch
        .studies
        .studies()
        .map(|study| StudyJson {
            study_instance_uid: study.study_instance_uid().ok(),
            study_type: study.study_type(),
            date: &study.study_date,
            description: &study.study_description,
            patient_sex: &study.patient_sex,
            patient_birth_date: &study.patient_birth_date,
            ready: study.is_ready(),
            warnings: &study.warnings,
            series: study
                .series()
                .map(|series| SeriesJson {
                    series_instance_uid: series.series_instance_uid().ok(),
                    modality: &series.modality_code,
                    description: &series.series_description,
                    date: &series.series_date,
                    instance_count: series.instance_count(),
                    inconsistent_parameters: series.inconsistent_parameters().collect(),
                    warnings: &series.warnings,
                })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&Output {
        studies,
        ignored: &batch.ignored,
    })
}
