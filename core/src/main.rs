use clap::Parser;
use fetalscan_core::cli::{Cli, OutputFormat};
use fetalscan_core::processing::open_grayscale;
use fetalscan_core::{
    AnalyzerConfig, Assessment, FetalBiometryAnalyzer, FetalscanError, NullModel,
    PrecomputedMask, ReferenceData, SegmentationModel, Target, TextReport,
};
use image::GrayImage;
use log::{error, info};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    info!("Processing file: {}", cli.image.display());

    let image = match open_grayscale(&cli.image) {
        Ok(image) => image,
        Err(e) => fail(&e),
    };

    let reference = match load_reference(&cli) {
        Ok(reference) => reference,
        Err(e) => fail(&e),
    };

    let mut config = AnalyzerConfig::default().with_pixel_spacing(cli.pixel_spacing);
    if let Some(dir) = &cli.debug_dir {
        config = config.with_debug_dir(dir);
    }

    let target: Target = cli.target.into();
    let result = match &cli.mask {
        Some(path) => match PrecomputedMask::open(path) {
            Ok(model) => {
                info!("Using precomputed mask: {}", path.display());
                analyze(model, reference, config, &image, &cli, target)
            }
            Err(e) => fail(&e),
        },
        None => {
            info!("No mask given, using the fallback segmenter");
            analyze(NullModel, reference, config, &image, &cli, target)
        }
    };

    match result {
        Ok(assessment) => {
            if let Some(path) = &cli.annotate {
                if let Err(e) = assessment.annotate(&image).save(path) {
                    fail(&FetalscanError::from(e));
                }
                info!("Wrote annotation to {}", path.display());
            }
            output_assessment(&assessment, cli.format);
        }
        Err(e) => fail(&e),
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn analyze<M: SegmentationModel>(
    model: M,
    reference: ReferenceData,
    config: AnalyzerConfig,
    image: &GrayImage,
    cli: &Cli,
    target: Target,
) -> fetalscan_core::Result<Assessment> {
    FetalBiometryAnalyzer::new(model, reference, config).analyze(image, cli.age, target)
}

fn load_reference(cli: &Cli) -> fetalscan_core::Result<ReferenceData> {
    let Some(path) = &cli.reference else {
        return Ok(ReferenceData::default());
    };

    #[cfg(feature = "json")]
    {
        info!("Loading reference table: {}", path.display());
        ReferenceData::from_file(path)
    }
    #[cfg(not(feature = "json"))]
    {
        Err(FetalscanError::InvalidValue(format!(
            "Cannot load {}: reference files require the 'json' feature",
            path.display()
        )))
    }
}

/// Prints the error and exits with 2 for input errors, 1 otherwise
fn fail(e: &FetalscanError) -> ! {
    error!("{}", e);
    eprintln!("Error: {}", e.user_message());
    eprintln!("Details: {}", e);
    process::exit(if e.is_input_error() { 2 } else { 1 });
}

fn output_assessment(assessment: &Assessment, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            let report = TextReport::new(assessment);
            println!("{}", report);
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(assessment) {
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
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
