use std::fs;
use std::path::Path;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridwarp::api::{
    FileOptions, ReprojectTarget, process_directory_to_path, reproject_file_to_path,
};
use gridwarp::{Crs, ReprojectParams};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_params(config: Option<&Path>) -> Result<ReprojectParams, AppError> {
    match config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let params: ReprojectParams = serde_json::from_str(&text)?;
            info!("Loaded parameters from {:?}", path);
            Ok(params)
        }
        None => Ok(ReprojectParams::default()),
    }
}

/// Layer command line flags over file/default parameters
fn build_params(args: &CliArgs) -> Result<ReprojectParams, AppError> {
    let mut params = load_params(args.config.as_deref())?;
    if let Some(resolution) = args.resolution {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(AppError::InvalidResolution { resolution });
        }
        params = params.with_resolution(resolution);
    }
    if let Some(resampling) = args.resampling {
        params = params.with_resampling(resampling);
    }
    if args.set_nan {
        params = params.with_missing_as_nan(true);
    }
    if args.no_copy_attrs {
        params = params.with_copy_attributes(false);
    }
    Ok(params)
}

fn build_target(args: &CliArgs) -> Result<ReprojectTarget, AppError> {
    match (&args.dst_crs, &args.like) {
        (Some(crs), _) => Ok(ReprojectTarget::Crs(Crs::from(crs.as_str()))),
        (None, Some(path)) => Ok(ReprojectTarget::Like(path.clone())),
        (None, None) => Err(AppError::MissingTarget),
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    if args.band == 0 {
        return Err(AppError::ZeroBand.into());
    }
    let params = build_params(&args)?;
    let target = build_target(&args)?;
    if let (ReprojectTarget::Like(path), Some(resolution)) = (&target, params.dst_resolution) {
        warn!(
            "Configured resolution {} is ignored; output follows the grid of {:?}",
            resolution, path
        );
    }
    let options = FileOptions {
        band: args.band,
        sidecar: args.sidecar,
        nodata: args.nodata,
    };
    info!("Target: {:?}, parameters: {:?}", target, params);

    let batch_mode = args.batch || args.input_dir.is_some();

    if batch_mode {
        let input_dir = args.input_dir.ok_or(AppError::MissingArgument {
            arg: "--input-dir".to_string(),
        })?;
        let output_dir = args.output_dir.ok_or(AppError::MissingArgument {
            arg: "--output-dir".to_string(),
        })?;

        info!("Starting batch processing from directory: {:?}", input_dir);
        info!("Output directory: {:?}", output_dir);

        let report = process_directory_to_path(
            &input_dir,
            &output_dir,
            &target,
            &params,
            &options,
            args.batch,
        )
        .map_err(AppError::from)?;

        info!("Batch processing complete!");
        info!("Processed: {}", report.processed);
        info!("Skipped: {}", report.skipped);
        info!("Errors: {}", report.errors);
    } else {
        let input = args.input.ok_or(AppError::MissingArgument {
            arg: "--input".to_string(),
        })?;
        let output = args.output.ok_or(AppError::MissingArgument {
            arg: "--output".to_string(),
        })?;

        reproject_file_to_path(&input, &output, &target, &params, &options)
            .map_err(AppError::from)?;
        info!("Successfully processed: {:?} -> {:?}", input, output);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gridwarp::ResamplingMethod;

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("params.json");
        fs::write(
            &config,
            r#"{"resampling": "bilinear", "dst_resolution": 30.0, "set_missing_to_nan": false}"#,
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "gridwarp",
            "--input",
            "in.tif",
            "--output",
            "out.tif",
            "--dst-crs",
            "EPSG:3857",
            "--set-nan",
            "--resampling",
            "cubic-spline",
            "--config",
            config.to_str().unwrap(),
        ]);
        let params = build_params(&args).unwrap();
        assert_eq!(params.resampling, ResamplingMethod::CubicSpline);
        assert_eq!(params.dst_resolution, Some(30.0));
        assert!(params.set_missing_to_nan);
        assert_eq!(
            build_target(&args).unwrap(),
            ReprojectTarget::Crs(Crs::from("EPSG:3857"))
        );
    }

    #[test]
    fn test_target_required_and_resolution_positive() {
        let args = CliArgs::parse_from(["gridwarp", "-i", "a.tif", "-o", "b.tif"]);
        assert!(matches!(build_target(&args), Err(AppError::MissingTarget)));

        let args = CliArgs::parse_from([
            "gridwarp",
            "--dst-crs",
            "EPSG:4326",
            "--resolution",
            "-5",
        ]);
        assert!(matches!(
            build_params(&args),
            Err(AppError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_resolution_conflicts_with_like() {
        let parsed = CliArgs::try_parse_from([
            "gridwarp",
            "--like",
            "ref.tif",
            "--resolution",
            "30",
        ]);
        assert!(parsed.is_err());

        let parsed = CliArgs::try_parse_from(["gridwarp", "--like", "ref.tif", "--set-nan"]);
        assert!(parsed.is_ok());
    }
}
