use clap::Parser;
use std::path::PathBuf;

use gridwarp::ResamplingMethod;

#[derive(Parser, Debug)]
#[command(name = "gridwarp", version, about = "Reproject geo-referenced rasters")]
pub struct CliArgs {
    /// Input raster (single file mode)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Input directory containing GeoTIFFs (batch mode)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output GeoTIFF (single file mode)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (batch mode)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Destination CRS (e.g., EPSG:4326, EPSG:32633, WKT or PROJ string)
    #[arg(long, conflicts_with = "like")]
    pub dst_crs: Option<String>,

    /// Reference raster whose CRS and resolution the output should match
    #[arg(long)]
    pub like: Option<PathBuf>,

    /// Destination pixel size in destination CRS units (not with --like)
    #[arg(long, allow_negative_numbers = true, conflicts_with = "like")]
    pub resolution: Option<f64>,

    /// Resampling kernel
    #[arg(long, value_enum)]
    pub resampling: Option<ResamplingMethod>,

    /// Replace nodata cells with NaN (output becomes float64)
    #[arg(long, default_value_t = false)]
    pub set_nan: bool,

    /// Do not copy source attributes to the output
    #[arg(long, default_value_t = false)]
    pub no_copy_attrs: bool,

    /// Override the input nodata value
    #[arg(long, allow_negative_numbers = true)]
    pub nodata: Option<f64>,

    /// 1-based band to read from the input
    #[arg(long, default_value_t = 1)]
    pub band: usize,

    /// Write a JSON metadata sidecar next to each output
    #[arg(long, default_value_t = false)]
    pub sidecar: bool,

    /// JSON file with reprojection parameters; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Batch mode: continue processing other files when one fails
    #[arg(long, default_value_t = false)]
    pub batch: bool,
}
