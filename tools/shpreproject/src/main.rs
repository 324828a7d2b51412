use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use env_logger::{Env, TimestampPrecision};
use reproject::{Epsg, ReprojectionOptions, ReprojectionOutput, TransformFailurePolicy};
use strum::EnumString;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab_case")]
pub enum OnError {
    Abort,
    Skip,
    Sentinel,
}

#[derive(Parser, Debug)]
#[clap(name = "shpreproject", about = "Reproject a polygon shapefile to another spatial reference")]
pub struct Opt {
    #[arg(long = "input", short = 'i')]
    pub input: PathBuf,

    #[arg(long = "epsg", short = 'e', default_value = "4326", value_name = "code|EPSG:code")]
    pub epsg: Epsg,

    #[arg(long = "margin", short = 'm', help = "Bounding box padding in target units [default: 0.1]")]
    pub margin: Option<f64>,

    #[arg(long = "suffix", help = "Appended to the input name to name the output [default: -reprojected]")]
    pub suffix: Option<String>,

    #[arg(long = "layer")]
    pub layer: Option<String>,

    #[arg(long = "on-error", value_name = "abort|skip|sentinel")]
    pub on_error: Option<OnError>,

    #[arg(long = "sentinel", help = "Coordinate value for vertices that cannot be transformed")]
    pub sentinel: Option<f64>,

    #[arg(long = "proj-db")]
    pub proj_db: Option<PathBuf>,

    #[arg(long = "gdal-debug")]
    pub gdal_debug: bool,
}

fn failure_policy(on_error: Option<OnError>, sentinel: Option<f64>) -> Result<TransformFailurePolicy> {
    Ok(match (on_error, sentinel) {
        (Some(OnError::Sentinel), Some(value)) => TransformFailurePolicy::Sentinel(value),
        (Some(OnError::Sentinel), None) => bail!("--on-error sentinel requires a --sentinel value"),
        (_, Some(_)) => bail!("--sentinel can only be used in combination with --on-error sentinel"),
        (None | Some(OnError::Abort), None) => TransformFailurePolicy::Abort,
        (Some(OnError::Skip), None) => TransformFailurePolicy::SkipFeature,
    })
}

fn reprojection_options(opt: &Opt) -> Result<ReprojectionOptions> {
    Ok(ReprojectionOptions::builder()
        .target(opt.epsg)
        .maybe_margin(opt.margin)
        .maybe_output_suffix(opt.suffix.as_deref())
        .on_transform_error(failure_policy(opt.on_error, opt.sentinel)?)
        .maybe_layer(opt.layer.as_deref())
        .build())
}

fn print_summary(output: &ReprojectionOutput) {
    println!("Output: {}", output.output_path.display());
    println!("Projection: {}", output.projection_path.display());
    println!("Features: {} read, {} written", output.features_read, output.features_written);

    if !output.skipped_features.is_empty() {
        let ids: Vec<String> = output
            .skipped_features
            .iter()
            .map(|fid| fid.map_or("-".to_string(), |fid| fid.to_string()))
            .collect();
        println!("Skipped features: {}", ids.join(", "));
    }

    match &output.bounding_box {
        Some(bbox) => println!("Bounding box: {} {} {} {}", bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y),
        None => println!("Bounding box: not available"),
    }
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let gdal_config = reproject::RuntimeConfiguration::builder()
        .maybe_proj_db(opt.proj_db.as_deref())
        .gdal_debug_log(opt.gdal_debug)
        .build();
    gdal_config.apply()?;

    let options = reprojection_options(&opt)?;

    let output = reproject::reproject_dataset(&opt.input, &options)?;
    print_summary(&output);

    Ok(())
}
