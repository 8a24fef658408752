extern crate image as image_rs;
extern crate sift;

use std::path::Path;
use color_eyre::eyre::Result;
use flexi_logger::Logger;
use log::info;

use sift::{Image, SiftRuntimeParams, extract_feature_vectors};
use sift::visualize::draw_feature_vectors;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let mut args = std::env::args().skip(1);
    let image_path = args.next().unwrap_or_else(|| String::from("images/circles.png"));
    let image_out_path = args.next().unwrap_or_else(|| String::from("output/circles_keypoints.png"));
    let runtime_params = match args.next() {
        Some(config_path) => SiftRuntimeParams::from_yaml_str(&std::fs::read_to_string(config_path)?)?,
        None => SiftRuntimeParams::default()
    };
    info!("{}", runtime_params);

    let gray_image = image_rs::open(&Path::new(&image_path))?.to_luma8();
    let image = Image::from_gray_image(&gray_image, false);

    let feature_vectors = extract_feature_vectors(&image, &runtime_params)?;
    info!("{} features from {}x{} image", feature_vectors.len(), image.width(), image.height());

    let display = draw_feature_vectors(&image, &feature_vectors);
    display.to_image().save(&image_out_path)?;
    info!("wrote {}", image_out_path);

    Ok(())
}
