use std::env;

use icon_matte::{process_image, GaussianAlphaBlur, ProcessingOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 || args.len() > 5 {
        eprintln!(
            "Usage: {} <input_image> <output_png> [threshold] [reference_image]",
            args[0]
        );
        eprintln!("Example: {} icon.png icon_cut.png 30 backdrop.png", args[0]);
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    let input_path = &args[1];
    let output_path = &args[2];
    let threshold: u8 = match args.get(3) {
        Some(value) => value.parse().map_err(|_| "Invalid threshold")?,
        None => 30,
    };
    let reference = match args.get(4) {
        Some(path) => Some(image::open(path)?.to_rgba8()),
        None => None,
    };

    let image = image::open(input_path)?.to_rgba8();
    tracing::info!(
        width = image.width(),
        height = image.height(),
        threshold,
        reference = reference.is_some(),
        "processing"
    );

    let options = ProcessingOptions::new()
        .with_threshold(threshold)
        .with_remove_light_edges(true)
        .with_edge_cleanup(true)
        .with_quality_method(GaussianAlphaBlur::new(1, 1)?);

    let result = process_image(&image, reference.as_ref(), &options)?;
    result.save(output_path)?;

    tracing::info!(output = %output_path, "saved");
    Ok(())
}
