//! `dashlens color`: query the color scale engine.

use dashlens_core::color::{ColorScale, ValueRange, contrast_text};

pub fn run(value: f64, data_csv: &str, stops: Option<&str>, config_path: Option<&str>) {
    let config = super::load_config(config_path);
    let data = match super::parse_numbers(data_csv) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Invalid --data: {e}");
            std::process::exit(1);
        }
    };
    let stops = stops
        .map(super::parse_stops)
        .unwrap_or_else(|| config.palette.color_scale.clone());
    let scale = match ColorScale::new(&stops) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid --stops: {e}");
            std::process::exit(1);
        }
    };

    let range = ValueRange::of(&data);
    let normalized = range.map_or(0.0, |r| r.normalize(value));
    let (color, rgb) = scale.resolve(normalized);

    println!("value       {value}");
    match range {
        Some(r) => println!("range       [{}, {}]", r.min, r.max),
        None => println!("range       (empty)"),
    }
    println!("normalized  {normalized:.4}");
    println!("color       {color}");
    println!("hex         {}", rgb.to_hex());
    println!("luminance   {:.2}", rgb.luminance());
    println!("text        {}", contrast_text(rgb).css());
}
