use circle_selector::image::io::write_json_file;
use circle_selector::{load_config, load_trajectory, CircleSelector, ImageDirectory};
use log::info;
use std::env;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: circle-selector <config.json>".to_string()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let path = load_trajectory(&config.trajectory, config.fps)?;
    let frames = ImageDirectory::open(&config.images)?;
    info!(
        "loaded {} poses from {} and {} frames from {}",
        path.len(),
        config.trajectory.display(),
        frames.files().len(),
        config.images.display()
    );

    let mut selector = CircleSelector::new(config.params.clone())
        .with_cache(config.output.cache_json.clone())
        .with_debug_dir(config.output.debug_dir.clone());
    let report = selector.select(&path, &frames)?;

    print!("{}", report.summary());
    if let Some(out) = &config.output.report_json {
        write_json_file(out, &report)?;
        println!("JSON report written to {}", out.display());
    }
    let (start, end): (usize, usize) = report.interval().into();
    println!("{start} {end}");
    Ok(())
}
