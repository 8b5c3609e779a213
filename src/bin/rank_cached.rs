//! Re-rank a metric cache written by `circle-selector` without touching
//! images or the trajectory.
//!
//! Usage: `rank_cached <cache.json> [ranked.json]`

use circle_selector::cache::read_records;
use circle_selector::image::io::write_json_file;
use circle_selector::ranking::find_best_interval;
use circle_selector::Metric;
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
    "Usage: rank_cached <cache.json> [ranked.json]".to_string()
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let cache_path = args.next().ok_or_else(usage)?;
    let out_path = args.next();

    let mut records = read_records(Path::new(&cache_path))?;
    let best = find_best_interval(&mut records)?;

    for (rank, record) in records.iter().enumerate() {
        println!(
            "#{:<3} {:<12} combined={:.4}",
            rank + 1,
            record.interval.to_string(),
            record.get(Metric::CombinedCvError).unwrap_or_default()
        );
    }
    if let Some(out) = out_path {
        write_json_file(Path::new(&out), &records)?;
        println!("Ranked records written to {out}");
    }
    let (start, end): (usize, usize) = best.interval.into();
    println!("{start} {end}");
    Ok(())
}
