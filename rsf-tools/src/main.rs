//! `.rsf` inspection tool: validates a surfel file, compares stored bounds
//! against recomputed extents and writes a JSON summary next to the input.

mod summary;

use std::env;
use std::fs;

use summary::DatasetSummary;
use surfel_format::{decode_file, rsf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.rsf>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let header = rsf::read_header(&fs::read(input_path)?)?;
    println!(
        "Header: {} surfels, data block at byte {}",
        header.count, header.data_offset
    );

    let dataset = decode_file(input_path)?;
    let summary = DatasetSummary::scan(input_path, &header, &dataset);
    summary.print();

    let output_path = format!("{}_summary.json", input_path.trim_end_matches(".rsf"));
    fs::write(&output_path, serde_json::to_string_pretty(&summary)?)?;
    println!("Summary written to {output_path}");

    Ok(())
}
