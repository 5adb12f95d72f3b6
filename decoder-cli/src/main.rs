use clap::Parser;
use std::path::PathBuf;

use decoder_core::{run, DecoderSettings};

#[derive(Debug, Parser)]
#[command(
    name = "adcom-decoder",
    version,
    about = "Adventure Communist save decoder and experiment ROI analyzer"
)]
struct Args {
    /// Path to the save file.
    #[arg(default_value = "game.sav")]
    save: PathBuf,

    /// Rank experiment purchases by return on investment.
    #[arg(long, default_value_t = false)]
    analyze: bool,

    /// Experiment already researched in-game; repeat for each one. The
    /// save file only stores a researched count, not which experiments,
    /// so these must be supplied by hand.
    #[arg(long = "researched", value_name = "NAME")]
    researched: Vec<String>,

    /// How many recommendations to show.
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Skip writing decoded_save.json next to the input.
    #[arg(long, default_value_t = false)]
    no_json: bool,
}

fn main() {
    let args = Args::parse();

    let settings = DecoderSettings {
        save_path: args.save,
        write_json: !args.no_json,
        analyze: args.analyze,
        researched: args.researched,
        top_n: args.top,
    };

    match run(&settings) {
        Ok(output) => {
            println!("{}", output.report);
            if let Some(path) = output.json_path {
                println!("Data saved to: {}", path.display());
            }
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
