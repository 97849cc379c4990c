mod args;
mod wards;

use clap::Parser;
use log::{info, LevelFilter};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
    info!("args: {:?}", args);

    match wards::run(&args) {
        Ok(summary) if summary.written.is_empty() && !summary.failed.is_empty() => {
            eprintln!("No workbook could be produced");
            std::process::exit(2);
        }
        Ok(summary) => {
            for p in summary.written.iter() {
                println!("{}", p);
            }
            for (p, msg) in summary.failed.iter() {
                eprintln!("failed: {}: {}", p, msg);
            }
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            std::process::exit(1);
        }
    }
}
