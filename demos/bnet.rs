//! Runs a query script against an XMLBIF network.
//!
//! ```bash
//! cargo run --example bnet -- --input demos/input.txt
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use bnet_rs::engine::Engine;
use bnet_rs::network::Network;
use bnet_rs::parse::{parse_query, parse_script, render_result};
use clap::Parser;
use color_eyre::Result;

#[derive(Parser)]
#[command(author, version, about = "Exact inference in discrete Bayesian networks")]
struct Cli {
    /// Query script: network file on the first line, one query per line after it
    #[arg(short, long, value_name = "FILE", default_value = "input.txt")]
    input: PathBuf,

    /// Where to write the answers (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: simplelog::LevelFilter,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    simplelog::TermLogger::init(
        cli.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    log::info!("Reading script from {:?}", cli.input);
    let script = parse_script(&fs::read_to_string(&cli.input)?)?;

    // The network path is relative to the script.
    let network_path = match cli.input.parent() {
        Some(dir) if script.network.is_relative() => dir.join(&script.network),
        _ => script.network.clone(),
    };
    let network = Network::from_xmlbif_file(&network_path)?;
    log::info!(
        "Loaded {:?} with {} variables, {} queries to run",
        network_path,
        network.len(),
        script.queries.len()
    );

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let engine = Engine::new(&network);
    for line in &script.queries {
        let answer = parse_query(&network, line).and_then(|query| engine.run(&query));
        match answer {
            Ok(result) => writeln!(out, "{}", render_result(&result))?,
            Err(e) => log::error!("{}: {}", line, e),
        }
    }
    out.flush()?;

    Ok(())
}
