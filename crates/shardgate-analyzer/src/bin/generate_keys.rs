//! `generate-keys`: write random UUID keys, one per line, to stdout.
//!
//! ```text
//! generate-keys -n 50000 > keys.txt
//! hashing-distribution keys.txt
//! ```

use std::io::{self, BufWriter, Write};

use anyhow::Result;
use clap::Parser;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "generate-keys",
    version,
    about = "Print random UUID v4 keys for distribution analysis"
)]
struct Cli {
    /// Number of keys to generate.
    #[arg(short = 'n', long, default_value = "10000")]
    count: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut out = BufWriter::new(io::stdout().lock());
    for _ in 0..cli.count {
        writeln!(out, "{}", Uuid::new_v4())?;
    }
    out.flush()?;
    Ok(())
}
