//! The `showd` command line.
use crate::astrodata::{AstroData, DescriptorValue};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use tracing::debug;

/// Show descriptor values of astronomical data files, one line per file.
#[derive(Parser, Debug)]
#[command(name = "showd", version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Input files
    pub inputs: Vec<String>,

    /// Descriptors to show, in this order
    #[arg(short, long, num_args = 1.., required = true)]
    pub descriptors: Vec<String>,

    /// Print the parsed arguments and log what happens
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Print one line per input to `out`. The first file that cannot be opened
    /// or described ends the run.
    pub fn run(&self, out: &mut impl Write) -> Result<()> {
        if self.debug {
            writeln!(out, "{:?}", self)?;
        }

        for input in &self.inputs {
            let ad = AstroData::open(input).with_context(|| format!("while opening {}", input))?;
            debug!(file = ad.filename(), class = ad.class().name(), "opened");

            let values = ad
                .descriptors(&self.descriptors)
                .with_context(|| format!("while reading descriptors for {}", input))?;

            write_line(out, ad.filename(), &values)?;
        }
        Ok(())
    }
}

// `<filename>: <v1> <v2> ... `, every value followed by a space
fn write_line(out: &mut impl Write, filename: &str, values: &[DescriptorValue]) -> io::Result<()> {
    write!(out, "{}: ", filename)?;
    for value in values {
        write!(out, "{} ", value)?;
    }
    writeln!(out)
}

/// Log to stderr. `RUST_LOG` wins over `--debug`.
pub fn setup_logging(debug: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
