use anyhow::Result;
use clap::Parser;
use showd::cli::{setup_logging, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.debug);

    let stdout = std::io::stdout();
    args.run(&mut stdout.lock())
}
