//! Command-line driver.
//!
//! Loads a comma-separated list of integers into a [`Datas`] context, reads
//! the report file, then tears everything down.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use datas::params::parse_int_list;
use datas::procfile::ReadOnce;
use datas::{Config, Datas, Key, Value};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "datas")]
#[command(about = "Store integers in five containers and print them")]
#[command(version)]
struct Args {
    /// A comma-separated list of integers
    #[arg(long = "int-str", value_name = "LIST", allow_hyphen_values = true)]
    int_str: Option<String>,

    /// Report buffer size in bytes, terminator included
    #[arg(long, default_value_t = datas::config::DEFAULT_REPORT_CAPACITY)]
    capacity: usize,

    /// log2 of the number of hash buckets
    #[arg(long, default_value_t = datas::config::DEFAULT_BUCKET_BITS)]
    bucket_bits: u32,

    /// Highest insertion index the sparse stores accept
    #[arg(long)]
    max_index: Option<Key>,

    /// How many times to read the report file
    #[arg(long, default_value_t = 1)]
    reads: usize,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let Some(int_str) = args.int_str.as_deref() else {
        return Err("missing 'int-str' parameter".into());
    };
    let values = parse_int_list(int_str)?;

    let mut config = Config::default()
        .with_report_capacity(args.capacity)
        .with_bucket_bits(args.bucket_bits);
    if let Some(max_index) = args.max_index {
        config = config.with_max_index(max_index);
    }

    let mut datas = Datas::with_config(config)?;
    let stdout = io::stdout();
    publish(&mut datas, values, args.reads, &mut stdout.lock())
}

/// Load `values`, write the report `reads` times to `out`, then tear down.
///
/// The containers are freed even when loading or writing fails; the first
/// error is returned afterwards.
fn publish<W: Write>(
    datas: &mut Datas,
    values: Vec<Value>,
    reads: usize,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(values = values.len(), "loading");
    // A failed load never publishes the report.
    let published = datas
        .ingest(values)
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(|_| print_report(datas, reads, out));

    let summary = datas.teardown()?;
    info!(freed = summary.total(), "unloaded");
    published
}

/// Read the report file `reads` times, writing the text before the terminator.
fn print_report<W: Write>(
    datas: &Datas,
    reads: usize,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = vec![0u8; datas.config().report_capacity];
    let mut file = ReadOnce::open(datas);
    for _ in 0..reads {
        let n = file.read(&mut buf)?;
        let text = buf[..n].split(|&b| b == 0).next().unwrap_or_default();
        out.write_all(text)?;
    }
    out.flush()?;
    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("datas=trace")
        } else {
            EnvFilter::new("datas=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
