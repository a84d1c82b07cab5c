use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use finviz_screener::{Dimension, FilterBuilder, Screener, ScreenerConfig};
use tokio::runtime;

/// FinViz stock screener client
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Args {
    #[clap(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[clap(name = "scan")]
    Scan(ScanArgs),
    #[clap(name = "dimensions")]
    Dimensions,
    #[clap(hide = true)]
    Completion,
}

/// Scan the screener and print matching tickers
#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// Filter as DIMENSION=VALUE, e.g. average_volume="Over 2M"
    #[clap(long = "filter", short, parse(try_from_str = parse_filter))]
    pub filters: Vec<(Dimension, String)>,
    /// Signal preset, e.g. "Top Gainers"
    #[clap(long, short)]
    pub signal: Option<String>,
    /// Sort column, prefixed with `-` for descending order
    #[clap(long, short, allow_hyphen_values = true)]
    pub order: Option<String>,
    /// Optional screener yaml configuration file
    #[clap(env = "FINVIZ_CONFIG", parse(from_os_str), long)]
    pub config: Option<PathBuf>,
    /// Override the maximum number of pages, 0 for no limit
    #[clap(long)]
    pub page_limit: Option<usize>,
    /// Override the minimum delay between requests
    #[clap(long)]
    pub request_interval_ms: Option<u64>,
    /// Override the user agent
    #[clap(long)]
    pub user_agent: Option<String>,
    #[clap(arg_enum, long, default_value = "lines")]
    pub format: Format,
    /// When quiet no logs are outputted
    #[clap(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ArgEnum)]
pub enum Format {
    Lines,
    Csv,
    Json,
}

fn parse_filter(s: &str) -> Result<(Dimension, String), String> {
    let (dimension, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected DIMENSION=VALUE, got: {s}"))?;
    let dimension = dimension.parse::<Dimension>().map_err(|e| e.to_string())?;
    Ok((dimension, value.to_string()))
}

impl TryFrom<&ScanArgs> for ScreenerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ScanArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(file) = args.config.as_ref().map(File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            ScreenerConfig::default()
        };
        if let Some(page_limit) = args.page_limit {
            conf.page_limit = page_limit;
        }
        if let Some(request_interval) = args.request_interval_ms {
            conf.request_interval = request_interval;
        }
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        Ok(conf)
    }
}

pub fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let conf = ScreenerConfig::try_from(&args)?;
    let mut screener = Screener::new(conf)?;

    for (dimension, value) in &args.filters {
        screener.filter(*dimension, value);
    }
    if let Some(signal) = &args.signal {
        screener.signal(signal);
    }
    if let Some(order) = &args.order {
        match order.strip_prefix('-') {
            Some(column) => screener.order(column, true),
            None => screener.order(order, false),
        };
    }

    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    let tickers = rt.block_on(screener.scan())?;

    write_tickers(&tickers, args.format, io::stdout().lock())
}

fn write_tickers<W: Write>(tickers: &[String], format: Format, mut out: W) -> anyhow::Result<()> {
    match format {
        Format::Lines => {
            for ticker in tickers {
                writeln!(out, "{ticker}")?;
            }
        }
        Format::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            wtr.write_record(["ticker"])?;
            for ticker in tickers {
                wtr.write_record([ticker])?;
            }
            wtr.flush()?;
        }
        Format::Json => {
            serde_json::to_writer(&mut out, tickers)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn dimensions(mut out: impl Write) -> io::Result<()> {
    for dimension in Dimension::ALL {
        writeln!(out, "{} ({})", dimension.name(), dimension.code())?;
        for (label, code) in dimension.values() {
            writeln!(out, "    {label:<32} {code}")?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Scan(args) => {
            if !args.quiet {
                env_logger::Builder::from_env(
                    env_logger::Env::default().default_filter_or("finviz_screener=info"),
                )
                .init();
            }
            scan(args)
        }
        SubCommand::Dimensions => Ok(dimensions(io::stdout().lock())?),
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "finviz", &mut io::stdout());
            Ok(())
        }
    }
}
