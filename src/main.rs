#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

use std::process;

use docopt::Docopt;
use log::LevelFilter;
use semsim::{logger, Config};

const VERSION: &str = "0.1.0";

const USAGE: &str = "
Bounded buffer producer/consumer simulator.

Usage:
  semsim [-q] [-c <capacity>] [-o <file>] <producers> <consumers> <duration> <producer-sleep-max> <consumer-sleep-max>
  semsim (-h | --help)
  semsim (-v | --version)

Arguments:
  <producers>           number of producer workers.
  <consumers>           number of consumer workers.
  <duration>            run time in seconds.
  <producer-sleep-max>  max producer idle time in ms.
  <consumer-sleep-max>  max consumer idle time in ms.

Options:
  -h --help         Show this screen.
  -v --version      Show version.
  -q                only log warnings and errors.
  -c <capacity>     buffer capacity [default: 10].
  -o <file>         report file to append to [default: report.txt].
";

#[derive(Debug, Deserialize)]
struct Args {
    arg_producers: usize,
    arg_consumers: usize,
    arg_duration: u64,
    arg_producer_sleep_max: u64,
    arg_consumer_sleep_max: u64,
    flag_c: usize,
    flag_o: String,
    flag_q: bool,
    flag_v: bool,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if args.flag_v {
        return println!("semsim: {}", VERSION);
    }

    let level = if args.flag_q {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    if let Err(e) = logger::init(level) {
        eprintln!("failed to install logger: {}", e);
    }

    let mut config = Config::new();
    config
        .set_producers(args.arg_producers)
        .set_consumers(args.arg_consumers)
        .set_duration_secs(args.arg_duration)
        .set_producer_idle_max_ms(args.arg_producer_sleep_max)
        .set_consumer_idle_max_ms(args.arg_consumer_sleep_max)
        .set_capacity(args.flag_c)
        .set_report_path(&args.flag_o);

    let summary = match semsim::run(config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{}", e);
            if let semsim::Error::Config(_) = e {
                eprint!("{}", USAGE);
            }
            process::exit(1);
        }
    };

    print!("{}", summary.report());
    // the run is complete even if the report can't be written
    if let Err(e) = summary.write_report() {
        warn!("{}", e);
    }
}
