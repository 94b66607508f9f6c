//! The `gitcat` binary: build or load the catalog, then run a queries
//! file against it.

use structopt::StructOpt;

use std::ffi;

use gitcat::{query, Catalog, Config, Result};

#[derive(Debug, StructOpt)]
#[structopt(name = "gitcat", about = "cache backed catalog over social-coding CSV datasets")]
struct Opt {
    /// Load configuration from a toml file.
    #[structopt(long = "config", parse(from_os_str))]
    config: Option<ffi::OsString>,

    /// Queries file, one `<id> <arg>..` query per line.
    #[structopt(name = "QUERIES", parse(from_os_str))]
    queries: Option<ffi::OsString>,
}

fn main() {
    env_logger::init();

    let opts = Opt::from_args();
    if let Err(err) = run(opts) {
        eprintln!("gitcat: {}", err);
        std::process::exit(1);
    }
}

fn run(opts: Opt) -> Result<()> {
    let config = match &opts.config {
        Some(loc) => Config::from_toml(loc)?,
        None => Config::default(),
    };

    let queries = match &opts.queries {
        Some(queries) => queries.clone(),
        None => {
            // the interactive UI lives outside this crate.
            eprintln!("gitcat: no queries file; the terminal UI is not part of this build");
            return Ok(());
        }
    };

    let workers = config.workers.clamp(1, num_cpus::get());
    let catalog = Catalog::load_or_create(config)?;
    query::run_file(&catalog, &queries, workers)
}
