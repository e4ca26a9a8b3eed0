use std::{
    env,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use junit_reporter::{
    Error, JUnitReporter,
    config::{DEFAULT_CONFIG_FILE, ReporterOptions},
    console::ColorSetting,
    engine::replay::ReplayEngine,
};
use tracing_subscriber::EnvFilter;

/// Write JUnit XML reports, one file per test module, from recorded test
/// results.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Recorded result files, read from stdin if none are given.
    files: Vec<PathBuf>,

    /// Directory the XML reports are written to.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// JSON config file [default: junit-reporter.json if present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report tests that have a name segment equal to this.
    #[arg(short, long)]
    testspec: Option<String>,

    /// Only report the test with exactly this full name.
    #[arg(short = 'f', long = "testFullSpec", alias = "test-full-spec")]
    test_full_spec: Option<String>,

    #[arg(long, value_enum)]
    color: Option<ColorSetting>,

    /// Number of report files written at once.
    #[arg(long, env = "JUNIT_REPORTER_THREADS")]
    threads: Option<NonZeroUsize>,
}

impl Cli {
    /// Options from the config file, overridden by the command line.
    ///
    /// Without `--config`, [`DEFAULT_CONFIG_FILE`] in `cwd` is used if present.
    fn options(&self, cwd: &Path) -> Result<ReporterOptions, Error> {
        let default_file = cwd.join(DEFAULT_CONFIG_FILE);
        let file = match &self.config {
            Some(path) => ReporterOptions::from_file(path)?,
            None if default_file.is_file() => ReporterOptions::from_file(&default_file)?,
            None => ReporterOptions::default(),
        };

        let mut cli = ReporterOptions::new();
        cli.output = self.output.clone();
        cli.testspec = self.testspec.clone();
        cli.test_full_spec = self.test_full_spec.clone();
        cli.color = self.color;
        Ok(file.merge(cli))
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let cwd = env::current_dir().map_err(Error::WorkingDir)?;
    let options = cli.options(&cwd)?;
    let reporter = JUnitReporter::new(ReplayEngine::default(), options).with_cwd(cwd);
    let reporter = match cli.threads {
        Some(threads) => reporter.with_thread_count(threads),
        None => reporter,
    };
    reporter.run(&cli.files)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        // the summary line already told the user
        Err(Error::TestFailures { .. }) => ExitCode::FAILURE,
        Err(err) => {
            let mut chain = String::from("Error: ");
            chain.push_str(&err.to_string());
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                chain.push_str(&format!("\n  caused by: {cause}"));
                source = std::error::Error::source(cause);
            }
            eprintln!("{chain}");
            ExitCode::from(2)
        }
    }
}
