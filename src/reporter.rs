use std::{
    env, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use crate::{
    assertion::{Assertion, AssertionList},
    builder::{ReportBuilder, RunListener},
    config::ReporterOptions,
    console::{Decorations, LogSink, WriteSink, summary_line},
    engine::TestEngine,
    error::{Error, Result},
    fs::{ReportFs, StdFs, ensure_dir},
    path::abspath,
    render::render,
    writer::{ParallelWriter, ReportFile, report_paths},
};

/// Runs tests through an engine and writes one JUnit XML file per module.
pub struct JUnitReporter<Engine, Sink, Fs> {
    pub(crate) engine: Engine,
    pub(crate) options: ReporterOptions,
    pub(crate) sink: Sink,
    pub(crate) fs: Fs,
    pub(crate) writer: ParallelWriter,
    pub(crate) decorations: Option<Decorations>,
    pub(crate) cwd: Option<PathBuf>,
}

impl<Engine: TestEngine> JUnitReporter<Engine, WriteSink<io::Stdout>, StdFs> {
    pub fn new(engine: Engine, options: ReporterOptions) -> Self {
        Self {
            engine,
            options,
            sink: WriteSink::default(),
            fs: StdFs,
            writer: ParallelWriter::default(),
            decorations: None,
            cwd: None,
        }
    }
}

impl<Engine: TestEngine, Sink: LogSink, Fs: ReportFs> JUnitReporter<Engine, Sink, Fs> {
    /// Run the tests in `files`, or every module the engine discovers if
    /// `files` is empty, and write the reports.
    ///
    /// Fails right away if no output directory is configured, an empty one
    /// counts as none. Otherwise the result is only known once the engine
    /// signaled `done` and every report was written. Failing tests make the run fail with
    /// [`Error::TestFailures`], but never stop reports from being written.
    pub fn run(self, files: &[PathBuf]) -> Result<()> {
        let Some(output) = self
            .options
            .output
            .as_deref()
            .filter(|output| !output.as_os_str().is_empty())
        else {
            return Err(Error::NoOutput);
        };

        let cwd = match self.cwd {
            Some(cwd) => cwd,
            None => env::current_dir().map_err(Error::WorkingDir)?,
        };
        let output = abspath(output, &cwd);
        let _span = tracing::info_span!("junit", output = %output.display()).entered();

        let decorations = self
            .decorations
            .unwrap_or_else(|| self.options.decorations(&self.sink as &dyn LogSink));
        let spec = self.options.test_spec();
        let mut engine = self.engine;
        let mut run = ReportRun {
            builder: ReportBuilder::new(),
            output,
            sink: self.sink,
            fs: self.fs,
            writer: self.writer,
            decorations,
            outcome: None,
        };

        match files.is_empty() {
            true => engine.run_modules(&spec, &mut run)?,
            false => {
                let files: Vec<_> = files.iter().map(|file| abspath(file, &cwd)).collect();
                engine.run_files(&files, &spec, &mut run)?;
            }
        }

        run.outcome.unwrap_or(Err(Error::Incomplete))
    }
}

impl<Engine, Sink, Fs> JUnitReporter<Engine, Sink, Fs> {
    pub fn with_engine<WithEngine: TestEngine>(
        self,
        engine: WithEngine,
    ) -> JUnitReporter<WithEngine, Sink, Fs> {
        JUnitReporter {
            engine,
            options: self.options,
            sink: self.sink,
            fs: self.fs,
            writer: self.writer,
            decorations: self.decorations,
            cwd: self.cwd,
        }
    }

    pub fn with_sink<WithSink: LogSink>(self, sink: WithSink) -> JUnitReporter<Engine, WithSink, Fs> {
        JUnitReporter {
            engine: self.engine,
            options: self.options,
            sink,
            fs: self.fs,
            writer: self.writer,
            decorations: self.decorations,
            cwd: self.cwd,
        }
    }

    pub fn with_fs<WithFs: ReportFs>(self, fs: WithFs) -> JUnitReporter<Engine, Sink, WithFs> {
        JUnitReporter {
            engine: self.engine,
            options: self.options,
            sink: self.sink,
            fs,
            writer: self.writer,
            decorations: self.decorations,
            cwd: self.cwd,
        }
    }

    pub fn with_options(self, options: ReporterOptions) -> Self {
        Self { options, ..self }
    }

    /// Use fixed decorations instead of deriving them from the options and
    /// the sink.
    pub fn with_decorations(self, decorations: Decorations) -> Self {
        Self {
            decorations: Some(decorations),
            ..self
        }
    }

    pub fn with_thread_count(self, count: NonZeroUsize) -> Self {
        Self {
            writer: self.writer.with_thread_count(count),
            ..self
        }
    }

    /// Resolve relative paths against `cwd` instead of the process working
    /// directory.
    pub fn with_cwd(self, cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..self
        }
    }
}

/// Listener handed to the engine for a single run.
///
/// Collects results until `done`, then writes the reports and keeps the
/// outcome of the run.
struct ReportRun<Sink, Fs> {
    builder: ReportBuilder,
    output: PathBuf,
    sink: Sink,
    fs: Fs,
    writer: ParallelWriter,
    decorations: Decorations,
    outcome: Option<Result<()>>,
}

impl<Sink: LogSink, Fs: ReportFs> ReportRun<Sink, Fs> {
    fn write_reports(&mut self, assertions: &AssertionList) -> Result<()> {
        ensure_dir(&self.fs, &self.output)?;

        let paths = report_paths(
            &self.output,
            self.builder.modules().map(|module| module.name.as_str()),
        );
        let files = self
            .builder
            .modules()
            .zip(paths)
            .map(|(module, path)| {
                let contents = render(module).map_err(|source| Error::Render {
                    module: module.name.clone(),
                    source,
                })?;
                Ok(ReportFile { path, contents })
            })
            .collect::<Result<Vec<_>>>()?;

        for file in &files {
            tracing::info!(path = %file.path.display(), "writing report");
            self.sink.log(&writing_line(&file.path));
        }
        self.writer.write_all(&self.fs, &files)?;

        self.sink.log(&summary_line(&self.decorations, assertions));
        match assertions.failures() {
            0 => Ok(()),
            failed => Err(Error::TestFailures {
                failed,
                total: assertions.len(),
            }),
        }
    }
}

fn writing_line(path: &Path) -> String {
    format!("Writing {}", path.display())
}

impl<Sink: LogSink, Fs: ReportFs> RunListener for ReportRun<Sink, Fs> {
    fn module_start(&mut self, name: &str) -> Result<()> {
        self.builder.module_start(name)
    }

    fn test_done(&mut self, name: &str, assertions: &[Assertion]) -> Result<()> {
        self.builder.test_done(name, assertions)
    }

    fn done(&mut self, assertions: &AssertionList) -> Result<()> {
        self.builder.done(assertions)?;
        let outcome = self.write_reports(assertions);
        if let Err(err) = &outcome {
            tracing::debug!(%err, "run finished with an error");
        }
        self.outcome = Some(outcome);
        Ok(())
    }
}
