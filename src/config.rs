use std::{fs, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::{
    console::{ColorSetting, Decorations, SupportsColor},
    engine::TestSpec,
    error::{Error, Result},
};

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "junit-reporter.json";

/// Options of a report run, as read from a config file or the command line.
///
/// Every field is optional so that several sources can be layered with
/// [`ReporterOptions::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct ReporterOptions {
    /// Directory the report files are written to. Required for a run.
    pub output: Option<PathBuf>,
    pub testspec: Option<String>,
    #[serde(rename = "testFullSpec", alias = "test_full_spec")]
    pub test_full_spec: Option<String>,
    pub color: Option<ColorSetting>,
    pub error_prefix: Option<String>,
    pub error_suffix: Option<String>,
    pub ok_prefix: Option<String>,
    pub ok_suffix: Option<String>,
    pub bold_prefix: Option<String>,
    pub bold_suffix: Option<String>,
}

impl ReporterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let options = serde_json::from_str(&contents).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?options, "loaded config file");
        Ok(options)
    }

    pub fn with_output(self, output: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(output.into()),
            ..self
        }
    }

    pub fn with_color(self, color: ColorSetting) -> Self {
        Self {
            color: Some(color),
            ..self
        }
    }

    /// Layer `overrides` on top of `self`, values set in `overrides` win.
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            output: overrides.output.or(self.output),
            testspec: overrides.testspec.or(self.testspec),
            test_full_spec: overrides.test_full_spec.or(self.test_full_spec),
            color: overrides.color.or(self.color),
            error_prefix: overrides.error_prefix.or(self.error_prefix),
            error_suffix: overrides.error_suffix.or(self.error_suffix),
            ok_prefix: overrides.ok_prefix.or(self.ok_prefix),
            ok_suffix: overrides.ok_suffix.or(self.ok_suffix),
            bold_prefix: overrides.bold_prefix.or(self.bold_prefix),
            bold_suffix: overrides.bold_suffix.or(self.bold_suffix),
        }
    }

    pub fn test_spec(&self) -> TestSpec {
        TestSpec {
            testspec: self.testspec.clone(),
            test_full_spec: self.test_full_spec.clone(),
        }
    }

    /// Decorations for console lines written to `target`.
    ///
    /// ANSI codes are the base when colors are in use, empty strings
    /// otherwise. Explicitly configured decorations always win.
    pub fn decorations(&self, target: &(impl SupportsColor + ?Sized)) -> Decorations {
        let base = match self.color.unwrap_or_default().use_color(target) {
            true => Decorations::ansi(),
            false => Decorations::plain(),
        };

        let pick = |configured: &Option<String>, default: String| {
            configured.clone().unwrap_or(default)
        };
        Decorations {
            error_prefix: pick(&self.error_prefix, base.error_prefix),
            error_suffix: pick(&self.error_suffix, base.error_suffix),
            ok_prefix: pick(&self.ok_prefix, base.ok_prefix),
            ok_suffix: pick(&self.ok_suffix, base.ok_suffix),
            bold_prefix: pick(&self.bold_prefix, base.bold_prefix),
            bold_suffix: pick(&self.bold_suffix, base.bold_suffix),
        }
    }
}
