use std::io;

use serde::Deserialize;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    #[default]
    #[serde(alias = "automatic")]
    Auto,
    Always,
    Never,
}

impl ColorSetting {
    pub fn use_color(self, target: &(impl SupportsColor + ?Sized)) -> bool {
        match self {
            ColorSetting::Auto => target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

pub(crate) mod colors {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const DEFAULT_FG: &str = "\x1b[39m";
    pub const BOLD: &str = "\x1b[1m";
    pub const NORMAL_INTENSITY: &str = "\x1b[22m";
}

pub trait SupportsColor {
    fn supports_color(&self) -> bool;
}

impl<T: io::IsTerminal> SupportsColor for T {
    fn supports_color(&self) -> bool {
        self.is_terminal()
    }
}

/// Strings wrapped around emphasized parts of the summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorations {
    pub error_prefix: String,
    pub error_suffix: String,
    pub ok_prefix: String,
    pub ok_suffix: String,
    pub bold_prefix: String,
    pub bold_suffix: String,
}

impl Decorations {
    pub fn ansi() -> Self {
        use colors::*;
        Self {
            error_prefix: RED.into(),
            error_suffix: DEFAULT_FG.into(),
            ok_prefix: GREEN.into(),
            ok_suffix: DEFAULT_FG.into(),
            bold_prefix: BOLD.into(),
            bold_suffix: NORMAL_INTENSITY.into(),
        }
    }

    pub fn plain() -> Self {
        Self {
            error_prefix: String::new(),
            error_suffix: String::new(),
            ok_prefix: String::new(),
            ok_suffix: String::new(),
            bold_prefix: String::new(),
            bold_suffix: String::new(),
        }
    }

    pub fn error(&self, s: &str) -> String {
        format!("{}{s}{}", self.error_prefix, self.error_suffix)
    }

    pub fn ok(&self, s: &str) -> String {
        format!("{}{s}{}", self.ok_prefix, self.ok_suffix)
    }

    pub fn bold(&self, s: &str) -> String {
        format!("{}{s}{}", self.bold_prefix, self.bold_suffix)
    }
}

impl Default for Decorations {
    fn default() -> Self {
        Self::plain()
    }
}
