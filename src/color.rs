use std::io::IsTerminal;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorPolicy {
    Auto,
    Always,
    Never,
}

impl ColorPolicy {
    pub fn parse(v: &str) -> Option<Self> {
        match v {
            "auto" => Some(Self::Auto),
            "always" => Some(Self::Always),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn enabled(self) -> bool {
        self.enabled_with(std::io::stdout().is_terminal(), |k| std::env::var(k).ok())
    }

    /// `env` looks up a variable by name.
    pub fn enabled_with(self, stdout_is_tty: bool, env: impl Fn(&str) -> Option<String>) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => {
                if env("NO_COLOR").is_some()
                    || env("CLICOLOR").as_deref() == Some("0")
                    || env("TERM").as_deref() == Some("dumb")
                {
                    return false;
                }
                if env("CLICOLOR_FORCE").as_deref() == Some("1") || env("FORCE_COLOR").as_deref() == Some("1") {
                    return true;
                }
                stdout_is_tty
            }
        }
    }
}
