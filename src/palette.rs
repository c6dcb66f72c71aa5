use std::env;
use std::fmt;
use std::io::{self, IsTerminal};

use once_cell::sync::Lazy;

/// Honour https://no-color.org and keep piped output plain.
static COLOR_ENABLED: Lazy<bool> =
    Lazy::new(|| env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal());

pub struct Palette;

impl Palette {
    pub const RESET: &'static str = "\x1b[0m";
    pub const DIM: &'static str = "\x1b[2m";
    pub const BOLD: &'static str = "\x1b[1m";

    pub const ACCENT: &'static str = "\x1b[34m";
    pub const INFO: &'static str = "\x1b[36m";
    pub const SUCCESS: &'static str = "\x1b[32m";
    pub const WARNING: &'static str = "\x1b[33m";
    pub const DANGER: &'static str = "\x1b[31m";

    pub fn paint(color: &str, value: impl fmt::Display) -> String {
        if *COLOR_ENABLED {
            format!("{}{}{}", color, value, Self::RESET)
        } else {
            value.to_string()
        }
    }

    pub fn dim(value: impl fmt::Display) -> String {
        Self::paint(Self::DIM, value)
    }

    pub fn bold(value: impl fmt::Display) -> String {
        Self::paint(Self::BOLD, value)
    }
}
