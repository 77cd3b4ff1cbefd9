//! Terminal output for CredVault commands.
//!
//! Status lines carry a colored marker that falls back to plain ASCII on
//! terminals without Unicode support.  Problems go to stderr so that
//! `credvault get` output can be piped.

use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use console::{style, Emoji, StyledObject};

use crate::store::CredentialMetadata;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy)]
enum Tone {
    Success,
    Error,
    Warning,
    Info,
    Tip,
}

impl Tone {
    fn marker(self) -> StyledObject<Emoji<'static, 'static>> {
        match self {
            Self::Success => style(Emoji("\u{2713}", "ok")).green().bold(),
            Self::Error => style(Emoji("\u{2717}", "error:")).red().bold(),
            Self::Warning => style(Emoji("\u{26a0}", "warning:")).yellow().bold(),
            Self::Info => style(Emoji("\u{2139}", "-")).blue().bold(),
            Self::Tip => style(Emoji("\u{2192}", "->")).dim(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

fn emit(tone: Tone, msg: &str) {
    let line = match tone {
        Tone::Tip => format!("{} {}", tone.marker(), style(msg).dim()),
        _ => format!("{} {msg}", tone.marker()),
    };
    if tone.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

pub fn success(msg: &str) {
    emit(Tone::Success, msg);
}

pub fn error(msg: &str) {
    emit(Tone::Error, msg);
}

pub fn warning(msg: &str) {
    emit(Tone::Warning, msg);
}

pub fn info(msg: &str) {
    emit(Tone::Info, msg);
}

pub fn tip(msg: &str) {
    emit(Tone::Tip, msg);
}

/// Stored credentials as a table.  Values are never shown.
pub fn print_credentials_table(credentials: &[CredentialMetadata]) {
    if credentials.is_empty() {
        info("The vault holds no credentials.");
        tip("Run `credvault set <ID>` to store one.");
        return;
    }

    println!("{}", credentials_table(credentials));
}

fn credentials_table(credentials: &[CredentialMetadata]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Credential", "Stored", "Last changed"]);

    for meta in credentials {
        table.add_row(vec![
            meta.id.clone(),
            meta.created_at.format(TIMESTAMP_FORMAT).to_string(),
            meta.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }
    table
}
