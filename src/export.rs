use std::{fs, path::Path};

use serde::Deserialize;
use snafu::ResultExt;

use crate::error::{FormatSnafu, NotFoundSnafu, Result};

/// A Telegram-style chat export: a single JSON document with a top-level
/// `messages` array. All other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatExport {
    pub messages: Vec<Message>,
}

/// One exported message. `text` is kept as a raw JSON value because media
/// placeholders export it as null, a number, or an array of rich-text
/// fragments; only plain strings carry usable content.
#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: serde_json::Value,
}

impl Message {
    /// The message text, or `None` when the export put something other
    /// than a plain string there.
    pub fn text(&self) -> Option<&str> {
        self.text.as_str()
    }
}

/// Reads and parses the whole export in one blocking pass.
pub fn load_export(path: &Path) -> Result<ChatExport> {
    let raw = fs::read_to_string(path).context(NotFoundSnafu { path })?;

    serde_json::from_str(&raw).context(FormatSnafu { path })
}
