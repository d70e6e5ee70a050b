use crate::datetime;
use crate::error::MessageError;
use crate::message_id::{self, MessageId};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use indicatif::{ProgressBar, ProgressStyle};
use mailparse::{DispositionType, MailHeaderMap, MailParseError, ParsedMail};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Lines of rendered HTML bodies are wrapped at this width; it only has to
/// be wider than any report line.
const HTML_WIDTH: usize = 1000;

/// A relayed chat message read from the maildir.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub id: MessageId,
    pub path: PathBuf,
    pub received: DateTime<FixedOffset>,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    /// The local calendar day the message arrived on.
    pub fn received_date(&self) -> NaiveDate {
        self.received.with_timezone(&Local).date_naive()
    }
}

/// Reads every message in `maildir/new` and `maildir/cur`, oldest first.
///
/// Messages that cannot be parsed or lack a usable `Date:` header are
/// skipped with a warning.
pub fn list_messages(maildir: &Path, quiet: bool) -> io::Result<Vec<MailMessage>> {
    let mut files = vec![];
    for sub in ["new", "cur"] {
        let dir = maildir.join(sub);
        // `new` must exist in any maildir; `cur` may not have been created yet.
        if sub == "cur" && !dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_file() && !is_hidden(&path) {
                files.push(path);
            }
        }
    }

    // There is no email, just return.
    if files.is_empty() {
        return Ok(vec![]);
    }

    let progress = create_progress_bar(quiet, files.len());
    let mut result: Vec<_> = files
        .into_par_iter()
        .enumerate()
        .filter_map(|(i, path)| {
            let message = load_message(path);
            if i % 128 == 127 {
                progress.inc(128);
            }
            message
        })
        .collect();
    progress.finish_and_clear();

    result.sort_by(|a, b| a.received.cmp(&b.received).then_with(|| a.id.cmp(&b.id)));
    Ok(result)
}

fn create_progress_bar(quiet: bool, len: usize) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("reading mails {bar:40} {pos}/{len}") {
        progress.set_style(style);
    }
    progress
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with('.'))
}

fn load_message(path: PathBuf) -> Option<MailMessage> {
    let (raw, id) = match message_id::read_message(&path) {
        Ok(read) => read,
        Err(e) => {
            warn!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };
    match parse_message(&raw, id, &path) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("{}: {}, skipped", path.display(), e);
            None
        }
    }
}

fn parse_message(raw: &[u8], id: MessageId, path: &Path) -> Result<MailMessage, MessageError> {
    let mail = mailparse::parse_mail(raw)?;
    let received = mail
        .headers
        .get_first_value("Date")
        .and_then(|value| datetime::parse_datetime(value.trim().as_bytes()))
        .ok_or(MessageError::NoDate)?;
    let subject = mail.headers.get_first_value("Subject").unwrap_or_default();
    let body = message_text(&mail)?;
    Ok(MailMessage {
        id,
        path: path.to_path_buf(),
        received,
        subject: subject.trim().to_string(),
        body,
    })
}

/// The readable text of a mail: its first `text/plain` part, or failing
/// that its first `text/html` part rendered as plain text.
fn message_text(mail: &ParsedMail) -> Result<String, MessageError> {
    if let Some(part) = find_part(mail, "text/plain") {
        return Ok(decode_part(part)?);
    }
    if let Some(part) = find_part(mail, "text/html") {
        let html = decode_part(part)?;
        return html2text::from_read(html.as_bytes(), HTML_WIDTH)
            .map_err(|e| MessageError::Html(e.to_string()));
    }
    Ok(String::new())
}

fn find_part<'m, 'a>(mail: &'m ParsedMail<'a>, mimetype: &str) -> Option<&'m ParsedMail<'a>> {
    if matches!(mail.get_content_disposition().disposition, DispositionType::Attachment) {
        return None;
    }
    if mail.ctype.mimetype.eq_ignore_ascii_case(mimetype) {
        return Some(mail);
    }
    mail.subparts
        .iter()
        .find_map(|part| find_part(part, mimetype))
}

fn decode_part(part: &ParsedMail) -> Result<String, MailParseError> {
    // A part without a charset parameter is taken as US-ASCII, but relays
    // put UTF-8 there anyway.
    if part.ctype.charset.eq_ignore_ascii_case("us-ascii") {
        if let Ok(text) = String::from_utf8(part.get_body_raw()?) {
            return Ok(text);
        }
    }
    part.get_body()
}
