use chrono::{DateTime, Local};

use crate::format::{escape_html, format_bot_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    User,
    Bot,
    Error,
}

/// One item shown in the conversation pane
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub kind: EntryKind,
    pub text: String,
    pub at: DateTime<Local>,
}

impl TranscriptEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self::at(kind, text, Local::now())
    }

    pub fn at(kind: EntryKind, text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            kind,
            text: text.into(),
            at,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(EntryKind::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Bot, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    /// `hh:mm AM/PM`
    pub fn time_label(&self) -> String {
        self.at.format("%I:%M %p").to_string()
    }

    /// HTML fragment for the chat pane.
    ///
    /// Assistant text goes through [`format_bot_message`]; user text and
    /// error messages are escaped.
    pub fn render_html(&self) -> String {
        match self.kind {
            EntryKind::User => self.render_message("user", "fa-user", &escape_html(&self.text)),
            EntryKind::Bot => self.render_message("bot", "fa-robot", &format_bot_message(&self.text)),
            EntryKind::Error => format!(
                "<div class=\"error-message\"><strong>Error:</strong> {}\
                 <br><small>Please try again or check your connection.</small></div>",
                escape_html(&self.text)
            ),
        }
    }

    fn render_message(&self, sender: &str, icon: &str, body: &str) -> String {
        format!(
            "<div class=\"message {sender}-message\">\
             <div class=\"message-avatar\"><i class=\"fas {icon}\"></i></div>\
             <div class=\"message-content\">\
             <div class=\"message-text\">{body}</div>\
             <div class=\"message-time\">{time}</div>\
             </div></div>",
            time = self.time_label(),
        )
    }
}

/// Append-only list of everything shown in the conversation
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry as stored
    pub fn push(&mut self, entry: TranscriptEntry) -> &TranscriptEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render_html(&self) -> String {
        self.entries.iter().map(TranscriptEntry::render_html).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_time_label() {
        assert_eq!(TranscriptEntry::at(EntryKind::User, "hi", at(9, 5)).time_label(), "09:05 AM");
        assert_eq!(TranscriptEntry::at(EntryKind::Bot, "hi", at(13, 30)).time_label(), "01:30 PM");
    }

    #[test]
    fn test_user_text_escaped() {
        let html = TranscriptEntry::at(EntryKind::User, "<b>**hi**</b>", at(9, 5)).render_html();

        assert!(html.contains("user-message"));
        assert!(html.contains("&lt;b&gt;**hi**&lt;/b&gt;"));
        assert!(!html.contains("<strong>"));
        assert!(html.contains("<div class=\"message-time\">09:05 AM</div>"));
    }

    #[test]
    fn test_bot_text_formatted() {
        let html = TranscriptEntry::at(EntryKind::Bot, "**hi** [doc1]", at(9, 5)).render_html();

        assert!(html.contains("bot-message"));
        assert!(html.contains("fa-robot"));
        assert!(html.contains("<strong>hi</strong>"));
        assert!(!html.contains("[doc1]"));
    }

    #[test]
    fn test_error_notice() {
        let html = TranscriptEntry::at(EntryKind::Error, "Rate limit <exceeded>", at(9, 5)).render_html();
        assert_eq!(
            html,
            "<div class=\"error-message\"><strong>Error:</strong> Rate limit &lt;exceeded&gt;\
             <br><small>Please try again or check your connection.</small></div>"
        );
    }

    #[test]
    fn test_transcript_order() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::user("one"));
        transcript.push(TranscriptEntry::bot("two"));

        let kinds: Vec<EntryKind> = transcript.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::User, EntryKind::Bot]);
        assert_eq!(transcript.last().unwrap().text, "two");
    }
}
