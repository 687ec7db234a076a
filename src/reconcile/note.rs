//! Note matching and rendering.
//!
//! A note belongs to a screenshot URL when its text contains the marker token
//! and the literal URL. Fragments are only ever appended.

use crate::config::NOTE_MARKER;
use crate::hive::{AttachmentRef, NoteEntity};
use crate::input::ScreenshotRecord;

/// True when `text` is the importer's note for `url`.
pub fn is_note_for(text: &str, url: &str) -> bool {
    text.contains(NOTE_MARKER) && text.contains(url)
}

/// Every existing note that matches `url`, in server order.
///
/// The caller uses the first; more than one match is an ambiguity that is
/// reported, not resolved.
pub fn matching_notes<'a>(notes: &'a [NoteEntity], url: &str) -> Vec<&'a NoteEntity> {
    notes
        .iter()
        .filter(|note| is_note_for(note.text(), url))
        .collect()
}

/// Renders the fragment describing one screenshot.
pub fn render_fragment(
    record: &ScreenshotRecord,
    project_id: &str,
    attachment: &AttachmentRef,
) -> String {
    format!(
        "<details>\n\
         <summary>{marker} {url}</summary><br>\n\
         <h5>Final Url: </h5><a href={final_url}>{final_url}</a><br>\n\
         <h5>Response code: </h5>{code}<br>\n\
         <h5>Protocol: </h5>{protocol}<br>\n\
         <img src=\"{img}\"></img>\n\
         </details>",
        marker = NOTE_MARKER,
        url = record.url,
        final_url = record.final_url,
        code = record.response_code,
        protocol = record.protocol,
        img = attachment.image_path(project_id),
    )
}

/// Existing text followed by the new fragment on its own line.
pub fn append_fragment(previous: &str, fragment: &str) -> String {
    format!("{previous}\n{fragment}")
}
