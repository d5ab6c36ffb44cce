// src/pipeline/compose.rs

//! Notification composition.
//!
//! Turns the batch of change records accumulated by a run into one
//! title+body pair. First-run batches get an initialization layout; update
//! batches render differently for one app versus several.

use unicode_segmentation::UnicodeSegmentation;

use crate::pipeline::detect::ChangeRecord;
use crate::utils::time;

/// Which kind of batch a run accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// First run: every probed app seeds the baseline.
    Init,
    /// Ordinary run: only apps whose version changed.
    Update,
}

/// A composed notification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub body: String,
}

impl Message {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// Compose one message covering the whole batch.
///
/// Pure function of its input; an empty batch composes to empty strings.
pub fn compose(records: &[ChangeRecord], kind: BatchKind) -> Message {
    if records.is_empty() {
        return Message {
            title: String::new(),
            body: String::new(),
        };
    }

    match kind {
        BatchKind::Init => compose_init(records),
        BatchKind::Update if records.len() == 1 => compose_single(&records[0]),
        BatchKind::Update => compose_multi(records),
    }
}

fn compose_init(records: &[ChangeRecord]) -> Message {
    let blocks: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "📱 {} v{}\n   {} | {}\n   {}",
                r.release.name,
                r.release.version,
                r.release.region_name,
                time::format_release_time(&r.release.released_at),
                excerpt(&r.release.notes, 80),
            )
        })
        .collect();

    let noun = if records.len() == 1 { "app" } else { "apps" };
    Message {
        title: format!("📱 App watch initialized ({} {})", records.len(), noun),
        body: format!("✅ Now tracking:\n\n{}", blocks.join("\n\n")),
    }
}

fn compose_single(record: &ChangeRecord) -> Message {
    let release = &record.release;
    Message {
        title: format!("🔥 {} has an update", release.name),
        body: format!(
            "📱 {} ({}→{}) 📱\nRegion: {} | Released: {}\n━━━━━━━━━━━━━━━\n{}",
            release.name,
            previous_label(&record.previous_version),
            release.version,
            release.region_name,
            time::format_release_time(&release.released_at),
            excerpt(&release.notes, 200),
        ),
    }
}

fn compose_multi(records: &[ChangeRecord]) -> Message {
    let blocks: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                "📱 {} {}→{}\n   {} | {}\n   {}",
                r.release.name,
                previous_label(&r.previous_version),
                r.release.version,
                r.release.region_name,
                time::format_release_time(&r.release.released_at),
                excerpt(&r.release.notes, 80),
            )
        })
        .collect();

    Message {
        title: format!("📱 App Store updates ({} apps)", records.len()),
        body: format!("Updates found:\n\n{}", blocks.join("\n\n")),
    }
}

fn previous_label(previous: &str) -> &str {
    if previous.is_empty() { "none" } else { previous }
}

/// First `limit` grapheme clusters, with an ellipsis marker when truncated.
fn excerpt(notes: &str, limit: usize) -> String {
    let mut clusters = notes.graphemes(true);
    let head: String = clusters.by_ref().take(limit).collect();
    if clusters.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
