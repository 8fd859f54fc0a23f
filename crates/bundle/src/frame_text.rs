//! Frame-text micro-format
//!
//! Each story travels as one markdown-like blob:
//!
//! ```text
//! # The Creation
//!
//! ![OBS Image](img1.jpg)
//!
//! text A
//!
//! ![OBS Image](img2.jpg)
//!
//! text B
//!
//! _Genesis 1-2_
//! ```
//!
//! Decoding is a two-pass scan with no regex: pass 1 locates every
//! `![alt](reference)` token and its byte range, pass 2 slices the text between
//! consecutive tokens. The trailing `_..._` source-reference line is removed
//! before pass 1 so it can never be mistaken for frame text, unless removing
//! it would leave the last frame with no text. In that case the line belongs
//! to the frame.

use storybundle_core::{FrameRecord, StoryMetadata, StoryRecord};
use tracing::warn;

/// Alt text written in front of every image reference
pub const IMAGE_ALT_TEXT: &str = "OBS Image";

// =============================================================================
// Encode
// =============================================================================

/// Encode a story title and its ordered frames into one text blob
///
/// Blocks are separated by a blank line and the blob ends with a newline. The
/// source reference, when given and non-blank, is the last line.
///
/// Without a source reference, a final frame whose text spans several lines
/// and ends in an `_..._` line does not survive decoding unchanged: that line
/// is read back as the reference. [`reference_collision`] detects this.
pub fn encode_story(title: &str, frames: &[FrameRecord], source_reference: Option<&str>) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(frames.len() * 2 + 2);
    blocks.push(format!("# {}", single_line(title)));

    for frame in frames {
        blocks.push(format!("![{}]({})", IMAGE_ALT_TEXT, frame.image_ref.trim()));
        blocks.push(frame.text.trim().to_string());
    }

    if let Some(reference) = source_reference.map(str::trim).filter(|r| !r.is_empty()) {
        blocks.push(format!("_{}_", single_line(reference)));
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn single_line(s: &str) -> String {
    s.trim().replace(['\r', '\n'], " ")
}

/// Whether decoding would take the last frame's final line as the reference
pub fn reference_collision(frames: &[FrameRecord], source_reference: Option<&str>) -> bool {
    if source_reference.is_some_and(|r| !r.trim().is_empty()) {
        return false;
    }
    let Some(last) = frames.last() else {
        return false;
    };
    match last.text.trim().rsplit_once('\n') {
        Some((_, line)) => reference_text(line.trim()).is_some(),
        // A lone `_..._` line stays with its frame
        None => false,
    }
}

// =============================================================================
// Decode
// =============================================================================

/// Result of decoding one story blob
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedStory {
    /// Title from the heading, or `Story <n>`
    pub title: String,
    /// Text of the trailing `_..._` line
    pub source_reference: Option<String>,
    /// Frames numbered from 1 in document order
    pub frames: Vec<DecodedFrame>,
    /// Matches discarded for an empty reference or empty text
    pub dropped_frames: usize,
}

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Frame number, sequential from 1
    pub number: u32,
    /// Image reference
    pub image_ref: String,
    /// Frame text, trimmed
    pub text: String,
}

impl DecodedStory {
    /// Convert into storage records for a collection
    ///
    /// Favorite flags start cleared.
    pub fn into_records(
        self,
        collection_id: &str,
        story_number: u32,
    ) -> (StoryRecord, Vec<FrameRecord>) {
        let frames = self
            .frames
            .into_iter()
            .map(|f| FrameRecord {
                collection_id: collection_id.to_string(),
                story_number,
                frame_number: f.number,
                image_ref: f.image_ref,
                text: f.text,
                is_favorite: false,
            })
            .collect();

        let story = StoryRecord {
            collection_id: collection_id.to_string(),
            story_number,
            title: self.title,
            is_favorite: false,
            metadata: StoryMetadata {
                source_reference: self.source_reference,
                ..Default::default()
            },
        };

        (story, frames)
    }
}

/// Decode a story blob
///
/// Never fails: malformed frames are dropped with a warning.
pub fn decode_story(story_number: u32, raw: &str) -> DecodedStory {
    let raw = raw.trim_start_matches('\u{feff}');
    let (title, body) = split_title(story_number, raw);
    let (body, source_reference) = match split_source_reference(body) {
        (stripped, Some(reference)) if !ends_with_bare_token(stripped) => {
            (stripped, Some(reference))
        }
        _ => (body, None),
    };

    let tokens = scan_image_tokens(body);
    let mut frames = Vec::with_capacity(tokens.len());
    let mut dropped_frames = 0;

    for (i, token) in tokens.iter().enumerate() {
        let text_end = tokens.get(i + 1).map_or(body.len(), |next| next.start);
        let text = body[token.end..text_end].trim();

        if token.reference.is_empty() || text.is_empty() {
            warn!(
                target: "storybundle::frame_text",
                story = story_number,
                position = i + 1,
                empty_reference = token.reference.is_empty(),
                empty_text = text.is_empty(),
                "Dropping malformed frame"
            );
            dropped_frames += 1;
            continue;
        }

        frames.push(DecodedFrame {
            number: frames.len() as u32 + 1,
            image_ref: token.reference.to_string(),
            text: text.to_string(),
        });
    }

    DecodedStory {
        title,
        source_reference,
        frames,
        dropped_frames,
    }
}

/// Take the `# ` heading off the first line
fn split_title(story_number: u32, raw: &str) -> (String, &str) {
    let (first, rest) = match raw.split_once('\n') {
        Some((first, rest)) => (first.trim_end_matches('\r'), rest),
        None => (raw, ""),
    };

    match first.strip_prefix("# ") {
        Some(heading) if !heading.trim().is_empty() => (heading.trim().to_string(), rest),
        Some(_) => (default_title(story_number), rest),
        None => (default_title(story_number), raw),
    }
}

fn default_title(story_number: u32) -> String {
    format!("Story {}", story_number)
}

/// Remove a trailing `_..._` line from the body
///
/// Only the last non-blank line is considered.
fn split_source_reference(body: &str) -> (&str, Option<String>) {
    let trimmed = body.trim_end();
    let line_start = trimmed.rfind('\n').map_or(0, |i| i + 1);

    match reference_text(trimmed[line_start..].trim()) {
        Some(inner) => (&trimmed[..line_start], Some(inner.to_string())),
        None => (body, None),
    }
}

/// Inner text of a `_..._` line
fn reference_text(line: &str) -> Option<&str> {
    if line.len() < 2 || !line.starts_with('_') || !line.ends_with('_') {
        return None;
    }
    Some(line[1..line.len() - 1].trim()).filter(|inner| !inner.is_empty())
}

/// True when the last image token has nothing after it
fn ends_with_bare_token(body: &str) -> bool {
    scan_image_tokens(body)
        .last()
        .is_some_and(|token| body[token.end..].trim().is_empty())
}

/// An `![alt](reference)` occurrence in the body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageToken<'a> {
    /// Byte offset of `!`
    start: usize,
    /// Byte offset just past `)`
    end: usize,
    /// Trimmed reference between the parentheses
    reference: &'a str,
}

/// Pass 1: locate image tokens left to right, non-overlapping
fn scan_image_tokens(body: &str) -> Vec<ImageToken<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(offset) = body[pos..].find("![") {
        let start = pos + offset;
        match parse_image_token(body, start) {
            Some(token) => {
                pos = token.end;
                tokens.push(token);
            }
            None => pos = start + 2,
        }
    }

    tokens
}

/// Parse a token starting at `start` (which points at `![`)
///
/// Alt text and reference must each stay on one line.
fn parse_image_token(body: &str, start: usize) -> Option<ImageToken<'_>> {
    let alt_start = start + 2;
    let alt_len = body[alt_start..].find(']')?;
    if body[alt_start..alt_start + alt_len].contains('\n') {
        return None;
    }

    let paren = alt_start + alt_len + 1;
    if !body[paren..].starts_with('(') {
        return None;
    }

    let ref_start = paren + 1;
    let ref_len = body[ref_start..].find(')')?;
    let reference = &body[ref_start..ref_start + ref_len];
    if reference.contains('\n') {
        return None;
    }

    Some(ImageToken {
        start,
        end: ref_start + ref_len + 1,
        reference: reference.trim(),
    })
}

// =============================================================================
// Sequence checks
// =============================================================================

/// Frame numbers missing from an otherwise 1-based contiguous sequence
///
/// Gaps are a data-quality warning, not an error.
pub fn frame_gaps(numbers: impl IntoIterator<Item = u32>) -> Vec<u32> {
    let mut numbers: Vec<u32> = numbers.into_iter().collect();
    numbers.sort_unstable();
    numbers.dedup();

    let mut gaps = Vec::new();
    let mut expected = 1;
    for n in numbers {
        while expected < n {
            gaps.push(expected);
            expected += 1;
        }
        expected = n.saturating_add(1);
    }
    gaps
}
