//! Parser for YouTube's timedtext caption XML.
//!
//! ```xml
//! <transcript>
//!   <text start="0.5" dur="1.54">Hey there</text>
//!   <text start="2.1" dur="3.2">it&amp;#39;s me</text>
//! </transcript>
//! ```

use crate::transcript::TranscriptSegment;
use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

static CUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("valid cue regex"));

static ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("valid attribute regex"));

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));

/// Parse caption cues in document order. Cues whose text is blank are skipped.
pub fn parse_timedtext(xml: &str) -> Vec<TranscriptSegment> {
    CUE.captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let raw = caps.get(2).map_or("", |m| m.as_str());

            let text = clean_text(raw);
            if text.is_empty() {
                return None;
            }

            let mut start = 0.0;
            let mut dur = 0.0;
            for attr in ATTR.captures_iter(attrs) {
                let value = attr[2].parse::<f64>().unwrap_or(0.0);
                match &attr[1] {
                    "start" => start = value,
                    "dur" => dur = value,
                    _ => {}
                }
            }

            Some(TranscriptSegment::new(text, start, dur))
        })
        .collect()
}

/// Whether the document looks like a timedtext response at all.
pub fn is_timedtext(xml: &str) -> bool {
    xml.contains("<transcript")
}

/// Undo the XML escaping, then the HTML escaping YouTube applies inside it,
/// and drop inline formatting such as `<font>`.
fn clean_text(raw: &str) -> String {
    let xml_decoded = decode_html_entities(raw);
    let html_decoded = decode_html_entities(&xml_decoded);
    let without_markup = MARKUP.replace_all(&html_decoded, "");
    without_markup.trim().to_string()
}
