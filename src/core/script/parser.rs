//! Line-oriented script segmenter
//!
//! Scripts look like:
//!
//! ```text
//! [ずんだもん][ノーマル] こんにちはなのだ。
//! [めたん][あまあま] [喜び]今日もよろしくね。
//! 続きの行はひとつ前のタグに追記されます。
//! ```
//!
//! Every tagged line opens a new segment. Untagged lines are appended to the
//! open segment, and any chunk that would push a segment past the character
//! budget is split at the rightmost fitting punctuation mark, or cut hard
//! when none fits.

use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ScriptParser, Segment};
use crate::core::diagnostics::{Diagnostic, DiagnosticObserver, SharedObserver, tracing_observer};

/// Default per-segment character budget
pub const DEFAULT_MAX_SEGMENT_CHARS: usize = 200;

/// Marks a split may land after
const SPLIT_PUNCTUATION: [char; 4] = ['。', '、', '！', '？'];

/// Inline mood words stripped from segment text before emission
pub const EMOTION_TAGS: [&str; 18] = [
    "解説",
    "疑問",
    "驚き",
    "理解",
    "落ち着き",
    "納得",
    "断定",
    "呼びかけ",
    "まとめ",
    "通常",
    "喜び",
    "怒り",
    "ノーマル",
    "あまあま",
    "ツンツン",
    "セクシー",
    "ヒソヒソ",
    "ささやき",
];

// `[speaker][style] text`
static SCRIPT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[.+?\])\s*(\[.+?\])\s*(.*)").expect("script line pattern is valid")
});

static EMOTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\[({})\]", EMOTION_TAGS.join("|")))
        .expect("emotion tag pattern is valid")
});

static BASE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[.+?\])").expect("base tag pattern is valid"));

/// Segmenter for `[speaker][style]` annotated scripts
#[derive(Clone)]
pub struct TextParser {
    max_chars: usize,
    observer: SharedObserver,
}

impl std::fmt::Debug for TextParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextParser")
            .field("max_chars", &self.max_chars)
            .finish_non_exhaustive()
    }
}

impl Default for TextParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEGMENT_CHARS)
    }
}

impl TextParser {
    /// Create a parser with the given character budget (at least 1)
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            observer: tracing_observer(),
        }
    }

    /// Route diagnostics to `observer` instead of `tracing`
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }
}

impl ScriptParser for TextParser {
    fn parse(&self, script: &str, fallback_tag: &str) -> Vec<Segment> {
        let mut state = ParseState::new(self.max_chars, self.observer.as_ref());

        for line in script.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            state.process_line(line);
        }

        state.finish(fallback_tag)
    }
}

/// Mutable state for a single parse pass
struct ParseState<'a> {
    max_chars: usize,
    observer: &'a dyn DiagnosticObserver,
    segments: Vec<Segment>,
    current_tag: Option<String>,
    current_text: String,
    current_chars: usize,
    // untagged text seen before the first tag
    pending: String,
}

impl<'a> ParseState<'a> {
    fn new(max_chars: usize, observer: &'a dyn DiagnosticObserver) -> Self {
        Self {
            max_chars,
            observer,
            segments: Vec::new(),
            current_tag: None,
            current_text: String::new(),
            current_chars: 0,
            pending: String::new(),
        }
    }

    fn process_line(&mut self, line: &str) {
        match SCRIPT_LINE.captures(line) {
            Some(caps) => {
                let tag = format!("{}{}", &caps[1], &caps[2]);
                let text = caps.get(3).map_or("", |m| m.as_str());
                self.process_tagged_line(tag, text);
            }
            None => self.process_untagged_line(line),
        }
    }

    fn process_tagged_line(&mut self, tag: String, text: &str) {
        // One tagged line never merges into the previous segment
        self.flush();
        self.current_tag = Some(tag);

        if self.pending.is_empty() {
            self.append_and_split(text);
        } else {
            let mut merged = mem::take(&mut self.pending);
            if !text.is_empty() {
                merged.push(' ');
                merged.push_str(text);
            }
            self.append_and_split(&merged);
        }
    }

    fn process_untagged_line(&mut self, line: &str) {
        if self.current_tag.is_some() {
            self.append_and_split(line);
            return;
        }

        self.observer.observe(Diagnostic::UntaggedLineBuffered {
            line: line.to_string(),
        });
        if !self.pending.is_empty() {
            self.pending.push(' ');
        }
        self.pending.push_str(line);
    }

    fn append_and_split(&mut self, text: &str) {
        let mut rest = text;

        while !rest.is_empty() {
            let (head, tail) = self.split_to_fit(rest);

            if !head.is_empty() {
                if self.current_chars > 0 {
                    self.current_text.push(' ');
                    self.current_chars += 1;
                }
                self.current_text.push_str(head);
                self.current_chars += head.chars().count();
            }

            if tail.is_empty() {
                break;
            }

            self.observer.observe(Diagnostic::SegmentSplit {
                tag: self.current_tag.clone().unwrap_or_default(),
                limit: self.max_chars,
            });
            self.flush();
            rest = tail;
        }
    }

    /// Split `text` into the part that fits the open segment and the remainder
    fn split_to_fit<'t>(&self, text: &'t str) -> (&'t str, &'t str) {
        let used = self.current_chars + usize::from(self.current_chars > 0);
        if used + text.chars().count() <= self.max_chars {
            return (text, "");
        }
        if used >= self.max_chars {
            return ("", text);
        }

        let capacity = self.max_chars - used;

        let punctuation_cut = text
            .char_indices()
            .take(capacity)
            .filter(|(_, ch)| SPLIT_PUNCTUATION.contains(ch))
            .last()
            .map(|(offset, ch)| offset + ch.len_utf8());

        let cut = punctuation_cut.unwrap_or_else(|| {
            let cut = text
                .char_indices()
                .nth(capacity)
                .map_or(text.len(), |(offset, _)| offset);
            snap_out_of_emotion_tag(text, cut, used == 0)
        });

        text.split_at(cut)
    }

    fn flush(&mut self) {
        let text = mem::take(&mut self.current_text);
        self.current_chars = 0;

        if text.is_empty() {
            return;
        }
        if let Some(tag) = self.current_tag.clone() {
            self.emit(&tag, &text);
        }
    }

    fn emit(&mut self, tag: &str, raw: &str) {
        let cleaned = EMOTION_TAG.replace_all(raw, "");
        let text = cleaned.trim();
        if text.is_empty() {
            return;
        }

        let base_tag = match BASE_TAG.captures(tag).and_then(|caps| caps.get(1)) {
            Some(m) => m.as_str().to_string(),
            None => {
                self.observer.observe(Diagnostic::BaseTagMissing {
                    tag: tag.to_string(),
                });
                String::new()
            }
        };

        self.segments.push(Segment::new(tag, base_tag, text));
    }

    fn finish(mut self, fallback_tag: &str) -> Vec<Segment> {
        self.flush();

        if self.pending.is_empty() {
            return self.segments;
        }

        // Pending text only survives to here when no tagged line was seen
        let pending = mem::take(&mut self.pending);
        let tag = if !fallback_tag.is_empty() {
            self.observer.observe(Diagnostic::TrailingTextFallback {
                tag: fallback_tag.to_string(),
            });
            Some(fallback_tag.to_string())
        } else {
            self.observer
                .observe(Diagnostic::TrailingTextDropped { text: pending.clone() });
            None
        };

        if let Some(tag) = tag {
            self.current_tag = Some(tag);
            self.append_and_split(&pending);
            self.flush();
        }

        self.segments
    }
}

/// Move a hard cut that lands inside an emotion tag to the tag's start, or
/// past its end when nothing would precede it in an empty segment
fn snap_out_of_emotion_tag(text: &str, cut: usize, segment_empty: bool) -> usize {
    match EMOTION_TAG
        .find_iter(text)
        .find(|m| m.start() < cut && cut < m.end())
    {
        Some(m) if m.start() > 0 || !segment_empty => m.start(),
        Some(m) => m.end(),
        None => cut,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::diagnostics::CollectingObserver;

    const ZUNDA: &str = "[ずんだもん][ノーマル]";
    const METAN: &str = "[めたん][ノーマル]";

    fn parser_with(max_chars: usize) -> (TextParser, Arc<CollectingObserver>) {
        let observer = Arc::new(CollectingObserver::new());
        let parser = TextParser::new(max_chars).with_observer(observer.clone());
        (parser, observer)
    }

    fn texts(segments: &[Segment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_tagged_lines_map_one_to_one() {
        let (parser, observer) = parser_with(200);
        let script = "[ずんだもん][ノーマル] こんにちはなのだ。\n\n[めたん][あまあま] よろしくね。\n[ずんだもん][ささやき] ないしょなのだ。\n";

        let segments = parser.parse(script, "");

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].combined_tag, ZUNDA);
        assert_eq!(segments[0].base_tag, "[ずんだもん]");
        assert_eq!(segments[1].combined_tag, "[めたん][あまあま]");
        assert_eq!(segments[1].base_tag, "[めたん]");
        assert_eq!(
            texts(&segments),
            vec!["こんにちはなのだ。", "よろしくね。", "ないしょなのだ。"]
        );
        assert!(observer.is_empty());
    }

    #[test]
    fn test_identical_tagged_lines_stay_separate() {
        let (parser, _) = parser_with(200);
        let script = format!("{ZUNDA} ひとつめ\n{ZUNDA} ふたつめ");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["ひとつめ", "ふたつめ"]);
        assert!(segments.iter().all(|s| s.combined_tag == ZUNDA));
    }

    #[test]
    fn test_untagged_line_appends_to_open_segment() {
        let (parser, _) = parser_with(200);
        let script = format!("{METAN} こんにちは\n今日はいい天気");

        let segments = parser.parse(&script, "");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "こんにちは 今日はいい天気");
    }

    #[test]
    fn test_untagged_after_flush_keeps_current_tag() {
        let (parser, _) = parser_with(5);
        let script = format!("{METAN} あいうえおかきくけこ\nさしす");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あいうえお", "かきくけこ", "さしす"]);
        assert!(segments.iter().all(|s| s.combined_tag == METAN));
    }

    #[test]
    fn test_long_line_splits_and_preserves_text() {
        let (parser, observer) = parser_with(20);
        let line = "これはとても長い文章です、句読点もあります。しかしまだまだ続きます！本当に長いのです？おしまい";
        let script = format!("{ZUNDA} {line}");

        let segments = parser.parse(&script, "");

        assert!(segments.len() >= 2);
        assert!(segments.iter().all(|s| s.char_count() <= 20));
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, line);
        assert!(
            observer
                .events()
                .iter()
                .any(|d| matches!(d, Diagnostic::SegmentSplit { limit: 20, .. }))
        );
    }

    #[test]
    fn test_split_at_rightmost_punctuation_in_budget() {
        let (parser, _) = parser_with(10);
        let script = format!("{ZUNDA} あいう、えお。かきくけこ");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あいう、えお。", "かきくけこ"]);
    }

    #[test]
    fn test_punctuation_exactly_at_budget_boundary() {
        let (parser, _) = parser_with(5);
        let script = format!("{ZUNDA} あいうえ。かき");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あいうえ。", "かき"]);
    }

    #[test]
    fn test_mark_past_budget_is_not_used() {
        let (parser, _) = parser_with(5);
        let script = format!("{ZUNDA} あ、いうえ。かき");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あ、", "いうえ。", "かき"]);
    }

    #[test]
    fn test_hard_cut_without_punctuation() {
        let (parser, _) = parser_with(5);
        let script = format!("{ZUNDA} あいうえおかきく");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あいうえお", "かきく"]);
    }

    #[test]
    fn test_hard_cut_keeps_emotion_tag_whole() {
        let (parser, _) = parser_with(5);
        let script = format!("{ZUNDA} あいう[喜び]えお");

        let segments = parser.parse(&script, "");

        assert!(segments.iter().all(|s| !s.text.contains(['[', ']'])));
        assert!(segments.iter().all(|s| s.char_count() <= 5));
        assert_eq!(texts(&segments).concat(), "あいうえお");
    }

    #[test]
    fn test_hard_cut_at_segment_start_skips_past_emotion_tag() {
        let (parser, _) = parser_with(3);
        let script = format!("{ZUNDA} [落ち着き]かきくけ");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["かきく", "け"]);
    }

    #[test]
    fn test_appended_text_respects_open_segment_length() {
        let (parser, _) = parser_with(10);
        let script = format!("{ZUNDA} あいうえお\nかきくけこさしすせそ");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["あいうえお かきくけ", "こさしすせそ"]);
    }

    #[test]
    fn test_emotion_tags_are_stripped() {
        let (parser, _) = parser_with(200);
        let script = format!("{ZUNDA} [喜び]やったのだ[驚き]！\n{METAN} [怒り]");

        let segments = parser.parse(&script, "");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "やったのだ！");
    }

    #[test]
    fn test_unknown_bracket_text_is_kept() {
        let (parser, _) = parser_with(200);
        let script = format!("{ZUNDA} [未知]のタグ");

        let segments = parser.parse(&script, "");

        assert_eq!(segments[0].text, "[未知]のタグ");
    }

    #[test]
    fn test_leading_untagged_text_merges_into_next_tag() {
        let (parser, observer) = parser_with(200);
        let script = format!("前置きです\nさらに前置き\n{METAN} 本文です");

        let segments = parser.parse(&script, "");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].combined_tag, METAN);
        assert_eq!(segments[0].text, "前置きです さらに前置き 本文です");
        let buffered = observer
            .events()
            .iter()
            .filter(|d| matches!(d, Diagnostic::UntaggedLineBuffered { .. }))
            .count();
        assert_eq!(buffered, 2);
    }

    #[test]
    fn test_untagged_script_uses_fallback_tag() {
        let (parser, observer) = parser_with(200);

        let segments = parser.parse("タグのないテキスト", ZUNDA);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].combined_tag, ZUNDA);
        assert_eq!(segments[0].base_tag, "[ずんだもん]");
        assert!(
            observer
                .events()
                .contains(&Diagnostic::TrailingTextFallback { tag: ZUNDA.to_string() })
        );
    }

    #[test]
    fn test_untagged_script_without_fallback_is_dropped() {
        let (parser, observer) = parser_with(200);

        let segments = parser.parse("行き場のないテキスト", "");

        assert!(segments.is_empty());
        assert!(observer.events().contains(&Diagnostic::TrailingTextDropped {
            text: "行き場のないテキスト".to_string()
        }));
    }

    #[test]
    fn test_trailing_untagged_text_joins_last_segment() {
        let (parser, observer) = parser_with(200);
        let script = format!("{ZUNDA} はじめ\n{METAN} おわり\nあとがき");

        let segments = parser.parse(&script, ZUNDA);

        assert_eq!(texts(&segments), vec!["はじめ", "おわり あとがき"]);
        assert!(!observer.events().iter().any(|d| matches!(
            d,
            Diagnostic::TrailingTextFallback { .. } | Diagnostic::TrailingTextDropped { .. }
        )));
    }

    #[test]
    fn test_fallback_text_still_respects_budget() {
        let (parser, _) = parser_with(4);

        let segments = parser.parse("あいうえおか", ZUNDA);

        assert_eq!(texts(&segments), vec!["あいうえ", "おか"]);
    }

    #[test]
    fn test_fallback_without_base_tag_reports_diagnostic() {
        let (parser, observer) = parser_with(200);

        let segments = parser.parse("テキスト", "nobrackets");

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].base_tag, "");
        assert!(observer.events().contains(&Diagnostic::BaseTagMissing {
            tag: "nobrackets".to_string()
        }));
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let (parser, _) = parser_with(200);
        let script = format!("\r\n   \r\n{ZUNDA} 一行目\r\n\r\n{METAN} 二行目\r\n");

        let segments = parser.parse(&script, "");

        assert_eq!(texts(&segments), vec!["一行目", "二行目"]);
    }

    #[test]
    fn test_budget_is_clamped() {
        assert_eq!(TextParser::new(0).max_chars(), 1);
        assert_eq!(TextParser::default().max_chars(), DEFAULT_MAX_SEGMENT_CHARS);
    }

    #[test]
    fn test_parser_is_reusable() {
        let (parser, _) = parser_with(200);
        let script = format!("{ZUNDA} いち");

        assert_eq!(parser.parse(&script, "").len(), 1);
        assert_eq!(parser.parse(&script, "").len(), 1);
    }
}
