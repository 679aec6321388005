use std::sync::LazyLock;

use regex::Regex;

/// Default cap on the number of characters in a derived title.
pub const DEFAULT_MAX_TITLE_LEN: usize = 30;

/// Title shown for turns whose text is empty or whitespace only.
pub const EMPTY_MESSAGE_TITLE: &str = "(empty message)";

/// Title of last resort when every reduction step yields nothing.
pub const UNTITLED_TITLE: &str = "(untitled)";

/// Token substituted for fenced and inline code spans. The markdown strip
/// that follows removes the brackets, so titles show the bare word.
pub const CODE_PLACEHOLDER: &str = "[code]";

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]+`").unwrap());

/// Punctuation that ends the leading segment of a title.
const SENTENCE_ENDERS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Markdown decoration stripped before the character filter runs.
const MARKDOWN_CHARS: [char; 8] = ['#', '*', '_', '~', '[', ']', '(', ')'];

/// Reduces raw message text to a short display title of at most `max_len`
/// characters. Deterministic and total; every input maps to some title.
pub fn reduce(text: &str, max_len: usize) -> String {
    if text.trim().is_empty() {
        return EMPTY_MESSAGE_TITLE.to_owned();
    }

    let mut cleaned = collapse_whitespace(text);
    cleaned = FENCED_CODE_RE
        .replace_all(&cleaned, CODE_PLACEHOLDER)
        .into_owned();
    cleaned = INLINE_CODE_RE
        .replace_all(&cleaned, CODE_PLACEHOLDER)
        .into_owned();
    cleaned.retain(|c| !MARKDOWN_CHARS.contains(&c));
    cleaned.retain(is_allowed);

    let segment = cleaned
        .split(|c| SENTENCE_ENDERS.contains(&c) || c == '\n')
        .next()
        .unwrap_or("")
        .trim();

    // A segment cut short by punctuation is a poor title on its own; fall
    // back to a plain prefix of the cleaned text when that happens.
    let mut result = if segment.chars().count() < 10 && cleaned.len() > segment.len() {
        char_prefix(&cleaned, max_len)
    } else {
        segment.to_owned()
    };

    if result.chars().count() > max_len {
        result = char_prefix(&result, max_len.saturating_sub(3));
        result.push_str("...");
    }

    if result.is_empty() {
        result = char_prefix(text, max_len);
    }
    if result.is_empty() {
        result = UNTITLED_TITLE.to_owned();
    }
    result
}

/// Heuristic check for message text that is mostly code. Used to mark
/// navigator ticks, not to alter titles; two or more indicator hits count.
pub fn contains_code_marker(text: &str) -> bool {
    static INDICATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r"```",
            r"function\s+\w+\s*\(",
            r"const\s+\w+\s*=",
            r"let\s+\w+\s*=",
            r"var\s+\w+\s*=",
            r"class\s+\w+",
            r"import\s+.*from",
            r"export\s+(default|const|function)",
            r"fn\s+\w+\s*\(",
            r"impl\s+\w+",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    });

    INDICATORS
        .iter()
        .filter(|pattern| pattern.is_match(text))
        .count()
        >= 2
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// CJK ideographs, ASCII alphanumerics, whitespace and basic sentence
/// punctuation in both scripts survive the filter; everything else goes.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || ('\u{4e00}'..='\u{9fa5}').contains(&c)
        || matches!(c, ',' | '.' | '?' | '!' | '，' | '。' | '？' | '！')
}

fn char_prefix(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}
