use std::fmt;

use url::Url;

/// A chat host this system knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformId {
    ChatGpt,
    Gemini,
    Doubao,
}

/// Known host signals, checked in order; the first substring hit wins.
const HOST_TABLE: &[(&str, PlatformId)] = &[
    ("chatgpt.com", PlatformId::ChatGpt),
    ("chat.openai.com", PlatformId::ChatGpt),
    ("gemini.google.com", PlatformId::Gemini),
    ("doubao.com", PlatformId::Doubao),
];

impl PlatformId {
    /// Human-readable platform name.
    pub fn label(self) -> &'static str {
        match self {
            PlatformId::ChatGpt => "ChatGPT",
            PlatformId::Gemini => "Gemini",
            PlatformId::Doubao => "Doubao",
        }
    }

    /// Namespace used when minting record ids.
    pub fn slug(self) -> &'static str {
        match self {
            PlatformId::ChatGpt => "chatgpt",
            PlatformId::Gemini => "gemini",
            PlatformId::Doubao => "doubao",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a host signal (full URL or bare hostname) into a supported
/// platform. Pure and total; `None` means the page is not one of ours and
/// the caller must not initialize anything against it.
pub fn identify(host_signal: &str) -> Option<PlatformId> {
    let signal = host_signal.trim();
    if signal.is_empty() {
        return None;
    }

    // Prefer the parsed host so a conversation path mentioning another
    // platform's name cannot shadow the real one.
    let host = Url::parse(signal)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned));
    let haystack = host.as_deref().unwrap_or(signal);

    HOST_TABLE
        .iter()
        .find(|(needle, _)| haystack.contains(needle))
        .map(|(_, platform)| *platform)
}
