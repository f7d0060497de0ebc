//! Banned-term prompt policy, checked before any provider cost is incurred.

/// Result of a policy check. `violated_term` is kept for the server-side
/// audit log only and never reaches the user-facing error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyVerdict {
    pub allowed: bool,
    pub violated_term: Option<&'static str>,
}

// Grouped loosely: explicit content, character-pairing/fandom terms, profanity.
const BANNED_TERMS: &[&str] = &[
    "nude",
    "naked",
    "nsfw",
    "porn",
    "erotic",
    "hentai",
    "explicit",
    "topless",
    "sexual",
    "xxx",
    "rule 34",
    "r34",
    "yaoi",
    "yuri",
    "x reader",
    "fuck",
    "shit",
    "bitch",
    "slut",
    "whore",
    "gore",
];

/// Case-insensitive substring check against the banned-term list. Pure and
/// synchronous; the first match short-circuits.
pub fn evaluate(prompt: &str) -> PolicyVerdict {
    let lowered = prompt.to_lowercase();
    for term in BANNED_TERMS {
        if lowered.contains(term) {
            return PolicyVerdict {
                allowed: false,
                violated_term: Some(term),
            };
        }
    }
    PolicyVerdict {
        allowed: true,
        violated_term: None,
    }
}
