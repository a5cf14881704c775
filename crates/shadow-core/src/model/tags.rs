use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Tag given to a belief when no trait pattern matches its content.
pub const UNTAGGED: &str = "untagged";

/// The eight personality trait domains. Every belief tag, tension bucket and
/// genome segment is keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitDomain {
    Identity,
    Empathy,
    Risk,
    Caution,
    Curiosity,
    Humor,
    Depth,
    Verbosity,
}

impl TraitDomain {
    pub const ALL: [TraitDomain; 8] = [
        TraitDomain::Identity,
        TraitDomain::Empathy,
        TraitDomain::Risk,
        TraitDomain::Caution,
        TraitDomain::Curiosity,
        TraitDomain::Humor,
        TraitDomain::Depth,
        TraitDomain::Verbosity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitDomain::Identity => "identity",
            TraitDomain::Empathy => "empathy",
            TraitDomain::Risk => "risk",
            TraitDomain::Caution => "caution",
            TraitDomain::Curiosity => "curiosity",
            TraitDomain::Humor => "humor",
            TraitDomain::Depth => "depth",
            TraitDomain::Verbosity => "verbosity",
        }
    }

    /// Look up a domain by its tag label. Returns None for "untagged" and
    /// any label outside the fixed eight.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == tag)
    }
}

impl fmt::Display for TraitDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TraitDomain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(&s.to_ascii_lowercase()).ok_or_else(|| CoreError::UnknownTrait(s.to_string()))
    }
}

// Locked. This table is the only channel through which every trait can
// receive tension; editing it silently starves a genome segment.
const TAG_PATTERNS: &[(&str, &[TraitDomain])] = &[
    (r"\b(I|me|my|myself|mine)\b", &[TraitDomain::Identity]),
    (
        r"\b(feel|feeling|emotion|love|loving|hate|hating|care|caring|angry|sad|happy|joy|joyful|fear|afraid|scare|scared|scary|terrify|terrified|terrifying|excite|excited|exciting|amaze|amazed|amazing|wonder|wonderful|terrible|awful|hurt|pain)\b",
        &[TraitDomain::Empathy],
    ),
    (
        r"\b(risk|risky|danger|dangerous|safe|safety|bet|gamble|chance|uncertain|uncertainty|threat|hazard)\b",
        &[TraitDomain::Risk, TraitDomain::Caution],
    ),
    (
        r"\b(what if|idea|explore|exploring|curious|wonder|imagine|maybe|possibly|potential)\b",
        &[TraitDomain::Curiosity],
    ),
    (
        r"\b(joke|funny|lol|lmao|sarcasm|sarcastic|roast|meme|hilarious|laugh)\b",
        &[TraitDomain::Humor],
    ),
    (
        r"\b(explain|because|therefore|thus|hence|reason|deep|depth|detail|detailed|analyze|complex)\b",
        &[TraitDomain::Depth],
    ),
    (
        r"\b(long|short|brief|concise|wordy|verbose|quick|elaborate)\b",
        &[TraitDomain::Verbosity],
    ),
];

// Locked alongside the tag table: insertion-time contradiction and support
// edges are seeded from these two cue classes only.
const POSITIVE_CUES: &str = r"\b(love|loving|loved|like|enjoy|enjoying|happy|joy|joyful|glad|amazing|amazed|wonderful|great|good|excited|exciting|alive|hope|hopeful|fun|trust|calm|brave|thrill|thrilling|beautiful|proud)\b";
const NEGATIVE_CUES: &str = r"\b(hate|hating|hated|fear|afraid|scared|scary|terrified|terrifying|terrible|awful|hurt|pain|painful|kill|kills|die|dies|death|dead|destroy|destroys|suicide|sad|angry|bad|worst|dread|hopeless|miserable|regret)\b";

fn compile(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by tests.
    Regex::new(&format!("(?i){pattern}")).expect("locked pattern must compile")
}

fn tag_table() -> &'static [(Regex, &'static [TraitDomain])] {
    static TABLE: OnceLock<Vec<(Regex, &'static [TraitDomain])>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TAG_PATTERNS
            .iter()
            .map(|(pattern, domains)| (compile(pattern), *domains))
            .collect()
    })
}

fn sentiment_table() -> &'static (Regex, Regex) {
    static TABLE: OnceLock<(Regex, Regex)> = OnceLock::new();
    TABLE.get_or_init(|| (compile(POSITIVE_CUES), compile(NEGATIVE_CUES)))
}

/// Extract trait tags from free text using the locked pattern table.
///
/// Tags come back in table order without duplicates, so the first tag is
/// stable for a given text. Text matching nothing gets `["untagged"]`.
pub fn extract_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for (re, domains) in tag_table() {
        if re.is_match(text) {
            for domain in domains.iter() {
                let label = domain.as_str();
                if !tags.iter().any(|t| t == label) {
                    tags.push(label.to_string());
                }
            }
        }
    }
    if tags.is_empty() {
        tags.push(UNTAGGED.to_string());
    }
    tags
}

/// Polarity of a text according to the locked cue tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    /// No cue at all, or cues from both classes.
    Neutral,
}

impl Sentiment {
    pub fn opposes(self, other: Sentiment) -> bool {
        matches!(
            (self, other),
            (Sentiment::Positive, Sentiment::Negative) | (Sentiment::Negative, Sentiment::Positive)
        )
    }

    pub fn agrees(self, other: Sentiment) -> bool {
        self != Sentiment::Neutral && self == other
    }
}

pub fn classify_sentiment(text: &str) -> Sentiment {
    let (positive, negative) = sentiment_table();
    match (positive.is_match(text), negative.is_match(text)) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}
