//! Fixed keyword families used by the text analyzers.
//!
//! These mirror the marker vocabularies public-speaking evaluators work
//! with: section markers, transitions, purpose verbs, discourse glue, and
//! the hesitation fillers that disfluency scoring counts.

/// Default filler lexicon; overridable through configuration.
pub const FILLER_WORDS: &[&str] = &[
    "um",
    "uh",
    "ah",
    "er",
    "like",
    "you know",
    "so",
    "actually",
    "basically",
    "hmm",
    "sort of",
    "kind of",
    "literally",
    "i guess",
    "kinda",
    "gonna",
    "wanna",
];

/// Phrases signalling the opening of a speech.
pub const INTRO_KEYWORDS: &[&str] = &[
    "introduction",
    "introduce",
    "begin",
    "today",
    "topic",
    "discuss",
    "talk about",
    "welcome",
    "good morning",
    "good afternoon",
    "hello",
    "thank you for",
    "i am here to",
    "i will be",
    "starting with",
    "first of all",
    "to start with",
    "i would like to",
];

/// Phrases signalling the close of a speech.
pub const CONCLUSION_KEYWORDS: &[&str] = &[
    "conclusion",
    "conclude",
    "summarize",
    "summary",
    "in closing",
    "to sum up",
    "finally",
    "lastly",
    "in summary",
    "to conclude",
    "wrapping up",
    "in the end",
    "as we have seen",
    "in conclusion",
    "to summarize",
    "overall",
    "therefore",
    "thus",
    "in short",
];

/// Transition words counted over the body for the coherence sub-score.
pub const TRANSITION_KEYWORDS: &[&str] = &[
    "first",
    "second",
    "third",
    "next",
    "then",
    "furthermore",
    "additionally",
    "moreover",
    "another",
    "subsequently",
    "besides",
    "also",
    "finally",
    "however",
    "nevertheless",
    "therefore",
    "consequently",
];

/// Multi-word section-to-section bridges.
pub const SECTION_TRANSITIONS: &[&str] = &[
    "moving on to",
    "now let's discuss",
    "turning our attention to",
    "having discussed",
    "after examining",
    "with that in mind",
    "considering this",
    "given these points",
    "now that we understand",
    "building on this idea",
    "this leads us to",
];

/// Purpose-verb families keyed by intent.
pub const PURPOSE_INFORMATIVE: &[&str] = &[
    "explain",
    "inform",
    "describe",
    "present",
    "show",
    "demonstrate",
    "illustrate",
    "clarify",
];
pub const PURPOSE_PERSUASIVE: &[&str] = &[
    "convince",
    "persuade",
    "argue",
    "suggest",
    "recommend",
    "propose",
    "advocate",
    "urge",
];
pub const PURPOSE_MOTIVATIONAL: &[&str] = &[
    "inspire",
    "motivate",
    "encourage",
    "challenge",
    "stimulate",
    "energize",
    "empower",
];
pub const PURPOSE_INSTRUCTIONAL: &[&str] = &[
    "teach",
    "guide",
    "instruct",
    "direct",
    "train",
    "educate",
    "coach",
    "mentor",
];

/// All purpose families with their labels.
pub const PURPOSE_FAMILIES: &[(&str, &[&str])] = &[
    ("informative", PURPOSE_INFORMATIVE),
    ("persuasive", PURPOSE_PERSUASIVE),
    ("motivational", PURPOSE_MOTIVATIONAL),
    ("instructional", PURPOSE_INSTRUCTIONAL),
];

/// Discourse markers scored for structural alignment.
pub const DISCOURSE_MARKERS: &[&str] = &[
    "for example",
    "for instance",
    "specifically",
    "in particular",
    "in other words",
    "that is",
    "on the other hand",
    "in contrast",
    "as a result",
    "because",
    "since",
    "hence",
    "meanwhile",
    "similarly",
    "likewise",
];

/// Narrative markers enabling the creative-content bonus.
pub const NARRATIVE_MARKERS: &[&str] = &[
    "once",
    "when i was",
    "story",
    "imagine",
    "picture this",
    "remember when",
    "one day",
    "years ago",
];

/// Emotion words supporting the creative-content bonus.
pub const EMOTION_WORDS: &[&str] = &[
    "love", "fear", "joy", "hope", "dream", "heart", "afraid", "proud", "happy", "sad",
];

/// Words whose emphasis matters; used to widen key-phrase extraction.
pub const EMPHASIS_INDICATORS: &[&str] = &[
    "important",
    "critical",
    "essential",
    "crucial",
    "significant",
    "key",
    "primary",
    "fundamental",
    "vital",
    "central",
    "remember",
    "consider",
];

/// Everyday words excluded from the advanced-vocabulary count.
pub const BASIC_WORDS: &[&str] = &[
    "good", "bad", "nice", "thing", "stuff", "big", "small", "very", "really", "like", "said",
    "went", "got", "put", "took", "made", "did", "get", "know", "because", "different",
    "something", "actually", "probably",
];

/// Subordinating conjunctions and relative pronouns, the cue for complex
/// sentence structure.
pub const SUBORDINATORS: &[&str] = &[
    "because", "although", "since", "while", "whereas", "if", "unless", "until", "when",
    "where", "who", "which", "that",
];

/// Minimal embedded stopword set, the fallback when the reference data
/// directory does not ship `stopwords.en.txt`.
pub const FALLBACK_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "had",
    "has", "have", "he", "her", "his", "i", "in", "is", "it", "its", "me", "my", "of", "on",
    "or", "our", "she", "so", "that", "the", "their", "them", "then", "there", "they",
    "this", "to", "was", "we", "were", "what", "which", "who", "will", "with", "you",
    "your", "not", "no", "do", "does", "did", "can", "could", "would", "should", "am",
];
