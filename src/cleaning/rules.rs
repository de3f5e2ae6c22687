use std::sync::OnceLock;

use regex::Regex;

/// Output of one rule: transformed text plus the number of spans removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub text: String,
    pub removed: usize,
}

/// A named, pure text transform.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    transform: fn(&str) -> RuleOutcome,
}

impl Rule {
    pub fn apply(&self, text: &str) -> RuleOutcome {
        (self.transform)(text)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Rule").field(&self.name).finish()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

const CATALOG: &[Rule] = &[
    Rule {
        name: "strip_headings",
        transform: strip_headings,
    },
    Rule {
        name: "strip_bracketed_years",
        transform: strip_bracketed_years,
    },
    Rule {
        name: "strip_brackets",
        transform: strip_brackets,
    },
    Rule {
        name: "strip_parentheticals",
        transform: strip_parentheticals,
    },
    Rule {
        name: "strip_html_tags",
        transform: strip_html_tags,
    },
    Rule {
        name: "strip_urls",
        transform: strip_urls,
    },
    Rule {
        name: "strip_timestamps",
        transform: strip_timestamps,
    },
    Rule {
        name: "strip_speaker_labels",
        transform: strip_speaker_labels,
    },
    Rule {
        name: "collapse_whitespace",
        transform: collapse_whitespace,
    },
];

pub fn catalog() -> &'static [Rule] {
    CATALOG
}

pub fn rule_by_name(name: &str) -> Option<Rule> {
    CATALOG.iter().copied().find(|rule| rule.name == name)
}

/// Markdown-style heading lines: `# Title` through `###### Title`
fn re_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+[^\n]*$").unwrap())
}

/// `[5711]`, `[1948-1952]`, `(1939–45)`
fn re_bracketed_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\[\s*\d{4}\s*(?:[-–—]\s*\d{2,4}\s*)?\]|\(\s*\d{4}\s*[-–—]\s*\d{2,4}\s*\)",
        )
        .unwrap()
    })
}

/// Innermost square-bracket spans on one line
fn re_brackets() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\[\]\n]*\]").unwrap())
}

fn re_parenthetical() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^()\n]*\)").unwrap())
}

fn re_html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").unwrap())
}

fn re_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:https?://|www\.)\S+").unwrap())
}

/// `00:01:02,500 --> 00:01:04,000`, `12:30`, `1:02:03.5`; a cue range is one span
fn re_timestamp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"\b\d{1,2}:\d{2}(?::\d{2})?(?:[.,]\d{1,3})?",
            r"(?:\s*-->\s*\d{1,2}:\d{2}(?::\d{2})?(?:[.,]\d{1,3})?)?",
        ))
        .unwrap()
    })
}

/// `SPEAKER 1: ` / `Dr. Cohen: ` at line start
fn re_speaker_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*\p{Lu}[\p{L}\p{N} .'\-]{0,30}:[ \t]+").unwrap())
}

fn re_horizontal_space_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\S\n]{2,}").unwrap())
}

fn re_blank_line_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[^\S\n]*(?:\n[^\S\n]*){2,}").unwrap())
}

fn remove_matches(re: &Regex, text: &str, replacement: &str) -> RuleOutcome {
    let removed = re.find_iter(text).count();
    if removed == 0 {
        return RuleOutcome {
            text: text.to_string(),
            removed,
        };
    }
    RuleOutcome {
        text: re.replace_all(text, replacement).into_owned(),
        removed,
    }
}

fn strip_headings(text: &str) -> RuleOutcome {
    remove_matches(re_heading(), text, "")
}

fn strip_bracketed_years(text: &str) -> RuleOutcome {
    remove_matches(re_bracketed_year(), text, "")
}

fn strip_brackets(text: &str) -> RuleOutcome {
    remove_matches(re_brackets(), text, "")
}

fn strip_parentheticals(text: &str) -> RuleOutcome {
    remove_matches(re_parenthetical(), text, "")
}

fn strip_html_tags(text: &str) -> RuleOutcome {
    remove_matches(re_html_tag(), text, " ")
}

fn strip_urls(text: &str) -> RuleOutcome {
    remove_matches(re_url(), text, "")
}

fn strip_timestamps(text: &str) -> RuleOutcome {
    remove_matches(re_timestamp(), text, "")
}

fn strip_speaker_labels(text: &str) -> RuleOutcome {
    remove_matches(re_speaker_label(), text, "")
}

/// Runs of horizontal whitespace become one space; three or more line
/// breaks become a single blank line.
fn collapse_whitespace(text: &str) -> RuleOutcome {
    let spaces = remove_matches(re_horizontal_space_run(), text, " ");
    let lines = remove_matches(re_blank_line_run(), &spaces.text, "\n\n");
    RuleOutcome {
        text: lines.text,
        removed: spaces.removed + lines.removed,
    }
}
