use regex::Regex;
use std::sync::OnceLock;

pub const SLUG_MAX_LEN: usize = 50;
pub const TITLE_MAX_LEN: usize = 50;

const ACTION_VERBS: &[&str] = &[
    "implement",
    "create",
    "add",
    "build",
    "develop",
    "write",
    "update",
    "modify",
    "refactor",
    "fix",
    "remove",
    "delete",
];

// ---------------------------------------------------------------------------
// Slugify
// ---------------------------------------------------------------------------

static NON_ALNUM_RE: OnceLock<Regex> = OnceLock::new();

fn non_alnum_re() -> &'static Regex {
    NON_ALNUM_RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap())
}

/// Lower-case, collapse every non-alphanumeric run into one hyphen, trim
/// hyphens from both ends, cap at 50 characters. Idempotent.
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let collapsed = non_alnum_re().replace_all(&lower, "-");
    let trimmed = collapsed.trim_matches('-');
    // Output is pure ASCII here, so byte slicing is safe.
    let capped = &trimmed[..trimmed.len().min(SLUG_MAX_LEN)];
    capped.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Short titles
// ---------------------------------------------------------------------------

/// Condense requirement text into a task title fragment.
///
/// Keeps the first sentence, drops a leading action verb when at least two
/// words remain after it, lower-cases the first letter unless the text opens
/// with an acronym, and caps the result at 50 characters.
pub fn short_title(text: &str) -> String {
    let sentence = text
        .split(['.', '!', '?'])
        .next()
        .unwrap_or_default()
        .trim();

    let stripped = strip_action_verb(sentence);
    let cased = lower_first(stripped);
    truncate_with_ellipsis(&cased, TITLE_MAX_LEN)
}

fn strip_action_verb(sentence: &str) -> &str {
    let Some((first, rest)) = sentence.split_once(char::is_whitespace) else {
        return sentence;
    };
    let rest = rest.trim_start();
    let is_verb = ACTION_VERBS
        .iter()
        .any(|v| v.eq_ignore_ascii_case(first));
    if is_verb && rest.split_whitespace().count() >= 2 {
        rest
    } else {
        sentence
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let second = s.chars().nth(1);
    let acronym = first.is_uppercase() && second.is_some_and(char::is_uppercase);
    if acronym {
        s.to_string()
    } else {
        first.to_lowercase().chain(chars).collect()
    }
}

pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

// ---------------------------------------------------------------------------
// Markdown helpers
// ---------------------------------------------------------------------------

/// `- item` lines, or the default text when there is nothing to list.
pub fn bullet_list(items: &[String], default: &str) -> String {
    if items.is_empty() {
        return default.to_string();
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn checklist(items: &[String], default: &str) -> String {
    if items.is_empty() {
        return default.to_string();
    }
    items
        .iter()
        .map(|i| format!("- [ ] {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn numbered_list(items: &[String], default: &str) -> String {
    if items.is_empty() {
        return default.to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {item}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// "nonFunctionalRequirements" / "out_of_scope" -> "Non Functional Requirements" / "Out Of Scope"
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
            current.push(c);
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(f) => f.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape a value for use inside a markdown table cell.
pub fn table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
