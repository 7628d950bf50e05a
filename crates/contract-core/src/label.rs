//! Display labels derived from field names.
//!
//! Underscores are word separators here, never hierarchy separators: a label
//! is built from the whole last dot-segment, so
//! `purchase.included_addenda_flags` reads "Included Addenda Flags".

/// Title shown for the ungrouped family.
pub const UNGROUPED_TITLE: &str = "General";

const OPTION_FALLBACK_SEGMENTS: usize = 3;

/// Label for a field: its last dot-segment with camelCase boundaries and
/// underscores expanded to spaces, each word title-cased.
#[must_use]
pub fn format_label(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    humanize(last)
}

/// A group key with its `_group` / `.group` suffix removed.
#[must_use]
pub fn group_base(group_key: &str) -> &str {
    group_key
        .strip_suffix("_group")
        .or_else(|| group_key.strip_suffix(".group"))
        .unwrap_or(group_key)
}

/// Label for one option of a group.
///
/// Option names are the group's base path with an option-specific suffix
/// appended, with no guaranteed separator. Segments (split on `.` and `_`)
/// that still match the base left to right are consumed; what remains is the
/// label. When nothing remains, the last few segments of the option name are
/// used instead.
#[must_use]
pub fn format_option_label(option_name: &str, group_key: &str) -> String {
    let base = segments(group_base(group_key));
    let option = segments(option_name);

    let matched = option
        .iter()
        .zip(base.iter())
        .take_while(|(o, b)| o.eq_ignore_ascii_case(b))
        .count();

    let rest = &option[matched..];
    let words = if rest.is_empty() {
        &option[option.len().saturating_sub(OPTION_FALLBACK_SEGMENTS)..]
    } else {
        rest
    };
    humanize(&words.join(" "))
}

/// Section title for a family key.
#[must_use]
pub fn section_title(family: &str) -> String {
    if family.is_empty() {
        return UNGROUPED_TITLE.to_string();
    }
    family
        .split('.')
        .filter(|s| !s.is_empty())
        .map(humanize)
        .collect::<Vec<_>>()
        .join(" / ")
}

fn segments(name: &str) -> Vec<&str> {
    name.split(['.', '_'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Expand camelCase and `_`/`-` separators to spaces and title-case words.
fn humanize(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut spaced = String::with_capacity(raw.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            spaced.push(' ');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                spaced.push(' ');
            }
        }
        spaced.push(c);
    }

    spaced
        .split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
