//! Sequence-number scanning and list renumbering for plan text.
//!
//! Pure functions over lines — no storage, no side effects.

/// Next sequence number implied by existing text.
///
/// Scans every line for a leading `"<n>."` marker and returns `max + 1`.
/// Unnumbered but non-empty text counts as one item already present, so the
/// next number is 2. Empty text starts at 1.
pub fn next_sequence(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 1;
    }
    match text.lines().filter_map(leading_number).max() {
        Some(max) => max + 1,
        None => 2,
    }
}

/// Renumber `text` into a contiguous `"<n>. item"` list starting at `start`.
///
/// Blank lines are dropped. Pre-existing `"N."` / `"N、"` markers and
/// `"- "` / `"* "` bullets are stripped before numbering, which makes the
/// operation idempotent for a fixed `start`.
pub fn renumber(text: &str, start: u32) -> String {
    let mut seq = start;
    let mut out = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        out.push(format!("{seq}. {}", strip_marker(line)));
        seq += 1;
    }
    out.join("\n")
}

fn leading_number(line: &str) -> Option<u32> {
    let trimmed = line.trim_start();
    let digits = trimmed.len() - trimmed.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !trimmed[digits..].starts_with('.') {
        return None;
    }
    trimmed[..digits].parse().ok()
}

fn strip_marker(line: &str) -> &str {
    let mut rest = line;
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0
        && let Some(after) = rest[digits..]
            .strip_prefix('.')
            .or_else(|| rest[digits..].strip_prefix('、'))
    {
        rest = after.trim_start();
    }
    if let Some(after) = rest.strip_prefix("- ").or_else(|| rest.strip_prefix("* ")) {
        rest = after.trim_start();
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_starts_at_one() {
        assert_eq!(next_sequence(""), 1);
        assert_eq!(next_sequence("   \n  "), 1);
    }

    #[test]
    fn unnumbered_text_counts_as_first_item() {
        assert_eq!(next_sequence("set up the build"), 2);
    }

    #[test]
    fn numbered_text_continues_from_max() {
        assert_eq!(next_sequence("1. design\n2. implement"), 3);
        // Max wins even when out of order, and indentation is tolerated.
        assert_eq!(next_sequence("3. later\n  1. earlier"), 4);
    }

    #[test]
    fn renumber_strips_existing_markers() {
        assert_eq!(renumber("1. a\n2. b", 1), "1. a\n2. b");
        assert_eq!(renumber("3、a\n- b\n* c", 1), "1. a\n2. b\n3. c");
    }

    #[test]
    fn renumber_starts_at_requested_sequence() {
        assert_eq!(renumber("c\nd", 3), "3. c\n4. d");
    }

    #[test]
    fn renumber_drops_blank_lines() {
        assert_eq!(renumber("a\n\n  \nb", 1), "1. a\n2. b");
    }

    #[test]
    fn renumber_is_idempotent() {
        let once = renumber("first task\nsecond task", 1);
        assert_eq!(renumber(&once, 1), once);
    }

    #[test]
    fn bare_dash_without_space_is_kept() {
        assert_eq!(renumber("-x", 1), "1. -x");
    }
}
