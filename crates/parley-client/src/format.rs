//! Light markdown-to-HTML rendering for assistant replies.
//!
//! Only a handful of constructs are recognised: `**bold**`, newlines,
//! single-line numbered and bulleted items, and `[docN]` citation markers
//! (which are removed). Running the formatter on its own output changes
//! nothing.

const BR: &str = "<br>";
const NUMBERED_OPEN: &str = r#"<div class="list-item numbered">"#;

/// Line breaks other than `\n`, which is turned into `<br>` before any
/// line-anchored rule runs
const LINE_TERMINATORS: [char; 3] = ['\r', '\u{2028}', '\u{2029}'];

/// Render an assistant message as an HTML fragment
pub fn format_bot_message(text: &str) -> String {
    let text = strip_citations(text);
    let text = bold(&text);
    let text = text.replace('\n', BR);
    let text = map_lines(&text, |line| numbered_item(line).or_else(|| bullet_item(line)));
    let text = strip_citations(&text);
    let text = text.replace(
        &format!("</div>{}", NUMBERED_OPEN),
        &format!("</div>{}{}", BR, NUMBERED_OPEN),
    );
    let text = collapse_breaks(&text);
    space_after_colons(&text)
}

/// Escape text for insertion into HTML; used for everything the user typed
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Remove `[docN]` markers until none are left, so that `[doc[doc1]2]`
/// does not leave `[doc2]` behind
fn strip_citations(text: &str) -> String {
    let mut current = remove_citation_markers(text);
    loop {
        let next = remove_citation_markers(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn remove_citation_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("[doc") {
        let after = &rest[start + 4..];
        let digits = leading_digits(after);

        if digits > 0 && after[digits..].starts_with(']') {
            out.push_str(&rest[..start]);
            rest = &after[digits + 1..];
        } else {
            out.push_str(&rest[..start + 1]);
            rest = &rest[start + 1..];
        }
    }

    out.push_str(rest);
    out
}

/// `**x**` → `<strong>x</strong>`, shortest match, never across a line break
fn bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        match closing_marker(after) {
            Some(end) => {
                out.push_str(&rest[..start]);
                out.push_str("<strong>");
                out.push_str(&after[..end]);
                out.push_str("</strong>");
                rest = &after[end + 2..];
            }
            None => {
                // An unmatched opener may still close as part of `***`
                out.push_str(&rest[..start + 1]);
                rest = &rest[start + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn closing_marker(text: &str) -> Option<usize> {
    let end = text.find("**")?;
    let span = &text[..end];
    let crosses_line = span.contains('\n') || span.contains(&LINE_TERMINATORS[..]) || span.contains(BR);

    (!crosses_line).then_some(end)
}

/// Apply `rewrite` to every line, keeping the terminators in place
fn map_lines(text: &str, rewrite: impl Fn(&str) -> Option<String>) -> String {
    text.split_inclusive(&LINE_TERMINATORS[..])
        .map(|piece| {
            let line = piece.strip_suffix(&LINE_TERMINATORS[..]).unwrap_or(piece);
            let terminator = &piece[line.len()..];
            match rewrite(line) {
                Some(rewritten) => rewritten + terminator,
                None => piece.to_string(),
            }
        })
        .collect()
}

/// `12. text` → numbered list item
fn numbered_item(line: &str) -> Option<String> {
    let digits = leading_digits(line);
    if digits == 0 {
        return None;
    }
    let body = item_body(line[digits..].strip_prefix('.')?)?;

    Some(format!(
        "{}<strong>{}. {}</strong></div>",
        NUMBERED_OPEN,
        &line[..digits],
        body
    ))
}

/// `- text` → bulleted list item
fn bullet_item(line: &str) -> Option<String> {
    let body = item_body(line.strip_prefix('-')?)?;
    Some(format!(r#"<div class="list-item bullet">• {}</div>"#, body))
}

/// One whitespace character followed by at least one more character
fn item_body(rest: &str) -> Option<&str> {
    let mut chars = rest.chars();
    if !chars.next().is_some_and(char::is_whitespace) {
        return None;
    }
    let body = chars.as_str();
    (!body.is_empty()).then_some(body)
}

/// Three or more `<br>` (whitespace allowed between and after) → `<br><br>`
fn collapse_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(BR) {
        out.push_str(&rest[..start]);
        let run = &rest[start..];
        let (count, _, consumed) = break_run(run);

        if count >= 3 {
            out.push_str("<br><br>");
        } else {
            out.push_str(&run[..consumed]);
        }
        rest = &run[consumed..];
    }

    out.push_str(rest);
    out
}

/// A colon followed by line breaks always ends up followed by exactly two
fn space_after_colons(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(colon) = rest.find(':') {
        let after = &rest[colon + 1..];
        let gap = whitespace_len(after);

        out.push_str(&rest[..=colon]);
        if after[gap..].starts_with(BR) {
            let (_, breaks_end, _) = break_run(&after[gap..]);
            out.push_str("<br><br>");
            rest = &after[gap + breaks_end..];
        } else {
            rest = after;
        }
    }

    out.push_str(rest);
    out
}

/// Scan consecutive `<br>` tags separated by whitespace.
///
/// Returns the number of tags, the byte offset just past the last tag, and
/// the offset past any whitespace that follows it.
fn break_run(text: &str) -> (usize, usize, usize) {
    let mut count = 0;
    let mut breaks_end = 0;
    let mut pos = 0;

    while text[pos..].starts_with(BR) {
        count += 1;
        pos += BR.len();
        breaks_end = pos;
        pos += whitespace_len(&text[pos..]);
    }

    (count, breaks_end, pos)
}

fn whitespace_len(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn leading_digits(text: &str) -> usize {
    text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_and_newlines() {
        assert_eq!(
            format_bot_message("**Hi** there\nfriend"),
            "<strong>Hi</strong> there<br>friend"
        );
    }

    #[test]
    fn test_bold_is_non_greedy() {
        assert_eq!(
            format_bot_message("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_bold_does_not_cross_lines() {
        assert_eq!(format_bot_message("**a\nb**"), "**a<br>b**");
    }

    #[test]
    fn test_numbered_item() {
        assert_eq!(
            format_bot_message("1. First step"),
            r#"<div class="list-item numbered"><strong>1. First step</strong></div>"#
        );
    }

    #[test]
    fn test_bullet_item() {
        assert_eq!(
            format_bot_message("- apples"),
            r#"<div class="list-item bullet">• apples</div>"#
        );
    }

    #[test]
    fn test_list_rules_are_line_anchored() {
        // After newline conversion the whole message is one line
        assert_eq!(
            format_bot_message("Steps\n1. one"),
            "Steps<br>1. one"
        );
    }

    #[test]
    fn test_citations_removed() {
        assert_eq!(format_bot_message("Paris [doc1] is big [doc12]."), "Paris  is big .");
        assert_eq!(format_bot_message("x[doc[doc1]2]y"), "xy");
        assert_eq!(format_bot_message("[docs] [doc] [doc1a]"), "[docs] [doc] [doc1a]");
    }

    #[test]
    fn test_adjacent_numbered_items_separated() {
        let input = r#"<div class="list-item numbered">A</div><div class="list-item numbered">B</div>"#;
        assert_eq!(
            format_bot_message(input),
            r#"<div class="list-item numbered">A</div><br><div class="list-item numbered">B</div>"#
        );
    }

    #[test]
    fn test_break_runs_collapsed() {
        assert_eq!(format_bot_message("a\n\n\n\nb"), "a<br><br>b");
        assert_eq!(format_bot_message("a\n\nb"), "a<br><br>b");
        assert_eq!(format_bot_message("a<br> <br>\t<br> b"), "a<br><br>b");
    }

    #[test]
    fn test_colon_followed_by_breaks() {
        assert_eq!(format_bot_message("Note:\nthing"), "Note:<br><br>thing");
        assert_eq!(format_bot_message("Note: \n\n\nthing"), "Note:<br><br>thing");
        assert_eq!(format_bot_message("time 10:30"), "time 10:30");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "**Summary**:\nHere are the steps [doc1]:\n\n\n",
            "1. Install\r2. Configure\r- note",
            "**a\nb** and **c**",
            "*[doc1]*a*[doc2]*",
            "Note: <br> <br>x",
            "x[doc[doc1]2]y\n\n\n\n:",
            "[doc1]1. hidden list",
            "a***b**c",
            "",
        ];

        for input in inputs {
            let once = format_bot_message(input);
            let twice = format_bot_message(&once);
            assert_eq!(once, twice, "input: {:?}", input);
            assert!(!once.contains("[doc1]"));
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
    }
}
