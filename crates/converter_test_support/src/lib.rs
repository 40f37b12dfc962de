//! Helpers shared by the converter test suites.
use converter::{Element, ElementKind};
use std::fmt::Write;

/// Make control characters and quotes visible in single-line test output.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Split rendered output into owned lines for `diff_lines`.
pub fn lines_of(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Human-readable report of where `actual` departs from `expected`, or `None` when they match.
pub fn diff_lines(expected: &[String], actual: &[String]) -> Option<String> {
    const MISSING: &str = "<missing>";
    const CONTEXT: usize = 2;

    if expected == actual {
        return None;
    }

    let line = |lines: &[String], i: usize| lines.get(i).map_or(MISSING, String::as_str).to_string();
    let total = expected.len().max(actual.len());
    let first = (0..total)
        .find(|&i| line(expected, i) != line(actual, i))
        .unwrap_or(total);

    let mut out = String::new();
    let start = first.saturating_sub(CONTEXT);
    let end = (first + CONTEXT + 1).min(total);
    let _ = writeln!(&mut out, "first difference at line {}:", first + 1);
    for i in start..end {
        let marker = if i == first { '>' } else { ' ' };
        let _ = writeln!(
            &mut out,
            "{marker} {:>4}  expected: \"{}\"",
            i + 1,
            escape_text(&line(expected, i))
        );
        let _ = writeln!(
            &mut out,
            "{marker} {:>4}    actual: \"{}\"",
            i + 1,
            escape_text(&line(actual, i))
        );
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    Some(out)
}

/// Stable, indentation-based dump of a tree: one line per element, `tag` or `tag:level`, with
/// leaf text quoted.
pub fn tree_snapshot(root: &Element) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((element, depth)) = stack.pop() {
        let mut line = "  ".repeat(depth);
        match element.kind() {
            ElementKind::Root => line.push_str("root"),
            ElementKind::Head { level } => {
                let _ = write!(&mut line, "h:{level}");
            }
            kind => line.push_str(kind.tag()),
        }
        if element.is_leaf() && !element.text().is_empty() {
            let _ = write!(&mut line, " \"{}\"", escape_text(element.text()));
        }
        out.push(line);
        for child in element.children().iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}
