use crate::types::{Element, ElementKind};

/// Indented one-line-per-element view of a tree, at most `cap` lines.
///
/// Text leaves show a quoted preview; composite elements show their tag with heading level and
/// link targets.
pub fn outline(root: &Element, cap: usize) -> Vec<String> {
    struct IndentGuard<'a> {
        indent: &'a mut String,
        step: usize,
    }

    impl Drop for IndentGuard<'_> {
        fn drop(&mut self) {
            let new_len = self.indent.len() - self.step;
            self.indent.truncate(new_len);
        }
    }

    fn push_preview(out: &mut String, s: &str, max_chars: usize) {
        let mut truncated = false;
        for (i, ch) in s.chars().enumerate() {
            if i == max_chars {
                truncated = true;
                break;
            }
            out.push(if ch == '\n' { ' ' } else { ch });
        }
        if truncated {
            out.push('…');
        }
    }

    fn push_attr(line: &mut String, element: &Element, name: &str) {
        if let Some(value) = element.attr(name).filter(|v| !v.is_empty()) {
            line.push(' ');
            line.push_str(name);
            line.push_str("=\"");
            line.push_str(value);
            line.push('"');
        }
    }

    const INDENT_STEP: &str = "  ";
    const PREVIEW_CHARS: usize = 40;

    fn walk(element: &Element, indent: &mut String, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;

        let mut line = String::with_capacity(indent.len() + 64);
        line.push_str(indent);
        match element.kind() {
            ElementKind::Root => line.push_str("#root"),
            ElementKind::Text => {
                line.push('"');
                push_preview(&mut line, element.text(), PREVIEW_CHARS);
                line.push('"');
            }
            kind => {
                line.push('<');
                match kind {
                    ElementKind::Head { level } => {
                        line.push('h');
                        line.push(char::from(b'0' + level));
                    }
                    _ => line.push_str(kind.tag()),
                }
                for name in ["href", "target", "src", "alt"] {
                    push_attr(&mut line, element, name);
                }
                line.push('>');
                if element.is_leaf() && !element.text().is_empty() {
                    line.push_str(" \"");
                    push_preview(&mut line, element.text(), PREVIEW_CHARS);
                    line.push('"');
                }
            }
        }
        out.push(line);

        if element.is_leaf() {
            return;
        }
        indent.push_str(INDENT_STEP);
        let guard = IndentGuard {
            indent,
            step: INDENT_STEP.len(),
        };
        for child in element.children() {
            walk(child, guard.indent, out, left);
        }
    }

    let mut out = Vec::new();
    let mut left = cap;
    let mut indent = String::new();
    walk(root, &mut indent, &mut out, &mut left);
    out
}
