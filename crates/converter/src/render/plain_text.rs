use super::Renderer;
use crate::traverse::ElementVisitor;
use crate::types::{Element, ElementKind};

/// Concatenates the payload of every text leaf; all markup is dropped.
#[derive(Debug, Default)]
pub struct PlainTextRenderer {
    out: String,
}

impl PlainTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ElementVisitor for PlainTextRenderer {
    fn visit(&mut self, element: &Element) {
        if element.kind() == ElementKind::Text && !element.is_closing() {
            self.out.push_str(element.text());
        }
    }
}

impl Renderer for PlainTextRenderer {
    fn finish(self) -> String {
        self.out
    }
}

pub fn render_plain_text(root: &Element) -> String {
    super::render(root, PlainTextRenderer::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::HtmlParser;

    fn plain(html: &str) -> String {
        let root = HtmlParser::new(html).read_body().unwrap();
        render_plain_text(&root)
    }

    #[test]
    fn bare_text_round_trips() {
        let text = "This is a test.";
        assert_eq!(plain(&format!("<html><body>{text}</body></html>")), text);
    }

    #[test]
    fn paragraph_text_round_trips() {
        let text = "This is a test.";
        assert_eq!(plain(&format!("<html><body><p>{text}</p></body></html>")), text);
    }

    #[test]
    fn markup_is_discarded() {
        assert_eq!(
            plain("<html><body><p><b>Hola</b></p><ul><li>x</li></ul></body></html>"),
            "Holax"
        );
    }

    #[test]
    fn empty_body_is_empty() {
        assert_eq!(plain("<html><body></body></html>"), "");
    }
}
