pub const BLOCK_TEMPLATE: &str =
    "<p>Hola, <b>mundo</b> &amp; <i>caf&eacute;</i> <a href=\"n.md\">link</a>.</p>\
     <ul><li>uno</li><li><b>dos</b></li></ul>";

/// `blocks` copies of `BLOCK_TEMPLATE` wrapped in a complete note document.
pub fn make_blocks(blocks: usize) -> String {
    let mut html = String::with_capacity(BLOCK_TEMPLATE.len() * blocks + 64);
    html.push_str("<html><head><title>bench</title></head><body>");
    for _ in 0..blocks {
        html.push_str(BLOCK_TEMPLATE);
    }
    html.push_str("</body></html>");
    html
}
