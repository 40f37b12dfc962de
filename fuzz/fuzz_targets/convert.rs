#![no_main]

use converter::{HtmlParser, MarkdownConfig, debug, render_markdown, render_plain_text};
use libfuzzer_sys::fuzz_target;

// Each nesting level re-lexes a copy of its captured text.
const MAX_INPUT_BYTES: usize = 16 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let mut parser = HtmlParser::new(input);
    let Ok(root) = parser.read_body() else {
        return;
    };

    let markdown = render_markdown(&root, &MarkdownConfig::default());
    assert!(markdown.is_empty() || markdown.ends_with('\n'));
    assert!(!markdown.starts_with('\n'));

    let plain = render_plain_text(&root);
    let _ = debug::outline(&root, 256);
    // Decoding a reference never yields more bytes than the reference itself.
    assert!(plain.len() <= input.len());
});
