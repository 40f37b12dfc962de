use converter::{CONVERSION_ERROR_PREFIX, Element, NoteFormatConverter, md_from_html, traverse};
use converter_test_support::{diff_lines, escape_text, lines_of, tree_snapshot};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    #[serde(rename = "case")]
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Case {
    name: String,
    input: String,
    title: Option<String>,
    plain: Option<String>,
    markdown: Option<String>,
    tree: Option<Vec<String>>,
    error: Option<String>,
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("conversions.toml")
}

fn load_cases() -> Vec<Case> {
    let path = fixture_path();
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture manifest {path:?}: {err}"));
    let manifest: Manifest = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse fixture manifest {path:?}: {err}"));
    manifest.cases
}

fn case_filter() -> Option<String> {
    env::var("NOTTAK_FIXTURE").ok()
}

fn check_text(case: &str, what: &str, expected: &str, actual: &str) {
    if let Some(diff) = diff_lines(&lines_of(expected), &lines_of(actual)) {
        panic!("{what} mismatch in fixture '{case}'\n{diff}");
    }
    assert_eq!(
        expected,
        actual,
        "{what} mismatch in fixture '{case}' (trailing newline): expected \"{}\", actual \"{}\"",
        escape_text(expected),
        escape_text(actual)
    );
}

#[test]
fn conversion_fixtures_match() {
    let _ = env_logger::builder().is_test(true).try_init();

    let filter = case_filter();
    let mut ran = 0usize;
    for case in load_cases() {
        if filter.as_deref().is_some_and(|f| !case.name.contains(f)) {
            continue;
        }
        ran += 1;

        let result = NoteFormatConverter::from_html(&case.input);
        if let Some(expected_kind) = &case.error {
            match result {
                Ok(converter) => panic!(
                    "fixture '{}' expected {expected_kind}, parsed:\n{}",
                    case.name,
                    tree_snapshot(converter.root()).join("\n")
                ),
                Err(err) => assert_eq!(
                    &format!("{:?}", err.kind()),
                    expected_kind,
                    "fixture '{}': {err}",
                    case.name
                ),
            }
            continue;
        }

        let converter = result.unwrap_or_else(|err| panic!("fixture '{}': {err}", case.name));
        if let Some(title) = &case.title {
            assert_eq!(converter.title(), title, "title in fixture '{}'", case.name);
        }
        if let Some(plain) = &case.plain {
            check_text(&case.name, "plain text", plain, &converter.to_plain_text());
        }
        if let Some(markdown) = &case.markdown {
            check_text(&case.name, "markdown", markdown, &converter.to_markdown());
        }
        if let Some(tree) = &case.tree {
            let actual = tree_snapshot(converter.root());
            if let Some(diff) = diff_lines(tree, &actual) {
                panic!("tree mismatch in fixture '{}'\n{diff}", case.name);
            }
        }
    }
    assert!(ran > 0, "no fixtures matched filter");
}

#[test]
fn fixture_names_are_unique() {
    let mut seen = BTreeSet::new();
    for case in load_cases() {
        assert!(seen.insert(case.name.clone()), "duplicate fixture '{}'", case.name);
        assert!(
            case.error.is_none() || (case.markdown.is_none() && case.plain.is_none()),
            "fixture '{}' expects both an error and output",
            case.name
        );
    }
}

// Every prefix of every fixture either converts or reports an error line; nothing panics.
#[test]
fn truncated_inputs_never_panic() {
    for case in load_cases() {
        let input = case.input.as_str();
        for (end, _) in input.char_indices() {
            let md = md_from_html(&input[..end]);
            if md.starts_with(CONVERSION_ERROR_PREFIX) {
                continue;
            }
            assert!(md.is_empty() || md.ends_with('\n'), "prefix {end} of '{}'", case.name);
        }
    }
}

#[test]
fn closing_visits_pair_with_composites() {
    for case in load_cases() {
        let Ok(converter) = NoteFormatConverter::from_html(&case.input) else {
            continue;
        };
        let mut open = Vec::new();
        let mut leaves = 0usize;
        let mut visits = 0usize;
        traverse::run(converter.root(), &mut |e: &Element| {
            visits += 1;
            if e.is_closing() {
                assert_eq!(open.pop(), Some(e.id()), "unbalanced close in '{}'", case.name);
            } else if e.is_leaf() {
                leaves += 1;
            } else if !e.is_root() {
                open.push(e.id());
            }
        });
        assert!(open.is_empty(), "unclosed composite in '{}'", case.name);

        let nodes = traverse::count_nodes(converter.root());
        let composites = nodes - leaves - usize::from(!converter.root().is_leaf());
        assert_eq!(visits, nodes + composites, "visit count in '{}'", case.name);
    }
}
