//! Corpus tests - render every fixture in the corpus directory and check
//! that rendering the re-parsed output changes nothing.

use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use domser::{parse_html, parse_xml, render_node, Node, Options};

fn rerender(
    content: &str,
    parse: fn(&str) -> Result<Node, domser::DomserError>,
    options: &Options,
) -> Result<(String, String), domser::DomserError> {
    let once = render_node(&parse(content)?, options);
    let twice = render_node(&parse(&once)?, options);
    Ok((once, twice))
}

/// Rendering is stable: render(parse(render(parse(x)))) == render(parse(x)).
#[test]
fn test_corpus_rendering_is_idempotent() {
    let corpus_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/corpus");

    if !corpus_dir.exists() {
        println!("Corpus directory not found, skipping");
        return;
    }

    let mut total = 0;
    let mut failed = 0;

    for entry in WalkBuilder::new(&corpus_dir).git_ignore(false).build() {
        let entry = entry.unwrap();
        let path = entry.path();

        let (parse, options): (fn(&str) -> _, Options) = match path.extension() {
            Some(ext) if ext == "xml" => (parse_xml, Options::xml()),
            Some(ext) if ext == "html" => (parse_html, Options::default()),
            _ => continue,
        };

        let rel_path = path.strip_prefix(&corpus_dir).unwrap_or(path);
        let content = fs::read_to_string(path).unwrap();
        total += 1;

        match rerender(&content, parse, &options) {
            Ok((once, twice)) if once == twice => {}
            Ok((once, twice)) => {
                eprintln!("  FAIL {}: output changed on second pass", rel_path.display());
                eprintln!("    first:  {once}");
                eprintln!("    second: {twice}");
                failed += 1;
            }
            Err(e) => {
                eprintln!("  FAIL {}: {}", rel_path.display(), e);
                failed += 1;
            }
        }
    }

    println!("Corpus: {}/{} stable", total - failed, total);
    assert!(total > 0, "no fixtures found");
    assert_eq!(failed, 0, "{} fixtures failed to round-trip", failed);
}

/// Strict XML fixtures come back byte for byte.
#[test]
fn test_xml_fixture_reproduced_exactly() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/corpus/atom.xml");
    let content = fs::read_to_string(path).unwrap();
    let out = render_node(&parse_xml(&content).unwrap(), &Options::xml());
    assert_eq!(out, content);
}

/// Foreign content in the HTML fixture picks up canonical SVG names.
#[test]
fn test_html_fixture_foreign_content() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/corpus/page.html");
    let content = fs::read_to_string(path).unwrap();
    let out = render_node(&parse_html(&content).unwrap(), &Options::default());

    assert!(out.contains(r#"<svg viewBox="0 0 10 10">"#), "{out}");
    assert!(out.contains(r#"<radialGradient id="r"/>"#), "{out}");
    assert!(out.contains("<foreignObject><br><p>html</p></foreignObject>"), "{out}");
    assert!(out.contains(r#"<circle r="4"/>"#), "{out}");
    assert!(out.contains(r#"<input type="checkbox" checked>"#), "{out}");
    assert!(out.contains(r#"value="a &quot;b&quot;""#), "{out}");
    assert!(out.contains(r#"<script>if (x) { y = "<b>"; }</script>"#), "{out}");
    assert!(out.contains("caf&#xe9;"), "{out}");
}
