#![expect(missing_docs)]

use std::fmt::Write;

use bytescan::{GlobMatcher, GlobTokenizer, Lexer};

fn render_tokens(pattern: &str) -> String {
    let mut out = String::new();
    for lexeme in Lexer::new(GlobTokenizer, pattern.as_bytes()) {
        let lexeme = lexeme.expect("glob lexeme");
        let text = &pattern[lexeme.span.clone()];
        writeln!(out, "{}: {:?} {text:?}", lexeme.line, lexeme.kind).unwrap();
    }
    out
}

#[test]
fn snapshot_glob_tokens() {
    insta::assert_snapshot!(render_tokens("src/**/[a-c]?{x,y}.rs"), @r#"
    1: Name "src"
    1: Separator "/"
    1: AnyRun "**"
    1: Separator "/"
    1: SetOpen "["
    1: SetChar "a"
    1: SetRange "-"
    1: SetChar "c"
    1: SetClose "]"
    1: AnyByte "?"
    1: AlternationOpen "{"
    1: AlternationName "x"
    1: AlternationComma ","
    1: AlternationName "y"
    1: AlternationClose "}"
    1: Name ".rs"
    "#);

    insta::assert_snapshot!(render_tokens("*.rs\nsrc/[ab]"), @r#"
    1: AnyRun "*"
    1: Name ".rs"
    1: Newline "\n"
    2: Name "src"
    2: Separator "/"
    2: SetOpen "["
    2: SetChar "a"
    2: SetChar "b"
    2: SetClose "]"
    "#);
}

#[test]
fn snapshot_glob_matches() {
    let glob = GlobMatcher::parse("src/**/*.rs").expect("glob");
    let mut out = String::new();
    for input in ["src/main.rs", "src/a/b.rs", "src/a/b.rsx", "src/a/b/c.rs", "lib/main.rs"] {
        writeln!(
            out,
            "{input:?} => {:?}, whole: {}",
            glob.matches(input.as_bytes()),
            glob.is_match(input.as_bytes())
        )
        .unwrap();
    }

    insta::assert_snapshot!(out, @r#"
    "src/main.rs" => None, whole: false
    "src/a/b.rs" => Some(10), whole: true
    "src/a/b.rsx" => Some(10), whole: false
    "src/a/b/c.rs" => Some(12), whole: true
    "lib/main.rs" => None, whole: false
    "#);
}

#[test]
fn snapshot_glob_errors() {
    let mut out = String::new();
    for pattern in ["", "[]", "[!]", "{a,}", "[ab", "x{a"] {
        let err = GlobMatcher::parse(pattern).unwrap_err();
        writeln!(out, "{pattern:?} => {err}").unwrap();
    }

    insta::assert_snapshot!(out, @r#"
    "" => empty glob pattern
    "[]" => glob pattern cannot be anchored at byte 1
    "[!]" => glob pattern cannot be anchored at byte 2
    "{a,}" => glob pattern cannot be anchored at byte 3
    "[ab" => glob pattern cannot be anchored at byte 0
    "x{a" => glob pattern cannot be anchored at byte 1
    "#);
}
