#![no_main]

use arbitrary::Arbitrary;
use bytescan::{
    Body, BodyError, BodyParser, CsvTable, GlobMatcher, Header, HeaderError, HeaderParser,
    split_by_sizes,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Target {
    Header,
    Body,
    Glob,
    Csv,
}

#[derive(Debug, Arbitrary)]
struct Input {
    target: Target,
    data: Vec<u8>,
    /// Chunk sizes for the streaming parsers, or the glob/subject split.
    sizes: Vec<usize>,
}

fn feed_header(data: &[u8], sizes: &[usize]) -> Result<(Header, Option<usize>), HeaderError> {
    let mut parser = HeaderParser::new();
    for chunk in split_by_sizes(data, sizes) {
        parser.parse(chunk)?;
    }
    let offset = parser.body_offset();
    Ok((parser.into_header(), offset))
}

fn feed_body(data: &[u8], sizes: &[usize]) -> Result<Body, BodyError> {
    let mut parser = BodyParser::new();
    for chunk in split_by_sizes(data, sizes) {
        parser.parse(chunk)?;
    }
    parser.finish().cloned()
}

fuzz_target!(|input: Input| {
    let Input { target, data, sizes } = input;
    match target {
        Target::Header => assert_eq!(feed_header(&data, &sizes), feed_header(&data, &[])),
        Target::Body => assert_eq!(feed_body(&data, &sizes), feed_body(&data, &[])),
        Target::Glob => {
            let split = sizes.first().map_or(0, |s| s % (data.len() + 1));
            let (pattern, subject) = data.split_at(split);
            if let Ok(glob) = GlobMatcher::parse(pattern) {
                if let Some(n) = glob.matches(subject) {
                    assert!(n <= subject.len());
                }
                let anchored = glob.clone().anchored().matches(subject);
                assert_eq!(glob.is_match(subject), anchored == Some(subject.len()));
            }
        }
        Target::Csv => {
            if let Ok(table) = CsvTable::parse(&data) {
                assert_eq!(CsvTable::parse(&table.to_bytes()), Ok(table));
            }
        }
    }
});
