#![expect(missing_docs)]

mod common;

use std::fmt::Write;

use bytescan::{BodyParser, HeaderParser, produce_chunks};

use crate::common::{MULTIPART, REQUEST, render_body, render_header};

#[test]
fn snapshot_request_head_in_chunks() {
    let mut parser = HeaderParser::new();
    let mut out = String::new();
    for (i, chunk) in produce_chunks(REQUEST, 5).into_iter().enumerate() {
        let done = parser.parse(chunk).expect("request head");
        writeln!(
            out,
            "chunk {}: {} bytes, done={done}, consumed={}",
            i + 1,
            chunk.len(),
            parser.consumed()
        )
        .unwrap();
    }
    writeln!(
        out,
        "body offset: {:?}, body index: {:?}",
        parser.body_offset(),
        parser.body_index()
    )
    .unwrap();
    out.push_str(&render_header(parser.header()));

    insta::assert_snapshot!(out, @r"
    chunk 1: 18 bytes, done=false, consumed=18
    chunk 2: 18 bytes, done=false, consumed=36
    chunk 3: 18 bytes, done=false, consumed=54
    chunk 4: 18 bytes, done=false, consumed=72
    chunk 5: 18 bytes, done=true, consumed=83
    body offset: Some(83), body index: Some(11)
    GET /index.html?q=1 HTTP/1.1
    Accept: */*
    Content-Length: 7
    Host: example.com
    ");
}

#[test]
fn snapshot_header_errors() {
    let inputs = [
        "get / HTTP/1.1\r\n\r\n",
        "GET /x FTP/1.1\r\n",
        "GET /x HTTP/1.1\rX",
        "GET /x HTTP/1.1\r\nHost a\r\n",
        "GET /x HTTP/1.1\r\nHost: \r\n",
        "GET /x HTTP/1.1\r\n1x: y\r\n",
    ];
    let mut out = String::new();
    for input in inputs {
        let err = HeaderParser::new().parse(input.as_bytes()).unwrap_err();
        writeln!(out, "{input:?} => {err}").unwrap();
    }

    insta::assert_snapshot!(out, @r#"
    "get / HTTP/1.1\r\n\r\n" => invalid method character at byte 0
    "GET /x FTP/1.1\r\n" => invalid http version at byte 7
    "GET /x HTTP/1.1\rX" => expected line feed at byte 16
    "GET /x HTTP/1.1\r\nHost a\r\n" => expected colon after header key at byte 22
    "GET /x HTTP/1.1\r\nHost: \r\n" => invalid header value character at byte 23
    "GET /x HTTP/1.1\r\n1x: y\r\n" => invalid header key character at byte 17
    "#);
}

#[test]
fn snapshot_multipart_body() {
    let mut parser = BodyParser::new();
    for chunk in produce_chunks(MULTIPART, 3) {
        parser.parse(chunk).expect("multipart body");
    }
    let boundary = String::from_utf8_lossy(parser.boundary().unwrap_or_default()).into_owned();
    let mut out = format!("boundary {boundary:?}, done={}\n", parser.is_done());
    out.push_str(&render_body(parser.body()));

    insta::assert_snapshot!(out, @r#"
    boundary "--XyZ", done=true
    field title = "Hello, world"
    file upload: name="notes.txt" type="text/plain" data="line1\r\nline2"
    "#);
}

#[test]
fn snapshot_urlencoded_body() {
    let mut parser = BodyParser::new();
    parser
        .parse(b"name=Al+Smith&city=K%C3%B6ln&empty=&last=1")
        .expect("urlencoded body");
    let body = parser.finish().expect("urlencoded body");

    insta::assert_snapshot!(render_body(body), @r#"
    field city = "Köln"
    field empty = ""
    field last = "1"
    field name = "Al Smith"
    "#);
}

#[test]
fn snapshot_body_errors() {
    let inputs = [
        "=x",
        "a=%zz\r",
        "--\r\n",
        "--b1\r\nX-Custom: 1\r\n\r\ndata",
        "--b1\r\nContent-Disposition: form-data; name=a\r\n\r\nunterminated",
        "a=1&b",
    ];
    let mut out = String::new();
    for input in inputs {
        let mut parser = BodyParser::new();
        let err = match parser.parse(input.as_bytes()) {
            Ok(_) => parser.finish().map(|_| ()).unwrap_err(),
            Err(err) => err,
        };
        writeln!(out, "{input:?} => {err}").unwrap();
    }

    insta::assert_snapshot!(out, @r#"
    "=x" => invalid body start at byte 0
    "a=%zz\r" => invalid form value at byte 5
    "--\r\n" => invalid multipart boundary at byte 2
    "--b1\r\nX-Custom: 1\r\n\r\ndata" => part without a content-disposition name at byte 19
    "--b1\r\nContent-Disposition: form-data; name=a\r\n\r\nunterminated" => part content not closed by a boundary at byte 60
    "a=1&b" => body ended early at byte 5
    "#);
}
