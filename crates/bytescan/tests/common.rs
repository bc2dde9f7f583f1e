#![allow(missing_docs)]
#![allow(dead_code)]

use std::fmt::Write;

use bytescan::{Body, Header};

pub const REQUEST: &[u8] = b"GET /index.html?q=1 HTTP/1.1\r\n\
Host: example.com\r\n\
Accept: */*\r\n\
Content-Length: 7\r\n\
\r\n\
name=Al";

pub const MULTIPART: &[u8] = b"--XyZ\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
Hello, world\r\n\
--XyZ\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"notes.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
line1\r\nline2\r\n\
--XyZ--\r\n";

pub fn render_header(header: &Header) -> String {
    let mut out = format!("{} {} {}\n", header.method, header.uri, header.version);
    for (key, value) in &header.fields {
        writeln!(out, "{key}: {value}").unwrap();
    }
    out
}

pub fn render_body(body: &Body) -> String {
    let mut out = String::new();
    for (key, value) in &body.fields {
        writeln!(out, "field {key} = {value:?}").unwrap();
    }
    for (key, file) in &body.files {
        writeln!(
            out,
            "file {key}: name={:?} type={:?} data={:?}",
            file.name,
            file.content_type,
            String::from_utf8_lossy(&file.data)
        )
        .unwrap();
    }
    out
}
