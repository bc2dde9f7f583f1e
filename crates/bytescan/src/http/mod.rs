//! Streaming HTTP/1.x request parsers.
//!
//! Both parsers follow the same shape: an entry state recognises the first
//! byte of a token, a started state scans the rest of it, and a token cut off
//! by the end of a chunk is carried into the next call. Feed them successive
//! reads of a connection; splitting the input anywhere gives the same result
//! as parsing it in one piece.

pub mod body;
pub mod header;

pub use body::{Body, BodyFile, BodyParser, form_url_decode};
pub use header::{Header, HeaderParser};
