use crate::{produce_chunks, split_by_sizes};

#[test]
fn produce_chunks_example() {
    let payload = b"GET / HTTP/1.1\r\n";
    let chunks = produce_chunks(payload, 4);
    assert_eq!(chunks, [&b"GET "[..], b"/ HT", b"TP/1", b".1\r\n"]);
    assert_eq!(chunks.concat(), payload);

    assert_eq!(produce_chunks(b"abc", 10), [&b"a"[..], b"b", b"c"]);
    assert!(produce_chunks(b"", 3).is_empty());
}

#[test]
#[should_panic(expected = "parts > 0")]
fn produce_chunks_needs_parts() {
    let _ = produce_chunks(b"abc", 0);
}

#[test]
fn split_by_sizes_example() {
    let payload = b"abcdefgh";
    let chunks = split_by_sizes(payload, &[0, 2, 100]);
    // 0 % 8 + 1 = 1, 2 % 7 + 1 = 3, 100 % 4 + 1 = 1, then the rest.
    assert_eq!(chunks, [&b"a"[..], b"bcd", b"e", b"fgh"]);
    assert_eq!(split_by_sizes(payload, &[]), [&payload[..]]);
    assert!(split_by_sizes(b"", &[1, 2]).is_empty());
}
