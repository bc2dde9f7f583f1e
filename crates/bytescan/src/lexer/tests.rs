use super::*;
use crate::cursor::classes::is_digit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Key,
    Equals,
    Value,
    Space,
    Junk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Key,
    Equals,
    Value,
    Space,
    Junk,
    Newline,
}

/// `key=digits` pairs. A line starting with a digit skips straight to the
/// value through a zero-length key.
#[derive(Default)]
struct Pairs {
    space: bool,
    fallback: bool,
}

impl Tokenizer for Pairs {
    type State = State;
    type Kind = Kind;

    fn initial_state(&self) -> State {
        State::Key
    }

    fn space_state(&self) -> Option<State> {
        self.space.then_some(State::Space)
    }

    fn default_state(&self) -> Option<State> {
        self.fallback.then_some(State::Junk)
    }

    fn newline_kind(&self) -> Option<Kind> {
        Some(Kind::Newline)
    }

    fn step(&mut self, state: &mut State, c: &mut ByteCursor<'_>) -> Option<Kind> {
        match *state {
            State::Key => {
                if c.peek().is_some_and(is_digit) {
                    *state = State::Value;
                    return Some(Kind::Key);
                }
                c.eat_while_alpha()?;
                *state = State::Equals;
                Some(Kind::Key)
            }
            State::Equals => {
                if !c.eat_equal() {
                    return None;
                }
                *state = State::Value;
                Some(Kind::Equals)
            }
            State::Value => {
                c.eat_while_digit()?;
                *state = State::Key;
                Some(Kind::Value)
            }
            State::Space => c.eat_while_space().map(|_| Kind::Space),
            State::Junk => c.eat_while(|_| true).map(|_| Kind::Junk),
        }
    }
}

fn lex(tokenizer: Pairs, input: &[u8]) -> Vec<(Kind, Range<usize>, usize)> {
    Lexer::new(tokenizer, input)
        .map(|lexeme| {
            let lexeme = lexeme.unwrap();
            (lexeme.kind, lexeme.span, lexeme.line)
        })
        .collect()
}

#[test]
fn crlf_belongs_to_the_terminator() {
    assert_eq!(
        lex(Pairs::default(), b"a=1\r\nbc=22"),
        [
            (Kind::Key, 0..1, 1),
            (Kind::Equals, 1..2, 1),
            (Kind::Value, 2..3, 1),
            (Kind::Newline, 3..5, 1),
            (Kind::Key, 5..7, 2),
            (Kind::Equals, 7..8, 2),
            (Kind::Value, 8..10, 2),
        ]
    );
}

#[test]
fn empty_lines_still_emit_newlines() {
    let newlines: Vec<_> = lex(Pairs::default(), b"a=1\n\n\nb=2")
        .into_iter()
        .filter(|(kind, ..)| *kind == Kind::Newline)
        .map(|(_, span, line)| (span, line))
        .collect();
    assert_eq!(newlines, [(3..4, 1), (4..5, 2), (5..6, 3)]);

    let last = lex(Pairs::default(), b"a=1\n\n\nb=2").pop();
    assert_eq!(last, Some((Kind::Value, 8..9, 4)));
}

#[test]
fn trailing_newline_ends_the_input() {
    let kinds: Vec<_> = lex(Pairs::default(), b"a=1\n").into_iter().map(|t| t.0).collect();
    assert_eq!(kinds, [Kind::Key, Kind::Equals, Kind::Value, Kind::Newline]);
    assert!(lex(Pairs::default(), b"").is_empty());
}

#[test]
fn zero_length_runs_are_dropped() {
    assert_eq!(lex(Pairs::default(), b"12"), [(Kind::Value, 0..2, 1)]);
}

#[test]
fn newlines_can_be_suppressed() {
    let options = LexerOptions {
        emit_newlines: false,
        ..Default::default()
    };
    let kinds: Vec<_> = Lexer::with_options(Pairs::default(), b"a=1\nb=2", options)
        .map(|l| l.unwrap().kind)
        .collect();
    assert_eq!(kinds, [Kind::Key, Kind::Equals, Kind::Value].repeat(2));
}

#[test]
fn state_resets_per_line_unless_disabled() {
    let err = Lexer::new(Pairs::default(), b"a\n=1")
        .find_map(Result::err)
        .unwrap();
    assert_eq!(
        err,
        LexError {
            kind: LexErrorKind::Unexpected {
                state: "Key".into(),
                byte: b'=',
            },
            offset: 2,
            line: 2,
        }
    );

    let options = LexerOptions {
        reset_state_per_line: false,
        ..Default::default()
    };
    let kinds: Vec<_> = Lexer::with_options(Pairs::default(), b"a\n=1", options)
        .map(|l| l.unwrap().kind)
        .collect();
    assert_eq!(kinds, [Kind::Key, Kind::Newline, Kind::Equals, Kind::Value]);
}

#[test]
fn unexpected_byte_stops_lexing() {
    let mut lexer = Lexer::new(Pairs::default(), b"a=x\nb=2");
    assert_eq!(lexer.next().unwrap().unwrap().kind, Kind::Key);
    assert_eq!(lexer.next().unwrap().unwrap().kind, Kind::Equals);
    let err = lexer.next().unwrap().unwrap_err();
    assert_eq!(err.to_string(), "unexpected byte 0x78 in state Value at 1:2");
    assert!(lexer.next().is_none());
}

#[test]
fn space_state_runs_first() {
    let tokenizer = Pairs {
        space: true,
        ..Default::default()
    };
    let kinds: Vec<_> = lex(tokenizer, b"a=1  b=2").into_iter().map(|t| t.0).collect();
    assert_eq!(
        kinds,
        [
            Kind::Key,
            Kind::Equals,
            Kind::Value,
            Kind::Space,
            Kind::Key,
            Kind::Equals,
            Kind::Value,
        ]
    );
}

#[test]
fn default_state_takes_over() {
    let tokenizer = Pairs {
        fallback: true,
        ..Default::default()
    };
    let mut lexer = Lexer::new(tokenizer, b"a=1 b\nc=3");
    let first: Vec<_> = lexer
        .by_ref()
        .take(4)
        .map(|l| {
            let l = l.unwrap();
            (l.kind, l.span)
        })
        .collect();
    assert_eq!(
        first,
        [
            (Kind::Key, 0..1),
            (Kind::Equals, 1..2),
            (Kind::Value, 2..3),
            (Kind::Junk, 3..5),
        ]
    );
    assert_eq!(lexer.state(), State::Junk);

    let rest: Vec<_> = lexer.map(|l| l.unwrap().kind).collect();
    assert_eq!(rest, [Kind::Newline, Kind::Key, Kind::Equals, Kind::Value]);
}

#[test]
fn token_strings() {
    let mut seen = Vec::new();
    Lexer::new(Pairs::default(), b"ab=12\r\ncd=3")
        .parse_token_strings(|kind, text| seen.push((kind, text.to_owned())))
        .unwrap();
    let texts: Vec<_> = seen.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, ["ab", "=", "12", "\r\n", "cd", "=", "3"]);
    assert_eq!(seen[3].0, Kind::Newline);

    let tokenizer = Pairs {
        fallback: true,
        ..Default::default()
    };
    let err = Lexer::new(tokenizer, b"\xff")
        .parse_token_strings(|_, _| {})
        .unwrap_err();
    assert_eq!((err.kind, err.offset, err.line), (LexErrorKind::InvalidUtf8, 0, 1));
}

#[test]
fn parse_counts_kinds() {
    let mut values = 0;
    Lexer::new(Pairs::default(), b"a=1\nb=2\nc=3")
        .parse(|kind| values += usize::from(kind == Kind::Value))
        .unwrap();
    assert_eq!(values, 3);
}

struct Stuck;

impl Tokenizer for Stuck {
    type State = ();
    type Kind = ();

    fn initial_state(&self) {}

    fn step(&mut self, _: &mut (), _: &mut ByteCursor<'_>) -> Option<()> {
        Some(())
    }
}

#[test]
fn no_progress_is_reported() {
    let err = Lexer::new(Stuck, b"xy").next().unwrap().unwrap_err();
    assert_eq!(
        err.kind,
        LexErrorKind::Stalled {
            state: "()".into()
        }
    );
    assert_eq!(err.offset, 0);
}
