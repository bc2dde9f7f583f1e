//! Byte classes and the `eat_*` methods generated from them.
//!
//! Each class yields a predicate (`is_digit`), a single-byte eater
//! (`eat_digit`, returning the byte) and a run eater (`eat_while_digit`,
//! returning the run length). Named punctuation yields `eat_colon` style
//! `bool` eaters.

use super::ByteCursor;

/// `0-9`
#[must_use]
pub const fn is_digit(b: u8) -> bool {
    b.is_ascii_digit()
}

/// `0-9 a-f A-F`
#[must_use]
pub const fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

/// `a-z A-Z`
#[must_use]
pub const fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

/// `a-z A-Z 0-9`
#[must_use]
pub const fn is_alpha_numeric(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

/// `a-z A-Z _`
#[must_use]
pub const fn is_alpha_underline(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// `a-z A-Z 0-9 _`
#[must_use]
pub const fn is_alpha_underline_digit(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `a-z A-Z 0-9 _ -`
#[must_use]
pub const fn is_alpha_underline_digit_minus(b: u8) -> bool {
    is_alpha_underline_digit(b) || b == b'-'
}

/// `a-z`
#[must_use]
pub const fn is_lower(b: u8) -> bool {
    b.is_ascii_lowercase()
}

/// `A-Z`
#[must_use]
pub const fn is_upper(b: u8) -> bool {
    b.is_ascii_uppercase()
}

/// Space or non-breaking space (`0xA0`).
#[must_use]
pub const fn is_space(b: u8) -> bool {
    b == b' ' || b == 0xA0
}

/// Space, tab, or non-breaking space (`0xA0`).
#[must_use]
pub const fn is_space_tab(b: u8) -> bool {
    is_space(b) || b == b'\t'
}

/// Bytes that may appear in a URI: unreserved, reserved and `%`.
#[must_use]
pub const fn is_uri(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.'
                | b'_'
                | b'~'
                | b':'
                | b'/'
                | b'?'
                | b'#'
                | b'['
                | b']'
                | b'@'
                | b'!'
                | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b'%'
        )
}

macro_rules! byte_classes {
    ($( $pred:ident => $eat:ident, $eat_while:ident, $what:literal; )*) => {
        impl ByteCursor<'_> {
            $(
                #[doc = concat!("Consumes one byte of ", $what, ".")]
                #[inline]
                pub fn $eat(&mut self) -> Option<u8> {
                    self.eat_class($pred)
                }

                #[doc = concat!("Consumes the maximal run of ", $what, ".")]
                #[inline]
                pub fn $eat_while(&mut self) -> Option<usize> {
                    self.eat_while($pred)
                }
            )*
        }
    };
}

byte_classes! {
    is_digit => eat_digit, eat_while_digit, "ASCII digits";
    is_hex => eat_hex, eat_while_hex, "ASCII hex digits";
    is_alpha => eat_alpha, eat_while_alpha, "ASCII letters";
    is_alpha_numeric => eat_alpha_numeric, eat_while_alpha_numeric, "ASCII letters and digits";
    is_alpha_underline => eat_alpha_underline, eat_while_alpha_underline, "ASCII letters and `_`";
    is_alpha_underline_digit => eat_alpha_underline_digit, eat_while_alpha_underline_digit, "identifier bytes";
    is_alpha_underline_digit_minus => eat_alpha_underline_digit_minus, eat_while_alpha_underline_digit_minus, "identifier bytes and `-`";
    is_lower => eat_lower, eat_while_lower, "lower-case ASCII letters";
    is_upper => eat_upper, eat_while_upper, "upper-case ASCII letters";
    is_space => eat_space, eat_while_space, "spaces";
    is_space_tab => eat_space_tab, eat_while_space_tab, "spaces and tabs";
    is_uri => eat_uri, eat_while_uri, "URI bytes";
}

macro_rules! punctuation {
    ($( $eat:ident => $byte:literal, )*) => {
        /// Named punctuation recognised by the generated `eat_*` methods.
        pub const PUNCTUATION: &[(&str, u8)] = &[$( (stringify!($eat), $byte) ),*];

        impl ByteCursor<'_> {
            $(
                #[doc = concat!("Consumes a single ", stringify!($byte), ".")]
                #[inline]
                pub fn $eat(&mut self) -> bool {
                    self.eat_one($byte)
                }
            )*
        }
    };
}

punctuation! {
    eat_ampersand => b'&',
    eat_asterisk => b'*',
    eat_at => b'@',
    eat_backslash => b'\\',
    eat_caret => b'^',
    eat_colon => b':',
    eat_comma => b',',
    eat_cr => b'\r',
    eat_dollar => b'$',
    eat_dot => b'.',
    eat_double_quote => b'"',
    eat_equal => b'=',
    eat_exclamation => b'!',
    eat_hash => b'#',
    eat_lf => b'\n',
    eat_left_brace => b'{',
    eat_left_bracket => b'[',
    eat_left_paren => b'(',
    eat_minus => b'-',
    eat_percent => b'%',
    eat_pipe => b'|',
    eat_plus => b'+',
    eat_question => b'?',
    eat_right_brace => b'}',
    eat_right_bracket => b']',
    eat_right_paren => b')',
    eat_semicolon => b';',
    eat_single_quote => b'\'',
    eat_slash => b'/',
    eat_tab => b'\t',
    eat_tilde => b'~',
    eat_underline => b'_',
}
