//! Host string→number coercion.
//!
//! Implements the runtime's standard numeric-coercion rule for text:
//! whitespace is trimmed, empty text coerces to zero, `Infinity` and
//! radix-prefixed integers are recognized, and everything else must be
//! a signed decimal literal. Text that fits none of these is simply
//! not a number — the result is `None`, never an error.

/// Whitespace recognized by the coercion rule: host whitespace plus
/// line terminators.
fn is_host_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'..='\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Coerce text to a number under the host's standard rules.
///
/// Returns `Some(n)` when the trimmed text is a well-formed numeric
/// literal, `None` otherwise. Empty and whitespace-only text coerce to
/// zero — that is the coercion rule, not an accident. Never panics.
pub fn string_to_number(s: &str) -> Option<f64> {
    let t = s.trim_matches(is_host_whitespace);
    if t.is_empty() {
        return Some(0.0);
    }

    // A sign is not permitted before a radix prefix, so these come
    // before the sign split.
    if let Some(digits) = strip_radix_prefix(t, "0x", "0X") {
        return radix_value(digits, 16);
    }
    if let Some(digits) = strip_radix_prefix(t, "0o", "0O") {
        return radix_value(digits, 8);
    }
    if let Some(digits) = strip_radix_prefix(t, "0b", "0B") {
        return radix_value(digits, 2);
    }

    let (sign, body) = split_sign(t);
    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if is_decimal_literal(t) {
        return t.parse::<f64>().ok();
    }
    None
}

fn strip_radix_prefix<'a>(s: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    s.strip_prefix(lower).or_else(|| s.strip_prefix(upper))
}

/// Accumulate an unsigned radix literal in `f64`, so literals longer
/// than 64 bits still coerce (at the precision the host grants them).
fn radix_value(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut acc = 0.0f64;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        acc = acc * f64::from(radix) + f64::from(d);
    }
    Some(acc)
}

fn split_sign(s: &str) -> (f64, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (-1.0, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (1.0, rest)
    } else {
        (1.0, s)
    }
}

/// Signed decimal literal: `digits [. digits] | . digits`, with an
/// optional exponent that must carry at least one digit. The literal
/// must span the whole input — trailing garbage is not a number.
fn is_decimal_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_len = digit_run(&b[i..]);
    i += int_len;
    let mut frac_len = 0;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        frac_len = digit_run(&b[i..]);
        i += frac_len;
    }
    if int_len == 0 && frac_len == 0 {
        return false;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_len = digit_run(&b[i..]);
        if exp_len == 0 {
            return false;
        }
        i += exp_len;
    }
    i == b.len()
}

fn digit_run(b: &[u8]) -> usize {
    b.iter().take_while(|c| c.is_ascii_digit()).count()
}
