//! Soundex phonetic codes: one leading letter followed by three digits.

pub const CODE_LEN: usize = 4;

fn group_digit(c: char) -> Option<char> {
    match c {
        'B' | 'F' | 'P' | 'V' => Some('1'),
        'C' | 'G' | 'J' | 'K' | 'Q' | 'S' | 'X' | 'Z' => Some('2'),
        'D' | 'T' => Some('3'),
        'L' => Some('4'),
        'M' | 'N' => Some('5'),
        'R' => Some('6'),
        // vowels, H, W, Y and anything non-alphabetic carry no code
        _ => None,
    }
}

/// Encode `term`, or `None` if it is empty.
///
/// The first character is kept (uppercased); a digit is appended only when it
/// differs from the last digit appended, and the result is padded with `'0'`.
pub fn soundex(term: &str) -> Option<String> {
    let mut chars = term.chars().flat_map(char::to_uppercase);
    let first = chars.next()?;

    let mut code = String::with_capacity(CODE_LEN);
    code.push(first);
    let mut len = 1;
    let mut last_digit: Option<char> = None;

    for c in chars {
        if len == CODE_LEN {
            break;
        }
        if let Some(digit) = group_digit(c) {
            if last_digit != Some(digit) {
                code.push(digit);
                last_digit = Some(digit);
                len += 1;
            }
        }
    }
    for _ in len..CODE_LEN {
        code.push('0');
    }
    Some(code)
}
