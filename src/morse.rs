//! Morse dictionary and symbol-to-text decoding

use crate::timing::Symbol;

/// Rendered form of a word gap.
pub const WORD_SEPARATOR: &str = "   ";
/// Rendered form of a letter gap.
pub const LETTER_SEPARATOR: char = ' ';
/// Placeholder for codes with no dictionary entry.
pub const UNKNOWN: char = '?';

/// International Morse for letters and digits.
pub const MORSE_TABLE: [(char, &str); 36] = [
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('0', "-----"),
];

pub fn morse_to_char(code: &str) -> Option<char> {
    MORSE_TABLE
        .iter()
        .find(|(_, c)| *c == code)
        .map(|&(ch, _)| ch)
}

/// Code for a letter or digit, case-insensitive.
pub fn char_to_morse(ch: char) -> Option<&'static str> {
    let ch = ch.to_ascii_uppercase();
    MORSE_TABLE
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|&(_, code)| code)
}

/// Renders symbols as `.`/`-` with one space per letter gap and three per
/// word gap.
pub fn render(symbols: &[Symbol]) -> String {
    let mut out = String::with_capacity(symbols.len());
    for symbol in symbols {
        match symbol {
            Symbol::Dot => out.push('.'),
            Symbol::Dash => out.push('-'),
            Symbol::LetterGap => out.push(LETTER_SEPARATOR),
            Symbol::WordGap => out.push_str(WORD_SEPARATOR),
        }
    }
    out
}

/// Decodes a rendered code string. Words are split on three spaces and
/// letters on single spaces; unknown codes become `?`. Empty words and
/// letters (from leading, trailing or doubled gaps) are skipped.
pub fn decode_code_string(code: &str) -> String {
    code.split(WORD_SEPARATOR)
        .map(|word| {
            word.split(LETTER_SEPARATOR)
                .filter(|letter| !letter.is_empty())
                .map(|letter| morse_to_char(letter).unwrap_or(UNKNOWN))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn decode_symbols(symbols: &[Symbol]) -> String {
    decode_code_string(&render(symbols))
}
