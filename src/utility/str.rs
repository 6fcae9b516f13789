use once_cell::sync::Lazy;
use regex::Regex;

// Character classes relevant to tokenizing collated text
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CharClass {
    Letter,
    Joiner,
    Other,
}

// ' ', ZWNJ, '|', '〉'
pub const JOINERS: [char; 4] = [' ', '\u{200C}', '|', '\u{232A}'];

impl CharClass {
    pub fn from(c: char) -> Self {
        if is_letter(c) {
            Self::Letter
        } else if JOINERS.contains(&c) {
            Self::Joiner
        } else {
            Self::Other
        }
    }
}

// General category L only: vowel signs, anusvara and visarga are not letters
pub fn is_letter(c: char) -> bool {
    static REGEX_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}$").unwrap());

    let mut buf = [0; 4];
    REGEX_LETTER.is_match(c.encode_utf8(&mut buf))
}

pub fn has_letters(s: &str) -> bool {
    s.chars().any(is_letter)
}

pub fn strip_chars(s: &str, chars: &[char]) -> String {
    s.chars().filter(|c| !chars.contains(c)).collect()
}
