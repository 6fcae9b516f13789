use crate::utility::str::{has_letters, CharClass};

// Splits running text into alignable tokens.
//
// Non-letters in front of a word stay with that word. After a letter, a
// joiner (space, ZWNJ, '|', '〉') ends the word, but every joiner that
// follows is still part of it; the next non-joiner starts a new token.
// A trailing fragment without letters is glued to the previous token.
// Concatenating the tokens gives back the input, except that an empty input
// gives one " " token.
pub fn tokenize(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![" ".to_owned()];
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut leading = true;
    let mut joining = false;

    for c in text.chars() {
        let class = CharClass::from(c);

        if leading && class != CharClass::Letter {
            current.push(c);
            continue;
        }
        leading = false;

        if joining {
            if class == CharClass::Joiner {
                current.push(c);
                continue;
            }

            tokens.push(std::mem::take(&mut current));
            current.push(c);
            joining = false;
            leading = class != CharClass::Letter;
            continue;
        }

        if class == CharClass::Joiner {
            joining = true;
        }
        current.push(c);
    }

    match tokens.last_mut() {
        Some(last) if !has_letters(&current) => last.push_str(&current),
        _ => tokens.push(current),
    }

    tokens
}
