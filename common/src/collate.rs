//! Locale-style string ordering for the sort stage.
//!
//! Approximates the root-locale collation browsers use for `localeCompare`:
//! character class first (whitespace, punctuation, symbols, digits, letters),
//! then letters without regard to case, then lowercase before uppercase.
//! Code point order breaks any remaining tie so the ordering is total.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Whitespace,
    Punctuation,
    Symbol,
    Digit,
    Letter,
    Other,
}

fn class_of(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if c.is_ascii_punctuation() {
        // ASCII symbols sort after the rest of the punctuation
        match c {
            '`' | '^' | '+' | '<' | '=' | '>' | '|' | '~' | '$' => CharClass::Symbol,
            _ => CharClass::Punctuation,
        }
    } else if c.is_numeric() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else if c.is_control() {
        CharClass::Whitespace
    } else {
        CharClass::Other
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Primary and secondary comparison of one character pair.
fn primary(a: char, b: char) -> Ordering {
    class_of(a)
        .cmp(&class_of(b))
        .then_with(|| fold(a).cmp(&fold(b)))
}

/// Lowercase sorts before uppercase at the first case difference.
fn tertiary(a: char, b: char) -> Ordering {
    match (a.is_lowercase(), b.is_lowercase()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Compare two strings the way the table sort expects.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let mut case_tie = Ordering::Equal;
    let mut left = a.chars();
    let mut right = b.chars();

    loop {
        match (left.next(), right.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = primary(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
                if case_tie == Ordering::Equal {
                    case_tie = tertiary(x, y);
                }
            }
        }
    }

    case_tie.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_primary() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_first_on_tie() {
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("Kamau", "kamau"), Ordering::Greater);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(locale_cmp("Nairobi", "Nairobi Court"), Ordering::Less);
        assert_eq!(locale_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_class_order() {
        assert_eq!(locale_cmp(" x", "_x"), Ordering::Less);
        assert_eq!(locale_cmp("_x", "1"), Ordering::Less);
        assert_eq!(locale_cmp("9", "a"), Ordering::Less);
    }

    #[test]
    fn test_digits_are_not_numeric() {
        // "10" < "9": plain character comparison, no numeric collation
        assert_eq!(locale_cmp("10", "9"), Ordering::Less);
    }

    #[test]
    fn test_dates_sort_chronologically() {
        assert_eq!(locale_cmp("2024-01-05", "2024-01-19"), Ordering::Less);
        assert_eq!(locale_cmp("2023-12-31", "2024-01-01"), Ordering::Less);
    }

    #[test]
    fn test_total_and_reflexive() {
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
        assert_ne!(locale_cmp("é", "e"), Ordering::Equal);
    }
}
