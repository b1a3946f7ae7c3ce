//! Word-to-number conversion for numeric fields
//!
//! Handles plain number phrases the way users actually type them:
//! "thirty", "twenty five", "twenty-five", "one hundred and twenty".

fn unit_value(word: &str) -> Option<i64> {
    let v = match word {
        "zero" => 0,
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "sixteen" => 16,
        "seventeen" => 17,
        "eighteen" => 18,
        "nineteen" => 19,
        _ => return None,
    };
    Some(v)
}

fn tens_value(word: &str) -> Option<i64> {
    let v = match word {
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "fifty" => 50,
        "sixty" => 60,
        "seventy" => 70,
        "eighty" => 80,
        "ninety" => 90,
        _ => return None,
    };
    Some(v)
}

fn scale_value(word: &str) -> Option<i64> {
    let v = match word {
        "hundred" => 100,
        "thousand" => 1_000,
        "million" => 1_000_000,
        _ => return None,
    };
    Some(v)
}

/// Whether a single lowercase word is part of a number phrase
pub fn is_number_word(word: &str) -> bool {
    unit_value(word).is_some() || tens_value(word).is_some() || scale_value(word).is_some()
}

/// Parse a spelled-out number phrase into an integer.
///
/// Returns `None` when the phrase contains anything that is not a number
/// word (ignoring "and" and hyphens), or when the value overflows `i64`
/// (user input can stack scale words without limit).
pub fn word_to_number(phrase: &str) -> Option<i64> {
    let mut total: i64 = 0;
    let mut current: i64 = 0;
    let mut saw_word = false;

    for word in phrase.to_lowercase().replace('-', " ").split_whitespace() {
        if word == "and" {
            continue;
        }
        if let Some(v) = unit_value(word).or_else(|| tens_value(word)) {
            current = current.checked_add(v)?;
            saw_word = true;
        } else if let Some(scale) = scale_value(word) {
            if current == 0 {
                current = 1;
            }
            current = current.checked_mul(scale)?;
            if scale > 100 {
                total = total.checked_add(current)?;
                current = 0;
            }
            saw_word = true;
        } else {
            return None;
        }
    }

    if saw_word {
        total.checked_add(current)
    } else {
        None
    }
}
