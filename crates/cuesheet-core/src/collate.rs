//! Name ordering for cue lists.
//!
//! Cue names like `1M2`, `1M10` and `2M1` should list in the order a person
//! reads them, so runs of digits compare by numeric value and letters compare
//! without regard to case or accents (`Éclair` lists next to `Eclair`, not
//! after `zebra`).

use smallvec::SmallVec;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn segments(name: &str) -> SmallVec<[Segment<'_>; 8]> {
    let mut out = SmallVec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in name.char_indices() {
        let digit = c.is_ascii_digit();
        if let Some(previous) = in_digits {
            if previous != digit {
                out.push(segment(&name[start..i], previous));
                start = i;
            }
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(segment(&name[start..], digit));
    }
    out
}

fn segment(text: &str, digits: bool) -> Segment<'_> {
    if digits {
        Segment::Digits(text)
    } else {
        Segment::Text(text)
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

/// Base letters only: decomposed, combining marks dropped, lowercased.
fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn compare_folded(a: &str, b: &str) -> Ordering {
    folded(a).cmp(folded(b))
}

fn compare_caseless(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Compare two names the way a file browser lists them: numeric runs by value,
/// text by base letter ignoring case and accents.
///
/// The order is total. Names equal at that level are then ordered by their
/// accented letters, and finally by bytes, so sorting stays deterministic.
pub fn standard_compare(a: &str, b: &str) -> Ordering {
    let a_segments = segments(a);
    let b_segments = segments(b);

    for (left, right) in a_segments.iter().zip(b_segments.iter()) {
        let ordering = match (left, right) {
            (Segment::Digits(x), Segment::Digits(y)) => compare_numeric(x, y),
            (Segment::Text(x), Segment::Text(y)) => compare_folded(x, y),
            (Segment::Digits(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Digits(_)) => Ordering::Greater,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_segments
        .len()
        .cmp(&b_segments.len())
        .then_with(|| compare_caseless(a, b))
        .then_with(|| a.cmp(b))
}
