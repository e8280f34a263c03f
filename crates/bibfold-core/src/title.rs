//! Title cleanup: outer-brace stripping and title-casing with protected
//! math spans.
//!
//! Brace handling follows the BibTeX convention: a brace-wrapped span is a
//! case-protected unit, and a backslash-escaped brace is literal text rather
//! than structure.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TitleError {
    #[error("unbalanced math delimiters in title {0:?}")]
    UnbalancedMath(String),
}

/// Words kept lowercase unless they open or close the title.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "in", "into",
    "nor", "of", "on", "onto", "or", "per", "so", "the", "to", "up", "via",
    "vs", "with", "yet",
];

/// Remove exactly one outermost brace pair when the entire title is wrapped
/// by a single matched pair; otherwise return the title unchanged.
///
/// Nested pairs are counted and escaped braces are ignored, so
/// `{Deep {Learning} Methods}` is stripped while `Hello {World}` is not.
pub fn strip_outer_braces(title: &str) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.first() != Some(&'{') || chars.last() != Some(&'}') {
        return title.to_string();
    }

    let mut depth = 0usize;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return title.to_string();
                }
                depth -= 1;
                if depth == 0 && i != chars.len() - 1 {
                    // The opening brace closes before the end, so the pair
                    // does not wrap the whole title.
                    return title.to_string();
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return title.to_string();
    }
    chars[1..chars.len() - 1].iter().collect()
}

/// Wrap every `$…$` math span (delimiters included) in a brace pair so the
/// casing pass treats it as a literal unit. Unescaped `$` markers pair up in
/// first-seen order; an odd count is an error.
fn protect_math_spans(title: &str) -> Result<String, TitleError> {
    let chars: Vec<char> = title.chars().collect();
    let mut marks = Vec::new();
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '$' => marks.push(i),
            _ => {}
        }
    }
    if marks.len() % 2 != 0 {
        return Err(TitleError::UnbalancedMath(title.to_string()));
    }

    let mut out = String::with_capacity(title.len() + marks.len());
    let mut next_mark = 0;
    for (i, &c) in chars.iter().enumerate() {
        if next_mark < marks.len() && i == marks[next_mark] {
            if next_mark % 2 == 0 {
                out.push('{');
                out.push('$');
            } else {
                out.push('$');
                out.push('}');
            }
            next_mark += 1;
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

enum Segment {
    /// Brace-wrapped span, emitted verbatim.
    Protected(String),
    Word(String),
    Space(String),
}

/// Split a title into case-protected brace spans, words, and whitespace runs.
fn segment(title: &str) -> Vec<Segment> {
    let chars: Vec<char> = title.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '{' {
            // Consume the balanced group; an unclosed group runs to the end.
            let mut depth = 0usize;
            let mut escaped = false;
            let mut end = chars.len();
            for (offset, &g) in chars[i..].iter().enumerate() {
                if escaped {
                    escaped = false;
                    continue;
                }
                match g {
                    '\\' => escaped = true,
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            end = i + offset + 1;
                            break;
                        }
                    }
                    _ => {}
                }
            }
            segments.push(Segment::Protected(chars[i..end].iter().collect()));
            i = end;
        } else if c.is_whitespace() {
            let mut end = i;
            while end < chars.len() && chars[end].is_whitespace() {
                end += 1;
            }
            segments.push(Segment::Space(chars[i..end].iter().collect()));
            i = end;
        } else {
            let mut end = i;
            let mut escaped = false;
            while end < chars.len() {
                let w = chars[end];
                if escaped {
                    escaped = false;
                    end += 1;
                    continue;
                }
                if w == '\\' {
                    escaped = true;
                    end += 1;
                    continue;
                }
                if w.is_whitespace() || w == '{' {
                    break;
                }
                end += 1;
            }
            segments.push(Segment::Word(chars[i..end].iter().collect()));
            i = end;
        }
    }
    segments
}

/// Uppercase the first alphabetic character, lowercase the rest. Words led
/// by a digit are left as they are.
fn capitalize(word: &str) -> String {
    let first_alnum_is_alpha = word
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.is_alphabetic())
        .unwrap_or(false);
    if !first_alnum_is_alpha {
        return word.to_string();
    }
    let mut out = String::with_capacity(word.len());
    let mut seen_first = false;
    for c in word.chars() {
        if !seen_first && c.is_alphabetic() {
            seen_first = true;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

fn case_word(word: &str, boundary: bool) -> String {
    let alpha: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();

    // Acronyms and words with interior capitals keep their casing.
    if alpha.len() >= 2 && alpha.iter().all(|c| c.is_uppercase()) {
        return word.to_string();
    }
    if alpha.iter().skip(1).any(|c| c.is_uppercase()) {
        return word.to_string();
    }

    let core: String = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    if !boundary && MINOR_WORDS.contains(&core.as_str()) {
        return word.to_lowercase();
    }
    capitalize(word)
}

/// Title-case `title`: capitalize main words, lowercase minor words, always
/// capitalize the first and last word, and pass acronyms, mixed-case words,
/// and brace-protected spans through untouched. Math spans are protected
/// first; unbalanced `$` markers fail rather than mis-case the title.
pub fn title_case(title: &str) -> Result<String, TitleError> {
    let protected = protect_math_spans(title)?;
    let segments = segment(&protected);

    let word_positions: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter_map(|(i, s)| matches!(s, Segment::Word(_)).then_some(i))
        .collect();
    let first_word = word_positions.first().copied();
    let last_word = word_positions.last().copied();

    let mut out = String::with_capacity(protected.len());
    for (i, seg) in segments.iter().enumerate() {
        match seg {
            Segment::Protected(text) | Segment::Space(text) => out.push_str(text),
            Segment::Word(word) => {
                let boundary = Some(i) == first_word || Some(i) == last_word;
                out.push_str(&case_word(word, boundary));
            }
        }
    }
    Ok(out)
}

/// Full title normalization: strip a wrapping brace pair, then title-case.
pub fn normalize(title: &str) -> Result<String, TitleError> {
    title_case(&strip_outer_braces(title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_a_fully_wrapping_pair() {
        assert_eq!(strip_outer_braces("{Hello World}"), "Hello World");
    }

    #[test]
    fn leaves_partial_wrapping_alone() {
        assert_eq!(strip_outer_braces("Hello {World}"), "Hello {World}");
    }

    #[test]
    fn counts_nested_pairs() {
        assert_eq!(
            strip_outer_braces("{Deep {Learning} Methods}"),
            "Deep {Learning} Methods"
        );
        // Two adjacent groups, not one wrapping pair.
        assert_eq!(strip_outer_braces("{Deep}{Learning}"), "{Deep}{Learning}");
    }

    #[test]
    fn escaped_braces_are_literal() {
        assert_eq!(strip_outer_braces("\\{Hello\\}"), "\\{Hello\\}");
        assert_eq!(strip_outer_braces("{Hello \\} World}"), "Hello \\} World");
    }

    #[test]
    fn unbalanced_braces_are_left_alone() {
        assert_eq!(strip_outer_braces("{Hello"), "{Hello");
        assert_eq!(strip_outer_braces("{a}}"), "{a}}");
    }

    #[test]
    fn capitalizes_main_words_and_lowers_minor_words() {
        assert_eq!(
            title_case("a study of deep learning").unwrap(),
            "A Study of Deep Learning"
        );
        assert_eq!(title_case("the art of war").unwrap(), "The Art of War");
    }

    #[test]
    fn last_word_is_always_capitalized() {
        assert_eq!(
            title_case("what dreams are made of").unwrap(),
            "What Dreams Are Made Of"
        );
    }

    #[test]
    fn acronyms_and_mixed_case_words_are_preserved() {
        assert_eq!(
            title_case("HTTP servers in the wild").unwrap(),
            "HTTP Servers in the Wild"
        );
        assert_eq!(
            title_case("typesetting with LaTeX and friends").unwrap(),
            "Typesetting with LaTeX and Friends"
        );
        assert_eq!(
            title_case("an eBPF based load balancer").unwrap(),
            "An eBPF Based Load Balancer"
        );
    }

    #[test]
    fn math_spans_are_wrapped_and_untouched() {
        assert_eq!(
            title_case("bounds on $O(n \\log n)$ sorting").unwrap(),
            "Bounds on {$O(n \\log n)$} Sorting"
        );
    }

    #[test]
    fn existing_braced_spans_pass_through() {
        assert_eq!(
            title_case("learning {BERT} embeddings from scratch").unwrap(),
            "Learning {BERT} Embeddings from Scratch"
        );
    }

    #[test]
    fn unbalanced_math_is_an_error() {
        let err = title_case("price is $99").unwrap_err();
        assert!(matches!(err, TitleError::UnbalancedMath(_)));
    }

    #[test]
    fn escaped_dollars_are_not_delimiters() {
        assert_eq!(
            title_case("savings of \\$5 per query").unwrap(),
            "Savings of \\$5 per Query"
        );
    }

    #[test]
    fn normalize_strips_then_cases() {
        assert_eq!(
            normalize("{a tour of the BibTeX format}").unwrap(),
            "A Tour of the BibTeX Format"
        );
    }
}
