use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no entry lines to merge")]
    NoEntries,
    #[error("continuation line before any entry: {line:?}")]
    OrphanContinuation { line: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Entry,
    Continuation,
    Blank,
    Noise,
}

/// Entries start with an ASCII list number. Numeric symbols such as `½` or
/// `Ⅻ` do not count.
pub fn is_entry_start(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Keep only non-empty lines that start with a digit.
pub fn validate_lines<'a, I>(lines: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines.into_iter().filter(|l| is_entry_start(l)).collect()
}

/// Classify every line of a page. A non-blank line counts as a continuation
/// only while it directly follows an entry or another continuation; a blank
/// line breaks the chain.
pub fn classify<'a, I>(lines: I) -> Vec<(LineKind, &'a str)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut in_entry = false;
    lines
        .into_iter()
        .map(|line| {
            let kind = if is_entry_start(line) {
                LineKind::Entry
            } else if line.trim().is_empty() {
                LineKind::Blank
            } else if in_entry {
                LineKind::Continuation
            } else {
                LineKind::Noise
            };
            in_entry = matches!(kind, LineKind::Entry | LineKind::Continuation);
            (kind, line)
        })
        .collect()
}

/// Entry lines plus the continuation lines wrapped under them.
pub fn retain_entry_lines<'a, I>(lines: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    classify(lines)
        .into_iter()
        .filter(|(kind, _)| matches!(kind, LineKind::Entry | LineKind::Continuation))
        .map(|(_, line)| line)
        .collect()
}

#[derive(Debug, Default)]
struct EntryMerger {
    current: Option<String>,
    completed: Vec<String>,
}

impl EntryMerger {
    fn push(&mut self, line: &str) -> Result<(), ParseError> {
        if is_entry_start(line) {
            if let Some(done) = self.current.replace(line.to_string()) {
                self.completed.push(done);
            }
            return Ok(());
        }
        match self.current.as_mut() {
            Some(buf) => {
                let tail = line.trim_start();
                if !tail.is_empty() {
                    buf.push(' ');
                    buf.push_str(tail);
                }
                Ok(())
            }
            None => Err(ParseError::OrphanContinuation {
                line: line.to_string(),
            }),
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.completed.extend(self.current.take());
        self.completed
    }
}

/// Fold wrapped continuation lines back onto the entry they belong to.
pub fn remove_overflow_lines(lines: &[&str]) -> Result<Vec<String>, ParseError> {
    if lines.is_empty() {
        return Err(ParseError::NoEntries);
    }
    let mut merger = EntryMerger::default();
    for line in lines {
        merger.push(line)?;
    }
    Ok(merger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_keeps_digit_lines_in_order() {
        let input = ["1 a  b", "", "Header", "  2 indented", "2 c  d", "x"];
        let out = validate_lines(input);
        assert_eq!(out, vec!["1 a  b", "2 c  d"]);
    }

    #[test]
    fn validate_rejects_numeric_symbols() {
        let input = ["½ kopje  half cup", "Ⅻ chapter", "٣ arabic", "²kwadraat", "3 drie  three"];
        assert_eq!(validate_lines(input), vec!["3 drie  three"]);
    }

    #[test]
    fn validate_empty() {
        let out = validate_lines(Vec::<&str>::new());
        assert!(out.is_empty());
    }

    #[test]
    fn validate_output_is_subsequence() {
        let input = ["9 z", "no", "1 y", "", "0 x"];
        let out = validate_lines(input);
        let mut it = input.iter();
        for kept in &out {
            assert!(is_entry_start(kept));
            assert!(it.any(|l| l == kept));
        }
    }

    #[test]
    fn classify_chains() {
        let lines = ["Title", "1 cat  a", "wrapped", "", "footer", "2 dog  b"];
        let kinds: Vec<_> = classify(lines).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Noise,
                LineKind::Entry,
                LineKind::Continuation,
                LineKind::Blank,
                LineKind::Noise,
                LineKind::Entry,
            ]
        );
    }

    #[test]
    fn retain_drops_leading_noise_and_detached_lines() {
        let lines = ["Book title", "1 cat  a", "more", "", "page footer", "2 dog  b"];
        assert_eq!(retain_entry_lines(lines), vec!["1 cat  a", "more", "2 dog  b"]);
    }

    #[test]
    fn merge_appends_continuations() {
        let merged =
            remove_overflow_lines(&["1 cat  a small animal", "extra description wrapped", "2 dog  b"])
                .unwrap();
        assert_eq!(
            merged,
            vec!["1 cat  a small animal extra description wrapped", "2 dog  b"]
        );
    }

    #[test]
    fn merge_trims_continuation_indent() {
        let merged = remove_overflow_lines(&["1 huis  house,", "      home"]).unwrap();
        assert_eq!(merged, vec!["1 huis  house, home"]);
    }

    #[test]
    fn merge_entry_count_matches_digit_lines() {
        let input = ["1 a", "b", "c", "2 d", "3 e", "f"];
        let merged = remove_overflow_lines(&input).unwrap();
        let starts = input.iter().filter(|l| is_entry_start(l)).count();
        assert_eq!(merged.len(), starts);
    }

    #[test]
    fn merge_fraction_line_is_continuation() {
        let merged = remove_overflow_lines(&["4 suiker  sugar", "½ kopje"]).unwrap();
        assert_eq!(merged, vec!["4 suiker  sugar ½ kopje"]);
    }

    #[test]
    fn merge_empty_is_error() {
        assert_eq!(remove_overflow_lines(&[]), Err(ParseError::NoEntries));
    }

    #[test]
    fn merge_leading_continuation_is_error() {
        let err = remove_overflow_lines(&["wrapped", "1 cat  a"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::OrphanContinuation {
                line: "wrapped".to_string()
            }
        );
    }
}
