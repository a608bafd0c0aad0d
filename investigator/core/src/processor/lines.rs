//! Line splitting and classification
//!
//! Text arrives in arbitrary chunks. [`split_lines`] turns a buffer into the
//! complete lines ready for emission plus the remainder that must stay
//! buffered. Bare list markers ("-", "*", "3.") are treated as placeholders:
//! the backend replaces them with the real item in a later fragment, so they
//! are never emitted on their own. Inside a fenced code block every line is
//! literal and passes through untouched.

/// Result of splitting a text buffer
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SplitLines {
    /// Lines ready for classification, in order
    pub complete: Vec<String>,
    /// Text that must stay buffered
    pub remainder: String,
}

/// Split `buffer` into complete lines and a remainder
///
/// `in_code_block` is the fence state before the first line of `buffer`.
/// With `finalize` set, the trailing incomplete line is emitted as well and a
/// dangling list marker is dropped.
pub(crate) fn split_lines(buffer: &str, in_code_block: bool, finalize: bool) -> SplitLines {
    let mut splitter = Splitter {
        complete: Vec::new(),
        held: None,
        in_code_block,
    };

    let mut segments: Vec<&str> = buffer.split('\n').collect();
    let tail = segments.pop().unwrap_or_default();

    for segment in segments {
        splitter.push_line(segment.strip_suffix('\r').unwrap_or(segment));
    }

    if finalize {
        let tail = tail.strip_suffix('\r').unwrap_or(tail);
        if !tail.is_empty() {
            splitter.push_line(tail);
        }
        // A placeholder that never got its content carries nothing to show
        return SplitLines {
            complete: splitter.complete,
            remainder: String::new(),
        };
    }

    let remainder = match splitter.held {
        Some(marker) => format!("{marker}\n{tail}"),
        None => tail.to_string(),
    };
    SplitLines {
        complete: splitter.complete,
        remainder,
    }
}

struct Splitter {
    complete: Vec<String>,
    held: Option<String>,
    in_code_block: bool,
}

impl Splitter {
    /// Route one complete line through the placeholder hold-back
    fn push_line(&mut self, line: &str) {
        if self.in_code_block {
            if is_code_fence(line) {
                self.in_code_block = false;
            }
            self.complete.push(line.to_string());
            return;
        }

        if is_bare_list_marker(line) {
            self.held = Some(line.to_string());
            return;
        }

        match self.held.take() {
            Some(marker) if !replaces_placeholder(line) => {
                self.complete.push(format!("{marker} {}", line.trim_start()));
            }
            _ => {
                if is_code_fence(line) {
                    self.in_code_block = true;
                }
                self.complete.push(line.to_string());
            }
        }
    }
}

/// Whether a line starts something that supersedes a held list marker
fn replaces_placeholder(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || list_marker_len(trimmed).is_some()
        || is_table_row(trimmed)
        || is_code_fence(trimmed)
}

/// Whether a line is only a list marker with nothing after it
pub(crate) fn is_bare_list_marker(line: &str) -> bool {
    let trimmed = line.trim();
    matches!(trimmed, "-" | "*" | "+") || is_numbered_marker(trimmed)
}

/// "1." / "12)" style marker with at most three digits
fn is_numbered_marker(text: &str) -> bool {
    let Some(digits) = text.strip_suffix('.').or_else(|| text.strip_suffix(')')) else {
        return false;
    };
    (1..=3).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Byte length of a leading list marker including its following space
fn list_marker_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if matches!(bytes.first(), Some(b'-' | b'*' | b'+')) && bytes.get(1) == Some(&b' ') {
        return Some(2);
    }

    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if (1..=3).contains(&digits)
        && matches!(bytes.get(digits), Some(b'.' | b')'))
        && bytes.get(digits + 1) == Some(&b' ')
    {
        return Some(digits + 2);
    }
    None
}

/// Strip a leading bullet or number marker
pub(crate) fn strip_list_marker(text: &str) -> &str {
    let trimmed = text.trim();
    match list_marker_len(trimmed) {
        Some(len) => trimmed[len..].trim_start(),
        None => trimmed,
    }
}

/// Whether a line belongs to a markdown table
pub(crate) fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Whether a line opens or closes a fenced code block
pub(crate) fn is_code_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}
