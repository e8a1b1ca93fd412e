//! Enough of a Rust lexer to track block depth through hand-written code.
//!
//! Braces inside string, raw string and char literals and inside comments do
//! not open or close blocks. State carries across lines, so multi-line
//! strings and block comments are handled.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    /// Nesting level of `/* */`.
    BlockComment(usize),
    Str,
    /// Number of `#` around the raw string.
    RawStr(usize),
}

/// What the scanner saw on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInfo {
    /// Block depth at the start of the line.
    pub depth:          isize,
    /// False when the line starts inside a comment or a string.
    pub starts_in_code: bool,
    /// Byte offset of the first `{` on the line that opens a block.
    pub first_open:     Option<usize>,
}

pub fn scan_lines(lines: &[&str]) -> Vec<LineInfo> {
    let mut state = State::Code;
    let mut depth: isize = 0;

    lines
        .iter()
        .map(|line| {
            let mut info = LineInfo {
                depth,
                starts_in_code: state == State::Code,
                first_open: None,
            };
            let (next, delta, first_open) = scan_line(line, state);
            info.first_open = first_open;
            state = next;
            depth += delta;
            info
        })
        .collect()
}

fn scan_line(line: &str, mut state: State) -> (State, isize, Option<usize>) {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let at = |index: usize| chars.get(index).map(|&(_, ch)| ch);

    let mut delta = 0;
    let mut first_open = None;
    let mut i = 0;

    while i < chars.len() {
        let (offset, ch) = chars[i];
        match state {
            State::BlockComment(nesting) => {
                if ch == '*' && at(i + 1) == Some('/') {
                    state = if nesting == 1 { State::Code } else { State::BlockComment(nesting - 1) };
                    i += 2;
                } else if ch == '/' && at(i + 1) == Some('*') {
                    state = State::BlockComment(nesting + 1);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            State::Str => match ch {
                '\\' => i += 2,
                '"' => {
                    state = State::Code;
                    i += 1;
                }
                _ => i += 1,
            },
            State::RawStr(hashes) => {
                if ch == '"' && (1..=hashes).all(|k| at(i + k) == Some('#')) {
                    state = State::Code;
                    i += 1 + hashes;
                } else {
                    i += 1;
                }
            }
            State::Code => match ch {
                '/' if at(i + 1) == Some('/') => break,
                '/' if at(i + 1) == Some('*') => {
                    state = State::BlockComment(1);
                    i += 2;
                }
                '"' => {
                    state = State::Str;
                    i += 1;
                }
                '\'' => i = skip_char_literal(&chars, i),
                '{' => {
                    first_open.get_or_insert(offset);
                    delta += 1;
                    i += 1;
                }
                '}' => {
                    delta -= 1;
                    i += 1;
                }
                ch if ch.is_alphabetic() || ch == '_' => {
                    let start = i;
                    while at(i).map_or(false, |ch| ch.is_alphanumeric() || ch == '_') {
                        i += 1;
                    }
                    let is_raw_prefix = matches!(i - start, 1 | 2)
                        && chars[start..i].iter().map(|&(_, ch)| ch).eq(raw_prefix(i - start));
                    if is_raw_prefix {
                        let hashes = (i..).take_while(|&k| at(k) == Some('#')).count();
                        if at(i + hashes) == Some('"') {
                            state = State::RawStr(hashes);
                            i += hashes + 1;
                        }
                    }
                }
                _ => i += 1,
            },
        }
    }

    (state, delta, first_open)
}

fn raw_prefix(len: usize) -> std::str::Chars<'static> {
    if len == 1 { "r".chars() } else { "br".chars() }
}

/// Index just past a char literal starting at `i`, or past the quote alone
/// when it starts a lifetime or label.
fn skip_char_literal(chars: &[(usize, char)], i: usize) -> usize {
    let at = |index: usize| chars.get(index).map(|&(_, ch)| ch);
    match (at(i + 1), at(i + 2)) {
        (Some('\\'), _) => {
            let mut j = i + 3;
            while j < chars.len() && chars[j].1 != '\'' {
                j += 1;
            }
            j + 1
        }
        (Some(_), Some('\'')) => i + 3,
        _ => i + 1,
    }
}
