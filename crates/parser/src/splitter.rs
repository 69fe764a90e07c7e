//! Statement splitting. `split_candidates` cuts the input at top-level
//! semicolons with full string/comment/dollar-quote awareness; the parse
//! loop in the crate root re-joins candidates whenever a `;` turns out to
//! be embedded in a statement the grammar rejects in isolation.

use crate::lexer::ParserMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Default,
    LineComment,
    BlockComment(u32),
    SingleQuote,
    DoubleQuote,
    Backtick,
    Bracket,
}

pub(crate) fn split_candidates(sql: &str, mode: ParserMode) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut state = SplitState::Default;
    let mut dollar_tag: Option<String> = None;
    let mut chars = sql.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        if let Some(tag) = &dollar_tag {
            current.push(ch);
            if ch == '$' && sql[..offset + ch.len_utf8()].ends_with(tag.as_str()) {
                dollar_tag = None;
            }
            continue;
        }

        match state {
            SplitState::Default => match ch {
                ';' => {
                    segments.push(std::mem::take(&mut current));
                    continue;
                }
                '\'' => state = SplitState::SingleQuote,
                '"' => state = SplitState::DoubleQuote,
                '`' if mode == ParserMode::Mysql => state = SplitState::Backtick,
                '[' if mode == ParserMode::Mssql => state = SplitState::Bracket,
                '-' if chars.peek().map(|(_, c)| *c) == Some('-') => {
                    state = SplitState::LineComment;
                }
                '#' if mode == ParserMode::Mysql => state = SplitState::LineComment,
                '/' if chars.peek().map(|(_, c)| *c) == Some('*') => {
                    state = SplitState::BlockComment(1);
                    current.push(ch);
                    let (_, star) = chars.next().unwrap_or((0, '*'));
                    current.push(star);
                    continue;
                }
                '$' if mode == ParserMode::Postgres => {
                    if let Some(tag) = scan_dollar_tag(&sql[offset..]) {
                        dollar_tag = Some(tag.clone());
                        current.push(ch);
                        for _ in 0..tag.chars().count().saturating_sub(1) {
                            if let Some((_, tag_ch)) = chars.next() {
                                current.push(tag_ch);
                            }
                        }
                        continue;
                    }
                }
                _ => {}
            },
            SplitState::LineComment => {
                if ch == '\n' {
                    state = SplitState::Default;
                }
            }
            SplitState::BlockComment(depth) => {
                if ch == '*' && chars.peek().map(|(_, c)| *c) == Some('/') {
                    current.push(ch);
                    let (_, slash) = chars.next().unwrap_or((0, '/'));
                    current.push(slash);
                    state = if depth <= 1 {
                        SplitState::Default
                    } else {
                        SplitState::BlockComment(depth - 1)
                    };
                    continue;
                }
                if ch == '/' && chars.peek().map(|(_, c)| *c) == Some('*') {
                    current.push(ch);
                    let (_, star) = chars.next().unwrap_or((0, '*'));
                    current.push(star);
                    state = SplitState::BlockComment(depth + 1);
                    continue;
                }
            }
            SplitState::SingleQuote => {
                if ch == '\'' {
                    state = SplitState::Default;
                }
            }
            SplitState::DoubleQuote => {
                if ch == '"' {
                    state = SplitState::Default;
                }
            }
            SplitState::Backtick => {
                if ch == '`' {
                    state = SplitState::Default;
                }
            }
            SplitState::Bracket => {
                if ch == ']' {
                    state = SplitState::Default;
                }
            }
        }

        current.push(ch);
    }

    if !current.trim().is_empty() {
        segments.push(current);
    }

    segments
}

/// `$tag$` (or `$$`) at the start of `input`; returns the full opening
/// delimiter when present.
fn scan_dollar_tag(input: &str) -> Option<String> {
    let mut tag = String::from("$");
    for ch in input.chars().skip(1) {
        if ch == '$' {
            tag.push('$');
            return Some(tag);
        }
        if !(ch.is_alphanumeric() || ch == '_') {
            return None;
        }
        tag.push(ch);
    }
    None
}
