//! gitignore-style path filter
//!
//! parses a newline-delimited pattern list. last matching pattern wins, so
//! `!` negations placed after positive patterns re-include paths.

use tracing::warn;

/// a single compiled pattern
#[derive(Debug, Clone)]
struct Pattern {
    tokens: Vec<Tok>,
    /// `!` prefix: a match re-includes the path
    negative: bool,
    /// leading `/`: match only from the repository root
    anchored: bool,
    /// trailing `/`: directory prefix, any suffix matches
    dir_prefix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    /// literal byte
    Lit(u8),
    /// `?` - any single non-separator character
    One,
    /// `*` - any run of non-separator characters
    Run,
    /// bare `**` - any characters, separators included
    Any,
    /// `**/` - zero or more whole path segments
    Segments,
}

/// pattern-driven predicate excluding paths from enumeration, status, and
/// commit
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// parse a pattern file body
    ///
    /// blank lines and `#` comments are skipped. a pattern that fails to
    /// compile is dropped with a warning; the filter stays usable.
    pub fn parse(text: &str) -> Self {
        let mut patterns = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match compile(trimmed) {
                Ok(pattern) => patterns.push(pattern),
                Err(reason) => warn!(pattern = trimmed, reason, "skipping ignore pattern"),
            }
        }
        Self { patterns }
    }

    /// true when at least one pattern is loaded
    pub fn active(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// verdict for a forward-slash relative path, last match wins
    pub fn ignores(&self, rel_path: &str) -> bool {
        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.matches(rel_path) {
                ignored = !pattern.negative;
            }
        }
        ignored
    }
}

/// compile one pattern line
fn compile(line: &str) -> Result<Pattern, &'static str> {
    let (negative, rest) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };
    let (anchored, rest) = match rest.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    let (dir_prefix, rest) = match rest.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    if rest.is_empty() {
        return Err("empty pattern");
    }
    if rest.contains('\0') {
        return Err("pattern contains null byte");
    }

    let bytes = rest.as_bytes();
    let mut tokens = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                if bytes.get(i + 2) == Some(&b'/') {
                    // `**/` spans zero or more segments
                    tokens.push(Tok::Segments);
                    i += 3;
                } else {
                    // bare `**` spans anything, separators included
                    tokens.push(Tok::Any);
                    i += 2;
                }
            }
            b'*' => {
                tokens.push(Tok::Run);
                i += 1;
            }
            b'?' => {
                tokens.push(Tok::One);
                i += 1;
            }
            b => {
                tokens.push(Tok::Lit(b));
                i += 1;
            }
        }
    }

    Ok(Pattern {
        tokens,
        negative,
        anchored,
        dir_prefix,
    })
}

impl Pattern {
    /// match against a relative path
    ///
    /// unanchored patterns may start at any segment boundary; patterns
    /// without a trailing `/` must end at a segment boundary (matching a
    /// file, or a directory and everything under it).
    fn matches(&self, path: &str) -> bool {
        let bytes = path.as_bytes();

        let mut starts = vec![0usize];
        if !self.anchored {
            for (i, &b) in bytes.iter().enumerate() {
                if b == b'/' {
                    starts.push(i + 1);
                }
            }
        }

        for start in starts {
            let tail = &bytes[start..];
            if self.dir_prefix {
                // directory prefix: the pattern plus `/` then anything
                if match_prefix_then_slash(&self.tokens, tail) {
                    return true;
                }
            } else {
                // whole tail, or a leading portion ending at a `/`
                if glob(&self.tokens, tail) {
                    return true;
                }
                for (i, &b) in tail.iter().enumerate() {
                    if b == b'/' && glob(&self.tokens, &tail[..i]) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// full glob match of tokens against text
fn glob(pat: &[Tok], text: &[u8]) -> bool {
    match pat.first() {
        None => text.is_empty(),
        Some(Tok::Lit(c)) => text.first() == Some(c) && glob(&pat[1..], &text[1..]),
        Some(Tok::One) => matches!(text.first(), Some(&b) if b != b'/') && glob(&pat[1..], &text[1..]),
        Some(Tok::Run) => {
            let mut i = 0;
            loop {
                if glob(&pat[1..], &text[i..]) {
                    return true;
                }
                if i < text.len() && text[i] != b'/' {
                    i += 1;
                } else {
                    return false;
                }
            }
        }
        Some(Tok::Any) => (0..=text.len()).any(|i| glob(&pat[1..], &text[i..])),
        Some(Tok::Segments) => {
            if glob(&pat[1..], text) {
                return true;
            }
            text.iter()
                .enumerate()
                .filter(|(_, &b)| b == b'/')
                .any(|(i, _)| glob(&pat[1..], &text[i + 1..]))
        }
    }
}

/// match tokens, then require a `/` and accept any suffix
fn match_prefix_then_slash(pat: &[Tok], text: &[u8]) -> bool {
    for (i, &b) in text.iter().enumerate() {
        if b == b'/' && glob(pat, &text[..i]) {
            return true;
        }
    }
    false
}
