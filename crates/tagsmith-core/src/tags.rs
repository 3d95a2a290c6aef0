//! Tag vocabulary and the line grammar used to recognize it.
//!
//! A tag line is a trimmed line that starts with a tag keyword, optionally
//! preceded by one comment prefix (`// `, `-- `, `# `). Source files carry the
//! prefixed form; generated responses usually carry the bare form. Both are
//! accepted everywhere.

// ---------------------------------------------------------------------------
// Tag keywords
// ---------------------------------------------------------------------------

pub const TAG_BLOCK_BEGIN: &str = "block_begin";
pub const TAG_BLOCK_END: &str = "block_end";
pub const TAG_INJECT_BEGIN: &str = "inject_begin";
pub const TAG_INJECT_END: &str = "inject_end";
pub const TAG_FILE_BEGIN: &str = "file_begin";
pub const TAG_FILE_END: &str = "file_end";
pub const TAG_NEW_FILE_BEGIN: &str = "new_file_begin";
pub const TAG_NEW_FILE_END: &str = "new_file_end";

/// Comment prefixes recognized in front of a tag. Each is followed by exactly
/// one space in a tag line.
pub const COMMENT_PREFIXES: &[&str] = &["//", "--", "#"];

// ---------------------------------------------------------------------------
// TagFamily
// ---------------------------------------------------------------------------

/// A begin/end tag pair plus the naming rules that go with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFamily {
    pub begin: &'static str,
    pub end: &'static str,
    /// The end tag repeats the begin tag's name and only closes a region with
    /// the same name.
    pub named_end: bool,
    /// Names are relative paths and must start with `/`.
    pub rooted: bool,
}

pub const REGION: TagFamily = TagFamily {
    begin: TAG_BLOCK_BEGIN,
    end: TAG_BLOCK_END,
    named_end: false,
    rooted: false,
};

pub const INJECTION: TagFamily = TagFamily {
    begin: TAG_INJECT_BEGIN,
    end: TAG_INJECT_END,
    named_end: false,
    rooted: false,
};

pub const WHOLE_FILE: TagFamily = TagFamily {
    begin: TAG_FILE_BEGIN,
    end: TAG_FILE_END,
    named_end: true,
    rooted: true,
};

pub const NEW_FILE: TagFamily = TagFamily {
    begin: TAG_NEW_FILE_BEGIN,
    end: TAG_NEW_FILE_END,
    named_end: true,
    rooted: true,
};

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Strip surrounding whitespace and at most one recognized comment prefix.
fn strip_prefix(line: &str) -> &str {
    let trimmed = line.trim();
    for prefix in COMMENT_PREFIXES {
        if let Some(rest) = trimmed
            .strip_prefix(prefix)
            .and_then(|r| r.strip_prefix(' '))
        {
            return rest;
        }
    }
    trimmed
}

/// Everything after `tag` on a tag line, or `None` if the line is not one.
fn tag_remainder<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    strip_prefix(line).strip_prefix(tag)
}

pub fn is_tag_line(line: &str, tag: &str) -> bool {
    tag_remainder(line, tag).is_some()
}

/// Like [`is_tag_line`], but the keyword must stand alone: it is followed by
/// whitespace or the end of the line (`block_beginning` does not count).
pub fn is_tag_word_line(line: &str, tag: &str) -> bool {
    tag_remainder(line, tag)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// True when the line is a `tag` line whose name is exactly `name`. Uses the
/// same rule as [`parse_name_from_tag_line`], so any whitespace may separate
/// the keyword from the name.
pub fn is_tag_line_with_name(line: &str, tag: &str, name: &str) -> bool {
    parse_name_from_tag_line(line, tag).as_deref() == Some(name)
}

/// Extract the name following `tag`. `None` when the line is not a `tag`
/// line, when the keyword runs into other characters (`block_beginning`), or
/// when no name follows.
pub fn parse_name_from_tag_line(line: &str, tag: &str) -> Option<String> {
    let rest = tag_remainder(line, tag)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = rest.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Whether any line of `text` is a `tag` line.
pub fn has_tag_lines(text: &str, tag: &str) -> bool {
    text.lines().any(|l| is_tag_line(l, tag))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
