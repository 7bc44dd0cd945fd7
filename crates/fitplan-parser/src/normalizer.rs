use regex::Regex;
use std::sync::LazyLock;

static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\|.*\|$").unwrap());
static TABLE_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-:| ]+$").unwrap());

/// Prepares generated plan text for line classification.
///
/// Emphasis markers are removed everywhere (`**` first, then any lone `*`)
/// and markdown table rows and separators are dropped. Every other line,
/// blank lines included, is kept in order.
pub fn normalize(input: &str) -> String {
    normalize_lines(input).join("\n")
}

/// Same as [`normalize`], but keeps the surviving lines apart.
pub fn normalize_lines(input: &str) -> Vec<String> {
    strip_emphasis(input)
        .split('\n')
        .filter(|line| !is_table_line(line))
        .map(str::to_string)
        .collect()
}

pub fn strip_emphasis(input: &str) -> String {
    input.replace("**", "").replace('*', "")
}

pub fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    TABLE_ROW_RE.is_match(trimmed) || TABLE_SEPARATOR_RE.is_match(trimmed)
}
