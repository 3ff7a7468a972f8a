pub const MAX_KEYWORD_LINES: usize = 100;
pub const MAX_KEYWORD_CHARS: usize = 100;

/// Shapes raw text-area input into the stored keyword list.
///
/// Non-empty lines are cut to their first 100 characters. An empty line is
/// kept only when the previously kept line is non-empty, so runs of blank
/// lines collapse to one and a trailing newline survives while typing.
/// At most 100 lines are kept.
pub fn sanitize_keywords(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in raw.split('\n') {
        if !line.is_empty() {
            lines.push(line.chars().take(MAX_KEYWORD_CHARS).collect());
        } else if lines.last().map_or(true, |prev| !prev.is_empty()) {
            lines.push(String::new());
        }
    }

    lines.truncate(MAX_KEYWORD_LINES);
    lines.join("\n")
}

/// Non-empty keyword lines, in order.
pub fn keyword_list(keywords: &str) -> impl Iterator<Item = &str> {
    keywords.split('\n').filter(|line| !line.is_empty())
}

pub fn keyword_line_count(keywords: &str) -> usize {
    keyword_list(keywords).count()
}
