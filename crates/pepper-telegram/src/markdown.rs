// SPDX-FileCopyrightText: 2026 Pepper Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 formatting for model output.
//!
//! Models write CommonMark-ish text: `**bold**`, `* ` bullets and `#`
//! headings. Those are mapped onto what Telegram supports, then every
//! special character outside code spans is escaped. Asterisks survive as
//! bold markers only while they pair up; a stray one is escaped with the
//! rest.

/// Characters that must be escaped in MarkdownV2 outside code.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    /// Inline code or a fenced block, delimiters included.
    Code(&'a str),
}

/// Splits `text` into prose and closed code spans. An unclosed backtick
/// stays in the prose and is escaped like any other character.
fn split_code(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('`') {
        let tail = &rest[start..];
        let fence = if tail.starts_with("```") {
            "```"
        } else if tail.starts_with("``") {
            segments.push(Segment::Text(&rest[..start + 2]));
            rest = &rest[start + 2..];
            continue;
        } else {
            "`"
        };

        match tail[fence.len()..].find(fence) {
            Some(end) => {
                let close = start + fence.len() + end + fence.len();
                if start > 0 {
                    segments.push(Segment::Text(&rest[..start]));
                }
                segments.push(Segment::Code(&rest[start..close]));
                rest = &rest[close..];
            }
            None => {
                segments.push(Segment::Text(&rest[..start + fence.len()]));
                rest = &rest[start + fence.len()..];
            }
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

/// Rewrites headings and bullets, then collapses `**` into `*`.
pub fn normalize_markdown(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let body = line.trim_start();
            let indent = &line[..line.len() - body.len()];
            let hashes = body.chars().take_while(|c| *c == '#').count();
            if hashes > 0
                && let Some(title) = body[hashes..].strip_prefix(' ')
            {
                return format!("{indent}**{}**", title.trim());
            }
            match body.strip_prefix("* ") {
                Some(item) => format!("{indent}• {item}"),
                None => line.to_string(),
            }
        })
        .collect();
    let mut joined = lines.join("\n");
    if text.ends_with('\n') {
        joined.push('\n');
    }
    joined.replace("**", "*")
}

/// Escapes prose for MarkdownV2, leaving code spans intact.
///
/// With `keep_bold`, asterisks in prose are left as formatting.
pub fn escape_markdown_v2(text: &str, keep_bold: bool) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    for segment in split_code(text) {
        match segment {
            Segment::Code(code) => result.push_str(&code.replace('\\', "\\\\")),
            Segment::Text(prose) => {
                for ch in prose.chars() {
                    if SPECIAL_CHARS.contains(&ch) && !(keep_bold && ch == '*') {
                        result.push('\\');
                    }
                    result.push(ch);
                }
            }
        }
    }
    result
}

/// Full pipeline applied to every preview and the final answer.
pub fn format_for_telegram(text: &str) -> String {
    let normalized = normalize_markdown(text);
    let stars: usize = split_code(&normalized)
        .iter()
        .map(|segment| match segment {
            Segment::Text(prose) => prose.matches('*').count(),
            Segment::Code(_) => 0,
        })
        .sum();
    escape_markdown_v2(&normalized, stars % 2 == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string() {
        assert_eq!(format_for_telegram(""), "");
    }

    #[test]
    fn escapes_punctuation() {
        assert_eq!(
            format_for_telegram("Готово! Жарьте 5-7 минут."),
            "Готово\\! Жарьте 5\\-7 минут\\."
        );
    }

    #[test]
    fn double_stars_become_bold() {
        assert_eq!(
            format_for_telegram("**Омлет** (на 2 порции)"),
            "*Омлет* \\(на 2 порции\\)"
        );
    }

    #[test]
    fn stray_star_is_escaped() {
        assert_eq!(format_for_telegram("2 * 3 = 6"), "2 \\* 3 \\= 6");
    }

    #[test]
    fn bullets_and_headings() {
        let input = "### Ингредиенты\n* яйца\n  * молоко\n";
        assert_eq!(
            format_for_telegram(input),
            "*Ингредиенты*\n• яйца\n  • молоко\n"
        );
    }

    #[test]
    fn hash_without_space_is_not_a_heading() {
        assert_eq!(format_for_telegram("#тег"), "\\#тег");
    }

    #[test]
    fn code_spans_are_untouched() {
        assert_eq!(
            format_for_telegram("Нагрейте до `180.5` градусов."),
            "Нагрейте до `180.5` градусов\\."
        );
        let fenced = "Шаги:\n```\n1. (взбить)\n```\nВсё.";
        assert_eq!(
            format_for_telegram(fenced),
            "Шаги:\n```\n1. (взбить)\n```\nВсё\\."
        );
    }

    #[test]
    fn backslashes_are_escaped_everywhere() {
        assert_eq!(escape_markdown_v2("a\\b `c\\d`", false), "a\\\\b `c\\\\d`");
    }

    #[test]
    fn unclosed_backtick_is_escaped() {
        assert_eq!(format_for_telegram("см. `рецепт"), "см\\. \\`рецепт");
        assert_eq!(escape_markdown_v2("``x``", false), "\\`\\`x\\`\\`");
    }

    #[test]
    fn stars_inside_code_do_not_count() {
        assert_eq!(format_for_telegram("*a* `*`"), "*a* `*`");
    }
}
