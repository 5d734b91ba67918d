use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn code_fence_regex() -> &'static Regex {
    static CODE_FENCE: OnceLock<Regex> = OnceLock::new();
    CODE_FENCE.get_or_init(|| Regex::new(r"(?s)```[\s\S]*?```").expect("code fence pattern is valid"))
}

/// Reduces input to the plain text the user typed: tags are dropped (`script` and
/// `style` together with their content) and entities are decoded. The result is
/// stored as-is; escaping belongs to whoever renders it.
pub fn strip_all_html(input: &str) -> String {
    let cleaned = ammonia::Builder::new()
        .tags(HashSet::new())
        .clean(input)
        .to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}

/// Chapter text: fenced code blocks (```) are kept byte for byte, everything between
/// them goes through `strip_all_html`.
pub fn sanitize_rich_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut last = 0;

    for fence in code_fence_regex().find_iter(input) {
        output.push_str(&strip_all_html(&input[last..fence.start()]));
        output.push_str(fence.as_str());
        last = fence.end();
    }
    output.push_str(&strip_all_html(&input[last..]));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_from_titles() {
        assert_eq!(strip_all_html("<b>Intro</b> to <script>alert(1)</script>Rust"), "Intro to Rust");
    }

    #[test]
    fn plain_text_keeps_ampersands_and_angle_brackets() {
        assert_eq!(strip_all_html("Rust & Go <3"), "Rust & Go <3");
        assert_eq!(strip_all_html("a &lt; b"), "a < b");
    }

    #[test]
    fn rich_text_keeps_code_fences_verbatim() {
        let input = "Use <em>this</em>:\n```\nlet v: Vec<u8> = vec![];\n```";
        assert_eq!(sanitize_rich_text(input), "Use this:\n```\nlet v: Vec<u8> = vec![];\n```");
    }

    #[test]
    fn rich_text_keeps_comparisons_outside_fences() {
        assert_eq!(sanitize_rich_text("if a < b && c"), "if a < b && c");
    }
}
