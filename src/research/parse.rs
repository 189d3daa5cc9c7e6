use super::prompt::strip_label;

const BULLET_MARKERS: [&str; 3] = ["- ", "* ", "• "];
const SECTION_HEADERS: [&str; 4] = ["summary", "insights", "key insights", "key findings"];

#[derive(Debug, Default, PartialEq)]
pub struct ParsedSynthesis {
    pub summary: String,
    pub insights: Vec<String>,
    pub depth_gained: Option<String>,
}

fn bullet_text(line: &str) -> Option<&str> {
    BULLET_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .or_else(|| {
            // a marker alone on the line, e.g. "-"
            matches!(line, "-" | "*" | "•").then_some("")
        })
}

/// Drops Markdown heading and emphasis marks, as in `**SUMMARY:**` or `## Insights`.
fn trim_markup(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, '#' | '*' | '_')).trim()
}

fn is_section_header(line: &str) -> bool {
    let name = line.trim_matches(|c: char| matches!(c, '#' | '*' | '_' | ':') || c.is_whitespace());
    SECTION_HEADERS.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Splits free-form model output into summary, insights and an optional
/// "DEPTH GAINED:" note. Never fails: output without bullets becomes the summary.
pub fn parse_synthesis(text: &str) -> ParsedSynthesis {
    let mut summary_lines = Vec::new();
    let mut insights = Vec::new();
    let mut depth_gained = None;
    let mut in_bullets = false;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(item) = bullet_text(line) {
            in_bullets = true;
            let item = item.trim();
            if !item.is_empty() {
                insights.push(item.to_string());
            }
            continue;
        }
        let plain = trim_markup(line);
        if let Some(rest) = strip_label(plain, "depth gained:") {
            depth_gained = Some(trim_markup(rest).to_string()).filter(|s| !s.is_empty());
            continue;
        }
        if in_bullets || is_section_header(line) {
            continue;
        }
        let line = strip_label(plain, "summary:").map_or(line, trim_markup);
        if !line.is_empty() {
            summary_lines.push(line);
        }
    }

    ParsedSynthesis {
        summary: summary_lines.join("\n"),
        insights,
        depth_gained,
    }
}
