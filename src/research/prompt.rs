use super::types::{Round, SearchResult};

pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are a careful research analyst. \
Answer only from the numbered sources you are given and do not invent facts.

Format your response exactly like this:
SUMMARY: <a 2-3 sentence summary answering the query>

INSIGHTS:
- <insight 1>
- <insight 2>
- <insight 3>";

pub const FINAL_SYSTEM_PROMPT: &str = "You are a careful research analyst producing a \
comprehensive final synthesis from two rounds of research. Answer only from the numbered \
sources you are given and do not invent facts.

Format your response exactly like this:
SUMMARY: <3-4 sentences covering key findings from both research rounds>

INSIGHTS:
- <insight 1>
- <insight 2>
- <insight 3>
- <insight 4>

DEPTH GAINED: <1 sentence on how the follow-up search enhanced understanding>";

pub const FOLLOW_UP_SYSTEM_PROMPT: &str = "You write web search queries. \
Reply with a single concise search query and nothing else: no explanation, no quotes, no numbering.";

const SOURCE_DELIMITER: &str = "---";
const FOLLOW_UP_LABELS: [&str; 3] = ["search query:", "follow-up query:", "query:"];

fn write_sources(out: &mut String, sources: &[SearchResult], label_rounds: bool) {
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!("[{}] {}", i + 1, source.title));
        if label_rounds {
            out.push_str(match source.round {
                Round::First => " (round 1)",
                Round::FollowUp => " (follow-up)",
            });
        }
        out.push_str(&format!("\nURL: {}\n", source.url));
        out.push_str(source.content.trim());
        out.push_str(&format!("\n{SOURCE_DELIMITER}\n"));
    }
}

pub fn synthesis_prompt(query: &str, sources: &[SearchResult]) -> String {
    let mut out = format!("Research query: {query}\n\nSources:\n{SOURCE_DELIMITER}\n");
    write_sources(&mut out, sources, false);
    out.push_str("\nBased on these sources, provide a summary and three key insights.");
    out
}

pub fn follow_up_prompt(query: &str, summary: &str, insights: &[String]) -> String {
    let mut out = format!("Original research query: {query}\n\nFindings so far:\n{summary}\n");
    if !insights.is_empty() {
        out.push('\n');
        for insight in insights {
            out.push_str(&format!("- {insight}\n"));
        }
    }
    out.push_str(
        "\nWhat single follow-up search query would fill the most significant gap in these \
findings and deepen our understanding of the original query?",
    );
    out
}

pub fn final_prompt(
    query: &str,
    follow_up_query: &str,
    first_summary: &str,
    sources: &[SearchResult],
) -> String {
    let mut out = format!(
        "Research query: {query}\nFollow-up query: {follow_up_query}\n\n\
Round 1 summary (context only, do not repeat verbatim):\n{first_summary}\n\n\
All sources:\n{SOURCE_DELIMITER}\n"
    );
    write_sources(&mut out, sources, true);
    out.push_str("\nProvide a comprehensive final analysis drawing on both research rounds.");
    out
}

/// Normalizes a model-written search query: first non-empty line, trimmed,
/// surrounding quotes and a leading "Query:" or "Search query:" label removed.
pub fn clean_follow_up_query(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = FOLLOW_UP_LABELS
        .iter()
        .find_map(|label| strip_label(line, label))
        .unwrap_or(line);
    let cleaned = line
        .trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '“' | '”'))
        .trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Case-insensitive prefix strip for ASCII labels like `SUMMARY:`.
pub(crate) fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label)
        .then(|| line[label.len()..].trim_start())
}
