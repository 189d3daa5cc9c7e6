use crate::research::{Mode, ResearchResult};

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Newlines would end the heading early.
fn sanitize_heading(s: &str) -> String {
    s.replace(['\n', '\r'], " ")
}

pub fn format_result(result: &ResearchResult) -> String {
    let mut output = format!("# Research: {}\n\n", sanitize_heading(&result.original_query));

    let mode = match result.mode {
        Mode::Basic => "basic",
        Mode::Deep => "deep (two rounds)",
    };
    output.push_str(&format!("Mode: {mode}\n"));
    if let Some(follow_up) = &result.follow_up_query {
        output.push_str(&format!("Follow-up: {}\n", sanitize_heading(follow_up)));
    }
    output.push_str(&format!("Sources analyzed: {}\n\n", result.source_count));

    output.push_str(&result.summary);
    output.push_str("\n\n");

    if !result.insights.is_empty() {
        output.push_str("## Key Insights\n\n");
        for insight in &result.insights {
            output.push_str(&format!("- {insight}\n"));
        }
        output.push('\n');
    }

    if let Some(depth) = &result.depth_gained {
        output.push_str(&format!("## Depth Gained\n\n{depth}\n\n"));
    }

    if !result.sources.is_empty() {
        output.push_str("## Sources\n\n");
        for source in &result.sources {
            output.push_str(&format!(
                "- [{}]({})\n",
                escape_md_link(&source.title),
                source.url
            ));
        }
    }

    output
}
