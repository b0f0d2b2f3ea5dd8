//! KQL query formatting
//!
//! Puts every pipe stage of a Resource Graph query on its own line.

/// Format a KQL query, one `| stage` per line.
///
/// Whitespace around each `|` collapses to a line break, every line that
/// started with whitespace is indented by exactly two spaces, and trailing
/// whitespace is dropped. Formatting is idempotent.
pub fn format_query(query: &str) -> String {
    let staged = break_on_pipes(query);

    staged
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.len() == line.len() {
                line.trim_end().to_string()
            } else {
                format!("  {}", trimmed).trim_end().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn break_on_pipes(query: &str) -> String {
    let mut out = String::with_capacity(query.len() + 16);
    let mut chars = query.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '|' {
            out.push(c);
            continue;
        }

        let kept = out.trim_end().len();
        out.truncate(kept);
        out.push_str("\n| ");
        while chars.next_if(|next| next.is_whitespace()).is_some() {}
    }

    out
}
