//! Human-readable summaries printed at the end of each script.
//!
//! Counts are advisory: a mismatch is printed, never turned into an error.

use classifieds_search_repository::{ConsolidateReport, IndexInfo, ReindexSummary, SyncReport};

use crate::commands::check::CheckReport;

fn index_lines(title: &str, indices: &[IndexInfo]) -> Vec<String> {
    let mut lines = vec![format!("{}:", title)];
    if indices.is_empty() {
        lines.push("  (none)".to_string());
    }
    lines.extend(
        indices
            .iter()
            .map(|info| format!("  {}: {} documents", info.name, info.docs_count)),
    );
    lines
}

fn comparison(indexed: u64, source: u64) -> String {
    if indexed == source {
        format!("OK: index holds {} documents for {} posts", indexed, source)
    } else {
        format!(
            "MISMATCH: index holds {} documents for {} posts (difference {})",
            indexed,
            source,
            indexed.abs_diff(source)
        )
    }
}

pub fn reindex(source_count: usize, summary: &ReindexSummary, stats: &[IndexInfo]) -> String {
    let mut lines = vec![
        "Full reindex finished".to_string(),
        format!("  posts in database: {}", source_count),
        format!("  indexed: {}", summary.count),
        format!("  errors: {}", summary.errors),
    ];
    lines.extend(index_lines("Final counts", stats));
    lines.join("\n")
}

pub fn sync(report: &SyncReport) -> String {
    let rebuild = &report.rebuild;
    [
        "Sync finished".to_string(),
        format!("  documents before: {}", rebuild.existing_count),
        format!("  cleared: {}", rebuild.cleared),
        format!("  posts in database: {}", rebuild.source_count),
        format!("  indexed: {}", rebuild.indexed),
        format!("  errors: {}", rebuild.errors),
        comparison(report.final_count, rebuild.source_count as u64),
    ]
    .join("\n")
}

pub fn consolidate(report: &ConsolidateReport) -> String {
    let mut lines = vec!["Consolidate finished".to_string()];

    if report.merged.is_empty() {
        lines.push("  no stray indices".to_string());
    }
    for merged in &report.merged {
        lines.push(format!(
            "  merged {}: {} copied, {} errors, deleted",
            merged.name, merged.copied, merged.errors
        ));
    }

    let rebuild = &report.rebuild;
    lines.push(format!(
        "  rebuilt from {} posts: {} indexed, {} errors",
        rebuild.source_count, rebuild.indexed, rebuild.errors
    ));
    lines.extend(index_lines("Final counts", &report.final_counts));
    lines.join("\n")
}

pub fn check(report: &CheckReport) -> String {
    let mut lines = vec![format!("Search engine reachable at {}", report.elasticsearch_url)];
    lines.extend(index_lines("Canonical indices", &report.canonical));
    lines.extend(index_lines("Indices matching pattern", &report.matching));
    lines.push(format!("Posts in database: {}", report.source_count));
    lines.push(comparison(report.indexed_count(), report.source_count));

    if let Some(post) = &report.post {
        lines.push(format!("Post {}:", post.post_id));
        lines.push(match &post.source {
            Some(source) => format!(
                "  database: found (status {}, title {:?})",
                source.status.unwrap_or_default(),
                source.title
            ),
            None => "  database: not found".to_string(),
        });
        lines.push(match &post.indexed {
            Some(document) => format!(
                "  index: found (status {}, title {:?})",
                document.status, document.title
            ),
            None => "  index: not found".to_string(),
        });
        match post.fields_match() {
            Some(true) => lines.push("  indexed fields match the database".to_string()),
            Some(false) => lines.push("  indexed fields differ from the database".to_string()),
            None => {}
        }
    }

    lines.join("\n")
}
