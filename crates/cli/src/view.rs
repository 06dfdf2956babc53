//! Plain-text rendering of session state. Everything here is a pure function
//! of the data it is given.

use client::{Chunk, ChunkContext, Confidence, Paper, QueryResponse, SectionPointer};
use session::{ContextState, Lifecycle};
use std::fmt::Write;

pub const NO_RESULTS: &str = "No results found.";
pub const ALL_PAPERS: &str = "All papers";

pub fn confidence_badge(confidence: Confidence) -> String {
    format!("[{}]", confidence.as_str().to_uppercase())
}

/// Entries for the paper filter: `(paper_id, label)`, with the empty id
/// meaning all papers. Only "All papers" is offered if the directory failed.
pub fn filter_options(papers: &[Paper], directory_error: Option<&str>) -> Vec<(String, String)> {
    let mut options = vec![(String::new(), ALL_PAPERS.to_string())];
    if directory_error.is_none() {
        options.extend(
            papers
                .iter()
                .map(|p| (p.paper_id.clone(), format!("{} ({} chunks)", p.title, p.chunk_count))),
        );
    }
    options
}

pub fn render_filter_options(options: &[(String, String)]) -> String {
    let mut out = String::new();
    for (id, label) in options {
        let id = if id.is_empty() { "all" } else { id.as_str() };
        let _ = writeln!(out, "  {:<16} {}", id, label);
    }
    out
}

pub fn render_paper(paper: &Paper) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", paper.title);
    let _ = writeln!(out, "  id: {}", paper.paper_id);
    if let Some(pmid) = &paper.pmid {
        let _ = writeln!(out, "  PMID: {}", pmid);
    }
    if let Some(doi) = &paper.doi {
        let _ = writeln!(out, "  DOI: {}", doi);
    }
    if let Some(url) = &paper.source_url {
        let _ = writeln!(out, "  source: {}", url);
    }
    let _ = writeln!(out, "  chunks: {}", paper.chunk_count);
    out
}

/// One line per chunk: id, section path and page range.
pub fn render_outline(chunks: &[Chunk]) -> String {
    let mut out = String::new();
    for chunk in chunks {
        let _ = writeln!(
            out,
            "  {:<24} {} · p.{}",
            chunk.chunk_id,
            section_label(&chunk.section_path),
            chunk.page_range()
        );
    }
    out
}

pub fn render_result(rank: usize, result: &SectionPointer) -> String {
    let section = if result.section_path.is_empty() {
        "(no section)"
    } else {
        result.section_path.as_str()
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "#{} {} {}  p.{}",
        rank,
        confidence_badge(result.confidence),
        section,
        result.page_range()
    );
    match &result.pmid {
        Some(pmid) => {
            let _ = writeln!(out, "   {}  PMID: {}", result.paper_title, pmid);
        }
        None => {
            let _ = writeln!(out, "   {}", result.paper_title);
        }
    }
    for snippet in &result.snippets {
        let _ = writeln!(out, "   • {}", snippet);
    }
    let _ = writeln!(out, "   chunk: {}", result.chunk_id);
    out
}

pub fn render_results(response: &QueryResponse) -> String {
    if response.is_empty() {
        return format!("{}\n", NO_RESULTS);
    }

    let count = response.results.len();
    let mut out = format!(
        "{} result{} for: {}\n\n",
        count,
        if count == 1 { "" } else { "s" },
        response.query_used
    );
    for (rank, result) in response.ranked() {
        out.push_str(&render_result(rank, result));
        out.push('\n');
    }
    out
}

pub fn render_query_state(state: &Lifecycle<QueryResponse>) -> String {
    match state {
        Lifecycle::Idle => String::new(),
        Lifecycle::Loading => "Searching…\n".to_string(),
        Lifecycle::Success(response) => render_results(response),
        Lifecycle::Failure(message) => format!("error: {}\n", message),
    }
}

fn section_label(path: &[String]) -> String {
    if path.is_empty() {
        "(no section)".to_string()
    } else {
        path.join(" › ")
    }
}

fn render_chunk(out: &mut String, chunk: &Chunk, highlight: bool) {
    let marker = if highlight { ">>" } else { "  " };
    let _ = writeln!(
        out,
        "{} {} · p.{}",
        marker,
        section_label(&chunk.section_path),
        chunk.page_start
    );
    for line in chunk.text.lines() {
        let _ = writeln!(out, "{} {}", marker, line);
    }
    out.push('\n');
}

/// Previous, current and next passages; the current one is marked `>>`.
pub fn render_context(context: &ChunkContext) -> String {
    let mut out = String::from("Section Context\n\n");
    if let Some(prev) = &context.prev {
        render_chunk(&mut out, prev, false);
    }
    render_chunk(&mut out, &context.current, true);
    if let Some(next) = &context.next {
        render_chunk(&mut out, next, false);
    }
    out
}

pub fn render_context_state(state: &ContextState) -> String {
    match &state.context {
        Lifecycle::Idle => String::new(),
        Lifecycle::Loading => "Loading...\n".to_string(),
        Lifecycle::Success(context) => render_context(context),
        Lifecycle::Failure(message) => format!("error: {}\n", message),
    }
}
