use anyhow::Result;
use client::{QueryRequest, SectionApi, SectionPointer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::test_set::{section_match, GoldQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResults {
    pub top_n: u32,
    pub recall_at_n: f64,
    pub mrr: f64,
    pub n_queries: usize,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub details: Vec<QueryDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDetail {
    pub query: String,
    pub query_used: String,
    pub found_rank: Option<usize>,
    pub top_section: Option<String>,
    pub latency_ms: f64,
}

/// Scores the remote ranker against a set of gold queries.
pub struct Evaluator<A> {
    api: A,
}

impl<A: SectionApi> Evaluator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub async fn run(&self, test_set: &[GoldQuery], top_n: u32) -> Result<EvalResults> {
        info!(queries = test_set.len(), top_n, "running evaluation");

        let mut latencies = Vec::with_capacity(test_set.len());
        let mut details = Vec::with_capacity(test_set.len());

        for gold in test_set {
            let request = QueryRequest {
                query: gold.query.clone(),
                top_n: Some(top_n),
                use_query_expansion: Some(true),
                ..Default::default()
            };

            let start = Instant::now();
            let response = self.api.submit_query(&request).await?;
            let latency = start.elapsed().as_secs_f64() * 1000.0;
            latencies.push(latency);

            let found_rank = find_rank(&response.results, gold, top_n as usize);
            debug!(query = %gold.query, ?found_rank, latency_ms = latency, "query scored");

            details.push(QueryDetail {
                query: gold.query.clone(),
                query_used: response.query_used,
                found_rank,
                top_section: response.results.first().map(|r| r.section_path.clone()),
                latency_ms: latency,
            });
        }

        Ok(compute_results(top_n, latencies, details))
    }
}

/// First 1-based rank within `top_n` that hits the gold chunk ids or section.
pub fn find_rank(results: &[SectionPointer], gold: &GoldQuery, top_n: usize) -> Option<usize> {
    let chunk_ids: HashSet<&str> = gold.correct_chunk_ids.iter().map(String::as_str).collect();

    results.iter().take(top_n).position(|r| {
        chunk_ids.contains(r.chunk_id.as_str())
            || (!gold.correct_section_path.is_empty()
                && section_match(&r.section_path, &gold.correct_section_path))
    })
    .map(|i| i + 1)
}

fn compute_results(top_n: u32, mut latencies: Vec<f64>, details: Vec<QueryDetail>) -> EvalResults {
    let n = details.len();
    let hits = details.iter().filter(|d| d.found_rank.is_some()).count();
    let reciprocal_sum: f64 = details
        .iter()
        .filter_map(|d| d.found_rank)
        .map(|rank| 1.0 / rank as f64)
        .sum();

    latencies.sort_by(|a, b| a.total_cmp(b));
    let avg_latency = if latencies.is_empty() {
        0.0
    } else {
        latencies.iter().sum::<f64>() / latencies.len() as f64
    };

    EvalResults {
        top_n,
        recall_at_n: ratio(hits as f64, n),
        mrr: ratio(reciprocal_sum, n),
        n_queries: n,
        avg_latency_ms: avg_latency,
        p50_latency_ms: percentile(&latencies, 50),
        p95_latency_ms: percentile(&latencies, 95),
        details,
    }
}

fn ratio(value: f64, n: usize) -> f64 {
    if n == 0 { 0.0 } else { value / n as f64 }
}

fn percentile(sorted_data: &[f64], p: usize) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let index = (p as f64 / 100.0 * sorted_data.len() as f64) as usize;
    sorted_data[index.min(sorted_data.len() - 1)]
}
