//! Knowledge bank diagnostics: drive a fixed set of visitor questions
//! through a knowledge source and summarize pass/fail and timing.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

use crate::orchestrator::FallbackOrchestrator;

/// Anything that can answer a bare visitor question
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn generate_response(&self, query: &str) -> Result<String>;

    /// Name used in reports
    fn source_name(&self) -> &str;
}

#[async_trait]
impl KnowledgeSource for FallbackOrchestrator {
    async fn generate_response(&self, query: &str) -> Result<String> {
        let reply = FallbackOrchestrator::generate_response(self, query, None, &[], &[]).await?;
        Ok(reply)
    }

    fn source_name(&self) -> &str {
        "fallback-orchestrator"
    }
}

pub const DEFAULT_TEST_QUERIES: [&str; 10] = [
    "What is the school address?",
    "How can I contact the school?",
    "What subjects are taught?",
    "How do I apply for admission?",
    "What facilities does the school have?",
    "What are the school hours?",
    "Tell me about the school",
    "What programs are available?",
    "How old should students be?",
    "What extracurricular activities are there?",
];

pub const QUERY_TYPE_PROBES: [(&str, &str); 5] = [
    ("Contact", "How can I contact the school?"),
    ("Admission", "How do I apply for admission?"),
    ("Academic", "What subjects are taught?"),
    ("Facility", "What facilities does the school have?"),
    ("General", "Tell me about the school"),
];

/// Outcome of one test query
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub query: String,
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryTypeResult {
    pub query_type: String,
    pub query: String,
    pub success: bool,
    pub response_length: usize,
}

/// Aggregate view over a test run
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub passed: usize,
    pub total: usize,
    pub average_response_time_ms: u64,
    pub results: Vec<TestResult>,
    pub query_types: Vec<QueryTypeResult>,
}

impl TestReport {
    pub fn from_results(
        source: impl Into<String>,
        started_at: DateTime<Utc>,
        results: Vec<TestResult>,
        query_types: Vec<QueryTypeResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        let total = results.len();
        let average_response_time_ms = if total == 0 {
            0
        } else {
            results.iter().map(|r| r.response_time_ms).sum::<u64>() / total as u64
        };

        Self {
            source: source.into(),
            started_at,
            passed,
            total,
            average_response_time_ms,
            results,
            query_types,
        }
    }

    pub fn summary(&self) -> String {
        format!("{}/{} tests passed", self.passed, self.total)
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

pub struct KnowledgeBankTester {
    queries: Vec<String>,
}

impl Default for KnowledgeBankTester {
    fn default() -> Self {
        Self {
            queries: DEFAULT_TEST_QUERIES.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl KnowledgeBankTester {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queries(queries: Vec<String>) -> Self {
        Self { queries }
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Run every query in order against the source, timing each call
    pub async fn run_tests(&self, source: &dyn KnowledgeSource) -> Vec<TestResult> {
        info!(source = source.source_name(), count = self.queries.len(), "Starting knowledge bank tests");
        let mut results = Vec::with_capacity(self.queries.len());

        for query in &self.queries {
            let started = Instant::now();
            let outcome = source.generate_response(query).await;
            let response_time_ms = started.elapsed().as_millis() as u64;

            let result = match outcome {
                Ok(response) => {
                    info!(query = %query, response_time_ms, "Test passed");
                    TestResult {
                        query: query.clone(),
                        response,
                        success: true,
                        error: None,
                        response_time_ms,
                    }
                }
                Err(e) => {
                    warn!(query = %query, error = %e, "Test failed");
                    TestResult {
                        query: query.clone(),
                        response: String::new(),
                        success: false,
                        error: Some(e.to_string()),
                        response_time_ms,
                    }
                }
            };
            results.push(result);
        }

        results
    }

    /// One probe per query category
    pub async fn test_query_types(&self, source: &dyn KnowledgeSource) -> Vec<QueryTypeResult> {
        let mut results = Vec::with_capacity(QUERY_TYPE_PROBES.len());

        for (query_type, query) in QUERY_TYPE_PROBES {
            let result = match source.generate_response(query).await {
                Ok(response) => QueryTypeResult {
                    query_type: query_type.to_string(),
                    query: query.to_string(),
                    success: true,
                    response_length: response.chars().count(),
                },
                Err(e) => {
                    warn!(query_type, error = %e, "Query type test failed");
                    QueryTypeResult {
                        query_type: query_type.to_string(),
                        query: query.to_string(),
                        success: false,
                        response_length: 0,
                    }
                }
            };
            results.push(result);
        }

        results
    }

    /// Full suite: the fixed queries, then the query type probes
    pub async fn run_all_tests(&self, source: &dyn KnowledgeSource) -> TestReport {
        let started_at = Utc::now();
        let results = self.run_tests(source).await;
        let query_types = self.test_query_types(source).await;
        let report = TestReport::from_results(source.source_name(), started_at, results, query_types);
        info!(source = %report.source, summary = %report.summary(), "Knowledge bank test suite complete");
        report
    }
}
