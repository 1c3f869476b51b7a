use api_client::MarketApi;
use api_client::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{
    AdminLogs, AdvisorReport, AdvisorSignals, FinancialRatio, JobAck, MarketSummary, ModelMetric,
    PricePoint, SymbolSelection, ValidationRow,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Canned backend. A `None` field answers with a 503.
#[derive(Default)]
pub struct StubApi {
    pub summary: Option<MarketSummary>,
    pub history: Option<Vec<PricePoint>>,
    pub financials: Option<Vec<FinancialRatio>>,
    pub symbols: Option<Vec<String>>,
    pub ack: Option<JobAck>,
    pub results: Option<Vec<ValidationRow>>,
    pub metrics: Option<Vec<ModelMetric>>,
    /// Served in order; the last entry repeats. `None` entries fail.
    pub logs: Mutex<VecDeque<Option<AdminLogs>>>,
    /// Delay before every history response.
    pub history_delay: Option<Duration>,
    pub consult_calls: AtomicUsize,
    pub log_calls: AtomicUsize,
}

fn unavailable() -> ApiError {
    ApiError::Status {
        status: 503,
        body: "stub unavailable".to_string(),
    }
}

fn answer<T: Clone>(value: &Option<T>) -> Result<T, ApiError> {
    value.clone().ok_or_else(unavailable)
}

pub fn logs(lines: &[&str]) -> AdminLogs {
    AdminLogs {
        logs: lines.iter().map(|line| line.to_string()).collect(),
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

impl StubApi {
    pub fn with_logs(sequence: Vec<Option<AdminLogs>>) -> Self {
        Self {
            logs: Mutex::new(sequence.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl MarketApi for StubApi {
    async fn market_summary(&self) -> Result<MarketSummary, ApiError> {
        answer(&self.summary)
    }

    async fn history(&self, _selection: &SymbolSelection) -> Result<Vec<PricePoint>, ApiError> {
        if let Some(delay) = self.history_delay {
            tokio::time::sleep(delay).await;
        }
        answer(&self.history)
    }

    async fn symbols(&self) -> Result<Vec<String>, ApiError> {
        answer(&self.symbols)
    }

    async fn financials(
        &self,
        _selection: &SymbolSelection,
    ) -> Result<Vec<FinancialRatio>, ApiError> {
        answer(&self.financials)
    }

    async fn consult(&self, symbol: &str) -> Result<AdvisorReport, ApiError> {
        self.consult_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AdvisorReport {
            symbol: symbol.to_string(),
            recommendation: "HOLD".to_string(),
            confidence: 0.5,
            signals: AdvisorSignals::default(),
            rationale: String::new(),
        })
    }

    async fn logs(&self) -> Result<AdminLogs, ApiError> {
        self.log_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.logs.lock().unwrap();
        let next = if queue.len() > 1 {
            queue.pop_front().flatten()
        } else {
            queue.front().cloned().flatten()
        };
        next.ok_or_else(unavailable)
    }

    async fn trigger_pipeline(&self) -> Result<JobAck, ApiError> {
        answer(&self.ack)
    }

    async fn retrain_model(&self) -> Result<JobAck, ApiError> {
        answer(&self.ack)
    }

    async fn training_results(&self) -> Result<Vec<ValidationRow>, ApiError> {
        answer(&self.results)
    }

    async fn training_metrics(&self) -> Result<Vec<ModelMetric>, ApiError> {
        answer(&self.metrics)
    }
}
