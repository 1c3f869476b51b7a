use crate::cancel::with_cancel;
use crate::error::ViewError;
use crate::poller::{LogPoller, PollHandle};
use analytics::{ValidationPoint, validation_models, validation_series, validation_symbols};
use api_client::MarketApi;
use api_client::error::ApiError;
use configuration::PollingSettings;
use core_types::{AdminLogs, JobAck, ModelMetric, Sourced, SymbolSelection, ValidationRow};
use events::{JobStatus, ViewEvent, ViewState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Model shown when none is requested.
pub const DEFAULT_MODEL: &str = "return";
pub const NO_TRAINING_RESULTS: &str = "no training results";

/// True vs predicted series of one model, plus what the selectors can offer.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub model: String,
    pub selection: SymbolSelection,
    pub points: Vec<ValidationPoint>,
    pub symbols: Vec<String>,
    pub models: Vec<String>,
    pub metric: Option<ModelMetric>,
}

pub struct AdminView {
    api: Arc<dyn MarketApi>,
    polling: PollingSettings,
    job: JobStatus,
    validation: ViewState<ValidationReport>,
}

impl AdminView {
    pub fn new(api: Arc<dyn MarketApi>, polling: PollingSettings) -> Self {
        Self {
            api,
            polling,
            job: JobStatus::Idle,
            validation: ViewState::Idle,
        }
    }

    pub fn job(&self) -> &JobStatus {
        &self.job
    }

    pub fn validation(&self) -> &ViewState<ValidationReport> {
        &self.validation
    }

    pub async fn logs(&self, token: &CancellationToken) -> Result<AdminLogs, ViewError> {
        Ok(with_cancel(token, self.api.logs()).await??)
    }

    pub async fn trigger_pipeline(&mut self, token: &CancellationToken) -> Result<JobAck, ViewError> {
        let ack = with_cancel(token, self.api.trigger_pipeline()).await?;
        self.start_job("pipeline", ack)
    }

    pub async fn retrain_model(&mut self, token: &CancellationToken) -> Result<JobAck, ViewError> {
        let ack = with_cancel(token, self.api.retrain_model()).await?;
        self.start_job("retrain", ack)
    }

    fn start_job(&mut self, job: &str, ack: Result<JobAck, ApiError>) -> Result<JobAck, ViewError> {
        let ack = match ack {
            Ok(ack) => ack,
            Err(e) => {
                tracing::error!(job, error = %e, "Failed to start backend job.");
                self.job = JobStatus::Failed(e.to_string());
                return Err(e.into());
            }
        };
        if ack.is_rejected() {
            let reason = ack
                .message
                .clone()
                .unwrap_or_else(|| "no reason given".to_string());
            tracing::error!(job, %reason, "Backend rejected the job.");
            self.job = JobStatus::Failed(reason.clone());
            return Err(ViewError::Rejected(reason));
        }

        tracing::info!(job, status = %ack.status, pid = ?ack.pid, "Backend job started.");
        self.job = JobStatus::running_now();
        Ok(ack)
    }

    /// Starts following the log of the active job. `None` when no job is running.
    pub fn follow(&self, token: &CancellationToken) -> Option<PollHandle> {
        if !self.job.is_active() {
            return None;
        }
        Some(LogPoller::new(self.api.clone(), &self.polling).spawn(token))
    }

    /// Records how following the job ended.
    pub fn finish(&mut self, status: JobStatus) {
        self.job = status;
    }

    /// Loads training results and metrics in parallel and selects one series.
    ///
    /// Without an explicit selection, the first symbol of the results is shown.
    pub async fn load_validation(
        &mut self,
        model: &str,
        selection: Option<SymbolSelection>,
        token: &CancellationToken,
    ) -> &ViewState<ValidationReport> {
        self.validation.apply(ViewEvent::FetchStarted);

        let fetched = with_cancel(token, async {
            tokio::join!(self.api.training_results(), self.api.training_metrics())
        })
        .await;

        let event = match fetched {
            Err(_) => ViewEvent::Cancelled,
            Ok((Err(e), _)) => {
                tracing::error!(error = %e, "Failed to load training results.");
                ViewEvent::FetchFailed(e.to_string())
            }
            Ok((Ok(rows), _)) if rows.is_empty() => {
                ViewEvent::FetchEmpty(NO_TRAINING_RESULTS.to_string())
            }
            Ok((Ok(rows), metrics)) => {
                // The metrics panel degrades on its own.
                let metrics = metrics.unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Failed to load training metrics.");
                    Vec::new()
                });
                let report = build_report(&rows, &metrics, model, selection);
                ViewEvent::FetchSucceeded(Sourced::live(report))
            }
        };
        self.validation.apply(event);
        &self.validation
    }

    pub async fn metrics(&self, token: &CancellationToken) -> Result<Vec<ModelMetric>, ViewError> {
        Ok(with_cancel(token, self.api.training_metrics()).await??)
    }
}

fn build_report(
    rows: &[ValidationRow],
    metrics: &[ModelMetric],
    model: &str,
    selection: Option<SymbolSelection>,
) -> ValidationReport {
    let selection = selection.unwrap_or_else(|| match rows.first() {
        Some(row) => SymbolSelection::Symbol(row.symbol.clone()),
        None => SymbolSelection::All,
    });
    ValidationReport {
        model: model.to_string(),
        points: validation_series(rows, model, &selection),
        selection,
        symbols: validation_symbols(rows),
        models: validation_models(rows),
        metric: metrics_for(metrics, model).cloned(),
    }
}

/// The metrics entry of `model`, if the last run produced one.
pub fn metrics_for<'a>(metrics: &'a [ModelMetric], model: &str) -> Option<&'a ModelMetric> {
    metrics.iter().find(|metric| metric.model == model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubApi, day, logs};

    fn row(symbol: &str, model: &str, d: u32, pred: f64) -> ValidationRow {
        ValidationRow {
            symbol: symbol.to_string(),
            model: model.to_string(),
            date: day(d),
            actual: 0.0,
            predicted: pred,
        }
    }

    fn metric(model: &str, rmse: f64) -> ModelMetric {
        ModelMetric {
            model: model.to_string(),
            rmse: Some(rmse),
            accuracy: None,
        }
    }

    #[tokio::test]
    async fn rejected_ack_leaves_no_active_job() {
        let api = StubApi {
            ack: Some(JobAck {
                status: "Error".into(),
                pid: None,
                message: Some("python not found".into()),
            }),
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let token = CancellationToken::new();

        let err = view.retrain_model(&token).await.unwrap_err();
        assert!(matches!(err, ViewError::Rejected(ref reason) if reason == "python not found"));
        assert!(!view.job().is_active());
        assert!(view.follow(&token).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_job_can_be_followed_to_completion() {
        let mut api = StubApi::with_logs(vec![Some(logs(&["Training Complete"]))]);
        api.ack = Some(JobAck {
            status: "Retraining triggered".into(),
            pid: Some(99),
            message: None,
        });
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let token = CancellationToken::new();

        let ack = view.retrain_model(&token).await.unwrap();
        assert_eq!(ack.pid, Some(99));
        assert!(view.job().is_active());

        let handle = view.follow(&token).unwrap();
        let status = handle.join().await;
        view.finish(status);
        assert_eq!(view.job(), &JobStatus::Completed);
    }

    #[tokio::test]
    async fn validation_defaults_to_the_first_symbol() {
        let api = StubApi {
            results: Some(vec![
                row("VCB", "return", 2, 0.2),
                row("TCB", "return", 1, 0.4),
                row("VCB", "return", 1, 0.1),
            ]),
            metrics: Some(vec![metric("direction", 0.5), metric("return", 0.02)]),
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let state = view
            .load_validation(DEFAULT_MODEL, None, &CancellationToken::new())
            .await;

        let report = &state.snapshot().unwrap().data;
        assert_eq!(report.selection, SymbolSelection::Symbol("VCB".into()));
        let preds: Vec<f64> = report.points.iter().map(|p| p.predicted).collect();
        assert_eq!(preds, vec![0.1, 0.2]);
        assert_eq!(report.symbols, vec!["ALL", "VCB", "TCB"]);
        assert_eq!(report.metric.as_ref().and_then(|m| m.rmse), Some(0.02));
    }

    #[tokio::test]
    async fn all_selection_averages_per_date() {
        let api = StubApi {
            results: Some(vec![row("VCB", "return", 1, 1.0), row("TCB", "return", 1, 3.0)]),
            metrics: Some(Vec::new()),
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let state = view
            .load_validation("return", Some(SymbolSelection::All), &CancellationToken::new())
            .await;

        let report = &state.snapshot().unwrap().data;
        assert_eq!(report.points.len(), 1);
        assert_eq!(report.points[0].predicted, 2.0);
        assert_eq!(report.metric, None);
    }

    #[tokio::test]
    async fn results_survive_a_metrics_outage() {
        let api = StubApi {
            results: Some(vec![row("VCB", "return", 1, 0.3)]),
            metrics: None,
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let state = view
            .load_validation("return", None, &CancellationToken::new())
            .await;

        let report = &state.snapshot().unwrap().data;
        assert_eq!(report.points.len(), 1);
        assert_eq!(report.points[0].predicted, 0.3);
        assert_eq!(report.metric, None);
    }

    #[tokio::test]
    async fn results_outage_fails_the_view() {
        let api = StubApi {
            results: None,
            metrics: Some(vec![metric("return", 0.02)]),
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let state = view
            .load_validation("return", None, &CancellationToken::new())
            .await;
        assert!(matches!(state, ViewState::Failed(reason) if reason.contains("503")));
    }

    #[tokio::test]
    async fn no_results_is_an_empty_state() {
        let api = StubApi {
            results: Some(Vec::new()),
            metrics: Some(Vec::new()),
            ..StubApi::default()
        };
        let mut view = AdminView::new(Arc::new(api), PollingSettings::default());
        let state = view
            .load_validation("return", None, &CancellationToken::new())
            .await;
        assert_eq!(state, &ViewState::Empty(NO_TRAINING_RESULTS.to_string()));
    }
}
