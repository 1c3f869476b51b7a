use crate::cancel::with_cancel;
use crate::error::ViewError;
use api_client::MarketApi;
use core_types::{AdvisorReport, CoreError, Sourced};
use events::{ViewEvent, ViewState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AdvisorView {
    api: Arc<dyn MarketApi>,
    state: ViewState<AdvisorReport>,
}

impl AdvisorView {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self {
            api,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState<AdvisorReport> {
        &self.state
    }

    /// Asks the advisor about `symbol`, upper-cased.
    ///
    /// A blank symbol is rejected without touching the backend or the state.
    pub async fn consult(
        &mut self,
        symbol: &str,
        token: &CancellationToken,
    ) -> Result<&ViewState<AdvisorReport>, ViewError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CoreError::InvalidInput(
                "symbol".to_string(),
                "enter a bank symbol to consult".to_string(),
            )
            .into());
        }

        self.state.apply(ViewEvent::FetchStarted);
        let event = match with_cancel(token, self.api.consult(&symbol)).await {
            Ok(Ok(report)) => {
                tracing::info!(%symbol, recommendation = %report.recommendation, "Advisor answered.");
                ViewEvent::FetchSucceeded(Sourced::live(report))
            }
            Ok(Err(e)) => {
                tracing::error!(%symbol, error = %e, "Advisor consultation failed.");
                ViewEvent::FetchFailed(e.to_string())
            }
            Err(_) => ViewEvent::Cancelled,
        };
        self.state.apply(event);
        Ok(&self.state)
    }
}
