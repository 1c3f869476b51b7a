use crate::cancel::with_cancel;
use crate::error::ViewError;
use analytics::{TimeRange, filter_range, sort_chronological};
use api_client::MarketApi;
use chrono::NaiveDate;
use core_types::{FinancialRatio, PricePoint, Sourced, SymbolSelection};
use events::{ViewEvent, ViewState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const NO_PRICE_HISTORY: &str = "no price history";
pub const NO_FINANCIALS: &str = "no financial data";

/// Prices and quarterly ratios of one bank (or the industry) over a range.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerData {
    pub selection: SymbolSelection,
    pub range: TimeRange,
    /// Chronological and already restricted to `range`.
    pub prices: Vec<PricePoint>,
    pub financials: Vec<FinancialRatio>,
    /// Shown in place of the financials tab when there are none.
    pub financials_message: Option<String>,
}

pub struct ExplorerView {
    api: Arc<dyn MarketApi>,
    state: ViewState<ExplorerData>,
}

impl ExplorerView {
    pub fn new(api: Arc<dyn MarketApi>) -> Self {
        Self {
            api,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState<ExplorerData> {
        &self.state
    }

    /// Symbols offered by the selector.
    pub async fn symbols(&self, token: &CancellationToken) -> Result<Vec<String>, ViewError> {
        Ok(with_cancel(token, self.api.symbols()).await??)
    }

    /// Loads history and financials in parallel. There is no sample fallback here.
    pub async fn load(
        &mut self,
        selection: &SymbolSelection,
        range: TimeRange,
        today: NaiveDate,
        token: &CancellationToken,
    ) -> &ViewState<ExplorerData> {
        self.state.apply(ViewEvent::FetchStarted);

        let fetched = with_cancel(token, async {
            tokio::join!(self.api.history(selection), self.api.financials(selection))
        })
        .await;

        let event = match fetched {
            Err(_) => ViewEvent::Cancelled,
            Ok((Err(e), _)) | Ok((_, Err(e))) => {
                tracing::error!(symbol = %selection, error = %e, "Explorer fetch failed.");
                ViewEvent::FetchFailed(e.to_string())
            }
            Ok((Ok(history), Ok(_))) if history.is_empty() => {
                ViewEvent::FetchEmpty(NO_PRICE_HISTORY.to_string())
            }
            Ok((Ok(history), Ok(financials))) => {
                let prices = filter_range(&sort_chronological(history), range, today);
                tracing::debug!(symbol = %selection, %range, points = prices.len(), "Explorer loaded.");
                let financials_message = financials.is_empty().then(|| NO_FINANCIALS.to_string());
                ViewEvent::FetchSucceeded(Sourced::live(ExplorerData {
                    selection: selection.clone(),
                    range,
                    prices,
                    financials,
                    financials_message,
                }))
            }
        };
        self.state.apply(event);
        &self.state
    }
}
