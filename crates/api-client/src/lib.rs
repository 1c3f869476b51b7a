use crate::error::ApiError;
use crate::responses::{Envelope, RawFinancialRow, RawPriceRow, RawValidationRow};
use async_trait::async_trait;
use configuration::ApiSettings;
use core_types::{
    AdminLogs, AdvisorReport, FinancialRatio, JobAck, MarketSummary, ModelMetric, PricePoint,
    SymbolSelection, ValidationRow,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod error;
pub mod fallback;
pub mod responses;

/// The abstract interface of the market backend.
/// Views depend on this trait only, so tests can swap in a stub.
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Latest trading day: total volume, top gainers and top losers.
    async fn market_summary(&self) -> Result<MarketSummary, ApiError>;

    /// Daily prices of one bank, or the industry aggregate for `ALL`.
    /// Rows with an unparseable date are dropped.
    async fn history(&self, selection: &SymbolSelection) -> Result<Vec<PricePoint>, ApiError>;

    async fn symbols(&self) -> Result<Vec<String>, ApiError>;

    /// Quarterly ratios of one bank, or industry averages for `ALL`.
    async fn financials(&self, selection: &SymbolSelection)
    -> Result<Vec<FinancialRatio>, ApiError>;

    async fn consult(&self, symbol: &str) -> Result<AdvisorReport, ApiError>;

    async fn logs(&self) -> Result<AdminLogs, ApiError>;

    async fn trigger_pipeline(&self) -> Result<JobAck, ApiError>;

    async fn retrain_model(&self) -> Result<JobAck, ApiError>;

    /// True vs predicted samples of the last training run.
    /// Empty unless the backend reports `Success`.
    async fn training_results(&self) -> Result<Vec<ValidationRow>, ApiError>;

    /// Empty unless the backend reports `Success`.
    async fn training_metrics(&self) -> Result<Vec<ModelMetric>, ApiError>;
}

/// A concrete implementation of `MarketApi` over HTTP.
#[derive(Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn _get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn _post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| {
                ApiError::Deserialization(format!("{}. Original text: {}", e, text))
            })
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }

    async fn _get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let envelope: Envelope<Vec<T>> = self._get(path).await?;
        let status = envelope.status.clone();
        let message = envelope.message.clone();
        match envelope.into_success() {
            Some(data) => Ok(data),
            None => {
                tracing::info!(path, %status, message = ?message, "No training data available.");
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Serialize)]
struct ConsultRequest<'a> {
    symbol: &'a str,
}

#[async_trait]
impl MarketApi for HttpApiClient {
    async fn market_summary(&self) -> Result<MarketSummary, ApiError> {
        self._get("/market/summary").await
    }

    async fn history(&self, selection: &SymbolSelection) -> Result<Vec<PricePoint>, ApiError> {
        let path = format!("/market/history/{}", selection.as_str());
        let rows: Vec<RawPriceRow> = self._get(&path).await?;
        let total = rows.len();

        let points: Vec<PricePoint> = rows.into_iter().filter_map(RawPriceRow::into_point).collect();
        if points.len() < total {
            tracing::warn!(
                symbol = %selection,
                dropped = total - points.len(),
                "Dropped price rows with an unparseable date."
            );
        }
        Ok(points)
    }

    async fn symbols(&self) -> Result<Vec<String>, ApiError> {
        self._get("/market/symbols").await
    }

    async fn financials(
        &self,
        selection: &SymbolSelection,
    ) -> Result<Vec<FinancialRatio>, ApiError> {
        let path = format!("/market/financials/{}", selection.as_str());
        let rows: Vec<RawFinancialRow> = self._get(&path).await?;
        Ok(rows.into_iter().map(RawFinancialRow::into_ratio).collect())
    }

    async fn consult(&self, symbol: &str) -> Result<AdvisorReport, ApiError> {
        self._post("/advisor/consult", Some(&ConsultRequest { symbol }))
            .await
    }

    async fn logs(&self) -> Result<AdminLogs, ApiError> {
        self._get("/admin/logs").await
    }

    async fn trigger_pipeline(&self) -> Result<JobAck, ApiError> {
        self._post::<_, ()>("/admin/trigger-pipeline", None).await
    }

    async fn retrain_model(&self) -> Result<JobAck, ApiError> {
        self._post::<_, ()>("/admin/retrain-model", None).await
    }

    async fn training_results(&self) -> Result<Vec<ValidationRow>, ApiError> {
        let rows: Vec<RawValidationRow> = self._get_envelope("/admin/training-results").await?;
        let total = rows.len();

        let rows: Vec<ValidationRow> = rows.into_iter().filter_map(RawValidationRow::into_row).collect();
        if rows.len() < total {
            tracing::warn!(
                dropped = total - rows.len(),
                "Dropped validation rows without a usable date or time."
            );
        }
        Ok(rows)
    }

    async fn training_metrics(&self) -> Result<Vec<ModelMetric>, ApiError> {
        self._get_envelope("/admin/training-metrics").await
    }
}
