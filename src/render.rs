//! Plain-text rendering of view snapshots for the terminal.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use core_types::{
    AdminLogs, AdvisorReport, DataOrigin, FinancialRatio, JobAck, ModelMetric, Mover, PricePoint,
    Regime, Sourced,
};
use events::ViewState;
use views::{DashboardData, ExplorerData, ValidationReport};

/// Which explorer panel to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Tab {
    #[default]
    Price,
    Volume,
    Financials,
}

const MISSING: &str = "–";

/// `0.0123` → `1.23%`; missing or non-finite values render as a dash.
pub fn format_pct(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}%", digits, v * 100.0),
        _ => MISSING.to_string(),
    }
}

pub fn format_opt(value: Option<f64>, digits: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", digits, v),
        _ => MISSING.to_string(),
    }
}

/// Whole number with thousands separators, `125000000` → `125,000,000`.
pub fn format_volume(volume: f64) -> String {
    if !volume.is_finite() {
        return MISSING.to_string();
    }
    let digits = format!("{:.0}", volume.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if volume < 0.0 && digits != "0" {
        grouped.insert(0, '-');
    }
    grouped
}

/// The warning printed above any output built from sample data.
pub fn origin_banner(origin: &DataOrigin) -> Option<String> {
    match origin {
        DataOrigin::Live => None,
        DataOrigin::Fallback(reason) => Some(format!("*** OFFLINE SAMPLE DATA ({reason}) ***")),
    }
}

/// A one-line description of any state other than `Ready`.
pub fn state_message<T>(state: &ViewState<T>) -> String {
    match state {
        ViewState::Idle => "Nothing loaded.".to_string(),
        ViewState::Loading => "Still loading.".to_string(),
        ViewState::Ready(_) => "Ready.".to_string(),
        ViewState::Empty(message) => format!("No data: {message}."),
        ViewState::Failed(message) => format!("Failed to load: {message}"),
        ViewState::Cancelled => "Cancelled.".to_string(),
    }
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn signed_cell(text: String, value: f64) -> Cell {
    let color = if value >= 0.0 { Color::Green } else { Color::Red };
    Cell::new(text).fg(color)
}

fn regime_cell(regime: Option<Regime>) -> Cell {
    match regime {
        Some(Regime::Bull) => Cell::new(Regime::Bull.label()).fg(Color::Green),
        Some(Regime::Bear) => Cell::new(Regime::Bear.label()).fg(Color::Red),
        Some(Regime::Sideway) => Cell::new(Regime::Sideway.label()).fg(Color::Yellow),
        None => Cell::new("N/A"),
    }
}

fn movers_table(title: &str, movers: &[Mover]) -> Table {
    let mut table = table(&[title, "Change"]);
    for mover in movers {
        table.add_row(vec![
            Cell::new(&mover.symbol),
            signed_cell(format!("{:+.2}%", mover.change), mover.change),
        ]);
    }
    table
}

pub fn dashboard(view: &Sourced<DashboardData>, rows: usize) -> String {
    let DashboardData { summary, snapshot } = &view.data;
    let mut sections = Vec::new();
    sections.extend(origin_banner(&view.origin));
    sections.push(format!("Banking market dashboard, {}", summary.date));

    let expected = snapshot.summary.expected_return;
    let mut cards = table(&["Expected return (21D)", "Average risk", "Current regime", "Total volume"]);
    cards.add_row(vec![
        signed_cell(format_pct(expected, 2), expected.unwrap_or(0.0)),
        Cell::new(format_pct(snapshot.summary.risk_volatility, 2)),
        regime_cell(snapshot.current_regime),
        Cell::new(format_volume(summary.total_volume)),
    ]);
    sections.push(cards.to_string());

    let mut buckets = table(&["Regime", "Days"]);
    for bucket in &snapshot.buckets {
        buckets.add_row(vec![bucket.regime.to_string(), bucket.count.to_string()]);
    }
    sections.push(buckets.to_string());

    let mut chart = table(&["Date", "Close", "Volume (M)", "Return", "Rolling vol"]);
    for (point, vol) in snapshot.tail(rows) {
        chart.add_row(vec![
            Cell::new(point.date),
            Cell::new(format!("{:.2}", point.close)),
            Cell::new(format!("{:.2}", point.volume_millions)),
            signed_cell(format!("{:+.2}%", point.ret_pct), point.ret_pct),
            Cell::new(format_pct(Some(vol.vol), 2)),
        ]);
    }
    sections.push(chart.to_string());

    sections.push(movers_table("Top gainers", &summary.top_gainers).to_string());
    sections.push(movers_table("Top losers", &summary.top_losers).to_string());
    sections.join("\n")
}

fn price_table(prices: &[PricePoint]) -> Table {
    let mut table = table(&["Date", "Open", "High", "Low", "Close"]);
    for point in prices {
        table.add_row(vec![
            point.date.to_string(),
            format_opt(point.open, 2),
            format_opt(point.high, 2),
            format_opt(point.low, 2),
            format!("{:.2}", point.close),
        ]);
    }
    table
}

fn volume_table(prices: &[PricePoint]) -> Table {
    let mut table = table(&["Date", "Volume"]);
    for point in prices {
        table.add_row(vec![point.date.to_string(), format_volume(point.volume)]);
    }
    table
}

fn financials_table(financials: &[FinancialRatio]) -> Table {
    let mut table = table(&["Quarter", "ROE (%)", "ROA (%)", "P/B"]);
    for ratio in financials {
        table.add_row(vec![
            ratio.quarter_date.chars().take(7).collect::<String>(),
            format_opt(ratio.roe, 2),
            format_opt(ratio.roa, 2),
            format_opt(ratio.p_b, 2),
        ]);
    }
    table
}

pub fn explorer(data: &ExplorerData, tab: Tab, rows: usize) -> String {
    let mut sections = vec![format!(
        "{} over {} ({} trading days)",
        data.selection,
        data.range,
        data.prices.len()
    )];
    let start = data.prices.len().saturating_sub(rows);
    let recent = &data.prices[start..];

    match tab {
        Tab::Price => sections.push(price_table(recent).to_string()),
        Tab::Volume => sections.push(volume_table(recent).to_string()),
        Tab::Financials => match &data.financials_message {
            Some(message) => sections.push(format!("No data: {message}.")),
            None => sections.push(financials_table(&data.financials).to_string()),
        },
    }
    sections.join("\n")
}

pub fn symbols(symbols: &[String]) -> String {
    if symbols.is_empty() {
        return "No symbols available.".to_string();
    }
    symbols.join(", ")
}

pub fn advisor(report: &AdvisorReport) -> String {
    let signals = &report.signals;
    let mut table = table(&["Signal", "Value"]);
    table
        .add_row(vec!["Recommendation".to_string(), report.recommendation.clone()])
        .add_row(vec!["Confidence".to_string(), format_pct(Some(report.confidence), 1)])
        .add_row(vec![
            "Predicted return (21D)".to_string(),
            format_pct(signals.predicted_return_21d, 2),
        ])
        .add_row(vec![
            "Predicted volatility (21D)".to_string(),
            format_pct(signals.predicted_volatility_21d, 2),
        ])
        .add_row(vec![
            "Regime".to_string(),
            signals
                .regime
                .as_ref()
                .map_or_else(|| MISSING.to_string(), ToString::to_string),
        ])
        .add_row(vec![
            "Direction".to_string(),
            signals
                .direction
                .as_ref()
                .map_or_else(|| MISSING.to_string(), ToString::to_string),
        ]);

    format!("{} analysis\n{}\n\n{}", report.symbol, table, report.rationale)
}

/// The newest `lines` log lines, oldest first.
pub fn logs(logs: &AdminLogs, lines: usize) -> String {
    if logs.logs.is_empty() {
        return "No log lines yet.".to_string();
    }
    let start = logs.logs.len().saturating_sub(lines);
    logs.logs[start..].join("\n")
}

pub fn ack(ack: &JobAck) -> String {
    match ack.pid {
        Some(pid) => format!("{} (pid {pid})", ack.status),
        None => ack.status.clone(),
    }
}

pub fn validation(report: &ValidationReport, rows: usize) -> String {
    let mut sections = vec![format!(
        "Model `{}` for {} (models: {}; symbols: {})",
        report.model,
        report.selection,
        report.models.join(", "),
        report.symbols.join(", ")
    )];
    if let Some(metric) = &report.metric {
        sections.push(metric_line(metric));
    }
    if report.points.is_empty() {
        sections.push("No samples for this model and symbol.".to_string());
        return sections.join("\n");
    }

    let mut table = table(&["Date", "Actual", "Predicted"]);
    let start = report.points.len().saturating_sub(rows);
    for point in &report.points[start..] {
        table.add_row(vec![
            point.date.to_string(),
            format!("{:.4}", point.actual),
            format!("{:.4}", point.predicted),
        ]);
    }
    sections.push(table.to_string());
    sections.join("\n")
}

fn metric_line(metric: &ModelMetric) -> String {
    let mut parts = Vec::new();
    if let Some(rmse) = metric.rmse {
        parts.push(format!("RMSE {rmse:.4}"));
    }
    if let Some(accuracy) = metric.accuracy {
        parts.push(format!("accuracy {:.2}%", accuracy * 100.0));
    }
    if parts.is_empty() {
        parts.push("no metrics".to_string());
    }
    format!("{}: {}", metric.model, parts.join(", "))
}

pub fn metrics(metrics: &[ModelMetric]) -> String {
    if metrics.is_empty() {
        return "No training metrics found.".to_string();
    }
    let mut table = table(&["Model", "RMSE", "Accuracy"]);
    for metric in metrics {
        table.add_row(vec![
            metric.model.clone(),
            format_opt(metric.rmse, 4),
            format_pct(metric.accuracy, 2),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_and_dashes() {
        assert_eq!(format_pct(Some(0.012345), 2), "1.23%");
        assert_eq!(format_pct(Some(-0.0098), 2), "-0.98%");
        assert_eq!(format_pct(None, 2), MISSING);
        assert_eq!(format_pct(Some(f64::NAN), 2), MISSING);
    }

    #[test]
    fn volumes_are_grouped_by_thousands() {
        assert_eq!(format_volume(125_000_000.0), "125,000,000");
        assert_eq!(format_volume(999.4), "999");
        assert_eq!(format_volume(1_234.0), "1,234");
        assert_eq!(format_volume(-45_000.0), "-45,000");
        assert_eq!(format_volume(0.0), "0");
    }

    #[test]
    fn only_fallback_data_gets_a_banner() {
        assert_eq!(origin_banner(&DataOrigin::Live), None);
        let banner = origin_banner(&DataOrigin::Fallback("backend unavailable".into())).unwrap();
        assert!(banner.contains("OFFLINE SAMPLE DATA"));
        assert!(banner.contains("backend unavailable"));
    }

    #[test]
    fn logs_show_the_newest_lines() {
        let admin = AdminLogs {
            logs: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(logs(&admin, 2), "b\nc");
        assert_eq!(logs(&AdminLogs::default(), 5), "No log lines yet.");
    }

    #[test]
    fn metric_line_lists_what_is_known() {
        let metric = ModelMetric {
            model: "direction".into(),
            rmse: None,
            accuracy: Some(0.5625),
        };
        assert_eq!(metric_line(&metric), "direction: accuracy 56.25%");
    }
}
