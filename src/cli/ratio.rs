use super::ui;
use crate::core::{Ratio, RatioProvider};
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

/// A fetched ratio together with what the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioReport {
    pub reference: String,
    pub target: String,
    pub ratio: Ratio,
    pub amount: Option<f64>,
}

impl RatioReport {
    pub fn inverse(&self) -> Ratio {
        1.0 / self.ratio
    }

    pub fn converted(&self) -> Option<f64> {
        self.amount.map(|a| a * self.ratio)
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Pair"),
            ui::header_cell("Ratio"),
            ui::header_cell("Inverse"),
        ]);
        table.add_row(vec![
            Cell::new(format!("{}/{}", self.reference, self.target)),
            ui::number_cell(self.ratio, 6),
            ui::number_cell(self.inverse(), 6),
        ]);

        let mut output = format!(
            "Exchange ratio: {}\n\n",
            ui::style_text(
                &format!("{} → {}", self.reference, self.target),
                ui::StyleType::Title
            )
        );
        output.push_str(&table.to_string());

        if let (Some(amount), Some(converted)) = (self.amount, self.converted()) {
            output.push_str(&format!(
                "\n\n{amount:.2} {} = {} {}",
                self.reference,
                ui::style_text(&format!("{converted:.2}"), ui::StyleType::Value),
                self.target
            ));
        }

        output.push_str(&format!(
            "\n{}",
            ui::style_text("Source: Google Finance converter", ui::StyleType::Subtle)
        ));
        output
    }
}

/// Fetches the ratio for one pair and builds a report for display.
pub async fn fetch_report(
    provider: &dyn RatioProvider,
    reference: &str,
    target: &str,
    amount: Option<f64>,
) -> Result<RatioReport> {
    info!(reference, target, "Fetching exchange ratio");

    let spinner = ui::new_spinner(format!("Fetching {reference}/{target}..."));
    let result = provider.fetch_ratio(reference, target).await;
    spinner.finish_and_clear();

    Ok(RatioReport {
        reference: reference.to_string(),
        target: target.to_string(),
        ratio: result?,
        amount,
    })
}

pub async fn run(
    provider: &dyn RatioProvider,
    reference: &str,
    target: &str,
    amount: Option<f64>,
) -> Result<()> {
    let report = fetch_report(provider, reference, target, amount).await?;
    println!("{}", report.display_as_table());
    Ok(())
}
