use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::GoogleProviderConfig;
use crate::core::{CurrencyCode, FetchRatioError, Ratio, RatioProvider};

/// Amount of the reference currency requested from the converter. A large amount keeps
/// the relative rounding error of the rendered result small.
pub const BASE_UNITS: u32 = 1000;

const RESULT_SELECTOR: &str = "div#currency_converter_result > span.bld";

/// Scrapes the Google Finance currency converter page.
pub struct GoogleRatioProvider {
    base_url: String,
    client: reqwest::Client,
}

impl GoogleRatioProvider {
    pub fn new(config: &GoogleProviderConfig) -> Result<Self, FetchRatioError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchRatioError::Fetch {
                url: config.base_url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(GoogleRatioProvider {
            base_url: config.base_url.clone(),
            client,
        })
    }

    /// Builds the converter URL. Codes are expected to be validated already.
    pub fn build_endpoint(
        &self,
        base_units: u32,
        reference: &CurrencyCode,
        target: &CurrencyCode,
    ) -> String {
        build_endpoint(&self.base_url, base_units, reference, target)
    }
}

pub fn build_endpoint(
    base_url: &str,
    base_units: u32,
    reference: &CurrencyCode,
    target: &CurrencyCode,
) -> String {
    format!(
        "{}?amount={}&from={}&to={}",
        base_url.trim_end_matches(['/', '?']),
        base_units,
        reference,
        target
    )
}

/// Pulls the converted amount out of the converter page.
pub fn extract_amount(body: &str) -> Result<f64, FetchRatioError> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(RESULT_SELECTOR)
        .map_err(|e| FetchRatioError::Parse(format!("invalid selector: {e}")))?;

    let element = document.select(&selector).next().ok_or_else(|| {
        FetchRatioError::Parse(format!("no element matches `{RESULT_SELECTOR}`"))
    })?;

    let raw = element.text().collect::<String>();
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FetchRatioError::Parse(
            "converted amount is empty".to_string(),
        ));
    }

    let amount = leading_number(raw);
    if !amount.is_finite() || amount <= 0.0 {
        return Err(FetchRatioError::Parse(format!(
            "converted amount `{raw}` is not a positive number"
        )));
    }

    Ok(amount)
}

/// Reads the numeric prefix of `text`, ignoring thousands separators and any trailing
/// label such as a currency code. Text without a numeric prefix reads as zero.
fn leading_number(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }
    cleaned[..end].parse().unwrap_or(0.0)
}

pub fn compute_ratio(amount: f64, base_units: u32) -> Ratio {
    amount / f64::from(base_units)
}

#[async_trait]
impl RatioProvider for GoogleRatioProvider {
    #[instrument(
        name = "GoogleRatioFetch",
        skip(self),
        fields(reference = %reference, target = %target)
    )]
    async fn fetch_ratio(&self, reference: &str, target: &str) -> Result<Ratio, FetchRatioError> {
        let reference = CurrencyCode::new(reference)?;
        let target = CurrencyCode::new(target)?;

        let url = self.build_endpoint(BASE_UNITS, &reference, &target);
        debug!("Requesting converter page from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchRatioError::Fetch {
                url: url.clone(),
                reason: format!("Request error: {e}"),
            })?;

        debug!(status = %response.status(), "Received converter response");

        if !response.status().is_success() {
            return Err(FetchRatioError::Fetch {
                url,
                reason: format!("HTTP error: {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| FetchRatioError::Fetch {
            url: url.clone(),
            reason: format!("Failed to read response body: {e}"),
        })?;

        let amount = extract_amount(&body)?;
        Ok(compute_ratio(amount, BASE_UNITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn converter_page(amount_text: &str) -> String {
        format!(
            r#"<html><body>
            <form action="/finance/converter">
              <div id="currency_converter_result">1000 USD = <span class=bld>{amount_text}</span>
              <input type=submit value="Convert"></div>
            </form>
            </body></html>"#
        )
    }

    fn provider_for(server: &MockServer) -> GoogleRatioProvider {
        let config = GoogleProviderConfig {
            base_url: format!("{}/finance/converter", server.uri()),
            ..GoogleProviderConfig::default()
        };
        GoogleRatioProvider::new(&config).expect("client should build")
    }

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn test_build_endpoint() {
        let url = build_endpoint(
            "https://www.google.com/finance/converter",
            BASE_UNITS,
            &code("USD"),
            &code("EUR"),
        );
        assert_eq!(
            url,
            "https://www.google.com/finance/converter?amount=1000&from=USD&to=EUR"
        );

        let url = build_endpoint("http://localhost:8080/conv/", 10, &code("GBP"), &code("JPY"));
        assert_eq!(url, "http://localhost:8080/conv?amount=10&from=GBP&to=JPY");
    }

    #[test]
    fn test_extract_amount() {
        assert_eq!(extract_amount(&converter_page("1234.56")).unwrap(), 1234.56);
        assert_eq!(extract_amount(&converter_page("1,234.56")).unwrap(), 1234.56);
        assert_eq!(
            extract_amount(&converter_page("1087.3000 EUR")).unwrap(),
            1087.3
        );
    }

    #[test]
    fn test_extract_amount_missing_element() {
        let body = r#"<html><body><div id="other"><span class="bld">12.5</span></div></body></html>"#;
        assert!(matches!(
            extract_amount(body),
            Err(FetchRatioError::Parse(_))
        ));

        // Right container, wrong class marker.
        let body = r#"<div id="currency_converter_result"><span class="light">12.5</span></div>"#;
        assert!(matches!(
            extract_amount(body),
            Err(FetchRatioError::Parse(_))
        ));
    }

    #[test]
    fn test_extract_amount_rejects_empty_and_non_positive() {
        for text in ["", "   ", "0", "0.000 EUR", "-12.5", "N/A"] {
            let result = extract_amount(&converter_page(text));
            assert!(
                matches!(result, Err(FetchRatioError::Parse(_))),
                "Expected parse error for {text:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_compute_ratio() {
        assert_eq!(compute_ratio(500.0, 1000), 0.5);
        assert!((compute_ratio(1234.56, BASE_UNITS) - 1.23456).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_successful_ratio_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .and(query_param("amount", "1000"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(converter_page("1,234.56")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let ratio = provider
            .fetch_ratio("USD", "EUR")
            .await
            .expect("Failed to get ratio");
        assert!((ratio - 1.23456).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_invalid_currency_makes_no_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(converter_page("1000")))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);

        let err = provider
            .fetch_ratio("XXX_NOT_A_CODE", "EUR")
            .await
            .unwrap_err();
        assert!(
            matches!(&err, FetchRatioError::InvalidCurrency { code } if code == "XXX_NOT_A_CODE")
        );

        let err = provider.fetch_ratio("USD", "eur").await.unwrap_err();
        assert_eq!(err.to_string(), "The currency code eur is not valid");
    }

    #[tokio::test]
    async fn test_missing_element_is_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>Sorry.</body></html>"),
            )
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.fetch_ratio("USD", "EUR").await;
        assert!(matches!(result, Err(FetchRatioError::Parse(_))));
    }

    #[tokio::test]
    async fn test_zero_amount_is_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .respond_with(ResponseTemplate::new(200).set_body_string(converter_page("0")))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let result = provider.fetch_ratio("USD", "EUR").await;
        assert!(matches!(result, Err(FetchRatioError::Parse(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let provider = provider_for(&mock_server);
        let err = provider.fetch_ratio("USD", "EUR").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(
            err.to_string()
                .contains("HTTP error: 500 Internal Server Error")
        );
    }

    #[tokio::test]
    async fn test_timeout_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/finance/converter"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(converter_page("900"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let config = GoogleProviderConfig {
            base_url: format!("{}/finance/converter", mock_server.uri()),
            timeout_secs: 1,
            ..GoogleProviderConfig::default()
        };
        let provider = GoogleRatioProvider::new(&config).unwrap();
        let result = provider.fetch_ratio("USD", "EUR").await;
        assert!(matches!(result, Err(FetchRatioError::Fetch { .. })));
    }
}
