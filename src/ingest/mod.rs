//! Feed ingestion: pull the upstream quip feed and upsert every record
//! into the `videos` table.
//!
//! One bad record never aborts the batch; it is logged and skipped, the
//! way a nightly sync has to behave.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::config::IngestConfig;
use crate::db::models::SourceRecord;
use crate::db::operations::DbOperations;
use crate::error::{AppError, IngestError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub fetched: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Rows affected as reported by the database; an update counts twice
    /// under ON DUPLICATE KEY UPDATE.
    pub rows_affected: u64,
}

pub fn build_client(config: &IngestConfig) -> Result<Client, AppError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET the feed and decode it as a JSON array of records.
pub async fn fetch_records(
    client: &Client,
    api_url: &str,
) -> Result<Vec<SourceRecord>, IngestError> {
    let url = Url::parse(api_url)
        .map_err(|e| IngestError::InvalidUrl(format!("{}: {}", api_url, e)))?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::BadStatus(status.as_u16()));
    }

    let payload: serde_json::Value = response.json().await?;
    if !payload.is_array() {
        return Err(IngestError::UnexpectedPayload(
            "feed did not return a list".to_string(),
        ));
    }

    let records: Vec<SourceRecord> = serde_json::from_value(payload)
        .map_err(|e| IngestError::UnexpectedPayload(e.to_string()))?;

    info!("Fetched {} video records from feed", records.len());
    Ok(records)
}

/// Upsert a batch of feed records, tolerating per-record failures.
pub async fn upsert_records(
    db: &DbOperations,
    records: &[SourceRecord],
) -> Result<IngestSummary, AppError> {
    let mut summary = IngestSummary {
        fetched: records.len(),
        ..Default::default()
    };

    for (idx, record) in records.iter().enumerate() {
        let Some(id) = record.id.as_deref() else {
            warn!("Skipping record {}/{} without an id", idx + 1, records.len());
            summary.skipped += 1;
            continue;
        };

        match db.upsert_video(record).await {
            Ok(rows) => {
                summary.processed += 1;
                summary.rows_affected += rows;
                info!("Processed {}/{} (id={})", idx + 1, records.len(), id);
            }
            Err(e) => {
                summary.failed += 1;
                warn!("Failed to upsert video id={}: {} (continuing)", id, e);
            }
        }
    }

    Ok(summary)
}

/// Full ingestion pass: fetch the feed, then upsert everything.
pub async fn run(db: &DbOperations, config: &IngestConfig) -> Result<IngestSummary, AppError> {
    let client = build_client(config)?;
    let records = fetch_records(&client, &config.api_url).await?;

    if records.is_empty() {
        info!("No video records to process");
        return Ok(IngestSummary::default());
    }

    let summary = upsert_records(db, &records).await?;
    info!(
        "Ingestion finished: {} processed, {} skipped, {} failed ({} rows affected)",
        summary.processed, summary.skipped, summary.failed, summary.rows_affected
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_records_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quips/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": "a1",
                    "url": "https://quipvid.com/v/a1",
                    "name": "Casablanca",
                    "title": "Here's looking at you, kid",
                    "views": 42
                },
                {
                    "id": "b2",
                    "url": "https://quipvid.com/v/b2",
                    "name": "Jaws",
                    "title": "You're gonna need a bigger boat",
                    "poster": "https://quipvid.com/p/b2.jpg"
                }
            ])))
            .mount(&server)
            .await;

        let records = fetch_records(&test_client(), &format!("{}/api/quips/", server.uri()))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("a1"));
        assert_eq!(records[0].views, Some(42));
        assert!(records[1].views.is_none());
        assert_eq!(
            records[1].poster.as_deref(),
            Some("https://quipvid.com/p/b2.jpg")
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_records_rejects_non_list_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"videos": []})),
            )
            .mount(&server)
            .await;

        let err = fetch_records(&test_client(), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::UnexpectedPayload(_)));
    }

    #[test_log::test(tokio::test)]
    async fn test_fetch_records_propagates_http_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetch_records(&test_client(), &server.uri())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::BadStatus(503)));
    }

    #[tokio::test]
    async fn test_fetch_records_rejects_invalid_url() {
        let err = fetch_records(&test_client(), "not a url").await.unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl(_)));
    }
}
