use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    entities::sheet_row::{SheetRow, SHEET_HEADERS},
    errors::RecorderError,
    repositories::recorder::SubmissionRecorder,
    settings::SheetCredentials,
};

use super::auth::ServiceAccountAuth;

/// Appends submissions to the first sheet of a Google spreadsheet.
#[derive(Clone)]
pub struct GoogleSheetsRecorder {
    auth: ServiceAccountAuth,
    client: reqwest::Client,
    api_url: String,
    sheet_id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GoogleSheetsRecorder {
    pub fn new(credentials: SheetCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let auth = ServiceAccountAuth::new(
            credentials.service_account_email,
            credentials.private_key,
            credentials.token_uri,
            client.clone(),
        );

        Ok(GoogleSheetsRecorder {
            auth,
            client,
            api_url: credentials.api_url,
            sheet_id: credentials.sheet_id,
        })
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.api_url, self.sheet_id)
    }

    fn values_url(&self, title: &str, cells: &str) -> String {
        format!("{}/values/{}", self.spreadsheet_url(), a1_range(title, cells))
    }

    async fn first_sheet_title(&self, token: &str) -> Result<String, RecorderError> {
        let response = self
            .client
            .get(self.spreadsheet_url())
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await?;

        let meta: SpreadsheetMeta = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RecorderError::InvalidResponse(e.to_string()))?;

        meta.sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or(RecorderError::NoSheets)
    }

    /// Writes the header row when row 1 is empty.
    async fn ensure_header_row(&self, token: &str, title: &str) -> Result<(), RecorderError> {
        let response = self
            .client
            .get(self.values_url(title, "1:1"))
            .bearer_auth(token)
            .send()
            .await?;

        let current: ValueRange = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RecorderError::InvalidResponse(e.to_string()))?;

        let existing: Vec<&str> = current
            .values
            .first()
            .map(|row| row.iter().map(|cell| cell.as_str().unwrap_or_default()).collect())
            .unwrap_or_default();

        if existing.iter().all(|cell| cell.trim().is_empty()) {
            tracing::info!(sheet = %title, "Writing spreadsheet header row");
            let response = self
                .client
                .put(self.values_url(title, "A1:F1"))
                .query(&[("valueInputOption", "RAW")])
                .bearer_auth(token)
                .json(&json!({ "values": [SHEET_HEADERS] }))
                .send()
                .await?;
            ensure_success(response).await?;
        } else if existing != SHEET_HEADERS {
            tracing::warn!(sheet = %title, found = ?existing, "Spreadsheet header row differs from expected columns");
        }

        Ok(())
    }

    async fn append_row(&self, token: &str, title: &str, row: &SheetRow) -> Result<(), RecorderError> {
        let response = self
            .client
            .post(format!("{}:append", self.values_url(title, "A:F")))
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .bearer_auth(token)
            .json(&json!({ "values": [row.values()] }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionRecorder for GoogleSheetsRecorder {
    async fn record(&self, row: &SheetRow) -> Result<(), RecorderError> {
        let token = self.auth.access_token().await?;
        let title = self.first_sheet_title(&token).await?;
        self.ensure_header_row(&token, &title).await?;
        self.append_row(&token, &title, row).await
    }
}

/// Quoted, percent-encoded A1 range for a sheet title.
fn a1_range(title: &str, cells: &str) -> String {
    let range = format!("'{}'!{}", title.replace('\'', "''"), cells);
    urlencoding::encode(&range).into_owned()
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RecorderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RecorderError::Request(format!("{}: {}", status, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wiremock::{
        matchers::{body_json, method, path, path_regex, query_param},
        Mock, MockServer, ResponseTemplate,
    };
    use zeroize::Zeroizing;

    use crate::entities::submission::Submission;

    const TEST_KEY: &str = include_str!("../../../tests/fixtures/service_account_key.pem");
    const SHEET: &str = "sheet-123";

    fn row() -> SheetRow {
        let submission = Submission {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            phone: Some("555".into()),
            subject: "General Inquiry".into(),
            message: "Hi".into(),
        };
        SheetRow::new(&submission, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
    }

    fn recorder(server: &MockServer) -> GoogleSheetsRecorder {
        GoogleSheetsRecorder::new(
            SheetCredentials {
                sheet_id: SHEET.into(),
                service_account_email: "recorder@site.iam.gserviceaccount.com".into(),
                private_key: Zeroizing::new(TEST_KEY.to_string()),
                token_uri: format!("{}/token", server.uri()),
                api_url: server.uri(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    async fn mount_token_and_meta(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v4/spreadsheets/{}", SHEET)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [{ "properties": { "title": "Contacts" } }]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn a1_range_quotes_and_encodes_title() {
        assert_eq!(a1_range("Contacts", "A:F"), "%27Contacts%27%21A%3AF");
        assert_eq!(a1_range("Ann's", "1:1"), "%27Ann%27%27s%27%211%3A1");
    }

    #[tokio::test]
    async fn writes_header_when_sheet_is_empty_then_appends() {
        let server = MockServer::start().await;
        mount_token_and_meta(&server).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Contacts!A1:Z1",
                "majorDimension": "ROWS"
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+$"))
            .and(query_param("valueInputOption", "RAW"))
            .and(body_json(json!({
                "values": [["Date", "Name", "Email", "Phone", "Subject", "Message"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+:append$"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .and(body_json(json!({
                "values": [["2024-03-01T12:00:00.000Z", "Ann", "ann@x.com", "555", "General Inquiry", "Hi"]]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        recorder(&server).record(&row()).await.unwrap();
    }

    #[tokio::test]
    async fn keeps_existing_header_row() {
        let server = MockServer::start().await;
        mount_token_and_meta(&server).await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [SHEET_HEADERS]
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path_regex(r":append$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        recorder(&server).record(&row()).await.unwrap();
    }

    #[tokio::test]
    async fn api_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("caller lacks permission"))
            .mount(&server)
            .await;

        let err = recorder(&server).record(&row()).await.unwrap_err();

        assert!(matches!(err, RecorderError::Request(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn spreadsheet_without_sheets_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.token",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/v4/spreadsheets/{}", SHEET)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sheets": [] })))
            .mount(&server)
            .await;

        let err = recorder(&server).record(&row()).await.unwrap_err();

        assert!(matches!(err, RecorderError::NoSheets));
    }
}
