//! Minimal client for the Azure Table service REST protocol.

use crate::error::{CatalogError, CatalogErrorExt};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fmt::Debug;
use std::time::Duration;

const ODATA_JSON: &str = "application/json;odata=nometadata";
const API_VERSION: &str = "2019-02-02";
const NEXT_PARTITION_KEY: &str = "x-ms-continuation-NextPartitionKey";
const NEXT_ROW_KEY: &str = "x-ms-continuation-NextRowKey";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// The only 404 code that means the entity itself is absent.
const ENTITY_NOT_FOUND: &str = "ResourceNotFound";

/// One entity as a JSON object, service properties included.
pub type Entity = Map<String, Value>;

/// The subset of table operations the catalog needs.
#[async_trait]
pub trait TableClient: Send + Sync + Debug {
    /// Creates the table; an existing table counts as success.
    async fn ensure_table(&self) -> Result<(), CatalogError>;

    /// Every entity in `partition`, following continuation tokens.
    async fn query_partition(&self, partition: &str) -> Result<Vec<Entity>, CatalogError>;

    /// A single entity, `None` when the service reports it missing.
    async fn get_entity(&self, partition: &str, row_key: &str) -> Result<Option<Entity>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    #[serde(default)]
    value: Vec<Entity>,
}

/// [`TableClient`] over HTTPS with an optional pre-issued SAS token.
pub struct RestTableClient {
    http: Client,
    endpoint: Url,
    table: String,
    sas_token: Option<String>,
}

impl Debug for RestTableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestTableClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("table", &self.table)
            .field("sas_token", &self.sas_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl RestTableClient {
    /// Builds a client for `table` under the account `endpoint`.
    pub fn new(endpoint: &str, table: &str, sas_token: Option<&str>) -> Result<Self, CatalogError> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/')).map_err(|e| CatalogError::Storage {
            message: e.to_string().into(),
            context: Some(format!("Table endpoint `{endpoint}`").into()),
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(CatalogError::Storage {
                message: "endpoint cannot carry a path".into(),
                context: Some(format!("Table endpoint `{endpoint}`").into()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ODATA_JSON));
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Building table HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            table: table.to_owned(),
            sas_token: sas_token.map(|t| t.trim_start_matches('?').to_owned()).filter(|t| !t.is_empty()),
        })
    }

    /// `{endpoint}/{resource}` with the SAS token as the initial query string.
    fn url(&self, resource: &str) -> Result<Url, CatalogError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::storage("endpoint cannot carry a path"))?
            .pop_if_empty()
            .push(resource);
        url.set_query(self.sas_token.as_deref());
        Ok(url)
    }
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn ensure_table(&self) -> Result<(), CatalogError> {
        let response = self
            .http
            .post(self.url("Tables")?)
            .header("Prefer", "return-no-content")
            .json(&json!({ "TableName": self.table }))
            .send()
            .await
            .context(format!("Creating table {}", self.table))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Ok(()),
            status => Err(failure(status, &response.text().await.unwrap_or_default(), "Creating table")),
        }
    }

    async fn query_partition(&self, partition: &str) -> Result<Vec<Entity>, CatalogError> {
        let filter = format!("PartitionKey eq '{}'", quote(partition));
        let mut continuation: Option<(String, Option<String>)> = None;
        let mut entities = Vec::new();

        loop {
            let mut request = self
                .http
                .get(self.url(&format!("{}()", self.table))?)
                .query(&[("$filter", filter.as_str())]);
            if let Some((next_partition, next_row)) = &continuation {
                request = request.query(&[("NextPartitionKey", next_partition)]);
                if let Some(next_row) = next_row {
                    request = request.query(&[("NextRowKey", next_row)]);
                }
            }

            let response = request.send().await.context(format!("Querying {}", self.table))?;
            let status = response.status();
            if !status.is_success() {
                return Err(failure(status, &response.text().await.unwrap_or_default(), "Querying table"));
            }

            continuation = header(response.headers(), NEXT_PARTITION_KEY)
                .map(|next| (next, header(response.headers(), NEXT_ROW_KEY)));

            let page: QueryPage = response.json().await.context("Decoding query page")?;
            entities.extend(page.value);

            if continuation.is_none() {
                break;
            }
        }

        Ok(entities)
    }

    async fn get_entity(&self, partition: &str, row_key: &str) -> Result<Option<Entity>, CatalogError> {
        let resource =
            format!("{}(PartitionKey='{}',RowKey='{}')", self.table, quote(partition), quote(row_key));
        let response =
            self.http.get(self.url(&resource)?).send().await.context(format!("Loading {row_key}"))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                match odata_code(&body).as_deref() {
                    None | Some(ENTITY_NOT_FOUND) => Ok(None),
                    Some(_) => Err(failure(StatusCode::NOT_FOUND, &body, "Loading entity")),
                }
            },
            status if status.is_success() => {
                Ok(Some(response.json().await.context(format!("Decoding {row_key}"))?))
            },
            status => Err(failure(status, &response.text().await.unwrap_or_default(), "Loading entity")),
        }
    }
}

/// Doubles single quotes for OData string literals.
fn quote(key: &str) -> String {
    key.replace('\'', "''")
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// The `odata.error.code` of an error body, if any.
fn odata_code(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/odata.error/code").and_then(Value::as_str).map(str::to_owned))
}

fn failure(status: StatusCode, body: &str, operation: &'static str) -> CatalogError {
    CatalogError::Storage {
        message: match odata_code(body) {
            Some(code) => format!("{status} {code}").into(),
            None => status.to_string().into(),
        },
        context: Some(operation.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_keep_the_account_path_and_sas() {
        let client = RestTableClient::new(
            "http://127.0.0.1:10002/devstoreaccount1/",
            "projects",
            Some("?sv=2024&sig=abc"),
        )
        .expect("client");

        let url = client.url("projects(PartitionKey='projects',RowKey='a b')").expect("url");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:10002/devstoreaccount1/projects(PartitionKey='projects',RowKey='a%20b')?sv=2024&sig=abc"
        );
    }

    #[test]
    fn slashes_in_keys_stay_inside_the_segment() {
        let client = RestTableClient::new("https://acct.table.core.windows.net", "projects", None).expect("client");
        let url = client.url("projects(PartitionKey='p',RowKey='a/b')").expect("url");
        assert!(url.path().ends_with("RowKey='a%2Fb')"));
        assert!(url.query().is_none());
    }

    #[test]
    fn invalid_endpoint_is_a_storage_error() {
        let err = RestTableClient::new("not a url", "projects", None).expect_err("bad endpoint");
        assert!(matches!(err, CatalogError::Storage { .. }));
    }

    #[test]
    fn odata_error_code_is_surfaced() {
        let err = failure(
            StatusCode::FORBIDDEN,
            r#"{"odata.error":{"code":"AuthorizationFailure","message":{"value":"denied"}}}"#,
            "Querying table",
        );
        assert_eq!(err.to_string(), "Project storage unavailable (Querying table): 403 Forbidden AuthorizationFailure");
    }

    #[test]
    fn odata_code_is_optional() {
        assert_eq!(odata_code(r#"{"odata.error":{"code":"TableNotFound"}}"#).as_deref(), Some("TableNotFound"));
        assert!(odata_code("").is_none());
        assert!(odata_code(r#"{"value":[]}"#).is_none());
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(quote("o'brien"), "o''brien");
    }
}
