use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header::HeaderValue, Method, RequestBuilder, Response};
use serde::Serialize;

use super::{MoodStore, StoreError, StoreResult};
use crate::models::mood_entry::{EntryId, MetricsPatch, MoodEntry, MoodMetrics};

const TABLE: &str = "mood_entries";

/// Hosted store reached over its PostgREST-style table endpoint. The schema
/// is selected with the `Accept-Profile` / `Content-Profile` headers.
#[derive(Clone)]
pub struct RestMoodStore {
    client: reqwest::Client,
    table_url: String,
    api_key: String,
    schema: String,
}

#[derive(Debug, Serialize)]
struct NewEntryRow<'a> {
    created_at: String,
    #[serde(flatten)]
    metrics: &'a MoodMetrics,
}

impl RestMoodStore {
    pub fn new(base_url: &str, api_key: &str, schema: &str, timeout_secs: u64) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            table_url: table_url(base_url),
            api_key: api_key.to_string(),
            schema: schema.to_string(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(profile_header, &self.schema)
            .header("Prefer", HeaderValue::from_static("return=representation"))
    }

    async fn rows(response: Response) -> StoreResult<Vec<MoodEntry>> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        let rows = response.json::<Vec<MoodEntry>>().await?;
        Ok(rows)
    }
}

fn table_url(base_url: &str) -> String {
    format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), TABLE)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn eq_id(id: EntryId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

fn list_query() -> [(&'static str, &'static str); 2] {
    [("select", "*"), ("order", "created_at.desc,id.desc")]
}

/// `[start, end)` on `created_at`, oldest first.
fn range_query(start: DateTime<Utc>, end: DateTime<Utc>) -> [(&'static str, String); 4] {
    [
        ("select", "*".to_string()),
        ("created_at", format!("gte.{}", timestamp(start))),
        ("created_at", format!("lt.{}", timestamp(end))),
        ("order", "created_at.asc,id.asc".to_string()),
    ]
}

fn ping_query() -> [(&'static str, &'static str); 2] {
    [("select", "id"), ("limit", "1")]
}

#[async_trait]
impl MoodStore for RestMoodStore {
    async fn insert(&self, metrics: &MoodMetrics, created_at: DateTime<Utc>) -> StoreResult<MoodEntry> {
        let row = NewEntryRow {
            created_at: timestamp(created_at),
            metrics,
        };
        let response = self.request(Method::POST).json(&row).send().await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))
    }

    async fn update(&self, id: EntryId, patch: &MetricsPatch) -> StoreResult<Option<MoodEntry>> {
        let response = self
            .request(Method::PATCH)
            .query(&eq_id(id))
            .json(patch)
            .send()
            .await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete(&self, id: EntryId) -> StoreResult<Option<MoodEntry>> {
        let response = self.request(Method::DELETE).query(&eq_id(id)).send().await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn list_desc(&self) -> StoreResult<Vec<MoodEntry>> {
        let response = self
            .request(Method::GET)
            .query(&list_query())
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MoodEntry>> {
        let response = self
            .request(Method::GET)
            .query(&range_query(start, end))
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self
            .request(Method::GET)
            .query(&ping_query())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Remote {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RestMoodStore {
        RestMoodStore::new("https://abc.example.co/", "anon-key", "moodlogs", 30).unwrap()
    }

    fn header<'a>(request: &'a reqwest::Request, name: &str) -> Option<&'a str> {
        request.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn test_range_request_filters_one_day() {
        let store = store();
        let start: DateTime<Utc> = "2026-02-10T00:00:00Z".parse().unwrap();
        let end: DateTime<Utc> = "2026-02-11T00:00:00Z".parse().unwrap();

        let request = store
            .request(Method::GET)
            .query(&range_query(start, end))
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/mood_entries?select=*\
             &created_at=gte.2026-02-10T00%3A00%3A00.000000Z\
             &created_at=lt.2026-02-11T00%3A00%3A00.000000Z\
             &order=created_at.asc%2Cid.asc"
        );
        assert_eq!(header(&request, "accept-profile"), Some("moodlogs"));
        assert_eq!(header(&request, "content-profile"), None);
        assert_eq!(header(&request, "prefer"), Some("return=representation"));
        assert_eq!(header(&request, "apikey"), Some("anon-key"));
        assert_eq!(header(&request, "authorization"), Some("Bearer anon-key"));
    }

    #[test]
    fn test_list_request_newest_first() {
        let request = store()
            .request(Method::GET)
            .query(&list_query())
            .build()
            .unwrap();
        assert_eq!(
            request.url().query(),
            Some("select=*&order=created_at.desc%2Cid.desc")
        );
    }

    #[test]
    fn test_ping_request_selects_one_id() {
        let request = store()
            .request(Method::GET)
            .query(&ping_query())
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("select=id&limit=1"));
    }

    #[test]
    fn test_delete_request_targets_one_id() {
        let request = store()
            .request(Method::DELETE)
            .query(&eq_id(42))
            .build()
            .unwrap();

        assert_eq!(request.method(), &Method::DELETE);
        assert_eq!(
            request.url().as_str(),
            "https://abc.example.co/rest/v1/mood_entries?id=eq.42"
        );
        assert_eq!(header(&request, "content-profile"), Some("moodlogs"));
        assert_eq!(header(&request, "accept-profile"), None);
        assert_eq!(header(&request, "prefer"), Some("return=representation"));
    }

    #[test]
    fn test_update_request_sends_patch_body() {
        let mut patch = MetricsPatch::default();
        patch.set(crate::models::mood_entry::MetricField::Anger, 7);

        let request = store()
            .request(Method::PATCH)
            .query(&eq_id(5))
            .json(&patch)
            .build()
            .unwrap();

        assert_eq!(request.url().query(), Some("id=eq.5"));
        assert_eq!(header(&request, "content-profile"), Some("moodlogs"));
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json, serde_json::json!({ "anger": 7 }));
    }

    #[tokio::test]
    async fn test_error_status_becomes_remote_error() {
        let response = http::Response::builder()
            .status(409)
            .body(r#"{"message":"duplicate key"}"#)
            .unwrap();

        let err = RestMoodStore::rows(Response::from(response)).await.unwrap_err();

        match err {
            StoreError::Remote { status, body } => {
                assert_eq!(status, 409);
                assert!(body.contains("duplicate key"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_status_decodes_rows() {
        let response = http::Response::builder()
            .status(201)
            .body(
                r#"[{"id": 1, "created_at": "2026-02-10T08:30:00+00:00",
                "loneliness": 1, "fulfillment": 1, "tiredness": 1, "energy_levels": 1,
                "excitement": 1, "sleepiness": 1, "anger": 1, "depression": 1,
                "mania": 1, "creativity": 1, "song_ideas": 0, "essay_ideas": 0}]"#,
            )
            .unwrap();

        let rows = RestMoodStore::rows(Response::from(response)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metrics.anger, 1);
    }

    #[test]
    fn test_row_missing_a_metric_fails_to_decode() {
        let body = r#"[{"id": 7, "created_at": "2026-02-10T08:30:00+00:00",
            "loneliness": 1, "fulfillment": 2, "tiredness": 3, "energy_levels": 4,
            "excitement": 5, "sleepiness": 6, "anger": 7, "depression": 8,
            "mania": 9, "creativity": 10, "song_ideas": 11}]"#;
        assert!(serde_json::from_str::<Vec<MoodEntry>>(body).is_err());
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        assert_eq!(
            table_url("https://abc.example.co/"),
            "https://abc.example.co/rest/v1/mood_entries"
        );
        assert_eq!(
            table_url("https://abc.example.co"),
            "https://abc.example.co/rest/v1/mood_entries"
        );
    }

    #[test]
    fn test_new_row_body_is_flat() {
        let metrics = MoodMetrics::default();
        let row = NewEntryRow {
            created_at: timestamp("2026-02-10T08:30:00Z".parse().unwrap()),
            metrics: &metrics,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["created_at"], "2026-02-10T08:30:00.000000Z");
        assert_eq!(json["loneliness"], 3);
        assert_eq!(json["essay_ideas"], 0);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_rows_decode_store_timestamps() {
        let body = r#"[{"id": 7, "created_at": "2026-02-10T08:30:00.123456+00:00",
            "loneliness": 1, "fulfillment": 2, "tiredness": 3, "energy_levels": 4,
            "excitement": 5, "sleepiness": 6, "anger": 7, "depression": 8,
            "mania": 9, "creativity": 10, "song_ideas": 11, "essay_ideas": 12}]"#;
        let rows: Vec<MoodEntry> = serde_json::from_str(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[0].metrics.essay_ideas, 12);
    }
}
