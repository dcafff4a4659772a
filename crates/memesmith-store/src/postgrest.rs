//! Supabase store over the PostgREST API.
//!
//! Every request carries the service-role key both as `apikey` and as the
//! bearer token, so row-level security is bypassed; ownership checks happen
//! here instead.

use std::time::Duration;

use async_trait::async_trait;
use memesmith_core::{Meme, MemeId, MemePage, NewMeme, ProfileUpdate, UserId, UserProfile};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{page_of, MemeStore, Store, UserStore, PAGE_SIZE};
use crate::{Result, StoreError};

const USERS: &str = "users";
const MEMES: &str = "memes";
const EVENTS: &str = "processed_events";

/// Optimistic read-then-patch attempts for credit changes.
const CREDIT_ATTEMPTS: usize = 3;

/// Supabase-backed store.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    rest_url: String,
}

impl PostgrestStore {
    /// Connect to a Supabase project. `timeout` bounds every request.
    pub fn new(project_url: &str, service_role_key: &str, timeout: Duration) -> Result<Self> {
        if service_role_key.is_empty() {
            return Err(StoreError::Config("service role key is empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(service_role_key)
            .map_err(|e| StoreError::Config(format!("invalid service role key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {service_role_key}"))
            .map_err(|e| StoreError::Config(format!("invalid service role key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            rest_url: rest_url(project_url),
        })
    }

    fn table(&self, name: &str) -> String {
        format!("{}/{name}", self.rest_url)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let req = self.client.get(self.table(table)).query(&[("select", "*")]).query(query);
        decode_rows(send(req).await?).await
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        kind: &'static str,
        id: &str,
    ) -> Result<T> {
        self.select::<T>(table, &[("id", eq(id))])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(kind, id))
    }

    async fn insert<T: Serialize + DeserializeOwned>(&self, table: &str, row: &T) -> Result<T> {
        let req = self
            .client
            .post(self.table(table))
            .header("Prefer", "return=representation")
            .json(row);
        decode_rows::<T>(send(req).await?)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("insert into {table} returned no rows")))
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        filter: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>> {
        let req = self
            .client
            .patch(self.table(table))
            .query(filter)
            .header("Prefer", "return=representation")
            .json(body);
        decode_rows(send(req).await?).await
    }

    /// The balance column as stored; legacy rows may hold NULL.
    async fn raw_credits(&self, id: &UserId) -> Result<Option<u32>> {
        self.select::<CreditsRow>(USERS, &[("id", eq(id.as_str()))])
            .await?
            .into_iter()
            .next()
            .map(|row| row.credits)
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    /// Read the balance, then write it back only if nobody changed it.
    async fn adjust_credits(&self, id: &UserId, delta: i64) -> Result<u32> {
        for _ in 0..CREDIT_ATTEMPTS {
            let raw = self.raw_credits(id).await?;
            let current = raw.unwrap_or(0);
            let next = i64::from(current) + delta;
            if next < 0 {
                return Err(StoreError::InsufficientCredits(id.to_string()));
            }
            let next = u32::try_from(next).unwrap_or(u32::MAX);

            let rows: Vec<UserProfile> = self
                .patch(
                    USERS,
                    &[("id", eq(id.as_str())), ("credits", credits_guard(raw))],
                    &serde_json::json!({ "credits": next }),
                )
                .await?;
            if let Some(row) = rows.into_iter().next() {
                return Ok(row.credits);
            }
            log::debug!("Credit balance for {id} changed concurrently; retrying");
        }
        Err(StoreError::Conflict(format!(
            "credit balance for {id} kept changing"
        )))
    }
}

#[async_trait]
impl UserStore for PostgrestStore {
    async fn get_user(&self, id: &UserId) -> Result<UserProfile> {
        self.select_one(USERS, "user", id.as_str()).await
    }

    async fn create_user(&self, profile: UserProfile) -> Result<UserProfile> {
        self.insert(USERS, &profile).await
    }

    async fn update_profile(&self, id: &UserId, update: ProfileUpdate) -> Result<UserProfile> {
        if update.is_empty() {
            return self.get_user(id).await;
        }
        self.patch::<_, UserProfile>(USERS, &[("id", eq(id.as_str()))], &update)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found("user", id))
    }

    async fn set_pro(&self, id: &UserId, is_pro: bool) -> Result<()> {
        let rows: Vec<UserProfile> = self
            .patch(USERS, &[("id", eq(id.as_str()))], &serde_json::json!({ "is_pro": is_pro }))
            .await?;
        if rows.is_empty() {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    async fn add_credits(&self, id: &UserId, credits: u32) -> Result<u32> {
        self.adjust_credits(id, i64::from(credits)).await
    }

    async fn spend_credit(&self, id: &UserId) -> Result<u32> {
        self.adjust_credits(id, -1).await
    }

    async fn record_event(&self, event_id: &str) -> Result<bool> {
        let req = self
            .client
            .post(self.table(EVENTS))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "id": event_id }));
        match send(req).await {
            Ok(_) => Ok(true),
            // Unique violation on the primary key.
            Err(StoreError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn forget_event(&self, event_id: &str) -> Result<()> {
        let req = self.client.delete(self.table(EVENTS)).query(&[("id", eq(event_id))]);
        send(req).await?;
        Ok(())
    }
}

#[async_trait]
impl MemeStore for PostgrestStore {
    async fn create_meme(&self, user: &UserId, meme: NewMeme) -> Result<Meme> {
        self.insert(MEMES, &meme.into_meme(user.clone())).await
    }

    async fn get_meme(&self, id: &MemeId) -> Result<Meme> {
        self.select_one(MEMES, "meme", &id.to_string()).await
    }

    async fn list_user_memes(&self, user: &UserId) -> Result<Vec<Meme>> {
        self.select(
            MEMES,
            &[
                ("user_id", eq(user.as_str())),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn list_public(&self, page: u32) -> Result<MemePage> {
        let (from, to) = page_range(page);
        let req = self
            .client
            .get(self.table(MEMES))
            .query(&[
                ("select", "*"),
                ("is_public", "eq.true"),
                ("order", "created_at.desc"),
            ])
            .header("Range-Unit", "items")
            .header("Range", format!("{from}-{to}"))
            .header("Prefer", "count=exact");

        let resp = req.send().await?;
        let total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_total);

        // Past the last page PostgREST answers 416 rather than an empty list.
        if resp.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(page_of(Vec::new(), page, total.unwrap_or(0)));
        }

        let rows: Vec<Meme> = decode_rows(check(resp).await?).await?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok(page_of(rows, page, total))
    }

    async fn delete_meme(&self, id: &MemeId, requester: &UserId) -> Result<()> {
        let meme = self.get_meme(id).await?;
        if meme.user_id != *requester {
            return Err(StoreError::Forbidden(format!(
                "meme {id} belongs to another user"
            )));
        }
        let req = self.client.delete(self.table(MEMES)).query(&[
            ("id", eq(&id.to_string())),
            ("user_id", eq(requester.as_str())),
        ]);
        send(req).await?;
        Ok(())
    }
}

impl Store for PostgrestStore {
    fn name(&self) -> &str {
        "supabase"
    }
}

fn rest_url(project_url: &str) -> String {
    format!("{}/rest/v1", project_url.trim_end_matches('/'))
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[derive(Deserialize)]
struct CreditsRow {
    #[serde(default)]
    credits: Option<u32>,
}

/// Filter matching the balance exactly as it was read. `eq.` never matches
/// NULL, so an unset balance needs `is.null`.
fn credits_guard(raw: Option<u32>) -> String {
    match raw {
        Some(n) => eq(&n.to_string()),
        None => "is.null".to_string(),
    }
}

/// Inclusive row range of a gallery page.
fn page_range(page: u32) -> (u64, u64) {
    let from = u64::from(page) * u64::from(PAGE_SIZE);
    (from, from + u64::from(PAGE_SIZE) - 1)
}

/// Total from a `Content-Range` header such as `0-11/40` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    content_range.rsplit_once('/')?.1.trim().parse().ok()
}

async fn send(req: RequestBuilder) -> Result<Response> {
    check(req.send().await?).await
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(status_error(status, message))
}

fn status_error(status: StatusCode, message: String) -> StoreError {
    match status {
        StatusCode::CONFLICT => StoreError::Conflict(message),
        _ => StoreError::Backend {
            status: status.as_u16(),
            message,
        },
    }
}

async fn decode_rows<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>> {
    let body = resp.text().await?;
    Ok(serde_json::from_str(&body)?)
}
