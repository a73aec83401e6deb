use std::future::Future;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{ChapterError, Result};
use crate::scripture::Verse;
use crate::translation::Translation;

pub const DEFAULT_BASE_URL: &str = "https://www.abibliadigital.com.br/api";

/// Anything that can resolve a chapter to its verses.
pub trait VerseDataSource: Send + Sync + 'static {
    fn fetch_verses(
        &self,
        translation: Translation,
        book_abbreviation: &str,
        chapter: u32,
    ) -> impl Future<Output = Result<Vec<Verse>>> + Send;
}

#[derive(Deserialize)]
struct VersesResponse {
    verses: Vec<Verse>,
}

/// Book metadata, used to fill in a route when only the abbreviation is known.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookInfo {
    pub name: String,
    pub chapters: u32,
}

/// HTTPS client for the A Bíblia Digital verse API.
#[derive(Clone)]
pub struct BibliaDigitalClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BibliaDigitalClient {
    pub fn new(base_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    /// Look up a book's display name and chapter count.
    pub async fn fetch_book(&self, book_abbreviation: &str) -> Result<BookInfo> {
        let url = format!("{}/books/{}", self.base_url, book_abbreviation);
        let body = self.get_text(&url).await?;
        serde_json::from_str(&body).map_err(|e| ChapterError::MalformedResponse(e.to_string()))
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChapterError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChapterError::Network(format!("{}: {}", status, text)));
        }

        response
            .text()
            .await
            .map_err(|e| ChapterError::Network(e.to_string()))
    }

    fn verses_url(&self, translation: Translation, book_abbreviation: &str, chapter: u32) -> String {
        format!(
            "{}/verses/{}/{}/{}",
            self.base_url, translation, book_abbreviation, chapter
        )
    }
}

impl VerseDataSource for BibliaDigitalClient {
    async fn fetch_verses(
        &self,
        translation: Translation,
        book_abbreviation: &str,
        chapter: u32,
    ) -> Result<Vec<Verse>> {
        let url = self.verses_url(translation, book_abbreviation, chapter);
        let body = self.get_text(&url).await?;
        let parsed: VersesResponse = serde_json::from_str(&body)
            .map_err(|e| ChapterError::MalformedResponse(e.to_string()))?;

        Ok(parsed.verses)
    }
}
