//! Shared fakes for pipeline and API tests
#![allow(dead_code)]

use async_trait::async_trait;
use moodtune_api::catalog::{
    ArtistRef, CatalogError, CredentialKind, RawTrack, SearchCapable, SearchRequest, WriteCapable,
};
use moodtune_api::composer::QueryComposer;
use moodtune_api::credentials::{CredentialProvider, ResolvedCredentials};
use moodtune_api::llm::{LlmError, TextGenerator};
use moodtune_api::{PlaylistError, PlaylistGenerator};
use moodtune_common::config::SelectionConfig;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Write-side call seen by [`FakeCatalog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCall {
    Create { title: String, description: String },
    Add { playlist_id: String, track_ids: Vec<String> },
}

/// In-memory catalog with scripted search outcomes
///
/// Scripted outcomes are consumed one per search call; once exhausted every
/// search returns `fallback`.
pub struct FakeCatalog {
    scripted: Mutex<VecDeque<Result<Vec<RawTrack>, CatalogError>>>,
    fallback: Vec<RawTrack>,
    create_fails: bool,
    add_fails: bool,
    pub searches: Mutex<Vec<SearchRequest>>,
    pub writes: Mutex<Vec<WriteCall>>,
}

impl FakeCatalog {
    pub fn returning(results: Vec<RawTrack>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            fallback: results,
            create_fails: false,
            add_fails: false,
            searches: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_script(mut self, script: Vec<Result<Vec<RawTrack>, CatalogError>>) -> Self {
        self.scripted = Mutex::new(script.into());
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.create_fails = true;
        self
    }

    pub fn failing_add(mut self) -> Self {
        self.add_fails = true;
        self
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchCapable for FakeCatalog {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawTrack>, CatalogError> {
        self.searches.lock().unwrap().push(request.clone());
        match self.scripted.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(self.fallback.clone()),
        }
    }
}

#[async_trait]
impl WriteCapable for FakeCatalog {
    async fn create_playlist(&self, title: &str, description: &str) -> Result<String, CatalogError> {
        self.writes.lock().unwrap().push(WriteCall::Create {
            title: title.to_string(),
            description: description.to_string(),
        });
        if self.create_fails {
            return Err(CatalogError::Status {
                status: 401,
                body: "unauthorized".into(),
            });
        }
        Ok("PLfake123".to_string())
    }

    async fn add_items(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError> {
        self.writes.lock().unwrap().push(WriteCall::Add {
            playlist_id: playlist_id.to_string(),
            track_ids: track_ids.to_vec(),
        });
        if self.add_fails {
            return Err(CatalogError::Rejected("edit_playlist status STATUS_FAILED".into()));
        }
        Ok(())
    }

    fn playlist_url(&self, playlist_id: &str) -> String {
        format!("https://music.example/playlist?list={}", playlist_id)
    }
}

/// Credential provider handing out fixed handles
pub struct FakeProvider {
    resolved: Option<Arc<ResolvedCredentials>>,
    pub calls: AtomicUsize,
}

impl FakeProvider {
    /// One catalog serving both roles
    pub fn single(catalog: Arc<FakeCatalog>, kind: CredentialKind) -> Self {
        Self::split(catalog.clone(), kind, catalog, kind)
    }

    pub fn split(
        search: Arc<FakeCatalog>,
        search_kind: CredentialKind,
        write: Arc<FakeCatalog>,
        write_kind: CredentialKind,
    ) -> Self {
        Self {
            resolved: Some(Arc::new(ResolvedCredentials {
                search,
                search_kind,
                write,
                write_kind,
            })),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            resolved: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    async fn resolve(&self) -> Result<Arc<ResolvedCredentials>, PlaylistError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.resolved
            .clone()
            .ok_or_else(|| PlaylistError::Configuration("no credential files".into()))
    }
}

/// Text generator that counts calls and always answers the same
pub struct CountingGenerator {
    reply: String,
    pub calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for CountingGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub fn track(id: &str, artist: &str) -> RawTrack {
    RawTrack {
        video_id: Some(id.to_string()),
        title: Some(format!("Song {}", id)),
        artists: vec![ArtistRef {
            id: Some(format!("UC{}", artist)),
            name: artist.to_string(),
        }],
    }
}

/// 20 tracks by artists A..D, five each, interleaved A1 B1 C1 D1 A2 ...
pub fn four_artist_pool() -> Vec<RawTrack> {
    (1..=5)
        .flat_map(|n| ["A", "B", "C", "D"].map(|a| track(&format!("{}{}", a, n), a)))
        .collect()
}

pub fn generator(composer: QueryComposer, provider: Arc<dyn CredentialProvider>) -> PlaylistGenerator {
    PlaylistGenerator::new(composer, provider, SelectionConfig::default(), 20)
}
