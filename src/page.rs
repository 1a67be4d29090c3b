//! Page loading.
//!
//! A load fetches the block tree and the page metadata at the same time,
//! then derives the outline and the rendered views. [`PageLoader`] runs
//! loads off the UI thread and tags each one with a generation so only the
//! newest request can land.

use crate::client::ContentClient;
use crate::model::{Block, PageMetadata};
use crate::render::{HeadingEntry, View, extract_headings, render_blocks};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A fully loaded page. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub blocks: Vec<Block>,
    pub metadata: PageMetadata,
    pub headings: Vec<HeadingEntry>,
    pub views: Vec<View>,
}

impl Page {
    pub fn new(id: impl Into<String>, blocks: Vec<Block>, metadata: PageMetadata) -> Self {
        let headings = extract_headings(&blocks);
        let views = render_blocks(&blocks);
        Self {
            id: id.into(),
            blocks,
            metadata,
            headings,
            views,
        }
    }
}

/// Fetch blocks and metadata concurrently and build the page.
pub fn load_page(client: &dyn ContentClient, id: &str) -> Page {
    let started = Instant::now();
    let (blocks, metadata) = thread::scope(|scope| {
        let blocks = scope.spawn(|| client.fetch_blocks(id));
        let metadata = client.fetch_page_metadata(id);
        let blocks = blocks.join().unwrap_or_else(|_| {
            warn!(id, "block fetch panicked");
            Vec::new()
        });
        (blocks, metadata)
    });

    let page = Page::new(id, blocks, metadata);
    info!(
        id,
        blocks = page.blocks.len(),
        headings = page.headings.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "page loaded"
    );
    page
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading { id: String },
    Loaded(Arc<Page>),
}

/// Runs page loads in the background. Only the latest request is kept.
pub struct PageLoader {
    client: Arc<dyn ContentClient>,
    generation: u64,
    state: LoadState,
    sender: Sender<(u64, Page)>,
    receiver: Receiver<(u64, Page)>,
}

impl PageLoader {
    pub fn new(client: Arc<dyn ContentClient>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            client,
            generation: 0,
            state: LoadState::Idle,
            sender,
            receiver,
        }
    }

    pub fn client(&self) -> &Arc<dyn ContentClient> {
        &self.client
    }

    /// Start loading `id`. Any load still in flight becomes stale.
    pub fn start(&mut self, id: &str) -> u64 {
        self.generation += 1;
        let generation = self.generation;
        self.state = LoadState::Loading { id: id.to_string() };

        let client = Arc::clone(&self.client);
        let sender = self.sender.clone();
        let id = id.to_string();
        debug!(id = %id, generation, "starting page load");
        let spawned = thread::Builder::new()
            .name(format!("page-load-{}", generation))
            .spawn(move || {
                let page = load_page(client.as_ref(), &id);
                let _ = sender.send((generation, page));
            });
        if let Err(err) = spawned {
            warn!(error = %err, "could not spawn page loader");
            self.state = LoadState::Idle;
        }
        generation
    }

    /// Apply a finished load, if the newest one has arrived.
    pub fn poll(&mut self) -> Option<Arc<Page>> {
        let mut landed = None;
        loop {
            match self.receiver.try_recv() {
                Ok((generation, page)) => {
                    if let Some(page) = self.accept(generation, page) {
                        landed = Some(page);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        landed
    }

    /// Block until the newest load lands or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Arc<Page>> {
        let deadline = Instant::now() + timeout;
        while self.is_loading() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok((generation, page)) => {
                    if let Some(page) = self.accept(generation, page) {
                        return Some(page);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.page().cloned()
    }

    fn accept(&mut self, generation: u64, page: Page) -> Option<Arc<Page>> {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                id = %page.id,
                "dropping stale page load"
            );
            return None;
        }
        let page = Arc::new(page);
        self.state = LoadState::Loaded(Arc::clone(&page));
        Some(page)
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading { .. })
    }

    /// The loaded page. `None` while a load is in flight.
    pub fn page(&self) -> Option<&Arc<Page>> {
        match &self.state {
            LoadState::Loaded(page) => Some(page),
            _ => None,
        }
    }

    /// Id being shown or loaded.
    pub fn current_id(&self) -> Option<&str> {
        match &self.state {
            LoadState::Idle => None,
            LoadState::Loading { id } => Some(id),
            LoadState::Loaded(page) => Some(&page.id),
        }
    }
}
