//! Scripted in-memory catalog gateway
//!
//! Responses are queued per item. Each call takes the next queued response;
//! the last one repeats once the queue is down to a single entry.

use async_trait::async_trait;
use jfar_refresh::models::{ArtworkDescriptor, Item};
use jfar_refresh::services::{CatalogGateway, GatewayError, ItemQuery};
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListItems(ItemQuery),
    ListArtwork(String),
    Refresh(String),
}

#[derive(Debug, Clone)]
enum Refetch {
    Item(Item),
    Missing,
    Error(StatusCode),
}

#[derive(Debug, Clone)]
enum RefreshOutcome {
    Status(StatusCode),
    Unreachable,
}

#[derive(Debug, Default)]
struct State {
    listing_error: Option<StatusCode>,
    items: Vec<Item>,
    artwork: HashMap<String, VecDeque<Vec<ArtworkDescriptor>>>,
    refresh: HashMap<String, VecDeque<RefreshOutcome>>,
    refetch: HashMap<String, VecDeque<Refetch>>,
    calls: Vec<Call>,
}

fn next_or_last<T: Clone>(queue: Option<&mut VecDeque<T>>) -> Option<T> {
    let queue = queue?;
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[derive(Debug, Default)]
pub struct FakeGateway {
    state: Mutex<State>,
}

impl FakeGateway {
    pub fn with_items(items: Vec<Item>) -> Self {
        let gateway = Self::default();
        gateway.state.lock().unwrap().items = items;
        gateway
    }

    pub fn failing_listing(status: StatusCode) -> Self {
        let gateway = Self::default();
        gateway.state.lock().unwrap().listing_error = Some(status);
        gateway
    }

    /// Queue an artwork response for `id`
    pub fn artwork(self, id: &str, artwork: Vec<ArtworkDescriptor>) -> Self {
        self.state
            .lock()
            .unwrap()
            .artwork
            .entry(id.to_string())
            .or_default()
            .push_back(artwork);
        self
    }

    /// Queue refresh statuses for `id` (default: 204 No Content)
    pub fn refresh_statuses(self, id: &str, statuses: &[StatusCode]) -> Self {
        statuses.iter().fold(self, |gateway, status| {
            gateway.queue_refresh(id, RefreshOutcome::Status(*status))
        })
    }

    /// Queue a refresh that never reaches the server
    pub fn refresh_unreachable(self, id: &str) -> Self {
        self.queue_refresh(id, RefreshOutcome::Unreachable)
    }

    fn queue_refresh(self, id: &str, outcome: RefreshOutcome) -> Self {
        self.state
            .lock()
            .unwrap()
            .refresh
            .entry(id.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Queue the snapshot returned by the single-item re-fetch
    /// (default: the snapshot from the initial listing)
    pub fn after_refresh(self, item: Item) -> Self {
        self.queue_refetch(&item.id.clone(), Refetch::Item(item))
    }

    /// Re-fetch returns no items
    pub fn vanish_after_refresh(self, id: &str) -> Self {
        self.queue_refetch(id, Refetch::Missing)
    }

    /// Re-fetch fails with a server error
    pub fn refetch_error(self, id: &str, status: StatusCode) -> Self {
        self.queue_refetch(id, Refetch::Error(status))
    }

    fn queue_refetch(self, id: &str, refetch: Refetch) -> Self {
        self.state
            .lock()
            .unwrap()
            .refetch
            .entry(id.to_string())
            .or_default()
            .push_back(refetch);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn refresh_count(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Refresh(r) if r == id))
            .count()
    }

    pub fn artwork_count(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListArtwork(r) if r == id))
            .count()
    }

    pub fn refetch_count(&self, id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ListItems(ItemQuery::ById(r)) if r == id))
            .count()
    }
}

#[async_trait]
impl CatalogGateway for FakeGateway {
    async fn list_items(&self, query: &ItemQuery) -> Result<Vec<Item>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListItems(query.clone()));

        match query {
            ItemQuery::EpisodesReleasedSince(_) => match state.listing_error {
                Some(status) => Err(GatewayError::Server { status }),
                None => Ok(state.items.clone()),
            },
            ItemQuery::ById(id) => {
                let scripted = next_or_last(state.refetch.get_mut(id));
                match scripted {
                    Some(Refetch::Item(item)) => Ok(vec![item]),
                    Some(Refetch::Missing) => Ok(Vec::new()),
                    Some(Refetch::Error(status)) => Err(GatewayError::Server { status }),
                    None => Ok(state.items.iter().filter(|i| i.id == *id).cloned().collect()),
                }
            }
        }
    }

    async fn list_artwork(&self, item_id: &str) -> Vec<ArtworkDescriptor> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListArtwork(item_id.to_string()));
        next_or_last(state.artwork.get_mut(item_id)).unwrap_or_default()
    }

    async fn request_refresh(&self, item_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Refresh(item_id.to_string()));
        let outcome = next_or_last(state.refresh.get_mut(item_id))
            .unwrap_or(RefreshOutcome::Status(StatusCode::NO_CONTENT));
        match outcome {
            RefreshOutcome::Status(status) if status.is_success() => Ok(()),
            RefreshOutcome::Status(status) => Err(GatewayError::Server { status }),
            RefreshOutcome::Unreachable => Err(GatewayError::Transport(
                "error sending request: connection refused".to_string(),
            )),
        }
    }
}

pub fn episode(id: &str, overview: &str) -> Item {
    Item {
        id: id.to_string(),
        name: format!("Episode {id}"),
        series_name: "Test Series".to_string(),
        overview: overview.to_string(),
    }
}

pub fn art(image_type: &str, height: u32) -> ArtworkDescriptor {
    ArtworkDescriptor {
        image_type: image_type.to_string(),
        height,
    }
}
