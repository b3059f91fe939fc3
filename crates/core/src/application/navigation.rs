// Navigation Service - moves through a list and persists the session

use crate::application::lists::owned_list;
use crate::application::navigator::{Direction, LeadNavigator};
use crate::application::session_sync::{SessionSyncService, SyncOutcome};
use crate::domain::session::MAX_CALL_DELAY_SECS;
use crate::domain::{DomainError, Lead, LeadFilter, SessionState};
use crate::error::{AppError, Result};
use crate::port::{LeadListRepository, LeadRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    pub lead: Option<Lead>,
    pub index: usize,
    pub matching: usize,
    pub moved: bool,
    pub at_end: bool,
    pub session: SessionState,
    pub remote_synced: bool,
}

/// Partial settings update; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default)]
    pub filter: Option<LeadFilter>,
    #[serde(default)]
    pub shuffle: Option<bool>,
    #[serde(default)]
    pub auto_call: Option<bool>,
    #[serde(default)]
    pub call_delay_secs: Option<u32>,
}

/// Navigation Service
pub struct NavigationService {
    lead_repo: Arc<dyn LeadRepository>,
    list_repo: Arc<dyn LeadListRepository>,
    sync: Arc<SessionSyncService>,
    time_provider: Arc<dyn TimeProvider>,
}

impl NavigationService {
    pub fn new(
        lead_repo: Arc<dyn LeadRepository>,
        list_repo: Arc<dyn LeadListRepository>,
        sync: Arc<SessionSyncService>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            lead_repo,
            list_repo,
            sync,
            time_provider,
        }
    }

    /// Load the session, dropping a reference to a deleted or foreign list
    pub async fn session(&self, user_id: &str, device_id: &str) -> Result<SyncOutcome> {
        let mut outcome = self.sync.load(user_id, device_id).await?;

        if let Some(list_id) = outcome.state.list_id.clone() {
            match owned_list(self.list_repo.as_ref(), user_id, &list_id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    info!(list_id = %list_id, "Session pointed at an unavailable list, clearing");
                    outcome.state.select_list(None);
                    outcome.state = self.sync.save(outcome.state).await?.state;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    /// Point the session at a list (position resets when the list changes)
    pub async fn select_list(
        &self,
        user_id: &str,
        device_id: &str,
        list_id: &str,
    ) -> Result<NavigationResult> {
        let list = owned_list(self.list_repo.as_ref(), user_id, &list_id.to_string()).await?;

        let mut state = self.session(user_id, device_id).await?.state;
        state.select_list(Some(list.id));
        self.move_and_save(state, Direction::Current).await
    }

    /// Change filters and flags
    ///
    /// A filter or shuffle change restarts from the first lead; enabling
    /// shuffle draws a new seed.
    pub async fn update_settings(
        &self,
        user_id: &str,
        device_id: &str,
        settings: SessionSettings,
    ) -> Result<NavigationResult> {
        let mut state = self.session(user_id, device_id).await?.state;
        let mut restart = false;

        if let Some(filter) = settings.filter {
            if filter != state.filter {
                state.filter = filter;
                restart = true;
            }
        }
        if let Some(shuffle) = settings.shuffle {
            if shuffle && !state.shuffle {
                let now = self.time_provider.now_millis() as u64;
                state.shuffle_seed = now ^ rand::random::<u64>();
            }
            restart |= shuffle != state.shuffle;
            state.shuffle = shuffle;
        }
        if let Some(auto_call) = settings.auto_call {
            state.auto_call = auto_call;
        }
        if let Some(delay) = settings.call_delay_secs {
            if delay > MAX_CALL_DELAY_SECS {
                return Err(DomainError::InvalidCallDelay(delay).into());
            }
            state.call_delay_secs = delay;
        }

        if restart {
            state.current_index = 0;
        }
        self.move_and_save(state, Direction::Current).await
    }

    /// Move through the active list
    pub async fn navigate(
        &self,
        user_id: &str,
        device_id: &str,
        direction: Direction,
    ) -> Result<NavigationResult> {
        let state = self.session(user_id, device_id).await?.state;
        self.move_and_save(state, direction).await
    }

    async fn move_and_save(
        &self,
        mut state: SessionState,
        direction: Direction,
    ) -> Result<NavigationResult> {
        let list_id = state
            .list_id
            .clone()
            .ok_or_else(|| AppError::Validation("No lead list selected".to_string()))?;

        let leads = self.lead_repo.find_by_list(&list_id).await?;
        let seed = state.shuffle.then_some(state.shuffle_seed);
        let mut navigator =
            LeadNavigator::new(leads, &state.filter, seed).with_index(state.current_index);

        let moved = navigator.apply(direction);
        state.current_index = navigator.index();

        debug!(
            list_id = %list_id,
            index = state.current_index,
            matching = navigator.len(),
            moved = moved,
            "Navigated"
        );

        let saved = self.sync.save(state).await?;

        Ok(NavigationResult {
            lead: navigator.current().cloned(),
            index: navigator.index(),
            matching: navigator.len(),
            moved,
            at_end: navigator.at_end(),
            session: saved.state,
            remote_synced: saved.remote_synced,
        })
    }
}
