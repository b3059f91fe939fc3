// Lead Service - paging, call bookkeeping, statistics

use crate::application::lists::owned_list;
use crate::domain::{Lead, LeadFilter, LeadId, ListId, Timezone};
use crate::error::{AppError, Result};
use crate::port::{LeadListRepository, LeadRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

/// One page of filtered leads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadPage {
    pub items: Vec<Lead>,
    /// Leads in the list
    pub total: usize,
    /// Leads matching the filter
    pub matching: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Call progress of a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStats {
    pub total: i64,
    pub called: i64,
    pub not_called: i64,
    pub total_calls: i64,
    pub by_timezone: BTreeMap<Timezone, i64>,
}

impl ListStats {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let mut stats = ListStats {
            total: leads.len() as i64,
            ..Default::default()
        };
        for lead in leads {
            if lead.is_called() {
                stats.called += 1;
            }
            stats.total_calls += lead.call_count;
            *stats.by_timezone.entry(lead.timezone).or_insert(0) += 1;
        }
        stats.not_called = stats.total - stats.called;
        stats
    }
}

/// Load a lead whose list belongs to `user_id`; anything else is reported as missing
pub(crate) async fn owned_lead(
    lead_repo: &dyn LeadRepository,
    list_repo: &dyn LeadListRepository,
    user_id: &str,
    lead_id: &LeadId,
) -> Result<Lead> {
    let not_found = || AppError::NotFound(format!("Lead {} not found", lead_id));
    let lead = lead_repo.find_by_id(lead_id).await?.ok_or_else(not_found)?;
    match list_repo.find_by_id(&lead.list_id).await? {
        Some(list) if list.user_id == user_id => Ok(lead),
        _ => Err(not_found()),
    }
}

/// Lead Service
///
/// Every operation is scoped to the calling user.
pub struct LeadService {
    lead_repo: Arc<dyn LeadRepository>,
    list_repo: Arc<dyn LeadListRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl LeadService {
    pub fn new(
        lead_repo: Arc<dyn LeadRepository>,
        list_repo: Arc<dyn LeadListRepository>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            lead_repo,
            list_repo,
            time_provider,
        }
    }

    /// Page through a list with a filter (import order)
    pub async fn page(
        &self,
        user_id: &str,
        list_id: &ListId,
        filter: &LeadFilter,
        offset: usize,
        limit: usize,
    ) -> Result<LeadPage> {
        owned_list(self.list_repo.as_ref(), user_id, list_id).await?;

        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let leads = self.lead_repo.find_by_list(list_id).await?;
        let total = leads.len();

        let matching: Vec<Lead> = leads.into_iter().filter(|l| filter.matches(l)).collect();
        let count = matching.len();
        let items = matching.into_iter().skip(offset).take(limit).collect();

        Ok(LeadPage {
            items,
            total,
            matching: count,
            offset,
            limit,
        })
    }

    pub async fn get(&self, user_id: &str, lead_id: &LeadId) -> Result<Lead> {
        owned_lead(
            self.lead_repo.as_ref(),
            self.list_repo.as_ref(),
            user_id,
            lead_id,
        )
        .await
    }

    /// Register a call attempt on a lead
    pub async fn record_call(&self, user_id: &str, lead_id: &LeadId) -> Result<Lead> {
        let mut lead = self.get(user_id, lead_id).await?;
        lead.record_call(self.time_provider.now_millis());
        self.lead_repo.update_calls(&lead).await?;

        info!(lead_id = %lead.id, call_count = lead.call_count, "Call recorded");
        Ok(lead)
    }

    /// Clear call bookkeeping of one lead
    pub async fn reset_lead(&self, user_id: &str, lead_id: &LeadId) -> Result<Lead> {
        let mut lead = self.get(user_id, lead_id).await?;
        lead.reset_calls();
        self.lead_repo.update_calls(&lead).await?;
        Ok(lead)
    }

    /// Clear call bookkeeping of a whole list
    pub async fn reset_calls(&self, user_id: &str, list_id: &ListId) -> Result<u64> {
        owned_list(self.list_repo.as_ref(), user_id, list_id).await?;

        let reset = self.lead_repo.reset_calls(list_id).await?;
        info!(list_id = %list_id, reset = reset, "Call history reset");
        Ok(reset)
    }

    pub async fn stats(&self, user_id: &str, list_id: &ListId) -> Result<ListStats> {
        owned_list(self.list_repo.as_ref(), user_id, list_id).await?;

        let leads = self.lead_repo.find_by_list(list_id).await?;
        Ok(ListStats::from_leads(&leads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LeadList;
    use crate::port::lead_repository::{MockLeadListRepository, MockLeadRepository};
    use crate::port::time_provider::FixedTimeProvider;
    use tokio_test::assert_err;

    fn service(leads: MockLeadRepository) -> LeadService {
        let mut lists = MockLeadListRepository::new();
        lists
            .expect_find_by_id()
            .returning(|id| Ok(Some(LeadList::new(id.clone(), "u1", "Prospects", "p.csv", 0))));
        LeadService::new(
            Arc::new(leads),
            Arc::new(lists),
            Arc::new(FixedTimeProvider::new(1_000)),
        )
    }

    #[tokio::test]
    async fn test_record_call_on_own_lead() {
        let mut leads = MockLeadRepository::new();
        leads
            .expect_find_by_id()
            .returning(|id| Ok(Some(Lead::new(id.clone(), "l1", 0, "Ada", "2125550100", 0))));
        leads.expect_update_calls().times(1).returning(|_| Ok(()));

        let lead = service(leads)
            .record_call("u1", &"a".to_string())
            .await
            .unwrap();
        assert_eq!(lead.call_count, 1);
        assert_eq!(lead.last_called_at, Some(1_000));
    }

    #[tokio::test]
    async fn test_other_users_leads_are_not_found() {
        let mut leads = MockLeadRepository::new();
        leads
            .expect_find_by_id()
            .returning(|id| Ok(Some(Lead::new(id.clone(), "l1", 0, "Ada", "2125550100", 0))));
        leads.expect_update_calls().never();
        leads.expect_reset_calls().never();
        leads.expect_find_by_list().never();
        let service = service(leads);

        let err = assert_err!(service.record_call("u2", &"a".to_string()).await);
        assert_eq!(err.to_string(), "Not found: Lead a not found");
        assert_err!(service.reset_lead("u2", &"a".to_string()).await);
        assert_err!(service.reset_calls("u2", &"l1".to_string()).await);
        assert_err!(service.stats("u2", &"l1".to_string()).await);
        assert_err!(
            service
                .page("u2", &"l1".to_string(), &LeadFilter::default(), 0, 10)
                .await
        );
    }

    #[test]
    fn test_stats_from_leads() {
        let mut a = Lead::new("a", "l", 0, "A", "2125550100", 0);
        let b = Lead::new("b", "l", 1, "B", "4155550100", 0);
        let c = Lead::new("c", "l", 2, "C", "2125550101", 0);
        a.record_call(1);
        a.record_call(2);

        let stats = ListStats::from_leads(&[a, b, c]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.called, 1);
        assert_eq!(stats.not_called, 2);
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.by_timezone.get(&Timezone::Eastern), Some(&2));
        assert_eq!(stats.by_timezone.get(&Timezone::Pacific), Some(&1));
    }
}
