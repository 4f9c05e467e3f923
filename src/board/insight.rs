use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use dealboard_common::{InsightPayload, Stage};
use tokio_util::sync::CancellationToken;

use super::notice::{Notice, NoticeSender, publish};
use crate::errors::BoardError;
use crate::remote::DealBoardService;

/// An analysis attached to a card, keyed by the stage it was run for.
#[derive(Debug, Clone, PartialEq)]
pub struct CardInsight {
    pub deal_id: i64,
    pub stage: Stage,
    pub payload: InsightPayload,
    pub received_at: DateTime<Utc>,
}

impl CardInsight {
    /// The deal has moved on since the analysis was requested. Nothing
    /// re-runs it automatically.
    pub fn is_stale_for(&self, current: Stage) -> bool {
        self.stage != current
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InsightPanel {
    #[default]
    Idle,
    Loading {
        stage: Stage,
    },
    Attached(CardInsight),
    Failed {
        stage: Stage,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Attached,
    Failed,
    /// The card already has a request in flight; no new request was made.
    Busy,
    /// A later trigger or a dismissal happened first; the response was dropped.
    Superseded,
    /// The board was unmounted; the response was dropped.
    Discarded,
}

#[derive(Debug, Default)]
struct CardSlot {
    ticket: u64,
    panel: InsightPanel,
}

/// Per-card AI insight jobs.
///
/// Cards are independent: any number may be loading at once. Each trigger
/// takes the card's next ticket, and only a response carrying the card's
/// current ticket is applied, so a slow earlier response can never
/// overwrite a later one.
pub struct InsightCoordinator {
    service: Arc<dyn DealBoardService>,
    notices: NoticeSender,
    cards: Mutex<HashMap<i64, CardSlot>>,
    mounted: CancellationToken,
}

impl InsightCoordinator {
    pub fn new(service: Arc<dyn DealBoardService>, notices: NoticeSender) -> Self {
        Self {
            service,
            notices,
            cards: Mutex::new(HashMap::new()),
            mounted: CancellationToken::new(),
        }
    }

    pub fn panel(&self, deal_id: i64) -> Result<InsightPanel, BoardError> {
        Ok(self
            .cards()?
            .get(&deal_id)
            .map(|slot| slot.panel.clone())
            .unwrap_or_default())
    }

    /// False while the card's own request is in flight.
    pub fn can_trigger(&self, deal_id: i64) -> Result<bool, BoardError> {
        Ok(!matches!(self.panel(deal_id)?, InsightPanel::Loading { .. }))
    }

    pub async fn trigger(&self, deal_id: i64, stage: Stage) -> Result<TriggerOutcome, BoardError> {
        if self.mounted.is_cancelled() {
            return Ok(TriggerOutcome::Discarded);
        }
        let ticket = {
            let mut cards = self.cards()?;
            let slot = cards.entry(deal_id).or_default();
            if matches!(slot.panel, InsightPanel::Loading { .. }) {
                tracing::debug!(deal_id, "Insight already loading for card");
                return Ok(TriggerOutcome::Busy);
            }
            slot.ticket += 1;
            slot.panel = InsightPanel::Loading { stage };
            slot.ticket
        };

        tracing::debug!(deal_id, stage = %stage, ticket, "Triggering AI insight");
        let result = self.service.trigger_ai_insight(deal_id, stage).await;

        if self.mounted.is_cancelled() {
            tracing::debug!(deal_id, "Dropping insight response after unmount");
            return Ok(TriggerOutcome::Discarded);
        }
        let mut cards = self.cards()?;
        let Some(slot) = cards.get_mut(&deal_id).filter(|slot| slot.ticket == ticket) else {
            tracing::debug!(deal_id, ticket, "Dropping superseded insight response");
            return Ok(TriggerOutcome::Superseded);
        };

        match result {
            Ok(payload) => {
                slot.panel = InsightPanel::Attached(CardInsight {
                    deal_id,
                    stage,
                    payload,
                    received_at: Utc::now(),
                });
                tracing::info!(deal_id, stage = %stage, "AI insight attached");
                Ok(TriggerOutcome::Attached)
            }
            Err(e) => {
                tracing::warn!(deal_id, stage = %stage, error = %e, "AI insight failed");
                let message = e.to_string();
                slot.panel = InsightPanel::Failed {
                    stage,
                    message: message.clone(),
                };
                publish(
                    &self.notices,
                    Notice::failure(format!("AI insight failed: {}", message)),
                );
                Ok(TriggerOutcome::Failed)
            }
        }
    }

    /// Close the card's panel. Local only; a request still in flight for
    /// this card will be dropped when it returns.
    pub fn dismiss(&self, deal_id: i64) -> Result<(), BoardError> {
        if let Some(slot) = self.cards()?.get_mut(&deal_id) {
            slot.ticket += 1;
            slot.panel = InsightPanel::Idle;
        }
        Ok(())
    }

    /// Clear every card and drop all late responses.
    pub fn unmount(&self) -> Result<(), BoardError> {
        self.mounted.cancel();
        self.cards()?.clear();
        Ok(())
    }

    fn cards(&self) -> Result<MutexGuard<'_, HashMap<i64, CardSlot>>, BoardError> {
        self.cards.lock().map_err(|_| BoardError::LockPoisoned)
    }
}
