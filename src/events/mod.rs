use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Domain events emitted after a successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ProjectCreated(Uuid),
    ProjectUpdated(Uuid),
    ProjectDeleted(Uuid),
    SurveySaved {
        project_id: Uuid,
        created: bool,
    },
    ItemsAdded {
        project_id: Uuid,
        count: usize,
    },
    ItemUpdated {
        project_id: Uuid,
        item_id: Uuid,
    },
    ItemsImported {
        project_id: Uuid,
        imported: u64,
    },
    ItemSelectionToggled {
        project_id: Uuid,
        item_id: Uuid,
        is_selected: bool,
    },
    DocumentExported {
        project_id: Uuid,
        kind: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ProjectCreated(_) => "project_created",
            Event::ProjectUpdated(_) => "project_updated",
            Event::ProjectDeleted(_) => "project_deleted",
            Event::SurveySaved { .. } => "survey_saved",
            Event::ItemsAdded { .. } => "items_added",
            Event::ItemUpdated { .. } => "item_updated",
            Event::ItemsImported { .. } => "items_imported",
            Event::ItemSelectionToggled { .. } => "item_selection_toggled",
            Event::DocumentExported { .. } => "document_exported",
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("site_survey.events", 1, "event" => event.name());
        match &event {
            Event::ItemsImported {
                project_id,
                imported,
            } => info!(project_id = %project_id, imported, "Catalog items imported"),
            Event::DocumentExported { project_id, kind } => {
                info!(project_id = %project_id, kind = %kind, "Document exported")
            }
            other => debug!(event = ?other, "Event received"),
        }
    }

    info!("Event processing loop stopped");
}
