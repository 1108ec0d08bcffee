//! Async driver for [`ListViewModel`].

use tracing::{info, warn};

use super::{ApplyOutcome, FetchCommand, ListViewModel};
use crate::client::{ClientResult, PatientCollection};
use crate::models::SortField;

/// Runs list transitions against a collection, one at a time.
pub struct ListController<C> {
    collection: C,
    model: ListViewModel,
}

impl<C: PatientCollection> ListController<C> {
    pub fn new(collection: C) -> Self {
        Self::with_model(collection, ListViewModel::new())
    }

    pub fn with_model(collection: C, model: ListViewModel) -> Self {
        Self { collection, model }
    }

    pub fn model(&self) -> &ListViewModel {
        &self.model
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub async fn refresh(&mut self) {
        let command = self.model.refresh();
        self.execute(command).await;
    }

    pub async fn set_search(&mut self, text: impl Into<String>) {
        let command = self.model.set_search(text);
        self.execute(command).await;
    }

    pub async fn set_sort(&mut self, field: SortField) {
        let command = self.model.set_sort(field);
        self.execute(command).await;
    }

    pub async fn set_page(&mut self, page: u32) {
        let command = self.model.set_page(page);
        self.execute(command).await;
    }

    pub async fn next_page(&mut self) {
        let command = self.model.next_page();
        self.execute(command).await;
    }

    pub async fn previous_page(&mut self) {
        let command = self.model.previous_page();
        self.execute(command).await;
    }

    /// Delete a patient and refresh the list.
    ///
    /// On failure the displayed list is left untouched and the error is
    /// returned for the caller to show.
    pub async fn delete(&mut self, patient_id: &str) -> ClientResult<()> {
        if let Err(e) = self.collection.delete(patient_id).await {
            warn!(patient_id, error = %e, "delete failed");
            return Err(e);
        }
        info!(patient_id, "patient deleted");
        self.refresh().await;
        Ok(())
    }

    /// Run a command, following clamp refetches until one is applied or dropped.
    pub async fn execute(&mut self, command: FetchCommand) {
        let mut command = command;
        loop {
            let outcome = command.run(&self.collection).await;
            match self.model.apply(outcome) {
                ApplyOutcome::Refetch(next) => command = next,
                ApplyOutcome::Applied | ApplyOutcome::Stale => break,
            }
        }
    }
}
