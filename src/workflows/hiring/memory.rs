use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    Application, ApplicationId, Interview, InterviewFeedback, InterviewId, JobRequisition, Offer,
    OfferId, RequisitionId, Stage,
};
use super::repository::{
    IntentError, IntentSink, OutboundIntent, PipelineRepository, RepositoryError, Versioned,
    WriteSet,
};

/// In-memory reference adapter for the repository port. A single mutex over
/// the whole store gives commits their all-or-nothing semantics.
#[derive(Default, Clone)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
}

#[derive(Default)]
struct Store {
    requisitions: HashMap<RequisitionId, Versioned<JobRequisition>>,
    applications: HashMap<ApplicationId, Versioned<Application>>,
    interviews: HashMap<InterviewId, Versioned<Interview>>,
    feedback: Vec<InterviewFeedback>,
    offers: HashMap<OfferId, Versioned<Offer>>,
}

impl Store {
    fn check_revisions(&self, writes: &WriteSet) -> Result<(), RepositoryError> {
        if let Some(requisition) = &writes.requisition {
            check(
                self.requisitions.get(&requisition.entity.id),
                requisition.revision,
                "requisition",
            )?;
        }
        if let Some(application) = &writes.application {
            check(
                self.applications.get(&application.entity.id),
                application.revision,
                "application",
            )?;
        }
        if let Some(interview) = &writes.interview {
            check(
                self.interviews.get(&interview.entity.id),
                interview.revision,
                "interview",
            )?;
        }
        if let Some(offer) = &writes.offer {
            check(self.offers.get(&offer.entity.id), offer.revision, "offer")?;
        }
        Ok(())
    }

    fn check_uniqueness(&self, writes: &WriteSet) -> Result<(), RepositoryError> {
        if let Some(interview) = &writes.new_interview {
            if self.interviews.contains_key(&interview.id) {
                return Err(RepositoryError::Conflict);
            }
            let occupied = self.interviews.values().any(|existing| {
                existing.entity.application_id == interview.application_id
                    && existing.entity.stage == interview.stage
                    && existing.entity.status.occupies_slot()
            });
            if occupied {
                return Err(RepositoryError::Conflict);
            }
        }
        if let Some(feedback) = &writes.new_feedback {
            let duplicate = self.feedback.iter().any(|existing| {
                existing.interview_id == feedback.interview_id
                    && existing.interviewer == feedback.interviewer
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
        }
        if let Some(offer) = &writes.new_offer {
            if self.offers.contains_key(&offer.id) {
                return Err(RepositoryError::Conflict);
            }
        }
        Ok(())
    }

    fn apply(&mut self, writes: WriteSet) {
        if let Some(requisition) = writes.requisition {
            self.requisitions.insert(
                requisition.entity.id.clone(),
                Versioned::new(requisition.entity, requisition.revision + 1),
            );
        }
        if let Some(application) = writes.application {
            self.applications.insert(
                application.entity.id.clone(),
                Versioned::new(application.entity, application.revision + 1),
            );
        }
        if let Some(interview) = writes.interview {
            self.interviews.insert(
                interview.entity.id.clone(),
                Versioned::new(interview.entity, interview.revision + 1),
            );
        }
        if let Some(offer) = writes.offer {
            self.offers.insert(
                offer.entity.id.clone(),
                Versioned::new(offer.entity, offer.revision + 1),
            );
        }
        if let Some(interview) = writes.new_interview {
            self.interviews
                .insert(interview.id.clone(), Versioned::new(interview, 1));
        }
        if let Some(offer) = writes.new_offer {
            self.offers.insert(offer.id.clone(), Versioned::new(offer, 1));
        }
        if let Some(feedback) = writes.new_feedback {
            self.feedback.push(feedback);
        }
    }
}

fn check<T>(
    stored: Option<&Versioned<T>>,
    expected: u64,
    entity: &'static str,
) -> Result<(), RepositoryError> {
    match stored {
        Some(current) if current.revision == expected => Ok(()),
        Some(_) => Err(RepositoryError::RevisionConflict { entity }),
        None => Err(RepositoryError::NotFound),
    }
}

impl PipelineRepository for MemoryRepository {
    fn insert_requisition(
        &self,
        requisition: JobRequisition,
    ) -> Result<Versioned<JobRequisition>, RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        if store.requisitions.contains_key(&requisition.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = Versioned::new(requisition, 1);
        store
            .requisitions
            .insert(record.entity.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_requisition(
        &self,
        id: &RequisitionId,
    ) -> Result<Option<Versioned<JobRequisition>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.requisitions.get(id).cloned())
    }

    fn insert_application(
        &self,
        application: Application,
    ) -> Result<Versioned<Application>, RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        if store.applications.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        let record = Versioned::new(application, 1);
        store
            .applications
            .insert(record.entity.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch_application(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<Versioned<Application>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.applications.get(id).cloned())
    }

    fn fetch_interview(
        &self,
        id: &InterviewId,
    ) -> Result<Option<Versioned<Interview>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.interviews.get(id).cloned())
    }

    fn active_interview(
        &self,
        application_id: &ApplicationId,
        stage: Stage,
    ) -> Result<Option<Versioned<Interview>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .interviews
            .values()
            .find(|record| {
                record.entity.application_id == *application_id
                    && record.entity.stage == stage
                    && record.entity.status.occupies_slot()
            })
            .cloned())
    }

    fn feedback_for(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Vec<InterviewFeedback>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .feedback
            .iter()
            .filter(|record| record.interview_id == *interview_id)
            .cloned()
            .collect())
    }

    fn fetch_offer(&self, id: &OfferId) -> Result<Option<Versioned<Offer>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store.offers.get(id).cloned())
    }

    fn offers_for(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<Versioned<Offer>>, RepositoryError> {
        let store = self.store.lock().expect("repository mutex poisoned");
        Ok(store
            .offers
            .values()
            .filter(|record| record.entity.application_id == *application_id)
            .cloned()
            .collect())
    }

    fn commit(&self, writes: WriteSet) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().expect("repository mutex poisoned");
        store.check_revisions(&writes)?;
        store.check_uniqueness(&writes)?;
        store.apply(writes);
        Ok(())
    }
}

/// In-memory intent sink recording dispatched intents for inspection.
#[derive(Default, Clone)]
pub struct MemoryIntentSink {
    events: Arc<Mutex<Vec<OutboundIntent>>>,
}

impl MemoryIntentSink {
    pub fn events(&self) -> Vec<OutboundIntent> {
        self.events.lock().expect("intent mutex poisoned").clone()
    }
}

impl IntentSink for MemoryIntentSink {
    fn dispatch(&self, intent: OutboundIntent) -> Result<(), IntentError> {
        self.events
            .lock()
            .expect("intent mutex poisoned")
            .push(intent);
        Ok(())
    }
}
