use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationId, JobListing, JobListingId, NewApplication, NewJobListing,
};

/// Storage abstraction for application records.
pub trait ApplicationRepository: Send + Sync {
    fn create(&self, draft: NewApplication) -> Result<Application, RepositoryError>;
    fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_by(
        &self,
        predicate: &dyn Fn(&Application) -> bool,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn update(&self, record: Application) -> Result<(), RepositoryError>;
    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
}

/// Storage abstraction for job listings.
pub trait JobListingRepository: Send + Sync {
    fn create(&self, draft: NewJobListing, at: DateTime<Utc>)
        -> Result<JobListing, RepositoryError>;
    fn find_by_id(&self, id: JobListingId) -> Result<Option<JobListing>, RepositoryError>;
    fn list(&self) -> Result<Vec<JobListing>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Table<K, V> {
    next_id: u64,
    rows: BTreeMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
}

/// Process-local application store. Identifiers start at 1 and are never reused.
#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    table: Arc<Mutex<Table<ApplicationId, Application>>>,
}

impl InMemoryApplicationRepository {
    pub fn len(&self) -> usize {
        self.table.lock().map(|table| table.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn create(&self, draft: NewApplication) -> Result<Application, RepositoryError> {
        let mut table = lock(&self.table)?;
        let id = ApplicationId(table.allocate());
        let record = Application {
            id,
            full_name: draft.full_name,
            phone: draft.phone,
            email: draft.email,
            position: draft.position,
            work_experience: draft.work_experience,
            status: draft.status,
            job_listing_id: draft.job_listing_id,
            created_at: draft.created_at,
            updated_at: draft.created_at,
        };
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.rows.get(&id).cloned())
    }

    fn find_by(
        &self,
        predicate: &dyn Fn(&Application) -> bool,
    ) -> Result<Vec<Application>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table
            .rows
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect())
    }

    fn update(&self, record: Application) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table)?;
        match table.rows.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut table = lock(&self.table)?;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.rows.values().cloned().collect())
    }
}

/// Process-local job listing store.
#[derive(Default, Clone)]
pub struct InMemoryJobListingRepository {
    table: Arc<Mutex<Table<JobListingId, JobListing>>>,
}

impl JobListingRepository for InMemoryJobListingRepository {
    fn create(
        &self,
        draft: NewJobListing,
        at: DateTime<Utc>,
    ) -> Result<JobListing, RepositoryError> {
        let mut table = lock(&self.table)?;
        let id = JobListingId(table.allocate());
        let listing = JobListing {
            id,
            title: draft.title,
            location: draft.location,
            description: draft.description,
            created_at: at,
            updated_at: at,
        };
        table.rows.insert(id, listing.clone());
        Ok(listing)
    }

    fn find_by_id(&self, id: JobListingId) -> Result<Option<JobListing>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<JobListing>, RepositoryError> {
        let table = lock(&self.table)?;
        Ok(table.rows.values().cloned().collect())
    }
}
