//! In-memory backend for tests and development
//!
//! Implements every storage trait behind mutexes, plus instrumentation
//! (allocation count, recorded activity) and one-shot failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StorageError;
use crate::model::{
    ActivityEvent, ArtifactState, Certificate, Enrollment, Institution, NewCertificate, Student,
};
use crate::serial::Serial;
use crate::traits::{ActivityLog, CertificateStore, Registry, RegistryWriter, SequenceStore};

#[derive(Default)]
struct Tables {
    /// Insertion order equals sequence order for successful issuances
    certificates: Vec<Certificate>,
    institutions: HashMap<Uuid, Institution>,
    students: HashMap<Uuid, Student>,
    enrollments: HashMap<(Uuid, Uuid), Enrollment>,
    activity: Vec<ActivityEvent>,
}

/// Mutex-guarded in-memory store
#[derive(Default)]
pub struct MemoryStore {
    counter: Mutex<Option<u64>>,
    tables: Mutex<Tables>,
    allocations: AtomicU64,
    lookups: AtomicU64,
    fail_next_allocation: AtomicBool,
    fail_next_insert: AtomicBool,
    fail_activity: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `allocate_next` calls
    pub fn allocation_count(&self) -> u64 {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Number of `find_by_serial_and_roll` calls
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Make the next `allocate_next` call fail
    pub fn fail_next_allocation(&self) {
        self.fail_next_allocation.store(true, Ordering::SeqCst);
    }

    /// Make the next `insert_certificate` call fail
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Make every activity-log write fail until switched off
    pub fn set_activity_failing(&self, failing: bool) {
        self.fail_activity.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of everything recorded through `ActivityLog`
    pub fn activity(&self) -> Vec<ActivityEvent> {
        self.tables().map(|t| t.activity.clone()).unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("lock poisoned".into()))
    }
}

impl SequenceStore for MemoryStore {
    fn allocate_next(&self) -> Result<u64, StorageError> {
        let mut counter = self
            .counter
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("lock poisoned".into()))?;

        if self.fail_next_allocation.swap(false, Ordering::SeqCst) {
            return Err(StorageError::TransactionFailed(
                "injected allocation failure".into(),
            ));
        }

        let next = match *counter {
            None => 1,
            Some(last) => last.checked_add(1).ok_or_else(|| {
                StorageError::Corruption(format!("sequence counter at {} cannot advance", last))
            })?,
        };
        *counter = Some(next);
        self.allocations.fetch_add(1, Ordering::SeqCst);
        Ok(next)
    }

    fn current(&self) -> Result<Option<u64>, StorageError> {
        let counter = self
            .counter
            .lock()
            .map_err(|_| StorageError::ConnectionFailed("lock poisoned".into()))?;
        Ok(*counter)
    }
}

impl CertificateStore for MemoryStore {
    fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate, StorageError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(StorageError::QueryFailed("injected insert failure".into()));
        }

        let mut tables = self.tables()?;
        if tables
            .certificates
            .iter()
            .any(|c| c.serial == new.serial || c.sequence_number == new.sequence_number)
        {
            return Err(StorageError::Conflict(format!(
                "certificates.serial {}",
                new.serial
            )));
        }
        if !tables.students.contains_key(&new.student_id)
            || !tables.institutions.contains_key(&new.institution_id)
        {
            return Err(StorageError::Conflict("FOREIGN KEY constraint failed".into()));
        }

        let certificate = new.into_certificate(Uuid::new_v4(), chrono::Utc::now());
        tables.certificates.push(certificate.clone());
        Ok(certificate)
    }

    fn get_certificate(&self, id: &Uuid) -> Result<Option<Certificate>, StorageError> {
        let tables = self.tables()?;
        Ok(tables.certificates.iter().find(|c| &c.id == id).cloned())
    }

    fn find_by_serial_and_roll(
        &self,
        serial: &Serial,
        roll_number: &str,
    ) -> Result<Option<Certificate>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables()?;
        Ok(tables
            .certificates
            .iter()
            .find(|c| &c.serial == serial && c.roll_number.as_str() == roll_number)
            .cloned())
    }

    fn set_shareable(
        &self,
        id: &Uuid,
        shareable: bool,
    ) -> Result<Option<Certificate>, StorageError> {
        let mut tables = self.tables()?;
        Ok(tables
            .certificates
            .iter_mut()
            .find(|c| &c.id == id)
            .map(|c| {
                c.is_publicly_shareable = shareable;
                c.clone()
            }))
    }

    fn update_artifact(&self, id: &Uuid, state: &ArtifactState) -> Result<bool, StorageError> {
        let mut tables = self.tables()?;
        match tables.certificates.iter_mut().find(|c| &c.id == id) {
            Some(c) if !c.artifact.is_ready() => {
                c.artifact = state.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn record_artifact_failure(
        &self,
        id: &Uuid,
        error: &str,
    ) -> Result<Option<u32>, StorageError> {
        let mut tables = self.tables()?;
        let Some(c) = tables.certificates.iter_mut().find(|c| &c.id == id) else {
            return Ok(None);
        };
        Ok(c.artifact.after_failure(error).map(|next| {
            c.artifact = next;
            c.artifact.attempts()
        }))
    }

    fn pending_artifacts(
        &self,
        limit: usize,
        max_attempts: u32,
    ) -> Result<Vec<Certificate>, StorageError> {
        let tables = self.tables()?;
        let mut pending: Vec<Certificate> = tables
            .certificates
            .iter()
            .filter(|c| !c.artifact.is_ready() && c.artifact.attempts() < max_attempts)
            .cloned()
            .collect();
        pending.sort_by_key(|c| c.sequence_number);
        pending.truncate(limit);
        Ok(pending)
    }

    fn list_by_institution(&self, institution_id: &Uuid) -> Result<Vec<Certificate>, StorageError> {
        let tables = self.tables()?;
        Ok(newest_first(
            tables
                .certificates
                .iter()
                .filter(|c| &c.institution_id == institution_id),
        ))
    }

    fn list_by_student(&self, student_id: &Uuid) -> Result<Vec<Certificate>, StorageError> {
        let tables = self.tables()?;
        Ok(newest_first(
            tables
                .certificates
                .iter()
                .filter(|c| &c.student_id == student_id),
        ))
    }

    fn count_certificates(&self) -> Result<u64, StorageError> {
        Ok(self.tables()?.certificates.len() as u64)
    }

    fn is_healthy(&self) -> bool {
        self.tables().is_ok()
    }
}

fn newest_first<'a>(certs: impl Iterator<Item = &'a Certificate>) -> Vec<Certificate> {
    let mut out: Vec<Certificate> = certs.cloned().collect();
    out.sort_by(|a, b| b.sequence_number.cmp(&a.sequence_number));
    out
}

impl Registry for MemoryStore {
    fn get_institution(&self, id: &Uuid) -> Result<Option<Institution>, StorageError> {
        Ok(self.tables()?.institutions.get(id).cloned())
    }

    fn get_student(&self, id: &Uuid) -> Result<Option<Student>, StorageError> {
        Ok(self.tables()?.students.get(id).cloned())
    }

    fn get_enrollment(
        &self,
        student_id: &Uuid,
        institution_id: &Uuid,
    ) -> Result<Option<Enrollment>, StorageError> {
        Ok(self
            .tables()?
            .enrollments
            .get(&(*student_id, *institution_id))
            .cloned())
    }

    fn count_institutions(&self) -> Result<u64, StorageError> {
        Ok(self.tables()?.institutions.len() as u64)
    }

    fn count_students(&self) -> Result<u64, StorageError> {
        Ok(self.tables()?.students.len() as u64)
    }
}

impl RegistryWriter for MemoryStore {
    fn upsert_institution(&self, institution: &Institution) -> Result<(), StorageError> {
        self.tables()?
            .institutions
            .insert(institution.id, institution.clone());
        Ok(())
    }

    fn upsert_student(&self, student: &Student) -> Result<(), StorageError> {
        self.tables()?.students.insert(student.id, student.clone());
        Ok(())
    }

    fn upsert_enrollment(&self, enrollment: &Enrollment) -> Result<(), StorageError> {
        let mut tables = self.tables()?;
        if !tables.students.contains_key(&enrollment.student_id)
            || !tables.institutions.contains_key(&enrollment.institution_id)
        {
            return Err(StorageError::Conflict("FOREIGN KEY constraint failed".into()));
        }
        tables.enrollments.insert(
            (enrollment.student_id, enrollment.institution_id),
            enrollment.clone(),
        );
        Ok(())
    }

    fn set_issuing_capability(
        &self,
        institution_id: &Uuid,
        enabled: bool,
    ) -> Result<bool, StorageError> {
        let mut tables = self.tables()?;
        Ok(match tables.institutions.get_mut(institution_id) {
            Some(inst) => {
                inst.can_issue_certificates = enabled;
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl ActivityLog for MemoryStore {
    async fn record(&self, event: ActivityEvent) -> Result<(), StorageError> {
        if self.fail_activity.load(Ordering::SeqCst) {
            return Err(StorageError::QueryFailed("injected activity failure".into()));
        }
        self.tables()?.activity.push(event);
        Ok(())
    }
}
