//! In-memory doubles for the storage and persistence seams.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use cursus::application::repos::{
    EnrollmentsRepo, NewEnrollmentParams, RegistrationRepo, RepoError,
};
use cursus::domain::certificates::CertificateInput;
use cursus::domain::entities::{EnrollmentRecord, ProfileRecord, RegistrationCodeRecord};
use cursus::domain::types::CertificateStatus;
use cursus::infra::storage::{ObjectStore, ObjectStoreError};

fn epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// Object store backed by a map, with switchable failure injection.
#[derive(Default)]
pub struct InMemoryStore {
    pub objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail_put: AtomicBool,
    pub fail_url: AtomicBool,
    pub put_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn object(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(ObjectStoreError::Transport(
                "injected transport failure".to_string(),
            ));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> Result<String, ObjectStoreError> {
        if self.fail_url.load(Ordering::SeqCst) {
            return Err(ObjectStoreError::MissingUrl {
                key: key.to_string(),
            });
        }
        Ok(format!("https://cdn.test/{key}"))
    }
}

pub struct EnrollmentRow {
    /// `None` models an enrollment whose student or course row is gone.
    pub input: Option<CertificateInput>,
    pub certificate_url: Option<String>,
    pub student_id: Uuid,
    pub course_id: Uuid,
}

/// Enrollments repository backed by a map. Insertion order doubles as the
/// `created_at` ordering for the missing-certificate listing.
#[derive(Default)]
pub struct InMemoryEnrollments {
    pub rows: Mutex<HashMap<String, EnrollmentRow>>,
    pub order: Mutex<Vec<String>>,
    pub fail_persist: AtomicBool,
}

impl InMemoryEnrollments {
    pub fn add(&self, id: &str, student_name: &str, course_title: &str, instructor_name: &str) {
        self.rows.lock().unwrap().insert(
            id.to_string(),
            EnrollmentRow {
                input: Some(CertificateInput {
                    enrollment_id: id.to_string(),
                    student_name: student_name.to_string(),
                    course_title: course_title.to_string(),
                    instructor_name: instructor_name.to_string(),
                }),
                certificate_url: None,
                student_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
            },
        );
        self.order.lock().unwrap().push(id.to_string());
    }

    /// Add an enrollment whose related records cannot be resolved.
    pub fn add_broken(&self, id: &str) {
        self.rows.lock().unwrap().insert(
            id.to_string(),
            EnrollmentRow {
                input: None,
                certificate_url: None,
                student_id: Uuid::new_v4(),
                course_id: Uuid::new_v4(),
            },
        );
        self.order.lock().unwrap().push(id.to_string());
    }

    pub fn url_of(&self, id: &str) -> Option<String> {
        self.rows
            .lock()
            .unwrap()
            .get(id)
            .and_then(|row| row.certificate_url.clone())
    }
}

#[async_trait]
impl EnrollmentsRepo for InMemoryEnrollments {
    async fn certificate_input(
        &self,
        enrollment_id: &str,
    ) -> Result<CertificateInput, RepoError> {
        self.rows
            .lock()
            .unwrap()
            .get(enrollment_id)
            .and_then(|row| row.input.clone())
            .ok_or(RepoError::NotFound)
    }

    async fn find_enrollment(
        &self,
        enrollment_id: &str,
    ) -> Result<Option<EnrollmentRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(enrollment_id)
            .map(|row| EnrollmentRecord {
                id: enrollment_id.to_string(),
                student_id: row.student_id,
                course_id: row.course_id,
                certificate_status: CertificateStatus::Approved,
                certificate_url: row.certificate_url.clone(),
                created_at: epoch(),
            }))
    }

    async fn set_certificate_url(&self, enrollment_id: &str, url: &str) -> Result<(), RepoError> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence(
                "injected persistence failure".to_string(),
            ));
        }
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(enrollment_id).ok_or(RepoError::NotFound)?;
        row.certificate_url = Some(url.to_string());
        Ok(())
    }

    async fn list_missing_certificates(&self, limit: u32) -> Result<Vec<String>, RepoError> {
        let rows = self.rows.lock().unwrap();
        Ok(self
            .order
            .lock()
            .unwrap()
            .iter()
            .filter(|id| {
                rows.get(id.as_str())
                    .is_some_and(|row| row.certificate_url.is_none())
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_enrollment(&self, params: NewEnrollmentParams) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&params.id) {
            return Err(RepoError::Duplicate {
                constraint: "enrollments_pkey".to_string(),
            });
        }
        rows.insert(
            params.id.clone(),
            EnrollmentRow {
                input: None,
                certificate_url: None,
                student_id: params.student_id,
                course_id: params.course_id,
            },
        );
        self.order.lock().unwrap().push(params.id);
        Ok(())
    }

    async fn health(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Registration repository backed by two maps.
#[derive(Default)]
pub struct InMemoryRegistration {
    pub codes: Mutex<HashMap<String, RegistrationCodeRecord>>,
    pub profiles: Mutex<HashMap<Uuid, ProfileRecord>>,
}

impl InMemoryRegistration {
    pub fn add_code(&self, code: &str, used: bool) {
        self.codes.lock().unwrap().insert(
            code.to_string(),
            RegistrationCodeRecord {
                code: code.to_string(),
                used,
                profile_id: None,
                created_at: epoch(),
            },
        );
    }

    pub fn add_profile(&self, id: Uuid, full_name: &str) {
        self.profiles.lock().unwrap().insert(
            id,
            ProfileRecord {
                id,
                full_name: full_name.to_string(),
                registration_code: None,
                created_at: epoch(),
            },
        );
    }

    pub fn code(&self, code: &str) -> Option<RegistrationCodeRecord> {
        self.codes.lock().unwrap().get(code).cloned()
    }

    pub fn profile(&self, id: Uuid) -> Option<ProfileRecord> {
        self.profiles.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl RegistrationRepo for InMemoryRegistration {
    async fn find_code(&self, code: &str) -> Result<Option<RegistrationCodeRecord>, RepoError> {
        Ok(self.codes.lock().unwrap().get(code).cloned())
    }

    async fn find_profile(&self, profile_id: Uuid) -> Result<Option<ProfileRecord>, RepoError> {
        Ok(self.profiles.lock().unwrap().get(&profile_id).cloned())
    }

    async fn claim_code(&self, code: &str, profile_id: Uuid) -> Result<(), RepoError> {
        let mut codes = self.codes.lock().unwrap();
        let record = codes.get_mut(code).ok_or(RepoError::NotFound)?;
        if record.used {
            return Err(RepoError::NotFound);
        }
        record.used = true;
        record.profile_id = Some(profile_id);
        Ok(())
    }

    async fn attach_code_to_profile(
        &self,
        profile_id: Uuid,
        code: &str,
    ) -> Result<(), RepoError> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.get_mut(&profile_id).ok_or(RepoError::NotFound)?;
        profile.registration_code = Some(code.to_string());
        Ok(())
    }
}
