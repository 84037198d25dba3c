use std::sync::Arc;

use crate::application::certificates::CertificateService;
use crate::application::payments::PaymentService;
use crate::application::registration::RegistrationService;
use crate::application::repos::EnrollmentsRepo;

#[derive(Clone)]
pub struct ApiState {
    pub certificates: Arc<CertificateService>,
    pub payments: Arc<PaymentService>,
    pub registration: Arc<RegistrationService>,
    pub enrollments: Arc<dyn EnrollmentsRepo>,
}
