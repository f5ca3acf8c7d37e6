use std::sync::Arc;
use crate::domain::ports::{
    AuditSink, ClaimRepository, IdentityFormRepository, InvitationRepository,
    LessonRepository, SeatRepository,
};
use crate::domain::services::claim_service::ClaimService;
use crate::domain::services::identity_service::IdentityFormService;
use crate::domain::services::invitation_service::InvitationService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub lesson_repo: Arc<dyn LessonRepository>,
    pub seat_repo: Arc<dyn SeatRepository>,
    pub invitation_repo: Arc<dyn InvitationRepository>,
    pub identity_form_repo: Arc<dyn IdentityFormRepository>,
    pub claim_repo: Arc<dyn ClaimRepository>,
    pub invitation_service: Arc<InvitationService>,
    pub identity_service: Arc<IdentityFormService>,
    pub claim_service: Arc<ClaimService>,
    pub audit_sink: Arc<dyn AuditSink>,
}
