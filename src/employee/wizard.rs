//! Employee wizard: verifies an invitation, collects personal details and
//! builds the employee's profile.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::OnboardingConfig;
use crate::error::StepError;
use crate::services::{IdentityService, ImageEncoder, ImageFile, encode_upload};
use crate::wizard::{FieldErrors, StepView, TaskState, Transition, WizardController, WizardState};

use super::flow::{EmployeeFlow, validate_invitation_code};
use super::model::{
    EmployeeDetailsPatch, EmployeePatch, EmployeeStep, EmployeeSummary, Invitation, SocialPlatform,
    fields,
};

pub struct EmployeeWizard {
    controller: WizardController<EmployeeFlow>,
    identity: Arc<dyn IdentityService>,
    encoder: Arc<dyn ImageEncoder>,
    config: OnboardingConfig,
}

impl EmployeeWizard {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        encoder: Arc<dyn ImageEncoder>,
        config: OnboardingConfig,
    ) -> Self {
        Self {
            controller: WizardController::new(),
            identity,
            encoder,
            config,
        }
    }

    pub async fn state(&self) -> WizardState<EmployeeFlow> {
        self.controller.snapshot().await
    }

    pub async fn view(&self) -> StepView<EmployeeStep> {
        self.controller.view().await
    }

    pub async fn step(&self) -> EmployeeStep {
        self.controller.active_step().await
    }

    pub async fn summary(&self) -> EmployeeSummary {
        self.controller
            .read(|state| EmployeeSummary::from_data(&state.data))
            .await
    }

    /// The verified invitation, once verification succeeded.
    pub async fn invitation(&self) -> Option<Invitation> {
        self.controller
            .read(|state| state.data.verified_invitation().cloned())
            .await
    }

    pub async fn is_complete(&self) -> bool {
        self.controller.read(|state| state.data.is_complete).await
    }

    pub async fn set_invitation_code(&self, code: impl Into<String>) {
        self.controller
            .update(EmployeePatch::InvitationCode(code.into()))
            .await;
    }

    /// Look up the invitation behind `code`.
    ///
    /// A blank code is rejected immediately. Otherwise the lookup runs in
    /// the background; on failure the error is shown under the code input
    /// and the wizard stays on the invitation step.
    pub async fn verify_invitation(&mut self, code: &str) -> Result<(), StepError> {
        self.set_invitation_code(code).await;
        if let Err(err) = validate_invitation_code(code) {
            self.controller.set_field_error(err.field(), err.to_string()).await;
            return Err(err);
        }

        self.controller
            .update(EmployeePatch::Invitation(TaskState::Pending))
            .await;

        let identity = Arc::clone(&self.identity);
        let code = code.trim().to_string();
        debug!(code = %code, "Verifying invitation");
        self.controller.spawn(
            "invitation_check",
            async move { identity.get_invitation_details(&code).await },
            |store, result| match result {
                Ok(invitation) => {
                    info!(
                        invite_id = %invitation.invite_id,
                        organization = %invitation.organization_name,
                        "Invitation verified"
                    );
                    store.update_step_data(EmployeePatch::Invitation(TaskState::Succeeded(
                        invitation,
                    )));
                }
                Err(e) => {
                    let err = StepError::from_service(
                        fields::INVITATION_CODE,
                        e,
                        "Invalid invitation code",
                    );
                    store.update_step_data(EmployeePatch::Invitation(TaskState::Failed(
                        err.to_string(),
                    )));
                    store.set_field_error(fields::INVITATION_CODE, err.to_string());
                }
            },
        );
        Ok(())
    }

    pub async fn update_details(&self, patch: EmployeeDetailsPatch) {
        self.controller.update(EmployeePatch::Details(patch)).await;
    }

    /// Add a skill. Returns `false` when it was blank or already listed.
    pub async fn add_skill(&self, skill: &str) -> bool {
        !self
            .controller
            .update(EmployeePatch::AddSkill(skill.to_string()))
            .await
            .is_empty()
    }

    pub async fn remove_skill(&self, skill: impl Into<String>) {
        self.controller
            .update(EmployeePatch::RemoveSkill(skill.into()))
            .await;
    }

    /// Set the link for `platform`; an empty url removes it.
    pub async fn update_social_link(&self, platform: SocialPlatform, url: impl Into<String>) {
        self.controller
            .update(EmployeePatch::SocialLink {
                platform,
                url: url.into(),
            })
            .await;
    }

    /// Encode `file` as the profile photo.
    pub async fn upload_photo(&mut self, file: ImageFile) {
        self.controller
            .update(EmployeePatch::PhotoUpload(TaskState::Pending))
            .await;

        let encoder = Arc::clone(&self.encoder);
        let latency = self.config.upload_latency;
        debug!(file = %file.name, size = file.bytes.len(), "Uploading profile photo");
        self.controller.spawn(
            "photo_upload",
            encode_upload(encoder, file, latency),
            |store, result| match result {
                Ok(image) => {
                    store.update_step_data(EmployeePatch::PhotoUpload(TaskState::Succeeded(image)));
                }
                Err(e) => {
                    let err =
                        StepError::from_service(fields::PROFILE_IMAGE, e, "Could not upload image");
                    store.update_step_data(EmployeePatch::PhotoUpload(TaskState::Failed(
                        err.to_string(),
                    )));
                    store.set_field_error(fields::PROFILE_IMAGE, err.to_string());
                }
            },
        );
    }

    /// Validate the active step and advance.
    ///
    /// Leaving the invitation step accepts the invitation with the identity
    /// service; reaching the last step marks onboarding complete.
    pub async fn next(&self) -> Transition {
        if self.step().await == EmployeeStep::InvitationCheck {
            if let Err(err) = self.ensure_accepted().await {
                let errors: FieldErrors = [err].into_iter().collect();
                self.controller.set_errors(errors.clone()).await;
                return Transition::Blocked { errors };
            }
        }

        let transition = self.controller.next().await;
        if transition.moved() && self.step().await == EmployeeStep::Completion {
            self.controller.update(EmployeePatch::Complete(true)).await;
            info!("Employee onboarding complete");
        }
        transition
    }

    pub async fn back(&self) -> Transition {
        self.controller.back().await
    }

    async fn ensure_accepted(&self) -> Result<(), StepError> {
        let (invitation, accepted) = self
            .controller
            .read(|state| {
                (
                    state.data.verified_invitation().cloned(),
                    state.data.is_accepted(),
                )
            })
            .await;
        // Unverified invitations are reported by the step validator.
        let Some(invitation) = invitation else {
            return Ok(());
        };
        if accepted {
            return Ok(());
        }

        self.identity
            .accept_invitation(&invitation.invite_id)
            .await
            .map_err(|e| StepError::from_service(fields::FORM, e, "Failed to accept invitation"))?;
        info!(invite_id = %invitation.invite_id, "Invitation accepted");
        self.controller
            .update(EmployeePatch::Accepted(invitation.invite_id))
            .await;
        Ok(())
    }

    pub fn exit_target(&self) -> &str {
        &self.config.dashboard_route
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.controller.tasks_in_flight()
    }

    pub async fn join_pending(&mut self) {
        self.controller.join_pending().await;
    }

    pub async fn reset(&self) {
        self.controller.reset().await;
    }
}
