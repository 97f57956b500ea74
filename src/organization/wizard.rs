//! Organization wizard: creates an organization, brands it and invites
//! members.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::OnboardingConfig;
use crate::error::StepError;
use crate::services::{IdentityService, ImageEncoder, ImageFile, encode_upload};
use crate::wizard::{FieldErrors, StepView, TaskState, Transition, WizardController, WizardState};

use super::flow::{OrganizationFlow, validate_member_email, validate_organization_details};
use super::model::{
    CreatedOrganization, Member, MemberRole, OrganizationData, OrganizationDetailsPatch,
    OrganizationPatch, OrganizationStep, OrganizationSummary, fields,
};

pub struct OrganizationWizard {
    controller: WizardController<OrganizationFlow>,
    identity: Arc<dyn IdentityService>,
    encoder: Arc<dyn ImageEncoder>,
    config: OnboardingConfig,
}

impl OrganizationWizard {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        encoder: Arc<dyn ImageEncoder>,
        config: OnboardingConfig,
    ) -> Self {
        let data = OrganizationData {
            user_name: config.default_user_name.clone().unwrap_or_default(),
            ..Default::default()
        };
        Self {
            controller: WizardController::with_data(data),
            identity,
            encoder,
            config,
        }
    }

    pub async fn state(&self) -> WizardState<OrganizationFlow> {
        self.controller.snapshot().await
    }

    pub async fn view(&self) -> StepView<OrganizationStep> {
        self.controller.view().await
    }

    pub async fn step(&self) -> OrganizationStep {
        self.controller.active_step().await
    }

    pub async fn summary(&self) -> OrganizationSummary {
        self.controller
            .read(|state| OrganizationSummary::from_data(&state.data))
            .await
    }

    /// Greeting shown on the welcome step.
    pub async fn greeting(&self) -> String {
        self.controller
            .read(|state| match state.data.user_name.trim() {
                "" => "Welcome!".to_string(),
                name => format!("Welcome, {name}!"),
            })
            .await
    }

    pub async fn set_user_name(&self, name: impl Into<String>) {
        self.controller
            .update(OrganizationPatch::UserName(name.into()))
            .await;
    }

    pub async fn update_details(&self, patch: OrganizationDetailsPatch) {
        self.controller.update(OrganizationPatch::Details(patch)).await;
    }

    /// Set the organization name; the slug follows it until one is typed.
    pub async fn set_name(&self, name: impl Into<String>) {
        self.update_details(OrganizationDetailsPatch {
            name: Some(name.into()),
            ..Default::default()
        })
        .await;
    }

    pub async fn set_slug(&self, slug: impl Into<String>) {
        self.update_details(OrganizationDetailsPatch {
            slug: Some(slug.into()),
            ..Default::default()
        })
        .await;
    }

    /// Encode `file` as the organization logo.
    ///
    /// Resolves in the background; the result lands in `details.image`.
    pub async fn upload_logo(&mut self, file: ImageFile) {
        self.controller
            .update(OrganizationPatch::LogoUpload(TaskState::Pending))
            .await;

        let encoder = Arc::clone(&self.encoder);
        let latency = self.config.upload_latency;
        debug!(file = %file.name, size = file.bytes.len(), "Uploading logo");
        self.controller.spawn(
            "logo_upload",
            encode_upload(encoder, file, latency),
            |store, result| match result {
                Ok(image) => {
                    store.update_step_data(OrganizationPatch::LogoUpload(TaskState::Succeeded(
                        image,
                    )));
                }
                Err(e) => {
                    let err = StepError::from_service(fields::IMAGE, e, "Could not upload image");
                    store.update_step_data(OrganizationPatch::LogoUpload(TaskState::Failed(
                        err.to_string(),
                    )));
                    store.set_field_error(fields::IMAGE, err.to_string());
                }
            },
        );
    }

    pub async fn set_member_draft(&self, email: Option<String>, role: Option<MemberRole>) {
        self.controller
            .update(OrganizationPatch::Draft { email, role })
            .await;
    }

    /// Validate and dispatch an invite.
    ///
    /// Returns the validation error when the email is rejected up front or
    /// another invite is still in flight. The invite itself resolves in the
    /// background and appends the member on success.
    pub async fn add_member(&mut self, email: &str, role: MemberRole) -> Result<(), StepError> {
        let (members, inviting) = self
            .controller
            .read(|state| {
                (
                    state.data.members.clone(),
                    state.data.member_invite.is_pending(),
                )
            })
            .await;
        if inviting {
            let err = StepError::validation(
                fields::MEMBER_EMAIL,
                "Please wait for the current invitation to be sent",
            );
            debug!(email, "Invite already in flight");
            self.controller
                .set_field_error(err.field(), err.to_string())
                .await;
            return Err(err);
        }

        self.set_member_draft(Some(email.to_string()), Some(role))
            .await;
        if let Err(err) = validate_member_email(email, &members) {
            debug!(email, code = err.code(), "Member rejected");
            self.controller
                .set_field_error(err.field(), err.to_string())
                .await;
            return Err(err);
        }

        self.controller
            .update(OrganizationPatch::MemberInvite(TaskState::Pending))
            .await;

        let identity = Arc::clone(&self.identity);
        let email = email.to_string();
        let invited = email.clone();
        self.controller.spawn(
            "member_invite",
            async move {
                identity
                    .invite_member(&email, role)
                    .await
                    .map(|()| Member::new(email, role))
            },
            move |store, result| match result {
                Ok(member) => {
                    info!(email = %member.email, role = %member.role, "Member invited");
                    store.update_step_data(OrganizationPatch::MemberInvite(
                        TaskState::Succeeded(member),
                    ));
                }
                // A failure must not contradict a member already on the list.
                Err(e) if store.data().has_member(&invited) => {
                    debug!(email = %invited, error = %e, "Ignoring failure for listed member");
                }
                Err(e) => {
                    let err = StepError::from_service(
                        fields::MEMBER_EMAIL,
                        e,
                        "Failed to send invitation",
                    );
                    store.update_step_data(OrganizationPatch::MemberInvite(TaskState::Failed(
                        err.to_string(),
                    )));
                    store.set_field_error(fields::MEMBER_EMAIL, err.to_string());
                }
            },
        );
        Ok(())
    }

    pub async fn remove_member(&self, email: impl Into<String>) {
        self.controller
            .update(OrganizationPatch::RemoveMember(email.into()))
            .await;
    }

    /// Validate the active step and advance.
    ///
    /// Leaving the details step also checks the slug with the identity
    /// service and creates the organization the first time through.
    pub async fn next(&self) -> Transition {
        if self.step().await == OrganizationStep::OrganizationDetails {
            if let Err(err) = self.ensure_organization().await {
                let errors: FieldErrors = [err].into_iter().collect();
                self.controller.set_errors(errors.clone()).await;
                return Transition::Blocked { errors };
            }
        }
        self.controller.next().await
    }

    pub async fn back(&self) -> Transition {
        self.controller.back().await
    }

    async fn ensure_organization(&self) -> Result<(), StepError> {
        let (valid, name, slug, created) = self
            .controller
            .read(|state| {
                let data = &state.data;
                (
                    validate_organization_details(&data.details).is_empty(),
                    data.details.name.trim().to_string(),
                    data.details.slug.clone(),
                    data.organization.clone(),
                )
            })
            .await;
        // Field validation runs in the controller.
        if !valid {
            return Ok(());
        }

        if let Some(created) = created {
            if created.slug == slug {
                return Ok(());
            }
            return Err(StepError::validation(
                fields::SLUG,
                "Slug cannot be changed after the organization is created",
            ));
        }

        let available = self
            .identity
            .check_slug_available(&slug)
            .await
            .map_err(|e| StepError::from_service(fields::SLUG, e, "Could not check slug"))?;
        if !available {
            return Err(StepError::validation(fields::SLUG, "This slug is already taken"));
        }

        let id = self
            .identity
            .create_organization(&name, &slug)
            .await
            .map_err(|e| {
                StepError::from_service(fields::FORM, e, "Failed to create organization")
            })?;
        info!(organization_id = %id, slug = %slug, "Organization created");
        self.controller
            .update(OrganizationPatch::Created(CreatedOrganization { id, slug }))
            .await;
        Ok(())
    }

    /// Where the terminal step sends the user.
    pub fn exit_target(&self) -> &str {
        &self.config.dashboard_route
    }

    pub fn tasks_in_flight(&self) -> usize {
        self.controller.tasks_in_flight()
    }

    /// Wait for uploads and invites still in flight.
    pub async fn join_pending(&mut self) {
        self.controller.join_pending().await;
    }

    pub async fn reset(&self) {
        self.controller.reset().await;
        if let Some(name) = self.config.default_user_name.clone() {
            self.set_user_name(name).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::{DataUrlEncoder, InMemoryIdentityService};

    fn wizard_with(identity: InMemoryIdentityService) -> OrganizationWizard {
        OrganizationWizard::new(
            Arc::new(identity),
            Arc::new(DataUrlEncoder),
            OnboardingConfig::immediate(),
        )
    }

    async fn at_details(identity: InMemoryIdentityService) -> OrganizationWizard {
        let wizard = wizard_with(identity);
        assert!(wizard.next().await.moved());
        wizard
    }

    #[tokio::test]
    async fn greeting_uses_configured_name() {
        let config = OnboardingConfig {
            default_user_name: Some("Sam".into()),
            ..OnboardingConfig::immediate()
        };
        let wizard = OrganizationWizard::new(
            Arc::new(InMemoryIdentityService::new()),
            Arc::new(DataUrlEncoder),
            config,
        );
        assert_eq!(wizard.greeting().await, "Welcome, Sam!");
        wizard.set_user_name("").await;
        assert_eq!(wizard.greeting().await, "Welcome!");
    }

    #[tokio::test]
    async fn details_step_blocks_on_empty_form() {
        let wizard = at_details(InMemoryIdentityService::new()).await;
        let transition = wizard.next().await;
        assert!(transition.is_blocked());

        let state = wizard.state().await;
        assert_eq!(state.current_step, 1);
        assert_eq!(state.errors.len(), 2);
    }

    #[tokio::test]
    async fn taken_slug_blocks() {
        let wizard = at_details(InMemoryIdentityService::new().with_reserved_slug("acme")).await;
        wizard.set_name("Acme").await;

        let transition = wizard.next().await;
        let Transition::Blocked { errors } = transition else {
            panic!("expected Blocked, got {transition:?}");
        };
        assert_eq!(errors.get("slug"), Some("This slug is already taken"));
        assert_eq!(wizard.state().await.current_step, 1);
    }

    #[tokio::test]
    async fn organization_created_once() {
        let identity = Arc::new(InMemoryIdentityService::new());
        let wizard = OrganizationWizard::new(
            identity.clone(),
            Arc::new(DataUrlEncoder),
            OnboardingConfig::immediate(),
        );
        wizard.next().await;
        wizard.set_name("Acme Inc.").await;
        assert!(wizard.next().await.moved());
        assert!(wizard.back().await.moved());
        assert!(wizard.next().await.moved(), "unchanged slug passes again");
        assert_eq!(identity.organizations().await.len(), 1);

        wizard.back().await;
        wizard.set_slug("acme-two").await;
        let transition = wizard.next().await;
        let Transition::Blocked { errors } = transition else {
            panic!("expected Blocked, got {transition:?}");
        };
        assert_eq!(
            errors.get("slug"),
            Some("Slug cannot be changed after the organization is created")
        );
    }

    #[tokio::test]
    async fn logo_upload_resolves_into_details() {
        let mut wizard = wizard_with(InMemoryIdentityService::new());
        wizard
            .upload_logo(ImageFile::new("logo.png", "image/png", vec![1, 2, 3]))
            .await;
        wizard.join_pending().await;

        let state = wizard.state().await;
        assert_eq!(state.data.details.image, "data:image/png;base64,AQID");
        assert!(state.data.logo_upload.is_succeeded());
    }

    #[tokio::test]
    async fn failed_logo_upload_records_error() {
        let mut wizard = wizard_with(InMemoryIdentityService::new());
        wizard
            .upload_logo(ImageFile::new("notes.txt", "text/plain", b"hi".to_vec()))
            .await;
        wizard.join_pending().await;

        let state = wizard.state().await;
        assert!(state.data.details.image.is_empty());
        assert_eq!(
            state.errors.get("image"),
            Some(crate::error::GENERIC_RETRY_MESSAGE)
        );
    }

    #[tokio::test]
    async fn invalid_member_email_is_not_dispatched() {
        let mut wizard = at_details(InMemoryIdentityService::new()).await;
        let err = wizard.add_member("bob", MemberRole::Employee).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");
        assert_eq!(wizard.tasks_in_flight(), 0);

        let state = wizard.state().await;
        assert_eq!(state.data.draft.email, "bob");
        assert_eq!(
            state.errors.get("member_email"),
            Some("Please enter a valid email address")
        );
    }

    #[tokio::test]
    async fn rejected_invite_keeps_draft() {
        // No organization was created, so the service rejects the invite.
        let mut wizard = wizard_with(InMemoryIdentityService::new());
        wizard.add_member("alice@x.com", MemberRole::Admin).await.unwrap();
        wizard.join_pending().await;

        let state = wizard.state().await;
        assert!(state.data.members.is_empty());
        assert_eq!(state.data.draft.email, "alice@x.com");
        assert_eq!(state.errors.get("member_email"), Some("No active organization"));
    }

    #[tokio::test]
    async fn second_invite_waits_for_the_first() {
        let identity = InMemoryIdentityService::new().with_latency(Duration::from_millis(10));
        let mut wizard = at_details(identity).await;
        wizard.set_name("Acme Inc.").await;
        assert!(wizard.next().await.moved());

        wizard
            .add_member("alice@x.com", MemberRole::Admin)
            .await
            .unwrap();
        let err = wizard
            .add_member("alice@x.com", MemberRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please wait for the current invitation to be sent"
        );
        assert_eq!(wizard.tasks_in_flight(), 1);

        wizard.join_pending().await;
        let state = wizard.state().await;
        assert_eq!(state.data.members.len(), 1);
        assert!(state.data.member_invite.is_succeeded());
        assert!(state.errors.is_empty());

        let err = wizard
            .add_member("alice@x.com", MemberRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This email has already been added");
    }

    #[tokio::test]
    async fn reset_restores_configured_name() {
        let config = OnboardingConfig {
            default_user_name: Some("Sam".into()),
            ..OnboardingConfig::immediate()
        };
        let wizard = OrganizationWizard::new(
            Arc::new(InMemoryIdentityService::new()),
            Arc::new(DataUrlEncoder),
            config,
        );
        wizard.next().await;
        wizard.set_name("Acme").await;
        wizard.reset().await;

        let state = wizard.state().await;
        assert_eq!(state.current_step, 0);
        assert!(state.data.details.name.is_empty());
        assert_eq!(state.data.user_name, "Sam");
        assert_eq!(wizard.exit_target(), "/dashboard");
    }
}
