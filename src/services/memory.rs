//! In-memory identity service for the demo binary and tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::employee::model::Invitation;
use crate::error::ServiceError;
use crate::organization::model::MemberRole;

use super::traits::IdentityService;

/// An organization created through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrganization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// An invite dispatched by [`IdentityService::invite_member`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentInvite {
    pub invite_id: String,
    pub organization_id: String,
    pub email: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone)]
struct StoredInvitation {
    invitation: Invitation,
    organization_id: Option<String>,
    accepted: bool,
}

#[derive(Debug, Default)]
struct Registry {
    organizations: HashMap<String, StoredOrganization>,
    reserved_slugs: HashSet<String>,
    invitations: HashMap<String, StoredInvitation>,
    active_organization: Option<String>,
    sent: Vec<SentInvite>,
}

impl Registry {
    fn slug_taken(&self, slug: &str) -> bool {
        self.reserved_slugs.contains(slug) || self.organizations.values().any(|o| o.slug == slug)
    }
}

/// [`IdentityService`] backed by in-process maps, with optional simulated
/// latency on every call.
#[derive(Debug, Default)]
pub struct InMemoryIdentityService {
    latency: Duration,
    registry: RwLock<Registry>,
}

impl InMemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make `invitation` verifiable by its id.
    pub fn with_invitation(mut self, invitation: Invitation) -> Self {
        let registry = self.registry.get_mut();
        registry.invitations.insert(
            invitation.invite_id.clone(),
            StoredInvitation {
                invitation,
                organization_id: None,
                accepted: false,
            },
        );
        self
    }

    /// Mark `slug` as taken by an organization outside this service.
    pub fn with_reserved_slug(mut self, slug: impl Into<String>) -> Self {
        self.registry.get_mut().reserved_slugs.insert(slug.into());
        self
    }

    pub async fn organizations(&self) -> Vec<StoredOrganization> {
        let registry = self.registry.read().await;
        let mut organizations: Vec<_> = registry.organizations.values().cloned().collect();
        organizations.sort_by_key(|o| o.created_at);
        organizations
    }

    pub async fn sent_invites(&self) -> Vec<SentInvite> {
        self.registry.read().await.sent.clone()
    }

    /// Whether the invitation `id` has been accepted.
    pub async fn is_accepted(&self, id: &str) -> bool {
        self.registry
            .read()
            .await
            .invitations
            .get(id)
            .is_some_and(|i| i.accepted)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn create_organization(&self, name: &str, slug: &str) -> Result<String, ServiceError> {
        self.simulate_latency().await;
        let mut registry = self.registry.write().await;
        if registry.slug_taken(slug) {
            return Err(ServiceError::rejected("This slug is already taken"));
        }

        let id = Uuid::new_v4().to_string();
        registry.organizations.insert(
            id.clone(),
            StoredOrganization {
                id: id.clone(),
                name: name.to_string(),
                slug: slug.to_string(),
                created_at: Utc::now(),
            },
        );
        registry.active_organization = Some(id.clone());
        info!(organization_id = %id, slug, "Organization created");
        Ok(id)
    }

    async fn check_slug_available(&self, slug: &str) -> Result<bool, ServiceError> {
        self.simulate_latency().await;
        Ok(!self.registry.read().await.slug_taken(slug))
    }

    async fn invite_member(&self, email: &str, role: MemberRole) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        let mut registry = self.registry.write().await;
        let Some(organization_id) = registry.active_organization.clone() else {
            return Err(ServiceError::rejected("No active organization"));
        };
        let organization_name = registry
            .organizations
            .get(&organization_id)
            .map(|o| o.name.clone())
            .ok_or_else(|| ServiceError::not_found("Organization", organization_id.as_str()))?;

        let already_invited = registry.invitations.values().any(|i| {
            i.organization_id.as_deref() == Some(organization_id.as_str())
                && i.invitation.email == email
                && !i.accepted
        });
        if already_invited {
            return Err(ServiceError::rejected("This email has already been invited"));
        }

        let invite_id = Uuid::new_v4().to_string();
        registry.invitations.insert(
            invite_id.clone(),
            StoredInvitation {
                invitation: Invitation {
                    invite_id: invite_id.clone(),
                    email: email.to_string(),
                    organization_name,
                    role: role.to_string(),
                },
                organization_id: Some(organization_id.clone()),
                accepted: false,
            },
        );
        registry.sent.push(SentInvite {
            invite_id: invite_id.clone(),
            organization_id,
            email: email.to_string(),
            role,
        });
        debug!(invite_id = %invite_id, email, role = %role, "Invitation sent");
        Ok(())
    }

    async fn accept_invitation(&self, invitation_id: &str) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        let mut registry = self.registry.write().await;
        let stored = registry
            .invitations
            .get_mut(invitation_id)
            .ok_or_else(|| ServiceError::not_found("Invitation", invitation_id))?;
        if stored.accepted {
            return Err(ServiceError::rejected("Invitation has already been accepted"));
        }
        stored.accepted = true;
        info!(invite_id = invitation_id, "Invitation accepted");
        Ok(())
    }

    async fn get_invitation_details(
        &self,
        invitation_id: &str,
    ) -> Result<Invitation, ServiceError> {
        self.simulate_latency().await;
        let registry = self.registry.read().await;
        let stored = registry
            .invitations
            .get(invitation_id)
            .ok_or_else(|| ServiceError::not_found("Invitation", invitation_id))?;
        if stored.accepted {
            return Err(ServiceError::rejected("Invitation has already been accepted"));
        }
        Ok(stored.invitation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(id: &str) -> Invitation {
        Invitation {
            invite_id: id.into(),
            email: "jane@acme.com".into(),
            organization_name: "Acme Inc.".into(),
            role: "employee".into(),
        }
    }

    #[tokio::test]
    async fn slug_registry() {
        let service = InMemoryIdentityService::new().with_reserved_slug("taken");
        assert!(!service.check_slug_available("taken").await.unwrap());
        assert!(service.check_slug_available("acme-inc").await.unwrap());

        let id = service.create_organization("Acme Inc.", "acme-inc").await.unwrap();
        assert!(!service.check_slug_available("acme-inc").await.unwrap());
        assert!(service.create_organization("Other", "acme-inc").await.is_err());

        let organizations = service.organizations().await;
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].id, id);
    }

    #[tokio::test]
    async fn invite_requires_active_organization() {
        let service = InMemoryIdentityService::new();
        let err = service
            .invite_member("alice@x.com", MemberRole::Admin)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::rejected("No active organization"));
    }

    #[tokio::test]
    async fn invites_create_verifiable_invitations() {
        let service = InMemoryIdentityService::new();
        service.create_organization("Acme Inc.", "acme-inc").await.unwrap();
        service.invite_member("alice@x.com", MemberRole::Admin).await.unwrap();

        let dup = service.invite_member("alice@x.com", MemberRole::Employee).await;
        assert!(matches!(dup, Err(ServiceError::Rejected { .. })));

        let sent = service.sent_invites().await;
        assert_eq!(sent.len(), 1);
        let details = service.get_invitation_details(&sent[0].invite_id).await.unwrap();
        assert_eq!(details.organization_name, "Acme Inc.");
        assert_eq!(details.role, "admin");
    }

    #[tokio::test]
    async fn accept_once() {
        let service = InMemoryIdentityService::new().with_invitation(invitation("inv-1"));
        assert!(service.get_invitation_details("inv-1").await.is_ok());

        service.accept_invitation("inv-1").await.unwrap();
        assert!(service.is_accepted("inv-1").await);
        assert!(service.accept_invitation("inv-1").await.is_err());
        assert!(service.get_invitation_details("inv-1").await.is_err());
    }

    #[tokio::test]
    async fn unknown_invitation_is_not_found() {
        let service = InMemoryIdentityService::new();
        let err = service.get_invitation_details("INVALID").await.unwrap_err();
        assert_eq!(err, ServiceError::not_found("Invitation", "INVALID"));
    }
}
