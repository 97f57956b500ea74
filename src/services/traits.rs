//! Narrow interfaces to the external collaborators the wizards call.

use async_trait::async_trait;

use crate::employee::model::Invitation;
use crate::error::ServiceError;
use crate::organization::model::MemberRole;

/// Identity / organization service (auth + ORM backend).
///
/// The wizards only distinguish success from failure and read the optional
/// rejection message; implementations own their idempotency.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an organization and make it the caller's active one.
    /// Returns the organization id.
    async fn create_organization(&self, name: &str, slug: &str) -> Result<String, ServiceError>;

    /// Whether `slug` is still free.
    async fn check_slug_available(&self, slug: &str) -> Result<bool, ServiceError>;

    /// Invite `email` into the active organization.
    async fn invite_member(&self, email: &str, role: MemberRole) -> Result<(), ServiceError>;

    async fn accept_invitation(&self, invitation_id: &str) -> Result<(), ServiceError>;

    async fn get_invitation_details(&self, invitation_id: &str) -> Result<Invitation, ServiceError>;
}

/// A file picked by the user for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Turns an uploaded file into a string the presentation layer can display.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, file: &ImageFile) -> Result<String, ServiceError>;
}
