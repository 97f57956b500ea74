//! External collaborators the wizards call through narrow traits.

pub mod encoder;
pub mod memory;
pub mod traits;

pub use encoder::{DataUrlEncoder, encode_upload};
pub use memory::{InMemoryIdentityService, SentInvite, StoredOrganization};
pub use traits::{IdentityService, ImageEncoder, ImageFile};
