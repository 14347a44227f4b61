//! Strongly typed identifiers for the portal entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(CompanyId);
entity_id!(
    /// Company user (or technical user) acting on behalf of a company.
    IdentityId
);
entity_id!(ApplicationId);
entity_id!(InvitationId);
entity_id!(AgreementId);
entity_id!(ConsentId);
entity_id!(ProcessId);
entity_id!(ProcessStepId);
entity_id!(
    /// Optimistic concurrency token carried by every process.
    VersionToken
);
entity_id!(OfferId);
entity_id!(OfferSubscriptionId);
entity_id!(ProviderDetailId);
