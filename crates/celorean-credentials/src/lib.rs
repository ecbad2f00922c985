//! Celorean Credentials: Course credential documents, the content-addressed
//! store seam, issuance, and verification.

pub mod document;
pub mod error;
pub mod issuer;
pub mod store;
pub mod verifier;

pub use document::{CredentialDocument, IssuerInfo, Proof, CREDENTIAL_TYPE, PROOF_METHOD};
pub use error::{CredentialError, StoreError};
pub use issuer::{CredentialIssuer, IssueRequest, IssuedCredential, IssuerDefaults};
pub use store::{ContentId, ContentStore, MemoryStore, PinningServiceStore, Tags};
pub use verifier::{CredentialSummary, CredentialVerifier, VerificationCheck, VerificationOutcome};
