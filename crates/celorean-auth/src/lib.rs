//! Celorean Auth: Wallet sign-in and stateless sessions.
//!
//! A client fetches a challenge token, signs the reconstructed sign-in
//! message with its wallet, and exchanges `{address, signature, token}` for
//! a signed session cookie. Trust lives entirely in the HMAC over the token
//! and cookie bytes; there is no server-side session table.

pub mod authenticator;
pub mod challenge;
pub mod error;
pub mod message;
pub mod session;
pub mod verifier;

pub use authenticator::{Authenticator, LoginOutcome, LoginRequest, SessionStatus};
pub use challenge::{ChallengeCodec, IssuedChallenge};
pub use error::{AuthError, SessionError, TokenError};
pub use message::SignInMessage;
pub use session::{SessionCodec, SESSION_COOKIE_NAME};
pub use verifier::{EoaSignatureVerifier, RpcSignatureVerifier, SignatureVerifier};
