//! Form client: draft session, challenge capability and submission transport.
//!
//! ```text
//! FormSession::submit → validate → HumanChallenge::execute/reset → SubmissionTransport::send
//! ```

pub mod challenge;
pub mod session;
pub mod transport;

pub use challenge::{ChallengeError, HumanChallenge, StaticChallenge};
pub use session::{FormSession, SubmitError};
pub use transport::{HttpTransport, SubmissionTransport, TransportError};
