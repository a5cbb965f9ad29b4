//! Cookie and token handling for the four-stage HTTP login flow.
//!
//! # Architecture
//!
//! - [`CookieJar`] - allow-listed per-domain session cookies
//! - [`SessionForm`] - hidden form tokens carried between stages
//! - [`StageRunner`] - one exchange, validation and extraction per stage
//! - [`AuthPipeline`] - runs the stages in order and stops at the first failure

mod cookies;
mod error;
mod extract;
mod form;
mod logout;
mod pipeline;
mod session;
mod stages;

pub use cookies::{CookieJar, TRACKED_COOKIES};
pub use error::{AuthError, AuthStage, FailureKind};
pub use extract::hidden_field;
pub use form::{FormField, SessionForm};
pub use logout::logout;
pub use pipeline::{AuthPipeline, AuthState};
pub use session::{AuthenticatedSession, Credentials, Session};
pub use stages::StageRunner;
