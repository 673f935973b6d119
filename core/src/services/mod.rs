//! Business services containing the identity workflows.

pub mod auth;
pub mod credentials;
pub mod profile;
pub mod registration;
pub mod session;
pub mod verification;

// Re-export commonly used types
pub use auth::{
    AuthService, AuthServiceConfig, CaptchaVerifier, ChangePasswordRequest, LoginRateLimiter,
    SignInRequest, StaticCaptchaVerifier,
};
pub use credentials::{CredentialVerifier, PasswordHasher, PasswordPolicy};
pub use profile::{ContactDetails, CustomerProfile, ProfileService, ProfileUpdate, ProfileUpdateOutcome};
pub use registration::{Registration, RegistrationRequest, RegistrationService};
pub use session::{SessionConfig, SessionIssuer};
pub use verification::{
    CodeGenerator, EmailMessage, FixedCodeGenerator, IssuedTicket, NotificationSink,
    RandomCodeGenerator, RecordingNotificationSink, SmsMessage, VerificationServiceConfig,
    VerificationWorkflow, EMAIL_VERIFICATION_TEMPLATE,
};
