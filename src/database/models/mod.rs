pub mod qr_code;
pub mod user;
pub mod verification;

pub use qr_code::{CertificateData, QrCode, QrCodeSummary};
pub use user::{PasswordReset, User};
pub use verification::{NewVerification, Verification, VerificationEntry, VERIFIED_STATUS};
