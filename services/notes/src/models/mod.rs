//! Notes service models

pub mod note;
pub mod session;
pub mod user;

// Re-export for convenience
pub use note::{NewNote, Note, NoteChanges, NotePayload};
pub use session::SessionIdentity;
pub use user::{
    AuthenticatedUser, LoginRequest, NewUser, RegisterRequest, RequestResetRequest,
    ResetPasswordRequest, User, UserResponse, ValidateResetTokenRequest,
};
