// --- File: crates/bookify_common/src/error.rs ---

/// A trait for converting errors to HTTP status codes.
///
/// Each crate defines its own error enum; implementing this trait gives the
/// handler layer one uniform way to translate any of them into a response
/// status. The core logic never formats user-facing messages itself, it only
/// classifies.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}
