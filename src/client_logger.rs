//! Logging trait for completion traffic.
//!
//! This module provides the [`CompletionLogger`] trait that allows callers to
//! capture every request and outcome passing through the [`Gemini`] client.
//!
//! [`Gemini`]: crate::Gemini

use crate::FailureReason;
use crate::types::GenerateContentRequest;

/// A trait for logging completion client operations.
///
/// # Example
///
/// ```rust,ignore
/// use elemental::{CompletionLogger, FailureReason, GenerateContentRequest};
/// use std::sync::Mutex;
///
/// struct FileLogger {
///     file: Mutex<std::fs::File>,
/// }
///
/// impl CompletionLogger for FileLogger {
///     fn log_request(&self, model: &str, request: &GenerateContentRequest) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{model}: {}", serde_json::to_string(request).unwrap()).unwrap();
///     }
///
///     fn log_completion(&self, model: &str, text: &str) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{model} <- {text}").unwrap();
///     }
///
///     fn log_failure(&self, model: &str, reason: &FailureReason) {
///         let mut file = self.file.lock().unwrap();
///         writeln!(file, "{model} failed: {reason:?}").unwrap();
///     }
/// }
/// ```
pub trait CompletionLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, model: &str, request: &GenerateContentRequest);

    /// Log the text of a successful completion.
    fn log_completion(&self, model: &str, text: &str);

    /// Log a classified failure.
    ///
    /// Called for every failure, including configuration failures that never
    /// reach the network and therefore have no matching `log_request`.
    fn log_failure(&self, model: &str, reason: &FailureReason);
}
