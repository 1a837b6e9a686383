use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessagingErrorCode {
    InvalidArgument,
    Internal,
    AvailableInServiceWorker,
    UnsupportedBrowser,
    NotificationDisplayFailed,
    ClientsUnavailable,
    WindowFocusFailed,
    WindowOpenFailed,
    PostMessageFailed,
    LifecycleFailed,
}

impl MessagingErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessagingErrorCode::InvalidArgument => "messaging/invalid-argument",
            MessagingErrorCode::Internal => "messaging/internal",
            MessagingErrorCode::AvailableInServiceWorker => "messaging/available-in-sw",
            MessagingErrorCode::UnsupportedBrowser => "messaging/unsupported-browser",
            MessagingErrorCode::NotificationDisplayFailed => {
                "messaging/notification-display-failed"
            }
            MessagingErrorCode::ClientsUnavailable => "messaging/clients-unavailable",
            MessagingErrorCode::WindowFocusFailed => "messaging/window-focus-failed",
            MessagingErrorCode::WindowOpenFailed => "messaging/window-open-failed",
            MessagingErrorCode::PostMessageFailed => "messaging/post-message-failed",
            MessagingErrorCode::LifecycleFailed => "messaging/lifecycle-failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessagingError {
    pub code: MessagingErrorCode,
    message: String,
}

impl MessagingError {
    pub fn new(code: MessagingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for MessagingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for MessagingError {}

pub type MessagingResult<T> = Result<T, MessagingError>;

pub fn invalid_argument(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::InvalidArgument, message)
}

pub fn internal_error(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::Internal, message)
}

pub fn available_in_service_worker(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::AvailableInServiceWorker, message)
}

pub fn unsupported_browser(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::UnsupportedBrowser, message)
}

pub fn notification_display_failed(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::NotificationDisplayFailed, message)
}

pub fn clients_unavailable(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::ClientsUnavailable, message)
}

pub fn window_focus_failed(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::WindowFocusFailed, message)
}

pub fn window_open_failed(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::WindowOpenFailed, message)
}

pub fn post_message_failed(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::PostMessageFailed, message)
}

pub fn lifecycle_failed(message: impl Into<String>) -> MessagingError {
    MessagingError::new(MessagingErrorCode::LifecycleFailed, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_is_a_service_worker_code() {
        let codes = [
            MessagingErrorCode::InvalidArgument,
            MessagingErrorCode::Internal,
            MessagingErrorCode::AvailableInServiceWorker,
            MessagingErrorCode::UnsupportedBrowser,
            MessagingErrorCode::NotificationDisplayFailed,
            MessagingErrorCode::ClientsUnavailable,
            MessagingErrorCode::WindowFocusFailed,
            MessagingErrorCode::WindowOpenFailed,
            MessagingErrorCode::PostMessageFailed,
            MessagingErrorCode::LifecycleFailed,
        ];
        for code in &codes {
            // Exhaustive so that a new variant has to be listed above.
            match code {
                MessagingErrorCode::InvalidArgument
                | MessagingErrorCode::Internal
                | MessagingErrorCode::AvailableInServiceWorker
                | MessagingErrorCode::UnsupportedBrowser
                | MessagingErrorCode::NotificationDisplayFailed
                | MessagingErrorCode::ClientsUnavailable
                | MessagingErrorCode::WindowFocusFailed
                | MessagingErrorCode::WindowOpenFailed
                | MessagingErrorCode::PostMessageFailed
                | MessagingErrorCode::LifecycleFailed => {}
            }
            assert!(code.as_str().starts_with("messaging/"));
            assert_ne!(code.as_str(), "messaging/available-in-window");
        }
        assert_eq!(
            available_in_service_worker("page context").code_str(),
            "messaging/available-in-sw"
        );
    }
}
