use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::messaging::error::{
    clients_unavailable, lifecycle_failed, notification_display_failed, post_message_failed,
    window_focus_failed, window_open_failed, MessagingResult,
};
use crate::sw::notification::NotificationDescriptor;
use crate::sw::scope::{ServiceWorkerScope, WindowClient};

/// Platform operations an [`InMemoryScope`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeOperation {
    ShowNotification,
    MatchAll,
    Focus,
    PostMessage,
    OpenWindow,
    Claim,
    SkipWaiting,
}

/// A call recorded by [`InMemoryScope`].
#[derive(Clone, Debug, PartialEq)]
pub enum ScopeCall {
    ShowNotification(NotificationDescriptor),
    MatchAll { include_uncontrolled: bool },
    Focus { client_id: String },
    PostMessage { client_id: String, message: Value },
    OpenWindow { url: String },
    Claim,
    SkipWaiting,
}

/// Service worker scope that keeps its windows in memory and records every
/// call. Used by native hosts and by tests.
#[derive(Debug)]
pub struct InMemoryScope {
    origin: String,
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<WindowClient>,
    next_id: usize,
    failing: HashSet<ScopeOperation>,
    calls: Vec<ScopeCall>,
}

impl State {
    fn add_window(&mut self, url: &str, foreground: bool) -> WindowClient {
        self.next_id += 1;
        let client = WindowClient {
            id: format!("client-{}", self.next_id),
            url: url.to_owned(),
            focused: foreground,
            visible: foreground,
        };
        self.windows.push(client.clone());
        client
    }
}

impl InMemoryScope {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Adds an open background window (hidden, unfocused) at `url`.
    pub fn with_window(self, url: &str) -> Self {
        self.open(url);
        self
    }

    /// Adds a visible, focused window at `url`.
    pub fn with_foreground_window(self, url: &str) -> Self {
        self.state.lock().unwrap().add_window(url, true);
        self
    }

    pub fn open(&self, url: &str) -> WindowClient {
        self.state.lock().unwrap().add_window(url, false)
    }

    /// Makes every later call of `operation` fail.
    pub fn fail(&self, operation: ScopeOperation) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn windows(&self) -> Vec<WindowClient> {
        self.state.lock().unwrap().windows.clone()
    }

    pub fn calls(&self) -> Vec<ScopeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn shown_notifications(&self) -> Vec<NotificationDescriptor> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ScopeCall::ShowNotification(descriptor) => Some(descriptor),
                _ => None,
            })
            .collect()
    }

    pub fn posted_messages(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ScopeCall::PostMessage { client_id, message } => Some((client_id, message)),
                _ => None,
            })
            .collect()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ScopeCall::OpenWindow { url } => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&ScopeCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|call| predicate(*call)).count()
    }

    /// Records `call`, then reports whether `operation` is scripted to fail.
    fn record(&self, call: ScopeCall, operation: ScopeOperation) -> bool {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.failing.contains(&operation)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ServiceWorkerScope for InMemoryScope {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    async fn show_notification(&self, descriptor: &NotificationDescriptor) -> MessagingResult<()> {
        if self.record(
            ScopeCall::ShowNotification(descriptor.clone()),
            ScopeOperation::ShowNotification,
        ) {
            return Err(notification_display_failed("showNotification rejected"));
        }
        Ok(())
    }

    async fn match_all_windows(
        &self,
        include_uncontrolled: bool,
    ) -> MessagingResult<Vec<WindowClient>> {
        if self.record(
            ScopeCall::MatchAll {
                include_uncontrolled,
            },
            ScopeOperation::MatchAll,
        ) {
            return Err(clients_unavailable("clients.matchAll rejected"));
        }
        Ok(self.windows())
    }

    async fn focus(&self, client: &WindowClient) -> MessagingResult<WindowClient> {
        if self.record(
            ScopeCall::Focus {
                client_id: client.id.clone(),
            },
            ScopeOperation::Focus,
        ) {
            return Err(window_focus_failed("WindowClient.focus rejected"));
        }
        let mut state = self.state.lock().unwrap();
        let mut focused = None;
        for window in state.windows.iter_mut() {
            window.focused = window.id == client.id;
            if window.focused {
                window.visible = true;
                focused = Some(window.clone());
            }
        }
        focused.ok_or_else(|| window_focus_failed(format!("Client {} is gone", client.id)))
    }

    async fn post_message(&self, client: &WindowClient, message: &Value) -> MessagingResult<()> {
        if self.record(
            ScopeCall::PostMessage {
                client_id: client.id.clone(),
                message: message.clone(),
            },
            ScopeOperation::PostMessage,
        ) {
            return Err(post_message_failed("postMessage threw"));
        }
        Ok(())
    }

    async fn open_window(&self, url: &str) -> MessagingResult<Option<WindowClient>> {
        if self.record(
            ScopeCall::OpenWindow {
                url: url.to_owned(),
            },
            ScopeOperation::OpenWindow,
        ) {
            return Err(window_open_failed("clients.openWindow rejected"));
        }
        Ok(Some(self.state.lock().unwrap().add_window(url, true)))
    }

    async fn claim_clients(&self) -> MessagingResult<()> {
        if self.record(ScopeCall::Claim, ScopeOperation::Claim) {
            return Err(lifecycle_failed("clients.claim rejected"));
        }
        Ok(())
    }

    async fn skip_waiting(&self) -> MessagingResult<()> {
        if self.record(ScopeCall::SkipWaiting, ScopeOperation::SkipWaiting) {
            return Err(lifecycle_failed("skipWaiting rejected"));
        }
        Ok(())
    }
}
