//! Typed notification channels
//!
//! Each host-visible event has its own channel. Plain channels notify every
//! listener; veto channels ask every listener for a [`Decision`] and report
//! a veto if any of them declines.

use crate::http::HttpResponse;
use crate::options::{OptionKey, PrintOptions};
use crate::types::{Template, TemplateId};
use std::fmt;

/// Answer of a listener on a veto channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decision {
    #[default]
    Allow,
    Veto,
}

impl Decision {
    pub fn is_veto(self) -> bool {
        self == Decision::Veto
    }
}

impl From<bool> for Decision {
    fn from(allow: bool) -> Self {
        if allow { Decision::Allow } else { Decision::Veto }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E) + Send>;
type VetoListener<E> = Box<dyn FnMut(&E) -> Decision + Send>;

/// Notification channel for events of type `E`
pub struct Channel<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> Channel<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Channel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Channel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Channel whose listeners may veto the operation being announced
pub struct VetoChannel<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, VetoListener<E>)>,
}

impl<E> VetoChannel<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&E) -> Decision + Send + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Ask every listener. All listeners are called even after a veto.
    pub fn emit(&mut self, event: &E) -> Decision {
        let mut decision = Decision::Allow;
        for (_, listener) in &mut self.listeners {
            if listener(event).is_veto() {
                decision = Decision::Veto;
            }
        }
        decision
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for VetoChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for VetoChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VetoChannel")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Template catalog finished loading
#[derive(Debug, Clone)]
pub struct TemplatesLoaded {
    pub templates: Vec<Template>,
    pub active: Option<TemplateId>,
}

/// Print options were changed through the session
#[derive(Debug, Clone)]
pub struct OptionsChanged {
    /// Only the keys that were part of the update
    pub changed: Vec<OptionKey>,
}

/// A print is about to start
#[derive(Debug, Clone)]
pub struct BeforePrint {
    pub map_id: String,
    pub options: PrintOptions,
}

/// Pipeline stage at which a print failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Template,
    Snapshot,
    Submit,
    Delivery,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureStage::Template => "template",
            FailureStage::Snapshot => "snapshot",
            FailureStage::Submit => "submit",
            FailureStage::Delivery => "delivery",
        };
        f.write_str(name)
    }
}

/// A print failed
#[derive(Debug, Clone)]
pub struct PrintException {
    pub stage: FailureStage,
    pub message: String,
    /// Raw service response, when the failure came with one
    pub response: Option<HttpResponse>,
}

/// The printed document is about to be opened
#[derive(Debug, Clone)]
pub struct BeforeDownload {
    pub url: String,
}

/// Channels a [`crate::PrintSession`] publishes on
#[derive(Debug, Default)]
pub struct SessionEvents {
    pub options_changed: Channel<OptionsChanged>,
    pub before_print: VetoChannel<BeforePrint>,
    pub print_exception: Channel<PrintException>,
    pub before_download: VetoChannel<BeforeDownload>,
}
