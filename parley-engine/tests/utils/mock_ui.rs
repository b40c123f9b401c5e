use std::sync::{Arc, Mutex};

use parley_core::{CallType, PeerId};
use parley_engine::{CallUi, InfoReason, MediaStream};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CallingDialog,
    IncomingCallDialog(CallType, PeerId),
    DialogsRemoved,
    InfoDialog(InfoReason),
    LocalPreview(String),
    RemotePreview(String),
    CallElements(CallType),
    CallElementsReset,
}

#[derive(Clone, Default)]
pub struct RecordingUi {
    events: Arc<Mutex<Vec<UiEvent>>>,
}

impl RecordingUi {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<InfoReason> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::InfoDialog(reason) => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn last_local_preview(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            UiEvent::LocalPreview(id) => Some(id),
            _ => None,
        })
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl CallUi for RecordingUi {
    fn show_calling_dialog(&self) {
        self.push(UiEvent::CallingDialog);
    }

    fn show_incoming_call_dialog(&self, call_type: CallType, caller: &PeerId) {
        self.push(UiEvent::IncomingCallDialog(call_type, caller.clone()));
    }

    fn remove_all_dialogs(&self) {
        self.push(UiEvent::DialogsRemoved);
    }

    fn show_info_dialog(&self, reason: InfoReason) {
        self.push(UiEvent::InfoDialog(reason));
    }

    fn update_local_preview(&self, stream: &MediaStream) {
        self.push(UiEvent::LocalPreview(stream.id().to_owned()));
    }

    fn update_remote_preview(&self, stream: &MediaStream) {
        self.push(UiEvent::RemotePreview(stream.id().to_owned()));
    }

    fn show_call_elements(&self, call_type: CallType) {
        self.push(UiEvent::CallElements(call_type));
    }

    fn reset_call_elements(&self) {
        self.push(UiEvent::CallElementsReset);
    }
}
