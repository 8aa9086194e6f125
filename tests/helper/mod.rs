//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

mod engine;
mod server;

pub use engine::*;
pub use server::*;

use std::sync::Mutex;

use release_sync::events::{SyncEvent, SyncObserver};

/// Observer that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SyncObserver for RecordingObserver {
    fn on_event(&self, event: &SyncEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
