//! In-memory container engine

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use release_sync::docker::{BuildError, BuildResult, ImageEngine};

/// Engine that records calls instead of talking to a daemon
#[derive(Default)]
pub struct FakeEngine {
    pub pings: AtomicUsize,
    daemon_down: bool,
    failing_tags: HashSet<String>,
    builds: Mutex<Vec<(String, HashMap<String, String>)>>,
    pushes: Mutex<Vec<String>>,
    local_images: Mutex<HashSet<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_daemon_down(mut self) -> Self {
        self.daemon_down = true;
        self
    }

    /// Builds of this `repo:tag` fail with a compile error
    pub fn failing(mut self, image: &str) -> Self {
        self.failing_tags.insert(image.to_string());
        self
    }

    pub fn with_local_image(self, image: &str) -> Self {
        self.local_images.lock().unwrap().insert(image.to_string());
        self
    }

    pub fn built_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .builds
            .lock()
            .unwrap()
            .iter()
            .map(|(tag, _)| tag.clone())
            .collect();
        tags.sort();
        tags
    }

    pub fn build_args_for(&self, tag: &str) -> Option<HashMap<String, String>> {
        self.builds
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, args)| args.clone())
    }

    pub fn pushed(&self) -> Vec<String> {
        let mut pushed = self.pushes.lock().unwrap().clone();
        pushed.sort();
        pushed
    }

    pub fn has_local_image(&self, image: &str) -> bool {
        self.local_images.lock().unwrap().contains(image)
    }
}

fn connection_refused() -> BuildError {
    BuildError::DockerConnection(bollard::errors::Error::IOError {
        err: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused"),
    })
}

#[async_trait]
impl ImageEngine for FakeEngine {
    async fn ping(&self) -> BuildResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.daemon_down {
            return Err(connection_refused());
        }
        Ok(())
    }

    async fn build(&self, tag: &str, build_args: HashMap<String, String>) -> BuildResult<()> {
        self.builds
            .lock()
            .unwrap()
            .push((tag.to_string(), build_args));
        if self.failing_tags.contains(tag) {
            return Err(BuildError::BuildFailed(
                "process didn't exit successfully: exit status: 101".to_string(),
            ));
        }
        self.local_images.lock().unwrap().insert(tag.to_string());
        Ok(())
    }

    async fn push(&self, image: &str, tag: &str) -> BuildResult<()> {
        self.pushes
            .lock()
            .unwrap()
            .push(format!("{}:{}", image, tag));
        Ok(())
    }

    async fn remove(&self, reference: &str) -> BuildResult<bool> {
        if self.daemon_down {
            return Err(connection_refused());
        }
        Ok(self.local_images.lock().unwrap().remove(reference))
    }
}
