//! Container engine seam used by the build dispatcher

#[cfg(test)]
use mockall::automock;

use std::collections::HashMap;
use std::path::PathBuf;

use bollard::Docker;
use bytes::Bytes;
use tokio::sync::OnceCell;

use crate::config::SyncConfig;
use crate::docker::auth::RegistryAuth;
use crate::docker::builder::ImageBuilder;
use crate::docker::context::ContextBuilder;
use crate::docker::error::{BuildError, BuildResult};
use crate::docker::pusher::ImagePusher;

/// Operations the sync flow needs from a container engine
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ImageEngine: Send + Sync {
    /// Reachability check
    async fn ping(&self) -> BuildResult<()>;

    /// Build `tag` from the configured context with the given build args
    async fn build(&self, tag: &str, build_args: HashMap<String, String>) -> BuildResult<()>;

    /// Push `image:tag` to its registry
    async fn push(&self, image: &str, tag: &str) -> BuildResult<()>;

    /// Remove a local image reference.
    /// Returns `false` when it did not exist.
    async fn remove(&self, reference: &str) -> BuildResult<bool>;
}

/// [`ImageEngine`] backed by the local Docker daemon.
///
/// The connection and the packed build context are both created on first
/// use and then shared by every build of the invocation.
pub struct DockerEngine {
    docker: OnceCell<Docker>,
    context: OnceCell<Bytes>,
    context_path: PathBuf,
    dockerfile: String,
    auth: RegistryAuth,
}

impl DockerEngine {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            docker: OnceCell::new(),
            context: OnceCell::new(),
            context_path: config.build_context.clone(),
            dockerfile: config.dockerfile.clone(),
            auth: RegistryAuth::new(),
        }
    }

    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    async fn client(&self) -> BuildResult<&Docker> {
        self.docker
            .get_or_try_init(|| async { Docker::connect_with_local_defaults() })
            .await
            .map_err(BuildError::from)
    }

    async fn context(&self) -> BuildResult<Bytes> {
        let context = self
            .context
            .get_or_try_init(|| async {
                let path = self.context_path.clone();
                let dockerfile = self.dockerfile.clone();
                let data = tokio::task::spawn_blocking(move || {
                    ContextBuilder::create_context(&path, &dockerfile)
                })
                .await
                .map_err(|e| BuildError::Io(std::io::Error::other(e)))??;
                Ok::<_, BuildError>(Bytes::from(data))
            })
            .await?;
        Ok(context.clone())
    }
}

#[async_trait::async_trait]
impl ImageEngine for DockerEngine {
    async fn ping(&self) -> BuildResult<()> {
        self.client().await?.ping().await?;
        Ok(())
    }

    async fn build(&self, tag: &str, build_args: HashMap<String, String>) -> BuildResult<()> {
        let docker = self.client().await?.clone();
        let context = self.context().await?;
        ImageBuilder::new(docker)
            .build_image(context, &self.dockerfile, tag, &build_args)
            .await
    }

    async fn push(&self, image: &str, tag: &str) -> BuildResult<()> {
        let docker = self.client().await?.clone();
        ImagePusher::with_auth(docker, self.auth.clone())
            .push(image, tag)
            .await?;
        Ok(())
    }

    async fn remove(&self, reference: &str) -> BuildResult<bool> {
        let docker = self.client().await?;

        #[allow(deprecated)]
        let options = bollard::image::RemoveImageOptions {
            force: true,
            ..Default::default()
        };

        match docker.remove_image(reference, Some(options), None).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(BuildError::DockerConnection(e)),
        }
    }
}
