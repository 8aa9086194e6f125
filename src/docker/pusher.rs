//! Image push to a container registry

use crate::docker::auth::RegistryAuth;
use crate::docker::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::models::PushImageInfo;
use futures::StreamExt;

pub struct ImagePusher {
    docker: Docker,
    auth: RegistryAuth,
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self {
            docker,
            auth: RegistryAuth::new(),
        }
    }

    pub fn with_auth(docker: Docker, auth: RegistryAuth) -> Self {
        Self { docker, auth }
    }

    /// Push `image:tag`.
    ///
    /// The registry reports failures inline as stream items carrying an
    /// `error` field; the first one fails the push. Returns the full
    /// image reference on success.
    pub async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
        let full_image = format!("{}:{}", image, tag);

        validate_tag(tag)?;

        let credentials = self.auth.get_credentials(&full_image)?;

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), credentials);

        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| BuildError::PushFailed {
                message: e.to_string(),
            })?;
            check_push_info(&full_image, info)?;
        }

        Ok(full_image)
    }
}

fn check_push_info(full_image: &str, info: PushImageInfo) -> BuildResult<()> {
    if let Some(err) = info.error {
        return Err(BuildError::PushFailed { message: err });
    }

    if let Some(status) = &info.status {
        let progress = info.progress.as_deref().unwrap_or("");
        tracing::trace!(target: "release_sync::push", "[{}] {} {}", full_image, status, progress);
    }

    Ok(())
}

/// Docker tag rules: 1-128 chars of `[A-Za-z0-9_.-]`, not starting with `.` or `-`
fn validate_tag(tag: &str) -> BuildResult<()> {
    if tag.is_empty() {
        return Err(BuildError::InvalidTag {
            tag: "(empty)".to_string(),
        });
    }

    if tag.len() > 128 {
        return Err(BuildError::InvalidTag {
            tag: format!("Tag too long ({} characters, max 128)", tag.len()),
        });
    }

    if tag.starts_with('.') || tag.starts_with('-') {
        return Err(BuildError::InvalidTag {
            tag: tag.to_string(),
        });
    }

    if let Some(c) = tag
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '-' | '_'))
    {
        return Err(BuildError::InvalidTag {
            tag: format!("Invalid character '{}' in tag: {}", c, tag),
        });
    }

    Ok(())
}
