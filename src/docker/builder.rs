use crate::docker::error::{BuildError, BuildResult};
use bollard::Docker;
use bollard::image::BuildImageOptions;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{Either, Full};
use std::collections::HashMap;

pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Build `tag` from a packed context.
    ///
    /// Fails on the first `error`/`errorDetail` object in the build stream.
    pub async fn build_image(
        &self,
        context: Bytes,
        dockerfile: &str,
        tag: &str,
        build_args: &HashMap<String, String>,
    ) -> BuildResult<()> {
        tracing::debug!("Building image: {}", tag);

        let build_args_refs: HashMap<&str, &str> = build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = BuildImageOptions {
            dockerfile,
            t: tag,
            buildargs: build_args_refs,
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);

        #[allow(deprecated)]
        let mut stream =
            self.docker
                .build_image(options, None, Some(Either::Left(Full::new(context))));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(output) => handle_build_output(tag, output)?,
                Err(e) => return Err(BuildError::DockerConnection(e)),
            }
        }

        tracing::debug!("Successfully built: {}", tag);
        Ok(())
    }
}

fn handle_build_output(tag: &str, output: bollard::models::BuildInfo) -> BuildResult<()> {
    if let Some(error_detail) = output.error_detail {
        let message = error_detail
            .message
            .or(output.error)
            .unwrap_or_else(|| "Unknown build error".to_string());
        return Err(BuildError::BuildFailed(message));
    }

    if let Some(error) = output.error {
        return Err(BuildError::BuildFailed(error));
    }

    if let Some(stream) = output.stream {
        let line = stream.trim_end();
        if !line.is_empty() {
            tracing::debug!(target: "release_sync::build", "[{}] {}", tag, line);
        }
    }

    if let Some(status) = output.status {
        tracing::debug!(target: "release_sync::build", "[{}] {}", tag, status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{BuildInfo, ErrorDetail};

    #[test]
    fn handle_build_output_accepts_progress_lines() {
        let output = BuildInfo {
            stream: Some("Step 1/4 : FROM rust:slim\n".to_string()),
            ..Default::default()
        };

        assert!(handle_build_output("img:1.0.0", output).is_ok());
    }

    #[test]
    fn handle_build_output_fails_on_error_detail() {
        let output = BuildInfo {
            error: Some("legacy error".to_string()),
            error_detail: Some(ErrorDetail {
                code: Some(1),
                message: Some("returned a non-zero code: 101".to_string()),
            }),
            ..Default::default()
        };

        let err = handle_build_output("img:1.0.0", output).unwrap_err();
        assert!(matches!(err, BuildError::BuildFailed(msg) if msg == "returned a non-zero code: 101"));
    }

    #[test]
    fn handle_build_output_fails_on_plain_error() {
        let output = BuildInfo {
            error: Some("manifest unknown".to_string()),
            ..Default::default()
        };

        let err = handle_build_output("img:1.0.0", output).unwrap_err();
        assert!(matches!(err, BuildError::BuildFailed(msg) if msg == "manifest unknown"));
    }

    #[tokio::test]
    #[ignore] // requires a running Docker daemon
    async fn build_image_builds_trivial_dockerfile() {
        let docker = Docker::connect_with_local_defaults().unwrap();
        let builder = ImageBuilder::new(docker.clone());

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Dockerfile"),
            "FROM alpine:latest\nARG CARGO_MAKE_VERSION\nRUN echo $CARGO_MAKE_VERSION\n",
        )
        .unwrap();
        let context = crate::docker::context::ContextBuilder::create_context(dir.path(), "Dockerfile")
            .unwrap();

        let args = HashMap::from([("CARGO_MAKE_VERSION".to_string(), "0.0.1".to_string())]);
        let result = builder
            .build_image(Bytes::from(context), "Dockerfile", "release-sync-test:0.0.1", &args)
            .await;

        assert!(result.is_ok());

        #[allow(deprecated)]
        docker
            .remove_image(
                "release-sync-test:0.0.1",
                Some(bollard::image::RemoveImageOptions {
                    force: true,
                    ..Default::default()
                }),
                None,
            )
            .await
            .ok();
    }
}
