use crate::docker::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use glob::{MatchOptions, Pattern};
use std::path::Path;
use tar::Builder;
use walkdir::WalkDir;

/// Contexts above this size get a warning
const MAX_CONTEXT_SIZE: usize = 500 * 1024 * 1024;

const DOCKERIGNORE: &str = ".dockerignore";

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

struct IgnoreRule {
    pattern: Pattern,
    negated: bool,
}

/// Exclusion rules from a `.dockerignore` file.
///
/// Later rules win; `!pattern` re-includes. A pattern matching a directory
/// excludes everything below it.
#[derive(Default)]
pub struct DockerIgnore {
    rules: Vec<IgnoreRule>,
}

impl DockerIgnore {
    /// Rules from `<context>/.dockerignore`; none when the file is absent
    pub fn load(context_path: &Path) -> BuildResult<Self> {
        let path = context_path.join(DOCKERIGNORE);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(BuildError::Io(e)),
        }
    }

    pub fn parse(content: &str) -> Self {
        let rules = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (negated, raw) = match line.strip_prefix('!') {
                    Some(rest) => (true, rest.trim()),
                    None => (false, line),
                };
                let raw = raw.trim_start_matches("./").trim_start_matches('/');
                let raw = raw.trim_end_matches('/');
                if raw.is_empty() {
                    return None;
                }
                match Pattern::new(raw) {
                    Ok(pattern) => Some(IgnoreRule { pattern, negated }),
                    Err(e) => {
                        tracing::warn!("Ignoring invalid .dockerignore pattern {:?}: {}", line, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    fn has_negations(&self) -> bool {
        self.rules.iter().any(|r| r.negated)
    }

    /// Whether `relative` (slash separated, relative to the context) is excluded
    pub fn is_ignored(&self, relative: &str) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            let hit = rule.pattern.matches_with(relative, MATCH_OPTIONS)
                || relative
                    .match_indices('/')
                    .any(|(i, _)| rule.pattern.matches_with(&relative[..i], MATCH_OPTIONS));
            if hit {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

pub struct ContextBuilder;

impl ContextBuilder {
    /// Pack the build context directory into a tar.gz archive.
    ///
    /// Entries excluded by `.dockerignore` are left out; the Dockerfile and
    /// the `.dockerignore` itself are always sent.
    pub fn create_context(context_path: &Path, dockerfile: &str) -> BuildResult<Vec<u8>> {
        if !context_path.is_dir() {
            return Err(BuildError::ContextNotFound(context_path.to_path_buf()));
        }

        tracing::debug!("Creating build context from: {}", context_path.display());

        let ignore = DockerIgnore::load(context_path)?;
        let prune_dirs = !ignore.has_negations();
        let always_kept = |rel: &str| rel == DOCKERIGNORE || rel == dockerfile;

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);
            tar.follow_symlinks(false);

            let walker = WalkDir::new(context_path)
                .follow_links(false)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| {
                    !(prune_dirs
                        && entry.file_type().is_dir()
                        && ignore.is_ignored(&relative_name(context_path, entry.path())))
                });

            for entry in walker {
                let entry = entry.map_err(|e| BuildError::Io(e.into()))?;
                let rel = relative_name(context_path, entry.path());
                if !always_kept(&rel) && ignore.is_ignored(&rel) {
                    tracing::trace!("Excluded from context: {}", rel);
                    continue;
                }

                if entry.file_type().is_dir() {
                    tar.append_dir(&rel, entry.path())?;
                } else {
                    tar.append_path_with_name(entry.path(), &rel)?;
                }
            }

            tar.into_inner()?.finish()?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        if archive_data.len() > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "Build context is {}MB; consider extending .dockerignore",
                archive_data.len() / 1024 / 1024
            );
        }

        Ok(archive_data)
    }
}
