use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::{cache::CacheError, config::LoadError, infra::error::InfraError};

/// Everything the binary host can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to read `{}`: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn source_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Source {
            path: path.into(),
            source,
        }
    }

    /// Display strings of this error and every source below it.
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut current = StdError::source(self);
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_walks_sources() {
        let error = AppError::source_file(
            "missing.adoc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );

        let chain = error.chain();
        assert_eq!(chain[0], "failed to read `missing.adoc`: no such file");
        assert_eq!(chain.last().map(String::as_str), Some("no such file"));
    }

    #[test]
    fn every_variant_wraps_a_host_failure() {
        let errors = [
            AppError::from(LoadError::Invalid {
                key: "cache.max_size",
                reason: "must be greater than zero".to_string(),
            }),
            AppError::from(CacheError::InvalidCapacity { max_size: 0 }),
            AppError::from(InfraError::telemetry("subscriber already set")),
            AppError::source_file(
                "draft.adoc",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ),
        ];

        for error in &errors {
            let described = match error {
                AppError::Config(_) | AppError::Cache(_) | AppError::Infra(_) => {
                    !error.chain().is_empty()
                }
                AppError::Source { path, .. } => path.ends_with("draft.adoc"),
            };
            assert!(described, "{error}");
        }
    }

    #[test]
    fn cache_errors_convert() {
        let error = AppError::from(CacheError::InvalidCapacity { max_size: 0 });
        assert!(error.to_string().contains("greater than zero"));
    }
}
