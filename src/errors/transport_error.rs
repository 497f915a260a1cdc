use thiserror::Error;

/// Failures of the HTTP listener itself, as opposed to a single request.
#[derive(Debug, Error)]
pub enum HttpTransportError {
    #[error("failed to bind on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(String),
}
