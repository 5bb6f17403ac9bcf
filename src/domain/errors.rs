use thiserror::Error;

/// Upstream service a request was addressed to, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Places,
    PlacePhoto,
    StreetView,
    Bluesky,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Service::Places => "places search",
            Service::PlacePhoto => "place photo",
            Service::StreetView => "street view",
            Service::Bluesky => "bluesky",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("{service} request failed: {source}")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {message}")]
    Status {
        service: Service,
        status: u16,
        message: String,
    },

    #[error("{service} returned a malformed response: {reason}")]
    MalformedResponse { service: Service, reason: String },

    #[error("no places found")]
    NoPlaces,

    #[error("no valid places found after filtering")]
    NoValidPlace,

    #[error("no image under {max_bytes} bytes after {attempts} attempts")]
    AttemptsExhausted { attempts: u32, max_bytes: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub fn network(service: Service, source: reqwest::Error) -> Self {
        Self::Network { service, source }
    }

    pub fn malformed(service: Service, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            reason: reason.into(),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
