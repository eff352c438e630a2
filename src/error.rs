#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("invalid registration endpoint {url}: {source}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
