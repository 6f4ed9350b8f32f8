use std::fs;
use wiremock::{Match, Request};

/// # Panics
///
/// Will panic if a file can't be read or missing
#[must_use = "This function returns the body of the file as a string"]
pub fn body_from_file(path: &str) -> String {
    fs::read_to_string(path).expect("Failed to read file")
}

/// Runs blocking client code off the async test runtime
///
/// # Panics
///
/// Will panic if the closure panics
pub async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("Blocking task panicked")
}

pub struct FormParamExactMatcher(String, String);

impl FormParamExactMatcher {
    /// Specify the expected value for a form parameter.
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        let key = key.into();
        let value = value.into();
        Self(key, value)
    }
}

/// Shorthand for [`FormParamExactMatcher::new`].
pub fn form_param<K, V>(key: K, value: V) -> FormParamExactMatcher
where
    K: Into<String>,
    V: Into<String>,
{
    FormParamExactMatcher::new(key, value)
}

impl Match for FormParamExactMatcher {
    fn matches(&self, request: &Request) -> bool {
        form_urlencoded::parse(&request.body)
            .any(|q| q.0 == self.0.as_str() && q.1 == self.1.as_str())
    }
}

/// Matches requests whose form body doesn't carry the parameter at all.
pub struct FormParamMissingMatcher(String);

/// Shorthand for [`FormParamMissingMatcher`].
pub fn form_param_is_missing<K: Into<String>>(key: K) -> FormParamMissingMatcher {
    FormParamMissingMatcher(key.into())
}

impl Match for FormParamMissingMatcher {
    fn matches(&self, request: &Request) -> bool {
        !form_urlencoded::parse(&request.body).any(|q| q.0 == self.0.as_str())
    }
}

/// Matches the raw query string, parameter order included.
pub struct QueryExactMatcher(String);

/// Shorthand for [`QueryExactMatcher`].
pub fn query_string<Q: Into<String>>(query: Q) -> QueryExactMatcher {
    QueryExactMatcher(query.into())
}

impl Match for QueryExactMatcher {
    fn matches(&self, request: &Request) -> bool {
        request.url.query() == Some(self.0.as_str())
    }
}
