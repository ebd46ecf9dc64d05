use async_trait::async_trait;

use crate::Result;

/// A read-through source of movie metadata.
///
/// Implementations take a path plus query string relative to the API root,
/// without credentials, and return the response body as an opaque JSON tree.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Issues a GET for `path_and_query` and returns the parsed body verbatim.
    async fn fetch(&self, path_and_query: &str) -> Result<serde_json::Value>;
}

/// Appends the `api_key` query parameter to a path.
///
/// Uses `&` when the path already has a query string, `?` otherwise.
pub fn with_credential(path_and_query: &str, api_key: &str) -> String {
    let connector = if path_and_query.contains('?') {
        '&'
    } else {
        '?'
    };
    format!("{path_and_query}{connector}api_key={api_key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_with_ampersand_when_query_present() {
        assert_eq!(
            with_credential("/movie/popular?language=en-US&page=1", "k3y"),
            "/movie/popular?language=en-US&page=1&api_key=k3y"
        );
    }

    #[test]
    fn appends_with_question_mark_when_no_query() {
        assert_eq!(with_credential("/movie/42", "k3y"), "/movie/42?api_key=k3y");
    }
}
