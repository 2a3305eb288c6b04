use std::time::Duration;

use reqwest::Client;

use crate::domain::repository::LinkChecker;
use crate::domain::types::LinkCheck;

const LINK_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// HEAD probe. Any response below 400 counts as reachable; transport errors
/// and timeouts report `reachable: false` with no status.
#[derive(Clone)]
pub struct HttpLinkChecker {
    pub client: Client,
}

impl LinkChecker for HttpLinkChecker {
    async fn check(&self, url: &str) -> LinkCheck {
        let request = self.client.head(url).send();
        match tokio::time::timeout(LINK_CHECK_TIMEOUT, request).await {
            Ok(Ok(resp)) => {
                let status = resp.status();
                LinkCheck {
                    reachable: status.as_u16() < 400,
                    status: Some(status.as_u16()),
                }
            }
            Ok(Err(e)) => {
                tracing::debug!(%url, error = %e, "link check failed");
                LinkCheck {
                    reachable: false,
                    status: None,
                }
            }
            Err(_) => {
                tracing::debug!(%url, "link check timed out");
                LinkCheck {
                    reachable: false,
                    status: None,
                }
            }
        }
    }
}
