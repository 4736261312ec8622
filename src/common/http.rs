use std::time::Duration;

use reqwest::{Client, Error};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

pub struct HttpClient;

impl HttpClient {
  pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
  }

  /// Client used by source providers. Whole-request timeout applies.
  pub fn new(timeout: Duration) -> Result<Client, Error> {
    Client::builder()
      .user_agent(Self::default_user_agent())
      .timeout(timeout)
      .build()
  }

  /// Client used by the proxy. Only the connect phase is bounded so long
  /// media bodies can stream for as long as the client keeps reading.
  pub fn new_streaming(connect_timeout: Duration) -> Result<Client, Error> {
    Client::builder()
      .connect_timeout(connect_timeout)
      .redirect(reqwest::redirect::Policy::none())
      .build()
  }
}
