//! Assistant chat over a server-sent-event reply stream.

use super::fetch_list;
use crate::api::ApiClient;
use crate::error::{ApiError, Result};
use sante_core::{ChatMessage, SseDecoder, StreamEvent, Transcript};
use serde_json::json;

#[derive(Clone)]
pub struct ChatService {
    api: ApiClient,
}

impl ChatService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Stored conversation, or just the greeting when there is none or the
    /// history cannot be loaded
    pub async fn history(&self) -> Transcript {
        match fetch_list::<ChatMessage>(&self.api, "/chat/history/").await {
            Ok(messages) => Transcript::from_history(messages),
            Err(e) => {
                tracing::warn!(error = %e, "Chat history unavailable");
                Transcript::from_history(Vec::new())
            }
        }
    }

    pub async fn send(&self, transcript: &mut Transcript, text: &str, username: &str) -> Result<()> {
        self.send_with(transcript, text, username, |_| {}).await
    }

    /// Send a message and stream the reply into `transcript`.
    ///
    /// `on_delta` sees each fragment as it arrives. If the stream fails the
    /// pending reply is replaced by the unavailable notice and the error is
    /// returned.
    pub async fn send_with<F>(
        &self,
        transcript: &mut Transcript,
        text: &str,
        username: &str,
        mut on_delta: F,
    ) -> Result<()>
    where
        F: FnMut(&str),
    {
        transcript.begin_exchange(text);
        match self.stream_reply(transcript, text, username, &mut on_delta).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Chat stream failed");
                transcript.fail_exchange();
                Err(e)
            }
        }
    }

    async fn stream_reply<F>(
        &self,
        transcript: &mut Transcript,
        text: &str,
        username: &str,
        on_delta: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&str),
    {
        let body = json!({ "message": text, "user": username });
        let mut response = self.api.post_stream("/chat/", &body).await?;
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = response.chunk().await.map_err(ApiError::from)? {
            for event in decoder.push(&chunk) {
                match event {
                    StreamEvent::Delta(delta) => {
                        transcript.append_delta(&delta);
                        on_delta(&delta);
                    }
                    StreamEvent::Done => return Ok(()),
                }
            }
        }
        if decoder.pending() > 0 {
            tracing::debug!(bytes = decoder.pending(), "Chat stream ended mid-event");
        }
        Ok(())
    }
}
