use crate::{chat::ChatSnapshot, AppState, Page};

pub(crate) async fn open_chat(state: &AppState) -> Result<ChatSnapshot, String> {
    state.navigate(Page::Chat).await;
    state.with_chat(|chat| Ok(chat.snapshot()))
}

pub(crate) fn get_chat_state(state: &AppState) -> Result<ChatSnapshot, String> {
    state.with_chat(|chat| Ok(chat.snapshot()))
}

/// Sends `text` from the chat page, opening it first if needed. The reply
/// arrives later as a `chat-state-changed` event.
pub(crate) async fn send_chat_message(state: &AppState, text: String) -> Result<ChatSnapshot, String> {
    if text.trim().is_empty() {
        return Err("Message is empty".into());
    }
    state.navigate(Page::Chat).await;
    state.with_chat(|chat| {
        chat.send_message(&text)
            .ok_or_else(|| "Pandora is still replying".to_string())?;
        Ok(chat.snapshot())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::FakeCamera;
    use crate::events::CHAT_STATE_CHANGED;
    use crate::gateway::testing::FakeBackend;
    use crate::models::{ChatReply, ReplyProvenance};
    use crate::testing::app_state;
    use std::sync::Arc;

    #[tokio::test]
    async fn send_opens_chat_and_reply_arrives_as_event() {
        let backend = Arc::new(FakeBackend::gated().with_chat_reply(ChatReply {
            text: "Try a short walk.".into(),
            source: ReplyProvenance::Dataset,
            confidence: Some(0.8),
        }));
        let (state, _dir) = app_state(backend.clone(), Arc::new(FakeCamera::default()));
        let mut events = state.events.subscribe();

        let sent = send_chat_message(&state, "I feel tense".into()).await.unwrap();
        assert!(sent.pending);
        assert_eq!(sent.transcript.len(), 2);

        let err = send_chat_message(&state, "hello?".into()).await.unwrap_err();
        assert_eq!(err, "Pandora is still replying");

        backend.release();
        loop {
            let event = events.recv().await.unwrap();
            if event.name == CHAT_STATE_CHANGED && event.payload["pending"] == false {
                assert_eq!(event.payload["badge"], "Local ML");
                break;
            }
        }
        let snapshot = get_chat_state(&state).unwrap();
        assert_eq!(snapshot.transcript.len(), 3);
        assert_eq!(snapshot.transcript[2].text, "Try a short walk.");
    }

    #[tokio::test]
    async fn blank_message_is_refused_without_opening_chat() {
        let (state, _dir) = app_state(
            Arc::new(FakeBackend::new()),
            Arc::new(FakeCamera::default()),
        );
        assert!(send_chat_message(&state, "   ".into()).await.is_err());
        assert!(get_chat_state(&state).is_err());

        let opened = open_chat(&state).await.unwrap();
        assert_eq!(opened.transcript.len(), 1);
        assert!(!opened.pending);
    }
}
