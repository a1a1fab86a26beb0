use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::models::ChatMessage;

/// Append-only chat log, replayed in full to every new joiner.
///
/// Bounded: once `limit` messages are stored the oldest are dropped. A limit
/// of zero disables the bound entirely.
pub struct MessageHistory {
    messages: Mutex<VecDeque<ChatMessage>>,
    limit: usize,
}

impl MessageHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            limit,
        }
    }

    pub async fn append(&self, message: ChatMessage) {
        let mut messages = self.messages.lock().await;
        messages.push_back(message);
        if self.limit > 0 {
            while messages.len() > self.limit {
                messages.pop_front();
            }
        }
    }

    /// Full log in original append order.
    pub async fn replay(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> ChatMessage {
        ChatMessage::user("Alice".into(), text.into())
    }

    #[tokio::test]
    async fn replay_preserves_append_order_and_content() {
        let history = MessageHistory::new(100);
        history.append(msg("one")).await;
        history.append(msg("two")).await;
        history.append(msg("three")).await;

        let replayed = history.replay().await;
        let texts: Vec<&str> = replayed.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn limit_evicts_oldest_first() {
        let history = MessageHistory::new(2);
        history.append(msg("one")).await;
        history.append(msg("two")).await;
        history.append(msg("three")).await;

        let texts: Vec<String> = history.replay().await.into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(history.len().await, 2);
    }

    #[tokio::test]
    async fn zero_limit_means_unbounded() {
        let history = MessageHistory::new(0);
        for i in 0..50 {
            history.append(msg(&i.to_string())).await;
        }
        assert_eq!(history.len().await, 50);
    }

    #[tokio::test]
    async fn duplicates_are_kept() {
        let history = MessageHistory::new(10);
        history.append(msg("hello")).await;
        history.append(msg("hello")).await;
        assert_eq!(history.len().await, 2);
    }
}
