use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
        Mutex,
        MutexGuard,
    },
};

use async_trait::async_trait;
use log::*;
use tokio::sync::Notify;

use super::{BrokerError, Delivery, MessageBroker, Subscription};

/// Upper bound on the messages a topic keeps when nothing commits them.
pub const DEFAULT_RETAINED_MESSAGES: usize = 10_000;

#[derive(Default)]
struct Topic {
    // Holds offsets `next_offset - log.len()` up to `next_offset - 1`
    log: VecDeque<Delivery>,
    next_offset: i64,
    committed: Option<i64>,
}

impl Topic {
    fn first_offset(&self) -> i64 {
        self.next_offset - self.log.len() as i64
    }

    fn get(&self, offset: i64) -> Option<&Delivery> {
        let index = usize::try_from(offset - self.first_offset()).ok()?;
        self.log.get(index)
    }

    fn drop_committed(&mut self) {
        let Some(committed) = self.committed else { return };
        while self.log.front().is_some_and(|d| d.offset <= committed) {
            self.log.pop_front();
        }
    }
}

struct Shared {
    topics: Mutex<HashMap<String, Topic>>,
    notify: Notify,
    closed: AtomicBool,
    retained: usize,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            topics: Mutex::default(),
            notify: Notify::default(),
            closed: AtomicBool::default(),
            retained: DEFAULT_RETAINED_MESSAGES,
        }
    }
}

impl Shared {
    fn topics(&self) -> MutexGuard<'_, HashMap<String, Topic>> {
        // A panic while holding the lock cannot leave a topic half-written, so a poisoned lock is still usable
        self.topics.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-process broker. Each topic is an append-only log shared by all subscribers, which behave as members of a
/// single consumer group: a new subscription starts after the last committed offset.
///
/// Committed messages are discarded. Uncommitted messages are kept up to a fixed limit per topic, after which the
/// oldest are dropped. Nothing published here is visible to other processes.
#[derive(Clone, Default)]
pub struct ChannelBroker {
    shared: Arc<Shared>,
}

impl ChannelBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A broker that keeps at most `retained` uncommitted messages per topic.
    pub fn with_retention(retained: usize) -> Self {
        let shared = Shared { retained: retained.max(1), ..Shared::default() };
        Self { shared: Arc::new(shared) }
    }

    /// Ends every subscription once it has drained the messages already published.
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
    }

    pub fn committed_offset(&self, topic: &str) -> Option<i64> {
        self.shared.topics().get(topic).and_then(|t| t.committed)
    }

    /// The offset of the most recently published message on `topic`.
    pub fn latest_offset(&self, topic: &str) -> Option<i64> {
        self.shared.topics().get(topic).map(|t| t.next_offset - 1).filter(|o| *o >= 0)
    }

    /// Messages on `topic` that are still retained, oldest first.
    pub fn messages(&self, topic: &str) -> Vec<Delivery> {
        self.shared.topics().get(topic).map(|t| t.log.iter().cloned().collect()).unwrap_or_default()
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn publish(&self, topic: &str, key: Option<&str>, payload: Vec<u8>) -> Result<(), BrokerError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(BrokerError::Publish("the broker has been closed".into()));
        }
        {
            let mut topics = self.shared.topics();
            let entry = topics.entry(topic.to_string()).or_default();
            let offset = entry.next_offset;
            entry.log.push_back(Delivery {
                topic: topic.to_string(),
                partition: 0,
                offset,
                key: key.map(|k| k.as_bytes().to_vec()),
                payload,
            });
            entry.next_offset += 1;
            if entry.log.len() > self.shared.retained {
                if let Some(dropped) = entry.log.pop_front() {
                    warn!(
                        "📬️ {topic} holds more than {} uncommitted messages. Dropped message {}",
                        self.shared.retained,
                        dropped.offset
                    );
                }
            }
            trace!("📬️ Published message {offset} to {topic}");
        }
        self.shared.notify.notify_waiters();
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>, BrokerError> {
        let cursor = self.committed_offset(topic).map(|o| o + 1).unwrap_or(0);
        debug!("📬️ New subscription to {topic}, starting at offset {cursor}");
        Ok(Box::new(ChannelSubscription { shared: Arc::clone(&self.shared), topic: topic.to_string(), cursor }))
    }
}

pub struct ChannelSubscription {
    shared: Arc<Shared>,
    topic: String,
    cursor: i64,
}

impl ChannelSubscription {
    fn poll_log(&mut self) -> Option<Delivery> {
        let topics = self.shared.topics();
        let topic = topics.get(&self.topic)?;
        let first = topic.first_offset();
        if self.cursor < first {
            if topic.committed.map_or(true, |c| c < first - 1) {
                warn!("📬️ Messages {} to {} on {} were dropped before being read", self.cursor, first - 1, self.topic);
            }
            self.cursor = first;
        }
        topic.get(self.cursor).cloned()
    }
}

#[async_trait]
impl Subscription for ChannelSubscription {
    async fn next_delivery(&mut self) -> Option<Result<Delivery, BrokerError>> {
        loop {
            // Register interest before checking the log so that a publish in between is not missed
            let shared = Arc::clone(&self.shared);
            let notified = shared.notify.notified();
            if let Some(delivery) = self.poll_log() {
                self.cursor += 1;
                return Some(Ok(delivery));
            }
            if self.shared.closed.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }

    async fn commit(&mut self, delivery: &Delivery) -> Result<(), BrokerError> {
        let mut topics = self.shared.topics();
        let topic = topics
            .get_mut(&delivery.topic)
            .ok_or_else(|| BrokerError::Commit(format!("unknown topic {}", delivery.topic)))?;
        topic.committed = Some(topic.committed.map_or(delivery.offset, |c| c.max(delivery.offset)));
        topic.drop_committed();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_messages_in_order() {
        let broker = ChannelBroker::new();
        broker.publish("t", Some("k"), b"one".to_vec()).await.unwrap();
        let mut sub = broker.subscribe("t").await.unwrap();
        let b2 = broker.clone();
        tokio::spawn(async move {
            b2.publish("t", None, b"two".to_vec()).await.unwrap();
            b2.publish("other", None, b"x".to_vec()).await.unwrap();
        });
        let first = sub.next_delivery().await.unwrap().unwrap();
        assert_eq!(first.payload, b"one");
        assert_eq!(first.key.as_deref(), Some(&b"k"[..]));
        let second = sub.next_delivery().await.unwrap().unwrap();
        assert_eq!(second.payload, b"two");
        assert_eq!(second.offset, 1);
    }

    #[tokio::test]
    async fn new_subscriptions_resume_after_the_last_commit() {
        let broker = ChannelBroker::new();
        for i in 0..3u8 {
            broker.publish("t", None, vec![i]).await.unwrap();
        }
        let mut sub = broker.subscribe("t").await.unwrap();
        let d = sub.next_delivery().await.unwrap().unwrap();
        sub.commit(&d).await.unwrap();
        // Received but never committed
        let _ = sub.next_delivery().await.unwrap().unwrap();
        drop(sub);
        assert_eq!(broker.committed_offset("t"), Some(0));
        let mut sub = broker.subscribe("t").await.unwrap();
        assert_eq!(sub.next_delivery().await.unwrap().unwrap().payload, vec![1]);
    }

    #[tokio::test]
    async fn closing_ends_subscriptions_after_draining() {
        let broker = ChannelBroker::new();
        broker.publish("t", None, vec![1]).await.unwrap();
        let mut sub = broker.subscribe("t").await.unwrap();
        broker.close();
        assert!(sub.next_delivery().await.unwrap().is_ok());
        assert!(sub.next_delivery().await.is_none());
        assert!(broker.publish("t", None, vec![2]).await.is_err());
    }

    #[tokio::test]
    async fn committed_messages_are_discarded() {
        let broker = ChannelBroker::new();
        for i in 0..3u8 {
            broker.publish("t", None, vec![i]).await.unwrap();
        }
        let mut sub = broker.subscribe("t").await.unwrap();
        let _ = sub.next_delivery().await.unwrap().unwrap();
        let second = sub.next_delivery().await.unwrap().unwrap();
        sub.commit(&second).await.unwrap();
        let remaining = broker.messages("t");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].offset, 2);

        // Offsets keep counting from where they were
        broker.publish("t", None, vec![3]).await.unwrap();
        assert_eq!(broker.latest_offset("t"), Some(3));
        assert_eq!(sub.next_delivery().await.unwrap().unwrap().payload, vec![2]);
        assert_eq!(sub.next_delivery().await.unwrap().unwrap().offset, 3);
        drop(sub);
        let mut sub = broker.subscribe("t").await.unwrap();
        assert_eq!(sub.next_delivery().await.unwrap().unwrap().offset, 2);
    }

    #[tokio::test]
    async fn uncommitted_messages_are_capped() {
        let broker = ChannelBroker::with_retention(2);
        let mut sub = broker.subscribe("t").await.unwrap();
        for i in 0..5u8 {
            broker.publish("t", None, vec![i]).await.unwrap();
        }
        let retained = broker.messages("t").into_iter().map(|d| d.offset).collect::<Vec<i64>>();
        assert_eq!(retained, vec![3, 4]);
        assert_eq!(broker.latest_offset("t"), Some(4));
        // A subscriber that fell behind skips ahead to the oldest retained message
        assert_eq!(sub.next_delivery().await.unwrap().unwrap().payload, vec![3]);
        assert_eq!(broker.latest_offset("unused"), None);
    }
}
