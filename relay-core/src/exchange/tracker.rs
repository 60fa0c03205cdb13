use std::collections::HashMap;
use std::sync::Arc;

use rst_common::standard::serde_json::Value;
use rst_common::with_logging::log::{debug, info, warn};
use rst_common::with_tokio::tokio;
use rst_common::with_tokio::tokio::sync::RwLock;

use super::record::{ExchangeRecord, Transition};
use super::types::{
    ExchangeError, Notification, NotificationState, Notifier, Participant, Stage, Topic,
};

/// `Tracker` drives every exchange through its stages
///
/// The notification of a terminal transition is claimed while the records lock is held
/// and dispatched after it has been released, so a slow intake endpoint never blocks
/// other exchanges. Delivery runs on its own task: a caller dropping the future of
/// `advance` never leaves a claimed notification in `Pending`
pub struct Tracker<TNotifier>
where
    TNotifier: Notifier,
{
    notifier: Arc<TNotifier>,
    records: Arc<RwLock<HashMap<String, ExchangeRecord>>>,
    aliases: RwLock<HashMap<String, String>>,
}

impl<TNotifier> Tracker<TNotifier>
where
    TNotifier: Notifier,
{
    pub fn new(notifier: TNotifier) -> Self {
        Self {
            notifier: Arc::new(notifier),
            records: Arc::new(RwLock::new(HashMap::new())),
            aliases: RwLock::new(HashMap::new()),
        }
    }

    pub async fn begin_exchange(
        &self,
        token: String,
        participants: Vec<Participant>,
    ) -> Result<ExchangeRecord, ExchangeError> {
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&token) {
            let same_attempt = existing.get_stage() == Stage::Initiated
                && existing.get_participants() == participants;

            if same_attempt {
                debug!("[tracker:begin_exchange] repeated begin for {}", token);
                return Ok(existing.clone());
            }

            return Err(ExchangeError::DuplicateToken(token));
        }

        let record = ExchangeRecord::new(token.clone(), participants);
        records.insert(token.clone(), record.clone());

        info!("[tracker:begin_exchange] tracking {}", token);
        Ok(record)
    }

    pub async fn advance(
        &self,
        token: String,
        target: Stage,
        payload: Option<Value>,
    ) -> Result<ExchangeRecord, ExchangeError> {
        let (record, claimed) = {
            let mut records = self.records.write().await;
            let record = records
                .get_mut(&token)
                .ok_or(ExchangeError::UnknownToken(token.clone()))?;

            if record.check_transition(target)? == Transition::Unchanged {
                debug!("[tracker:advance] {} already at {}", token, target);
                return Ok(record.clone());
            }

            let from = record.get_stage();
            record.apply(target, payload);
            let claimed = record.claim_notification();

            info!("[tracker:advance] {}: {} -> {}", token, from, target);
            (record.clone(), claimed)
        };

        if !claimed {
            return Ok(record);
        }

        self.deliver(record).await
    }

    /// `retry_notification` claims a failed terminal notification again
    pub async fn retry_notification(&self, token: String) -> Result<ExchangeRecord, ExchangeError> {
        let record = {
            let mut records = self.records.write().await;
            let record = records
                .get_mut(&token)
                .ok_or(ExchangeError::UnknownToken(token.clone()))?;

            if record.get_notification() != NotificationState::Failed {
                return Err(ExchangeError::NotificationNotPending(token));
            }

            record.set_notification(NotificationState::Pending);
            record.clone()
        };

        self.deliver(record).await
    }

    /// `announce` sends an intermediate notification, it does not touch the notification state
    pub async fn announce(&self, topic: Topic, token: String) -> Result<(), ExchangeError> {
        let record = self.lookup(token).await?;
        self.notifier
            .notify(Notification::new(
                topic,
                record.get_token(),
                record.get_stage(),
            ))
            .await
    }

    pub async fn lookup(&self, token: String) -> Result<ExchangeRecord, ExchangeError> {
        let records = self.records.read().await;
        records
            .get(&token)
            .cloned()
            .ok_or(ExchangeError::UnknownToken(token))
    }

    /// `list_pending` returns every non-terminal record, in no particular order
    pub async fn list_pending(&self) -> Vec<ExchangeRecord> {
        let records = self.records.read().await;
        records
            .values()
            .filter(|record| !record.get_stage().is_terminal())
            .cloned()
            .collect()
    }

    pub async fn link_alias(&self, token: String, alias: String) -> Result<(), ExchangeError> {
        if !self.records.read().await.contains_key(&token) {
            return Err(ExchangeError::UnknownToken(token));
        }

        let mut aliases = self.aliases.write().await;
        aliases.insert(alias.clone(), token.clone());

        debug!("[tracker:link_alias] {} -> {}", alias, token);
        Ok(())
    }

    pub async fn resolve_alias(&self, alias: String) -> Result<String, ExchangeError> {
        let aliases = self.aliases.read().await;
        aliases
            .get(&alias)
            .cloned()
            .ok_or(ExchangeError::UnknownToken(alias))
    }

    /// `link_thread` records an agent thread id under an exchange opened with its own token
    pub async fn link_thread(
        &self,
        token: String,
        thid: String,
    ) -> Result<ExchangeRecord, ExchangeError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&token)
            .ok_or(ExchangeError::UnknownToken(token.clone()))?;

        if record.add_thread(thid.clone()) {
            debug!("[tracker:link_thread] {} -> {}", thid, token);
        }

        Ok(record.clone())
    }

    async fn deliver(&self, record: ExchangeRecord) -> Result<ExchangeRecord, ExchangeError> {
        let token = record.get_token();
        let notification =
            Notification::new(Topic::ExchangeCompleted, token.clone(), record.get_stage());

        let notifier = self.notifier.clone();
        let records = self.records.clone();
        let task_token = token.clone();

        let delivery = tokio::spawn(async move {
            let delivered = notifier.notify(notification).await;
            let state = match &delivered {
                Ok(_) => NotificationState::Delivered,
                Err(_) => NotificationState::Failed,
            };

            let mut records = records.write().await;
            let record = records
                .get_mut(&task_token)
                .ok_or(ExchangeError::UnknownToken(task_token.clone()))?;

            record.set_notification(state);
            delivered.map(|_| record.clone())
        });

        let outcome = match delivery.await {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Some(record) = self.records.write().await.get_mut(&token) {
                    record.set_notification(NotificationState::Failed);
                }

                Err(ExchangeError::NotificationFailed(err.to_string()))
            }
        };

        outcome.map_err(|err| {
            warn!("[tracker:deliver] notification for {} failed: {}", token, err);
            match err {
                ExchangeError::UnknownToken(_) => err,
                other => ExchangeError::NotificationFailed(other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use std::time::Duration;

    use mockall::mock;

    use rst_common::standard::async_trait::async_trait;
    use rst_common::standard::serde_json::json;
    use rst_common::with_tokio::tokio;

    mock!(
        FakeNotifier{}

        #[async_trait]
        impl Notifier for FakeNotifier {
            async fn notify(&self, notification: Notification) -> Result<(), ExchangeError>;
        }
    );

    struct SlowNotifier {
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for SlowNotifier {
        async fn notify(&self, _: Notification) -> Result<(), ExchangeError> {
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(ExchangeError::NotificationFailed("timed out".to_string()));
            }

            Ok(())
        }
    }

    fn silent_notifier() -> MockFakeNotifier {
        let mut notifier = MockFakeNotifier::new();
        notifier.expect_notify().never();
        notifier
    }

    #[tokio::test]
    async fn test_begin_exchange_duplicate_token() {
        let tracker = Tracker::new(silent_notifier());
        let participants = vec![Participant::Identity("alice".to_string())];

        let first = tracker
            .begin_exchange("thid-1".to_string(), participants.clone())
            .await;
        assert!(!first.is_err());

        let repeated = tracker
            .begin_exchange("thid-1".to_string(), participants)
            .await;
        assert!(!repeated.is_err());
        assert_eq!(repeated.unwrap().get_stage(), Stage::Initiated);

        let other = tracker
            .begin_exchange(
                "thid-1".to_string(),
                vec![Participant::Identity("bob".to_string())],
            )
            .await;
        assert_eq!(
            other.unwrap_err(),
            ExchangeError::DuplicateToken("thid-1".to_string())
        );
    }

    #[tokio::test]
    async fn test_begin_exchange_duplicate_after_progress() {
        let tracker = Tracker::new(silent_notifier());

        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;
        let _ = tracker
            .advance("thid-1".to_string(), Stage::OfferSent, None)
            .await;

        let repeated = tracker.begin_exchange("thid-1".to_string(), vec![]).await;
        assert!(matches!(
            repeated.unwrap_err(),
            ExchangeError::DuplicateToken(_)
        ));
    }

    #[tokio::test]
    async fn test_full_exchange_in_order() {
        let mut notifier = MockFakeNotifier::new();
        notifier
            .expect_notify()
            .withf(|notification| notification.token == "thid-1")
            .times(1)
            .returning(|_| Ok(()));

        let tracker = Tracker::new(notifier);
        let participants = vec![
            Participant::Issuer("did:prism:issuer".to_string()),
            Participant::Identity("holder".to_string()),
        ];

        let begin = tracker
            .begin_exchange("thid-1".to_string(), participants)
            .await;
        assert!(!begin.is_err());

        for stage in [
            Stage::OfferSent,
            Stage::OfferAccepted,
            Stage::PresentationRequested,
            Stage::PresentationAccepted,
        ] {
            let result = tracker.advance("thid-1".to_string(), stage, None).await;
            assert!(!result.is_err());
        }

        let verified = tracker
            .advance(
                "thid-1".to_string(),
                Stage::Verified,
                Some(json!({"level": 2})),
            )
            .await;
        assert!(!verified.is_err());

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_stage(), Stage::Verified);
        assert_eq!(record.get_payload(), json!({"level": 2}));
    }

    #[tokio::test]
    async fn test_advance_unknown_token() {
        let tracker = Tracker::new(silent_notifier());
        let result = tracker
            .advance("missing".to_string(), Stage::OfferSent, None)
            .await;

        assert_eq!(
            result.unwrap_err(),
            ExchangeError::UnknownToken("missing".to_string())
        );
    }

    #[tokio::test]
    async fn test_advance_idempotent_single_notification() {
        let mut notifier = MockFakeNotifier::new();
        notifier
            .expect_notify()
            .withf(|notification| {
                notification.topic == Topic::ExchangeCompleted
                    && notification.stage == Stage::Verified
            })
            .times(1)
            .returning(|_| Ok(()));

        let tracker = Tracker::new(notifier);
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let first = tracker
            .advance("thid-1".to_string(), Stage::Verified, Some(json!({"a": 1})))
            .await;
        assert!(!first.is_err());
        assert_eq!(
            first.unwrap().get_notification(),
            NotificationState::Delivered
        );

        let second = tracker
            .advance("thid-1".to_string(), Stage::Verified, Some(json!({"b": 2})))
            .await;
        assert!(!second.is_err());
        assert_eq!(second.unwrap().get_payload(), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_advance_backwards_is_rejected() {
        let mut notifier = MockFakeNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let tracker = Tracker::new(notifier);
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;
        let _ = tracker
            .advance("thid-1".to_string(), Stage::Verified, None)
            .await;

        let result = tracker
            .advance("thid-1".to_string(), Stage::OfferSent, None)
            .await;
        assert_eq!(
            result.unwrap_err(),
            ExchangeError::InvalidTransition {
                from: Stage::Verified,
                to: Stage::OfferSent
            }
        );

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_stage(), Stage::Verified);
    }

    #[tokio::test]
    async fn test_advance_to_failed() {
        let mut notifier = MockFakeNotifier::new();
        notifier
            .expect_notify()
            .withf(|notification| notification.stage == Stage::Failed)
            .times(1)
            .returning(|_| Ok(()));

        let tracker = Tracker::new(notifier);
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;
        let _ = tracker
            .advance("thid-1".to_string(), Stage::OfferSent, None)
            .await;

        let result = tracker
            .advance("thid-1".to_string(), Stage::Failed, None)
            .await;
        assert!(!result.is_err());
        assert_eq!(result.unwrap().get_stage(), Stage::Failed);

        assert!(tracker.list_pending().await.is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_and_retry() {
        let mut notifier = MockFakeNotifier::new();
        let mut attempts = 0;
        notifier.expect_notify().times(2).returning(move |_| {
            attempts += 1;
            if attempts == 1 {
                return Err(ExchangeError::NotificationFailed(
                    "connection refused".to_string(),
                ));
            }

            Ok(())
        });

        let tracker = Tracker::new(notifier);
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let failed = tracker
            .advance("thid-1".to_string(), Stage::Verified, None)
            .await;
        assert!(matches!(
            failed.unwrap_err(),
            ExchangeError::NotificationFailed(_)
        ));

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_stage(), Stage::Verified);
        assert_eq!(record.get_notification(), NotificationState::Failed);

        let retried = tracker.retry_notification("thid-1".to_string()).await;
        assert!(!retried.is_err());
        assert_eq!(
            retried.unwrap().get_notification(),
            NotificationState::Delivered
        );

        let again = tracker.retry_notification("thid-1".to_string()).await;
        assert!(matches!(
            again.unwrap_err(),
            ExchangeError::NotificationNotPending(_)
        ));
    }

    #[tokio::test]
    async fn test_aliases() {
        let tracker = Tracker::new(silent_notifier());
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let linked = tracker
            .link_alias("thid-1".to_string(), "pres-1".to_string())
            .await;
        assert!(!linked.is_err());

        let token = tracker.resolve_alias("pres-1".to_string()).await;
        assert_eq!(token.unwrap(), "thid-1".to_string());

        let unknown = tracker
            .link_alias("thid-2".to_string(), "pres-2".to_string())
            .await;
        assert!(unknown.is_err());
    }

    #[tokio::test]
    async fn test_announce_intermediate() {
        let mut notifier = MockFakeNotifier::new();
        notifier
            .expect_notify()
            .withf(|notification| {
                notification.topic == Topic::OfferReady && notification.token == "thid-1"
            })
            .times(1)
            .returning(|_| Ok(()));

        let tracker = Tracker::new(notifier);
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;
        let _ = tracker
            .advance("thid-1".to_string(), Stage::OfferSent, None)
            .await;

        let result = tracker
            .announce(Topic::OfferReady, "thid-1".to_string())
            .await;
        assert!(!result.is_err());

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_notification(), NotificationState::Idle);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_terminal_advance_notifies_once() {
        let mut notifier = MockFakeNotifier::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let tracker = Arc::new(Tracker::new(notifier));
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let tracker_cloned = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker_cloned
                    .advance("thid-1".to_string(), Stage::Verified, None)
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap();
            assert!(!result.is_err());
        }

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_stage(), Stage::Verified);
    }

    #[tokio::test]
    async fn test_dropped_advance_still_records_delivery() {
        let tracker = Tracker::new(SlowNotifier {
            delay: Duration::from_millis(100),
            fail: false,
        });
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let dropped = tokio::time::timeout(
            Duration::from_millis(10),
            tracker.advance("thid-1".to_string(), Stage::Verified, None),
        )
        .await;
        assert!(dropped.is_err());

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_stage(), Stage::Verified);
        assert_eq!(record.get_notification(), NotificationState::Pending);

        tokio::time::sleep(Duration::from_millis(300)).await;

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_notification(), NotificationState::Delivered);
    }

    #[tokio::test]
    async fn test_dropped_advance_failure_can_be_retried() {
        let tracker = Tracker::new(SlowNotifier {
            delay: Duration::from_millis(100),
            fail: true,
        });
        let _ = tracker.begin_exchange("thid-1".to_string(), vec![]).await;

        let dropped = tokio::time::timeout(
            Duration::from_millis(10),
            tracker.advance("thid-1".to_string(), Stage::Failed, None),
        )
        .await;
        assert!(dropped.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;

        let record = tracker.lookup("thid-1".to_string()).await.unwrap();
        assert_eq!(record.get_notification(), NotificationState::Failed);

        let retried = tracker.retry_notification("thid-1".to_string()).await;
        assert!(matches!(
            retried.unwrap_err(),
            ExchangeError::NotificationFailed(_)
        ));
    }

    #[tokio::test]
    async fn test_link_thread() {
        let tracker = Tracker::new(silent_notifier());
        let _ = tracker.begin_exchange("app-1".to_string(), vec![]).await;

        let linked = tracker
            .link_thread("app-1".to_string(), "thid-9".to_string())
            .await;
        assert!(!linked.is_err());

        let repeated = tracker
            .link_thread("app-1".to_string(), "thid-9".to_string())
            .await;
        assert_eq!(repeated.unwrap().get_threads(), vec!["thid-9".to_string()]);

        let unknown = tracker
            .link_thread("app-2".to_string(), "thid-9".to_string())
            .await;
        assert_eq!(
            unknown.unwrap_err(),
            ExchangeError::UnknownToken("app-2".to_string())
        );
    }
}
