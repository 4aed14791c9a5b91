use std::fmt::Debug;
use std::hash::Hash;
use std::pin::pin;
use std::sync::Arc;

use ahash::{HashMap, HashMapExt, HashSet, HashSetExt};
use futures::StreamExt;
use k8s_openapi::serde::de::DeserializeOwned;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{WatchStreamExt, watcher};
use kube::{Api, Resource};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{Error, Result};

/// A change to a watched object, in the shape of a classic informer callback.
#[derive(Debug, Clone)]
pub enum Notification<K> {
    Added(Arc<K>),
    Updated { old: Arc<K>, new: Arc<K> },
    Deleted(Arc<K>),
}

impl<K> Notification<K> {
    /// The object the notification is about; the new copy for updates.
    pub fn object(&self) -> &Arc<K> {
        match self {
            Notification::Added(k) => k,
            Notification::Updated { new, .. } => new,
            Notification::Deleted(k) => k,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Added(_) => "added",
            Notification::Updated { .. } => "updated",
            Notification::Deleted(_) => "deleted",
        }
    }
}

/// Turns raw watcher events into add/update/delete notifications.
///
/// The last observed copy of every object is kept so updates can carry the
/// previous state, and so a relist can report objects that disappeared while
/// the watch was down.
pub struct NotificationTranslator<K>
where
    K: Resource,
    K::DynamicType: Hash + Eq,
{
    known: HashMap<ObjectRef<K>, Arc<K>>,
    relisted: Option<HashSet<ObjectRef<K>>>,
}

impl<K> Default for NotificationTranslator<K>
where
    K: Resource,
    K::DynamicType: Hash + Eq,
{
    fn default() -> Self {
        Self {
            known: HashMap::new(),
            relisted: None,
        }
    }
}

impl<K> NotificationTranslator<K>
where
    K: Resource + Clone,
    K::DynamicType: Default + Hash + Eq + Clone,
{
    pub fn translate(&mut self, event: watcher::Event<K>) -> Vec<Notification<K>> {
        match event {
            watcher::Event::Apply(obj) => vec![self.observe(obj)],
            watcher::Event::Delete(obj) => {
                let obj_ref = ObjectRef::from_obj(&obj);
                self.known.remove(&obj_ref);
                vec![Notification::Deleted(Arc::new(obj))]
            }
            watcher::Event::Init => {
                self.relisted = Some(HashSet::new());
                Vec::new()
            }
            watcher::Event::InitApply(obj) => {
                if let Some(relisted) = self.relisted.as_mut() {
                    relisted.insert(ObjectRef::from_obj(&obj));
                }
                vec![self.observe(obj)]
            }
            watcher::Event::InitDone => {
                let Some(relisted) = self.relisted.take() else {
                    return Vec::new();
                };
                let gone: Vec<ObjectRef<K>> = self
                    .known
                    .keys()
                    .filter(|obj_ref| !relisted.contains(*obj_ref))
                    .cloned()
                    .collect();
                gone.into_iter()
                    .filter_map(|obj_ref| self.known.remove(&obj_ref))
                    .map(Notification::Deleted)
                    .collect()
            }
        }
    }

    fn observe(&mut self, obj: K) -> Notification<K> {
        let new = Arc::new(obj);
        match self.known.insert(ObjectRef::from_obj(new.as_ref()), new.clone()) {
            Some(old) => Notification::Updated { old, new },
            None => Notification::Added(new),
        }
    }
}

/// Watches one kind on one cluster and pumps notifications into a channel.
pub struct Informer<K>
where
    K: Resource,
{
    api: Api<K>,
    config: watcher::Config,
}

impl<K> Informer<K>
where
    K: Resource + Send + Clone + Debug + DeserializeOwned + Sync + 'static,
    K::DynamicType: Default + Eq + Send + Hash + Clone,
{
    pub fn new(api: Api<K>) -> Self {
        Self {
            api,
            config: watcher::Config::default(),
        }
    }

    /// Runs the watch until `cancel` fires.
    ///
    /// `synced` is cancelled once the initial list has been delivered. The
    /// watch retries on its own with backoff, so only the end of the stream or
    /// a dropped receiver is returned as an error.
    pub async fn run(
        self,
        tx: Sender<Notification<K>>,
        synced: CancellationToken,
        cancel: CancellationToken,
    ) -> Result<()> {
        let mut translator = NotificationTranslator::default();
        let mut stream = pin!(watcher(self.api, self.config).default_backoff());

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("stopping informer for {}", K::kind(&K::DynamicType::default()));
                    return Ok(());
                }
                event = stream.next() => event,
            };

            match event {
                Some(Ok(event)) => {
                    let init_done = matches!(event, watcher::Event::InitDone);
                    for notification in translator.translate(event) {
                        debug!("delivering {} notification", notification.kind());
                        if tx.send(notification).await.is_err() {
                            error!("failed to send notification as receiver has been dropped");
                            return Err(Error::ChannelClosed);
                        }
                    }
                    if init_done && !synced.is_cancelled() {
                        info!("informer for {} synced", K::kind(&K::DynamicType::default()));
                        synced.cancel();
                    }
                }
                Some(Err(e)) => {
                    error!(%e, "unexpected error with stream")
                }
                None => return Err(Error::KubeStreamFailed),
            }
        }
    }
}
