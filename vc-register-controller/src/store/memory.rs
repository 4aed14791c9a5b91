use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use kube::ResourceExt;

use super::{ObjectStore, StoreError, StoreObject, StoreResult};

type Key = (String, Option<String>, String);

/// A write or read seen by the store, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub verb: &'static str,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Default)]
struct Inner {
    objects: BTreeMap<Key, serde_json::Value>,
    ops: Vec<Op>,
    failures: HashMap<(&'static str, String), String>,
    version: u64,
}

/// In-memory stand-in for an API server.
///
/// Assigns resource versions and uids on create, rejects replaces carrying a
/// stale resource version, and removes a namespace's objects with it.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn insert<K: StoreObject>(&self, obj: K) -> K {
        let mut inner = self.inner.lock().unwrap();
        let obj = inner.stamp(obj, true);
        let key = key_of(&obj);
        inner
            .objects
            .insert(key, serde_json::to_value(&obj).unwrap());
        obj
    }

    pub fn fetch<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> Option<K> {
        let inner = self.inner.lock().unwrap();
        inner
            .objects
            .get(&key::<K>(namespace, name))
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    pub fn contains<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> bool {
        self.fetch::<K>(namespace, name).is_some()
    }

    /// Makes every `verb` call on `K` fail with `message`.
    pub fn fail<K: StoreObject>(&self, verb: &'static str, message: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .failures
            .insert((verb, K::kind(&()).into_owned()), message.into());
    }

    pub fn ops(&self) -> Vec<Op> {
        self.inner.lock().unwrap().ops.clone()
    }

    /// Operations of one verb, as `kind/namespace/name` strings.
    pub fn ops_for(&self, verb: &str) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter(|op| op.verb == verb)
            .map(|op| {
                format!(
                    "{}/{}/{}",
                    op.kind,
                    op.namespace.unwrap_or_default(),
                    op.name
                )
            })
            .collect()
    }
}

impl Inner {
    fn record<K: StoreObject>(
        &mut self,
        verb: &'static str,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        self.ops.push(Op {
            verb,
            kind: K::kind(&()).into_owned(),
            namespace: namespace.map(String::from),
            name: name.into(),
        });
        match self.failures.get(&(verb, K::kind(&()).into_owned())) {
            Some(message) => Err(StoreError::Other(message.clone())),
            None => Ok(()),
        }
    }

    fn stamp<K: StoreObject>(&mut self, mut obj: K, fresh: bool) -> K {
        self.version += 1;
        let meta = obj.meta_mut();
        meta.resource_version = Some(self.version.to_string());
        if fresh || meta.uid.as_deref().unwrap_or_default().is_empty() {
            meta.uid = Some(format!("uid-{}", self.version));
        }
        obj
    }
}

fn key<K: StoreObject>(namespace: Option<&str>, name: &str) -> Key {
    (
        K::kind(&()).into_owned(),
        namespace.map(String::from),
        name.into(),
    )
}

fn decode<K: StoreObject>(value: &serde_json::Value) -> StoreResult<K> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Other(e.to_string()))
}

fn key_of<K: StoreObject>(obj: &K) -> Key {
    key::<K>(obj.namespace().as_deref(), &obj.name_any())
}

impl ObjectStore for MemoryStore {
    async fn get<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> StoreResult<K> {
        let mut inner = self.inner.lock().unwrap();
        inner.record::<K>("get", namespace, name)?;
        let value = inner
            .objects
            .get(&key::<K>(namespace, name))
            .ok_or(StoreError::NotFound)?;
        decode(value)
    }

    async fn list<K: StoreObject>(&self, namespace: Option<&str>) -> StoreResult<Vec<K>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record::<K>("list", namespace, "")?;
        let kind = K::kind(&()).into_owned();
        inner
            .objects
            .iter()
            .filter(|((k, ns, _), _)| {
                *k == kind && (namespace.is_none() || ns.as_deref() == namespace)
            })
            .map(|(_, v)| decode(v))
            .collect()
    }

    async fn create<K: StoreObject>(&self, obj: &K) -> StoreResult<K> {
        let mut inner = self.inner.lock().unwrap();
        let key = key_of(obj);
        inner.record::<K>("create", key.1.as_deref(), &key.2)?;
        if inner.objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        let obj = inner.stamp(obj.clone(), true);
        let value = serde_json::to_value(&obj).map_err(|e| StoreError::Other(e.to_string()))?;
        inner.objects.insert(key, value);
        Ok(obj)
    }

    async fn update<K: StoreObject>(&self, obj: &K) -> StoreResult<K> {
        let mut inner = self.inner.lock().unwrap();
        let key = key_of(obj);
        inner.record::<K>("update", key.1.as_deref(), &key.2)?;
        let current: K = match inner.objects.get(&key) {
            Some(v) => decode(v)?,
            None => return Err(StoreError::NotFound),
        };
        let version = obj.resource_version();
        if version.is_some() && version != current.resource_version() {
            return Err(StoreError::Conflict);
        }
        let mut obj = obj.clone();
        obj.meta_mut().uid = current.uid();
        let obj = inner.stamp(obj, false);
        let value = serde_json::to_value(&obj).map_err(|e| StoreError::Other(e.to_string()))?;
        inner.objects.insert(key, value);
        Ok(obj)
    }

    async fn delete<K: StoreObject>(&self, namespace: Option<&str>, name: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.record::<K>("delete", namespace, name)?;
        inner
            .objects
            .remove(&key::<K>(namespace, name))
            .ok_or(StoreError::NotFound)?;
        if K::kind(&()) == "Namespace" {
            inner
                .objects
                .retain(|(_, ns, _), _| ns.as_deref() != Some(name));
        }
        Ok(())
    }
}
