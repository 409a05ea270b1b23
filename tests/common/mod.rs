use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ind_engine::CimBroker;
use ind_engine::CimInstance;
use ind_engine::CimValue;
use ind_engine::ObjectPath;
use ind_engine::Result;

pub const ACCOUNT_CLASS: &str = "LMI_Account";
pub const ACCOUNT_FILTER: &str =
    "SELECT * FROM LMI_AccountInstanceCreationIndication WHERE SourceInstance ISA LMI_Account";

pub const WAIT: Duration = Duration::from_secs(2);

pub fn account(
    uid: u32,
    name: &str,
) -> CimInstance {
    CimInstance::new(ACCOUNT_CLASS)
        .with_key("UserID", CimValue::Uint32(uid))
        .with_property("Name", CimValue::Str(name.to_string()))
}

pub fn account_path() -> ObjectPath {
    ObjectPath::new("root/cimv2", ACCOUNT_CLASS)
}

/// Scripted broker double for integration scenarios. Each watched path
/// holds a queue of snapshots; enumeration pops the front while more than
/// one remains, then keeps serving the last one.
#[derive(Default)]
pub struct ScriptedBroker {
    plan: Mutex<HashMap<String, VecDeque<Vec<CimInstance>>>>,
    delivered: Mutex<Vec<(String, CimInstance)>>,
    enumerations: AtomicUsize,
}

impl ScriptedBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_snapshot(
        &self,
        path: &ObjectPath,
        snapshot: Vec<CimInstance>,
    ) {
        self.plan
            .lock()
            .unwrap()
            .entry(path.canonical())
            .or_default()
            .push_back(snapshot);
    }

    pub fn delivered(&self) -> Vec<(String, CimInstance)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub async fn wait_for_deliveries(
        &self,
        count: usize,
        timeout: Duration,
    ) -> bool {
        wait_until(timeout, || self.delivered_count() >= count).await
    }

    pub async fn wait_for_enumerations(
        &self,
        count: usize,
        timeout: Duration,
    ) -> bool {
        wait_until(timeout, || self.enumeration_count() >= count).await
    }
}

async fn wait_until<F>(
    timeout: Duration,
    condition: F,
) -> bool
where F: Fn() -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    true
}

#[async_trait]
impl CimBroker for ScriptedBroker {
    async fn enumerate_instances(
        &self,
        path: &ObjectPath,
    ) -> Result<Vec<CimInstance>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let mut plan = self.plan.lock().unwrap();
        match plan.get_mut(&path.canonical()) {
            Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
            Some(queue) => Ok(queue.front().cloned().unwrap_or_default()),
            None => Ok(Vec::new()),
        }
    }

    async fn deliver(
        &self,
        namespace: &str,
        indication: CimInstance,
    ) -> Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((namespace.to_string(), indication));
        Ok(())
    }
}
