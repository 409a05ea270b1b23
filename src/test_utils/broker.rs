use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::CimBroker;
use crate::CimInstance;
use crate::ObjectPath;
use crate::Result;
use crate::RuntimeError;

/// In-memory broker double: serves scripted enumerations per object path
/// and records everything delivered.
///
/// Each path holds a queue of snapshots; an enumeration pops the front
/// while more than one remains, then keeps serving the last one. An empty
/// plan yields empty snapshots.
#[derive(Default)]
pub struct MemoryBroker {
    plan: Mutex<HashMap<String, VecDeque<Vec<CimInstance>>>>,
    delivered: Mutex<Vec<(String, CimInstance)>>,
    enumerations: AtomicUsize,
    fail_deliveries: AtomicBool,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_snapshot(
        &self,
        path: &ObjectPath,
        snapshot: Vec<CimInstance>,
    ) {
        self.plan
            .lock()
            .entry(path.canonical())
            .or_default()
            .push_back(snapshot);
    }

    pub fn delivered(&self) -> Vec<(String, CimInstance)> {
        self.delivered.lock().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().len()
    }

    pub fn enumeration_count(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    /// Make every subsequent delivery fail.
    pub fn fail_deliveries(&self) {
        self.fail_deliveries.store(true, Ordering::SeqCst);
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
impl CimBroker for MemoryBroker {
    async fn enumerate_instances(
        &self,
        path: &ObjectPath,
    ) -> Result<Vec<CimInstance>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        let mut plan = self.plan.lock();
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
        if self.fail_deliveries.load(Ordering::SeqCst) {
            return Err(RuntimeError::Delivery("injected delivery failure".to_string()).into());
        }
        self.delivered.lock().push((namespace.to_string(), indication));
        Ok(())
    }
}
