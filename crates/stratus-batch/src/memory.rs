use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use stratus_types::{canonical_key, project_key, BatchItem, Item};

use crate::error::SubmitError;
use crate::traits::{BatchSubmitter, SubmissionResult};

/// Scripted outcome for one submission against an [`InMemoryTable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedCall {
    /// Apply the batch as usual.
    Normal,
    /// Apply nothing and return the whole batch as unprocessed.
    RejectAll,
    Throttle,
    Abort,
    /// Fail with a transport error carrying this message.
    Fail(String),
}

/// Simulated provider behavior. Not persisted.
#[derive(Clone, Debug)]
struct Behavior {
    accept_per_call: Option<usize>,
    capacity_per_item: f64,
    missing: bool,
    script: VecDeque<ScriptedCall>,
    calls: usize,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            accept_per_call: None,
            capacity_per_item: 1.0,
            missing: false,
            script: VecDeque::new(),
            calls: 0,
        }
    }
}

/// In-memory key-value table with batch-write semantics.
///
/// Intended for tests, demos and the CLI. Rows are keyed by the canonical
/// form of their key attributes. The table can be told to accept only a
/// limited number of items per call (the rest come back unprocessed), to
/// throttle or fail on scripted calls, or to behave as if it were deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InMemoryTable {
    name: String,
    key_attributes: Vec<String>,
    rows: BTreeMap<String, Item>,
    #[serde(skip)]
    behavior: Behavior,
}

impl InMemoryTable {
    /// Create an empty table keyed by `key_attributes`.
    pub fn new(name: impl Into<String>, key_attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            key_attributes,
            rows: BTreeMap::new(),
            behavior: Behavior::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_attributes(&self) -> &[String] {
        &self.key_attributes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a row by its key attributes.
    pub fn get(&self, key: &Item) -> Option<&Item> {
        let key = project_key(key, &self.key_attributes).ok()?;
        let id = canonical_key(&key).ok()?;
        self.rows.get(&id)
    }

    /// All rows in key order.
    pub fn rows(&self) -> impl Iterator<Item = &Item> {
        self.rows.values()
    }

    /// Number of submissions received so far.
    pub fn calls(&self) -> usize {
        self.behavior.calls
    }

    /// Apply at most `limit` items per submission.
    pub fn set_accept_per_call(&mut self, limit: Option<usize>) {
        self.behavior.accept_per_call = limit;
    }

    /// Capacity units charged per applied item.
    pub fn set_capacity_per_item(&mut self, units: f64) {
        self.behavior.capacity_per_item = units;
    }

    /// Make every submission fail as if the table did not exist.
    pub fn set_missing(&mut self, missing: bool) {
        self.behavior.missing = missing;
    }

    /// Queue the outcome of the next unscripted submission.
    pub fn push_script(&mut self, call: ScriptedCall) {
        self.behavior.script.push_back(call);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Row id of the item's key attributes.
    fn row_id(&self, item: &BatchItem) -> Result<String, SubmitError> {
        let key = project_key(item.attributes(), &self.key_attributes).map_err(SubmitError::transport)?;
        canonical_key(&key).map_err(SubmitError::transport)
    }
}

impl BatchSubmitter for InMemoryTable {
    fn submit(&mut self, batch: &[BatchItem]) -> Result<SubmissionResult, SubmitError> {
        self.behavior.calls += 1;
        if self.behavior.missing {
            return Err(SubmitError::ResourceMissing);
        }
        match self.behavior.script.pop_front().unwrap_or(ScriptedCall::Normal) {
            ScriptedCall::Normal => {}
            ScriptedCall::RejectAll => return Ok(SubmissionResult::partial(batch.to_vec(), 0.0)),
            ScriptedCall::Throttle => return Err(SubmitError::ThroughputExceeded),
            ScriptedCall::Abort => return Err(SubmitError::Aborted),
            ScriptedCall::Fail(message) => return Err(SubmitError::transport(message)),
        }

        let accepted = self
            .behavior
            .accept_per_call
            .map_or(batch.len(), |limit| limit.min(batch.len()));
        // The whole request is validated before any row changes.
        let ids = batch[..accepted]
            .iter()
            .map(|item| self.row_id(item))
            .collect::<Result<Vec<_>, _>>()?;
        for (id, item) in ids.into_iter().zip(&batch[..accepted]) {
            match item {
                BatchItem::Put { item } => {
                    self.rows.insert(id, item.clone());
                }
                BatchItem::Delete { .. } => {
                    self.rows.remove(&id);
                }
            }
        }
        let consumed = accepted as f64 * self.behavior.capacity_per_item;
        Ok(SubmissionResult::partial(batch[accepted..].to_vec(), consumed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutorConfig;
    use crate::error::BatchError;
    use crate::executor::BatchExecutor;
    use crate::traits::RecordingSleeper;
    use stratus_types::AttributeValue;

    fn row(id: u32, name: &str) -> Item {
        let mut item = Item::new();
        item.insert("id".into(), AttributeValue::number(id));
        item.insert("name".into(), AttributeValue::string(name));
        item
    }

    fn key(id: u32) -> Item {
        let mut item = Item::new();
        item.insert("id".into(), AttributeValue::number(id));
        item
    }

    fn table() -> InMemoryTable {
        InMemoryTable::new("users", vec!["id".into()])
    }

    fn executor(batch: usize) -> BatchExecutor<RecordingSleeper> {
        let config = ExecutorConfig::for_target("users").with_max_batch_size(batch);
        BatchExecutor::with_sleeper(config, RecordingSleeper::new()).unwrap()
    }

    #[test]
    fn put_then_get() {
        let mut t = table();
        let r = t.submit(&[BatchItem::put(row(1, "alice"))]).unwrap();
        assert!(r.unprocessed_items.is_empty());
        assert_eq!(r.consumed_capacity_units, 1.0);
        assert_eq!(t.get(&key(1)).unwrap().get("name"), Some(&AttributeValue::string("alice")));
    }

    #[test]
    fn put_overwrites() {
        let mut t = table();
        t.submit(&[BatchItem::put(row(1, "alice"))]).unwrap();
        t.submit(&[BatchItem::put(row(1, "bob"))]).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(&key(1)).unwrap().get("name"), Some(&AttributeValue::string("bob")));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut t = table();
        t.submit(&[BatchItem::put(row(1, "alice"))]).unwrap();
        t.submit(&[BatchItem::delete(key(1))]).unwrap();
        t.submit(&[BatchItem::delete(key(1))]).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn accept_limit_leaves_tail_unprocessed() {
        let mut t = table();
        t.set_accept_per_call(Some(2));
        let batch: Vec<_> = (0..5).map(|i| BatchItem::put(row(i, "x"))).collect();
        let r = t.submit(&batch).unwrap();
        assert_eq!(r.unprocessed_items, batch[2..].to_vec());
        assert_eq!(r.consumed_capacity_units, 2.0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn missing_key_attribute_fails() {
        let mut t = table();
        let mut bad = Item::new();
        bad.insert("name".into(), AttributeValue::string("x"));
        assert!(matches!(
            t.submit(&[BatchItem::put(bad)]),
            Err(SubmitError::Transport(_))
        ));
    }

    #[test]
    fn invalid_item_leaves_batch_unapplied() {
        let mut t = table();
        let mut bad = Item::new();
        bad.insert("name".into(), AttributeValue::string("x"));
        let batch = [BatchItem::put(row(1, "alice")), BatchItem::put(bad)];
        assert!(t.submit(&batch).is_err());
        assert!(t.is_empty());
    }

    #[test]
    fn scripted_calls_run_in_order() {
        let mut t = table();
        t.push_script(ScriptedCall::RejectAll);
        t.push_script(ScriptedCall::Throttle);
        let batch = [BatchItem::put(row(1, "a"))];
        assert_eq!(t.submit(&batch).unwrap().unprocessed_items.len(), 1);
        assert!(matches!(t.submit(&batch), Err(SubmitError::ThroughputExceeded)));
        assert!(t.submit(&batch).unwrap().unprocessed_items.is_empty());
        assert_eq!(t.calls(), 3);
    }

    #[test]
    fn json_round_trip_drops_behavior() {
        let mut t = table();
        t.set_accept_per_call(Some(1));
        t.submit(&[BatchItem::put(row(7, "z"))]).unwrap();
        let back = InMemoryTable::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.calls(), 0);
        assert_eq!(back.key_attributes(), &["id".to_string()]);
    }

    // -----------------------------------------------------------------------
    // Driven by the executor
    // -----------------------------------------------------------------------

    #[test]
    fn executor_drains_throttled_table() {
        let mut t = table();
        t.set_accept_per_call(Some(3));
        let items = (0..10).map(|i| BatchItem::put(row(i, "x")));
        let mut exec = executor(5);
        let total = exec.submit_and_drain(items, &mut t).unwrap();
        assert_eq!(t.len(), 10);
        assert_eq!(total.items_written, 10);
        // Each batch of 5 needs one retry for its last 2 items.
        assert_eq!(total.submissions, 4);
        assert_eq!(total.total_retry_cycles, 2);
        assert_eq!(total.total_consumed_capacity_units, 10.0);
    }

    #[test]
    fn executor_deletes_rows() {
        let mut t = table();
        let mut exec = executor(25);
        exec.submit_and_drain((0..30).map(|i| BatchItem::put(row(i, "x"))), &mut t)
            .unwrap();
        exec.submit_and_drain((0..20).map(|i| BatchItem::delete(key(i))), &mut t)
            .unwrap();
        assert_eq!(t.len(), 10);
    }

    #[test]
    fn executor_reports_missing_table() {
        let mut t = table();
        t.set_missing(true);
        let err = executor(5)
            .submit_and_drain(vec![BatchItem::put(row(1, "a"))], &mut t)
            .unwrap_err();
        assert_eq!(err.to_string(), "target 'users' does not exist");
    }

    #[test]
    fn executor_survives_reject_all_rounds() {
        let mut t = table();
        t.push_script(ScriptedCall::RejectAll);
        t.push_script(ScriptedCall::RejectAll);
        let mut exec = executor(5);
        let total = exec
            .submit_and_drain((0..3).map(|i| BatchItem::put(row(i, "x"))), &mut t)
            .unwrap();
        assert_eq!(t.calls(), 3);
        assert_eq!(total.total_retry_cycles, 2);
        assert_eq!(exec.sleeper().delays().len(), 2);
    }

    #[test]
    fn executor_maps_abort_to_cancelled() {
        let mut t = table();
        t.push_script(ScriptedCall::Abort);
        let err = executor(5)
            .submit_and_drain(vec![BatchItem::put(row(1, "a"))], &mut t)
            .unwrap_err();
        assert!(matches!(err, BatchError::Cancelled { .. }));
    }

    #[test]
    fn executor_surfaces_transport_failure() {
        let mut t = table();
        t.push_script(ScriptedCall::Fail("socket closed".into()));
        let err = executor(5)
            .submit_and_drain(vec![BatchItem::put(row(1, "a"))], &mut t)
            .unwrap_err();
        assert!(err.to_string().contains("socket closed"));
    }
}
