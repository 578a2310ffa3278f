use std::{
  collections::HashMap,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};

use tokio::sync::Mutex;

use crate::UserRecord;

#[derive(Default, Debug)]
pub struct ReferenceDb {
  pub records: Arc<Mutex<HashMap<i64, UserRecord>>>,
  /// Number of upserts that reached the store
  pub upserts: Arc<AtomicUsize>,
}

impl ReferenceDb {
  pub fn upsert_count(&self) -> usize {
    self.upserts.load(Ordering::SeqCst)
  }
}
