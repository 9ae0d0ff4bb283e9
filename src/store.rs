//! The local event store: a single JSON document of key-value pairs.
//!
//! Event records live under keys of the form `event-<day>-<start>` (see
//! [`EventRecord::storage_key`]); other namespaces may share the file and
//! are ignored when loading.

use color_eyre::eyre::{Context, Result};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::model::event::{EventRecord, KEY_PREFIX};

#[derive(Debug)]
pub struct EventStore {
    backing_file: PathBuf,
    data: BTreeMap<String, Value>,
}

impl EventStore {
    /// Open the store at the given path, starting empty if the backing file
    /// does not exist yet.
    ///
    /// A backing file that cannot be parsed aborts the open: the store makes
    /// no attempt at partial recovery.
    pub fn open(path: &Path) -> Result<EventStore> {
        let data = if path.exists() {
            let file = File::open(path)
                .wrap_err_with(|| format!("could not open the event store: {:?}", path))?;
            serde_json::from_reader(file)
                .wrap_err_with(|| format!("could not parse the event store: {:?}", path))?
        } else {
            debug!("no event store at {:?} yet, starting empty", path);
            BTreeMap::new()
        };

        Ok(EventStore {
            backing_file: PathBuf::from(path),
            data,
        })
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.backing_file.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err("could not create the event store directory")?;
        }

        let file = File::create(&self.backing_file)
            .wrap_err_with(|| format!("could not write the event store: {:?}", self.backing_file))?;
        serde_json::to_writer_pretty(file, &self.data).wrap_err("could not serialize the event store")
    }

    /// Save a record under its derived key, overwriting any record already
    /// stored under the same day and start time. Returns the key.
    pub fn save_event(&mut self, record: &EventRecord) -> Result<String> {
        let key = record.storage_key();
        self.data
            .insert(key.clone(), serde_json::to_value(record)?);
        self.persist()?;
        debug!("saved {}", key);

        Ok(key)
    }

    /// The record stored under the given key, if any
    pub fn get(&self, key: &str) -> Result<Option<EventRecord>> {
        self.data
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .wrap_err_with(|| format!("malformed record under {}", key))
    }

    /// Remove the record stored under the given key.
    ///
    /// Removing an absent key is a no-op and returns `Ok(None)`.
    pub fn delete(&mut self, key: &str) -> Result<Option<EventRecord>> {
        let removed = self.data.remove(key);
        if removed.is_none() {
            return Ok(None);
        }
        self.persist()?;
        debug!("deleted {}", key);

        removed
            .map(serde_json::from_value)
            .transpose()
            .wrap_err_with(|| format!("malformed record under {}", key))
    }

    /// Every event record in the store, eagerly collected.
    ///
    /// Keys outside the event namespace are skipped; a malformed value under
    /// an event key aborts the whole load. The order is whatever the store
    /// iterates in and callers must not rely on it for display.
    pub fn load_all(&self) -> Result<Vec<EventRecord>> {
        self.data
            .iter()
            .filter(|(key, _)| key.starts_with(KEY_PREFIX))
            .map(|(key, value)| {
                serde_json::from_value(value.clone())
                    .wrap_err_with(|| format!("malformed record under {}", key))
            })
            .collect()
    }

    /// Begin deleting a record.
    ///
    /// Nothing changes until [`PendingDelete::confirm`] is called; dropping
    /// the returned value (or calling [`PendingDelete::cancel`]) leaves the
    /// store exactly as it was.
    pub fn request_delete(&mut self, key: &str) -> PendingDelete<'_> {
        PendingDelete {
            store: self,
            key: key.to_string(),
        }
    }
}

/// A delete that has been requested but not yet confirmed
#[derive(Debug)]
pub struct PendingDelete<'a> {
    store: &'a mut EventStore,
    key: String,
}

impl PendingDelete<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The record this request would remove, if it exists
    pub fn record(&self) -> Result<Option<EventRecord>> {
        self.store.get(&self.key)
    }

    /// Carry out the deletion, returning the removed record
    pub fn confirm(self) -> Result<Option<EventRecord>> {
        self.store.delete(&self.key)
    }

    /// Abandon the request, leaving the store untouched
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(day: u32, hour: u32, title: &str) -> EventRecord {
        EventRecord {
            title: title.into(),
            day: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            start: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            kind: "Massage".into(),
            capacity: String::new(),
        }
    }

    fn open_store(dir: &TempDir) -> EventStore {
        EventStore::open(&dir.path().join("events.json")).unwrap()
    }

    #[test]
    fn saved_records_load_back_equal() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let event = record(5, 10, "Back massage");
        store.save_event(&event).unwrap();

        assert_eq!(store.load_all().unwrap(), vec![event]);
    }

    #[test]
    fn the_store_survives_a_reopen() {
        let dir = TempDir::new().unwrap();
        let event = record(5, 10, "Back massage");

        open_store(&dir).save_event(&event).unwrap();

        let reopened = open_store(&dir);
        assert_eq!(reopened.load_all().unwrap(), vec![event]);
    }

    #[test]
    fn saving_the_same_slot_twice_keeps_the_second_record() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.save_event(&record(5, 10, "First")).unwrap();
        store.save_event(&record(5, 10, "Second")).unwrap();

        let events = store.load_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Second");
    }

    #[test]
    fn deleting_removes_the_record() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let event = record(5, 10, "Back massage");
        let key = store.save_event(&event).unwrap();

        assert_eq!(store.delete(&key).unwrap(), Some(event));
        assert_eq!(store.load_all().unwrap(), vec![]);
    }

    #[test]
    fn deleting_an_absent_key_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert_eq!(store.delete("event-2024-06-05-10:00").unwrap(), None);
    }

    #[test]
    fn a_cancelled_delete_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let event = record(5, 10, "Back massage");
        let key = store.save_event(&event).unwrap();

        let pending = store.request_delete(&key);
        assert_eq!(pending.record().unwrap(), Some(event.clone()));
        pending.cancel();

        assert_eq!(store.load_all().unwrap(), vec![event]);
    }

    #[test]
    fn a_confirmed_delete_removes_the_record() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        let key = store.save_event(&record(5, 10, "Back massage")).unwrap();

        let pending = store.request_delete(&key);
        assert!(pending.confirm().unwrap().is_some());

        assert_eq!(store.load_all().unwrap(), vec![]);
    }

    #[test]
    fn foreign_namespaces_in_the_backing_file_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"{
                "event-2024-06-05-10:00": {
                    "title": "Back massage", "day": "2024-06-05",
                    "start": "10:00", "end": "11:00",
                    "kind": "Massage", "capacity": ""
                },
                "settings-theme": "dark"
            }"#,
        )
        .unwrap();

        let store = EventStore::open(&path).unwrap();
        let events = store.load_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Back massage");
    }

    #[test]
    fn a_malformed_event_record_aborts_the_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, r#"{"event-2024-06-05-10:00": {"title": 42}}"#).unwrap();

        let store = EventStore::open(&path).unwrap();
        assert!(store.load_all().is_err());
    }

    #[test]
    fn a_corrupt_backing_file_aborts_the_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(EventStore::open(&path).is_err());
    }
}
