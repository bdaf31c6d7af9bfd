//! Embedded span store backed by `redb`.
//!
//! Rows are JSON strings keyed by id. Two index tables keep the lookups a
//! timeline needs cheap: connections by endpoint and phases by parent
//! connection, both as `"{owner}:{member}"` composite keys.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::{ConnectionRecord, Result, SpanId, SpanRecord, SpanlineError, StoredConnection};

/// `span_id -> SpanRecord` JSON.
const SPANS: TableDefinition<&str, &str> = TableDefinition::new("spans");
/// `connection_id -> StoredConnection` JSON.
const CONNECTIONS: TableDefinition<&str, &str> = TableDefinition::new("connections");
/// `"{span_id}:{connection_id}" -> connection_id`, one row per endpoint.
const CONNECTIONS_BY_SPAN: TableDefinition<&str, &str> =
    TableDefinition::new("connections_by_span");
/// `"{connection_id}:{phase_id}" -> phase_id`.
const PHASES: TableDefinition<&str, &str> = TableDefinition::new("phases");

/// Spans and the connections between them.
///
/// ```rust,no_run
/// use spanline::{DateFields, SpanKind, SpanRecord, SpanStore};
///
/// let store = SpanStore::open("people.spanline").unwrap();
/// store
///     .put_span(&SpanRecord::new("ada", "Ada", SpanKind::Person, DateFields::start_ymd(1990, 1, 1)))
///     .unwrap();
/// let ada = store.span(&"ada".into()).unwrap();
/// assert_eq!(ada.name, "Ada");
/// ```
pub struct SpanStore {
    db: Database,
}

impl SpanStore {
    /// Open or create a store at `path`.
    pub fn open(path: &str) -> Result<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// A store that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder().create_with_backend(backend)?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self> {
        {
            let write_txn = db.begin_write()?;
            write_txn.open_table(SPANS)?;
            write_txn.open_table(CONNECTIONS)?;
            write_txn.open_table(CONNECTIONS_BY_SPAN)?;
            write_txn.open_table(PHASES)?;
            write_txn.commit()?;
        }
        Ok(Self { db })
    }

    /// Insert or replace a span.
    ///
    /// Dates are optional, but when a start is present the range must be
    /// well formed.
    pub fn put_span(&self, span: &SpanRecord) -> Result<()> {
        if span.dates.has_start() {
            span.dates.to_range()?;
        }
        let value = serde_json::to_string(span)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SPANS)?;
            table.insert(span.id.as_str(), value.as_str())?;
        }
        write_txn.commit()?;
        tracing::debug!(span = %span.id, "span stored");
        Ok(())
    }

    pub fn span(&self, id: &SpanId) -> Result<SpanRecord> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SPANS)?;
        let raw: Option<String> = table.get(id.as_str())?.map(|g| g.value().to_string());
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(SpanlineError::NotFound(format!("span {id}"))),
        }
    }

    /// Insert or replace a connection.
    ///
    /// Both endpoints, and the parent connection of a phase, must already
    /// exist.
    pub fn put_connection(&self, connection: &StoredConnection) -> Result<()> {
        if connection.dates.has_start() {
            connection.dates.to_range()?;
        }
        self.span(&connection.parent)?;
        self.span(&connection.child)?;
        if let Some(owner) = &connection.phase_of {
            if *owner == connection.id {
                return Err(SpanlineError::InvalidRange(format!(
                    "connection {owner} cannot be a phase of itself"
                )));
            }
            self.stored_connection(owner)?;
        }

        let value = serde_json::to_string(connection)?;
        let id = connection.id.as_str();
        let write_txn = self.db.begin_write()?;
        {
            // Drop index rows of a replaced version first.
            let mut table = write_txn.open_table(CONNECTIONS)?;
            let previous: Option<String> = table.get(id)?.map(|g| g.value().to_string());
            if let Some(previous) = previous {
                let previous: StoredConnection = serde_json::from_str(&previous)?;
                let mut by_span = write_txn.open_table(CONNECTIONS_BY_SPAN)?;
                by_span.remove(format!("{}:{id}", previous.parent).as_str())?;
                by_span.remove(format!("{}:{id}", previous.child).as_str())?;
                if let Some(owner) = &previous.phase_of {
                    let mut phases = write_txn.open_table(PHASES)?;
                    phases.remove(format!("{owner}:{id}").as_str())?;
                }
            }
            table.insert(id, value.as_str())?;
        }
        {
            let mut by_span = write_txn.open_table(CONNECTIONS_BY_SPAN)?;
            by_span.insert(format!("{}:{id}", connection.parent).as_str(), id)?;
            by_span.insert(format!("{}:{id}", connection.child).as_str(), id)?;
        }
        if let Some(owner) = &connection.phase_of {
            let mut phases = write_txn.open_table(PHASES)?;
            phases.insert(format!("{owner}:{id}").as_str(), id)?;
        }
        write_txn.commit()?;
        tracing::debug!(connection = %connection.id, "connection stored");
        Ok(())
    }

    /// Every connection touching `span_id`, read from its side.
    ///
    /// Connections whose other end has gone missing are skipped with a
    /// warning.
    pub fn connections_of(&self, span_id: &SpanId) -> Result<Vec<ConnectionRecord>> {
        let ids = self.scan_index(CONNECTIONS_BY_SPAN, &format!("{span_id}:"))?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let stored = self.stored_connection(&SpanId(id))?;
            let Some(other_id) = stored.other_end(span_id) else {
                continue;
            };
            let other = match self.span(other_id) {
                Ok(span) => span.entity_ref(),
                Err(SpanlineError::NotFound(_)) => {
                    tracing::warn!(connection = %stored.id, other = %other_id, "dangling connection skipped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            records.extend(stored.normalize_for(span_id, other));
        }
        Ok(records)
    }

    /// Phases nested directly inside `connection_id`.
    pub fn phases_of(&self, connection_id: &SpanId) -> Result<Vec<StoredConnection>> {
        self.scan_index(PHASES, &format!("{connection_id}:"))?
            .into_iter()
            .map(|id| self.stored_connection(&SpanId(id)))
            .collect()
    }

    /// Phases of `connection_id`, each read from its own parent's side.
    pub fn phase_records(&self, connection_id: &SpanId) -> Result<Vec<ConnectionRecord>> {
        let mut records = Vec::new();
        for phase in self.phases_of(connection_id)? {
            let other = match self.span(&phase.child) {
                Ok(span) => span.entity_ref(),
                Err(SpanlineError::NotFound(_)) => {
                    tracing::warn!(phase = %phase.id, child = %phase.child, "dangling phase skipped");
                    continue;
                }
                Err(e) => return Err(e),
            };
            records.extend(phase.normalize_for(&phase.parent, other));
        }
        Ok(records)
    }

    pub fn stored_connection(&self, id: &SpanId) -> Result<StoredConnection> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CONNECTIONS)?;
        let raw: Option<String> = table.get(id.as_str())?.map(|g| g.value().to_string());
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Err(SpanlineError::NotFound(format!("connection {id}"))),
        }
    }

    // Internal: values of every index row whose key starts with `prefix`.
    fn scan_index(
        &self,
        index: TableDefinition<'static, &'static str, &'static str>,
        prefix: &str,
    ) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(index)?;
        let mut out = Vec::new();
        for entry in table.range(prefix..)? {
            let (k, v) = entry?;
            if !k.value().starts_with(prefix) {
                break;
            }
            out.push(v.value().to_string());
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateFields, Direction, SpanKind};
    use tempfile::NamedTempFile;

    fn open_temp_store() -> (SpanStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let store = SpanStore::open(&path).unwrap();
        (store, file)
    }

    fn seed(store: &SpanStore) {
        for span in [
            SpanRecord::new("ada", "Ada", SpanKind::Person, DateFields::start_ymd(1990, 1, 1)),
            SpanRecord::new("acme", "Acme", SpanKind::Organisation, DateFields::years(1950, None)),
            SpanRecord::new("leeds", "Leeds", SpanKind::Place, DateFields::default()),
        ] {
            store.put_span(&span).unwrap();
        }
    }

    fn connection(id: &str, parent: &str, child: &str, dates: DateFields) -> StoredConnection {
        StoredConnection {
            id: SpanId::new(id),
            connection_type: "employment".into(),
            parent: SpanId::new(parent),
            child: SpanId::new(child),
            forward_predicate: "worked at".into(),
            inverse_predicate: Some("employed".into()),
            dates,
            phase_of: None,
            state: None,
        }
    }

    #[test]
    fn span_round_trips_through_file() {
        let (store, file) = open_temp_store();
        seed(&store);
        drop(store);

        let reopened = SpanStore::open(file.path().to_str().unwrap()).unwrap();
        let ada = reopened.span(&SpanId::new("ada")).unwrap();
        assert_eq!(ada.kind, SpanKind::Person);
        assert_eq!(ada.dates, DateFields::start_ymd(1990, 1, 1));
    }

    #[test]
    fn missing_span_is_not_found() {
        let store = SpanStore::open_in_memory().unwrap();
        let err = store.span(&SpanId::new("nobody")).unwrap_err();
        assert!(matches!(err, SpanlineError::NotFound(_)));
    }

    #[test]
    fn inverted_span_dates_are_rejected() {
        let store = SpanStore::open_in_memory().unwrap();
        let span = SpanRecord::new("x", "X", SpanKind::Event, DateFields::years(2005, Some(2001)));
        assert!(matches!(
            store.put_span(&span).unwrap_err(),
            SpanlineError::InvalidRange(_)
        ));
    }

    #[test]
    fn connections_read_from_each_side() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        store
            .put_connection(&connection("job", "ada", "acme", DateFields::years(1997, Some(2000))))
            .unwrap();

        let from_ada = store.connections_of(&SpanId::new("ada")).unwrap();
        assert_eq!(from_ada.len(), 1);
        assert_eq!(from_ada[0].predicate, "worked at");
        assert_eq!(from_ada[0].direction, Direction::SubjectIsParent);
        assert_eq!(from_ada[0].other.name, "Acme");

        let from_acme = store.connections_of(&SpanId::new("acme")).unwrap();
        assert_eq!(from_acme[0].predicate, "employed");
        assert_eq!(from_acme[0].direction, Direction::SubjectIsChild);
        assert_eq!(from_acme[0].other.id, SpanId::new("ada"));

        assert!(store.connections_of(&SpanId::new("leeds")).unwrap().is_empty());
    }

    #[test]
    fn prefix_scan_does_not_leak_between_ids() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        store
            .put_span(&SpanRecord::new("adam", "Adam", SpanKind::Person, DateFields::default()))
            .unwrap();
        store
            .put_connection(&connection("c1", "adam", "acme", DateFields::default()))
            .unwrap();
        assert!(store.connections_of(&SpanId::new("ada")).unwrap().is_empty());
        assert_eq!(store.connections_of(&SpanId::new("adam")).unwrap().len(), 1);
    }

    #[test]
    fn connection_needs_both_endpoints() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        let err = store
            .put_connection(&connection("job", "ada", "ghost", DateFields::default()))
            .unwrap_err();
        assert!(matches!(err, SpanlineError::NotFound(_)));
    }

    #[test]
    fn replacing_a_connection_moves_its_index_rows() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        store
            .put_connection(&connection("job", "ada", "acme", DateFields::default()))
            .unwrap();
        store
            .put_connection(&connection("job", "ada", "leeds", DateFields::default()))
            .unwrap();

        assert!(store.connections_of(&SpanId::new("acme")).unwrap().is_empty());
        let from_ada = store.connections_of(&SpanId::new("ada")).unwrap();
        assert_eq!(from_ada.len(), 1);
        assert_eq!(from_ada[0].other.id, SpanId::new("leeds"));
    }

    #[test]
    fn phases_are_indexed_under_their_connection() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        store
            .put_connection(&connection("job", "ada", "acme", DateFields::years(1997, Some(2005))))
            .unwrap();
        let mut phase = connection("job-p1", "ada", "acme", DateFields::years(1999, Some(2001)));
        phase.phase_of = Some(SpanId::new("job"));
        store.put_connection(&phase).unwrap();

        let phases = store.phases_of(&SpanId::new("job")).unwrap();
        assert_eq!(phases, vec![phase]);
        assert!(store.phases_of(&SpanId::new("job-p1")).unwrap().is_empty());

        let from_ada = store.connections_of(&SpanId::new("ada")).unwrap();
        assert_eq!(from_ada.iter().filter(|c| c.is_phase()).count(), 1);
    }

    #[test]
    fn phases_relate_to_their_own_connection() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        let job = connection("job", "ada", "acme", DateFields::years(1997, Some(2005)));
        store.put_connection(&job).unwrap();
        let mut phase = connection("job-p1", "ada", "acme", DateFields::years(1999, Some(2001)));
        phase.phase_of = Some(SpanId::new("job"));
        store.put_connection(&phase).unwrap();

        let records = store.phase_records(&job.id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].other.name, "Acme");
        assert_eq!(records[0].direction, Direction::SubjectIsParent);

        let set = crate::relations::aggregate_phases(
            &store.stored_connection(&job.id).unwrap(),
            &records,
            crate::AggregateOptions::default(),
        );
        assert_eq!(set.entries()[0].raw, crate::AllenRelation::During);
        assert_eq!(set.entries()[0].display, crate::DisplayRelation::Contains);
    }

    #[test]
    fn phase_of_unknown_connection_is_rejected() {
        let store = SpanStore::open_in_memory().unwrap();
        seed(&store);
        let mut phase = connection("p", "ada", "acme", DateFields::default());
        phase.phase_of = Some(SpanId::new("nope"));
        assert!(store.put_connection(&phase).is_err());
        phase.phase_of = Some(SpanId::new("p"));
        assert!(store.put_connection(&phase).is_err());
    }
}
