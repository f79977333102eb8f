//! SQLite-backed trip persistence.
//!
//! One connection behind a mutex; rows in, values out. The `timeline_cache`
//! table holds the serialized result of the last generation per trip day and
//! is dropped by every mutation that touches that day's inputs.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use geo::Point;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use daytrip_itinerary::identifiers::{StopIdentifier, TripIdentifier};
use daytrip_itinerary::models::traits::DayPlanSource;
use daytrip_itinerary::models::types::{DayPlan, ItineraryError, Stop, Trip};
use daytrip_itinerary::timeline::Timeline;

/// Day start used until the user sets one (09:00).
pub const DEFAULT_DAY_START: u32 = 9 * 3600;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS trips (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS day_plans (
    trip_id    TEXT NOT NULL REFERENCES trips(id),
    date       TEXT NOT NULL,
    start_time INTEGER NOT NULL,
    PRIMARY KEY (trip_id, date)
);

CREATE TABLE IF NOT EXISTS stops (
    id           TEXT PRIMARY KEY,
    trip_id      TEXT NOT NULL REFERENCES trips(id),
    date         TEXT NOT NULL,
    position     INTEGER NOT NULL,
    name         TEXT NOT NULL,
    lng          REAL NOT NULL,
    lat          REAL NOT NULL,
    stay_minutes INTEGER NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stops_day ON stops (trip_id, date, position);

CREATE TABLE IF NOT EXISTS timeline_cache (
    trip_id      TEXT NOT NULL,
    date         TEXT NOT NULL,
    payload      TEXT NOT NULL,
    generated_at TEXT NOT NULL,
    PRIMARY KEY (trip_id, date)
);
";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Trip not found: {0}")]
    TripNotFound(TripIdentifier),

    #[error("Stop not found: {0}")]
    StopNotFound(StopIdentifier),
}

pub struct TripStore {
    conn: Mutex<Connection>,
}

impl TripStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ---- Trips ----

    pub fn create_trip(&self, name: &str) -> Result<Trip, StoreError> {
        let trip = Trip {
            id: TripIdentifier::new(Uuid::new_v4().to_string()),
            name: name.into(),
            created_at: Utc::now(),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO trips (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![trip.id.as_str(), &*trip.name, trip.created_at],
        )?;
        Ok(trip)
    }

    pub fn trip(&self, id: &TripIdentifier) -> Result<Option<Trip>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let trip = conn
            .query_row(
                "SELECT name, created_at FROM trips WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Trip {
                        id: id.clone(),
                        name: row.get::<_, String>(0)?.into(),
                        created_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(trip)
    }

    pub fn all_trips(&self) -> Result<Vec<Trip>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, created_at FROM trips ORDER BY created_at")?;
        let rows = stmt.query_map([], |row| {
            Ok(Trip {
                id: TripIdentifier::new(row.get::<_, String>(0)?),
                name: row.get::<_, String>(1)?.into(),
                created_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    // ---- Day plans ----

    pub fn set_day_start(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        start_time: u32,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        ensure_trip(&conn, trip)?;
        conn.execute(
            "INSERT INTO day_plans (trip_id, date, start_time) VALUES (?1, ?2, ?3)
             ON CONFLICT(trip_id, date) DO UPDATE SET start_time = excluded.start_time",
            params![trip.as_str(), date, start_time],
        )?;
        invalidate(&conn, trip, date)?;
        Ok(())
    }

    /// Ordered stops and start time for one trip day. `None` when the day has
    /// neither stops nor an explicit start.
    pub fn load_day_plan(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> Result<Option<DayPlan>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let start_time: Option<u32> = conn
            .query_row(
                "SELECT start_time FROM day_plans WHERE trip_id = ?1 AND date = ?2",
                params![trip.as_str(), date],
                |row| row.get(0),
            )
            .optional()?;
        let stops = load_stops(&conn, trip, date)?;

        if stops.is_empty() && start_time.is_none() {
            return Ok(None);
        }
        Ok(Some(DayPlan {
            trip_id: trip.clone(),
            date,
            start_time: start_time.unwrap_or(DEFAULT_DAY_START),
            stops,
        }))
    }

    // ---- Stops ----

    pub fn append_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Stop, StoreError> {
        let stop = Stop::new(
            Uuid::new_v4().to_string(),
            name,
            Point::new(longitude, latitude),
        );
        self.insert_stop(trip, date, &stop)?;
        Ok(stop)
    }

    pub fn append_stop_with_stay(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        name: &str,
        latitude: f64,
        longitude: f64,
        stay_minutes: u32,
    ) -> Result<Stop, StoreError> {
        let stop = Stop::new(
            Uuid::new_v4().to_string(),
            name,
            Point::new(longitude, latitude),
        )
        .with_stay(stay_minutes);
        self.insert_stop(trip, date, &stop)?;
        Ok(stop)
    }

    fn insert_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &Stop,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        ensure_trip(&conn, trip)?;
        let position: i64 = conn.query_row(
            "SELECT COUNT(*) FROM stops WHERE trip_id = ?1 AND date = ?2",
            params![trip.as_str(), date],
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO stops (id, trip_id, date, position, name, lng, lat, stay_minutes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                stop.id.as_str(),
                trip.as_str(),
                date,
                position,
                &*stop.name,
                stop.location.x(),
                stop.location.y(),
                stop.stay_minutes,
                stop.created_at,
                stop.updated_at,
            ],
        )?;
        invalidate(&conn, trip, date)?;
        Ok(())
    }

    pub fn update_stop_stay(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
        stay_minutes: u32,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE stops SET stay_minutes = ?1, updated_at = ?2
             WHERE id = ?3 AND trip_id = ?4 AND date = ?5",
            params![stay_minutes, Utc::now(), stop.as_str(), trip.as_str(), date],
        )?;
        if updated == 0 {
            return Err(StoreError::StopNotFound(stop.clone()));
        }
        invalidate(&conn, trip, date)?;
        Ok(())
    }

    /// Move a stop to `new_position` (clamped) and renumber the day.
    pub fn move_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
        new_position: usize,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let mut order = stop_order(&conn, trip, date)?;
        let current = order
            .iter()
            .position(|id| id == stop.as_str())
            .ok_or_else(|| StoreError::StopNotFound(stop.clone()))?;
        let id = order.remove(current);
        let target = new_position.min(order.len());
        order.insert(target, id);

        renumber(&mut conn, trip, date, &order)
    }

    pub fn remove_stop(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        stop: &StopIdentifier,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM stops WHERE id = ?1 AND trip_id = ?2 AND date = ?3",
            params![stop.as_str(), trip.as_str(), date],
        )?;
        if deleted == 0 {
            return Err(StoreError::StopNotFound(stop.clone()));
        }
        let order = stop_order(&conn, trip, date)?;
        renumber(&mut conn, trip, date, &order)
    }

    // ---- Timeline row cache ----

    pub fn cache_timeline(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
        timeline: &Timeline,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(timeline)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO timeline_cache (trip_id, date, payload, generated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(trip_id, date) DO UPDATE
             SET payload = excluded.payload, generated_at = excluded.generated_at",
            params![trip.as_str(), date, payload, Utc::now()],
        )?;
        Ok(())
    }

    pub fn cached_timeline(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> Result<Option<Timeline>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM timeline_cache WHERE trip_id = ?1 AND date = ?2",
                params![trip.as_str(), date],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub fn invalidate_timeline(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        invalidate(&conn, trip, date)?;
        Ok(())
    }
}

impl DayPlanSource for TripStore {
    fn day_plan(
        &self,
        trip: &TripIdentifier,
        date: NaiveDate,
    ) -> daytrip_itinerary::models::types::Result<Option<DayPlan>> {
        self.load_day_plan(trip, date)
            .map_err(|e| ItineraryError::Provider(e.to_string()))
    }
}

fn ensure_trip(conn: &Connection, trip: &TripIdentifier) -> Result<(), StoreError> {
    let known: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trips WHERE id = ?1",
        params![trip.as_str()],
        |row| row.get(0),
    )?;
    if known == 0 {
        return Err(StoreError::TripNotFound(trip.clone()));
    }
    Ok(())
}

fn load_stops(
    conn: &Connection,
    trip: &TripIdentifier,
    date: NaiveDate,
) -> Result<Vec<Stop>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, lng, lat, stay_minutes, created_at, updated_at
         FROM stops WHERE trip_id = ?1 AND date = ?2 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![trip.as_str(), date], |row| {
        Ok(Stop {
            id: StopIdentifier::new(row.get::<_, String>(0)?),
            name: row.get::<_, String>(1)?.into(),
            location: Point::new(row.get::<_, f64>(2)?, row.get::<_, f64>(3)?),
            stay_minutes: row.get(4)?,
            created_at: row.get::<_, DateTime<Utc>>(5)?,
            updated_at: row.get::<_, DateTime<Utc>>(6)?,
        })
    })?;
    Ok(rows.collect::<Result<_, _>>()?)
}

fn stop_order(
    conn: &Connection,
    trip: &TripIdentifier,
    date: NaiveDate,
) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM stops WHERE trip_id = ?1 AND date = ?2 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![trip.as_str(), date], |row| row.get(0))?;
    Ok(rows.collect::<Result<_, _>>()?)
}

fn renumber(
    conn: &mut Connection,
    trip: &TripIdentifier,
    date: NaiveDate,
    order: &[String],
) -> Result<(), StoreError> {
    let tx = conn.transaction()?;
    for (position, id) in order.iter().enumerate() {
        tx.execute(
            "UPDATE stops SET position = ?1 WHERE id = ?2",
            params![position as i64, id],
        )?;
    }
    tx.execute(
        "DELETE FROM timeline_cache WHERE trip_id = ?1 AND date = ?2",
        params![trip.as_str(), date],
    )?;
    tx.commit()?;
    Ok(())
}

fn invalidate(conn: &Connection, trip: &TripIdentifier, date: NaiveDate) -> rusqlite::Result<()> {
    conn.execute(
        "DELETE FROM timeline_cache WHERE trip_id = ?1 AND date = ?2",
        params![trip.as_str(), date],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use daytrip_itinerary::timeline::generate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    fn store_with_trip() -> (TripStore, Trip) {
        let store = TripStore::open_in_memory().unwrap();
        let trip = store.create_trip("Rotterdam weekend").unwrap();
        (store, trip)
    }

    #[test]
    fn test_trip_roundtrip() {
        let (store, trip) = store_with_trip();

        let loaded = store.trip(&trip.id).unwrap().unwrap();
        assert_eq!(loaded, trip);
        assert_eq!(store.all_trips().unwrap().len(), 1);
        assert!(store.trip(&TripIdentifier::new("nope")).unwrap().is_none());
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let (store, trip) = store_with_trip();
        let a = store.append_stop(&trip.id, day(), "Hotel", 51.92, 4.48).unwrap();
        let b = store.append_stop(&trip.id, day(), "Market", 51.93, 4.49).unwrap();
        let c = store.append_stop(&trip.id, day(), "Museum", 51.91, 4.47).unwrap();

        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        let ids: Vec<_> = plan.stops.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
        assert_eq!(plan.start_time, DEFAULT_DAY_START);
    }

    #[test]
    fn test_stop_roundtrip_preserves_fields() {
        let (store, trip) = store_with_trip();
        let stored = store
            .append_stop_with_stay(&trip.id, day(), "Euromast", 51.9054, 4.4662, 45)
            .unwrap();

        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        let loaded = &plan.stops[0];
        assert_eq!(loaded.id, stored.id);
        assert_eq!(&*loaded.name, "Euromast");
        assert_eq!(loaded.stay_minutes, 45);
        assert_relative_eq!(loaded.location.y(), 51.9054);
        assert_relative_eq!(loaded.location.x(), 4.4662);
        assert_eq!(loaded.created_at, stored.created_at);
    }

    #[test]
    fn test_missing_day_is_none() {
        let (store, trip) = store_with_trip();
        assert!(store.load_day_plan(&trip.id, day()).unwrap().is_none());

        // An explicit start makes the day exist even with no stops yet.
        store.set_day_start(&trip.id, day(), 8 * 3600).unwrap();
        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        assert_eq!(plan.start_time, 8 * 3600);
        assert!(plan.stops.is_empty());
    }

    #[test]
    fn test_append_to_unknown_trip_fails() {
        let store = TripStore::open_in_memory().unwrap();
        let err = store
            .append_stop(&TripIdentifier::new("ghost"), day(), "Hotel", 51.9, 4.4)
            .unwrap_err();
        assert!(matches!(err, StoreError::TripNotFound(_)));
    }

    #[test]
    fn test_update_stay() {
        let (store, trip) = store_with_trip();
        let stop = store.append_stop(&trip.id, day(), "Market", 51.92, 4.48).unwrap();

        store.update_stop_stay(&trip.id, day(), &stop.id, 25).unwrap();

        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        assert_eq!(plan.stops[0].stay_minutes, 25);

        let err = store
            .update_stop_stay(&trip.id, day(), &StopIdentifier::new("ghost"), 5)
            .unwrap_err();
        assert!(matches!(err, StoreError::StopNotFound(_)));
    }

    #[test]
    fn test_move_stop_reorders_and_renumbers() {
        let (store, trip) = store_with_trip();
        let a = store.append_stop(&trip.id, day(), "A", 51.0, 4.0).unwrap();
        let b = store.append_stop(&trip.id, day(), "B", 51.1, 4.1).unwrap();
        let c = store.append_stop(&trip.id, day(), "C", 51.2, 4.2).unwrap();

        store.move_stop(&trip.id, day(), &c.id, 0).unwrap();
        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        let ids: Vec<_> = plan.stops.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![c.id.clone(), a.id.clone(), b.id.clone()]);

        // Past-the-end positions clamp to the tail.
        store.move_stop(&trip.id, day(), &c.id, 99).unwrap();
        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        let ids: Vec<_> = plan.stops.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_remove_stop() {
        let (store, trip) = store_with_trip();
        let a = store.append_stop(&trip.id, day(), "A", 51.0, 4.0).unwrap();
        let b = store.append_stop(&trip.id, day(), "B", 51.1, 4.1).unwrap();

        store.remove_stop(&trip.id, day(), &a.id).unwrap();

        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        assert_eq!(plan.stops.len(), 1);
        assert_eq!(plan.stops[0].id, b.id);

        let err = store.remove_stop(&trip.id, day(), &a.id).unwrap_err();
        assert!(matches!(err, StoreError::StopNotFound(_)));
    }

    #[test]
    fn test_timeline_cache_roundtrip_and_invalidation() {
        let (store, trip) = store_with_trip();
        let a = store.append_stop(&trip.id, day(), "A", 51.0, 4.0).unwrap();
        let b = store.append_stop(&trip.id, day(), "B", 51.1, 4.1).unwrap();

        let plan = store.load_day_plan(&trip.id, day()).unwrap().unwrap();
        let timeline = generate(&plan.stops, Vec::new(), plan.start_time);
        store.cache_timeline(&trip.id, day(), &timeline).unwrap();

        let cached = store.cached_timeline(&trip.id, day()).unwrap().unwrap();
        assert_eq!(cached, timeline);

        // Any stop mutation drops the row.
        store.update_stop_stay(&trip.id, day(), &a.id, 5).unwrap();
        assert!(store.cached_timeline(&trip.id, day()).unwrap().is_none());

        store.cache_timeline(&trip.id, day(), &timeline).unwrap();
        store.remove_stop(&trip.id, day(), &b.id).unwrap();
        assert!(store.cached_timeline(&trip.id, day()).unwrap().is_none());
    }
}
