//! [`SqliteStore`], the SQLite implementation of [`RegionStore`].

use std::{collections::HashMap, path::Path};

use agrihub_core::{
  Error as RegionError,
  region::{
    CascadeReport, City, CityId, District, DistrictId, DistrictTree, NewCity, RegionKind, State,
    StateId, StateTree, StateType, Subdistrict, SubdistrictId, SubdistrictTree,
  },
  store::RegionStore,
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Error, Result, cascade,
  encode::{
    CITY_COLUMNS, DISTRICT_COLUMNS, RawCity, RawDistrict, RawState, RawSubdistrict,
    STATE_COLUMNS, SUBDISTRICT_COLUMNS, encode_dt, encode_state_type,
  },
  schema::{DROP_TABLES, PRAGMAS, SCHEMA_VERSION, TABLES},
};

/// What a database closure hands back: either its value or a domain
/// rejection. A rejection drops the open transaction, which rolls it back.
type Outcome<T> = std::result::Result<T, RegionError>;

// ─── Admin types ─────────────────────────────────────────────────────────────

/// Row count of one table, as reported by [`SqliteStore::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStatus {
  pub name: String,
  pub rows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
  pub schema_version: i32,
  pub tables:         Vec<TableStatus>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A region hierarchy backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(TABLES)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Drop every region table and recreate an empty schema.
  ///
  /// Foreign-key enforcement is suspended for the drop, which runs together
  /// with the recreate in one transaction.
  pub async fn reset(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        let rebuilt = (|| {
          let tx = conn.transaction()?;
          tx.execute_batch(DROP_TABLES)?;
          tx.execute_batch(TABLES)?;
          tx.commit()
        })();
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        rebuilt?;
        Ok(())
      })
      .await?;
    tracing::info!("region store reset");
    Ok(())
  }

  /// Schema version plus every user table with its row count.
  pub async fn status(&self) -> Result<StoreStatus> {
    let status = self
      .conn
      .call(|conn| {
        let schema_version: i32 =
          conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        let names: Vec<String> = {
          let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
          )?;
          let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
          names
        };
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
          let rows: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM \"{name}\""), [], |row| row.get(0))?;
          tables.push(TableStatus { name, rows: rows as u64 });
        }
        Ok(StoreStatus { schema_version, tables })
      })
      .await?;
    Ok(status)
  }

  /// Execute a batch of SQL statements in one transaction.
  ///
  /// A failing statement rolls back the statements before it.
  pub async fn execute_script(&self, sql: String) -> Result<()> {
    let bytes = sql.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(&sql)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    tracing::info!(bytes, "sql script executed");
    Ok(())
  }

  /// Run a cascading delete inside one transaction. `Ok(None)` from the
  /// database side means the target row did not exist.
  async fn cascade_delete(
    &self,
    kind: RegionKind,
    id: i64,
    routine: fn(&Connection, i64, &str) -> rusqlite::Result<CascadeReport>,
  ) -> Result<CascadeReport> {
    let now = encode_dt(Utc::now());
    let table = table_for(kind);

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, table, id)? {
          return Ok(None);
        }
        let report = routine(&tx, id, &now)?;
        tx.commit()?;
        Ok(Some(report))
      })
      .await?
      .ok_or_else(|| RegionError::not_found(kind, id))?;

    tracing::info!(
      %kind,
      id,
      districts = report.districts,
      subdistricts = report.subdistricts,
      cities = report.cities,
      capitals_cleared = report.capitals_cleared,
      "cascading delete committed"
    );
    Ok(report)
  }
}

// ─── Sync helpers (run on the connection thread) ─────────────────────────────

fn table_for(kind: RegionKind) -> &'static str {
  match kind {
    RegionKind::State => "states",
    RegionKind::District => "districts",
    RegionKind::Subdistrict => "subdistricts",
    RegionKind::City => "cities",
  }
}

fn exists(conn: &Connection, table: &str, id: i64) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1"), params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn select_state(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawState>> {
  conn
    .query_row(
      &format!("SELECT {STATE_COLUMNS} FROM states WHERE id = ?1"),
      params![id],
      RawState::from_row,
    )
    .optional()
}

fn select_all<T>(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
  map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt.query_map(params, map)?.collect::<rusqlite::Result<Vec<T>>>()?;
  Ok(rows)
}

/// Assemble the nested read model from flat, id-ordered rows.
fn assemble(
  state: State,
  districts: Vec<District>,
  subdistricts: Vec<Subdistrict>,
  cities: Vec<City>,
) -> StateTree {
  let mut sub_cities: HashMap<SubdistrictId, Vec<City>> = HashMap::new();
  let mut direct_cities: HashMap<DistrictId, Vec<City>> = HashMap::new();
  for city in cities {
    match city.subdistrict_id {
      Some(sub) => sub_cities.entry(sub).or_default().push(city),
      None => direct_cities.entry(city.district_id).or_default().push(city),
    }
  }

  let mut subs: HashMap<DistrictId, Vec<SubdistrictTree>> = HashMap::new();
  for subdistrict in subdistricts {
    let cities = sub_cities.remove(&subdistrict.id).unwrap_or_default();
    subs
      .entry(subdistrict.district_id)
      .or_default()
      .push(SubdistrictTree { subdistrict, cities });
  }

  let districts = districts
    .into_iter()
    .map(|district| DistrictTree {
      subdistricts: subs.remove(&district.id).unwrap_or_default(),
      cities: direct_cities.remove(&district.id).unwrap_or_default(),
      district,
    })
    .collect();

  StateTree { state, districts }
}

// ─── RegionStore impl ────────────────────────────────────────────────────────

impl RegionStore for SqliteStore {
  type Error = Error;

  // ── Creates ───────────────────────────────────────────────────────────────

  async fn create_state(
    &self,
    name: String,
    kind: StateType,
    capital: Option<CityId>,
  ) -> Result<State> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let kind_str = encode_state_type(kind);
    let name_db = name.clone();

    let id: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row("SELECT 1 FROM states WHERE name = ?1", params![name_db], |_| Ok(()))
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(RegionError::DuplicateName(name_db)));
        }
        if let Some(city) = capital
          && !exists(&tx, "cities", city.0)?
        {
          return Ok(Err(RegionError::not_found(RegionKind::City, city)));
        }
        tx.execute(
          "INSERT INTO states (name, type, capital_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          params![name_db, kind_str, capital.map(i64::from), now_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    Ok(State {
      id: StateId(id?),
      name,
      kind,
      capital_id: capital,
      created_at: now,
      updated_at: now,
    })
  }

  async fn create_district(&self, state_id: StateId, name: String) -> Result<District> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let name_db = name.clone();

    let id: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "states", state_id.0)? {
          return Ok(Err(RegionError::not_found(RegionKind::State, state_id)));
        }
        tx.execute(
          "INSERT INTO districts (state_id, name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          params![state_id.0, name_db, now_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    Ok(District {
      id: DistrictId(id?),
      state_id,
      name,
      created_at: now,
      updated_at: now,
    })
  }

  async fn create_subdistrict(
    &self,
    district_id: DistrictId,
    name: String,
  ) -> Result<Subdistrict> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let name_db = name.clone();

    let id: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "districts", district_id.0)? {
          return Ok(Err(RegionError::not_found(RegionKind::District, district_id)));
        }
        tx.execute(
          "INSERT INTO subdistricts (district_id, name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          params![district_id.0, name_db, now_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    Ok(Subdistrict {
      id: SubdistrictId(id?),
      district_id,
      name,
      created_at: now,
      updated_at: now,
    })
  }

  async fn create_city(&self, input: NewCity) -> Result<City> {
    input.validate()?;

    let now = Utc::now();
    let now_str = encode_dt(now);
    let NewCity { district_id, name, subdistrict_id, lat, lng } = input;
    let name_db = name.clone();

    let id: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "districts", district_id.0)? {
          return Ok(Err(RegionError::not_found(RegionKind::District, district_id)));
        }
        if let Some(sub) = subdistrict_id {
          let owner: Option<i64> = tx
            .query_row(
              "SELECT district_id FROM subdistricts WHERE id = ?1",
              params![sub.0],
              |row| row.get(0),
            )
            .optional()?;
          match owner {
            None => return Ok(Err(RegionError::not_found(RegionKind::Subdistrict, sub))),
            Some(owner) if owner != district_id.0 => {
              return Ok(Err(RegionError::SubdistrictOutsideDistrict {
                subdistrict: sub.0,
                district:    district_id.0,
              }));
            }
            Some(_) => {}
          }
        }
        tx.execute(
          "INSERT INTO cities (district_id, subdistrict_id, name, lat, lng, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          params![
            district_id.0,
            subdistrict_id.map(i64::from),
            name_db,
            lat,
            lng,
            now_str,
          ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok(id))
      })
      .await?;

    Ok(City {
      id: CityId(id?),
      district_id,
      subdistrict_id,
      name,
      lat,
      lng,
      created_at: now,
      updated_at: now,
    })
  }

  // ── Capital reference ─────────────────────────────────────────────────────

  async fn set_capital(&self, state_id: StateId, city_id: Option<CityId>) -> Result<State> {
    let now_str = encode_dt(Utc::now());

    let raw: Outcome<RawState> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "states", state_id.0)? {
          return Ok(Err(RegionError::not_found(RegionKind::State, state_id)));
        }
        if let Some(city) = city_id {
          let owner: Option<i64> = tx
            .query_row(
              "SELECT d.state_id FROM cities c
               JOIN districts d ON d.id = c.district_id
               WHERE c.id = ?1",
              params![city.0],
              |row| row.get(0),
            )
            .optional()?;
          match owner {
            None => return Ok(Err(RegionError::not_found(RegionKind::City, city))),
            Some(owner) if owner != state_id.0 => {
              return Ok(Err(RegionError::CapitalOutsideState {
                city:  city.0,
                state: state_id.0,
              }));
            }
            Some(_) => {}
          }
        }
        tx.execute(
          "UPDATE states SET capital_id = ?2, updated_at = ?3 WHERE id = ?1",
          params![state_id.0, city_id.map(i64::from), now_str],
        )?;
        let raw = select_state(&tx, state_id.0)?;
        tx.commit()?;
        Ok(raw.ok_or_else(|| RegionError::not_found(RegionKind::State, state_id)))
      })
      .await?;

    raw?.into_state()
  }

  // ── Cascading deletes ─────────────────────────────────────────────────────

  async fn delete_state(&self, id: StateId) -> Result<CascadeReport> {
    self
      .cascade_delete(RegionKind::State, id.0, cascade::delete_state)
      .await
  }

  async fn delete_district(&self, id: DistrictId) -> Result<CascadeReport> {
    self
      .cascade_delete(RegionKind::District, id.0, cascade::delete_district)
      .await
  }

  async fn delete_subdistrict(&self, id: SubdistrictId) -> Result<CascadeReport> {
    self
      .cascade_delete(RegionKind::Subdistrict, id.0, cascade::delete_subdistrict)
      .await
  }

  async fn delete_city(&self, id: CityId) -> Result<CascadeReport> {
    self
      .cascade_delete(RegionKind::City, id.0, cascade::delete_city)
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_state(&self, id: StateId) -> Result<Option<State>> {
    let raw = self
      .conn
      .call(move |conn| Ok(select_state(conn, id.0)?))
      .await?;
    raw.map(RawState::into_state).transpose()
  }

  async fn list_states(&self) -> Result<Vec<State>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(select_all(
          conn,
          &format!("SELECT {STATE_COLUMNS} FROM states ORDER BY id"),
          [],
          RawState::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawState::into_state).collect()
  }

  async fn find_state_by_name(&self, name: &str) -> Result<Option<State>> {
    let name = name.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {STATE_COLUMNS} FROM states WHERE name = ?1"),
              params![name],
              RawState::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawState::into_state).transpose()
  }

  async fn find_districts(&self, state_id: StateId, name: &str) -> Result<Vec<District>> {
    let name = name.to_owned();
    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_all(
          conn,
          &format!(
            "SELECT {DISTRICT_COLUMNS} FROM districts
             WHERE state_id = ?1 AND name = ?2 ORDER BY id"
          ),
          params![state_id.0, name],
          RawDistrict::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawDistrict::into_district).collect()
  }

  async fn find_cities(&self, district_id: DistrictId, name: &str) -> Result<Vec<City>> {
    let name = name.to_owned();
    let raws = self
      .conn
      .call(move |conn| {
        Ok(select_all(
          conn,
          &format!(
            "SELECT {CITY_COLUMNS} FROM cities
             WHERE district_id = ?1 AND name = ?2 ORDER BY id"
          ),
          params![district_id.0, name],
          RawCity::from_row,
        )?)
      })
      .await?;
    raws.into_iter().map(RawCity::into_city).collect()
  }

  async fn get_hierarchy(&self, state_id: StateId) -> Result<StateTree> {
    // One read transaction so the four queries see the same snapshot.
    let rows = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(state) = select_state(&tx, state_id.0)? else {
          return Ok(None);
        };
        let districts = select_all(
          &tx,
          &format!("SELECT {DISTRICT_COLUMNS} FROM districts WHERE state_id = ?1 ORDER BY id"),
          params![state_id.0],
          RawDistrict::from_row,
        )?;
        let subdistricts = select_all(
          &tx,
          &format!(
            "SELECT {SUBDISTRICT_COLUMNS} FROM subdistricts
             WHERE district_id IN (SELECT id FROM districts WHERE state_id = ?1)
             ORDER BY id"
          ),
          params![state_id.0],
          RawSubdistrict::from_row,
        )?;
        let cities = select_all(
          &tx,
          &format!(
            "SELECT {CITY_COLUMNS} FROM cities
             WHERE district_id IN (SELECT id FROM districts WHERE state_id = ?1)
             ORDER BY id"
          ),
          params![state_id.0],
          RawCity::from_row,
        )?;
        Ok(Some((state, districts, subdistricts, cities)))
      })
      .await?;

    let (state, districts, subdistricts, cities) =
      rows.ok_or_else(|| RegionError::not_found(RegionKind::State, state_id))?;

    Ok(assemble(
      state.into_state()?,
      districts
        .into_iter()
        .map(RawDistrict::into_district)
        .collect::<Result<_>>()?,
      subdistricts
        .into_iter()
        .map(RawSubdistrict::into_subdistrict)
        .collect::<Result<_>>()?,
      cities.into_iter().map(RawCity::into_city).collect::<Result<_>>()?,
    ))
  }
}
