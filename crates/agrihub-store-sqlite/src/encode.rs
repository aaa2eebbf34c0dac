//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; state types as the lowercase
//! labels the reference dataset uses (`state`, `union territory`).

use agrihub_core::region::{
  City, CityId, District, DistrictId, State, StateId, StateType, Subdistrict, SubdistrictId,
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── StateType ───────────────────────────────────────────────────────────────

pub fn encode_state_type(t: StateType) -> &'static str {
  match t {
    StateType::State => "state",
    StateType::UnionTerritory => "union territory",
  }
}

pub fn decode_state_type(s: &str) -> Result<StateType> {
  match s {
    "state" => Ok(StateType::State),
    "union territory" => Ok(StateType::UnionTerritory),
    other => Err(Error::UnknownStateType(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const STATE_COLUMNS: &str = "id, name, type, capital_id, created_at, updated_at";
pub const DISTRICT_COLUMNS: &str = "id, state_id, name, created_at, updated_at";
pub const SUBDISTRICT_COLUMNS: &str = "id, district_id, name, created_at, updated_at";
pub const CITY_COLUMNS: &str =
  "id, district_id, subdistrict_id, name, lat, lng, created_at, updated_at";

/// Raw values read directly from a `states` row.
pub struct RawState {
  pub id:         i64,
  pub name:       String,
  pub kind:       String,
  pub capital_id: Option<i64>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawState {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      kind:       row.get(2)?,
      capital_id: row.get(3)?,
      created_at: row.get(4)?,
      updated_at: row.get(5)?,
    })
  }

  pub fn into_state(self) -> Result<State> {
    Ok(State {
      id:         StateId(self.id),
      name:       self.name,
      kind:       decode_state_type(&self.kind)?,
      capital_id: self.capital_id.map(CityId),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `districts` row.
pub struct RawDistrict {
  pub id:         i64,
  pub state_id:   i64,
  pub name:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawDistrict {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      state_id:   row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_district(self) -> Result<District> {
    Ok(District {
      id:         DistrictId(self.id),
      state_id:   StateId(self.state_id),
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `subdistricts` row.
pub struct RawSubdistrict {
  pub id:          i64,
  pub district_id: i64,
  pub name:        String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawSubdistrict {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      district_id: row.get(1)?,
      name:        row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
    })
  }

  pub fn into_subdistrict(self) -> Result<Subdistrict> {
    Ok(Subdistrict {
      id:          SubdistrictId(self.id),
      district_id: DistrictId(self.district_id),
      name:        self.name,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `cities` row.
pub struct RawCity {
  pub id:             i64,
  pub district_id:    i64,
  pub subdistrict_id: Option<i64>,
  pub name:           String,
  pub lat:            Option<f64>,
  pub lng:            Option<f64>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawCity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      district_id:    row.get(1)?,
      subdistrict_id: row.get(2)?,
      name:           row.get(3)?,
      lat:            row.get(4)?,
      lng:            row.get(5)?,
      created_at:     row.get(6)?,
      updated_at:     row.get(7)?,
    })
  }

  pub fn into_city(self) -> Result<City> {
    Ok(City {
      id:             CityId(self.id),
      district_id:    DistrictId(self.district_id),
      subdistrict_id: self.subdistrict_id.map(SubdistrictId),
      name:           self.name,
      lat:            self.lat,
      lng:            self.lng,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}
