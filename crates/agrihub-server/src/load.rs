//! Bulk-load of the region reference data from a JSON file.
//!
//! ```json
//! { "states": [
//!   { "name": "Kerala", "type": "state", "capital": "Thiruvananthapuram",
//!     "districts": [
//!       { "name": "Ernakulam",
//!         "subdistricts": [ { "name": "Aluva", "cities": [ { "name": "Aluva" } ] } ],
//!         "cities": [ { "name": "Kochi", "lat": 9.93, "lng": 76.26 } ] } ] } ] }
//! ```
//!
//! States whose name already exists are skipped whole, so a file can be
//! loaded again after it was extended.

use std::path::Path;

use agrihub_core::{
  region::{CityId, DistrictId, NewCity, StateId, StateType, SubdistrictId, check_coordinates},
  store::RegionStore,
};
use anyhow::{Context as _, bail};
use serde::{Deserialize, Serialize};

// ─── File format ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegionFile {
  pub states: Vec<StateEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StateEntry {
  pub name:      String,
  #[serde(rename = "type", default = "default_state_type")]
  pub kind:      StateType,
  /// Name of one of this state's cities.
  pub capital:   Option<String>,
  #[serde(default)]
  pub districts: Vec<DistrictEntry>,
}

fn default_state_type() -> StateType { StateType::State }

#[derive(Debug, Deserialize)]
pub struct DistrictEntry {
  pub name:         String,
  #[serde(default)]
  pub subdistricts: Vec<SubdistrictEntry>,
  /// Cities directly under the district.
  #[serde(default)]
  pub cities:       Vec<CityEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SubdistrictEntry {
  pub name:   String,
  #[serde(default)]
  pub cities: Vec<CityEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CityEntry {
  pub name: String,
  pub lat:  Option<f64>,
  pub lng:  Option<f64>,
}

// ─── Loading ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
  pub states:         usize,
  pub districts:      usize,
  pub subdistricts:   usize,
  pub cities:         usize,
  pub skipped_states: usize,
}

pub fn read_file(path: &Path) -> anyhow::Result<RegionFile> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading region file {}", path.display()))?;
  serde_json::from_str(&raw).with_context(|| format!("parsing region file {}", path.display()))
}

/// Load every state of `file`. A state is either loaded whole or not at all:
/// the entry is checked before anything is written, and a write failure
/// removes the rows already created for it before the error is returned.
pub async fn load<S: RegionStore>(store: &S, file: RegionFile) -> anyhow::Result<LoadReport> {
  let mut report = LoadReport::default();

  for entry in &file.states {
    if store.find_state_by_name(&entry.name).await?.is_some() {
      tracing::warn!(state = %entry.name, "state already exists; skipping");
      report.skipped_states += 1;
      continue;
    }
    check(entry).with_context(|| format!("invalid state {:?}", entry.name))?;

    let state = store
      .create_state(entry.name.clone(), entry.kind, None)
      .await
      .with_context(|| format!("creating state {:?}", entry.name))?;

    match load_children(store, state.id, entry).await {
      Ok(counts) => {
        report.states += 1;
        report.districts += counts.districts;
        report.subdistricts += counts.subdistricts;
        report.cities += counts.cities;
        tracing::info!(state = %state.name, id = %state.id, "state loaded");
      }
      Err(e) => {
        if let Err(undo) = store.delete_state(state.id).await {
          tracing::error!(state = %state.name, error = %undo, "failed to remove partial state");
        }
        return Err(e.context(format!("loading state {:?}", entry.name)));
      }
    }
  }

  Ok(report)
}

/// Reject what the store would reject halfway through the state.
fn check(entry: &StateEntry) -> anyhow::Result<()> {
  let mut names = Vec::new();
  for district in &entry.districts {
    let cities = district
      .subdistricts
      .iter()
      .flat_map(|s| &s.cities)
      .chain(&district.cities);
    for city in cities {
      check_coordinates(city.lat, city.lng)
        .with_context(|| format!("city {:?}", city.name))?;
      names.push(city.name.as_str());
    }
  }
  if let Some(capital) = &entry.capital
    && !names.contains(&capital.as_str())
  {
    bail!("capital {capital:?} is not a city of {:?}", entry.name);
  }
  Ok(())
}

async fn load_children<S: RegionStore>(
  store: &S,
  state_id: StateId,
  entry: &StateEntry,
) -> anyhow::Result<LoadReport> {
  let mut counts = LoadReport::default();
  let mut cities: Vec<(&str, CityId)> = Vec::new();

  for district in &entry.districts {
    let district_id = store
      .create_district(state_id, district.name.clone())
      .await
      .with_context(|| format!("creating district {:?}", district.name))?
      .id;
    counts.districts += 1;

    for sub in &district.subdistricts {
      let sub_id = store
        .create_subdistrict(district_id, sub.name.clone())
        .await
        .with_context(|| format!("creating subdistrict {:?}", sub.name))?
        .id;
      counts.subdistricts += 1;
      for city in &sub.cities {
        cities.push((city.name.as_str(), create_city(store, district_id, Some(sub_id), city).await?));
        counts.cities += 1;
      }
    }

    for city in &district.cities {
      cities.push((city.name.as_str(), create_city(store, district_id, None, city).await?));
      counts.cities += 1;
    }
  }

  if let Some(capital) = &entry.capital {
    let city_id = cities
      .iter()
      .find(|(name, _)| *name == capital.as_str())
      .map(|(_, id)| *id)
      .with_context(|| format!("capital {capital:?} is not a city of {:?}", entry.name))?;
    store.set_capital(state_id, Some(city_id)).await?;
  }

  Ok(counts)
}

async fn create_city<S: RegionStore>(
  store: &S,
  district_id: DistrictId,
  subdistrict_id: Option<SubdistrictId>,
  entry: &CityEntry,
) -> anyhow::Result<CityId> {
  let input = NewCity {
    district_id,
    name: entry.name.clone(),
    subdistrict_id,
    lat: entry.lat,
    lng: entry.lng,
  };
  let city = store
    .create_city(input)
    .await
    .with_context(|| format!("creating city {:?}", entry.name))?;
  Ok(city.id)
}
