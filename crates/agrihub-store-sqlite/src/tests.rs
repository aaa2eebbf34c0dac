//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use agrihub_core::{
  Error as RegionError,
  error::DomainError,
  region::{CityId, DistrictId, NewCity, RegionKind, StateId, StateType, SubdistrictId},
  store::RegionStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn domain(err: &Error) -> &RegionError {
  err.domain().expect("expected a domain error")
}

/// Kerala with two districts: one with a subdistrict holding two cities plus a
/// direct city, one with a single direct city.
struct Fixture {
  state:       StateId,
  ernakulam:   DistrictId,
  idukki:      DistrictId,
  aluva_taluk: SubdistrictId,
  cities:      Vec<CityId>,
}

async fn kerala(s: &SqliteStore) -> Fixture {
  let state = s
    .create_state("Kerala".into(), StateType::State, None)
    .await
    .unwrap()
    .id;
  let ernakulam = s.create_district(state, "Ernakulam".into()).await.unwrap().id;
  let idukki = s.create_district(state, "Idukki".into()).await.unwrap().id;
  let aluva_taluk = s
    .create_subdistrict(ernakulam, "Aluva".into())
    .await
    .unwrap()
    .id;

  let mut cities = Vec::new();
  for input in [
    NewCity::new(ernakulam, "Aluva").in_subdistrict(aluva_taluk).at(10.10, 76.35),
    NewCity::new(ernakulam, "Angamaly").in_subdistrict(aluva_taluk),
    NewCity::new(ernakulam, "Kochi").at(9.93, 76.26),
    NewCity::new(idukki, "Thodupuzha"),
  ] {
    cities.push(s.create_city(input).await.unwrap().id);
  }

  Fixture { state, ernakulam, idukki, aluva_taluk, cities }
}

// ─── Creates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_state_assigns_increasing_ids() {
  let s = store().await;
  let a = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  let b = s
    .create_state("Ladakh".into(), StateType::UnionTerritory, None)
    .await
    .unwrap();
  assert!(b.id > a.id);
  assert_eq!(a.created_at, a.updated_at);

  let fetched = s.get_state(b.id).await.unwrap().unwrap();
  assert_eq!(fetched.kind, StateType::UnionTerritory);
  assert_eq!(fetched.name, "Ladakh");
}

#[tokio::test]
async fn duplicate_state_name_is_rejected_without_partial_row() {
  let s = store().await;
  s.create_state("Goa".into(), StateType::State, None).await.unwrap();

  let err = s
    .create_state("Goa".into(), StateType::UnionTerritory, None)
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), RegionError::DuplicateName(n) if n == "Goa"));

  let all = s.list_states().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].kind, StateType::State);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let s = store().await;
  let first = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  s.delete_state(first.id).await.unwrap();
  let second = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  assert!(second.id > first.id);
}

#[tokio::test]
async fn create_with_missing_parent_is_not_found() {
  let s = store().await;

  let err = s.create_district(StateId(99), "Nowhere".into()).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::NotFound { kind: RegionKind::State, id: 99 }
  ));

  let err = s
    .create_subdistrict(DistrictId(7), "Nowhere".into())
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::NotFound { kind: RegionKind::District, id: 7 }
  ));

  let err = s.create_city(NewCity::new(DistrictId(7), "Nowhere")).await.unwrap_err();
  assert!(domain(&err).is_not_found());

  let err = s
    .create_state("Goa".into(), StateType::State, Some(CityId(5)))
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::NotFound { kind: RegionKind::City, id: 5 }
  ));
  assert!(s.list_states().await.unwrap().is_empty());
}

#[tokio::test]
async fn city_subdistrict_must_belong_to_its_district() {
  let s = store().await;
  let f = kerala(&s).await;

  let err = s
    .create_city(NewCity::new(f.idukki, "Misplaced").in_subdistrict(f.aluva_taluk))
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::SubdistrictOutsideDistrict { .. }
  ));

  let err = s
    .create_city(NewCity::new(f.idukki, "Ghost").in_subdistrict(SubdistrictId(404)))
    .await
    .unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::NotFound { kind: RegionKind::Subdistrict, id: 404 }
  ));
}

#[tokio::test]
async fn city_coordinates_are_range_checked() {
  let s = store().await;
  let f = kerala(&s).await;
  let err = s
    .create_city(NewCity::new(f.idukki, "Off the map").at(120.0, 0.0))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), RegionError::InvalidCoordinate { .. }));
}

// ─── Hierarchy ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn hierarchy_contains_exactly_the_created_descendants() {
  let s = store().await;
  let f = kerala(&s).await;
  // Another state's rows must not leak in.
  let other = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  let north_goa = s.create_district(other.id, "North Goa".into()).await.unwrap();
  s.create_city(NewCity::new(north_goa.id, "Panaji")).await.unwrap();

  let tree = s.get_hierarchy(f.state).await.unwrap();
  assert_eq!(tree.state.name, "Kerala");

  let district_ids: Vec<_> = tree.districts.iter().map(|d| d.district.id).collect();
  assert_eq!(district_ids, [f.ernakulam, f.idukki]);

  let subdistricts: Vec<_> = tree.subdistricts().map(|s| s.id).collect();
  assert_eq!(subdistricts, [f.aluva_taluk]);

  let city_ids: Vec<_> = tree.cities().map(|c| c.id).collect();
  let unique: HashSet<_> = city_ids.iter().copied().collect();
  assert_eq!(city_ids.len(), unique.len(), "no duplicates");
  assert_eq!(unique, f.cities.iter().copied().collect::<HashSet<_>>());

  let ernakulam = &tree.districts[0];
  assert_eq!(ernakulam.subdistricts[0].cities.len(), 2);
  assert_eq!(ernakulam.cities.len(), 1);
  assert_eq!(ernakulam.cities[0].name, "Kochi");
  assert_eq!(ernakulam.cities[0].lat, Some(9.93));
  assert_eq!(tree.districts[1].cities[0].name, "Thodupuzha");
}

#[tokio::test]
async fn hierarchy_of_missing_state_is_not_found() {
  let s = store().await;
  let err = s.get_hierarchy(StateId(1)).await.unwrap_err();
  assert!(domain(&err).is_not_found());
}

#[tokio::test]
async fn composite_lookups_return_all_matches() {
  let s = store().await;
  let f = kerala(&s).await;
  let second = s.create_city(NewCity::new(f.ernakulam, "Kochi")).await.unwrap();

  let kochis = s.find_cities(f.ernakulam, "Kochi").await.unwrap();
  assert_eq!(kochis.len(), 2);
  assert_eq!(kochis[1].id, second.id);
  assert!(s.find_cities(f.idukki, "Kochi").await.unwrap().is_empty());

  let districts = s.find_districts(f.state, "Idukki").await.unwrap();
  assert_eq!(districts.len(), 1);
  assert_eq!(districts[0].id, f.idukki);

  let found = s.find_state_by_name("Kerala").await.unwrap().unwrap();
  assert_eq!(found.id, f.state);
  assert!(s.find_state_by_name("kerala").await.unwrap().is_none());
}

// ─── Cascading deletes ───────────────────────────────────────────────────────

#[tokio::test]
async fn delete_state_removes_every_descendant() {
  let s = store().await;
  let f = kerala(&s).await;
  let other = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  let north_goa = s.create_district(other.id, "North Goa".into()).await.unwrap();
  s.create_city(NewCity::new(north_goa.id, "Panaji")).await.unwrap();

  let report = s.delete_state(f.state).await.unwrap();
  assert_eq!(report.states, 1);
  assert_eq!(report.districts, 2);
  assert_eq!(report.subdistricts, 1);
  assert_eq!(report.cities, 4);

  let err = s.get_hierarchy(f.state).await.unwrap_err();
  assert!(domain(&err).is_not_found());

  let status = s.status().await.unwrap();
  let rows = |name: &str| {
    status
      .tables
      .iter()
      .find(|t| t.name == name)
      .map(|t| t.rows)
      .unwrap()
  };
  assert_eq!(rows("states"), 1);
  assert_eq!(rows("districts"), 1);
  assert_eq!(rows("subdistricts"), 0);
  assert_eq!(rows("cities"), 1);
}

#[tokio::test]
async fn delete_district_cascades_to_subdistricts_and_cities() {
  let s = store().await;
  let f = kerala(&s).await;

  let report = s.delete_district(f.ernakulam).await.unwrap();
  assert_eq!(report.districts, 1);
  assert_eq!(report.subdistricts, 1);
  assert_eq!(report.cities, 3);

  let tree = s.get_hierarchy(f.state).await.unwrap();
  assert_eq!(tree.districts.len(), 1);
  assert_eq!(tree.cities().count(), 1);
}

#[tokio::test]
async fn delete_subdistrict_keeps_direct_cities() {
  let s = store().await;
  let f = kerala(&s).await;

  let report = s.delete_subdistrict(f.aluva_taluk).await.unwrap();
  assert_eq!(report.subdistricts, 1);
  assert_eq!(report.cities, 2);

  let tree = s.get_hierarchy(f.state).await.unwrap();
  let names: Vec<_> = tree.cities().map(|c| c.name.as_str()).collect();
  assert_eq!(names, ["Kochi", "Thodupuzha"]);
}

#[tokio::test]
async fn delete_missing_rows_is_not_found() {
  let s = store().await;
  assert!(domain(&s.delete_state(StateId(3)).await.unwrap_err()).is_not_found());
  assert!(domain(&s.delete_district(DistrictId(3)).await.unwrap_err()).is_not_found());
  assert!(domain(&s.delete_subdistrict(SubdistrictId(3)).await.unwrap_err()).is_not_found());
  assert!(domain(&s.delete_city(CityId(3)).await.unwrap_err()).is_not_found());
}

// ─── Capital reference ───────────────────────────────────────────────────────

#[tokio::test]
async fn set_capital_refreshes_updated_at() {
  let s = store().await;
  let f = kerala(&s).await;
  let before = s.get_state(f.state).await.unwrap().unwrap();

  let after = s.set_capital(f.state, Some(f.cities[2])).await.unwrap();
  assert_eq!(after.capital_id, Some(f.cities[2]));
  assert_eq!(after.created_at, before.created_at);
  assert!(after.updated_at >= before.updated_at);

  let cleared = s.set_capital(f.state, None).await.unwrap();
  assert!(cleared.capital_id.is_none());
}

#[tokio::test]
async fn capital_must_be_one_of_the_states_cities() {
  let s = store().await;
  let f = kerala(&s).await;
  let goa = s.create_state("Goa".into(), StateType::State, None).await.unwrap();

  let err = s.set_capital(goa.id, Some(f.cities[0])).await.unwrap_err();
  assert!(matches!(domain(&err), RegionError::CapitalOutsideState { .. }));

  let err = s.set_capital(goa.id, Some(CityId(999))).await.unwrap_err();
  assert!(matches!(
    domain(&err),
    RegionError::NotFound { kind: RegionKind::City, .. }
  ));
}

#[tokio::test]
async fn capital_given_at_creation_only_has_to_exist() {
  let s = store().await;
  let f = kerala(&s).await;

  let lakshadweep = s
    .create_state("Lakshadweep".into(), StateType::UnionTerritory, Some(f.cities[2]))
    .await
    .unwrap();
  assert_eq!(lakshadweep.capital_id, Some(f.cities[2]));

  // Re-pointing it afterwards goes through the ownership check.
  let err = s
    .set_capital(lakshadweep.id, Some(f.cities[0]))
    .await
    .unwrap_err();
  assert!(matches!(domain(&err), RegionError::CapitalOutsideState { .. }));
  let unchanged = s.get_state(lakshadweep.id).await.unwrap().unwrap();
  assert_eq!(unchanged.capital_id, Some(f.cities[2]));
}

#[tokio::test]
async fn deleting_capital_city_clears_reference_but_keeps_state() {
  let s = store().await;
  let f = kerala(&s).await;
  let kochi = f.cities[2];
  s.set_capital(f.state, Some(kochi)).await.unwrap();

  let report = s.delete_city(kochi).await.unwrap();
  assert_eq!(report.cities, 1);
  assert_eq!(report.capitals_cleared, 1);
  assert_eq!(report.states, 0);

  let state = s.get_state(f.state).await.unwrap().unwrap();
  assert!(state.capital_id.is_none());
}

#[tokio::test]
async fn deleting_district_clears_capital_of_owning_state() {
  let s = store().await;
  let f = kerala(&s).await;
  s.set_capital(f.state, Some(f.cities[0])).await.unwrap();

  let report = s.delete_district(f.ernakulam).await.unwrap();
  assert_eq!(report.capitals_cleared, 1);
  assert!(s.get_state(f.state).await.unwrap().unwrap().capital_id.is_none());
}

#[tokio::test]
async fn deleting_state_with_capital_succeeds() {
  let s = store().await;
  let f = kerala(&s).await;
  s.set_capital(f.state, Some(f.cities[0])).await.unwrap();

  let report = s.delete_state(f.state).await.unwrap();
  assert_eq!(report.capitals_cleared, 0);
  assert!(s.get_state(f.state).await.unwrap().is_none());
}

#[tokio::test]
async fn capital_in_another_state_is_cleared_when_that_city_goes() {
  let s = store().await;
  let f = kerala(&s).await;
  let borrowed = s
    .create_state("Lakshadweep".into(), StateType::UnionTerritory, Some(f.cities[2]))
    .await
    .unwrap();

  let report = s.delete_state(f.state).await.unwrap();
  assert_eq!(report.capitals_cleared, 1);
  let survivor = s.get_state(borrowed.id).await.unwrap().unwrap();
  assert!(survivor.capital_id.is_none());
  assert!(survivor.updated_at >= borrowed.updated_at);
}

// ─── Administration ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_empties_every_table() {
  let s = store().await;
  let f = kerala(&s).await;
  s.set_capital(f.state, Some(f.cities[0])).await.unwrap();

  s.reset().await.unwrap();

  let status = s.status().await.unwrap();
  assert_eq!(status.schema_version, 1);
  let names: Vec<_> = status.tables.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, ["cities", "districts", "states", "subdistricts"]);
  assert!(status.tables.iter().all(|t| t.rows == 0));

  let goa = s.create_state("Goa".into(), StateType::State, None).await.unwrap();
  assert_eq!(goa.id, StateId(1));
}

#[tokio::test]
async fn sql_script_runs_atomically() {
  let s = store().await;
  s.execute_script(
    "INSERT INTO states (name, type, created_at, updated_at)
     VALUES ('Goa', 'state', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00');"
      .into(),
  )
  .await
  .unwrap();
  let goa = s.find_state_by_name("Goa").await.unwrap().unwrap();
  assert_eq!(goa.kind, StateType::State);

  // The second statement violates the unique name, so the first is undone too.
  let err = s
    .execute_script(
      "INSERT INTO states (name, type, created_at, updated_at)
       VALUES ('Sikkim', 'state', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00');
       INSERT INTO states (name, type, created_at, updated_at)
       VALUES ('Goa', 'state', '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00');"
        .into(),
    )
    .await;
  assert!(matches!(err, Err(Error::Database(_))));
  assert!(s.find_state_by_name("Sikkim").await.unwrap().is_none());
}
