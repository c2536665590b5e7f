//! Geo queries over an in-memory clinic snapshot: radius search, district
//! search, and nearby-district discovery. Spherical Haversine distances.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::Clinic;

const EARTH_RADIUS_KM: f64 = 6371.0;

// -----------------------------------------------------------------------------
// Coordinates
// -----------------------------------------------------------------------------

/// Validated WGS-84 coordinates in signed decimal degrees. (0, 0) is rejected;
/// real clinics do not sit on Null Island, it is a failed geocode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, AnalysisError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AnalysisError::InvalidInput {
                field: "latitude".into(),
                value: lat.to_string(),
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(AnalysisError::InvalidInput {
                field: "longitude".into(),
                value: lng.to_string(),
            });
        }
        if lat == 0.0 && lng == 0.0 {
            return Err(AnalysisError::InvalidInput {
                field: "coordinates".into(),
                value: "(0, 0)".into(),
            });
        }
        Ok(Self { lat, lng })
    }
}

/// Great-circle distance in kilometres between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Human-readable distance: metres under 1 km, one decimal under 10 km,
/// whole kilometres beyond. Metre and whole-km figures truncate, so 12.6 km
/// reads "12km", not "13km".
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m", (km * 1000.0) as i64)
    } else if km < 10.0 {
        format!("{:.1}km", km)
    } else {
        format!("{}km", km as i64)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

// -----------------------------------------------------------------------------
// Snapshot queries
// -----------------------------------------------------------------------------

/// A clinic paired with its distance from the query point. `distance_km` is
/// None for district searches without a reference point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicDistance {
    pub clinic: Clinic,
    pub distance_km: Option<f64>,
}

/// Immutable snapshot of the clinic set. The host rebuilds it on explicit
/// invalidation; queries never mutate it.
#[derive(Debug, Clone)]
pub struct ClinicSnapshot {
    clinics: Vec<Clinic>,
}

impl ClinicSnapshot {
    pub fn new(clinics: Vec<Clinic>) -> Self {
        Self { clinics }
    }

    pub fn len(&self) -> usize {
        self.clinics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clinics.is_empty()
    }

    /// All clinics within `radius_km` of `center`, nearest first, ties broken
    /// by clinic id. Clinics without a valid geocode are skipped.
    pub fn clinics_within_radius(
        &self,
        center: Coordinates,
        radius_km: f64,
        limit: Option<usize>,
        config: &AnalysisConfig,
        cancel: &CancelToken,
    ) -> Result<Vec<ClinicDistance>, AnalysisError> {
        check_radius(radius_km, config)?;

        let mut hits: Vec<(f64, &Clinic)> = Vec::new();
        for clinic in &self.clinics {
            cancel.check()?;
            let Some(coords) = clinic.coordinates() else {
                continue;
            };
            // three decimals internally so filter and sort agree across hosts
            let dist = round3(haversine_km(center, coords));
            if dist <= radius_km {
                hits.push((dist, clinic));
            }
        }
        hits.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        Ok(hits
            .into_iter()
            .map(|(dist, clinic)| ClinicDistance {
                clinic: clinic.clone(),
                distance_km: Some(round2(dist)),
            })
            .collect())
    }

    /// Clinics whose district contains `district` (case-insensitive). With a
    /// reference point the radius filter applies on top; without one the
    /// matches come back in snapshot order with no distance.
    pub fn district_search(
        &self,
        district: &str,
        center: Option<Coordinates>,
        radius_km: f64,
        limit: Option<usize>,
        config: &AnalysisConfig,
        cancel: &CancelToken,
    ) -> Result<Vec<ClinicDistance>, AnalysisError> {
        let needle = district.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AnalysisError::InvalidInput {
                field: "district".into(),
                value: district.into(),
            });
        }

        let matches: Vec<&Clinic> = {
            let mut out = Vec::new();
            for clinic in &self.clinics {
                cancel.check()?;
                if clinic.district.to_lowercase().contains(&needle) {
                    out.push(clinic);
                }
            }
            out
        };

        match center {
            Some(center) => {
                check_radius(radius_km, config)?;
                let mut hits: Vec<(f64, &Clinic)> = Vec::new();
                for clinic in matches {
                    cancel.check()?;
                    let Some(coords) = clinic.coordinates() else {
                        continue;
                    };
                    let dist = round3(haversine_km(center, coords));
                    if dist <= radius_km {
                        hits.push((dist, clinic));
                    }
                }
                hits.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.id.cmp(&b.id)));
                if let Some(limit) = limit {
                    hits.truncate(limit);
                }
                Ok(hits
                    .into_iter()
                    .map(|(dist, clinic)| ClinicDistance {
                        clinic: clinic.clone(),
                        distance_km: Some(round2(dist)),
                    })
                    .collect())
            }
            None => {
                let mut out: Vec<ClinicDistance> = matches
                    .into_iter()
                    .map(|clinic| ClinicDistance {
                        clinic: clinic.clone(),
                        distance_km: None,
                    })
                    .collect();
                if let Some(limit) = limit {
                    out.truncate(limit);
                }
                Ok(out)
            }
        }
    }

    /// Districts whose representative clinic lies within `radius_km` of the
    /// centroid of `district`'s geocoded clinics. The base district comes
    /// first, the rest sorted by name. With no geocoded clinics in the base
    /// district the answer is just the base district.
    pub fn nearby_districts(
        &self,
        district: &str,
        radius_km: f64,
        config: &AnalysisConfig,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AnalysisError> {
        check_radius(radius_km, config)?;
        let needle = district.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AnalysisError::InvalidInput {
                field: "district".into(),
                value: district.into(),
            });
        }

        let mut lat_sum = 0.0;
        let mut lng_sum = 0.0;
        let mut geocoded = 0usize;
        for clinic in &self.clinics {
            cancel.check()?;
            if !clinic.district.to_lowercase().contains(&needle) {
                continue;
            }
            if let Some(coords) = clinic.coordinates() {
                lat_sum += coords.lat;
                lng_sum += coords.lng;
                geocoded += 1;
            }
        }
        if geocoded == 0 {
            return Ok(vec![district.to_string()]);
        }
        let centroid = Coordinates::new(lat_sum / geocoded as f64, lng_sum / geocoded as f64)?;

        // one representative per other district: the smallest-id geocoded
        // clinic, so the answer is stable across snapshot orderings
        let mut representatives: std::collections::BTreeMap<String, &Clinic> =
            std::collections::BTreeMap::new();
        for clinic in &self.clinics {
            cancel.check()?;
            if clinic.district.to_lowercase().contains(&needle) {
                continue;
            }
            if clinic.coordinates().is_none() {
                continue;
            }
            representatives
                .entry(clinic.district.clone())
                .and_modify(|held| {
                    if clinic.id < held.id {
                        *held = clinic;
                    }
                })
                .or_insert(clinic);
        }

        let mut out = vec![district.to_string()];
        for (name, clinic) in representatives {
            let Some(coords) = clinic.coordinates() else {
                continue;
            };
            if round3(haversine_km(centroid, coords)) <= radius_km {
                out.push(name);
            }
        }
        Ok(out)
    }
}

fn check_radius(radius_km: f64, config: &AnalysisConfig) -> Result<(), AnalysisError> {
    if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > config.geo_max_radius_km {
        return Err(AnalysisError::InvalidInput {
            field: "radius_km".into(),
            value: radius_km.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn clinic(id: u128, name: &str, district: &str, lat: f64, lng: f64) -> Clinic {
        Clinic {
            id: Uuid::from_u128(id),
            name: name.into(),
            district: district.into(),
            latitude: Some(lat),
            longitude: Some(lng),
            verified: true,
            has_parking: false,
            night_service: false,
            weekend_service: false,
        }
    }

    fn snapshot() -> ClinicSnapshot {
        ClinicSnapshot::new(vec![
            clinic(1, "강남스마일치과", "강남구", 37.5173, 127.0473),
            clinic(2, "역삼튼튼치과", "강남구", 37.5006, 127.0364),
            clinic(3, "서초화이트치과", "서초구", 37.4837, 127.0324),
            clinic(4, "송파밝은치과", "송파구", 37.5145, 127.1060),
            Clinic {
                latitude: None,
                longitude: None,
                ..clinic(5, "주소없는치과", "강남구", 0.0, 0.0)
            },
        ])
    }

    fn gangnam_station() -> Coordinates {
        Coordinates::new(37.4979, 127.0276).unwrap()
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinates::new(37.5, 127.0).is_ok());
        assert!(Coordinates::new(95.0, 127.0).is_err());
        assert!(Coordinates::new(37.5, 190.0).is_err());
        assert!(Coordinates::new(0.0, 0.0).is_err());
        assert!(Coordinates::new(f64::NAN, 127.0).is_err());
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Seoul city hall to Busan city hall, roughly 325 km
        let seoul = Coordinates::new(37.5665, 126.9780).unwrap();
        let busan = Coordinates::new(35.1796, 129.0756).unwrap();
        let d = haversine_km(seoul, busan);
        assert!((d - 325.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn radius_query_sorts_nearest_first() {
        let hits = snapshot()
            .clinics_within_radius(
                gangnam_station(),
                5.0,
                None,
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert!(!hits.is_empty());
        let distances: Vec<f64> = hits.iter().map(|h| h.distance_km.unwrap()).collect();
        let mut sorted = distances.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(distances, sorted);
        // the un-geocoded clinic never appears
        assert!(hits.iter().all(|h| h.clinic.id != Uuid::from_u128(5)));
    }

    #[test]
    fn radius_growth_is_monotone() {
        let config = AnalysisConfig::default();
        let cancel = CancelToken::new();
        let snap = snapshot();
        let small = snap
            .clinics_within_radius(gangnam_station(), 2.0, None, &config, &cancel)
            .unwrap();
        let large = snap
            .clinics_within_radius(gangnam_station(), 10.0, None, &config, &cancel)
            .unwrap();
        assert!(large.len() >= small.len());
        for hit in &small {
            assert!(large.iter().any(|h| h.clinic.id == hit.clinic.id));
        }
    }

    #[test]
    fn radius_out_of_bounds_rejected() {
        let snap = snapshot();
        let config = AnalysisConfig::default();
        let cancel = CancelToken::new();
        for radius in [0.0, -1.0, 51.0] {
            let result =
                snap.clinics_within_radius(gangnam_station(), radius, None, &config, &cancel);
            assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
        }
    }

    #[test]
    fn limit_truncates_after_sorting() {
        let hits = snapshot()
            .clinics_within_radius(
                gangnam_station(),
                10.0,
                Some(1),
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].clinic.id, Uuid::from_u128(2));
    }

    #[test]
    fn district_search_without_center() {
        let hits = snapshot()
            .district_search(
                "강남",
                None,
                20.0,
                None,
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.distance_km.is_none()));
    }

    #[test]
    fn district_search_with_center_filters_by_radius() {
        let hits = snapshot()
            .district_search(
                "강남",
                Some(gangnam_station()),
                2.0,
                None,
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].clinic.id, Uuid::from_u128(2));
        assert!(hits[0].distance_km.unwrap() <= 2.0);
    }

    #[test]
    fn blank_district_rejected() {
        let result = snapshot().district_search(
            "  ",
            None,
            20.0,
            None,
            &AnalysisConfig::default(),
            &CancelToken::new(),
        );
        assert!(matches!(result, Err(AnalysisError::InvalidInput { .. })));
    }

    #[test]
    fn nearby_districts_include_base_first() {
        let districts = snapshot()
            .nearby_districts(
                "강남구",
                20.0,
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(districts[0], "강남구");
        assert!(districts.contains(&"서초구".to_string()));
        assert!(districts.contains(&"송파구".to_string()));
    }

    #[test]
    fn nearby_districts_without_geocoded_base() {
        let snap = ClinicSnapshot::new(vec![Clinic {
            latitude: None,
            longitude: None,
            ..clinic(9, "목동치과", "양천구", 0.0, 0.0)
        }]);
        let districts = snap
            .nearby_districts(
                "양천구",
                20.0,
                &AnalysisConfig::default(),
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(districts, vec!["양천구".to_string()]);
    }

    #[test]
    fn cancellation_aborts_queries() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = snapshot().clinics_within_radius(
            gangnam_station(),
            5.0,
            None,
            &AnalysisConfig::default(),
            &cancel,
        );
        assert_eq!(result.unwrap_err(), AnalysisError::Cancelled);
    }

    #[test]
    fn format_distance_buckets() {
        assert_eq!(format_distance(0.5), "500m");
        assert_eq!(format_distance(2.14), "2.1km");
        assert_eq!(format_distance(12.4), "12km");
    }

    #[test]
    fn format_distance_truncates() {
        assert_eq!(format_distance(0.9996), "999m");
        assert_eq!(format_distance(12.6), "12km");
    }
}
