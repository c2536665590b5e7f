use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A clinic record as ingested by the host service. Immutable to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub district: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub verified: bool,
    pub has_parking: bool,
    pub night_service: bool,
    pub weekend_service: bool,
}

impl Clinic {
    /// Validated coordinates, or None when absent or out of range.
    /// (0, 0) is treated as a missing geocode, not a real location.
    pub fn coordinates(&self) -> Option<crate::geo::Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => crate::geo::Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinic(lat: Option<f64>, lng: Option<f64>) -> Clinic {
        Clinic {
            id: Uuid::new_v4(),
            name: "서울밝은치과".into(),
            district: "강남구".into(),
            latitude: lat,
            longitude: lng,
            verified: true,
            has_parking: false,
            night_service: false,
            weekend_service: true,
        }
    }

    #[test]
    fn coordinates_present_and_valid() {
        let c = clinic(Some(37.5173), Some(127.0473));
        let coords = c.coordinates().unwrap();
        assert_eq!(coords.lat, 37.5173);
        assert_eq!(coords.lng, 127.0473);
    }

    #[test]
    fn coordinates_missing_or_invalid() {
        assert!(clinic(None, Some(127.0)).coordinates().is_none());
        assert!(clinic(Some(95.0), Some(127.0)).coordinates().is_none());
        assert!(clinic(Some(0.0), Some(0.0)).coordinates().is_none());
    }
}
