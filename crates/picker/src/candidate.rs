//! Reverse-geocoding results.

use geopin_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// One named part of an address, e.g. a street or a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressComponent {
    pub long_name: String,
}

/// An address the geocoder proposes for a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Unique key of the place
    pub place_id: String,
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    /// Where the marker goes when this candidate is selected
    pub location: Coordinate,
}

impl Candidate {
    pub fn new(
        place_id: impl Into<String>,
        formatted_address: impl Into<String>,
        location: Coordinate,
    ) -> Self {
        Self {
            place_id: place_id.into(),
            formatted_address: formatted_address.into(),
            address_components: Vec::new(),
            location,
        }
    }

    /// Append address components, most specific first.
    pub fn with_components<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.address_components.extend(names.into_iter().map(|n| AddressComponent {
            long_name: n.into(),
        }));
        self
    }

    /// Secondary line of the address list: component names joined by `-`.
    pub fn summary(&self) -> String {
        self.address_components
            .iter()
            .map(|c| c.long_name.as_str())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_joins_components() {
        let candidate = Candidate::new("p1", "1 Main St, Springfield", Coordinate::new(1.0, 1.0))
            .with_components(["1", "Main St", "Springfield"]);
        assert_eq!(candidate.summary(), "1-Main St-Springfield");
        assert_eq!(Candidate::new("p2", "x", Coordinate::new(0.0, 0.0)).summary(), "");
    }

    #[test]
    fn test_wire_field_names() {
        let candidate = Candidate::new("p1", "Somewhere", Coordinate::new(1.0, 2.0))
            .with_components(["Somewhere"]);
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["placeId"], "p1");
        assert_eq!(json["formattedAddress"], "Somewhere");
        assert_eq!(json["addressComponents"][0]["longName"], "Somewhere");
        assert_eq!(json["location"]["lng"], 2.0);
    }

    #[test]
    fn test_components_are_optional_on_input() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"placeId":"p9","formattedAddress":"Nowhere","location":{"lat":0.5,"lng":0.25}}"#,
        )
        .unwrap();
        assert!(candidate.address_components.is_empty());
        assert_eq!(candidate.location, Coordinate::new(0.5, 0.25));
    }
}
