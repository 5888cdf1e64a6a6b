//! The slices of weather.gov GeoJSON documents the pipeline reads.
//!
//! Everything the API may omit is optional or defaulted so that a sparse
//! document decodes and the gap is handled where the field is used.

use serde::Deserialize;

/// `GET /points/{lat},{lon}`
#[derive(Debug, Deserialize, Default)]
pub struct PointResponse {
    #[serde(default)]
    pub properties: PointProperties,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    pub observation_stations: Option<String>,
}

/// The station collection linked from `observationStations`
#[derive(Debug, Deserialize, Default)]
pub struct StationCollection {
    #[serde(default)]
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Deserialize)]
pub struct StationFeature {
    pub properties: StationProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationProperties {
    pub station_identifier: String,
    pub name: Option<String>,
}

/// `GET /stations/{id}/observations/latest`
#[derive(Debug, Deserialize)]
pub struct ObservationResponse {
    pub properties: ObservationProperties,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObservationProperties {
    pub timestamp: Option<String>,
    pub text_description: Option<String>,
    pub temperature: Option<QuantitativeValue>,
    pub dewpoint: Option<QuantitativeValue>,
    pub wind_direction: Option<QuantitativeValue>,
    pub wind_speed: Option<QuantitativeValue>,
    pub wind_gust: Option<QuantitativeValue>,
    pub barometric_pressure: Option<QuantitativeValue>,
    pub visibility: Option<QuantitativeValue>,
    pub relative_humidity: Option<QuantitativeValue>,
}

/// `{"unitCode": "wmoUnit:degC", "value": 21.7, "qualityControl": "V"}`
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    pub value: Option<f64>,
    pub unit_code: Option<String>,
}

impl QuantitativeValue {
    /// The reported value when it is present and finite.
    pub fn finite(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Value of an optional quantity, `None` when the quantity or its value is missing.
pub fn finite_value(quantity: &Option<QuantitativeValue>) -> Option<f64> {
    quantity.as_ref().and_then(QuantitativeValue::finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_sparse_observation() {
        let doc = json!({
            "properties": {
                "timestamp": "2026-03-01T12:51:00+00:00",
                "temperature": { "unitCode": "wmoUnit:degC", "value": 21.7, "qualityControl": "V" },
                "windSpeed": { "unitCode": "wmoUnit:km_h-1", "value": null },
                "elevation": { "unitCode": "wmoUnit:m", "value": 247 }
            }
        });
        let obs: ObservationResponse = serde_json::from_value(doc).unwrap();
        assert_eq!(finite_value(&obs.properties.temperature), Some(21.7));
        assert_eq!(finite_value(&obs.properties.wind_speed), None);
        assert!(obs.properties.dewpoint.is_none());
        assert!(obs.properties.text_description.is_none());
    }

    #[test]
    fn point_without_properties_decodes_to_missing_link() {
        let point: PointResponse = serde_json::from_value(json!({ "type": "Feature" })).unwrap();
        assert!(point.properties.observation_stations.is_none());
    }
}
