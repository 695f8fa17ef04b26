//! Built-in place catalog and region metadata.
//!
//! A small, fixed set of well-known places spread over three metro regions.
//! Two of them carry polygon geometry so the high-zoom path has something
//! to emit. The data is intentionally tiny; it exists to give map clients
//! predictable responses, not to model the world.

use super::{GeoPoint, Geometry, Place, RegionInfo};

pub(super) fn places() -> Vec<Place> {
    vec![
        Place {
            id: "place-sf-golden-gate-park".to_string(),
            name: "Golden Gate Park".to_string(),
            category: "park".to_string(),
            region: "bay-area".to_string(),
            location: GeoPoint {
                lon: -122.4862,
                lat: 37.7694,
            },
            polygon: Some(Geometry::Polygon {
                coordinates: vec![vec![
                    [-122.495, 37.771],
                    [-122.483, 37.771],
                    [-122.483, 37.765],
                    [-122.495, 37.765],
                    [-122.495, 37.771],
                ]],
            }),
        },
        Place {
            id: "place-sf-ferry-building".to_string(),
            name: "Ferry Building".to_string(),
            category: "landmark".to_string(),
            region: "bay-area".to_string(),
            location: GeoPoint {
                lon: -122.393,
                lat: 37.7955,
            },
            polygon: None,
        },
        Place {
            id: "place-la-griffith-observatory".to_string(),
            name: "Griffith Observatory".to_string(),
            category: "observatory".to_string(),
            region: "los-angeles".to_string(),
            location: GeoPoint {
                lon: -118.3004,
                lat: 34.1184,
            },
            polygon: None,
        },
        Place {
            id: "place-la-santa-monica-pier".to_string(),
            name: "Santa Monica Pier".to_string(),
            category: "landmark".to_string(),
            region: "los-angeles".to_string(),
            location: GeoPoint {
                lon: -118.495,
                lat: 34.0094,
            },
            polygon: None,
        },
        Place {
            id: "place-ny-central-park".to_string(),
            name: "Central Park".to_string(),
            category: "park".to_string(),
            region: "new-york".to_string(),
            location: GeoPoint {
                lon: -73.9654,
                lat: 40.7829,
            },
            polygon: Some(Geometry::Polygon {
                coordinates: vec![vec![
                    [-73.9818, 40.8005],
                    [-73.9497, 40.8005],
                    [-73.9497, 40.7644],
                    [-73.9818, 40.7644],
                    [-73.9818, 40.8005],
                ]],
            }),
        },
        Place {
            id: "place-ny-statue-of-liberty".to_string(),
            name: "Statue of Liberty".to_string(),
            category: "landmark".to_string(),
            region: "new-york".to_string(),
            location: GeoPoint {
                lon: -74.0445,
                lat: 40.6892,
            },
            polygon: None,
        },
    ]
}

pub(super) fn regions() -> Vec<RegionInfo> {
    vec![
        RegionInfo {
            tag: "bay-area".to_string(),
            cluster_id: "cluster-bay-area".to_string(),
            name: "San Francisco Bay Area".to_string(),
            centroid: GeoPoint {
                lon: -122.27,
                lat: 37.78,
            },
        },
        RegionInfo {
            tag: "los-angeles".to_string(),
            cluster_id: "cluster-los-angeles".to_string(),
            name: "Los Angeles Metro".to_string(),
            centroid: GeoPoint {
                lon: -118.37,
                lat: 34.1,
            },
        },
        RegionInfo {
            tag: "new-york".to_string(),
            cluster_id: "cluster-new-york".to_string(),
            name: "New York City".to_string(),
            centroid: GeoPoint {
                lon: -73.97,
                lat: 40.76,
            },
        },
    ]
}
