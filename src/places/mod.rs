//! Geospatial tiling emulation over a fixed place catalog.
//!
//! One query shape: a bounding box plus a zoom level. Low zooms aggregate
//! the surviving places into per-region clusters, higher zooms emit
//! individual markers, and the highest band adds polygon geometry for the
//! places that carry it. Every response includes a deterministic cache key
//! so an HTTP layer can memoize whole responses per (bbox, zoom) pair.

pub mod catalog;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::metrics;

/// Highest zoom that still aggregates into clusters.
pub const CLUSTER_ZOOM_MAX: u32 = 6;
/// Lowest zoom at which polygon geometry is emitted.
pub const POLYGON_ZOOM_MIN: u32 = 11;
/// Version tag baked into every cache key. Bump when the response shape
/// changes so stale cached entries stop matching.
pub const CACHE_KEY_VERSION: &str = "places-v1";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Rectangular geographic filter. Bounds are inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lon >= self.west
            && point.lon <= self.east
            && point.lat >= self.south
            && point.lat <= self.north
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
}

/// Catalog entry. `polygon` is present only for places with real area.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub category: String,
    pub region: String,
    pub location: GeoPoint,
    pub polygon: Option<Geometry>,
}

/// Display metadata for a known region tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionInfo {
    pub tag: String,
    pub cluster_id: String,
    pub name: String,
    pub centroid: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub centroid: GeoPoint,
    pub count: usize,
    /// Distinct member categories, in first-seen order.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub id: String,
    pub name: String,
    pub category: String,
    pub location: GeoPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacePolygon {
    pub id: String,
    pub name: String,
    pub category: String,
    pub geometry: Geometry,
}

/// Full tiling result. `total` always counts the places that survived bbox
/// filtering, whichever of the three output kinds were populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapData {
    pub clusters: Vec<Cluster>,
    pub markers: Vec<Marker>,
    pub polygons: Vec<PlacePolygon>,
    pub cache_key: String,
    pub total: usize,
}

/// Tiling engine over the built-in catalog.
pub struct PlaceCatalog {
    places: Vec<Place>,
    regions: Vec<RegionInfo>,
}

impl Default for PlaceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceCatalog {
    pub fn new() -> Self {
        Self {
            places: catalog::places(),
            regions: catalog::regions(),
        }
    }

    #[cfg(test)]
    fn with_catalog(places: Vec<Place>, regions: Vec<RegionInfo>) -> Self {
        Self { places, regions }
    }

    /// Filter the catalog to `bbox`, then shape the survivors for the zoom
    /// band: clusters up to zoom 6, markers above, polygons from zoom 11.
    #[instrument(skip(self))]
    pub fn get_map_data(&self, bbox: &BoundingBox, zoom: u32) -> MapData {
        metrics::ENGINE_OPS_TOTAL
            .with_label_values(&["places", "get_map_data"])
            .inc();
        let started = Instant::now();

        let filtered: Vec<&Place> = self
            .places
            .iter()
            .filter(|p| bbox.contains(p.location))
            .collect();

        let mut clusters = Vec::new();
        let mut markers = Vec::new();
        let mut polygons = Vec::new();

        let mode = if filtered.is_empty() {
            "empty"
        } else if zoom <= CLUSTER_ZOOM_MAX {
            // Group by region tag, preserving first-seen region order.
            let mut grouped: Vec<(&str, Vec<&Place>)> = Vec::new();
            for &place in &filtered {
                match grouped.iter_mut().find(|(tag, _)| *tag == place.region) {
                    Some((_, members)) => members.push(place),
                    None => grouped.push((place.region.as_str(), vec![place])),
                }
            }
            for (tag, members) in grouped {
                clusters.push(self.cluster_for(tag, &members));
            }
            "cluster"
        } else {
            for place in &filtered {
                markers.push(Marker {
                    id: place.id.clone(),
                    name: place.name.clone(),
                    category: place.category.clone(),
                    location: place.location,
                });
                if zoom >= POLYGON_ZOOM_MIN {
                    if let Some(geometry) = &place.polygon {
                        polygons.push(PlacePolygon {
                            id: format!("{}-polygon", place.id),
                            name: place.name.clone(),
                            category: place.category.clone(),
                            geometry: geometry.clone(),
                        });
                    }
                }
            }
            "marker"
        };

        metrics::MAP_QUERY_DURATION
            .with_label_values(&[mode])
            .observe(started.elapsed().as_secs_f64());
        debug!(
            total = filtered.len(),
            clusters = clusters.len(),
            markers = markers.len(),
            polygons = polygons.len(),
            "tiled map query"
        );

        MapData {
            clusters,
            markers,
            polygons,
            cache_key: cache_key(bbox, zoom),
            total: filtered.len(),
        }
    }

    /// Known region tags, in catalog order.
    pub fn available_regions(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.tag.clone()).collect()
    }

    fn cluster_for(&self, tag: &str, members: &[&Place]) -> Cluster {
        let mut categories: Vec<String> = Vec::new();
        for place in members {
            if !categories.contains(&place.category) {
                categories.push(place.category.clone());
            }
        }

        match self.regions.iter().find(|r| r.tag == tag) {
            Some(info) => Cluster {
                id: info.cluster_id.clone(),
                name: info.name.clone(),
                centroid: info.centroid,
                count: members.len(),
                categories,
            },
            None => {
                // Unknown tag: synthesize ids and fall back to the mean of
                // the member coordinates.
                let n = members.len() as f64;
                Cluster {
                    id: format!("cluster-{tag}"),
                    name: tag.to_string(),
                    centroid: GeoPoint {
                        lon: members.iter().map(|p| p.location.lon).sum::<f64>() / n,
                        lat: members.iter().map(|p| p.location.lat).sum::<f64>() / n,
                    },
                    count: members.len(),
                    categories,
                }
            }
        }
    }
}

/// Deterministic cache key for a (bbox, zoom) pair: version tag, the four
/// edges rounded to two decimals, and the zoom, colon-joined.
pub fn cache_key(bbox: &BoundingBox, zoom: u32) -> String {
    format!(
        "{CACHE_KEY_VERSION}:{:.2}:{:.2}:{:.2}:{:.2}:{zoom}",
        bbox.west, bbox.south, bbox.east, bbox.north
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Generous box over the whole continental US.
    const US: BoundingBox = BoundingBox {
        west: -130.0,
        south: 20.0,
        east: -60.0,
        north: 50.0,
    };

    #[test]
    fn test_low_zoom_clusters_by_region() {
        let catalog = PlaceCatalog::new();
        let data = catalog.get_map_data(&US, 5);

        assert_eq!(data.clusters.len(), 3);
        assert!(data.markers.is_empty());
        assert!(data.polygons.is_empty());
        assert_eq!(data.total, 6);

        let bay = &data.clusters[0];
        assert_eq!(bay.id, "cluster-bay-area");
        assert_eq!(bay.name, "San Francisco Bay Area");
        assert_eq!(bay.centroid, GeoPoint { lon: -122.27, lat: 37.78 });
        assert_eq!(bay.count, 2);
        assert_eq!(bay.categories, vec!["park", "landmark"]);
    }

    #[test]
    fn test_high_zoom_emits_markers() {
        let catalog = PlaceCatalog::new();
        let data = catalog.get_map_data(&US, 8);

        assert!(data.clusters.is_empty());
        assert_eq!(data.markers.len(), 6);
        assert!(data.polygons.is_empty());
        assert_eq!(data.total, 6);
        assert_eq!(data.markers[0].id, "place-sf-golden-gate-park");
    }

    #[test]
    fn test_polygon_band_adds_geometry() {
        let catalog = PlaceCatalog::new();
        let data = catalog.get_map_data(&US, 11);

        assert_eq!(data.markers.len(), 6);
        // Only the two parks carry polygon geometry.
        assert_eq!(data.polygons.len(), 2);
        let ids: Vec<&str> = data.polygons.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "place-sf-golden-gate-park-polygon",
                "place-ny-central-park-polygon"
            ]
        );
        match &data.polygons[0].geometry {
            Geometry::Polygon { coordinates } => {
                let ring = &coordinates[0];
                assert_eq!(ring.len(), 5);
                assert_eq!(ring.first(), ring.last());
            }
        }
    }

    #[test]
    fn test_zoom_band_boundaries() {
        let catalog = PlaceCatalog::new();

        let at_6 = catalog.get_map_data(&US, CLUSTER_ZOOM_MAX);
        assert!(!at_6.clusters.is_empty());
        assert!(at_6.markers.is_empty());

        let at_7 = catalog.get_map_data(&US, CLUSTER_ZOOM_MAX + 1);
        assert!(at_7.clusters.is_empty());
        assert!(!at_7.markers.is_empty());
        assert!(at_7.polygons.is_empty());

        let at_10 = catalog.get_map_data(&US, POLYGON_ZOOM_MIN - 1);
        assert!(at_10.polygons.is_empty());

        let at_11 = catalog.get_map_data(&US, POLYGON_ZOOM_MIN);
        assert!(!at_11.polygons.is_empty());
    }

    #[test]
    fn test_bbox_filters_to_one_region() {
        let catalog = PlaceCatalog::new();
        let sf = BoundingBox {
            west: -123.0,
            south: 37.0,
            east: -122.0,
            north: 38.0,
        };
        let data = catalog.get_map_data(&sf, 5);

        assert_eq!(data.clusters.len(), 1);
        assert_eq!(data.clusters[0].id, "cluster-bay-area");
        assert_eq!(data.clusters[0].count, 2);
        assert_eq!(data.total, 2);
    }

    #[test]
    fn test_bbox_bounds_are_inclusive() {
        let catalog = PlaceCatalog::new();
        // West and south edges sit exactly on Golden Gate Park.
        let edge = BoundingBox {
            west: -122.4862,
            south: 37.7694,
            east: -122.0,
            north: 38.0,
        };
        let data = catalog.get_map_data(&edge, 8);
        assert!(data
            .markers
            .iter()
            .any(|m| m.id == "place-sf-golden-gate-park"));
    }

    #[test]
    fn test_empty_bbox_returns_nothing_but_still_keys() {
        let catalog = PlaceCatalog::new();
        let ocean = BoundingBox {
            west: -40.0,
            south: 10.0,
            east: -30.0,
            north: 20.0,
        };
        for zoom in [0, 5, 8, 13] {
            let data = catalog.get_map_data(&ocean, zoom);
            assert_eq!(data.total, 0);
            assert!(data.clusters.is_empty());
            assert!(data.markers.is_empty());
            assert!(data.polygons.is_empty());
            assert!(data.cache_key.starts_with(CACHE_KEY_VERSION));
        }
    }

    #[test]
    fn test_cache_key_is_deterministic_and_zoom_sensitive() {
        let catalog = PlaceCatalog::new();
        let a = catalog.get_map_data(&US, 5).cache_key;
        let b = catalog.get_map_data(&US, 5).cache_key;
        let c = catalog.get_map_data(&US, 6).cache_key;

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "places-v1:-130.00:20.00:-60.00:50.00:5");
    }

    #[test]
    fn test_cache_key_rounds_edges_to_two_decimals() {
        let bbox = BoundingBox {
            west: -122.48615,
            south: 37.76944,
            east: -122.0011,
            north: 38.0,
        };
        assert_eq!(cache_key(&bbox, 9), "places-v1:-122.49:37.77:-122.00:38.00:9");
    }

    #[test]
    fn test_unknown_region_falls_back_to_mean_centroid() {
        let places = vec![
            Place {
                id: "p1".to_string(),
                name: "One".to_string(),
                category: "a".to_string(),
                region: "mars".to_string(),
                location: GeoPoint { lon: 10.0, lat: 20.0 },
                polygon: None,
            },
            Place {
                id: "p2".to_string(),
                name: "Two".to_string(),
                category: "b".to_string(),
                region: "mars".to_string(),
                location: GeoPoint { lon: 30.0, lat: 40.0 },
                polygon: None,
            },
        ];
        let catalog = PlaceCatalog::with_catalog(places, Vec::new());
        let bbox = BoundingBox {
            west: 0.0,
            south: 0.0,
            east: 50.0,
            north: 50.0,
        };
        let data = catalog.get_map_data(&bbox, 3);

        assert_eq!(data.clusters.len(), 1);
        let cluster = &data.clusters[0];
        assert_eq!(cluster.id, "cluster-mars");
        assert_eq!(cluster.name, "mars");
        assert_eq!(cluster.centroid, GeoPoint { lon: 20.0, lat: 30.0 });
        assert_eq!(cluster.categories, vec!["a", "b"]);
    }

    #[test]
    fn test_available_regions_in_catalog_order() {
        let catalog = PlaceCatalog::new();
        assert_eq!(
            catalog.available_regions(),
            vec!["bay-area", "los-angeles", "new-york"]
        );
    }

    #[test]
    fn test_map_data_survives_serde_round_trip() {
        let catalog = PlaceCatalog::new();
        let data = catalog.get_map_data(&US, 12);

        let json = serde_json::to_string(&data).unwrap();
        let back: MapData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert!(json.contains("\"type\":\"Polygon\""));
    }
}
