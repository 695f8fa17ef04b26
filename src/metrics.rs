use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

lazy_static::lazy_static! {
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stratus_http_requests_total", "Total HTTP requests", &["method", "path", "status"]
    ).unwrap();
    pub static ref ENGINE_OPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stratus_engine_ops_total", "Operations per backend engine", &["engine", "op"]
    ).unwrap();
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "stratus_cache_hits_total", "Cache lookups", &["result"]
    ).unwrap();
    pub static ref CACHE_EXPIRATIONS_TOTAL: IntCounter = register_int_counter!(
        "stratus_cache_expirations_total", "Cache entries removed after TTL expiry"
    ).unwrap();
    pub static ref OBJECT_STORE_BYTES: IntGauge = register_int_gauge!(
        "stratus_object_store_bytes", "Total bytes currently held in the object store"
    ).unwrap();
    pub static ref MAP_QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "stratus_map_query_duration_seconds", "Map tile query duration", &["mode"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();
}

pub fn init() {
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&ENGINE_OPS_TOTAL);
    lazy_static::initialize(&CACHE_HITS_TOTAL);
    lazy_static::initialize(&CACHE_EXPIRATIONS_TOTAL);
    lazy_static::initialize(&OBJECT_STORE_BYTES);
    lazy_static::initialize(&MAP_QUERY_DURATION);
}
