//! Default values applied when the configuration file omits a field

pub fn default_currency() -> String {
    "INR".to_string()
}

pub fn default_max_results() -> usize {
    10
}

pub fn default_min_quantity_ratio() -> f64 {
    0.5
}

pub fn default_max_price_ratio() -> f64 {
    1.2
}

pub fn default_auto_release_days() -> i64 {
    7
}

pub fn default_sweep_interval_secs() -> u64 {
    60
}

pub fn default_timeout_secs() -> u64 {
    10
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
