use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub slot_duration_min: i64,
    pub min_lead_time_hours: i64,
    pub expiry_grace_min: i64,
    pub sweep_interval_secs: u64,
    pub sweep_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            slot_duration_min: env::var("SLOT_DURATION_MIN").unwrap_or_else(|_| "30".to_string()).parse().expect("SLOT_DURATION_MIN must be a number"),
            min_lead_time_hours: env::var("MIN_LEAD_TIME_HOURS").unwrap_or_else(|_| "24".to_string()).parse().expect("MIN_LEAD_TIME_HOURS must be a number"),
            expiry_grace_min: env::var("EXPIRY_GRACE_MIN").unwrap_or_else(|_| "60".to_string()).parse().expect("EXPIRY_GRACE_MIN must be a number"),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS").unwrap_or_else(|_| "60".to_string()).parse().expect("SWEEP_INTERVAL_SECS must be a number"),
            sweep_enabled: env::var("SWEEP_ENABLED").unwrap_or_else(|_| "true".to_string()).parse().expect("SWEEP_ENABLED must be true or false"),
        }
    }
}
