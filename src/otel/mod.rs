//! OpenTelemetry integration for login-shield
//!
//! This module provides observability through OpenTelemetry, including
//! tracing, metrics, and optional logging export to OTLP endpoints. The
//! fail-open counter required by the ledger's error policy lives here so
//! operators can tell when the limiter is running blind.

use crate::config::OtelConfig;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter, MeterProvider as _},
    trace::TracerProvider as TracerProviderTrait,
    KeyValue,
};
use opentelemetry_sdk::{metrics::SdkMeterProvider, trace::TracerProvider, Resource};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OpenTelemetry error types
#[derive(Debug, Error)]
pub enum OtelError {
    /// Failed to initialize tracer
    #[error("Failed to initialize tracer: {0}")]
    TracerInit(String),

    /// Failed to initialize meter
    #[error("Failed to initialize meter: {0}")]
    MeterInit(String),

    /// Failed to shutdown
    #[error("Failed to shutdown: {0}")]
    Shutdown(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// OpenTelemetry provider for login-shield
///
/// Manages tracing and metrics providers with OTLP export capability.
pub struct OtelProvider {
    tracer_provider: Option<TracerProvider>,
    meter_provider: SdkMeterProvider,
    config: OtelConfig,
}

impl OtelProvider {
    /// Create a new OtelProvider with the given configuration
    pub fn new(config: &OtelConfig) -> Result<Self, OtelError> {
        let resource = Resource::new(vec![KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]);

        let (tracer_provider, meter_provider) = if config.enabled {
            let endpoint = config.endpoint.as_ref().ok_or_else(|| {
                OtelError::Config("OTLP endpoint is required when enabled".into())
            })?;

            let tracer_provider = Self::init_tracer_provider(endpoint, &resource)?;
            let meter_provider = Self::init_meter_provider(endpoint, &resource)?;

            (Some(tracer_provider), meter_provider)
        } else {
            // Use no-op meter provider when disabled
            let meter_provider = SdkMeterProvider::builder().with_resource(resource).build();
            (None, meter_provider)
        };

        // Set global tracer provider
        if let Some(ref tp) = tracer_provider {
            global::set_tracer_provider(tp.clone());
        }

        Ok(Self {
            tracer_provider,
            meter_provider,
            config: config.clone(),
        })
    }

    /// Initialize the tracer provider with OTLP exporter
    fn init_tracer_provider(
        endpoint: &str,
        resource: &Resource,
    ) -> Result<TracerProvider, OtelError> {
        use opentelemetry_otlp::WithExportConfig;
        use opentelemetry_sdk::runtime;
        use opentelemetry_sdk::trace::{Config, Sampler};

        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .build_span_exporter()
            .map_err(|e| OtelError::TracerInit(e.to_string()))?;

        let trace_config = Config::default()
            .with_sampler(Sampler::AlwaysOn)
            .with_resource(resource.clone());

        let tracer_provider = TracerProvider::builder()
            .with_batch_exporter(exporter, runtime::Tokio)
            .with_config(trace_config)
            .build();

        Ok(tracer_provider)
    }

    /// Initialize the meter provider with OTLP exporter
    fn init_meter_provider(
        endpoint: &str,
        resource: &Resource,
    ) -> Result<SdkMeterProvider, OtelError> {
        use opentelemetry_otlp::{MetricsExporterBuilder, WithExportConfig};
        use opentelemetry_sdk::metrics::reader::{
            DefaultAggregationSelector, DefaultTemporalitySelector,
        };
        use opentelemetry_sdk::{metrics::PeriodicReader, runtime};

        let exporter = MetricsExporterBuilder::from(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .build_metrics_exporter(
            Box::new(DefaultTemporalitySelector::new()),
            Box::new(DefaultAggregationSelector::new()),
        )
        .map_err(|e| OtelError::MeterInit(e.to_string()))?;

        let reader = PeriodicReader::builder(exporter, runtime::Tokio).build();

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(resource.clone())
            .with_reader(reader)
            .build();

        Ok(meter_provider)
    }

    /// Get a tracer from the provider
    pub fn tracer(&self, name: &'static str) -> opentelemetry_sdk::trace::Tracer {
        if let Some(ref tp) = self.tracer_provider {
            tp.tracer(name)
        } else {
            // Return a no-op tracer when disabled
            TracerProvider::builder().build().tracer(name)
        }
    }

    /// Get the meter for creating metrics
    pub fn meter(&self) -> Meter {
        self.meter_provider.meter(self.config.service_name.clone())
    }

    /// Check if OpenTelemetry is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Shutdown the OpenTelemetry providers gracefully
    pub fn shutdown(&self) -> Result<(), OtelError> {
        if let Err(e) = self.meter_provider.shutdown() {
            return Err(OtelError::Shutdown(format!(
                "Meter shutdown failed: {:?}",
                e
            )));
        }

        if let Some(ref tp) = self.tracer_provider {
            for result in tp.force_flush() {
                if let Err(e) = result {
                    return Err(OtelError::Shutdown(format!("Tracer flush failed: {:?}", e)));
                }
            }
        }

        Ok(())
    }
}

impl Drop for OtelProvider {
    fn drop(&mut self) {
        // Best-effort shutdown on drop
        let _ = self.shutdown();
    }
}

/// Application metrics for login-shield
///
/// Pre-defined instruments for monitoring the login path and the limiter's
/// health. `fail_open_total` is the operational alarm: it counts attempts
/// permitted only because the shared store was unreachable.
pub struct Metrics {
    /// Login attempts by outcome (success, invalid_credentials, rate_limited)
    pub logins_total: Counter<u64>,

    /// Session tokens issued
    pub tokens_issued_total: Counter<u64>,

    /// Bearer validations by outcome (valid, expired)
    pub token_validations_total: Counter<u64>,

    /// Failed attempts recorded in the ledger
    pub attempts_recorded_total: Counter<u64>,

    /// Attempts rejected at capacity
    pub rate_limited_total: Counter<u64>,

    /// Attempts permitted under the fail-open policy
    pub fail_open_total: Counter<u64>,

    /// Login request duration in seconds
    pub login_duration: Histogram<f64>,
}

impl Metrics {
    /// Create new metrics with the given meter
    pub fn new(meter: &Meter) -> Self {
        let logins_total = meter
            .u64_counter("login_shield_logins_total")
            .with_description("Login attempts by outcome")
            .init();

        let tokens_issued_total = meter
            .u64_counter("login_shield_tokens_issued_total")
            .with_description("Session tokens issued")
            .init();

        let token_validations_total = meter
            .u64_counter("login_shield_token_validations_total")
            .with_description("Bearer validations by outcome")
            .init();

        let attempts_recorded_total = meter
            .u64_counter("login_shield_attempts_recorded_total")
            .with_description("Failed attempts recorded in the ledger")
            .init();

        let rate_limited_total = meter
            .u64_counter("login_shield_rate_limited_total")
            .with_description("Attempts rejected at capacity")
            .init();

        let fail_open_total = meter
            .u64_counter("login_shield_fail_open_total")
            .with_description("Attempts permitted because the store was unreachable")
            .init();

        let login_duration = meter
            .f64_histogram("login_shield_login_duration_seconds")
            .with_description("Login request duration in seconds")
            .init();

        Self {
            logins_total,
            tokens_issued_total,
            token_validations_total,
            attempts_recorded_total,
            rate_limited_total,
            fail_open_total,
            login_duration,
        }
    }

    /// Record a login attempt with its outcome
    pub fn record_login(&self, outcome: &str) {
        self.logins_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }

    /// Record an issued session token
    pub fn record_token_issued(&self) {
        self.tokens_issued_total.add(1, &[]);
    }

    /// Record a bearer validation with its outcome
    pub fn record_token_validation(&self, outcome: &str) {
        self.token_validations_total
            .add(1, &[KeyValue::new("outcome", outcome.to_string())]);
    }

    /// Record a failed attempt written to the ledger
    pub fn record_attempt_recorded(&self) {
        self.attempts_recorded_total.add(1, &[]);
    }

    /// Record an attempt rejected at capacity
    pub fn record_rate_limited(&self) {
        self.rate_limited_total.add(1, &[]);
    }

    /// Record an attempt permitted under the fail-open policy
    pub fn record_fail_open(&self) {
        self.fail_open_total.add(1, &[]);
    }

    /// Record login request duration
    pub fn record_login_duration(&self, duration_secs: f64) {
        self.login_duration.record(duration_secs, &[]);
    }
}

/// Initialize tracing subscriber with OpenTelemetry integration
pub fn init_tracing(otel: &OtelProvider, log_level: &str) -> Result<(), OtelError> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    if otel.is_enabled() {
        // With OpenTelemetry layer
        let tracer = otel.tracer("login-shield");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        tracing_subscriber::registry()
            .with(filter)
            .with(otel_layer)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| OtelError::TracerInit(e.to_string()))?;
    } else {
        // Without OpenTelemetry layer
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| OtelError::TracerInit(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: OtelProvider initialization with disabled config
    #[test]
    fn test_otel_provider_disabled() {
        let config = OtelConfig {
            enabled: false,
            endpoint: None,
            insecure: false,
            service_name: "test-service".to_string(),
        };

        let provider = OtelProvider::new(&config);
        assert!(provider.is_ok());

        let provider = provider.unwrap();
        assert!(!provider.is_enabled());
        assert!(provider.tracer_provider.is_none());
    }

    // Test 2: OtelProvider requires endpoint when enabled
    #[test]
    fn test_otel_provider_requires_endpoint_when_enabled() {
        let config = OtelConfig {
            enabled: true,
            endpoint: None, // Missing endpoint
            insecure: false,
            service_name: "test-service".to_string(),
        };

        let result = OtelProvider::new(&config);
        assert!(result.is_err());

        match result {
            Err(OtelError::Config(msg)) => {
                assert!(msg.contains("endpoint is required"));
            }
            _ => panic!("Expected OtelError::Config"),
        }
    }

    // Test 3: Get meter from provider
    #[test]
    fn test_otel_provider_get_meter() {
        let config = OtelConfig::default();
        let provider = OtelProvider::new(&config).unwrap();
        let meter = provider.meter();

        let counter = meter.u64_counter("test_counter").init();
        counter.add(1, &[]);
    }

    // Test 4: Metrics creation and recording does not panic
    #[test]
    fn test_metrics_creation() {
        let config = OtelConfig::default();
        let provider = OtelProvider::new(&config).unwrap();
        let meter = provider.meter();
        let metrics = Metrics::new(&meter);

        metrics.record_login("success");
        metrics.record_login("invalid_credentials");
        metrics.record_login("rate_limited");
        metrics.record_token_issued();
        metrics.record_token_validation("valid");
        metrics.record_token_validation("expired");
        metrics.record_attempt_recorded();
        metrics.record_rate_limited();
        metrics.record_fail_open();
        metrics.record_login_duration(0.050);
    }

    // Test 5: Provider shutdown
    #[test]
    fn test_otel_provider_shutdown() {
        let config = OtelConfig::default();
        let provider = OtelProvider::new(&config).unwrap();
        let result = provider.shutdown();
        assert!(result.is_ok());
    }

    // Test 6: OtelError display
    #[test]
    fn test_otel_error_display() {
        let err = OtelError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");

        let err = OtelError::TracerInit("tracer error".to_string());
        assert_eq!(err.to_string(), "Failed to initialize tracer: tracer error");
    }
}
