//! Metrics collection.
//!
//! Prometheus-compatible counters for the damage pipeline and state
//! machines. Every label value comes from a closed set, so cardinality is
//! bounded by construction.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::combat::RejectReason;
use crate::error::SilkError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global Prometheus recorder.
///
/// Returns a handle for rendering the exposition text, or `None` if a
/// recorder was already installed by an earlier call.
///
/// # Errors
///
/// Returns `SilkError::Io` if the recorder cannot be installed.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, SilkError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(None);
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| SilkError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(Some(handle))
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "silkcore_damage_applied_total",
        "Total number of contacts that dealt damage"
    );
    describe_counter!("silkcore_damage_dealt_total", "Total HP removed by contacts");
    describe_counter!(
        "silkcore_contacts_rejected_total",
        "Total number of contacts rejected, by reason"
    );
    describe_counter!(
        "silkcore_state_transitions_total",
        "Total number of state machine transitions, including initial entries"
    );
    describe_counter!(
        "silkcore_actor_deaths_total",
        "Total number of actors whose HP reached zero"
    );
}

/// Records a contact that removed `dealt` HP.
pub fn record_damage_applied(dealt: u32) {
    counter!("silkcore_damage_applied_total").increment(1);
    counter!("silkcore_damage_dealt_total").increment(u64::from(dealt));
}

/// Records a rejected contact.
pub fn record_contact_rejected(reason: RejectReason) {
    counter!("silkcore_contacts_rejected_total", "reason" => reason.as_str()).increment(1);
}

/// Records a state machine transition.
pub fn record_state_transition() {
    counter!("silkcore_state_transitions_total").increment(1);
}

/// Records an actor death.
pub fn record_actor_death() {
    counter!("silkcore_actor_deaths_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_damage_applied(3);
        record_contact_rejected(RejectReason::Invulnerable);
        record_state_transition();
        record_actor_death();
    }
}
