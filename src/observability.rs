use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("elemental.client.requests");
pub(crate) static CLIENT_COMPLETIONS: Counter = Counter::new("elemental.client.completions");
pub(crate) static CLIENT_CONFIGURATION_FAILURES: Counter =
    Counter::new("elemental.client.configuration_failures");
pub(crate) static CLIENT_SERVICE_FAILURES: Counter =
    Counter::new("elemental.client.service_failures");
pub(crate) static CLIENT_UNKNOWN_FAILURES: Counter =
    Counter::new("elemental.client.unknown_failures");
pub(crate) static CLIENT_MALFORMED_RESPONSES: Counter =
    Counter::new("elemental.client.malformed_responses");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("elemental.client.request_duration_seconds");

pub(crate) static CONVERSATION_TURNS: Counter = Counter::new("elemental.conversation.turns");
pub(crate) static CONVERSATION_REJECTED: Counter =
    Counter::new("elemental.conversation.rejected_submissions");
pub(crate) static CONVERSATION_ABANDONED: Counter =
    Counter::new("elemental.conversation.abandoned_turns");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_COMPLETIONS);
    collector.register_counter(&CLIENT_CONFIGURATION_FAILURES);
    collector.register_counter(&CLIENT_SERVICE_FAILURES);
    collector.register_counter(&CLIENT_UNKNOWN_FAILURES);
    collector.register_counter(&CLIENT_MALFORMED_RESPONSES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CONVERSATION_TURNS);
    collector.register_counter(&CONVERSATION_REJECTED);
    collector.register_counter(&CONVERSATION_ABANDONED);
}
