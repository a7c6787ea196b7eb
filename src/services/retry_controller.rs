use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::{
    config::GenerationSettings,
    constants::prompts::CORRECTIVE_PROMPT,
    errors::{AttemptFailure, TerminalFailure, TransportFailure, TransportReason, ValidationFailure},
    models::domain::UnitKind,
    services::{model_service::ModelInvoker, prompt_helpers::fill_template},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &GenerationSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: settings.retry_base_delay,
            max_delay: settings.retry_max_delay,
        }
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Runs one generation unit: invoke, validate, back off, repeat.
#[derive(Clone)]
pub struct RetryController {
    invoker: ModelInvoker,
    policy: RetryPolicy,
    deadline: Option<Instant>,
}

impl RetryController {
    pub fn new(invoker: ModelInvoker, policy: RetryPolicy) -> Self {
        Self {
            invoker,
            policy,
            deadline: None,
        }
    }

    /// Stops the unit at `deadline`, keeping the attempts made so far.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the first record that validates, or every attempt's failure once the
    /// budget or the deadline is spent. Retries carry a correction naming the previous
    /// failure.
    pub async fn run_unit<T, V>(
        &self,
        unit: UnitKind,
        prompt: &str,
        validator: V,
    ) -> Result<T, TerminalFailure>
    where
        V: Fn(&str) -> Result<T, ValidationFailure>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut failures: Vec<AttemptFailure> = Vec::new();

        for attempt in 1..=max_attempts {
            let attempt_prompt = match failures.last() {
                None => prompt.to_string(),
                Some(previous) => with_correction(prompt, attempt, previous),
            };

            let invocation = self.invoker.invoke(&attempt_prompt);
            let response = match self.deadline {
                Some(deadline) => match timeout_at(deadline, invocation).await {
                    Ok(response) => response,
                    Err(_) => {
                        failures.push(AttemptFailure::from(TransportFailure::new(
                            TransportReason::Timeout,
                            "request deadline reached before the model responded",
                        )));
                        return Err(self.abandon(unit, failures));
                    }
                },
                None => invocation.await,
            };

            let outcome = match response {
                Ok(raw) => validator(&raw).map_err(AttemptFailure::from),
                Err(transport) => Err(AttemptFailure::from(transport)),
            };

            match outcome {
                Ok(record) => {
                    log::info!("{} unit succeeded on attempt {}/{}", unit, attempt, max_attempts);
                    return Ok(record);
                }
                Err(failure) => {
                    log::warn!(
                        "{} unit attempt {}/{} failed ({}): {}",
                        unit,
                        attempt,
                        max_attempts,
                        failure.category(),
                        failure
                    );
                    failures.push(failure);

                    if attempt < max_attempts {
                        let backoff = tokio::time::sleep(self.policy.delay_for(attempt));
                        match self.deadline {
                            Some(deadline) => {
                                if timeout_at(deadline, backoff).await.is_err() {
                                    return Err(self.abandon(unit, failures));
                                }
                            }
                            None => backoff.await,
                        }
                    }
                }
            }
        }

        let terminal = TerminalFailure {
            unit,
            attempts: failures,
            deadline_reached: false,
        };
        log::error!("{}", terminal);
        Err(terminal)
    }

    fn abandon(&self, unit: UnitKind, attempts: Vec<AttemptFailure>) -> TerminalFailure {
        log::warn!(
            "{} unit abandoned at request deadline after {} attempt(s)",
            unit,
            attempts.len()
        );
        TerminalFailure {
            unit,
            attempts,
            deadline_reached: true,
        }
    }
}

fn with_correction(prompt: &str, attempt: u32, previous: &AttemptFailure) -> String {
    let attempt = attempt.to_string();
    let reason = previous.to_string();
    let correction = fill_template(
        CORRECTIVE_PROMPT,
        &[("attempt", attempt.as_str()), ("reason", reason.as_str())],
    );
    format!("{}{}", prompt, correction)
}
