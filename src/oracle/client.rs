//! Oracle client with retry and credential rotation
//!
//! One call to [`OracleClient::expand`] is one logical fetch. Internally it is
//! a sequence of attempts across the credential pool:
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Success | Return children and the credential index used |
//! | Quota fault, attempt 1-2 | Wait the cooldown, retry the same credential |
//! | Quota fault, attempt 3 | Rotate to the next credential |
//! | Other fault, attempt 1-2 | Wait `2 × attempt` units, retry the same credential |
//! | Other fault, attempt 3 | Fatal, no rotation |
//! | Quota on every credential | Fatal `QuotaExceeded` |

use crate::classify::classify_content;
use crate::oracle::fault::{classify_fault, FaultKind, OracleFault};
use crate::oracle::prompt::{candidates_to_nodes, discovery_prompt, parse_candidates, ExpansionRequest};
use crate::oracle::transport::{OraclePrompt, OracleTransport};
use crate::state::Node;
use crate::OracleError;
use std::sync::Arc;
use std::time::Duration;

/// Attempts made on each credential before giving up on it
pub const ATTEMPTS_PER_CREDENTIAL: u32 = 3;

/// Timing of the retry state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Base time unit; the quota cooldown is 10 units, backoff is 2 units per attempt
    pub time_unit: Duration,
}

impl RetryPolicy {
    pub fn new(time_unit: Duration) -> Self {
        Self { time_unit }
    }

    /// Wait before retrying a credential that reported a quota fault
    pub fn quota_cooldown(&self) -> Duration {
        self.time_unit * 10
    }

    /// Wait before retrying after a non-quota fault on `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.time_unit * (2 * attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Result of a successful expansion
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Normalized child nodes
    pub children: Vec<Node>,

    /// Credential index that produced the answer
    pub index_used: usize,
}

/// Client issuing "expand this page" requests to the oracle
pub struct OracleClient<T> {
    transport: Arc<T>,
    policy: RetryPolicy,
}

impl<T> Clone for OracleClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            policy: self.policy,
        }
    }
}

impl<T: OracleTransport> OracleClient<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// The shared transport
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Asks the oracle for the children of `request.page_url`
    ///
    /// # Arguments
    ///
    /// * `credentials` - The credential pool, in rotation order
    /// * `start_index` - The credential to start from
    /// * `request` - Page, root and depth of the expansion
    ///
    /// # Returns
    ///
    /// * `Ok(Expansion)` - Children (possibly empty) and the credential used
    /// * `Err(OracleError::Configuration)` - Empty pool or index out of bounds
    /// * `Err(OracleError::QuotaExceeded)` - Every credential hit its quota
    /// * `Err(OracleError::TransientFault)` - A non-quota fault persisted on one credential
    pub async fn expand(
        &self,
        credentials: &[String],
        start_index: usize,
        request: &ExpansionRequest,
    ) -> Result<Expansion, OracleError> {
        if credentials.is_empty() {
            return Err(OracleError::Configuration(
                "no oracle credentials configured".to_string(),
            ));
        }

        if start_index >= credentials.len() {
            return Err(OracleError::Configuration(format!(
                "credential index {} out of bounds for pool of {}",
                start_index,
                credentials.len()
            )));
        }

        if classify_content(&request.page_url).is_resource() {
            tracing::debug!("{} is a resource, not expanding", request.page_url);
            return Ok(Expansion {
                children: Vec::new(),
                index_used: start_index,
            });
        }

        let prompt = OraclePrompt::json(discovery_prompt(request));
        let mut last_error: Option<OracleError> = None;

        for (index, credential) in credentials.iter().enumerate().skip(start_index) {
            for attempt in 1..=ATTEMPTS_PER_CREDENTIAL {
                let fault = match self.transport.generate(credential, &prompt).await {
                    Ok(payload) => {
                        return Ok(Expansion {
                            children: parse_children(&payload, request),
                            index_used: index,
                        });
                    }
                    Err(fault) => fault,
                };

                let kind = classify_fault(&fault);
                if kind == FaultKind::Quota {
                    last_error = Some(OracleError::QuotaExceeded {
                        credential_index: index,
                        message: fault.to_string(),
                    });

                    if attempt < ATTEMPTS_PER_CREDENTIAL {
                        tracing::warn!(
                            "Quota fault on credential #{} (attempt {}/{}), cooling down {:?}",
                            index,
                            attempt,
                            ATTEMPTS_PER_CREDENTIAL,
                            self.policy.quota_cooldown()
                        );
                        tokio::time::sleep(self.policy.quota_cooldown()).await;
                        continue;
                    }

                    tracing::warn!(
                        "Credential #{} exhausted after {} quota faults, rotating",
                        index,
                        ATTEMPTS_PER_CREDENTIAL
                    );
                    break;
                }

                if attempt == ATTEMPTS_PER_CREDENTIAL {
                    return Err(transient_error(index, kind, fault));
                }

                let backoff = self.policy.backoff(attempt);
                tracing::warn!(
                    "Oracle fault on credential #{} (attempt {}/{}): {}. Retrying in {:?}",
                    index,
                    attempt,
                    ATTEMPTS_PER_CREDENTIAL,
                    fault,
                    backoff
                );
                last_error = Some(transient_error(index, kind, fault));
                tokio::time::sleep(backoff).await;
            }
        }

        match last_error {
            Some(error) => {
                tracing::error!("Every oracle credential is exhausted: {}", error);
                Err(error)
            }
            None => Ok(Expansion {
                children: Vec::new(),
                index_used: credentials.len() - 1,
            }),
        }
    }
}

fn transient_error(credential_index: usize, kind: FaultKind, fault: OracleFault) -> OracleError {
    OracleError::TransientFault {
        credential_index,
        kind,
        status_code: fault.status_code,
        message: fault.message,
    }
}

fn parse_children(payload: &str, request: &ExpansionRequest) -> Vec<Node> {
    match parse_candidates(payload) {
        Some(candidates) => candidates_to_nodes(candidates, request),
        None => {
            tracing::warn!(
                "Malformed oracle reply for {}, treating page as childless",
                request.page_url
            );
            Vec::new()
        }
    }
}
