//! Ordered candidate resolution for inconsistently validated fields.
//!
//! Some OTRS installations only accept priorities in one particular
//! spelling (`3 normal`, `3`, `normal`, ...). Rather than fail, create and
//! update calls try an ordered list of candidate values and keep the first
//! response an [`AcceptancePredicate`] accepts.
//!
//! There is no delay between attempts. Transport and HTTP failures abort
//! resolution immediately; only application errors inside a JSON body are
//! inspected.

use std::future::Future;

use crate::error::OtrsError;
use crate::models::{JsonObject, OtrsFault};

/// Priority spellings tried after the requested and configured values.
pub const PRIORITY_FALLBACKS: [&str; 5] = ["3 normal", "3 Normal", "normal", "3", "medium"];

/// Decides whether a response ends candidate resolution.
pub trait AcceptancePredicate {
    /// Returns true if `response` should be returned to the caller.
    fn accepts(&self, response: &JsonObject) -> bool;
}

/// Rejects responses whose `Error` text names one of the watched fields.
///
/// A response without an `Error` field is always accepted, as is an error
/// about some other field (that one is the caller's problem, not the
/// candidate's).
#[derive(Debug, Clone)]
pub struct FieldErrorPredicate {
    fields: Vec<String>,
}

impl FieldErrorPredicate {
    /// Watches the given field names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl AcceptancePredicate for FieldErrorPredicate {
    fn accepts(&self, response: &JsonObject) -> bool {
        match OtrsFault::from_response(response) {
            None => true,
            Some(fault) => !self.fields.iter().any(|field| fault.mentions(field)),
        }
    }
}

/// Builds the priority candidate list.
///
/// Order: the requested value, the configured default, then
/// [`PRIORITY_FALLBACKS`]. Blank values are skipped and duplicates keep
/// their first position.
pub fn priority_candidates(requested: Option<&str>, configured_default: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    let ordered = requested
        .into_iter()
        .chain(std::iter::once(configured_default))
        .chain(PRIORITY_FALLBACKS);

    for candidate in ordered {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !candidates.iter().any(|c| c == candidate) {
            candidates.push(candidate.to_string());
        }
    }

    candidates
}

/// The outcome of candidate resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The response to hand back: the accepted one, or the last one tried.
    pub response: JsonObject,
    /// The candidate that produced `response`.
    pub chosen: String,
    /// How many candidates were sent.
    pub attempts: usize,
    /// False if every candidate was rejected.
    pub accepted: bool,
}

/// Tries candidates in order until the predicate accepts a response.
#[derive(Debug, Clone)]
pub struct CandidateResolver<P> {
    field: String,
    candidates: Vec<String>,
    predicate: P,
}

impl<P: AcceptancePredicate> CandidateResolver<P> {
    /// Creates a resolver for `field` over `candidates`.
    pub fn new(field: impl Into<String>, candidates: Vec<String>, predicate: P) -> Self {
        Self {
            field: field.into(),
            candidates,
            predicate,
        }
    }

    /// Runs `attempt` for each candidate until one is accepted.
    ///
    /// If every candidate is rejected, the last response is returned with
    /// `accepted == false`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `attempt`, and returns
    /// `OtrsError::Validation` if there are no candidates.
    pub async fn resolve<F, Fut>(&self, mut attempt: F) -> Result<Resolution, OtrsError>
    where
        F: FnMut(&str) -> Fut,
        Fut: Future<Output = Result<JsonObject, OtrsError>>,
    {
        let mut last: Option<Resolution> = None;

        for (index, candidate) in self.candidates.iter().enumerate() {
            let response = attempt(candidate).await?;
            let attempts = index + 1;

            if self.predicate.accepts(&response) {
                if attempts > 1 {
                    tracing::debug!(
                        field = %self.field,
                        candidate = %candidate,
                        attempts,
                        "Candidate accepted after fallback"
                    );
                }
                return Ok(Resolution {
                    response,
                    chosen: candidate.clone(),
                    attempts,
                    accepted: true,
                });
            }

            tracing::debug!(
                field = %self.field,
                candidate = %candidate,
                attempt = attempts,
                remaining = self.candidates.len() - attempts,
                "Candidate rejected by remote server"
            );

            last = Some(Resolution {
                response,
                chosen: candidate.clone(),
                attempts,
                accepted: false,
            });
        }

        match last {
            Some(resolution) => {
                tracing::warn!(
                    field = %self.field,
                    attempts = resolution.attempts,
                    "All candidates rejected, returning last response"
                );
                Ok(resolution)
            }
            None => Err(OtrsError::validation(format!(
                "no candidate values for {}",
                self.field
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    fn object(value: serde_json::Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    fn priority_error() -> JsonObject {
        object(json!({
            "Error": {
                "ErrorCode": "TicketCreate.InvalidParameter",
                "ErrorMessage": "TicketCreate: Ticket->Priority is invalid!"
            }
        }))
    }

    #[test]
    fn test_candidates_default_first() {
        let candidates = priority_candidates(None, "3 normal");
        assert_eq!(candidates, vec!["3 normal", "3 Normal", "normal", "3", "medium"]);
    }

    #[test]
    fn test_candidates_requested_first_and_deduplicated() {
        let candidates = priority_candidates(Some("normal"), "4 high");
        assert_eq!(
            candidates,
            vec!["normal", "4 high", "3 normal", "3 Normal", "3", "medium"]
        );
    }

    #[test]
    fn test_candidates_skip_blank_request() {
        let candidates = priority_candidates(Some("  "), "3 normal");
        assert_eq!(candidates[0], "3 normal");
    }

    #[test]
    fn test_predicate_accepts_success() {
        let predicate = FieldErrorPredicate::new(["Priority"]);
        assert!(predicate.accepts(&object(json!({"TicketID": "1"}))));
    }

    #[test]
    fn test_predicate_rejects_watched_field() {
        let predicate = FieldErrorPredicate::new(["Priority", "CustomerUser"]);
        assert!(!predicate.accepts(&priority_error()));
        let customer = object(json!({"Error": {"ErrorMessage": "CustomerUser is invalid"}}));
        assert!(!predicate.accepts(&customer));
    }

    #[test]
    fn test_predicate_accepts_unrelated_error() {
        let predicate = FieldErrorPredicate::new(["Priority"]);
        let queue = object(json!({"Error": {"ErrorMessage": "Ticket->Queue is invalid!"}}));
        assert!(predicate.accepts(&queue));
    }

    #[tokio::test]
    async fn test_resolve_first_candidate_accepted() {
        let resolver = CandidateResolver::new(
            "Priority",
            priority_candidates(None, "3 normal"),
            FieldErrorPredicate::new(["Priority"]),
        );
        let resolution = resolver
            .resolve(|_| async { Ok(object(json!({"TicketID": "5"}))) })
            .await
            .unwrap();
        assert!(resolution.accepted);
        assert_eq!(resolution.chosen, "3 normal");
        assert_eq!(resolution.attempts, 1);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_until_accepted() {
        let seen = RefCell::new(Vec::new());
        let resolver = CandidateResolver::new(
            "Priority",
            priority_candidates(None, "3 normal"),
            FieldErrorPredicate::new(["Priority"]),
        );
        let resolution = resolver
            .resolve(|candidate| {
                seen.borrow_mut().push(candidate.to_string());
                let response = if candidate == "normal" {
                    object(json!({"TicketID": "5"}))
                } else {
                    priority_error()
                };
                async move { Ok(response) }
            })
            .await
            .unwrap();
        assert!(resolution.accepted);
        assert_eq!(resolution.chosen, "normal");
        assert_eq!(resolution.attempts, 3);
        assert_eq!(*seen.borrow(), vec!["3 normal", "3 Normal", "normal"]);
    }

    #[tokio::test]
    async fn test_resolve_exhausted_returns_last_response() {
        let resolver = CandidateResolver::new(
            "Priority",
            vec!["a".to_string(), "b".to_string()],
            FieldErrorPredicate::new(["Priority"]),
        );
        let resolution = resolver
            .resolve(|candidate| {
                let response = object(json!({
                    "Error": {"ErrorMessage": format!("Priority {} unknown", candidate)}
                }));
                async move { Ok(response) }
            })
            .await
            .unwrap();
        assert!(!resolution.accepted);
        assert_eq!(resolution.chosen, "b");
        assert_eq!(resolution.attempts, 2);
        assert_eq!(
            resolution.response["Error"]["ErrorMessage"],
            json!("Priority b unknown")
        );
    }

    #[tokio::test]
    async fn test_resolve_propagates_errors() {
        let resolver = CandidateResolver::new(
            "Priority",
            vec!["a".to_string(), "b".to_string()],
            FieldErrorPredicate::new(["Priority"]),
        );
        let calls = RefCell::new(0);
        let result = resolver
            .resolve(|_| {
                *calls.borrow_mut() += 1;
                async { Err(OtrsError::timeout(std::time::Duration::from_secs(30), "TicketCreate")) }
            })
            .await;
        assert!(result.unwrap_err().is_transport());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_resolve_without_candidates() {
        let resolver = CandidateResolver::new("Priority", Vec::new(), FieldErrorPredicate::new(["Priority"]));
        let result = resolver
            .resolve(|_| async { Ok(JsonObject::new()) })
            .await;
        assert!(matches!(result, Err(OtrsError::Validation(_))));
    }
}
