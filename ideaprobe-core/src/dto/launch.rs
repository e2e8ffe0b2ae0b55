//! Research workflow DTOs
//!
//! Bodies sent to the workflow engine to launch an execution and to query its
//! status, plus identifier extraction from the launch response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::execution::ExecutionId;

/// Variable name the research flow reads the target market from
pub const TARGET_MARKET_VARIABLE: &str = "target_market";
/// Variable name the research flow reads the idea description from
pub const PRODUCT_IDEA_VARIABLE: &str = "product_idea";

/// Named variable passed to a flow execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionVariable {
    pub name: String,
    pub variable_value: String,
}

impl ExecutionVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_value: value.into(),
        }
    }
}

/// Request to create a new execution
///
/// The engine accepts either the generic flow-variables form or a simplified
/// form used by the report purchase entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaunchRequest {
    FlowVariables {
        flow_execution_variables: Vec<ExecutionVariable>,
    },
    Simplified {
        target_market: String,
        product_idea: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
}

/// Reason a launch request was rejected before sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLaunchRequest(pub String);

impl std::fmt::Display for InvalidLaunchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidLaunchRequest {}

impl LaunchRequest {
    /// Build the flow-variables form for the research workflow
    pub fn research(target_market: impl Into<String>, product_idea: impl Into<String>) -> Self {
        Self::FlowVariables {
            flow_execution_variables: vec![
                ExecutionVariable::new(TARGET_MARKET_VARIABLE, target_market),
                ExecutionVariable::new(PRODUCT_IDEA_VARIABLE, product_idea),
            ],
        }
    }

    /// Build the simplified form used by the report purchase entry point
    pub fn simplified(
        target_market: impl Into<String>,
        product_idea: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self::Simplified {
            target_market: target_market.into(),
            product_idea: product_idea.into(),
            email,
        }
    }

    /// Check that every variable value is non-empty
    ///
    /// Nothing else about the request is validated.
    pub fn validate(&self) -> Result<(), InvalidLaunchRequest> {
        match self {
            Self::FlowVariables {
                flow_execution_variables,
            } => {
                if flow_execution_variables.is_empty() {
                    return Err(InvalidLaunchRequest(
                        "at least one execution variable is required".to_string(),
                    ));
                }
                for var in flow_execution_variables {
                    if var.variable_value.trim().is_empty() {
                        return Err(InvalidLaunchRequest(format!(
                            "variable '{}' cannot be empty",
                            var.name
                        )));
                    }
                }
            }
            Self::Simplified {
                target_market,
                product_idea,
                ..
            } => {
                if target_market.trim().is_empty() {
                    return Err(InvalidLaunchRequest(
                        "target market cannot be empty".to_string(),
                    ));
                }
                if product_idea.trim().is_empty() {
                    return Err(InvalidLaunchRequest(
                        "product idea cannot be empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Body of a status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub execution_id: ExecutionId,
}

const ID_FIELDS: [&str; 4] = ["execution_id", "executionId", "id", "job_id"];

/// Extract the execution identifier from a decoded launch response
///
/// Looks at the top level first, then inside a `data` object. Numeric ids are
/// accepted and rendered as strings.
pub fn extract_execution_id(response: &Value) -> Option<ExecutionId> {
    find_id(response).or_else(|| response.get("data").and_then(find_id))
}

fn find_id(value: &Value) -> Option<ExecutionId> {
    ID_FIELDS.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) => ExecutionId::new(s.trim()).ok(),
        Value::Number(n) => ExecutionId::new(n.to_string()).ok(),
        _ => None,
    })
}
