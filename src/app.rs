use crate::config::Config;
use crate::errors::ToolError;
use crate::operations::{operations, BodyShape, Location, Operation};
use crate::services::logger::Logger;
use crate::services::n8n_client::{N8nClient, Transport};
use crate::services::tool_executor::ToolExecutor;
use crate::services::translator::Translator;
use crate::services::validation::Validation;
use std::collections::HashSet;
use std::sync::Arc;

pub struct App {
    pub logger: Logger,
    pub config: Config,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    /// Checks that every operation's path placeholders, path parameters and
    /// body shape agree with each other.
    pub fn validate_operation_table(table: &[Operation]) -> Result<(), ToolError> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for op in table {
            if !seen.insert(op.name) {
                problems.push(format!("{}: duplicate tool name", op.name));
            }
            let placeholders = op.path_placeholders();
            for placeholder in &placeholders {
                let bound = op
                    .params
                    .iter()
                    .filter(|spec| spec.name == *placeholder && spec.location == Location::Path)
                    .count();
                if bound != 1 {
                    problems.push(format!(
                        "{}: placeholder {{{}}} has {} path parameter(s)",
                        op.name, placeholder, bound
                    ));
                }
            }
            for spec in op.params.iter().filter(|s| s.location == Location::Path) {
                if !placeholders.contains(&spec.name) {
                    problems.push(format!(
                        "{}: path parameter '{}' has no placeholder in {}",
                        op.name, spec.name, op.path
                    ));
                }
                if !spec.required {
                    problems.push(format!(
                        "{}: path parameter '{}' must be required",
                        op.name, spec.name
                    ));
                }
            }
            let body_param = match op.body {
                BodyShape::Bare(param) | BodyShape::BareWrapped { param, .. } => Some(param),
                _ => None,
            };
            if let Some(param) = body_param {
                if op.param(param).is_none() {
                    problems.push(format!("{}: body parameter '{}' is not declared", op.name, param));
                }
            }
            for rename in op.renames {
                if op.param(rename.param).is_none() {
                    problems.push(format!(
                        "{}: rename targets undeclared parameter '{}'",
                        op.name, rename.param
                    ));
                }
            }
        }
        if problems.is_empty() {
            return Ok(());
        }
        Err(ToolError::unexpected("Operation table is inconsistent")
            .with_details(problems.join("\n")))
    }

    pub fn initialize(config: Config) -> Result<Self, ToolError> {
        let logger = Logger::new("n8n-mcp", config.log_level);
        let client = N8nClient::new(logger.clone(), config.api_url.clone(), config.timeout_ms)?;
        Self::with_transport(config, logger, Arc::new(client))
    }

    pub fn with_transport(
        config: Config,
        logger: Logger,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ToolError> {
        Self::validate_operation_table(operations())?;
        let translator = Translator::new(config.api_url.clone(), Validation::new());
        let tool_executor = Arc::new(ToolExecutor::new(
            logger.clone(),
            translator,
            transport,
            config.api_key.clone(),
        ));
        Ok(Self {
            logger,
            config,
            tool_executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{Group, HttpMethod, ParamKind, ParamSpec};

    #[test]
    fn shipped_table_is_consistent() {
        App::validate_operation_table(operations()).expect("operation table");
    }

    #[test]
    fn broken_table_lists_every_problem() {
        const PARAMS: &[ParamSpec] = &[ParamSpec::required("workflowId", ParamKind::String, Location::Path)];
        let broken = [
            Operation {
                name: "get-thing",
                group: Group::Workflow,
                description: "",
                method: HttpMethod::Get,
                path: "/things/{id}",
                params: PARAMS,
                body: BodyShape::Bare("things"),
                renames: &[],
            },
            Operation {
                name: "get-thing",
                group: Group::Workflow,
                description: "",
                method: HttpMethod::Get,
                path: "/things",
                params: &[],
                body: BodyShape::None,
                renames: &[],
            },
        ];
        let err = App::validate_operation_table(&broken).unwrap_err();
        assert!(err.details.contains("placeholder {id} has 0 path parameter(s)"));
        assert!(err.details.contains("'workflowId' has no placeholder"));
        assert!(err.details.contains("body parameter 'things' is not declared"));
        assert!(err.details.contains("duplicate tool name"));
    }
}
