use super::{
    BodyShape, Group, HttpMethod, ItemRename, Location, Operation, ParamKind, ParamSpec, Rule,
};
use crate::constants::limits::MAX_PAGE_LIMIT;

const NON_EMPTY: &[Rule] = &[Rule::NonEmpty];
const POSITIVE: &[Rule] = &[Rule::PositiveInt { max: None }];

const LIMIT: ParamSpec = ParamSpec::optional("limit", ParamKind::Integer, Location::Query)
    .rules(&[Rule::PositiveInt {
        max: Some(MAX_PAGE_LIMIT),
    }])
    .describe("Maximum number of items to return (1-1000)");
const CURSOR: ParamSpec = ParamSpec::optional("cursor", ParamKind::String, Location::Query)
    .rules(NON_EMPTY)
    .describe("Pagination cursor returned as nextCursor by a previous call");

const fn path_id(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec::required(name, ParamKind::String, Location::Path)
        .rules(NON_EMPTY)
        .describe(description)
}

const fn body_string(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec::required(name, ParamKind::String, Location::Body)
        .rules(NON_EMPTY)
        .describe(description)
}

const fn query_flag(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec::optional(name, ParamKind::Boolean, Location::Query).describe(description)
}

const fn query_string(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec::optional(name, ParamKind::String, Location::Query)
        .rules(NON_EMPTY)
        .describe(description)
}

const WORKFLOW_ID: ParamSpec = path_id("id", "Workflow ID");
const EXECUTION_ID: ParamSpec = ParamSpec::required("id", ParamKind::Integer, Location::Path)
    .rules(POSITIVE)
    .describe("Execution ID");
const PROJECT_ID: ParamSpec = path_id("projectId", "Project ID");
const TAG_ID: ParamSpec = path_id("id", "Tag ID");
const VARIABLE_ID: ParamSpec = path_id("id", "Variable ID");
const DESTINATION_PROJECT: ParamSpec =
    body_string("destinationProjectId", "ID of the project to move the resource to");

const WORKFLOW_BODY: [ParamSpec; 5] = [
    body_string("name", "Workflow name"),
    ParamSpec::required("nodes", ParamKind::Array, Location::Body)
        .rules(&[Rule::MinItems(1), Rule::ItemKind(ParamKind::Object)])
        .describe("Workflow nodes"),
    ParamSpec::required("connections", ParamKind::Object, Location::Body)
        .describe("Connections between nodes, keyed by source node name"),
    ParamSpec::optional("settings", ParamKind::Object, Location::Body)
        .describe("Workflow settings"),
    ParamSpec::optional("staticData", ParamKind::Object, Location::Body)
        .describe("Workflow static data"),
];

const EXECUTION_STATUSES: &[&str] = &["error", "success", "waiting"];
const GLOBAL_ROLES: &[&str] = &["global:admin", "global:member"];
const AUDIT_CATEGORIES: &[&str] = &["credentials", "database", "nodes", "filesystem", "instance"];

static OPERATIONS: &[Operation] = &[
    // workflows
    Operation {
        name: "list-workflows",
        group: Group::Workflow,
        description: "List workflows, optionally filtered by state, tags, name or project",
        method: HttpMethod::Get,
        path: "/workflows",
        params: &[
            query_flag("active", "Only return active (true) or inactive (false) workflows"),
            query_string("tags", "Comma-separated tag names"),
            query_string("name", "Workflow name filter"),
            query_string("projectId", "Project ID filter"),
            query_flag("excludePinnedData", "Omit pinned data from the response"),
            LIMIT,
            CURSOR,
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "get-workflow",
        group: Group::Workflow,
        description: "Get a workflow by ID",
        method: HttpMethod::Get,
        path: "/workflows/{id}",
        params: &[
            WORKFLOW_ID,
            query_flag("excludePinnedData", "Omit pinned data from the response"),
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "create-workflow",
        group: Group::Workflow,
        description: "Create a workflow from nodes and connections",
        method: HttpMethod::Post,
        path: "/workflows",
        params: &WORKFLOW_BODY,
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "update-workflow",
        group: Group::Workflow,
        description: "Replace a workflow's definition",
        method: HttpMethod::Put,
        path: "/workflows/{id}",
        params: &[
            WORKFLOW_ID,
            WORKFLOW_BODY[0],
            WORKFLOW_BODY[1],
            WORKFLOW_BODY[2],
            WORKFLOW_BODY[3],
            WORKFLOW_BODY[4],
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "delete-workflow",
        group: Group::Workflow,
        description: "Delete a workflow",
        method: HttpMethod::Delete,
        path: "/workflows/{id}",
        params: &[WORKFLOW_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "activate-workflow",
        group: Group::Workflow,
        description: "Activate a workflow",
        method: HttpMethod::Post,
        path: "/workflows/{id}/activate",
        params: &[WORKFLOW_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "deactivate-workflow",
        group: Group::Workflow,
        description: "Deactivate a workflow",
        method: HttpMethod::Post,
        path: "/workflows/{id}/deactivate",
        params: &[WORKFLOW_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "transfer-workflow",
        group: Group::Workflow,
        description: "Move a workflow to another project",
        method: HttpMethod::Put,
        path: "/workflows/{id}/transfer",
        params: &[WORKFLOW_ID, DESTINATION_PROJECT],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "get-workflow-tags",
        group: Group::Workflow,
        description: "List the tags attached to a workflow",
        method: HttpMethod::Get,
        path: "/workflows/{id}/tags",
        params: &[WORKFLOW_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "update-workflow-tags",
        group: Group::Workflow,
        description: "Replace the tags attached to a workflow",
        method: HttpMethod::Put,
        path: "/workflows/{id}/tags",
        params: &[
            WORKFLOW_ID,
            ParamSpec::required("tagIds", ParamKind::Array, Location::Body)
                .rules(&[Rule::ItemKind(ParamKind::String)])
                .describe("IDs of the tags to attach; an empty list removes all tags"),
        ],
        body: BodyShape::BareWrapped {
            param: "tagIds",
            key: "id",
        },
        renames: &[],
    },
    // executions
    Operation {
        name: "list-executions",
        group: Group::Execution,
        description: "List executions, optionally filtered by status, workflow or project",
        method: HttpMethod::Get,
        path: "/executions",
        params: &[
            query_flag("includeData", "Include full execution data"),
            ParamSpec::optional("status", ParamKind::String, Location::Query)
                .rules(&[Rule::OneOf(EXECUTION_STATUSES)])
                .describe("Execution status filter"),
            query_string("workflowId", "Workflow ID filter"),
            query_string("projectId", "Project ID filter"),
            LIMIT,
            CURSOR,
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "get-execution",
        group: Group::Execution,
        description: "Get an execution by ID",
        method: HttpMethod::Get,
        path: "/executions/{id}",
        params: &[
            EXECUTION_ID,
            query_flag("includeData", "Include full execution data"),
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "delete-execution",
        group: Group::Execution,
        description: "Delete an execution",
        method: HttpMethod::Delete,
        path: "/executions/{id}",
        params: &[EXECUTION_ID],
        body: BodyShape::None,
        renames: &[],
    },
    // credentials
    Operation {
        name: "create-credential",
        group: Group::Credential,
        description: "Create a credential; use get-credential-schema to discover the data fields",
        method: HttpMethod::Post,
        path: "/credentials",
        params: &[
            body_string("name", "Credential name"),
            body_string("type", "Credential type name, e.g. githubApi"),
            ParamSpec::required("data", ParamKind::Object, Location::Body)
                .describe("Credential data matching the type's schema"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "delete-credential",
        group: Group::Credential,
        description: "Delete a credential",
        method: HttpMethod::Delete,
        path: "/credentials/{id}",
        params: &[path_id("id", "Credential ID")],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "get-credential-schema",
        group: Group::Credential,
        description: "Get the JSON schema of a credential type",
        method: HttpMethod::Get,
        path: "/credentials/schema/{credentialTypeName}",
        params: &[path_id("credentialTypeName", "Credential type name")],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "transfer-credential",
        group: Group::Credential,
        description: "Move a credential to another project",
        method: HttpMethod::Put,
        path: "/credentials/{id}/transfer",
        params: &[path_id("id", "Credential ID"), DESTINATION_PROJECT],
        body: BodyShape::Object,
        renames: &[],
    },
    // users
    Operation {
        name: "list-users",
        group: Group::User,
        description: "List users",
        method: HttpMethod::Get,
        path: "/users",
        params: &[
            query_flag("includeRole", "Include each user's global role"),
            query_string("projectId", "Project ID filter"),
            LIMIT,
            CURSOR,
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "create-users",
        group: Group::User,
        description: "Invite one or more users",
        method: HttpMethod::Post,
        path: "/users",
        params: &[ParamSpec::required("users", ParamKind::Array, Location::Body)
            .rules(&[
                Rule::MinItems(1),
                Rule::ItemKind(ParamKind::Object),
                Rule::ItemFields(&["email"]),
            ])
            .describe("Users to create, each with email and optional role")],
        body: BodyShape::Bare("users"),
        renames: &[],
    },
    Operation {
        name: "get-user",
        group: Group::User,
        description: "Get a user by ID or email",
        method: HttpMethod::Get,
        path: "/users/{id}",
        params: &[
            path_id("id", "User ID or email"),
            query_flag("includeRole", "Include the user's global role"),
        ],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "delete-user",
        group: Group::User,
        description: "Delete a user",
        method: HttpMethod::Delete,
        path: "/users/{id}",
        params: &[path_id("id", "User ID or email")],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "change-user-role",
        group: Group::User,
        description: "Change a user's global role",
        method: HttpMethod::Patch,
        path: "/users/{id}/role",
        params: &[
            path_id("id", "User ID or email"),
            ParamSpec::required("role", ParamKind::String, Location::BodyAs("newRoleName"))
                .rules(&[Rule::OneOf(GLOBAL_ROLES)])
                .describe("New global role"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    // projects
    Operation {
        name: "list-projects",
        group: Group::Project,
        description: "List projects",
        method: HttpMethod::Get,
        path: "/projects",
        params: &[LIMIT, CURSOR],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "create-project",
        group: Group::Project,
        description: "Create a project",
        method: HttpMethod::Post,
        path: "/projects",
        params: &[body_string("name", "Project name")],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "update-project",
        group: Group::Project,
        description: "Rename a project",
        method: HttpMethod::Put,
        path: "/projects/{projectId}",
        params: &[PROJECT_ID, body_string("name", "New project name")],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "delete-project",
        group: Group::Project,
        description: "Delete a project",
        method: HttpMethod::Delete,
        path: "/projects/{projectId}",
        params: &[PROJECT_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "add-users-to-project",
        group: Group::Project,
        description: "Add users to a project with the given project roles",
        method: HttpMethod::Post,
        path: "/projects/{projectId}/users",
        params: &[
            PROJECT_ID,
            ParamSpec::required("relations", ParamKind::Array, Location::Body)
                .rules(&[
                    Rule::MinItems(1),
                    Rule::ItemKind(ParamKind::Object),
                    Rule::ItemFields(&["projectUserId", "role"]),
                ])
                .describe("Relations of the form {projectUserId, role}"),
        ],
        body: BodyShape::Object,
        renames: &[ItemRename {
            param: "relations",
            from: "projectUserId",
            to: "userId",
        }],
    },
    Operation {
        name: "remove-user-from-project",
        group: Group::Project,
        description: "Remove a user from a project",
        method: HttpMethod::Delete,
        path: "/projects/{projectId}/users/{userId}",
        params: &[PROJECT_ID, path_id("userId", "User ID")],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "change-user-role-in-project",
        group: Group::Project,
        description: "Change a user's role within a project",
        method: HttpMethod::Patch,
        path: "/projects/{projectId}/users/{userId}",
        params: &[
            PROJECT_ID,
            path_id("userId", "User ID"),
            body_string("role", "New project role, e.g. project:editor"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    // tags
    Operation {
        name: "list-tags",
        group: Group::Tag,
        description: "List tags",
        method: HttpMethod::Get,
        path: "/tags",
        params: &[LIMIT, CURSOR],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "get-tag",
        group: Group::Tag,
        description: "Get a tag by ID",
        method: HttpMethod::Get,
        path: "/tags/{id}",
        params: &[TAG_ID],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "create-tag",
        group: Group::Tag,
        description: "Create a tag",
        method: HttpMethod::Post,
        path: "/tags",
        params: &[body_string("name", "Tag name")],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "update-tag",
        group: Group::Tag,
        description: "Rename a tag",
        method: HttpMethod::Put,
        path: "/tags/{id}",
        params: &[TAG_ID, body_string("name", "New tag name")],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "delete-tag",
        group: Group::Tag,
        description: "Delete a tag",
        method: HttpMethod::Delete,
        path: "/tags/{id}",
        params: &[TAG_ID],
        body: BodyShape::None,
        renames: &[],
    },
    // variables
    Operation {
        name: "list-variables",
        group: Group::Variable,
        description: "List instance variables",
        method: HttpMethod::Get,
        path: "/variables",
        params: &[LIMIT, CURSOR],
        body: BodyShape::None,
        renames: &[],
    },
    Operation {
        name: "create-variable",
        group: Group::Variable,
        description: "Create an instance variable",
        method: HttpMethod::Post,
        path: "/variables",
        params: &[
            body_string("key", "Variable key"),
            ParamSpec::required("value", ParamKind::String, Location::Body)
                .describe("Variable value"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "update-variable",
        group: Group::Variable,
        description: "Update an instance variable",
        method: HttpMethod::Put,
        path: "/variables/{id}",
        params: &[
            VARIABLE_ID,
            body_string("key", "Variable key"),
            ParamSpec::required("value", ParamKind::String, Location::Body)
                .describe("Variable value"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
    Operation {
        name: "delete-variable",
        group: Group::Variable,
        description: "Delete an instance variable",
        method: HttpMethod::Delete,
        path: "/variables/{id}",
        params: &[VARIABLE_ID],
        body: BodyShape::None,
        renames: &[],
    },
    // audit
    Operation {
        name: "generate-audit",
        group: Group::Audit,
        description: "Generate a security audit of the instance",
        method: HttpMethod::Post,
        path: "/audit",
        params: &[
            ParamSpec::optional("daysAbandonedWorkflow", ParamKind::Integer, Location::Body)
                .rules(POSITIVE)
                .describe("Days without execution after which a workflow counts as abandoned"),
            ParamSpec::optional("categories", ParamKind::Array, Location::Body)
                .rules(&[
                    Rule::ItemKind(ParamKind::String),
                    Rule::ItemOneOf(AUDIT_CATEGORIES),
                ])
                .describe("Audit categories to include"),
        ],
        body: BodyShape::Nested("additionalOptions"),
        renames: &[],
    },
    // source control
    Operation {
        name: "pull-source-control",
        group: Group::SourceControl,
        description: "Pull changes from the connected source control repository",
        method: HttpMethod::Post,
        path: "/source-control/pull",
        params: &[
            ParamSpec::optional("force", ParamKind::Boolean, Location::Body)
                .describe("Overwrite local changes"),
            ParamSpec::optional("variables", ParamKind::Object, Location::Body)
                .describe("Variable values to set after the pull"),
        ],
        body: BodyShape::Object,
        renames: &[],
    },
];

pub fn operations() -> &'static [Operation] {
    OPERATIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn operation_names_are_unique() {
        let names: HashSet<&str> = operations().iter().map(|op| op.name).collect();
        assert_eq!(names.len(), operations().len());
    }

    #[test]
    fn every_list_operation_paginates() {
        for op in operations().iter().filter(|op| op.name.starts_with("list-")) {
            assert!(op.param("limit").is_some(), "{} lacks limit", op.name);
            assert!(op.param("cursor").is_some(), "{} lacks cursor", op.name);
        }
    }

    #[test]
    fn every_group_is_represented() {
        let groups: HashSet<_> = operations()
            .iter()
            .map(|op| format!("{:?}", op.group))
            .collect();
        for group in [
            "Workflow",
            "Execution",
            "Credential",
            "User",
            "Project",
            "Tag",
            "Variable",
            "Audit",
            "SourceControl",
        ] {
            assert!(groups.contains(group), "missing group {}", group);
        }
    }
}
