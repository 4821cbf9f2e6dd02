//! Tool registry used by the dispatcher to list and look up tools.

use std::collections::{HashMap, HashSet};

use proto::{Capability, ToolError, ToolSchema};
use tools::ToolDefinition;
use tracing::debug;

/// Which registered tools are offered to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExposureFilter {
    /// Allowed capability groups; `None` exposes every group.
    pub capabilities: Option<HashSet<Capability>>,
    /// Hide tools that may mutate page state.
    pub read_only: bool,
}

impl ExposureFilter {
    /// Exposes every registered tool.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns `true` when `definition` is offered under this filter.
    pub fn allows(&self, definition: &ToolDefinition) -> bool {
        let capability_ok = self
            .capabilities
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&definition.capability()));
        let type_ok = !self.read_only || definition.schema().tool_type.is_read_only();
        capability_ok && type_ok
    }
}

/// Registry of available tools, keyed by name
#[derive(Debug)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Creates an empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers one capability module's definitions.
    ///
    /// A name that is already registered, or repeated within `definitions`,
    /// rejects the whole batch and leaves the registry unchanged.
    pub fn register(&mut self, definitions: Vec<ToolDefinition>) -> Result<(), ToolError> {
        let mut batch = HashSet::new();
        for definition in &definitions {
            let name = definition.name();
            if self.tools.contains_key(name) || !batch.insert(name) {
                return Err(ToolError::DuplicateName(name.to_string()));
            }
        }

        for definition in definitions {
            let name = definition.name().to_string();
            debug!(capability = %definition.capability(), "Registering tool: {name}");
            self.order.push(name.clone());
            self.tools.insert(name, definition);
        }
        Ok(())
    }

    /// Looks up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolDefinition, ToolError> {
        self.tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Schemas of the tools exposed under `filter`, in registration order.
    pub fn definitions(&self, filter: &ExposureFilter) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .filter(|definition| filter.allows(definition))
            .map(|definition| definition.schema().clone())
            .collect()
    }

    /// Returns the list of registered tool names in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use proto::ToolType;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use tools::{Context, Tool, ToolParams, ToolResult};

    use super::*;

    #[derive(Deserialize, JsonSchema)]
    struct NoteParams {
        text: String,
    }

    impl ToolParams for NoteParams {}

    struct NoteTool {
        name: &'static str,
        capability: Capability,
        tool_type: ToolType,
    }

    #[async_trait]
    impl Tool for NoteTool {
        type Params = NoteParams;

        fn name(&self) -> &str {
            self.name
        }

        fn title(&self) -> &str {
            "Note"
        }

        fn description(&self) -> &str {
            "Records a note without touching the page"
        }

        fn tool_type(&self) -> ToolType {
            self.tool_type
        }

        fn capability(&self) -> Capability {
            self.capability
        }

        async fn handle(
            &self,
            _context: &dyn Context,
            params: NoteParams,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::advisory(vec![format!("// {}", params.text)]))
        }
    }

    fn note(name: &'static str, capability: Capability, tool_type: ToolType) -> ToolDefinition {
        ToolDefinition::new(NoteTool {
            name,
            capability,
            tool_type,
        })
        .expect("note definition")
    }

    #[test]
    fn register_and_lookup_known_tool() {
        let mut registry = ToolRegistry::new();
        registry
            .register(vec![note("note", Capability::Core, ToolType::ReadOnly)])
            .expect("register note");

        let definition = registry.lookup("note").expect("note registered");
        assert_eq!(definition.name(), "note");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_unknown_tool_returns_not_found() {
        let registry = ToolRegistry::new();
        let err = registry.lookup("missing").expect_err("unknown tool");
        assert!(matches!(err, ToolError::NotFound(ref name) if name == "missing"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn duplicate_across_batches_is_rejected_in_either_order() {
        let mut first = ToolRegistry::new();
        first
            .register(vec![note("a", Capability::Core, ToolType::ReadOnly)])
            .expect("first batch");
        let err = first
            .register(vec![note("a", Capability::Vision, ToolType::Destructive)])
            .expect_err("duplicate");
        assert!(matches!(err, ToolError::DuplicateName(ref name) if name == "a"));

        let mut second = ToolRegistry::new();
        second
            .register(vec![note("a", Capability::Vision, ToolType::Destructive)])
            .expect("first batch");
        let err = second
            .register(vec![note("a", Capability::Core, ToolType::ReadOnly)])
            .expect_err("duplicate");
        assert!(matches!(err, ToolError::DuplicateName(ref name) if name == "a"));
    }

    #[test]
    fn duplicate_within_batch_leaves_registry_unchanged() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .register(vec![
                note("b", Capability::Core, ToolType::ReadOnly),
                note("c", Capability::Core, ToolType::ReadOnly),
                note("b", Capability::Core, ToolType::ReadOnly),
            ])
            .expect_err("duplicate in batch");
        assert!(matches!(err, ToolError::DuplicateName(ref name) if name == "b"));
        assert!(registry.is_empty());
        assert!(registry.lookup("c").is_err());
    }

    #[test]
    fn definitions_follow_registration_order_and_filter() {
        let mut registry = ToolRegistry::new();
        registry
            .register(vec![
                note("zeta", Capability::Core, ToolType::Destructive),
                note("alpha", Capability::Vision, ToolType::ReadOnly),
            ])
            .expect("register");
        registry
            .register(vec![note("mid", Capability::Core, ToolType::ReadOnly)])
            .expect("register");

        assert_eq!(registry.tool_names(), vec!["zeta", "alpha", "mid"]);

        let all: Vec<String> = registry
            .definitions(&ExposureFilter::all())
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(all, vec!["zeta", "alpha", "mid"]);

        let core_only = ExposureFilter {
            capabilities: Some(HashSet::from([Capability::Core])),
            read_only: false,
        };
        let core: Vec<String> = registry
            .definitions(&core_only)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(core, vec!["zeta", "mid"]);

        let read_only = ExposureFilter {
            capabilities: None,
            read_only: true,
        };
        let readable: Vec<String> = registry
            .definitions(&read_only)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(readable, vec!["alpha", "mid"]);
    }

    #[test]
    fn builtin_modules_register_without_collisions() {
        let mut registry = ToolRegistry::new();
        registry
            .register(tools::navigation::tools().expect("navigation"))
            .expect("navigation");
        registry
            .register(tools::interaction::tools().expect("interaction"))
            .expect("interaction");
        registry
            .register(tools::scroll::tools().expect("scroll"))
            .expect("scroll");
        assert_eq!(
            registry.tool_names(),
            vec![
                "browser_navigate",
                "browser_click",
                "browser_type",
                "browser_scroll"
            ]
        );

        let err = registry
            .register(tools::scroll::tools().expect("scroll"))
            .expect_err("scroll registered twice");
        assert!(matches!(err, ToolError::DuplicateName(ref name) if name == "browser_scroll"));
    }
}
