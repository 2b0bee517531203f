use std::collections::HashMap;
use std::sync::Arc;

use harvest_core::{Error, Result, Value};
use tracing::{debug, warn};

use crate::html::{
    AttrGetFunction, ElementExistsFunction, ElementFunction, ElementsCountFunction,
    ElementsFunction, InnerHtmlAllFunction, InnerHtmlFunction, InnerTextAllFunction,
    InnerTextFunction, WaitClassFunction,
};
use crate::math::MaxFunction;
use crate::validation::validate_args;
use crate::{Function, FunctionContext};

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(ElementFunction));
        registry.register(Arc::new(ElementsFunction));
        registry.register(Arc::new(ElementExistsFunction));
        registry.register(Arc::new(ElementsCountFunction));
        registry.register(Arc::new(InnerHtmlFunction));
        registry.register(Arc::new(InnerHtmlAllFunction));
        registry.register(Arc::new(InnerTextFunction));
        registry.register(Arc::new(InnerTextAllFunction));
        registry.register(Arc::new(AttrGetFunction));
        registry.register(Arc::new(WaitClassFunction));

        registry.register(Arc::new(MaxFunction));

        registry
    }

    /// Names are case-insensitive; they are stored upper-case.
    pub fn register(&mut self, function: Arc<dyn Function>) {
        let name = function.schema().name.to_ascii_uppercase();
        debug!(name = %name, "Registering function");
        self.functions.insert(name, function);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Function>> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up `name`, check the argument count against its schema and call it.
    pub async fn call(&self, name: &str, ctx: &FunctionContext, args: &[Value]) -> Result<Value> {
        let function = self
            .get(name)
            .ok_or_else(|| Error::NotImplemented(format!("Unknown function: {}", name)))?;

        let schema = function.schema();
        validate_args(args, schema.min_args, schema.max_args)?;

        let result = function.call(ctx, args).await;
        if let Err(e) = &result {
            warn!(function = schema.name, error = %e, "Function failed");
        }
        result
    }
}
