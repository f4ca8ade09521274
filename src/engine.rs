//! The engine ties delimiters, the template cache and an evaluator together.

use std::sync::{Arc, OnceLock};

use bracketed_core::{ConfigError, EvalError, ParseError, TemplateError, Value};
use bracketed_parser::{Delimiters, Splitter};

use crate::brackets::Brackets;
use crate::eval::{Evaluator, ExprEvaluator};
use crate::template::{LoopKeys, Renderer, Template, TemplateCache, loop_keys};

/// A self-contained template engine.
///
/// The crate-level functions use [`Engine::global`]; build a separate engine
/// to work with other delimiters or another evaluator without touching
/// process-wide state.
#[derive(Debug)]
pub struct Engine {
    brackets: Brackets,
    renderer: Renderer,
}

impl Default for Engine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The engine behind the crate-level functions. Its delimiters are
    /// [`Brackets::global`].
    pub fn global() -> &'static Engine {
        static INSTANCE: OnceLock<Engine> = OnceLock::new();
        INSTANCE.get_or_init(Engine::default)
    }

    pub fn brackets(&self) -> &Brackets {
        &self.brackets
    }

    /// Templates compiled for the current pair. Changing the pair through
    /// [`Engine::set_delimiters`] or [`Brackets::set`] empties it.
    pub fn templates(&self) -> &TemplateCache {
        self.brackets.templates()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn set_delimiters(&self, spec: Option<&str>) -> Result<(), ConfigError> {
        self.brackets.set(spec)
    }

    pub fn delimiters(&self) -> [String; 2] {
        self.brackets.pair()
    }

    /// Split a template into segment texts, with `delimiters` or the
    /// engine's current pair.
    pub fn split(
        &self,
        template: &str,
        delimiters: Option<&Delimiters>,
    ) -> Result<Vec<String>, ParseError> {
        match delimiters {
            Some(delimiters) => Splitter::new(delimiters).split(template),
            None => Splitter::new(&self.brackets.current()).split(template),
        }
    }

    /// Compile `source` with the current pair, reusing a cached template
    /// when there is one.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(&self, source: &str) -> Result<Arc<Template>, TemplateError> {
        let delimiters = self.brackets.current();
        Ok(self.templates().get_or_parse(source, &delimiters)?)
    }

    pub fn render(&self, template: &Template, context: &Value) -> Result<Value, TemplateError> {
        self.renderer.render(template, context)
    }

    /// Parse and render in one step.
    pub fn render_str(&self, source: &str, context: &Value) -> Result<Value, TemplateError> {
        let template = self.parse(source)?;
        self.render(&template, context)
    }

    /// Whether `text` looks like it contains an expression.
    pub fn has_expr(&self, text: &str) -> Result<bool, TemplateError> {
        Ok(self.brackets.detector()?.is_match(text))
    }

    pub fn loop_keys(&self, header: &str) -> Option<LoopKeys> {
        loop_keys(&self.brackets, header)
    }

    pub fn clear_cache(&self) {
        self.templates().clear();
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    delimiters: Option<Delimiters>,
    evaluator: Option<Arc<dyn Evaluator>>,
    on_error: Option<Box<dyn Fn(&EvalError) + Send + Sync>>,
}

impl EngineBuilder {
    /// Use the pair described by `spec` instead of `{ }`.
    pub fn delimiters(mut self, spec: &str) -> Result<Self, ConfigError> {
        self.delimiters = Some(Delimiters::parse(Some(spec))?);
        Ok(self)
    }

    pub fn evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Some(Arc::new(evaluator));
        self
    }

    pub fn on_error(mut self, observer: impl Fn(&EvalError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(observer));
        self
    }

    pub fn build(self) -> Engine {
        let evaluator = self
            .evaluator
            .unwrap_or_else(|| Arc::new(ExprEvaluator::new()));
        let mut renderer = Renderer::new(evaluator);
        if let Some(observer) = self.on_error {
            renderer = renderer.on_error(observer);
        }
        Engine {
            brackets: Brackets::with_delimiters(self.delimiters.unwrap_or_default()),
            renderer,
        }
    }
}
