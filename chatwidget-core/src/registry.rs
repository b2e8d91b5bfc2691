//! Widget type to renderer lookup.
//!
//! The segmenter accepts any widget type; deciding what to draw for it is
//! the rendering layer's job. A registry maps type names to whatever that
//! layer uses as a renderer, with an optional fallback for unknown types.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct WidgetRegistry<R> {
    renderers: HashMap<String, R>,
    fallback: Option<R>,
}

impl<R> WidgetRegistry<R> {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: None,
        }
    }

    /// Register `renderer` for `widget_type`, returning the one it replaces.
    pub fn register(&mut self, widget_type: impl Into<String>, renderer: R) -> Option<R> {
        self.renderers.insert(widget_type.into(), renderer)
    }

    /// Renderer used for types with no registration.
    pub fn with_fallback(mut self, renderer: R) -> Self {
        self.fallback = Some(renderer);
        self
    }

    /// The renderer for `widget_type`, else the fallback.
    pub fn resolve(&self, widget_type: &str) -> Option<&R> {
        self.renderers.get(widget_type).or(self.fallback.as_ref())
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.renderers.contains_key(widget_type)
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl<R> Default for WidgetRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[derive(Debug, PartialEq)]
    enum Renderer {
        Card,
        List,
        Unknown,
    }

    #[test]
    fn test_resolve_with_fallback() {
        let mut registry = WidgetRegistry::new().with_fallback(Renderer::Unknown);
        registry.register("card", Renderer::Card);
        registry.register("list", Renderer::List);

        assert_eq!(registry.resolve("card"), Some(&Renderer::Card));
        assert_eq!(registry.resolve("widget_xyz"), Some(&Renderer::Unknown));
        assert!(registry.contains("list"));
        assert!(!registry.contains("widget_xyz"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_without_fallback() {
        let registry: WidgetRegistry<Renderer> = WidgetRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.resolve("card"), None);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = WidgetRegistry::new();
        assert_eq!(registry.register("card", Renderer::Unknown), None);
        assert_eq!(registry.register("card", Renderer::Card), Some(Renderer::Unknown));
        assert_eq!(registry.types().collect::<Vec<_>>(), vec!["card"]);
    }

    #[test]
    fn test_dispatch_parsed_widgets() {
        let mut registry = WidgetRegistry::new().with_fallback(Renderer::Unknown);
        registry.register("card", Renderer::Card);

        let content = parse(r#"@ui:card[{"a":1}] @ui:widget_xyz[{"a":1}]"#);
        let resolved: Vec<_> = content
            .widgets()
            .filter_map(|w| registry.resolve(&w.widget_type))
            .collect();
        assert_eq!(resolved, vec![&Renderer::Card, &Renderer::Unknown]);
    }
}
