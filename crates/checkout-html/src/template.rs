//! # Templates
//!
//! MiniJinja environment holding the page templates. Defaults are embedded in
//! the binary; files below `client/html/common/template/dir` replace embedded
//! templates of the same name (e.g. `checkout/confirm/body-standard.html`).

use checkout_core::{CheckoutError, CheckoutResult, ClientConfig};
use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Config key of the template override directory
pub const TEMPLATE_DIR_KEY: &str = "client/html/common/template/dir";

// Embedded templates (compiled into binary)
mod embedded {
    pub const PROCESS_BODY: &str =
        include_str!("../templates/checkout/standard/process-body-standard.html");
    pub const PROCESS_HEADER: &str =
        include_str!("../templates/checkout/standard/process-header-standard.html");
    pub const CONFIRM_BODY: &str = include_str!("../templates/checkout/confirm/body-standard.html");
    pub const CONFIRM_HEADER: &str =
        include_str!("../templates/checkout/confirm/header-standard.html");
    pub const INTRO_BODY: &str =
        include_str!("../templates/checkout/confirm/intro-body-standard.html");
    pub const ORDER_BODY: &str =
        include_str!("../templates/checkout/confirm/order-body-standard.html");
    pub const ERRORS: &str = include_str!("../templates/common/errors.html");
}

const EMBEDDED: &[(&str, &str)] = &[
    ("checkout/standard/process-body-standard.html", embedded::PROCESS_BODY),
    ("checkout/standard/process-header-standard.html", embedded::PROCESS_HEADER),
    ("checkout/confirm/body-standard.html", embedded::CONFIRM_BODY),
    ("checkout/confirm/header-standard.html", embedded::CONFIRM_HEADER),
    ("checkout/confirm/intro-body-standard.html", embedded::INTRO_BODY),
    ("checkout/confirm/order-body-standard.html", embedded::ORDER_BODY),
    ("common/errors.html", embedded::ERRORS),
];

/// Renders named templates with a serialisable context
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with the embedded templates
    pub fn new() -> CheckoutResult<Self> {
        let mut env = Environment::new();
        for &(name, source) in EMBEDDED {
            env.add_template(name, source).map_err(|e| {
                CheckoutError::Template(format!("Failed to load {}: {}", name, e))
            })?;
        }
        Ok(Self { env })
    }

    /// Create a renderer whose templates are overridden by files in `dir`
    pub fn with_override_dir(dir: &Path) -> CheckoutResult<Self> {
        let mut renderer = Self::new()?;
        renderer.load_dir(dir, dir)?;
        Ok(renderer)
    }

    /// Create a renderer honouring the configured template directory
    pub fn from_config(config: &ClientConfig) -> CheckoutResult<Self> {
        match config.get_str(TEMPLATE_DIR_KEY).filter(|dir| !dir.is_empty()) {
            Some(dir) => Self::with_override_dir(Path::new(dir)),
            None => Self::new(),
        }
    }

    /// Add or replace a single template
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> CheckoutResult<()> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|e| CheckoutError::Template(format!("Failed to load {}: {}", name, e)))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    /// Render a template
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> CheckoutResult<String> {
        let template = self
            .env
            .get_template(name)
            .map_err(|e| CheckoutError::Template(format!("Unknown template {}: {}", name, e)))?;

        template
            .render(ctx)
            .map_err(|e| CheckoutError::Template(format!("Failed to render {}: {:#}", name, e)))
    }

    fn load_dir(&mut self, root: &Path, dir: &Path) -> CheckoutResult<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CheckoutError::Configuration(format!(
                "Failed to read template directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| CheckoutError::Configuration(e.to_string()))?
                .path();

            if path.is_dir() {
                self.load_dir(root, &path)?;
                continue;
            }

            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let source = std::fs::read_to_string(&path).map_err(|e| {
                CheckoutError::Configuration(format!("Failed to read {}: {}", path.display(), e))
            })?;

            debug!("Loaded template override {}", name);
            self.add_template(name, source)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embedded_templates_parse() {
        let renderer = TemplateRenderer::new().unwrap();

        for (name, _) in EMBEDDED {
            assert!(renderer.has_template(name), "missing {}", name);
        }
    }

    #[test]
    fn test_html_is_escaped() {
        let mut renderer = TemplateRenderer::new().unwrap();
        renderer
            .add_template("test/escape.html", "<p>{{ message }}</p>")
            .unwrap();

        let html = renderer
            .render("test/escape.html", json!({"message": "<script>"}))
            .unwrap();
        assert_eq!(html, "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn test_override_replaces_embedded() {
        let mut renderer = TemplateRenderer::new().unwrap();
        renderer
            .add_template("checkout/confirm/body-standard.html", "custom")
            .unwrap();

        assert_eq!(
            renderer
                .render("checkout/confirm/body-standard.html", json!({}))
                .unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_unknown_template() {
        let renderer = TemplateRenderer::new().unwrap();
        assert!(matches!(
            renderer.render("missing.html", json!({})),
            Err(CheckoutError::Template(_))
        ));
    }

    #[test]
    fn test_missing_override_dir() {
        let config = ClientConfig::new().with(TEMPLATE_DIR_KEY, "/nonexistent/templates");

        assert!(matches!(
            TemplateRenderer::from_config(&config),
            Err(CheckoutError::Configuration(_))
        ));
    }
}
