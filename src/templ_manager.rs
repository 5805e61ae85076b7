use core::panic;
use std::sync::OnceLock;

use tera::Tera;
use tracing::info;

const WELCOME_TEMPLATE: &str = "welcome_email.html";

/// Holds the compiled email templates.
/// Templates are embedded into the binary so rendering does not depend on the working directory.
#[derive(Debug, Clone, Copy)]
pub struct TemplateManager {
    tera: &'static Tera,
}

impl TemplateManager {
    pub fn init() -> Self {
        info!(
            "{:<20} - Initializing the Template manager",
            "templ manager"
        );
        static TERA: OnceLock<Tera> = OnceLock::new();
        let tera = TERA.get_or_init(|| {
            let mut tera = Tera::default();
            tera.add_raw_template(
                WELCOME_TEMPLATE,
                include_str!("../templates/welcome_email.html"),
            )
            .unwrap_or_else(|e| panic!("Parsing error(s): {e}"));
            tera
        });
        Self { tera }
    }

    /// Renders the welcome email greeting `first_name`, HTML-escaped.
    pub fn render_welcome(&self, first_name: &str) -> Result<String, tera::Error> {
        let mut ctx = tera::Context::new();
        ctx.insert("first_name", first_name);
        self.tera.render(WELCOME_TEMPLATE, &ctx)
    }
}
