//! Page rendering
//!
//! Thin wrapper around a minijinja environment with embedded
//! templates. No application logic lives here.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;

use crate::error::AppResult;

/// Template renderer shared across handlers.
#[derive(Clone)]
pub struct Renderer {
    env: Arc<Environment<'static>>,
}

impl Renderer {
    /// Build the environment with all embedded templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("login.html", include_str!("../templates/login.html"))?;
        env.add_template("register.html", include_str!("../templates/register.html"))?;
        env.add_template(
            "change_password.html",
            include_str!("../templates/change_password.html"),
        )?;
        env.add_template("profile.html", include_str!("../templates/profile.html"))?;
        env.add_template("tasks.html", include_str!("../templates/tasks.html"))?;
        env.add_template("edit_task.html", include_str!("../templates/edit_task.html"))?;
        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template to an HTML response.
    pub fn render(&self, name: &str, ctx: minijinja::Value) -> AppResult<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}
