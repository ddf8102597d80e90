//! Chat prompts, rendered from templates embedded in the binary.

use anyhow::{Context, Result};
use tera::Tera;

/// File names listed in the user prompt; the JSON payload carries the rest.
pub const MAX_LISTED_FILES: usize = 100;

const SYSTEM: &str = "system.tera";
const USER: &str = "user.tera";

const TPLS: &[(&str, &str)] = &[
    (SYSTEM, include_str!("templates/system.tera")),
    (USER, include_str!("templates/user.tera")),
];

pub struct Prompts {
    tera: Tera,
}

impl Prompts {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())
            .context("failed to load prompt templates")?;
        Ok(Self { tera })
    }

    pub fn system(&self, branch: &str) -> Result<String> {
        let mut ctx = tera::Context::new();
        ctx.insert("branch", branch);
        self.render(SYSTEM, &ctx)
    }

    /// User prompt: the first [`MAX_LISTED_FILES`] names, then the payload.
    pub fn user(&self, files: &[String], payload: &str) -> Result<String> {
        let listed = &files[..files.len().min(MAX_LISTED_FILES)];
        let mut ctx = tera::Context::new();
        ctx.insert("files", listed);
        ctx.insert("payload", payload);
        self.render(USER, &ctx)
    }

    fn render(&self, name: &str, ctx: &tera::Context) -> Result<String> {
        let rendered = self
            .tera
            .render(name, ctx)
            .with_context(|| format!("failed to render prompt '{name}'"))?;
        Ok(rendered.trim().to_string())
    }
}
