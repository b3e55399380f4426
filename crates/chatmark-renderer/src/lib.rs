use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

const BASE_CSS: &str = include_str!("../assets/chatmark.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Theme::Auto),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Wraps rendered chat markup into a standalone page whose stylesheet
/// implements the default utility classes.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    custom_vars: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            custom_vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_vars.insert(key.into(), value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut out = String::new();
        let (light_vars, dark_vars) = default_theme_vars();

        match self.theme {
            Theme::Auto => {
                out.push_str(&root_block(&light_vars, 0));
                out.push_str("@media (prefers-color-scheme: dark) {\n");
                out.push_str(&root_block(&dark_vars, 1));
                out.push_str("}\n");
            }
            Theme::Light => out.push_str(&root_block(&light_vars, 0)),
            Theme::Dark => out.push_str(&root_block(&dark_vars, 0)),
        }

        if !self.custom_vars.is_empty() {
            out.push_str(&root_block(&self.custom_vars, 0));
        }

        out.push_str(BASE_CSS);
        out
    }

    pub fn embed_html(&self, html: &str, with_inline_css: bool) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n");
        out.push_str("<html lang=\"en\">\n");
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"utf-8\" />\n");
        out.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
        if with_inline_css {
            out.push_str("  <style>\n");
            out.push_str(&self.stylesheet());
            out.push_str("\n  </style>\n");
        } else {
            out.push_str("  <link rel=\"stylesheet\" href=\"chatmark.css\" />\n");
        }
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str(html);
        if !html.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("chatmark.css"), self.stylesheet())
    }
}

fn default_theme_vars() -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let light = BTreeMap::from([
        ("--chatmark-bg".to_string(), "#ffffff".to_string()),
        ("--chatmark-fg".to_string(), "#1f2937".to_string()),
        ("--chatmark-accent".to_string(), "#2563eb".to_string()),
        ("--chatmark-code-bg".to_string(), "#f3f4f6".to_string()),
        ("--chatmark-code-fg".to_string(), "#111827".to_string()),
    ]);

    let dark = BTreeMap::from([
        ("--chatmark-bg".to_string(), "#111827".to_string()),
        ("--chatmark-fg".to_string(), "#e5e7eb".to_string()),
        ("--chatmark-accent".to_string(), "#60a5fa".to_string()),
        ("--chatmark-code-bg".to_string(), "#1f2937".to_string()),
        ("--chatmark-code-fg".to_string(), "#f9fafb".to_string()),
    ]);

    (light, dark)
}

fn root_block(vars: &BTreeMap<String, String>, depth: usize) -> String {
    let pad = "  ".repeat(depth);
    let mut out = String::new();
    out.push_str(&pad);
    out.push_str(":root {\n");
    for (key, value) in vars {
        out.push_str(&pad);
        out.push_str("  ");
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(";\n");
    }
    out.push_str(&pad);
    out.push_str("}\n");
    out
}
