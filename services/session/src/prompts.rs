//! Loads the seed prompts a session starts from.

use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};

/// The two fixed messages every transcript begins with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPrompts {
    pub system_prompt: String,
    pub greeting: String,
}

impl SessionPrompts {
    /// Reads `system_prompt.md` and `greeting.md` from `prompts_path`.
    pub fn load(prompts_path: &Path) -> Result<Self> {
        let mut prompts = load_prompts(prompts_path)
            .with_context(|| format!("Failed to read prompts from {}", prompts_path.display()))?;
        let mut take = |key: &str| {
            prompts
                .remove(key)
                .map(|text| text.trim().to_string())
                .with_context(|| format!("{key}.md not found in prompts directory"))
        };
        Ok(Self {
            system_prompt: take("system_prompt")?,
            greeting: take("greeting")?,
        })
    }
}

/// A helper function to load every markdown prompt in a directory, keyed by file stem.
fn load_prompts(prompts_path: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    for entry in fs::read_dir(prompts_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}
