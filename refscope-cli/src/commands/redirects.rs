use std::path::Path;

use anyhow::Context;
use refscope::redirect::{parse_binding_redirects, BindingRedirects};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct RedirectEntry {
    name: String,
    old_version: String,
    new_version: String,
    public_key_token: Option<String>,
    culture: Option<String>,
}

#[derive(Debug, Serialize)]
struct RedirectsOutput {
    /// Rules as written, duplicates included
    declared: usize,
    /// Rules in effect, one per assembly name
    redirects: Vec<RedirectEntry>,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration: {}", path.display()))?;
    let rules = parse_binding_redirects(&xml)
        .with_context(|| format!("failed to parse configuration: {}", path.display()))?;

    let declared = rules.len();
    let effective: BindingRedirects = rules.into_iter().collect();

    let output = RedirectsOutput {
        declared,
        redirects: effective
            .iter()
            .map(|rule| RedirectEntry {
                name: rule.name.clone(),
                old_version: rule.old_version.to_string(),
                new_version: rule.new_version.to_string(),
                public_key_token: rule
                    .public_key_token
                    .as_ref()
                    .map(|token| token.as_str().to_string()),
                culture: rule.culture.clone(),
            })
            .collect(),
    };

    print_output(&output, opts, |output| {
        println!("Binding redirects: {}", output.redirects.len());
        if output.declared > output.redirects.len() {
            println!(
                "({} duplicate rules overridden by later ones)",
                output.declared - output.redirects.len()
            );
        }
        println!();

        let mut tw = TabWriter::new(vec![
            ("Assembly", Align::Left),
            ("Old Version", Align::Left),
            ("New Version", Align::Left),
            ("Token", Align::Left),
            ("Culture", Align::Left),
        ]);
        for entry in &output.redirects {
            tw.row(vec![
                entry.name.clone(),
                entry.old_version.clone(),
                entry.new_version.clone(),
                entry.public_key_token.clone().unwrap_or_else(|| "-".to_string()),
                entry.culture.clone().unwrap_or_else(|| "neutral".to_string()),
            ]);
        }
        tw.print();
    })
}
